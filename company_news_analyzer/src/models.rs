use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Канонический порядок: он же порядок разрешения ничьей.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Статья в том виде, в каком её вернул источник новостей.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub summary: String,
    pub topics: Vec<String>,
}

impl RawArticle {
    /// Повторяющиеся темы отбрасываются, порядок первого появления сохраняется.
    pub fn new(title: impl Into<String>, summary: impl Into<String>, topics: Vec<String>) -> Self {
        let mut seen = BTreeSet::new();
        let topics = topics
            .into_iter()
            .filter(|topic| seen.insert(topic.clone()))
            .collect();
        RawArticle {
            title: title.into(),
            summary: summary.into(),
            topics,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedArticle {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: Sentiment,
    #[serde(rename = "Topics")]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
}

impl SentimentCounts {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Преобладающее настроение; при равенстве побеждает то, что раньше в `Sentiment::ALL`.
    pub fn dominant(&self) -> Sentiment {
        let mut best = Sentiment::ALL[0];
        for sentiment in Sentiment::ALL.into_iter().skip(1) {
            if self.get(sentiment) > self.get(best) {
                best = sentiment;
            }
        }
        best
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageDifference {
    #[serde(rename = "Comparison")]
    pub comparison: String,
    #[serde(rename = "Sentiment Impact")]
    pub sentiment_impact: String,
    #[serde(rename = "Stock Impact")]
    pub stock_impact: String,
}

/// Разбиение тем на общие и уникальные для каждой статьи.
///
/// Ключи `unique_topics` — позиция статьи начиная с 1, только для отображения.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicOverlap {
    pub common_topics: BTreeSet<String>,
    pub unique_topics: BTreeMap<usize, Vec<String>>,
}

impl Serialize for TopicOverlap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.unique_topics.len()))?;
        map.serialize_entry("Common Topics", &self.common_topics)?;
        for (index, topics) in &self.unique_topics {
            map.serialize_entry(&format!("Unique Topics in Article {}", index), topics)?;
        }
        map.end()
    }
}

/// Результат агрегации по набору статей.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub sentiment_counts: SentimentCounts,
    pub articles: Vec<AnalyzedArticle>,
    pub final_sentiment_summary: String,
    pub coverage_differences: Vec<CoverageDifference>,
    pub topic_overlap: TopicOverlap,
}

/// Итог синтеза речи. Отсутствие аудио — штатная ситуация, а не ошибка.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPayload {
    Encoded(String),
    Empty,
}

impl AudioPayload {
    pub fn is_empty(&self) -> bool {
        matches!(self, AudioPayload::Empty)
    }

    pub fn into_base64(self) -> String {
        match self {
            AudioPayload::Encoded(data) => data,
            AudioPayload::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeSentimentScore {
    #[serde(rename = "Sentiment Distribution")]
    pub sentiment_distribution: SentimentCounts,
    #[serde(rename = "Coverage Differences")]
    pub coverage_differences: Vec<CoverageDifference>,
    #[serde(rename = "Topic Overlap")]
    pub topic_overlap: TopicOverlap,
}

/// Ответ `/news`, который дашборд потребляет как есть.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsReport {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Articles")]
    pub articles: Vec<AnalyzedArticle>,
    #[serde(rename = "Comparative Sentiment Score")]
    pub comparative_sentiment_score: ComparativeSentimentScore,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_sentiment_analysis: String,
    /// Устаревшее поле, всегда пустое; оставлено ради совместимости формы ответа.
    #[serde(rename = "Audio")]
    pub audio: String,
    #[serde(rename = "AudioBase64")]
    pub audio_base64: String,
}

impl NewsReport {
    pub fn empty(company: &str) -> Self {
        NewsReport {
            company: company.to_string(),
            articles: Vec::new(),
            comparative_sentiment_score: ComparativeSentimentScore {
                sentiment_distribution: SentimentCounts::default(),
                coverage_differences: Vec::new(),
                topic_overlap: TopicOverlap::default(),
            },
            final_sentiment_analysis: format!(
                "No significant news coverage found for {}.",
                company
            ),
            audio: String::new(),
            audio_base64: String::new(),
        }
    }

    pub fn from_analysis(company: &str, analysis: AnalysisResult, audio: AudioPayload) -> Self {
        NewsReport {
            company: company.to_string(),
            articles: analysis.articles,
            comparative_sentiment_score: ComparativeSentimentScore {
                sentiment_distribution: analysis.sentiment_counts,
                coverage_differences: analysis.coverage_differences,
                topic_overlap: analysis.topic_overlap,
            },
            final_sentiment_analysis: analysis.final_sentiment_summary,
            audio: String::new(),
            audio_base64: audio.into_base64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(positive: usize, negative: usize, neutral: usize) -> SentimentCounts {
        SentimentCounts { positive, negative, neutral }
    }

    #[test]
    fn dominant_breaks_ties_in_canonical_order() {
        let cases = [
            (counts(1, 1, 0), Sentiment::Positive),
            (counts(2, 0, 2), Sentiment::Positive),
            (counts(1, 2, 2), Sentiment::Negative),
            (counts(3, 3, 3), Sentiment::Positive),
            (counts(0, 0, 0), Sentiment::Positive),
            (counts(0, 1, 0), Sentiment::Negative),
            (counts(1, 0, 2), Sentiment::Neutral),
            (counts(0, 0, 1), Sentiment::Neutral),
        ];
        for (tally, expected) in cases {
            assert_eq!(tally.dominant(), expected, "counts: {:?}", tally);
        }
    }
}
