use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::errors::{NewsAnalysisError, Result};
use crate::models::{
    AnalysisResult, AnalyzedArticle, CoverageDifference, RawArticle, Sentiment, SentimentCounts,
    TopicOverlap,
};
use crate::services::classifier::SentimentClassifier;

#[derive(Clone)]
pub struct ArticleProcessor {
    classifier: Arc<dyn SentimentClassifier>,
    max_concurrent: usize,
}

impl ArticleProcessor {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, max_concurrent: usize) -> Self {
        ArticleProcessor {
            classifier,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Классифицирует статьи и собирает сводную статистику.
    ///
    /// Ошибка классификации любой статьи прерывает обработку всего набора.
    pub async fn process(&self, articles: &[RawArticle], company: &str) -> Result<AnalysisResult> {
        if articles.is_empty() {
            return Err(NewsAnalysisError::InvalidDataFormat(
                "Пустой набор статей нельзя анализировать".to_string(),
            ));
        }

        // Будущие задачи владеют текстом, иначе обработчик маршрута не будет Send.
        // `buffered` сохраняет порядок входа
        let summaries: Vec<String> = articles.iter().map(|a| a.summary.clone()).collect();
        let sentiments: Vec<Sentiment> = stream::iter(summaries.into_iter().map(|summary| {
            let classifier = Arc::clone(&self.classifier);
            async move { classifier.classify(&summary).await }
        }))
        .buffered(self.max_concurrent)
        .try_collect()
        .await?;

        let mut sentiment_counts = SentimentCounts::default();
        let analyzed: Vec<AnalyzedArticle> = articles
            .iter()
            .zip(sentiments)
            .map(|(article, sentiment)| {
                sentiment_counts.record(sentiment);
                tracing::debug!("Статья \"{}\": {}", article.title, sentiment);
                AnalyzedArticle {
                    title: article.title.clone(),
                    summary: article.summary.clone(),
                    sentiment,
                    topics: article.topics.clone(),
                }
            })
            .collect();

        let topic_overlap = topic_overlap(articles);
        let coverage_differences = coverage_differences(&analyzed);

        let dominant = sentiment_counts.dominant();
        let final_sentiment_summary = format!(
            "Final Sentiment Analysis: {}'s latest news coverage is mostly {}. {}",
            company,
            dominant,
            stock_prediction(dominant)
        );

        tracing::info!(
            "Обработано {} статей о {}: {:?}",
            analyzed.len(),
            company,
            sentiment_counts
        );

        Ok(AnalysisResult {
            sentiment_counts,
            articles: analyzed,
            final_sentiment_summary,
            coverage_differences,
            topic_overlap,
        })
    }
}

fn stock_prediction(dominant: Sentiment) -> &'static str {
    match dominant {
        Sentiment::Positive => "Stock prices may increase.",
        Sentiment::Negative => "Stock prices may decrease.",
        Sentiment::Neutral => "Stock prices may remain constant.",
    }
}

fn distinct_topics(topics: &[String]) -> Vec<&String> {
    let mut seen = BTreeSet::new();
    topics.iter().filter(|t| seen.insert(t.as_str())).collect()
}

pub(crate) fn topic_overlap(articles: &[RawArticle]) -> TopicOverlap {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for article in articles {
        for topic in distinct_topics(&article.topics) {
            *frequency.entry(topic.as_str()).or_insert(0) += 1;
        }
    }

    let mut common_topics: BTreeSet<String> = frequency
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(topic, _)| topic.to_string())
        .collect();
    if common_topics.is_empty() {
        common_topics = frequency.keys().map(|topic| topic.to_string()).collect();
    }

    let unique_topics: BTreeMap<usize, Vec<String>> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let unique = distinct_topics(&article.topics)
                .into_iter()
                .filter(|topic| !common_topics.contains(*topic))
                .cloned()
                .collect();
            (i + 1, unique)
        })
        .collect();

    TopicOverlap {
        common_topics,
        unique_topics,
    }
}

pub(crate) fn coverage_differences(articles: &[AnalyzedArticle]) -> Vec<CoverageDifference> {
    articles
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (current, next) = (&pair[0], &pair[1]);
            let (a, b) = (i + 1, i + 2);
            let stock_impact = if current.sentiment != next.sentiment {
                "This may create uncertainty in stock trends."
            } else {
                "The sentiment consistency may stabilize stock movements."
            };
            CoverageDifference {
                comparison: format!(
                    "Article {} covers [{}], while Article {} focuses on [{}].",
                    a,
                    current.topics.join(", "),
                    b,
                    next.topics.join(", ")
                ),
                sentiment_impact: format!(
                    "Article {} has a {} sentiment, while Article {} has a {} sentiment.",
                    a, current.sentiment, b, next.sentiment
                ),
                stock_impact: stock_impact.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, topics: &[&str]) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            summary: String::new(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn falls_back_to_all_topics_when_nothing_repeats() {
        let overlap = topic_overlap(&[article("A", &["AI"]), article("B", &["Layoffs"])]);
        let expected: BTreeSet<String> = ["AI", "Layoffs"].iter().map(|t| t.to_string()).collect();
        assert_eq!(overlap.common_topics, expected);
        assert!(overlap.unique_topics.values().all(|topics| topics.is_empty()));
    }

    #[test]
    fn repeated_topic_within_one_article_counts_once() {
        let overlap = topic_overlap(&[article("A", &["AI", "AI", "Cloud"]), article("B", &["Cloud"])]);
        assert!(overlap.common_topics.contains("Cloud"));
        assert!(!overlap.common_topics.contains("AI"));
        assert_eq!(overlap.unique_topics[&1], vec!["AI".to_string()]);
    }

    #[test]
    fn articles_without_topics_give_empty_overlap() {
        let overlap = topic_overlap(&[article("A", &[]), article("B", &[])]);
        assert!(overlap.common_topics.is_empty());
        assert_eq!(overlap.unique_topics.len(), 2);
    }

    #[test]
    fn single_article_has_no_coverage_differences() {
        let analyzed = vec![AnalyzedArticle {
            title: "A".to_string(),
            summary: String::new(),
            sentiment: Sentiment::Neutral,
            topics: vec![],
        }];
        assert!(coverage_differences(&analyzed).is_empty());
    }
}
