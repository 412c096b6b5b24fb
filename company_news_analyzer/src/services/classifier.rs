use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::{NewsAnalysisError, Result};
use crate::models::Sentiment;

/// Классификатор настроения текста.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Sentiment>;
}

/// Классификатор на базе Hugging Face Inference API.
#[derive(Clone)]
pub struct HuggingFaceClassifier {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HuggingFaceClassifier {
    pub fn new(client: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        HuggingFaceClassifier {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn request_label(&self, text: &str) -> Result<String> {
        let max_len = 512;
        let mut used = 0;
        let truncated_text: String = text
            .split_whitespace()
            .take_while(|word| {
                used += word.len() + 1;
                used <= max_len
            })
            .collect::<Vec<&str>>()
            .join(" ");

        let payload = json!({ "inputs": truncated_text });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Неизвестная ошибка".to_string());
            return Err(NewsAnalysisError::ApiError(format!(
                "Hugging Face API error: {} - {}",
                status, error_text
            )));
        }

        let result: Value = response.json().await?;
        top_label(&result).ok_or_else(|| {
            NewsAnalysisError::InvalidDataFormat(format!(
                "Некорректный формат ответа от Hugging Face: {}",
                result
            ))
        })
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        if text.trim().is_empty() {
            return Ok(Sentiment::Neutral);
        }

        let label = self
            .request_label(text)
            .await
            .map_err(|e| NewsAnalysisError::ClassificationFailure(e.to_string()))?;
        tracing::debug!("Hugging Face вернул метку: {}", label);

        parse_label(&label).ok_or_else(|| {
            NewsAnalysisError::ClassificationFailure(format!("Неизвестная метка: {}", label))
        })
    }
}

/// Метка с наибольшей уверенностью. API отвечает либо `[{..}]`, либо `[[{..}]]`.
fn top_label(result: &Value) -> Option<String> {
    let predictions = match result.as_array()?.first()? {
        Value::Array(inner) => inner.as_slice(),
        _ => result.as_array()?.as_slice(),
    };

    predictions
        .iter()
        .filter_map(|pred| {
            let label = pred["label"].as_str()?;
            let score = pred["score"].as_f64().unwrap_or(0.0);
            Some((label, score))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, _)| label.to_string())
}

fn parse_label(label: &str) -> Option<Sentiment> {
    let label = label.to_lowercase();
    // Модели cardiffnlp: LABEL_0 = negative, LABEL_1 = neutral, LABEL_2 = positive
    match label.as_str() {
        "label_0" => return Some(Sentiment::Negative),
        "label_1" => return Some(Sentiment::Neutral),
        "label_2" => return Some(Sentiment::Positive),
        _ => {}
    }

    if label.contains("pos") {
        Some(Sentiment::Positive)
    } else if label.contains("neg") {
        Some(Sentiment::Negative)
    } else if label.contains("neu") {
        Some(Sentiment::Neutral)
    } else {
        None
    }
}

/// Словарный классификатор, используется когда ключ Hugging Face не задан.
#[derive(Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        LexiconClassifier
    }

    fn score(&self, text: &str) -> i32 {
        let positive_words = [
            "good", "great", "excellent", "amazing", "strong", "record", "positive",
            "bullish", "surge", "rally", "gain", "gains", "profit", "rise", "rises",
            "increase", "growth", "boom", "success", "breakthrough", "beat", "beats",
            "upgrade", "expands", "wins", "launch", "launches",
        ];

        let negative_words = [
            "bad", "terrible", "awful", "weak", "negative", "bearish", "crash", "plunge",
            "loss", "losses", "fall", "falls", "decline", "drop", "drops", "collapse",
            "ban", "lawsuit", "sued", "fine", "fined", "scandal", "recall", "layoffs",
            "cuts", "miss", "misses", "downgrade", "probe", "fraud",
        ];

        let negation_words = ["not", "never", "no", "without"];
        let text_lower = text.to_lowercase();
        let words: Vec<&str> = text_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut score = 0;
        for (i, word) in words.iter().enumerate() {
            let is_negated = i > 0 && negation_words.contains(&words[i - 1]);
            let sign = if is_negated { -1 } else { 1 };
            if positive_words.contains(word) {
                score += sign;
            }
            if negative_words.contains(word) {
                score -= sign;
            }
        }
        score
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let score = self.score(text);
        Ok(match score {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_indexed_labels() {
        assert_eq!(parse_label("positive"), Some(Sentiment::Positive));
        assert_eq!(parse_label("NEGATIVE"), Some(Sentiment::Negative));
        assert_eq!(parse_label("neutral"), Some(Sentiment::Neutral));
        assert_eq!(parse_label("LABEL_2"), Some(Sentiment::Positive));
        assert_eq!(parse_label("LABEL_0"), Some(Sentiment::Negative));
        assert_eq!(parse_label("mixed"), None);
    }

    #[test]
    fn picks_highest_scoring_label_from_nested_response() {
        let response = json!([[
            {"label": "neutral", "score": 0.2},
            {"label": "positive", "score": 0.7},
            {"label": "negative", "score": 0.1}
        ]]);
        assert_eq!(top_label(&response).as_deref(), Some("positive"));

        let flat = json!([{"label": "negative", "score": 0.9}]);
        assert_eq!(top_label(&flat).as_deref(), Some("negative"));

        assert_eq!(top_label(&json!({"error": "loading"})), None);
    }

    #[tokio::test]
    async fn lexicon_handles_negation() {
        let classifier = LexiconClassifier::new();
        assert_eq!(
            classifier.classify("Shares rally after record profit").await.unwrap(),
            Sentiment::Positive
        );
        assert_eq!(
            classifier.classify("Company announces layoffs amid losses").await.unwrap(),
            Sentiment::Negative
        );
        assert_eq!(
            classifier.classify("Results were not good").await.unwrap(),
            Sentiment::Negative
        );
        assert_eq!(
            classifier.classify("The board met on Tuesday").await.unwrap(),
            Sentiment::Neutral
        );
    }
}
