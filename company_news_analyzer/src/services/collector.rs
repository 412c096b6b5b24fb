use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::errors::{NewsAnalysisError, Result};
use crate::models::RawArticle;

/// Источник новостей о компании.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    /// Может вернуть пустой список, если о компании ничего не пишут.
    async fn fetch(&self, company: &str) -> Result<Vec<RawArticle>>;
}

/// Словарь тем: название темы и шаблон ключевых слов.
const TOPIC_VOCABULARY: &[(&str, &str)] = &[
    ("AI", r"\b(ai|artificial intelligence|machine learning|chatbot|generative)\b"),
    ("Earnings", r"\b(earnings|revenue|quarterly|profit|results|eps)\b"),
    ("Layoffs", r"\b(layoffs?|job cuts|redundanc(y|ies)|workforce reduction)\b"),
    ("Regulation", r"\b(regulat\w*|antitrust|compliance|ftc|sec|eu commission)\b"),
    ("Stock Market", r"\b(shares|stock|investors?|market cap|nasdaq|nyse)\b"),
    ("Mergers & Acquisitions", r"\b(merger|acquisition|acquires?|takeover|buyout|deal)\b"),
    ("Electric Vehicles", r"\b(ev|evs|electric vehicles?|battery|charging)\b"),
    ("Lawsuits", r"\b(lawsuit|sued|court|litigation|settlement|trial)\b"),
    ("Leadership", r"\b(ceo|cfo|executive|board|chairman|resign\w*|appoint\w*)\b"),
    ("Product Launch", r"\b(launch\w*|unveil\w*|new model|release[sd]?|rollout)\b"),
    ("Supply Chain", r"\b(supply chain|shortage|chips?|semiconductor|factory|production)\b"),
    ("Cybersecurity", r"\b(hack\w*|breach|cyber\w*|ransomware|data leak)\b"),
    ("Partnerships", r"\b(partnership|partners? with|collaborat\w*|alliance)\b"),
    ("Economy", r"\b(inflation|interest rates?|recession|tariffs?|economy)\b"),
    ("Sustainability", r"\b(climate|emissions|renewable|sustainab\w*|carbon)\b"),
];

/// Определяет темы статьи по словарю ключевых слов.
pub struct TopicExtractor {
    patterns: Vec<(&'static str, Regex)>,
}

impl TopicExtractor {
    pub fn new() -> Result<Self> {
        let patterns = TOPIC_VOCABULARY
            .iter()
            .map(|(topic, pattern)| -> Result<(&'static str, Regex)> {
                Ok((*topic, Regex::new(&format!("(?i){}", pattern))?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TopicExtractor { patterns })
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(topic, _)| topic.to_string())
            .collect()
    }
}

/// Убирает HTML-теги, ссылки и лишние пробелы.
pub struct TextCleaner {
    html: Regex,
    url: Regex,
    whitespace: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self> {
        Ok(TextCleaner {
            html: Regex::new(r"<[^>]+>")?,
            url: Regex::new(r"http\S+|www\.\S+")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        let cleaned = self.html.replace_all(text, " ");
        let cleaned = self.url.replace_all(&cleaned, " ");
        let cleaned = self.whitespace.replace_all(&cleaned, " ");
        cleaned.trim().to_string()
    }
}

#[derive(Clone)]
pub struct NewsCollectorService {
    client: Client,
    newsapi_url: String,
    newsapi_key: Option<String>,
    rss_url: String,
    max_articles: usize,
    topics: Arc<TopicExtractor>,
    cleaner: Arc<TextCleaner>,
}

impl NewsCollectorService {
    pub fn new(
        client: Client,
        newsapi_url: impl Into<String>,
        newsapi_key: Option<String>,
        rss_url: impl Into<String>,
        max_articles: usize,
    ) -> Result<Self> {
        Ok(NewsCollectorService {
            client,
            newsapi_url: newsapi_url.into(),
            newsapi_key,
            rss_url: rss_url.into(),
            max_articles,
            topics: Arc::new(TopicExtractor::new()?),
            cleaner: Arc::new(TextCleaner::new()?),
        })
    }

    async fn collect(&self, company: &str) -> Result<Vec<RawArticle>> {
        if self.newsapi_key.is_some() {
            match self.collect_from_newsapi(company).await {
                Ok(articles) => {
                    tracing::info!("Через NewsAPI собрано {} статей о {}", articles.len(), company);
                    return Ok(articles);
                }
                Err(e) => {
                    tracing::warn!("NewsAPI недоступен: {}", e);
                    tracing::info!("Переходим к Google News RSS");
                }
            }
        }

        let articles = self.collect_from_rss(company).await?;
        tracing::info!("Через RSS собрано {} статей о {}", articles.len(), company);
        Ok(articles)
    }

    async fn collect_from_newsapi(&self, company: &str) -> Result<Vec<RawArticle>> {
        let api_key = self.newsapi_key.as_deref().unwrap_or_default();
        let url = format!(
            "{}?q={}&language=en&sortBy=publishedAt&pageSize={}&apiKey={}",
            self.newsapi_url,
            urlencoding::encode(&format!("\"{}\"", company.trim())),
            self.max_articles,
            api_key
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Неизвестная ошибка".to_string());
            return Err(NewsAnalysisError::ApiError(format!(
                "NewsAPI error: {} - {}",
                status, error_text
            )));
        }

        let json: Value = response.json().await?;
        let articles = json["articles"].as_array().ok_or_else(|| {
            NewsAnalysisError::InvalidDataFormat("Отсутствует поле articles".to_string())
        })?;

        let entries = articles.iter().map(|article| {
            let title = article["title"].as_str().unwrap_or("").to_string();
            let summary = article["description"]
                .as_str()
                .or_else(|| article["content"].as_str())
                .unwrap_or("")
                .to_string();
            (title, summary)
        });

        self.build_articles(company, entries)
    }

    async fn collect_from_rss(&self, company: &str) -> Result<Vec<RawArticle>> {
        let url = format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            self.rss_url,
            urlencoding::encode(company.trim())
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsAnalysisError::ApiError(format!(
                "Google News RSS error: {}",
                status
            )));
        }
        let content = response.bytes().await?;

        let feed = feed_rs::parser::parse(&content[..])
            .map_err(|e| NewsAnalysisError::InvalidDataFormat(format!("RSS parse error: {}", e)))?;

        let entries = feed.entries.iter().map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.clone())
                .unwrap_or_default();
            let summary = entry
                .summary
                .as_ref()
                .map(|text| text.content.clone())
                .or_else(|| entry.content.as_ref().and_then(|content| content.body.clone()))
                .unwrap_or_default();
            (title, summary)
        });

        self.build_articles(company, entries)
    }

    /// Чистит текст, отбрасывает дубликаты и статьи без упоминания компании.
    fn build_articles(
        &self,
        company: &str,
        entries: impl Iterator<Item = (String, String)>,
    ) -> Result<Vec<RawArticle>> {
        let company_regex = Regex::new(&format!(r"(?i){}", regex::escape(company.trim())))?;
        let mut seen_titles = HashSet::new();
        let mut articles = Vec::new();

        for (title, summary) in entries {
            if articles.len() >= self.max_articles {
                break;
            }

            let title = self.cleaner.clean(&title);
            let mut summary = self.cleaner.clean(&summary);
            if title.is_empty() {
                continue;
            }
            if summary.is_empty() {
                summary = title.clone();
            }
            if !company_regex.is_match(&title) && !company_regex.is_match(&summary) {
                tracing::debug!("Пропущена статья без упоминания компании: {}", title);
                continue;
            }
            if !seen_titles.insert(title.to_lowercase()) {
                continue;
            }

            let topics = self.topics.extract(&format!("{} {}", title, summary));
            articles.push(RawArticle::new(title, summary, topics));
        }

        Ok(articles)
    }
}

#[async_trait]
impl NewsFetcher for NewsCollectorService {
    async fn fetch(&self, company: &str) -> Result<Vec<RawArticle>> {
        self.collect(company).await.map_err(|e| match e {
            NewsAnalysisError::FetchFailure(_) => e,
            other => NewsAnalysisError::FetchFailure(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_markup_and_links() {
        let cleaner = TextCleaner::new().unwrap();
        let cleaned = cleaner.clean("<p>Tesla   shares <b>rise</b></p> see https://example.com/x");
        assert_eq!(cleaned, "Tesla shares rise see");
    }

    #[test]
    fn extracts_topics_from_vocabulary() {
        let extractor = TopicExtractor::new().unwrap();
        let topics = extractor.extract("Tesla announces layoffs as AI push reshapes the workforce");
        assert!(topics.contains(&"AI".to_string()));
        assert!(topics.contains(&"Layoffs".to_string()));
        assert!(!topics.contains(&"Cybersecurity".to_string()));
    }

    #[test]
    fn builds_filtered_deduplicated_articles() {
        let service = NewsCollectorService::new(
            Client::new(),
            "http://localhost/newsapi",
            None,
            "http://localhost/rss",
            10,
        )
        .unwrap();

        let entries = vec![
            ("Tesla beats earnings".to_string(), "<p>Tesla revenue grew</p>".to_string()),
            ("TESLA BEATS EARNINGS".to_string(), "duplicate".to_string()),
            ("Ford recalls trucks".to_string(), "Unrelated story".to_string()),
            ("Tesla unveils robotaxi".to_string(), String::new()),
        ];

        let articles = service.build_articles("tesla", entries.into_iter()).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].summary, "Tesla revenue grew");
        assert!(articles[0].topics.contains(&"Earnings".to_string()));
        assert_eq!(articles[1].summary, "Tesla unveils robotaxi");
    }
}
