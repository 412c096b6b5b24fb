use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

pub mod config;
pub mod errors;
pub mod holders;
pub mod models;
pub mod routers;
pub mod services;

pub use config::AppConfig;
pub use errors::{NewsAnalysisError, Result};
pub use holders::{normalize_cache_key, ResultCache, CACHE_TTL_SECS};
pub use models::{
    AnalysisResult, AnalyzedArticle, AudioPayload, ComparativeSentimentScore, CoverageDifference,
    NewsReport, RawArticle, Sentiment, SentimentCounts, TopicOverlap,
};
pub use services::{
    ArticleProcessor, AudioService, GoogleTranslator, GoogleTtsSynthesizer, HuggingFaceClassifier,
    LexiconClassifier, NewsCollectorService, NewsFetcher, NewsReportService, SentimentClassifier,
    SpeechSynthesizer, Translator,
};
pub use config::load_config;

#[derive(Clone)]
pub struct AppState {
    pub reports: NewsReportService,
    pub cache: ResultCache,
}

impl AppState {
    pub fn new(reports: NewsReportService) -> Self {
        let cache = reports.cache().clone();
        AppState { reports, cache }
    }

    /// Собирает боевые реализации внешних сервисов по конфигурации.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs.unwrap_or(10)))
            .build()?;

        let newsapi_key = config
            .newsapi_key
            .clone()
            .filter(|key| !key.trim().is_empty());
        if newsapi_key.is_none() {
            tracing::warn!("NEWSAPI_KEY не задан, новости будут собираться только из RSS");
        }

        let fetcher = NewsCollectorService::new(
            client.clone(),
            config.newsapi_url.clone(),
            newsapi_key,
            config.google_news_rss_url.clone(),
            config.max_articles.unwrap_or(10),
        )?;

        let classifier: Arc<dyn SentimentClassifier> = match config
            .huggingface_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        {
            Some(key) => Arc::new(HuggingFaceClassifier::new(
                client.clone(),
                config.huggingface_api_url.clone(),
                key,
            )),
            None => {
                tracing::warn!("HUGGINGFACE_API_KEY не задан, используется словарный классификатор");
                Arc::new(LexiconClassifier::new())
            }
        };

        let processor =
            ArticleProcessor::new(classifier, config.max_concurrent_requests.unwrap_or(5));

        let audio = AudioService::new(
            Arc::new(GoogleTranslator::new(
                client.clone(),
                config.translate_api_url.clone(),
            )),
            Arc::new(GoogleTtsSynthesizer::new(client, config.tts_api_url.clone())),
            config.source_language.clone(),
            config.target_language.clone(),
        );

        let reports = NewsReportService::new(Arc::new(fetcher), processor, audio, ResultCache::new());
        Ok(AppState::new(reports))
    }
}
