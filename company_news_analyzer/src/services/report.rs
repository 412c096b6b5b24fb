use std::sync::Arc;

use chrono::Utc;

use crate::errors::{NewsAnalysisError, Result};
use crate::holders::{normalize_cache_key, ResultCache};
use crate::models::{AudioPayload, NewsReport};
use crate::services::audio::AudioService;
use crate::services::collector::NewsFetcher;
use crate::services::processor::ArticleProcessor;

/// Полный цикл обработки запроса: кэш → сбор → анализ → озвучивание → кэш.
#[derive(Clone)]
pub struct NewsReportService {
    fetcher: Arc<dyn NewsFetcher>,
    processor: ArticleProcessor,
    audio: AudioService,
    cache: ResultCache,
}

impl NewsReportService {
    pub fn new(
        fetcher: Arc<dyn NewsFetcher>,
        processor: ArticleProcessor,
        audio: AudioService,
        cache: ResultCache,
    ) -> Self {
        NewsReportService {
            fetcher,
            processor,
            audio,
            cache,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub async fn handle(&self, company: &str) -> Result<NewsReport> {
        if company.trim().is_empty() {
            return Err(NewsAnalysisError::InvalidRequest(
                "Название компании не может быть пустым".to_string(),
            ));
        }

        let cache_key = normalize_cache_key(company);
        let now = Utc::now();

        if let Some(cached) = self.cache.get(&cache_key, now).await {
            tracing::info!("Отчёт по {} взят из кэша", cache_key);
            return Ok(cached);
        }

        tracing::info!("Начинаем анализ новостей о {}", company);

        let articles = {
            let fetcher = Arc::clone(&self.fetcher);
            let query = company.to_string();
            tokio::spawn(async move { fetcher.fetch(&query).await }).await??
        };

        if articles.is_empty() {
            tracing::info!("Новостей о {} не найдено", company);
            let report = NewsReport::empty(company);
            self.cache.put(cache_key, report.clone(), now).await;
            return Ok(report);
        }

        let analysis = self.processor.process(&articles, company).await?;

        let audio = {
            let audio = self.audio.clone();
            let summary = analysis.final_sentiment_summary.clone();
            match tokio::spawn(async move { audio.generate(&summary).await }).await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Задача синтеза аудио завершилась аварийно: {}", e);
                    AudioPayload::Empty
                }
            }
        };

        if audio.is_empty() {
            tracing::info!("Отчёт по {} будет отдан без аудио", company);
        }

        let report = NewsReport::from_analysis(company, analysis, audio);
        self.cache.put(cache_key, report.clone(), now).await;

        tracing::info!("Анализ новостей о {} успешно завершен", company);
        Ok(report)
    }
}
