use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::models::NewsReport;

/// Время жизни записи в кэше (15 минут)
pub const CACHE_TTL_SECS: i64 = 15 * 60;

/// Приводит название компании к ключу кэша: без пробелов по краям, в нижнем регистре.
pub fn normalize_cache_key(company: &str) -> String {
    company.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: NewsReport,
    timestamp: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp).num_seconds() < CACHE_TTL_SECS
    }
}

/// Кэш готовых отчётов. Ключи нормализует вызывающий код.
///
/// Свежесть проверяется при каждом чтении; `sweep` только освобождает память.
#[derive(Clone, Default)]
pub struct ResultCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        ResultCache {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &str, now: DateTime<Utc>) -> Option<NewsReport> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.data.clone())
    }

    pub async fn put(&self, key: String, data: NewsReport, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().await;
        entries.insert(key, CacheEntry { data, timestamp: now });
    }

    /// Удаляет все просроченные записи и возвращает их количество.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::info!("Из кэша удалено {} просроченных записей", removed);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_ignores_case_and_padding() {
        assert_eq!(normalize_cache_key("Tesla "), normalize_cache_key("tesla"));
        assert_eq!(normalize_cache_key("  MicroSoft\t"), "microsoft");
    }
}
