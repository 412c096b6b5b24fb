use anyhow::Result;
use config::Config;
use std::env;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub newsapi_url: String,
    pub newsapi_key: Option<String>,
    pub google_news_rss_url: String,
    pub huggingface_api_url: String,
    pub huggingface_api_key: Option<String>,
    pub translate_api_url: String,
    pub tts_api_url: String,
    pub source_language: String,
    pub target_language: String,
    pub max_articles: Option<usize>,
    pub max_concurrent_requests: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub log_format: Option<String>,
    pub log_dir: Option<String>,
}

impl AppConfig {
    /// Валидация конфигурации
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() || self.target_language.trim().is_empty() {
            return Err(anyhow::anyhow!("source_language and target_language cannot be empty"));
        }

        if let Some(max_articles) = self.max_articles {
            if max_articles == 0 || max_articles > 100 {
                return Err(anyhow::anyhow!("max_articles must be between 1 and 100"));
            }
        }

        if let Some(max_concurrent) = self.max_concurrent_requests {
            if max_concurrent == 0 || max_concurrent > 50 {
                return Err(anyhow::anyhow!("max_concurrent_requests must be between 1 and 50"));
            }
        }

        if let Some(timeout) = self.request_timeout_secs {
            if timeout == 0 || timeout > 120 {
                return Err(anyhow::anyhow!("request_timeout_secs must be between 1 and 120"));
            }
        }

        if let Some(format) = self.log_format.as_deref() {
            if format != "text" && format != "json" {
                return Err(anyhow::anyhow!("log_format must be either \"text\" or \"json\""));
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

pub fn load_config() -> Result<AppConfig> {
    // Загружаем .env файл
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .set_default("server_host", "0.0.0.0")?
        .set_default("server_port", 7860)?
        .set_default("newsapi_url", "https://newsapi.org/v2/everything")?
        .set_default(
            "google_news_rss_url",
            "https://news.google.com/rss/search",
        )?
        .set_default(
            "huggingface_api_url",
            "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment-latest",
        )?
        .set_default(
            "translate_api_url",
            "https://translate.googleapis.com/translate_a/single",
        )?
        .set_default("tts_api_url", "https://translate.google.com/translate_tts")?
        .set_default("source_language", "en")?
        .set_default("target_language", "hi")?
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::with_prefix("NEWS_ANALYZER").try_parsing(true))
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // Ключи не обязательны: без них работаем через RSS и словарный классификатор
    if let Ok(key) = env::var("NEWSAPI_KEY") {
        config.newsapi_key = Some(key);
    }
    if let Ok(key) = env::var("HUGGINGFACE_API_KEY") {
        config.huggingface_api_key = Some(key);
    }

    config.validate()?;

    Ok(config)
}
