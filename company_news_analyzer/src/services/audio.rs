use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::Value;

use crate::errors::{NewsAnalysisError, Result};
use crate::models::AudioPayload;

/// Ограничение длины фрагмента для TTS-эндпоинта Google
const TTS_CHUNK_LIMIT: usize = 100;

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Возвращает MP3-байты.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct GoogleTranslator {
    client: Client,
    api_url: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        GoogleTranslator {
            client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.api_url,
            source,
            target,
            urlencoding::encode(text)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsAnalysisError::AudioFailure(format!(
                "Translate API error: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        // Ответ вида [[["перевод", "оригинал", ...], ...], ...]
        let segments = json[0].as_array().ok_or_else(|| {
            NewsAnalysisError::InvalidDataFormat("Некорректный ответ переводчика".to_string())
        })?;
        let translated: String = segments
            .iter()
            .filter_map(|segment| segment[0].as_str())
            .collect();

        if translated.trim().is_empty() {
            return Err(NewsAnalysisError::AudioFailure(
                "Переводчик вернул пустой текст".to_string(),
            ));
        }
        Ok(translated)
    }
}

#[derive(Clone)]
pub struct GoogleTtsSynthesizer {
    client: Client,
    api_url: String,
}

impl GoogleTtsSynthesizer {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        GoogleTtsSynthesizer {
            client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsSynthesizer {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = split_for_tts(text, TTS_CHUNK_LIMIT);
        let total = chunks.len();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let url = format!(
                "{}?ie=UTF-8&client=tw-ob&tl={}&total={}&idx={}&textlen={}&q={}",
                self.api_url,
                language,
                total,
                idx,
                chunk.chars().count(),
                urlencoding::encode(chunk)
            );

            let response = self
                .client
                .get(&url)
                .header("User-Agent", "Mozilla/5.0")
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(NewsAnalysisError::AudioFailure(format!(
                    "TTS API error: {}",
                    status
                )));
            }
            audio.extend_from_slice(&response.bytes().await?);
        }

        Ok(audio)
    }
}

/// Делит текст на фрагменты не длиннее `limit` символов по границам слов.
pub fn split_for_tts(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current_len > 0 && current_len + 1 + word_len > limit {
            chunks.push(std::mem::take(&mut current));
        }

        if word_len > limit {
            // Слово длиннее лимита режем как есть
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Перевод и озвучивание итоговой сводки. Никогда не возвращает ошибку.
#[derive(Clone)]
pub struct AudioService {
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    source_language: String,
    target_language: String,
}

impl AudioService {
    pub fn new(
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        AudioService {
            translator,
            synthesizer,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    pub async fn generate(&self, text: &str) -> AudioPayload {
        match self.try_generate(text).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Ошибка генерации аудио: {}", e);
                AudioPayload::Empty
            }
        }
    }

    async fn try_generate(&self, text: &str) -> Result<AudioPayload> {
        let translated = match self
            .translator
            .translate(text, &self.source_language, &self.target_language)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!("Перевод недоступен, озвучиваем исходный текст: {}", e);
                text.to_string()
            }
        };

        let language = if translated != text {
            &self.target_language
        } else {
            &self.source_language
        };

        let audio = self.synthesizer.synthesize(&translated, language).await?;
        if audio.is_empty() {
            return Ok(AudioPayload::Empty);
        }

        tracing::debug!("Сгенерировано {} байт аудио ({})", audio.len(), language);
        Ok(AudioPayload::Encoded(
            base64::engine::general_purpose::STANDARD.encode(audio),
        ))
    }
}
