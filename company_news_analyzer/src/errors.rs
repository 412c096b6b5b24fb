// errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum NewsAnalysisError {
    #[error("Ошибка получения новостей: {0}")]
    FetchFailure(String),

    #[error("Ошибка классификации настроения: {0}")]
    ClassificationFailure(String),

    #[error("Ошибка синтеза аудио: {0}")]
    AudioFailure(String),

    #[error("Некорректный запрос: {0}")]
    InvalidRequest(String),

    #[error("Ошибка HTTP запроса: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Ошибка regex: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Ошибка выполнения задачи: {0}")]
    TaskError(#[from] JoinError),

    #[error("Некорректный формат данных: {0}")]
    InvalidDataFormat(String),

    #[error("API вернул ошибку: {0}")]
    ApiError(String),
}

// Определяем псевдоним Result с фиксированным типом ошибки
pub type Result<T> = std::result::Result<T, NewsAnalysisError>;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl NewsAnalysisError {
    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            NewsAnalysisError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            NewsAnalysisError::FetchFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "fetch_failure")
            }
            NewsAnalysisError::ClassificationFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "classification_failure")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for NewsAnalysisError {
    fn into_response(self) -> Response {
        let (status, error) = self.kind();
        let body = ErrorBody {
            error,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
