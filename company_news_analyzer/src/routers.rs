use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::errors::NewsAnalysisError;
use crate::holders::CACHE_TTL_SECS;
use crate::models::NewsReport;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub company: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub cache_size: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub cache_ttl_seconds: i64,
    pub available_endpoints: Vec<String>,
}

// Основной обработчик анализа новостей о компании
pub async fn company_news(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> Result<Json<NewsReport>, NewsAnalysisError> {
    match state.reports.handle(&params.company).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!("Ошибка анализа новостей о {}: {}", params.company, e);
            Err(e)
        }
    }
}

// Проверка здоровья сервиса
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        cache_size: state.cache.len().await,
    })
}

// Получение статуса сервиса
pub async fn get_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ready".to_string(),
        cache_ttl_seconds: CACHE_TTL_SECS,
        available_endpoints: vec![
            "/news?company=<name>".to_string(),
            "/healthcheck".to_string(),
            "/status".to_string(),
        ],
    })
}

// Создание маршрутов
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/news", get(company_news))
        .route("/healthcheck", get(health_check))
        .route("/status", get(get_status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
