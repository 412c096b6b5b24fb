use std::net::SocketAddr;

use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use company_news_analyzer::routers::create_routes;
use company_news_analyzer::{load_config, AppConfig, AppState};

/// Настройка структурированного логирования. Guard нужно держать до выхода.
fn init_tracing(config: &AppConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("company_news_analyzer=info,warn"));
    let json = config.log_format.as_deref() == Some("json");

    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let json_layer = json.then(|| fmt::layer().json().with_current_span(false));

    let (file_layer, guard) = match config.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "company_news_analyzer.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Не удалось установить обработчик сигнала: {}", e);
    }
    tracing::info!("Получен сигнал завершения");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _guard = init_tracing(&config);

    let state = AppState::from_config(&config)?;
    let cache = state.cache.clone();
    cache.sweep(Utc::now()).await;

    let app = create_routes(state);
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Сервер запущен на http://{}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let removed = cache.sweep(Utc::now()).await;
    tracing::info!("Сервер остановлен, очищено {} записей кэша", removed);
    Ok(())
}
