mod api;
mod case;
mod config;
mod export;
mod generation;

use crate::api::{build_api, AppState};
use crate::case::service::TestLibrary;
use crate::config::AppConfig;
use crate::export::SimulatedExporter;
use crate::generation::gemini::GeminiClient;
use crate::generation::review::ReviewSlot;
use crate::generation::service::Generator;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();
    info!("starting with {:?}", config);
    if config.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        warn!("API_KEY is not set, generation requests will be refused");
    }

    let client = GeminiClient::new(config.base_url.clone(), config.timeout()).map_err(|e| {
        error!("failed to build generation service client: {}", e);
        std::io::Error::other(e)
    })?;
    let shutdown = CancellationToken::new();
    let app_state = AppState {
        library: Arc::new(TestLibrary::seeded()),
        generator: Arc::new(Generator::new(Arc::new(client), config.generator_settings())),
        review: Arc::new(ReviewSlot::new()),
        exporter: Arc::new(SimulatedExporter::new("jira")),
        shutdown: shutdown.clone(),
    };

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("listening on {}", listener.local_addr()?);
    let router = build_api(app_state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
    shutdown.cancel();
}
