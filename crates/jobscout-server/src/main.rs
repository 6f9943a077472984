use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use jobscout_client::{
    GoogleJobsAdapter, HttpDescriptionFetcher, JsearchAdapter, JsearchClient,
    LinkedinScrapeAdapter, OpenAiOracle,
};
use jobscout_core::cache::ResultCache;
use jobscout_core::config::SearchConfig;
use jobscout_core::pipeline::SearchService;
use jobscout_server::routes;
use jobscout_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobscout=info".parse()?))
        .with_target(false)
        .init();

    let jsearch_key =
        std::env::var("JSEARCH_API_KEY").expect("JSEARCH_API_KEY must be set");
    let jobs_api_key = std::env::var("JOBS_API_KEY").expect("JOBS_API_KEY must be set");
    let oracle_key =
        std::env::var("JOBSCOUT_ORACLE_API_KEY").expect("JOBSCOUT_ORACLE_API_KEY must be set");
    let oracle_model = std::env::var("JOBSCOUT_ORACLE_MODEL")
        .unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let oracle_base_url = std::env::var("JOBSCOUT_ORACLE_BASE_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let port = std::env::var("JOBSCOUT_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let config = SearchConfig::from_env()?;
    let cache = ResultCache::new(config.cache_capacity, config.cache_ttl);

    let jsearch = JsearchClient::new(&jsearch_key)?;
    let service = SearchService::new(
        JsearchAdapter::linkedin(jsearch.clone()),
        LinkedinScrapeAdapter::new()?,
        JsearchAdapter::indeed(jsearch.clone()),
        GoogleJobsAdapter::new(&jobs_api_key)?,
        HttpDescriptionFetcher::new(jsearch)?,
        OpenAiOracle::with_base_url(&oracle_key, &oracle_model, &oracle_base_url)?,
        config,
    )
    .with_cache(cache);

    let state = Arc::new(AppState::new(service));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received");
}
