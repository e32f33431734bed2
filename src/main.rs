use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academy::api::router;
use academy::catalog::HttpCoursesClient;
use academy::config::AppConfig;
use academy::services::KeepAlive;
use academy::state::AppState;
use academy::upload::{HttpImageHost, UploadPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "academy=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let courses = Arc::new(HttpCoursesClient::new(config.courses_api_url.clone())?);
    let host = Arc::new(HttpImageHost::new(config.image_host.clone())?);
    let state = AppState::new(courses, UploadPipeline::new(host));

    // First catalog load happens in the background; `/courses` reports `loading` until it settles.
    {
        let state = state.clone();
        tokio::spawn(async move {
            state.refresh_catalog().await;
        });
    }

    match &config.keepalive_url {
        Some(url) => {
            let pinger = KeepAlive::new(url.clone(), config.keepalive_interval)?;
            tokio::spawn(pinger.start());
        }
        None => warn!("KEEPALIVE_URL is not set, keep-alive ping disabled"),
    }

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
