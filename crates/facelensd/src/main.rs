use anyhow::Result;
use facelens_core::Overlay;
use facelens_rekognition::{ClientSettings, RekognitionAnalyzer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod intake;
mod page;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("facelensd starting");

    let config = config::Config::from_env();
    let settings = ClientSettings::resolve(config.region.clone(), config.secrets_path.as_deref())?;
    let analyzer = RekognitionAnalyzer::connect(&settings).await;

    let overlay = if config.overlay_enabled {
        Some(Overlay::load_or_bitmap(config.font_path.as_deref()))
    } else {
        tracing::info!("overlay disabled via FACELENS_OVERLAY_ENABLED=0");
        None
    };

    let app = Arc::new(controller::App::new(
        analyzer,
        overlay,
        config.similarity_threshold,
    ));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, region = %settings.region, "facelensd ready");

    axum::serve(listener, routes::router(app, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("facelensd shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
}
