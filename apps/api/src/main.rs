mod config;
mod errors;
mod export;
mod layout;
mod models;
mod render;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::export::glyph::FontLibrary;
use crate::export::{ExportSettings, ExportStatus, Exporter};
use crate::render::html::HtmlRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{MemoryStore, RedisStore, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ResumeStore> = match &config.store {
        StoreBackend::Memory => Arc::new(MemoryStore::default()),
        StoreBackend::Redis { url } => {
            let client = redis::Client::open(url.as_str())?;
            Arc::new(RedisStore::connect(client, config.storage_key.clone()).await?)
        }
    };
    info!("Resume store initialized ({}, key {})", store.backend(), config.storage_key);

    // Font discovery walks the system font dirs; keep it off the executor
    let fonts = tokio::task::spawn_blocking(FontLibrary::load_system).await?;
    if fonts.is_empty() {
        info!("No system fonts matched; exports will use placeholder glyphs");
    }

    let settings = ExportSettings {
        format: config.page_format,
        scale: config.raster_scale,
        ..Default::default()
    };
    info!("Export settings: {:?} at {}x", settings.format, settings.scale);

    let state = AppState {
        store,
        config: config.clone(),
        exporter: Exporter::new(Arc::new(fonts), settings),
        export_status: Arc::new(ExportStatus::default()),
        html: Arc::new(HtmlRenderer::new()?),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
