use std::sync::Arc;

use crate::config::Config;
use crate::export::{ExportStatus, Exporter};
use crate::render::html::HtmlRenderer;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single-slot store for the current resume. Redis or in-memory.
    pub store: Arc<dyn ResumeStore>,
    pub config: Config,
    pub exporter: Exporter,
    /// "Generating" flag; at most one export runs at a time.
    pub export_status: Arc<ExportStatus>,
    /// Compiled print-view templates.
    pub html: Arc<HtmlRenderer>,
}
