pub mod health;
pub mod resume;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume record
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume)
                .put(resume::handle_save_resume)
                .delete(resume::handle_clear_resume),
        )
        .route("/api/v1/resume/edit", post(resume::handle_edit_resume))
        .route("/api/v1/resume/template", get(resume::handle_form_template))
        // Rendering and export
        .route("/api/v1/resume/preview", get(resume::handle_preview))
        .route("/api/v1/resume/print", get(resume::handle_print))
        .route("/api/v1/resume/snapshot.png", get(resume::handle_snapshot))
        .route("/api/v1/resume/export", get(resume::handle_export))
        .route("/api/v1/export/status", get(resume::handle_export_status))
        .fallback(not_found)
        .with_state(state)
}
