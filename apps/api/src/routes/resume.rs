use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::{run_export, ExportPreview};
use crate::models::resume::{FormEdit, ResumeData};
use crate::render::{render_document, RenderedDocument, Template};
use crate::state::AppState;
use crate::storage::{load_resume, save_resume};

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    pub template: Option<String>,
}

impl TemplateQuery {
    /// Falls back to the configured default when the parameter is absent.
    fn resolve(&self, default: Template) -> Result<Template, AppError> {
        match self.template.as_deref() {
            None | Some("") => Ok(default),
            Some(raw) => raw.parse().map_err(AppError::Validation),
        }
    }
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub document: RenderedDocument,
    #[serde(flatten)]
    pub export: ExportPreview,
}

async fn stored_resume(state: &AppState) -> Result<ResumeData, AppError> {
    load_resume(state.store.as_ref())
        .await?
        .ok_or(AppError::NoResume)
}

/// GET /api/v1/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
) -> Result<Json<ResumeData>, AppError> {
    Ok(Json(stored_resume(&state).await?))
}

/// PUT /api/v1/resume
/// Replaces the stored record wholesale.
pub async fn handle_save_resume(
    State(state): State<AppState>,
    Json(data): Json<ResumeData>,
) -> Result<StatusCode, AppError> {
    save_resume(state.store.as_ref(), &data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/resume
pub async fn handle_clear_resume(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.clear().await?;
    info!("Resume cleared from {} store", state.store.backend());
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resume/edit
/// Applies one form edit to the stored record (or to a fresh form when nothing
/// is stored yet), saves the result and returns it.
pub async fn handle_edit_resume(
    State(state): State<AppState>,
    Json(edit): Json<FormEdit>,
) -> Result<Json<ResumeData>, AppError> {
    let current = load_resume(state.store.as_ref())
        .await?
        .unwrap_or_else(ResumeData::form_template);
    let next = edit.apply(&current);
    save_resume(state.store.as_ref(), &next).await?;
    Ok(Json(next))
}

/// GET /api/v1/resume/template
/// Empty form with one placeholder row per repeatable group.
pub async fn handle_form_template() -> Json<ResumeData> {
    Json(ResumeData::form_template())
}

/// GET /api/v1/resume/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    let template = query.resolve(state.config.default_template)?;
    let data = stored_resume(&state).await?;
    let laid_out = state.exporter.layout(&data, template);
    Ok(Json(PreviewResponse {
        document: render_document(&data, template),
        export: state.exporter.preview(&laid_out),
    }))
}

/// GET /api/v1/resume/print
pub async fn handle_print(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Html<String>, AppError> {
    let template = query.resolve(state.config.default_template)?;
    let data = stored_resume(&state).await?;
    let html = state
        .html
        .render_print_html(&render_document(&data, template))
        .map_err(|e| anyhow::anyhow!("print view render failed: {e}"))?;
    Ok(Html(html))
}

/// GET /api/v1/resume/snapshot.png
pub async fn handle_snapshot(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Response, AppError> {
    let template = query.resolve(state.config.default_template)?;
    let data = stored_resume(&state).await?;
    let png = state.exporter.snapshot_png(&data, template).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], Bytes::from(png)).into_response())
}

/// GET /api/v1/resume/export
/// Rejects with 409 while another export is generating.
pub async fn handle_export(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Response, AppError> {
    let template = query.resolve(state.config.default_template)?;
    let data = stored_resume(&state).await?;

    let Some(artifact) = run_export(&state.export_status, &state.exporter, &data, template).await?
    else {
        warn!("Export requested while another export is generating");
        return Err(AppError::Conflict(
            "An export is already being generated".to_string(),
        ));
    };

    let disposition = HeaderValue::from_str(&content_disposition(&artifact.filename))
        .map_err(|e| anyhow::anyhow!("invalid Content-Disposition: {e}"))?;

    let mut response = Response::new(Body::from(artifact.bytes));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert("x-page-count", HeaderValue::from(artifact.page_count));
    headers.insert(
        "x-export-id",
        HeaderValue::from_str(&artifact.id.to_string())
            .map_err(|e| anyhow::anyhow!("invalid export id header: {e}"))?,
    );
    Ok(response)
}

/// GET /api/v1/export/status
pub async fn handle_export_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "generating": state.export_status.is_generating() }))
}

/// `attachment` with an ASCII `filename` plus an RFC 5987 `filename*` carrying
/// the exact UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    if ascii == filename {
        return format!("attachment; filename=\"{filename}\"");
    }
    format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::to_bytes, http::Request, Router};
    use tower::ServiceExt;

    use crate::config::{Config, StoreBackend};
    use crate::export::glyph::FontLibrary;
    use crate::export::{ExportSettings, ExportStatus, Exporter};
    use crate::render::html::HtmlRenderer;
    use crate::layout::PageFormat;
    use crate::routes::build_router;
    use crate::storage::{MemoryStore, ResumeStore};

    fn test_state() -> AppState {
        let config = Config {
            store: StoreBackend::Memory,
            storage_key: "resume_data_v1".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            page_format: PageFormat::A4,
            raster_scale: 2.0,
            default_template: Template::Classic,
        };
        AppState {
            store: Arc::new(MemoryStore::default()),
            config,
            exporter: Exporter::new(Arc::new(FontLibrary::empty()), ExportSettings::default()),
            export_status: Arc::new(ExportStatus::default()),
            html: Arc::new(HtmlRenderer::new().unwrap()),
        }
    }

    const SAMPLE: &str = r#"{
        "personalInfo": { "name": "Jane Q. Doe", "email": "jane@example.com" },
        "education": [{ "degree": "BSc", "university": "State", "year": "2018" }],
        "experience": [{ "title": "Engineer", "company": "Acme", "duration": "2019 - now" }]
    }"#;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_returns_no_resume() {
        let app = build_router(test_state());
        let response = send(&app, "GET", "/api/v1/resume", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NO_RESUME");
    }

    #[tokio::test]
    async fn test_malformed_store_reads_as_empty() {
        let state = test_state();
        state.store.write_raw("{not json".to_string()).await.unwrap();
        let app = build_router(state);
        let response = send(&app, "GET", "/api/v1/resume/preview", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let app = build_router(test_state());
        let saved = send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        assert_eq!(saved.status(), StatusCode::NO_CONTENT);

        let loaded = body_json(send(&app, "GET", "/api/v1/resume", None).await).await;
        assert_eq!(loaded["personalInfo"]["name"], "Jane Q. Doe");
        assert_eq!(loaded["education"][0]["university"], "State");
        assert_eq!(loaded["skills"], json!([]));
    }

    #[tokio::test]
    async fn test_delete_clears_store() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        let cleared = send(&app, "DELETE", "/api/v1/resume", None).await;
        assert_eq!(cleared.status(), StatusCode::NO_CONTENT);
        let response = send(&app, "GET", "/api/v1/resume", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_form_template_has_placeholder_rows() {
        let app = build_router(test_state());
        let body = body_json(send(&app, "GET", "/api/v1/resume/template", None).await).await;
        assert_eq!(body["education"].as_array().unwrap().len(), 1);
        assert_eq!(body["experience"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_starts_from_form_template() {
        let app = build_router(test_state());
        let edit = r#"{"op":"set_education","index":0,"field":"degree","value":"MSc"}"#;
        let body = body_json(send(&app, "POST", "/api/v1/resume/edit", Some(edit)).await).await;
        assert_eq!(body["education"][0]["degree"], "MSc");
        assert_eq!(body["experience"].as_array().unwrap().len(), 1);

        let stored = body_json(send(&app, "GET", "/api/v1/resume", None).await).await;
        assert_eq!(stored["education"][0]["degree"], "MSc");
    }

    #[tokio::test]
    async fn test_preview_reports_entries_and_pages() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        let body = body_json(send(&app, "GET", "/api/v1/resume/preview?template=modern", None).await).await;
        assert_eq!(body["document"]["template"], "modern");
        assert_eq!(body["predicted_pages"], 1);
        assert!(body["layout_height"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_unknown_template_is_validation_error() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        let response = send(&app, "GET", "/api/v1/resume/print?template=fancy", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_print_returns_html() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        let response = send(&app, "GET", "/api/v1/resume/print", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Jane Q. Doe"));
        assert!(html.contains("@media print"));
    }

    #[tokio::test]
    async fn test_export_returns_pdf_with_headers() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        let response = send(&app, "GET", "/api/v1/resume/export", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Q._Doe_Resume.pdf\""
        );
        assert_eq!(headers["x-page-count"], "1");
        assert!(headers.contains_key("x-export-id"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let app = build_router(test_state());
        let response = send(&app, "GET", "/api/v1/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_export_without_data_is_no_resume() {
        let app = build_router(test_state());
        let response = send(&app, "GET", "/api/v1/resume/export", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_while_busy_conflicts() {
        let state = test_state();
        let status = Arc::clone(&state.export_status);
        let app = build_router(state);
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;

        let guard = status.try_begin().unwrap();
        let busy = body_json(send(&app, "GET", "/api/v1/export/status", None).await).await;
        assert_eq!(busy["generating"], true);

        let response = send(&app, "GET", "/api/v1/resume/export", None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        drop(guard);
        let idle = body_json(send(&app, "GET", "/api/v1/export/status", None).await).await;
        assert_eq!(idle["generating"], false);
    }

    #[tokio::test]
    async fn test_snapshot_is_png() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        let response = send(&app, "GET", "/api/v1/resume/snapshot.png", None).await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_exported_pdf_written_to_disk_reloads() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume", Some(SAMPLE)).await;
        let response = send(&app, "GET", "/api/v1/resume/export?template=minimal", None).await;
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Jane_Q._Doe_Resume.pdf");
        std::fs::write(&path, &bytes).unwrap();
        let doc = lopdf::Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_content_disposition_non_ascii_name() {
        let value = content_disposition("Ana_Müller_Resume.pdf");
        assert_eq!(
            value,
            "attachment; filename=\"Ana_M_ller_Resume.pdf\"; filename*=UTF-8''Ana_M%C3%BCller_Resume.pdf"
        );
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
