//! Paginator/exporter: laid-out document → raster capture → paginated PDF.
//!
//! # Flow
//! 1. Render and lay out (cheap, on the calling task).
//! 2. Capture at `scale`× and assemble the PDF inside `spawn_blocking`; both
//!    are CPU-bound and must not stall the async executor.
//! 3. Return the bytes with a derived filename.
//!
//! Only one export runs at a time. `ExportStatus` holds the "generating" flag;
//! a `BusyGuard` sets it and clears it on drop. The guard is moved into the
//! blocking job, so the flag stays set until the CPU work has really finished,
//! even if the request that started it is dropped.

pub mod filename;
pub mod glyph;
pub mod paginate;
pub mod pdf;
pub mod raster;

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::{ImageFormat, RgbImage};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::export::filename::derive_filename;
use crate::export::glyph::FontLibrary;
use crate::export::paginate::plan_pages;
use crate::layout::{layout_document, DocumentGeometry, LaidOutDocument, PageFormat};
use crate::models::resume::ResumeData;
use crate::render::{render_document, Template};

/// Smallest oversampling factor that still prints sharply.
pub const MIN_RASTER_SCALE: f32 = 2.0;

/// Largest oversampling factor; ten pages at 4× is already ~400 MB of RGB.
pub const MAX_RASTER_SCALE: f32 = 4.0;

/// Tallest document that will be captured, in CSS pixels: roughly ten A4
/// pages at the 780 px document width, whatever the scale.
pub const DEFAULT_MAX_DOCUMENT_HEIGHT: f32 = 11_100.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Rasterization failed: {0}")]
    Raster(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export task failed: {0}")]
    Task(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Busy state
// ────────────────────────────────────────────────────────────────────────────

/// Process-wide "an export is generating" flag.
#[derive(Debug, Default)]
pub struct ExportStatus {
    generating: AtomicBool,
}

impl ExportStatus {
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Marks an export as started. Returns `None` if one is already running;
    /// the caller must reject the request rather than queue it.
    pub fn try_begin(self: &Arc<Self>) -> Option<BusyGuard> {
        self.generating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard {
                status: Arc::clone(self),
            })
    }
}

/// Clears the generating flag when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    status: Arc<ExportStatus>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.status.generating.store(false, Ordering::SeqCst);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Exporter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    pub format: PageFormat,
    pub scale: f32,
    pub geometry: DocumentGeometry,
    pub max_document_height: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            scale: MIN_RASTER_SCALE,
            geometry: DocumentGeometry::default(),
            max_document_height: DEFAULT_MAX_DOCUMENT_HEIGHT,
        }
    }
}

/// A finished export. Not retained after it is sent.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub id: Uuid,
    pub filename: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

/// Summary returned alongside previews.
#[derive(Debug, Clone, Serialize)]
pub struct ExportPreview {
    pub layout_width: f32,
    pub layout_height: f32,
    pub predicted_pages: usize,
}

#[derive(Clone)]
pub struct Exporter {
    fonts: Arc<FontLibrary>,
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(fonts: Arc<FontLibrary>, settings: ExportSettings) -> Self {
        Self { fonts, settings }
    }

    pub fn layout(&self, data: &ResumeData, template: Template) -> LaidOutDocument {
        let doc = render_document(data, template);
        layout_document(&doc, &self.settings.geometry)
    }

    pub fn preview(&self, laid_out: &LaidOutDocument) -> ExportPreview {
        ExportPreview {
            layout_width: laid_out.width,
            layout_height: laid_out.height,
            predicted_pages: paginate::predict_page_count(
                laid_out.width,
                laid_out.height,
                self.settings.scale,
                self.settings.format,
            ),
        }
    }

    /// Renders, captures and paginates `data` into a PDF.
    pub async fn export(
        &self,
        data: &ResumeData,
        template: Template,
    ) -> Result<ExportArtifact, ExportError> {
        self.export_holding(data, template, None).await
    }

    /// Same as [`Exporter::export`], but `guard` lives inside the blocking job
    /// and is released only when the capture and PDF assembly have finished.
    async fn export_holding(
        &self,
        data: &ResumeData,
        template: Template,
        guard: Option<BusyGuard>,
    ) -> Result<ExportArtifact, ExportError> {
        let id = Uuid::new_v4();
        let filename = derive_filename(data.display_name());
        let laid_out = self.layout(data, template);
        let fonts = Arc::clone(&self.fonts);
        let settings = self.settings;

        info!(%id, %template, "Export started ({} px tall)", laid_out.height);

        let (bytes, page_count) = spawn_holding(guard, move || {
            let image = raster::rasterize(
                &laid_out,
                &fonts,
                settings.scale,
                settings.max_document_height,
            )?;
            let plan = plan_pages(image.width(), image.height(), settings.format);
            let bytes = pdf::build_pdf(&image, &plan)?;
            Ok::<_, ExportError>((bytes, plan.page_count()))
        })
        .await
        .map_err(|e| ExportError::Task(format!("spawn_blocking failed in export: {e}")))??;

        info!(%id, "Export finished: {filename}, {page_count} page(s), {} bytes", bytes.len());
        Ok(ExportArtifact {
            id,
            filename,
            page_count,
            bytes,
        })
    }

    /// The raw capture as PNG, for inspecting exactly what gets paginated.
    pub async fn snapshot_png(
        &self,
        data: &ResumeData,
        template: Template,
    ) -> Result<Vec<u8>, ExportError> {
        let laid_out = self.layout(data, template);
        let fonts = Arc::clone(&self.fonts);
        let settings = self.settings;

        tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ExportError> {
            let image: RgbImage = raster::rasterize(
                &laid_out,
                &fonts,
                settings.scale,
                settings.max_document_height,
            )?;
            let mut png = Cursor::new(Vec::new());
            image.write_to(&mut png, ImageFormat::Png)?;
            Ok(png.into_inner())
        })
        .await
        .map_err(|e| ExportError::Task(format!("spawn_blocking failed in snapshot: {e}")))?
    }
}

/// Runs `work` on the blocking pool; `guard` is dropped when `work` returns.
fn spawn_holding<T, F>(guard: Option<BusyGuard>, work: F) -> tokio::task::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        work()
    })
}

/// Runs one export under the busy flag.
///
/// Returns `Ok(None)` without doing any work when another export is already
/// generating. The flag is clear again once the export's blocking work has
/// finished, even if the returned future is dropped before that.
pub async fn run_export(
    status: &Arc<ExportStatus>,
    exporter: &Exporter,
    data: &ResumeData,
    template: Template,
) -> Result<Option<ExportArtifact>, ExportError> {
    let Some(guard) = status.try_begin() else {
        return Ok(None);
    };
    exporter
        .export_holding(data, template, Some(guard))
        .await
        .map(Some)
}
