// Layout: measures and positions the rendered block tree at a fixed width.
// Pure and deterministic; runs before capture so the rasterizer only ever sees
// a finished layout.

pub mod engine;
pub mod font_metrics;
pub mod page;

pub use engine::{layout_document, LaidOut, LaidOutDocument, TextRun};
pub use font_metrics::{get_metrics, FontFamily};
pub use page::{DocumentGeometry, PageFormat};
