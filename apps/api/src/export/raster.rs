//! Capture: paints a laid-out document into an RGB image.
//!
//! The capture covers the document's full natural width and height (not a
//! viewport) at `scale` device pixels per CSS pixel, on a white background.

use image::{Rgb as Pixel, RgbImage};
use tracing::debug;

use crate::export::glyph::{
    fill_edges, fill_rect, FaceStyle, FontLibrary, GlyphTransform, OutlineCollector,
};
use crate::export::ExportError;
use crate::layout::{get_metrics, LaidOut, LaidOutDocument, TextRun};
use crate::layout::font_metrics::{FontMetricTable, BOLD_WIDTH_FACTOR};
use crate::render::Rgb;

/// Shear used when an italic run has no italic face.
const SYNTHETIC_ITALIC_SKEW: f32 = 0.2;

/// Rasterizes `doc` at `scale`×.
///
/// Fails only when the capture would be empty or the document is taller than
/// `max_height` CSS pixels.
pub fn rasterize(
    doc: &LaidOutDocument,
    fonts: &FontLibrary,
    scale: f32,
    max_height: f32,
) -> Result<RgbImage, ExportError> {
    if doc.height > max_height {
        return Err(ExportError::Raster(format!(
            "document is {} px tall, over the {max_height} px capture limit",
            doc.height
        )));
    }
    let width = (doc.width * scale).ceil() as u32;
    let height = (doc.height * scale).ceil() as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::Raster(format!(
            "document has no area ({width}x{height})"
        )));
    }

    let mut img = RgbImage::from_pixel(width, height, Pixel([255, 255, 255]));
    let metrics = get_metrics(&doc.font);

    for item in &doc.items {
        match item {
            LaidOut::Fill {
                x,
                y,
                width,
                height,
                color,
            } => fill_rect(&mut img, x * scale, y * scale, width * scale, height * scale, *color),
            LaidOut::Rule {
                x,
                y,
                width,
                thickness,
                color,
            } => fill_rect(
                &mut img,
                x * scale,
                y * scale,
                width * scale,
                (thickness * scale).max(1.0),
                *color,
            ),
            LaidOut::Text(run) => draw_run(&mut img, run, doc, fonts, metrics, scale),
        }
    }

    debug!("Captured {}x{} px at {}x", width, height, scale);
    Ok(img)
}

fn draw_run(
    img: &mut RgbImage,
    run: &TextRun,
    doc: &LaidOutDocument,
    fonts: &FontLibrary,
    metrics: &FontMetricTable,
    scale: f32,
) {
    let wanted = if run.bold {
        FaceStyle::Bold
    } else if run.italic {
        FaceStyle::Italic
    } else {
        FaceStyle::Regular
    };
    let (face_data, skew) = match fonts.face(doc.font, wanted) {
        Some(face) => (Some(face), 0.0),
        None => {
            let skew = if run.italic { SYNTHETIC_ITALIC_SKEW } else { 0.0 };
            (fonts.face(doc.font, FaceStyle::Regular), skew)
        }
    };

    let face = face_data.and_then(|f| ttf_parser::Face::parse(&f.data, f.index).ok());
    let width_factor = if run.bold { BOLD_WIDTH_FACTOR } else { 1.0 };
    let size_px = run.size * scale;
    let baseline = run.baseline * scale;
    let mut pen_x = run.x * scale;

    for c in run.text.chars() {
        let advance = metrics.char_width(c) * width_factor * size_px;
        if !c.is_whitespace() {
            match &face {
                Some(face) => draw_glyph(img, face, c, pen_x, baseline, size_px, skew, run.color),
                None => draw_greeked(img, pen_x, baseline, advance, size_px, run.color),
            }
        }
        pen_x += advance;
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyph(
    img: &mut RgbImage,
    face: &ttf_parser::Face<'_>,
    c: char,
    x: f32,
    baseline: f32,
    size_px: f32,
    skew: f32,
    color: Rgb,
) {
    let Some(glyph) = face.glyph_index(c) else {
        return;
    };
    let transform = GlyphTransform {
        origin_x: x,
        baseline_y: baseline,
        px_per_unit: size_px / face.units_per_em() as f32,
        skew,
    };
    let mut collector = OutlineCollector::new(transform);
    if face.outline_glyph(glyph, &mut collector).is_none() {
        return;
    }
    fill_edges(img, &collector.into_edges(), color);
}

/// Stand-in for a glyph when no face is available: an x-height bar.
fn draw_greeked(img: &mut RgbImage, x: f32, baseline: f32, advance: f32, size_px: f32, color: Rgb) {
    let bar_height = size_px * 0.5;
    let inset = advance * 0.1;
    let (w, h) = img.dimensions();
    let top = baseline - bar_height;
    if top >= h as f32 || x >= w as f32 {
        return;
    }
    fill_rect(
        img,
        x + inset,
        top,
        (advance - 2.0 * inset).max(0.0),
        bar_height,
        lighten(color, 0.4),
    );
}

/// Mixes `color` toward white; greeked bars read as placeholders, not text.
fn lighten(color: Rgb, amount: f32) -> Rgb {
    let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
    Rgb(mix(color.0), mix(color.1), mix(color.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_document, DocumentGeometry};
    use crate::models::resume::{Experience, ResumeData};
    use crate::render::{render_document, Template};

    fn laid_out(template: Template) -> LaidOutDocument {
        let data = ResumeData {
            experience: vec![Experience {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                duration: "2021".to_string(),
                description: Some("Did work".to_string()),
            }],
            ..Default::default()
        };
        layout_document(&render_document(&data, template), &DocumentGeometry::default())
    }

    #[test]
    fn test_capture_uses_full_natural_size_at_scale() {
        let doc = laid_out(Template::Classic);
        let img = rasterize(&doc, &FontLibrary::empty(), 2.0, f32::MAX).unwrap();
        assert_eq!(img.width(), (doc.width * 2.0).ceil() as u32);
        assert_eq!(img.height(), (doc.height * 2.0).ceil() as u32);
    }

    #[test]
    fn test_capture_paints_something_dark() {
        let doc = laid_out(Template::Classic);
        let img = rasterize(&doc, &FontLibrary::empty(), 2.0, f32::MAX).unwrap();
        assert!(img.pixels().any(|p| p.0[0] < 200), "expected ink on the page");
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255], "corner stays background");
    }

    #[test]
    fn test_modern_band_fills_top_left() {
        let doc = laid_out(Template::Modern);
        let img = rasterize(&doc, &FontLibrary::empty(), 2.0, f32::MAX).unwrap();
        assert_eq!(img.get_pixel(1, 1).0, [0x1e, 0x29, 0x3b]);
    }

    #[test]
    fn test_capture_rejects_oversized_output() {
        let doc = laid_out(Template::Minimal);
        let err = rasterize(&doc, &FontLibrary::empty(), 2.0, 100.0).unwrap_err();
        assert!(matches!(err, ExportError::Raster(_)));
    }

    #[test]
    fn test_height_limit_does_not_depend_on_scale() {
        let doc = laid_out(Template::Classic);
        let limit = doc.height + 1.0;
        for scale in [2.0, 3.0, 4.0] {
            let img = rasterize(&doc, &FontLibrary::empty(), scale, limit).unwrap();
            assert_eq!(img.height(), (doc.height * scale).ceil() as u32);
        }
    }

    #[test]
    fn test_capture_is_deterministic() {
        let doc = laid_out(Template::Modern);
        let a = rasterize(&doc, &FontLibrary::empty(), 2.0, f32::MAX).unwrap();
        let b = rasterize(&doc, &FontLibrary::empty(), 2.0, f32::MAX).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
