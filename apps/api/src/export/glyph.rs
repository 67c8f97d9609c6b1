//! Font discovery and glyph outline filling.
//!
//! Faces are resolved once at startup through `fontdb` (system fonts) and kept
//! as raw bytes; each capture parses them with `ttf-parser` and fills glyph
//! outlines with a small anti-aliased scanline rasterizer. A family with no
//! matching system face is drawn as greeked text (one bar per glyph) so a
//! capture never fails just because fonts are missing.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::layout::FontFamily;
use crate::render::Rgb;

/// Vertical samples per pixel row.
const SUBSAMPLES: usize = 4;
/// Line segments used to flatten each Bézier curve.
const CURVE_STEPS: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Font library
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceStyle {
    Regular,
    Bold,
    Italic,
}

/// Raw font file bytes plus the face index inside the file.
#[derive(Clone)]
pub struct FaceData {
    pub data: Arc<Vec<u8>>,
    pub index: u32,
}

/// Faces available to the rasterizer, keyed by family and style.
#[derive(Clone, Default)]
pub struct FontLibrary {
    faces: HashMap<(FontFamily, FaceStyle), FaceData>,
}

impl FontLibrary {
    /// A library with no faces; every run is greeked.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scans system fonts and resolves each family/style once.
    pub fn load_system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        info!("fontdb loaded {} system faces", db.len());

        let mut library = Self::default();
        for family in [FontFamily::Inter, FontFamily::Lato, FontFamily::ComputerModern] {
            for style in [FaceStyle::Regular, FaceStyle::Bold, FaceStyle::Italic] {
                match resolve_face(&db, family, style) {
                    Some(face) => {
                        library.faces.insert((family, style), face);
                    }
                    None => warn!("No system face for {family:?} {style:?}"),
                }
            }
        }
        library
    }

    pub fn face(&self, family: FontFamily, style: FaceStyle) -> Option<&FaceData> {
        self.faces.get(&(family, style))
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

fn resolve_face(db: &fontdb::Database, family: FontFamily, style: FaceStyle) -> Option<FaceData> {
    let (weight, font_style) = match style {
        FaceStyle::Regular => (fontdb::Weight::NORMAL, fontdb::Style::Normal),
        FaceStyle::Bold => (fontdb::Weight::BOLD, fontdb::Style::Normal),
        FaceStyle::Italic => (fontdb::Weight::NORMAL, fontdb::Style::Italic),
    };
    let generic = if family.is_serif() {
        fontdb::Family::Serif
    } else {
        fontdb::Family::SansSerif
    };
    let mut families: Vec<fontdb::Family<'_>> = family
        .system_names()
        .iter()
        .map(|name| fontdb::Family::Name(*name))
        .collect();
    families.push(generic);

    let id = db.query(&fontdb::Query {
        families: &families,
        weight,
        stretch: fontdb::Stretch::Normal,
        style: font_style,
    })?;

    let face = db.with_face_data(id, |data, index| FaceData {
        data: Arc::new(data.to_vec()),
        index,
    })?;
    debug!("Resolved {family:?} {style:?} to face {id:?}");
    Some(face)
}

// ────────────────────────────────────────────────────────────────────────────
// Outline collection
// ────────────────────────────────────────────────────────────────────────────

/// A directed edge in device pixels.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

/// Maps font units to device pixels for one glyph.
#[derive(Debug, Clone, Copy)]
pub struct GlyphTransform {
    pub origin_x: f32,
    pub baseline_y: f32,
    pub px_per_unit: f32,
    /// Horizontal shear applied to simulate italics.
    pub skew: f32,
}

impl GlyphTransform {
    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let dy = y * self.px_per_unit;
        (self.origin_x + x * self.px_per_unit + dy * self.skew, self.baseline_y - dy)
    }
}

/// Flattens a glyph outline into edges.
pub struct OutlineCollector {
    transform: GlyphTransform,
    edges: Vec<Edge>,
    start: (f32, f32),
    current: (f32, f32),
}

impl OutlineCollector {
    pub fn new(transform: GlyphTransform) -> Self {
        Self {
            transform,
            edges: Vec::new(),
            start: (0.0, 0.0),
            current: (0.0, 0.0),
        }
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }

    fn push_line(&mut self, to: (f32, f32)) {
        let (x0, y0) = self.current;
        if (y0 - to.1).abs() > f32::EPSILON {
            self.edges.push(Edge {
                x0,
                y0,
                x1: to.0,
                y1: to.1,
            });
        }
        self.current = to;
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.transform.apply(x, y);
        self.start = p;
        self.current = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.transform.apply(x, y);
        self.push_line(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.current;
        let p1 = self.transform.apply(x1, y1);
        let p2 = self.transform.apply(x, y);
        for step in 1..=CURVE_STEPS {
            let t = step as f32 / CURVE_STEPS as f32;
            let mt = 1.0 - t;
            let px = mt * mt * p0.0 + 2.0 * mt * t * p1.0 + t * t * p2.0;
            let py = mt * mt * p0.1 + 2.0 * mt * t * p1.1 + t * t * p2.1;
            self.push_line((px, py));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.current;
        let p1 = self.transform.apply(x1, y1);
        let p2 = self.transform.apply(x2, y2);
        let p3 = self.transform.apply(x, y);
        for step in 1..=CURVE_STEPS {
            let t = step as f32 / CURVE_STEPS as f32;
            let mt = 1.0 - t;
            let a = mt * mt * mt;
            let b = 3.0 * mt * mt * t;
            let c = 3.0 * mt * t * t;
            let d = t * t * t;
            let px = a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0;
            let py = a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1;
            self.push_line((px, py));
        }
    }

    fn close(&mut self) {
        let start = self.start;
        self.push_line(start);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scanline fill
// ────────────────────────────────────────────────────────────────────────────

/// Fills the area enclosed by `edges` (non-zero winding) with `color`,
/// blending by per-pixel coverage.
pub fn fill_edges(img: &mut RgbImage, edges: &[Edge], color: Rgb) {
    if edges.is_empty() {
        return;
    }
    let (width, height) = img.dimensions();
    let min_y = edges.iter().map(|e| e.y0.min(e.y1)).fold(f32::MAX, f32::min);
    let max_y = edges.iter().map(|e| e.y0.max(e.y1)).fold(f32::MIN, f32::max);
    let min_x = edges.iter().map(|e| e.x0.min(e.x1)).fold(f32::MAX, f32::min);
    let max_x = edges.iter().map(|e| e.x0.max(e.x1)).fold(f32::MIN, f32::max);

    let row_start = min_y.floor().max(0.0) as u32;
    let row_end = (max_y.ceil().max(0.0) as u32).min(height);
    let col_start = min_x.floor().max(0.0) as u32;
    let col_end = (max_x.ceil().max(0.0) as u32).min(width);
    if row_start >= row_end || col_start >= col_end {
        return;
    }

    let span = (col_end - col_start) as usize;
    let mut coverage = vec![0.0_f32; span];
    let mut crossings: Vec<(f32, i32)> = Vec::new();

    for row in row_start..row_end {
        coverage.iter_mut().for_each(|c| *c = 0.0);

        for sub in 0..SUBSAMPLES {
            let sy = row as f32 + (sub as f32 + 0.5) / SUBSAMPLES as f32;
            crossings.clear();
            for e in edges {
                let (top, bottom, dir) = if e.y0 < e.y1 {
                    (e.y0, e.y1, 1)
                } else {
                    (e.y1, e.y0, -1)
                };
                if sy < top || sy >= bottom {
                    continue;
                }
                let t = (sy - e.y0) / (e.y1 - e.y0);
                crossings.push((e.x0 + t * (e.x1 - e.x0), dir));
            }
            crossings.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding != 0 {
                    accumulate_span(&mut coverage, col_start, pair[0].0, pair[1].0);
                }
            }
        }

        for (i, c) in coverage.iter().enumerate() {
            if *c > 0.0 {
                blend(img, col_start + i as u32, row, color, c / SUBSAMPLES as f32);
            }
        }
    }
}

fn accumulate_span(coverage: &mut [f32], col_start: u32, xa: f32, xb: f32) {
    let left = xa - col_start as f32;
    let right = xb - col_start as f32;
    if right <= 0.0 {
        return;
    }
    let first = left.floor().max(0.0) as usize;
    let last = (right.ceil().max(0.0) as usize).min(coverage.len());
    for (px, cell) in coverage.iter_mut().enumerate().take(last).skip(first) {
        let px = px as f32;
        let overlap = right.min(px + 1.0) - left.max(px);
        if overlap > 0.0 {
            *cell += overlap;
        }
    }
}

/// Blends `color` over the pixel at (x, y) with the given alpha.
fn blend(img: &mut RgbImage, x: u32, y: u32, color: Rgb, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let pixel = img.get_pixel_mut(x, y);
    let src = [color.0, color.1, color.2];
    for (dst, src) in pixel.0.iter_mut().zip(src) {
        let mixed = *dst as f32 * (1.0 - alpha) + src as f32 * alpha;
        *dst = mixed.round() as u8;
    }
}

/// Fills an axis-aligned rectangle in device pixels, with partial coverage at
/// fractional edges.
pub fn fill_rect(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let edges = [
        Edge { x0: x, y0: y, x1: x, y1: y + h },
        Edge { x0: x, y0: y + h, x1: x + w, y1: y + h },
        Edge { x0: x + w, y0: y + h, x1: x + w, y1: y },
        Edge { x0: x + w, y0: y, x1: x, y1: y },
    ];
    fill_edges(img, &edges, color);
}
