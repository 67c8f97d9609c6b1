//! Page plan for slicing one tall capture across fixed-height pages.
//!
//! The capture is scaled to the page width, keeping its aspect ratio. Every
//! page shows the *whole* scaled image, shifted up by the height already shown
//! on earlier pages, so page `k` sits at vertical offset `-(k * page_height)`.
//! Pages keep being added while any of the image remains below the last page.

use serde::{Deserialize, Serialize};

use crate::layout::PageFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    pub page_width: f32,
    pub page_height: f32,
    /// Height of the full capture once scaled to `page_width`, in points.
    pub image_height: f32,
    /// Vertical offset of the image's top edge on each page, measured
    /// downward from the page top. Always `0, -P, -2P, …`.
    pub offsets: Vec<f32>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }

    /// Y of the image's bottom-left corner on page `index`, in PDF user space
    /// (origin at the bottom-left of the page).
    pub fn pdf_image_y(&self, index: usize) -> f32 {
        self.page_height - self.image_height - self.offsets[index]
    }
}

/// Plans pages for a capture of `captured_width` × `captured_height` pixels.
pub fn plan_pages(captured_width: u32, captured_height: u32, format: PageFormat) -> PagePlan {
    let page_width = format.width_pt();
    let page_height = format.height_pt();
    let image_height = if captured_width == 0 {
        0.0
    } else {
        captured_height as f32 * page_width / captured_width as f32
    };

    let mut offsets = vec![0.0_f32];
    let mut placed = 1usize;
    while image_height - page_height * placed as f32 > 0.0 {
        offsets.push(-(page_height * placed as f32));
        placed += 1;
    }

    PagePlan {
        page_width,
        page_height,
        image_height,
        offsets,
    }
}

/// Page count a document of the given CSS-pixel size will export to.
pub fn predict_page_count(width_px: f32, height_px: f32, scale: f32, format: PageFormat) -> usize {
    let w = (width_px * scale).ceil() as u32;
    let h = (height_px * scale).ceil() as u32;
    plan_pages(w, h, format).page_count()
}
