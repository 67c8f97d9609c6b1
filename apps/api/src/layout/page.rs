//! Page and document geometry.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output page size, portrait. Dimensions are in PDF points (1/72 in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    pub fn width_pt(&self) -> f32 {
        match self {
            PageFormat::A4 => 595.28,
            PageFormat::Letter => 612.0,
        }
    }

    pub fn height_pt(&self) -> f32 {
        match self {
            PageFormat::A4 => 841.89,
            PageFormat::Letter => 792.0,
        }
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" | "us-letter" => Ok(PageFormat::Letter),
            other => Err(format!("unknown page format '{other}' (expected a4 or letter)")),
        }
    }
}

/// Width of the document container in CSS pixels, and its inner padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentGeometry {
    pub width_px: f32,
    pub padding_px: f32,
}

impl Default for DocumentGeometry {
    fn default() -> Self {
        Self {
            width_px: 780.0,
            padding_px: 32.0,
        }
    }
}

impl DocumentGeometry {
    pub fn content_width(&self) -> f32 {
        (self.width_px - 2.0 * self.padding_px).max(1.0)
    }
}
