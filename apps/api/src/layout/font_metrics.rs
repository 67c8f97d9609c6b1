//! Static character-width tables for the document fonts, plus greedy word wrap.
//!
//! Widths are in em units, so a run's pixel width is `measure * size_px`.
//! Layout measures with these tables rather than with the loaded font files,
//! which keeps layout deterministic regardless of which system fonts exist;
//! the rasterizer advances glyphs by the same widths so positions agree.
//! Tables cover ASCII 0x20..=0x7E; index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

/// Bold runs are measured this much wider than regular ones.
pub const BOLD_WIDTH_FACTOR: f32 = 1.06;

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Clean humanist sans-serif.
    Inter,
    /// Geometric humanist sans-serif.
    Lato,
    /// Traditional TeX serif.
    ComputerModern,
}

impl FontFamily {
    /// System family names to try, most specific first.
    pub fn system_names(&self) -> &'static [&'static str] {
        match self {
            FontFamily::Inter => &["Inter", "Helvetica", "Arial", "DejaVu Sans"],
            FontFamily::Lato => &["Lato", "Open Sans", "DejaVu Sans"],
            FontFamily::ComputerModern => &[
                "Latin Modern Roman",
                "CMU Serif",
                "Times New Roman",
                "DejaVu Serif",
            ],
        }
    }

    pub fn is_serif(&self) -> bool {
        matches!(self, FontFamily::ComputerModern)
    }

    /// CSS font stack used by the print view.
    pub fn css_stack(&self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter, Helvetica, Arial, sans-serif",
            FontFamily::Lato => "Lato, 'Open Sans', sans-serif",
            FontFamily::ComputerModern => "'Latin Modern Roman', 'CMU Serif', 'Times New Roman', serif",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// `widths[i]` = width of ASCII character `(i + 32)` at 1em.
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Measures a string in em units, applying the bold widening when `bold`.
    pub fn measure_styled(&self, s: &str, bold: bool) -> f32 {
        let width = self.measure_str(s);
        if bold {
            width * BOLD_WIDTH_FACTOR
        } else {
            width
        }
    }

    /// Greedy word wrap at `max_width_em`.
    ///
    /// Runs of whitespace collapse to one space. A word wider than the line
    /// sits alone on its own line rather than being split. Blank input yields
    /// no lines.
    pub fn wrap(&self, s: &str, max_width_em: f32, bold: bool) -> Vec<String> {
        self.wrap_with_first_line(s, max_width_em, max_width_em, bold)
    }

    /// Like [`wrap`](Self::wrap), but the first line has its own width budget
    /// (for text that follows an inline label).
    pub fn wrap_with_first_line(
        &self,
        s: &str,
        first_width_em: f32,
        max_width_em: f32,
        bold: bool,
    ) -> Vec<String> {
        let space_w = self.measure_styled(" ", bold);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            let word_w = self.measure_styled(word, bold);
            let limit = if lines.is_empty() {
                first_width_em
            } else {
                max_width_em
            };

            if !current.is_empty() && current_width + space_w + word_w > limit {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space_w;
            }
            current.push_str(word);
            current_width += word_w;
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Wraps text while keeping its explicit line breaks. Blank source lines
    /// are kept as empty strings.
    pub fn wrap_preformatted(&self, s: &str, max_width_em: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in s.trim_end().lines() {
            let wrapped = self.wrap(paragraph, max_width_em, false);
            if wrapped.is_empty() {
                lines.push(String::new());
            } else {
                lines.extend(wrapped);
            }
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Inter (Modern template).
static INTER_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
};

/// Lato (Minimal template). Roughly 5% wider than Inter.
static LATO_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.26, 0.32, 0.40, 0.59, 0.59, 0.94, 0.70, 0.23, 0.35, 0.35, 0.41, 0.62, 0.29, 0.35, 0.29, 0.33,
        // 0     1     2     3     4     5     6     7     8     9
        0.59, 0.59, 0.59, 0.59, 0.59, 0.59, 0.59, 0.59, 0.59, 0.59,
        // :     ;     <     =     >     ?     @
        0.29, 0.29, 0.62, 0.62, 0.62, 0.53, 1.07,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.70, 0.64, 0.64, 0.70, 0.59, 0.53, 0.70, 0.70, 0.26, 0.41, 0.64, 0.56, 0.82,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.70, 0.76, 0.59, 0.76, 0.64, 0.53, 0.59, 0.70, 0.70, 0.94, 0.64, 0.64, 0.59,
        // [     \     ]     ^     _     `
        0.29, 0.33, 0.29, 0.49, 0.59, 0.36,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.59, 0.59, 0.53, 0.59, 0.59, 0.33, 0.59, 0.59, 0.23, 0.23, 0.56, 0.23, 0.87,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.59, 0.59, 0.59, 0.59, 0.35, 0.46, 0.41, 0.59, 0.53, 0.76, 0.53, 0.53, 0.46,
        // {     |     }     ~
        0.35, 0.27, 0.35, 0.62,
    ],
    average_char_width: 0.55,
};

/// Computer Modern (Classic template). Roughly 10% narrower than Inter.
static COMPUTER_MODERN_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.23, 0.27, 0.34, 0.50, 0.50, 0.80, 0.60, 0.20, 0.30, 0.30, 0.35, 0.53, 0.25, 0.30, 0.25, 0.28,
        // 0     1     2     3     4     5     6     7     8     9
        0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50,
        // :     ;     <     =     >     ?     @
        0.25, 0.25, 0.53, 0.53, 0.53, 0.45, 0.92,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.60, 0.55, 0.55, 0.60, 0.50, 0.45, 0.60, 0.60, 0.23, 0.35, 0.55, 0.48, 0.70,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.60, 0.65, 0.50, 0.65, 0.55, 0.45, 0.50, 0.60, 0.60, 0.80, 0.55, 0.55, 0.50,
        // [     \     ]     ^     _     `
        0.25, 0.28, 0.25, 0.42, 0.50, 0.31,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.50, 0.50, 0.45, 0.50, 0.50, 0.28, 0.50, 0.50, 0.20, 0.20, 0.48, 0.20, 0.75,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.50, 0.50, 0.50, 0.50, 0.30, 0.40, 0.35, 0.50, 0.45, 0.65, 0.45, 0.45, 0.40,
        // {     |     }     ~
        0.30, 0.23, 0.30, 0.53,
    ],
    average_char_width: 0.47,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: &FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Inter => &INTER_TABLE,
        FontFamily::Lato => &LATO_TABLE,
        FontFamily::ComputerModern => &COMPUTER_MODERN_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = get_metrics(&FontFamily::Inter);
        assert_eq!(metrics.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(&FontFamily::Inter);
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00
        let width = metrics.measure_str("Rust");
        assert!((width - 2.00).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let metrics = get_metrics(&FontFamily::Lato);
        assert!((metrics.measure_str("é") - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider() {
        let metrics = get_metrics(&FontFamily::Inter);
        assert!(metrics.measure_styled("Experience", true) > metrics.measure_styled("Experience", false));
    }

    #[test]
    fn test_wrap_blank_is_empty() {
        let metrics = get_metrics(&FontFamily::Inter);
        assert!(metrics.wrap("   ", 10.0, false).is_empty());
    }

    #[test]
    fn test_wrap_respects_width() {
        let metrics = get_metrics(&FontFamily::Inter);
        let text = "word ".repeat(40);
        let lines = metrics.wrap(&text, 12.0, false);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.measure_str(line) <= 12.0 + 1e-3, "line too wide: {line}");
        }
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
        assert_eq!(rejoined.len(), 40);
    }

    #[test]
    fn test_overlong_word_gets_its_own_line() {
        let metrics = get_metrics(&FontFamily::Inter);
        let lines = metrics.wrap("a Supercalifragilisticexpialidocious b", 3.0, false);
        assert_eq!(lines, vec!["a", "Supercalifragilisticexpialidocious", "b"]);
    }

    #[test]
    fn test_first_line_budget_is_narrower() {
        let metrics = get_metrics(&FontFamily::Inter);
        let text = "alpha beta gamma delta";
        let lines = metrics.wrap_with_first_line(text, 3.0, 100.0, false);
        assert_eq!(lines, vec!["alpha", "beta gamma delta"]);
    }

    #[test]
    fn test_preformatted_keeps_breaks_and_blank_lines() {
        let metrics = get_metrics(&FontFamily::ComputerModern);
        let lines = metrics.wrap_preformatted("First line\n\nThird line\n", 100.0);
        assert_eq!(lines, vec!["First line", "", "Third line"]);
    }

    #[test]
    fn test_serif_family_is_narrower_than_lato() {
        let text = "Architected distributed caching layer";
        let cm = get_metrics(&FontFamily::ComputerModern).measure_str(text);
        let lato = get_metrics(&FontFamily::Lato).measure_str(text);
        assert!(cm < lato);
    }
}
