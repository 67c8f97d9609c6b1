//! Block-tree layout.
//!
//! Walks a `RenderedDocument` top to bottom, wrapping text with the static
//! metric tables and emitting absolutely positioned items. Coordinates are CSS
//! pixels with the origin at the top-left of the document container; `height`
//! is the natural (scrollable) height of the whole document.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{get_metrics, FontFamily, FontMetricTable};
use crate::layout::page::DocumentGeometry;
use crate::render::{Align, Block, Entry, RenderedDocument, Rgb, Theme};

const LINE_HEIGHT: f32 = 1.45;
const RELAXED_LINE_HEIGHT: f32 = 1.6;
const ASIDE_GAP: f32 = 12.0;
const SECTION_GAP: f32 = 18.0;
const ENTRY_GAP: f32 = 10.0;
const HEADER_GAP: f32 = 20.0;
const BAND_PADDING: f32 = 28.0;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A single line of text in one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub x: f32,
    /// Baseline position.
    pub baseline: f32,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaidOut {
    Text(TextRun),
    Rule {
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        color: Rgb,
    },
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaidOutDocument {
    pub width: f32,
    pub height: f32,
    pub font: FontFamily,
    /// Items in paint order.
    pub items: Vec<LaidOut>,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the document at `geometry.width_px`.
pub fn layout_document(doc: &RenderedDocument, geometry: &DocumentGeometry) -> LaidOutDocument {
    let mut cursor = Cursor {
        theme: &doc.theme,
        metrics: get_metrics(&doc.theme.font),
        left: geometry.padding_px,
        content_width: geometry.content_width(),
        full_width: geometry.width_px,
        y: geometry.padding_px,
        items: Vec::new(),
        sections_placed: 0,
    };

    for block in &doc.blocks {
        cursor.block(block);
    }

    LaidOutDocument {
        width: geometry.width_px,
        height: (cursor.y + geometry.padding_px).ceil(),
        font: doc.theme.font,
        items: cursor.items,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'a> {
    theme: &'a Theme,
    metrics: &'static FontMetricTable,
    left: f32,
    content_width: f32,
    full_width: f32,
    /// Top of the next line.
    y: f32,
    items: Vec<LaidOut>,
    sections_placed: usize,
}

#[derive(Clone, Copy)]
struct Style {
    size: f32,
    bold: bool,
    italic: bool,
    color: Rgb,
    line_height: f32,
}

impl Style {
    fn advance(&self) -> f32 {
        self.size * self.line_height
    }
}

impl<'a> Cursor<'a> {
    fn block(&mut self, block: &Block) {
        match block {
            Block::Header { name, contact } => self.header(name, contact),
            Block::Section { title, blocks } => self.section(title, blocks),
            Block::Entry(entry) => self.entry(entry),
            Block::Tags { label, items } => self.tags(label.as_deref(), items),
            Block::Paragraph { text } => {
                let style = self.body_style(RELAXED_LINE_HEIGHT);
                self.preformatted(text, style);
            }
        }
    }

    fn body_style(&self, line_height: f32) -> Style {
        Style {
            size: self.theme.body_size,
            bold: false,
            italic: false,
            color: self.theme.text,
            line_height,
        }
    }

    fn width_px(&self, text: &str, style: Style) -> f32 {
        self.metrics.measure_styled(text, style.bold) * style.size
    }

    fn baseline(&self, style: Style) -> f32 {
        let advance = style.advance();
        self.y + (advance - style.size) / 2.0 + style.size * 0.8
    }

    fn push_run(&mut self, text: &str, x: f32, style: Style) {
        let baseline = self.baseline(style);
        self.items.push(LaidOut::Text(TextRun {
            x,
            baseline,
            size: style.size,
            bold: style.bold,
            italic: style.italic,
            color: style.color,
            text: text.to_string(),
        }));
    }

    fn aligned_x(&self, text: &str, style: Style, align: Align) -> f32 {
        match align {
            Align::Left => self.left,
            Align::Center => {
                self.left + ((self.content_width - self.width_px(text, style)) / 2.0).max(0.0)
            }
        }
    }

    /// Wraps and places text, one run per line, advancing the cursor.
    fn wrapped(&mut self, text: &str, style: Style, align: Align) {
        let max_em = self.content_width / style.size;
        for line in self.metrics.wrap(text, max_em, style.bold) {
            let x = self.aligned_x(&line, style, align);
            self.push_run(&line, x, style);
            self.y += style.advance();
        }
    }

    /// Wraps text but keeps its line breaks; blank lines still take space.
    fn preformatted(&mut self, text: &str, style: Style) {
        let max_em = self.content_width / style.size;
        for line in self.metrics.wrap_preformatted(text, max_em) {
            if !line.is_empty() {
                self.push_run(&line, self.left, style);
            }
            self.y += style.advance();
        }
    }

    fn header(&mut self, name: &str, contact: &[String]) {
        let theme = self.theme;
        let band_index = self.items.len();
        if theme.header_band.is_some() {
            self.y = BAND_PADDING;
        }

        let name_style = Style {
            size: theme.name_size,
            bold: true,
            italic: false,
            color: theme.header_text,
            line_height: 1.25,
        };
        self.wrapped(name, name_style, theme.header_align);

        if !contact.is_empty() {
            let contact_style = Style {
                size: theme.body_size,
                bold: false,
                italic: false,
                color: if theme.header_band.is_some() {
                    theme.header_text
                } else {
                    theme.muted
                },
                line_height: LINE_HEIGHT,
            };
            self.y += 4.0;
            self.wrapped(&contact.join("  ·  "), contact_style, theme.header_align);
        }

        if let Some(color) = theme.header_band {
            self.y += BAND_PADDING;
            self.items.insert(
                band_index,
                LaidOut::Fill {
                    x: 0.0,
                    y: 0.0,
                    width: self.full_width,
                    height: self.y,
                    color,
                },
            );
        }
        self.y += HEADER_GAP;
    }

    fn section(&mut self, title: &str, blocks: &[Block]) {
        let theme = self.theme;
        if self.sections_placed > 0 {
            self.y += SECTION_GAP;
        }
        self.sections_placed += 1;

        let title_style = Style {
            size: theme.title_size,
            bold: true,
            italic: false,
            color: theme.accent,
            line_height: 1.3,
        };
        self.wrapped(&theme.section_title(title), title_style, Align::Left);

        if theme.section_rule {
            self.y += 2.0;
            self.items.push(LaidOut::Rule {
                x: self.left,
                y: self.y,
                width: self.content_width,
                thickness: 1.0,
                color: theme.accent,
            });
            self.y += 1.0;
        }
        self.y += 8.0;

        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                self.y += ENTRY_GAP;
            }
            self.block(block);
        }
    }

    fn entry(&mut self, entry: &Entry) {
        let theme = self.theme;
        let heading_style = Style {
            size: theme.heading_size,
            bold: true,
            italic: false,
            color: theme.text,
            line_height: LINE_HEIGHT,
        };
        let aside_style = Style {
            size: theme.body_size,
            bold: false,
            italic: false,
            color: theme.muted,
            line_height: LINE_HEIGHT,
        };

        match (&entry.heading, &entry.aside) {
            (None, None) => {}
            (heading, aside) => {
                let aside_width = aside
                    .as_deref()
                    .map(|a| self.width_px(a, aside_style))
                    .unwrap_or(0.0);
                let heading_room = if aside.is_some() {
                    (self.content_width - aside_width - ASIDE_GAP).max(self.content_width * 0.4)
                } else {
                    self.content_width
                };
                let heading_lines = heading
                    .as_deref()
                    .map(|h| {
                        self.metrics
                            .wrap(h, heading_room / heading_style.size, true)
                    })
                    .unwrap_or_default();

                // The aside sits on the first row, aligned to the heading baseline.
                if let Some(aside) = aside.as_deref() {
                    let row_style = if heading_lines.is_empty() {
                        aside_style
                    } else {
                        heading_style
                    };
                    let baseline = self.baseline(row_style);
                    self.items.push(LaidOut::Text(TextRun {
                        x: self.left + self.content_width - aside_width,
                        baseline,
                        size: aside_style.size,
                        bold: false,
                        italic: false,
                        color: aside_style.color,
                        text: aside.to_string(),
                    }));
                }

                if heading_lines.is_empty() {
                    self.y += aside_style.advance();
                }
                for line in heading_lines {
                    self.push_run(&line, self.left, heading_style);
                    self.y += heading_style.advance();
                }
            }
        }

        if let Some(sub) = entry.subheading.as_deref() {
            let sub_style = Style {
                italic: true,
                ..aside_style
            };
            self.wrapped(sub, sub_style, Align::Left);
        }

        let detail_style = self.body_style(RELAXED_LINE_HEIGHT);
        for detail in &entry.details {
            self.y += 2.0;
            self.preformatted(detail, detail_style);
        }
    }

    fn tags(&mut self, label: Option<&str>, items: &str) {
        let body = self.body_style(LINE_HEIGHT);
        let Some(label) = label else {
            self.wrapped(items, body, Align::Left);
            return;
        };

        let label_style = Style { bold: true, ..body };
        let label_text = format!("{label}:");
        let label_width = self.width_px(&label_text, label_style) + self.width_px(" ", body);
        let max_em = self.content_width / body.size;
        let first_em = ((self.content_width - label_width) / body.size).max(0.0);
        let lines = self
            .metrics
            .wrap_with_first_line(items, first_em, max_em, false);

        self.push_run(&label_text, self.left, label_style);
        if lines.is_empty() {
            self.y += body.advance();
        }
        for (i, line) in lines.iter().enumerate() {
            let x = if i == 0 {
                self.left + label_width
            } else {
                self.left
            };
            self.push_run(line, x, body);
            self.y += body.advance();
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
