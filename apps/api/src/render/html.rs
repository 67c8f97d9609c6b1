//! Print view: the rendered document as a standalone HTML page.
//!
//! Only `#resume-document` is visible when printing; every other element on
//! the page is hidden by the `@media print` rule. User text goes through
//! handlebars' default HTML escaping. Theme values are trusted CSS and use
//! triple-stash.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use super::{Align, Block, Entry, RenderedDocument, Theme};

const PAGE_TEMPLATE: &str = "print_page";
const BLOCK_PARTIAL: &str = "block";

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
body { margin: 0; background: #f5f5f5; }
.toolbar { padding: 12px; text-align: center; font-family: sans-serif; }
#resume-document { box-sizing: border-box; width: 780px; margin: 0 auto 32px; padding: 32px; background: #ffffff; color: {{{css.text}}}; font-family: {{{css.font}}}; font-size: {{css.body_size}}px; line-height: 1.45; }
#resume-document header { text-align: {{{css.align}}}; margin-bottom: 20px; {{{css.band}}} }
#resume-document header h1 { margin: 0; font-size: {{css.name_size}}px; color: {{{css.header_text}}}; }
#resume-document header p { margin: 4px 0 0; color: {{{css.header_muted}}}; }
#resume-document section { margin-top: 18px; }
#resume-document h2 { margin: 0 0 8px; font-size: {{css.title_size}}px; color: {{{css.accent}}}; {{{css.rule}}} }
#resume-document .entry { margin-bottom: 10px; }
#resume-document .row { display: flex; justify-content: space-between; gap: 12px; }
#resume-document .heading { font-weight: bold; font-size: {{css.heading_size}}px; }
#resume-document .sub { font-style: italic; color: {{{css.muted}}}; }
#resume-document .detail { margin: 2px 0 0; white-space: pre-wrap; line-height: 1.6; }
@media print {
  body { background: #ffffff; }
  body * { visibility: hidden; }
  #resume-document, #resume-document * { visibility: visible; }
  #resume-document { position: absolute; left: 0; top: 0; margin: 0; }
}
</style>
</head>
<body>
<div class="toolbar"><button onclick="window.print()">Print</button></div>
<div id="resume-document">
{{#each blocks}}{{> block}}{{/each}}</div>
</body>
</html>
"#;

// Recursive: a section renders its children through the same partial.
const BLOCK: &str = r#"{{#if header}}<header><h1>{{header.name}}</h1>{{#if header.contact}}<p>{{#each header.contact}}{{#unless @first}} &middot; {{/unless}}{{this}}{{/each}}</p>{{/if}}</header>
{{/if}}{{#if section}}<section><h2>{{section.title}}</h2>
{{#each section.blocks}}{{> block}}{{/each}}</section>
{{/if}}{{#if entry}}<div class="entry">{{#if entry.has_row}}<div class="row">{{#if entry.heading}}<span class="heading">{{entry.heading}}</span>{{/if}}{{#if entry.aside}}<span>{{entry.aside}}</span>{{/if}}</div>{{/if}}{{#if entry.subheading}}<div class="sub">{{entry.subheading}}</div>{{/if}}{{#each entry.details}}<p class="detail">{{this}}</p>{{/each}}</div>
{{/if}}{{#if tags}}<p>{{#if tags.label}}<strong>{{tags.label}}:</strong> {{/if}}{{tags.items}}</p>
{{/if}}{{#if paragraph}}<p class="detail">{{paragraph}}</p>
{{/if}}"#;

/// Handlebars registry with the print page and its block partial registered.
pub struct HtmlRenderer {
    registry: Handlebars<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(PAGE_TEMPLATE, PAGE)?;
        registry.register_partial(BLOCK_PARTIAL, BLOCK)?;
        Ok(Self { registry })
    }

    pub fn render_print_html(&self, doc: &RenderedDocument) -> Result<String, RenderError> {
        let title = doc
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Header { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .unwrap_or("Resume");

        let view = PageView {
            title,
            css: CssView::from_theme(&doc.theme),
            blocks: doc.blocks.iter().map(|b| BlockView::new(b, &doc.theme)).collect(),
        };
        self.registry.render(PAGE_TEMPLATE, &view)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template context
// ────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PageView<'a> {
    title: &'a str,
    css: CssView,
    blocks: Vec<BlockView<'a>>,
}

#[derive(Serialize)]
struct CssView {
    text: String,
    muted: String,
    accent: String,
    header_text: String,
    header_muted: String,
    font: &'static str,
    align: &'static str,
    band: String,
    rule: String,
    body_size: f32,
    name_size: f32,
    title_size: f32,
    heading_size: f32,
}

impl CssView {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            text: theme.text.to_hex(),
            muted: theme.muted.to_hex(),
            accent: theme.accent.to_hex(),
            header_text: theme.header_text.to_hex(),
            header_muted: if theme.header_band.is_some() {
                theme.header_text.to_hex()
            } else {
                theme.muted.to_hex()
            },
            font: theme.font.css_stack(),
            align: match theme.header_align {
                Align::Left => "left",
                Align::Center => "center",
            },
            band: theme
                .header_band
                .map(|c| {
                    format!(
                        "background: {}; margin: -32px -32px 20px; padding: 28px 32px;",
                        c.to_hex()
                    )
                })
                .unwrap_or_default(),
            rule: if theme.section_rule {
                format!("border-bottom: 1px solid {}; padding-bottom: 2px;", theme.accent.to_hex())
            } else {
                String::new()
            },
            body_size: theme.body_size,
            name_size: theme.name_size,
            title_size: theme.title_size,
            heading_size: theme.heading_size,
        }
    }
}

/// One block with exactly one of its fields set, so the partial can branch
/// with plain `#if`.
#[derive(Serialize, Default)]
struct BlockView<'a> {
    header: Option<HeaderView<'a>>,
    section: Option<SectionView<'a>>,
    entry: Option<EntryView<'a>>,
    tags: Option<TagsView<'a>>,
    paragraph: Option<&'a str>,
}

#[derive(Serialize)]
struct HeaderView<'a> {
    name: &'a str,
    contact: &'a [String],
}

#[derive(Serialize)]
struct SectionView<'a> {
    title: String,
    blocks: Vec<BlockView<'a>>,
}

#[derive(Serialize)]
struct EntryView<'a> {
    has_row: bool,
    heading: Option<&'a str>,
    aside: Option<&'a str>,
    subheading: Option<&'a str>,
    details: &'a [String],
}

#[derive(Serialize)]
struct TagsView<'a> {
    label: Option<&'a str>,
    items: &'a str,
}

impl<'a> BlockView<'a> {
    fn new(block: &'a Block, theme: &Theme) -> Self {
        match block {
            Block::Header { name, contact } => BlockView {
                header: Some(HeaderView { name, contact }),
                ..Default::default()
            },
            Block::Section { title, blocks } => BlockView {
                section: Some(SectionView {
                    title: theme.section_title(title),
                    blocks: blocks.iter().map(|b| BlockView::new(b, theme)).collect(),
                }),
                ..Default::default()
            },
            Block::Entry(entry) => BlockView {
                entry: Some(EntryView::new(entry)),
                ..Default::default()
            },
            Block::Tags { label, items } => BlockView {
                tags: Some(TagsView {
                    label: label.as_deref(),
                    items,
                }),
                ..Default::default()
            },
            Block::Paragraph { text } => BlockView {
                paragraph: Some(text.as_str()),
                ..Default::default()
            },
        }
    }
}

impl<'a> EntryView<'a> {
    fn new(entry: &'a Entry) -> Self {
        Self {
            has_row: entry.heading.is_some() || entry.aside.is_some(),
            heading: entry.heading.as_deref(),
            aside: entry.aside.as_deref(),
            subheading: entry.subheading.as_deref(),
            details: &entry.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Experience, PersonalInfo, ResumeData, SkillGroup};
    use crate::render::{render_document, Template};

    fn render(data: &ResumeData, template: Template) -> String {
        HtmlRenderer::new()
            .unwrap()
            .render_print_html(&render_document(data, template))
            .unwrap()
    }

    #[test]
    fn test_print_rule_scopes_visibility_to_document() {
        let html = render(&ResumeData::default(), Template::Classic);
        assert!(html.contains("@media print"));
        assert!(html.contains("body * { visibility: hidden; }"));
        assert!(html.contains("#resume-document, #resume-document * { visibility: visible; }"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let data = ResumeData {
            experience: vec![Experience {
                title: "<script>alert(1)</script>".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let html = render(&data, Template::Modern);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_classic_titles_are_uppercased() {
        let html = render(&ResumeData::default(), Template::Classic);
        assert!(html.contains("<h2>WORK EXPERIENCE</h2>"));

        let minimal = render(&ResumeData::default(), Template::Minimal);
        assert!(minimal.contains("<h2>Work Experience</h2>"));
    }

    #[test]
    fn test_theme_css_is_not_escaped() {
        let html = render(&ResumeData::default(), Template::Classic);
        assert!(html.contains("font-family: 'Latin Modern Roman'"));
    }

    #[test]
    fn test_entries_contacts_and_tags_render() {
        let data = ResumeData {
            personal_info: PersonalInfo {
                name: Some("Jane Q. Doe".to_string()),
                email: Some("jane@example.com".to_string()),
                phone: Some("555-0100".to_string()),
                ..Default::default()
            },
            experience: vec![Experience {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                duration: "2021".to_string(),
                description: Some("Shipped things".to_string()),
            }],
            skills: vec![SkillGroup {
                category: "Languages".to_string(),
                items: "Rust, Go".to_string(),
            }],
            ..Default::default()
        };
        let html = render(&data, Template::Minimal);
        assert!(html.contains("<title>Jane Q. Doe</title>"));
        assert!(html.contains("<p>jane@example.com &middot; 555-0100</p>"));
        assert!(html.contains("<span class=\"heading\">Engineer</span><span>2021</span>"));
        assert!(html.contains("<div class=\"sub\">Acme</div>"));
        assert!(html.contains("<p class=\"detail\">Shipped things</p>"));
        assert!(html.contains("<strong>Languages:</strong> Rust, Go"));
    }
}
