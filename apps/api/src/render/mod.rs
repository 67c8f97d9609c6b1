//! Document renderer: `ResumeData + Template → RenderedDocument`.
//!
//! The rendered document is a small tree of styled blocks. Each template is a
//! pure function over the same input that decides the theme and the order of
//! sections; the shared builders below decide *what* appears, so every template
//! shows exactly the same data. Blank fields never produce blocks or lines.

pub mod classic;
pub mod html;
pub mod minimal;
pub mod modern;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::FontFamily;
use crate::models::resume::{non_blank, present, ResumeData};

// ────────────────────────────────────────────────────────────────────────────
// Template selector
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Classic,
    Modern,
    Minimal,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Classic, Template::Modern, Template::Minimal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Template::Classic),
            "modern" => Ok(Template::Modern),
            "minimal" => Ok(Template::Minimal),
            other => {
                let known: Vec<&str> = Template::ALL.iter().map(Template::as_str).collect();
                Err(format!(
                    "unknown template '{other}' (expected one of: {})",
                    known.join(", ")
                ))
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x11, 0x11, 0x11);
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

/// Visual parameters a template hands to layout and the print view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font: FontFamily,
    pub text: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    pub header_align: Align,
    /// Background band behind the header, if any.
    pub header_band: Option<Rgb>,
    /// Text colour used inside the header.
    pub header_text: Rgb,
    pub uppercase_titles: bool,
    /// Horizontal rule under each section title.
    pub section_rule: bool,
    pub name_size: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
}

impl Theme {
    pub fn section_title(&self, title: &str) -> String {
        if self.uppercase_titles {
            title.to_uppercase()
        } else {
            title.to_string()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Education,
    Experience,
    Project,
    Certification,
}

/// One record rendered as a heading row, an optional subheading and details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    pub heading: Option<String>,
    /// Right-aligned text on the heading row (dates, years).
    pub aside: Option<String>,
    pub subheading: Option<String>,
    /// Paragraphs below the heading. Line breaks inside a detail are kept.
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { name: String, contact: Vec<String> },
    Section { title: String, blocks: Vec<Block> },
    Entry(Entry),
    Tags { label: Option<String>, items: String },
    Paragraph { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub template: Template,
    pub theme: Theme,
    pub blocks: Vec<Block>,
}

/// Renders the data with the chosen template. Never fails and never mutates
/// the input; the same input always yields the same tree.
pub fn render_document(data: &ResumeData, template: Template) -> RenderedDocument {
    match template {
        Template::Classic => classic::render(data),
        Template::Modern => modern::render(data),
        Template::Minimal => minimal::render(data),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared section builders
// ────────────────────────────────────────────────────────────────────────────

/// Identifies a section so templates can choose their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionId {
    Summary,
    Education,
    Experience,
    Projects,
    Skills,
    Certifications,
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

pub(crate) fn header_block(data: &ResumeData) -> Block {
    let info = &data.personal_info;
    let contact = [
        &info.email,
        &info.phone,
        &info.location,
        &info.website,
        &info.linkedin,
    ]
    .into_iter()
    .filter_map(present)
    .map(str::to_string)
    .collect();

    Block::Header {
        name: data.display_name().unwrap_or("Resume").to_string(),
        contact,
    }
}

/// Builds the body sections in the given order. Education and experience
/// always appear (possibly empty); the other groups only when they have content.
pub(crate) fn sections(data: &ResumeData, order: &[SectionId]) -> Vec<Block> {
    order
        .iter()
        .filter_map(|id| match id {
            SectionId::Summary => present(&data.personal_info.summary).map(|text| {
                section(
                    "Summary",
                    vec![Block::Paragraph {
                        text: text.to_string(),
                    }],
                )
            }),
            SectionId::Education => Some(section("Education", education_entries(data))),
            SectionId::Experience => Some(section("Work Experience", experience_entries(data))),
            SectionId::Projects => non_empty_section("Projects", project_entries(data)),
            SectionId::Skills => non_empty_section("Skills", skill_blocks(data)),
            SectionId::Certifications => {
                non_empty_section("Certifications", certification_entries(data))
            }
        })
        .collect()
}

fn section(title: &str, blocks: Vec<Block>) -> Block {
    Block::Section {
        title: title.to_string(),
        blocks,
    }
}

fn non_empty_section(title: &str, blocks: Vec<Block>) -> Option<Block> {
    (!blocks.is_empty()).then(|| section(title, blocks))
}

fn education_entries(data: &ResumeData) -> Vec<Block> {
    data.education
        .iter()
        .map(|edu| {
            let mut details = Vec::new();
            if let Some(gpa) = present(&edu.gpa) {
                details.push(format!("GPA: {gpa}"));
            }
            if let Some(description) = present(&edu.description) {
                details.push(description.to_string());
            }
            Block::Entry(Entry {
                kind: EntryKind::Education,
                heading: owned(non_blank(&edu.degree)),
                aside: owned(non_blank(&edu.year)),
                subheading: owned(non_blank(&edu.university)),
                details,
            })
        })
        .collect()
}

fn experience_entries(data: &ResumeData) -> Vec<Block> {
    data.experience
        .iter()
        .map(|exp| {
            Block::Entry(Entry {
                kind: EntryKind::Experience,
                heading: owned(non_blank(&exp.title)),
                aside: owned(non_blank(&exp.duration)),
                subheading: owned(non_blank(&exp.company)),
                details: owned(present(&exp.description)).into_iter().collect(),
            })
        })
        .collect()
}

fn project_entries(data: &ResumeData) -> Vec<Block> {
    data.projects
        .iter()
        .filter(|p| {
            non_blank(&p.name).is_some() || present(&p.description).is_some()
        })
        .map(|p| {
            Block::Entry(Entry {
                kind: EntryKind::Project,
                heading: owned(non_blank(&p.name)),
                aside: owned(present(&p.link)),
                subheading: owned(present(&p.technologies)),
                details: owned(present(&p.description)).into_iter().collect(),
            })
        })
        .collect()
}

fn certification_entries(data: &ResumeData) -> Vec<Block> {
    data.certifications
        .iter()
        .filter(|c| non_blank(&c.name).is_some())
        .map(|c| {
            Block::Entry(Entry {
                kind: EntryKind::Certification,
                heading: owned(non_blank(&c.name)),
                aside: owned(present(&c.date)),
                subheading: owned(present(&c.issuer)),
                details: Vec::new(),
            })
        })
        .collect()
}

fn skill_blocks(data: &ResumeData) -> Vec<Block> {
    data.skills
        .iter()
        .filter_map(|group| {
            non_blank(&group.items).map(|items| Block::Tags {
                label: owned(non_blank(&group.category)),
                items: items.to_string(),
            })
        })
        .collect()
}
