//! Minimal: no rules or bands, sentence-case titles in grey, skills last.

use super::{header_block, sections, Align, Block, RenderedDocument, Rgb, SectionId, Template, Theme};
use crate::layout::FontFamily;
use crate::models::resume::ResumeData;

const ORDER: [SectionId; 6] = [
    SectionId::Summary,
    SectionId::Experience,
    SectionId::Education,
    SectionId::Projects,
    SectionId::Certifications,
    SectionId::Skills,
];

pub fn theme() -> Theme {
    Theme {
        font: FontFamily::Lato,
        text: Rgb(0x26, 0x26, 0x26),
        muted: Rgb(0x73, 0x73, 0x73),
        accent: Rgb(0x52, 0x52, 0x52),
        header_align: Align::Left,
        header_band: None,
        header_text: Rgb(0x17, 0x17, 0x17),
        uppercase_titles: false,
        section_rule: false,
        name_size: 24.0,
        title_size: 15.0,
        heading_size: 14.0,
        body_size: 13.0,
    }
}

pub fn render(data: &ResumeData) -> RenderedDocument {
    let mut blocks: Vec<Block> = vec![header_block(data)];
    blocks.extend(sections(data, &ORDER));
    RenderedDocument {
        template: Template::Minimal,
        theme: theme(),
        blocks,
    }
}
