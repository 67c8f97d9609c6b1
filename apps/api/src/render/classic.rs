//! Classic: centred serif header, upper-case section titles over thin rules,
//! education before experience.

use super::{header_block, sections, Align, Block, RenderedDocument, Rgb, SectionId, Template, Theme};
use crate::layout::FontFamily;
use crate::models::resume::ResumeData;

const ORDER: [SectionId; 6] = [
    SectionId::Summary,
    SectionId::Education,
    SectionId::Experience,
    SectionId::Projects,
    SectionId::Skills,
    SectionId::Certifications,
];

pub fn theme() -> Theme {
    Theme {
        font: FontFamily::ComputerModern,
        text: Rgb::BLACK,
        muted: Rgb(0x40, 0x40, 0x40),
        accent: Rgb::BLACK,
        header_align: Align::Center,
        header_band: None,
        header_text: Rgb::BLACK,
        uppercase_titles: true,
        section_rule: true,
        name_size: 26.0,
        title_size: 17.0,
        heading_size: 15.0,
        body_size: 13.0,
    }
}

pub fn render(data: &ResumeData) -> RenderedDocument {
    let mut blocks: Vec<Block> = vec![header_block(data)];
    blocks.extend(sections(data, &ORDER));
    RenderedDocument {
        template: Template::Classic,
        theme: theme(),
        blocks,
    }
}
