//! Modern: left-aligned name on a dark band, accent-coloured titles,
//! experience first and skills high up.

use super::{header_block, sections, Align, Block, RenderedDocument, Rgb, SectionId, Template, Theme};
use crate::layout::FontFamily;
use crate::models::resume::ResumeData;

const ORDER: [SectionId; 6] = [
    SectionId::Summary,
    SectionId::Experience,
    SectionId::Skills,
    SectionId::Education,
    SectionId::Projects,
    SectionId::Certifications,
];

pub fn theme() -> Theme {
    Theme {
        font: FontFamily::Inter,
        text: Rgb(0x1f, 0x29, 0x37),
        muted: Rgb(0x4b, 0x55, 0x63),
        accent: Rgb(0x25, 0x63, 0xeb),
        header_align: Align::Left,
        header_band: Some(Rgb(0x1e, 0x29, 0x3b)),
        header_text: Rgb::WHITE,
        uppercase_titles: true,
        section_rule: true,
        name_size: 28.0,
        title_size: 16.0,
        heading_size: 15.0,
        body_size: 13.0,
    }
}

pub fn render(data: &ResumeData) -> RenderedDocument {
    let mut blocks: Vec<Block> = vec![header_block(data)];
    blocks.extend(sections(data, &ORDER));
    RenderedDocument {
        template: Template::Modern,
        theme: theme(),
        blocks,
    }
}
