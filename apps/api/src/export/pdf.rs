//! PDF assembly with `lopdf`.
//!
//! The capture is embedded once as a Flate-compressed RGB image XObject and
//! drawn on every page of the plan. Each page clips to its own bounds before
//! drawing, so only that page's slice of the tall image is visible regardless
//! of how a viewer treats content outside the media box.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::export::paginate::PagePlan;
use crate::export::ExportError;

const IMAGE_NAME: &str = "Im0";

/// Builds the paginated document and returns its bytes.
///
/// No timestamps or random IDs are written, so identical inputs produce
/// identical bytes.
pub fn build_pdf(image: &RgbImage, plan: &PagePlan) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(image.as_raw())?;
    let compressed = encoder.finish()?;

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        compressed,
    ));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            IMAGE_NAME => image_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(plan.page_count());
    for index in 0..plan.page_count() {
        let content = page_content(plan, index);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.0_f32.into(), 0.0_f32.into(), plan.page_width.into(), plan.page_height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => plan.page_count() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// `q  0 0 W H re W n  w 0 0 h 0 y cm  /Im0 Do  Q`
fn page_content(plan: &PagePlan, index: usize) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "re",
                vec![
                    0.0_f32.into(),
                    0.0_f32.into(),
                    plan.page_width.into(),
                    plan.page_height.into(),
                ],
            ),
            Operation::new("W", vec![]),
            Operation::new("n", vec![]),
            Operation::new(
                "cm",
                vec![
                    plan.page_width.into(),
                    0.0_f32.into(),
                    0.0_f32.into(),
                    plan.image_height.into(),
                    0.0_f32.into(),
                    plan.pdf_image_y(index).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::paginate::plan_pages;
    use crate::layout::PageFormat;
    use image::Rgb as Pixel;

    fn tall_image(height: u32) -> RgbImage {
        RgbImage::from_pixel(100, height, Pixel([250, 250, 250]))
    }

    #[test]
    fn test_page_count_matches_plan() {
        let img = tall_image(400);
        let plan = plan_pages(img.width(), img.height(), PageFormat::A4);
        let bytes = build_pdf(&img, &plan).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), plan.page_count());
        assert_eq!(plan.page_count(), 3);
    }

    #[test]
    fn test_each_page_clips_then_draws_shifted_image() {
        let img = tall_image(300);
        let plan = plan_pages(img.width(), img.height(), PageFormat::A4);
        let bytes = build_pdf(&img, &plan).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        for (index, (_, page_id)) in doc.get_pages().into_iter().enumerate() {
            let raw = doc.get_page_content(page_id).unwrap();
            let content = Content::decode(&raw).unwrap();
            let ops: Vec<&str> = content.operations.iter().map(|o| o.operator.as_str()).collect();
            assert_eq!(ops, vec!["q", "re", "W", "n", "cm", "Do", "Q"]);

            let y = content.operations[4].operands[5].as_float().unwrap();
            assert!((y - plan.pdf_image_y(index)).abs() < 0.01, "page {index}");
        }
    }

    #[test]
    fn test_same_input_same_bytes() {
        let img = tall_image(250);
        let plan = plan_pages(img.width(), img.height(), PageFormat::Letter);
        assert_eq!(build_pdf(&img, &plan).unwrap(), build_pdf(&img, &plan).unwrap());
    }
}
