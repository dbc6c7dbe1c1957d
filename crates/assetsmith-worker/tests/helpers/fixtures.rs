use assetsmith_core::models::TaskRecord;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// 8x8 opaque red PNG, standing in for the backend's baseline image
pub fn tiny_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(8, 8, Rgba([200, 30, 30, 255]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

pub fn task(id: &str, description: &str, format: &str, model: &str, status: &str) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        description: description.to_string(),
        output_format: format.to_string(),
        model: model.to_string(),
        status: status.to_string(),
        ..Default::default()
    }
}

/// The row used in the end-to-end scenario
pub fn red_sword() -> TaskRecord {
    task("7", "a red sword icon", "png", "OpenAI", "")
}
