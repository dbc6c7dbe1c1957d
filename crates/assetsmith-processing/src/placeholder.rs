use anyhow::{Context, Result};
use assetsmith_core::ImageSize;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use sha2::{Digest, Sha256};
use std::io::Cursor;

const BACKGROUND: Rgb<u8> = Rgb([240, 240, 240]);
const FRAME: Rgb<u8> = Rgb([120, 120, 120]);
const FRAME_INSET: u32 = 40;
const FRAME_WIDTH: u32 = 4;
const STRIPES: usize = 8;

/// Draw a placeholder PNG standing in for a generated image.
///
/// A light grey canvas with a dark frame and a band of stripes whose shades are
/// derived from the prompt, so different rows get visibly different files.
pub fn placeholder_image(prompt: &str, size: ImageSize) -> Result<Vec<u8>> {
    let ImageSize { width, height } = size;
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    let inner_w = width.saturating_sub(2 * FRAME_INSET);
    let inner_h = height.saturating_sub(2 * FRAME_INSET);

    for i in 0..FRAME_WIDTH {
        let w = inner_w.saturating_sub(2 * i);
        let h = inner_h.saturating_sub(2 * i);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at((FRAME_INSET + i) as i32, (FRAME_INSET + i) as i32).of_size(w, h);
        draw_hollow_rect_mut(&mut canvas, rect, FRAME);
    }

    let digest = Sha256::digest(prompt.as_bytes());
    let band_h = inner_h / 6;
    let stripe_w = inner_w.saturating_sub(4 * FRAME_WIDTH) / STRIPES as u32;
    if band_h > 0 && stripe_w > 0 {
        let top = (FRAME_INSET + inner_h / 2 - band_h / 2) as i32;
        for (i, chunk) in digest.chunks(3).take(STRIPES).enumerate() {
            let shade = Rgb([
                chunk[0] / 2 + 64,
                chunk.get(1).copied().unwrap_or(0) / 2 + 64,
                chunk.get(2).copied().unwrap_or(0) / 2 + 64,
            ]);
            let left = (FRAME_INSET + 2 * FRAME_WIDTH + i as u32 * stripe_w) as i32;
            draw_filled_rect_mut(
                &mut canvas,
                Rect::at(left, top).of_size(stripe_w, band_h),
                shade,
            );
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(canvas)
        .write_to(&mut cursor, ImageFormat::Png)
        .context("Failed to encode placeholder image")?;

    tracing::debug!(width, height, "Rendered placeholder image");
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn renders_png_of_requested_size() {
        let png = placeholder_image("a red sword icon", ImageSize::default()).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.dimensions(), (1024, 1024));
        assert_eq!(img.to_rgb8().get_pixel(0, 0), &BACKGROUND);
        assert_eq!(img.to_rgb8().get_pixel(40, 40), &FRAME);
    }

    #[test]
    fn different_prompts_differ() {
        let size = ImageSize {
            width: 256,
            height: 256,
        };
        let a = placeholder_image("sword", size).unwrap();
        let b = placeholder_image("shield", size).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, placeholder_image("sword", size).unwrap());
    }

    #[test]
    fn tiny_canvas_does_not_panic() {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        let png = placeholder_image("", size).unwrap();
        assert_eq!(image::load_from_memory(&png).unwrap().dimensions(), (10, 10));
    }
}
