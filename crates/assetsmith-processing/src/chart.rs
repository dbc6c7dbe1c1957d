use anyhow::{Context, Result};
use assetsmith_core::models::StatusCounts;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::io::Cursor;

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;
const MARGIN: u32 = 80;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const SUCCESS: Rgb<u8> = Rgb([46, 160, 67]);
const FAIL: Rgb<u8> = Rgb([215, 58, 73]);
const TITLE_TOP: u32 = 24;
const TITLE_SCALE: u32 = 4;
const LABEL_SCALE: u32 = 3;
const LABEL_GAP: u32 = 12;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// 5x7 bitmap rows, most significant of the low five bits is the leftmost column
fn glyph(c: char) -> [u8; 7] {
    match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'f' => [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        's' => [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        'u' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        _ => [0x00; 7],
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    (text.chars().count() as u32 * GLYPH_ADVANCE).saturating_sub(1) * scale
}

/// Draw `text` horizontally centred on `center_x`, top edge at `top`
fn draw_label(canvas: &mut RgbImage, text: &str, center_x: u32, top: u32, scale: u32) {
    let mut x = center_x.saturating_sub(text_width(text, scale) / 2);
    for c in text.chars() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) != 0 {
                    let rect = Rect::at(
                        (x + col * scale) as i32,
                        (top + row as u32 * scale) as i32,
                    )
                    .of_size(scale, scale);
                    draw_filled_rect_mut(canvas, rect, AXIS);
                }
            }
        }
        x += GLYPH_ADVANCE * scale;
    }
}

/// Chart title carrying both counts
fn chart_title(counts: &StatusCounts) -> String {
    format!("success={}, fail={}", counts.success, counts.fail)
}

/// Render the success/fail bar chart as PNG, titled with both counts
pub fn render_summary_chart(counts: &StatusCounts) -> Result<Vec<u8>> {
    let mut canvas = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let plot_left = MARGIN as f32;
    let plot_right = (WIDTH - MARGIN) as f32;
    let plot_top = MARGIN as f32;
    let baseline = (HEIGHT - MARGIN) as f32;
    let plot_height = HEIGHT - 2 * MARGIN;

    for step in 1..=4 {
        let y = baseline - plot_height as f32 * step as f32 / 4.0;
        draw_line_segment_mut(&mut canvas, (plot_left, y), (plot_right, y), GRID);
    }

    let max = counts.success.max(counts.fail).max(1) as f64;
    let slot = (WIDTH - 2 * MARGIN) / 2;
    let bar_width = slot / 2;

    draw_label(
        &mut canvas,
        &chart_title(counts),
        WIDTH / 2,
        TITLE_TOP,
        TITLE_SCALE,
    );

    let bars = [
        ("success", counts.success, SUCCESS),
        ("fail", counts.fail, FAIL),
    ];
    for (i, (label, value, color)) in bars.into_iter().enumerate() {
        let center = MARGIN + i as u32 * slot + slot / 2;
        draw_label(&mut canvas, label, center, HEIGHT - MARGIN + LABEL_GAP, LABEL_SCALE);

        let bar_height = ((value.max(0) as f64 / max) * plot_height as f64).round() as u32;
        if bar_height == 0 {
            continue;
        }
        let left = MARGIN + i as u32 * slot + (slot - bar_width) / 2;
        let top = HEIGHT - MARGIN - bar_height;
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(left as i32, top as i32).of_size(bar_width, bar_height),
            color,
        );
    }

    draw_line_segment_mut(&mut canvas, (plot_left, baseline), (plot_right, baseline), AXIS);
    draw_line_segment_mut(&mut canvas, (plot_left, plot_top), (plot_left, baseline), AXIS);

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(canvas)
        .write_to(&mut cursor, ImageFormat::Png)
        .context("Failed to encode summary chart")?;
    Ok(cursor.into_inner())
}
