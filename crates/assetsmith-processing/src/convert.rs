use anyhow::{anyhow, Context, Result};
use assetsmith_core::models::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_QUALITY: u8 = 95;

/// Converts the backend's baseline PNG into the format requested for a row
pub struct ImageConverter;

impl ImageConverter {
    /// Convert image bytes to `target`.
    ///
    /// PNG input passes through untouched when PNG is requested. JPG drops the
    /// alpha channel (RGB, quality 95); GIF keeps it (RGBA, palette-quantized).
    pub fn convert(data: &[u8], target: OutputFormat) -> Result<Vec<u8>> {
        match target {
            OutputFormat::Png if data.starts_with(PNG_SIGNATURE) => Ok(data.to_vec()),
            OutputFormat::Png => Self::encode(&Self::decode(data)?, ImageFormat::Png),
            OutputFormat::Jpg => Self::to_jpeg(&Self::decode(data)?),
            OutputFormat::Gif => {
                let rgba = DynamicImage::ImageRgba8(Self::decode(data)?.to_rgba8());
                Self::encode(&rgba, ImageFormat::Gif)
            }
            OutputFormat::Mp3 => Err(anyhow!("Cannot convert an image to {}", target)),
        }
    }

    fn decode(data: &[u8]) -> Result<DynamicImage> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .context("Failed to read image data")?
            .decode()
            .context("Failed to decode generated image")
    }

    fn to_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
        let rgb = img.to_rgb8();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
        rgb.write_with_encoder(encoder)
            .context("Failed to encode JPEG")?;
        Ok(buffer)
    }

    fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, format)
            .with_context(|| format!("Failed to encode {:?}", format))?;
        Ok(cursor.into_inner())
    }
}
