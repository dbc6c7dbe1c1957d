use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Kind of media a row asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

/// Output encodings a row can request in its `output_format` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Png,
    Jpg,
    Gif,
    Mp3,
}

impl OutputFormat {
    /// Encoding produced by the image backend before any conversion
    pub const BASELINE_IMAGE: OutputFormat = OutputFormat::Png;

    pub fn media_kind(self) -> MediaKind {
        match self {
            OutputFormat::Png | OutputFormat::Jpg | OutputFormat::Gif => MediaKind::Image,
            OutputFormat::Mp3 => MediaKind::Audio,
        }
    }

    /// File extension used for staged artifacts
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Gif => "gif",
            OutputFormat::Mp3 => "mp3",
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Mp3 => "audio/mpeg",
        }
    }

    /// Guess the format of a staged file from its extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpg),
            "gif" => Some(OutputFormat::Gif),
            "mp3" => Some(OutputFormat::Mp3),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    /// Parses the normalized (trimmed, upper-cased) column value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PNG" => Ok(OutputFormat::Png),
            "JPG" => Ok(OutputFormat::Jpg),
            "GIF" => Ok(OutputFormat::Gif),
            "MP3" => Ok(OutputFormat::Mp3),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OutputFormat::Png => write!(f, "PNG"),
            OutputFormat::Jpg => write!(f, "JPG"),
            OutputFormat::Gif => write!(f, "GIF"),
            OutputFormat::Mp3 => write!(f, "MP3"),
        }
    }
}
