//! Fixed values shared across crates.

/// Maximum number of characters of an error message that is persisted or sent.
pub const MAX_ERROR_CHARS: usize = 500;

/// Narration used for audio rows whose description is empty.
pub const DEFAULT_NARRATION: &str = "Sample voice for the game asset pipeline.";

/// Constraints appended to the prompt when a row's model tag is `claude`.
pub const CLAUDE_PROMPT_CONSTRAINTS: &str = "\n\nConstraints: high-quality game-ready asset, consistent style, sharp edges, clean silhouette, plain background, center composition, lighting consistent, no watermark, 1024x1024.";

/// Model tag used when the sheet leaves the column empty.
pub const DEFAULT_MODEL_TAG: &str = "OpenAI";

/// Number of header lines above the first task row.
pub const SHEET_HEADER_ROWS: usize = 1;

/// 1-based sheet columns written with a row's outcome.
pub const STATUS_COLUMN: usize = 6;
pub const OUTPUT_URL_COLUMN: usize = 7;
pub const ERROR_COLUMN: usize = 8;
