//! Configuration module
//!
//! Everything the job needs is read once from the environment at process start
//! (a `.env` file is loaded first when present). Missing or malformed required
//! settings surface as [`AppError::Configuration`], which aborts the run before
//! any row is touched.

use regex::Regex;
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::AppError;
use crate::storage_types::StorageBackend;

// Common defaults
const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
const DEFAULT_DRIVE_TOKEN_PATH: &str = "token.json";
const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
const DEFAULT_TTS_MODEL: &str = "gpt-4o-mini-tts";
const DEFAULT_TTS_VOICE: &str = "alloy";
const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_OUTPUT_DIR: &str = "outputs";
const DEFAULT_REPORT_DIR: &str = "reports";
const DEFAULT_AUDIT_DATABASE_URL: &str = "sqlite://logs.db";
const DEFAULT_PLACEHOLDER_AUDIO_URL: &str = "https://filesamples.com/samples/audio/mp3/sample3.mp3";
const PLACEHOLDER_FETCH_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

const SHEETS_URL_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";
const SPREADSHEET_KEY_PATTERN: &str = r"^[A-Za-z0-9_-]{20,}$";

/// Reference to the source spreadsheet, parsed from a link or a bare key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReference {
    pub spreadsheet_id: String,
}

impl SheetReference {
    pub fn parse(url_or_id: &str) -> Result<Self, AppError> {
        let key_re = Regex::new(SPREADSHEET_KEY_PATTERN)
            .map_err(|e| AppError::Internal(format!("Invalid spreadsheet key pattern: {}", e)))?;

        let value = url_or_id.trim();
        if value.is_empty() {
            return Err(AppError::Configuration(
                "GOOGLE_SHEET_URL is empty. Set it to a Google Sheets link or spreadsheet ID"
                    .to_string(),
            ));
        }

        if key_re.is_match(value) {
            return Ok(Self {
                spreadsheet_id: value.to_string(),
            });
        }

        if let Some(rest) = value.strip_prefix(SHEETS_URL_PREFIX) {
            let id = rest
                .split(['/', '?', '#'])
                .next()
                .unwrap_or_default();
            if key_re.is_match(id) {
                return Ok(Self {
                    spreadsheet_id: id.to_string(),
                });
            }
        }

        Err(AppError::Configuration(format!(
            "GOOGLE_SHEET_URL is neither a Google Sheets link nor a spreadsheet ID: {}",
            value
        )))
    }
}

/// Requested image dimensions, written as `WIDTHxHEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

impl FromStr for ImageSize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::Configuration(format!("Invalid image size: {}", s));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl Display for ImageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Spreadsheet source settings
#[derive(Clone, Debug)]
pub struct SheetConfig {
    pub reference: String,
    pub credentials_path: PathBuf,
}

/// Upload destination settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub drive_parent_folder_id: Option<String>,
    pub drive_token_path: PathBuf,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl StorageConfig {
    /// Folder (Drive folder id, bucket prefix or directory) artifacts are uploaded into
    pub fn destination_folder(&self) -> String {
        match self.backend {
            StorageBackend::Drive => self.drive_parent_folder_id.clone().unwrap_or_default(),
            StorageBackend::S3 | StorageBackend::Local => "assets".to_string(),
        }
    }
}

/// Generative backend settings
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub openai_api_key: Option<String>,
    pub image_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub image_size: String,
    pub placeholder_audio_url: String,
    pub placeholder_fetch_timeout_secs: u64,
    /// Bound on establishing a connection; requests themselves are unbounded
    pub connect_timeout_secs: u64,
    /// Optional total bound on one generation request; unset means none
    pub generation_timeout_secs: Option<u64>,
}

/// Chat and mail channel settings
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    pub slack_webhook_url: Option<String>,
    pub admin_email: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_app_password: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

/// Boolean switches read once at process start
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeFlags {
    /// Bypass the generative backend and always use placeholder assets
    pub demo_mode: bool,
    /// Reprocess rows whose status is `failed`
    pub retry_failed: bool,
    pub skip_email: bool,
    pub skip_slack: bool,
}

/// Local paths and the audit store location
#[derive(Clone, Debug)]
pub struct PathsConfig {
    pub output_dir: PathBuf,
    pub report_dir: PathBuf,
    pub audit_database_url: String,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub sheet: SheetConfig,
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
    pub notify: NotifyConfig,
    pub flags: RuntimeFlags,
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present)
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str| var(key).map(|v| parse_flag(&v)).unwrap_or(false);

        let backend = match var("STORAGE_BACKEND") {
            Some(value) => value
                .parse::<StorageBackend>()
                .map_err(|e| AppError::Configuration(e.to_string()))?,
            None => StorageBackend::Drive,
        };

        let smtp_port = match var("SMTP_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| {
                AppError::Configuration(format!("SMTP_PORT is not a valid port: {}", value))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let placeholder_fetch_timeout_secs = var("PLACEHOLDER_FETCH_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(PLACEHOLDER_FETCH_TIMEOUT_SECS);
        let connect_timeout_secs = var("HTTP_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(CONNECT_TIMEOUT_SECS);
        let generation_timeout_secs = var("GENERATION_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0);

        Ok(Config {
            sheet: SheetConfig {
                reference: var("GOOGLE_SHEET_URL").unwrap_or_default(),
                credentials_path: PathBuf::from(var_or(
                    "GOOGLE_CREDENTIALS_PATH",
                    DEFAULT_CREDENTIALS_PATH,
                )),
            },
            storage: StorageConfig {
                backend,
                drive_parent_folder_id: var("GOOGLE_DRIVE_PARENT_FOLDER_ID"),
                drive_token_path: PathBuf::from(var_or(
                    "GOOGLE_DRIVE_TOKEN_PATH",
                    DEFAULT_DRIVE_TOKEN_PATH,
                )),
                s3_bucket: var("S3_BUCKET"),
                s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
                s3_endpoint: var("S3_ENDPOINT"),
                local_storage_path: var("LOCAL_STORAGE_PATH"),
                local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            },
            generation: GenerationConfig {
                openai_api_key: var("OPENAI_API_KEY"),
                image_model: var_or("OPENAI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
                tts_model: var_or("OPENAI_TTS_MODEL", DEFAULT_TTS_MODEL),
                tts_voice: var_or("OPENAI_TTS_VOICE", DEFAULT_TTS_VOICE),
                image_size: var_or("IMAGE_SIZE", DEFAULT_IMAGE_SIZE),
                placeholder_audio_url: var_or(
                    "PLACEHOLDER_AUDIO_URL",
                    DEFAULT_PLACEHOLDER_AUDIO_URL,
                ),
                placeholder_fetch_timeout_secs,
                connect_timeout_secs,
                generation_timeout_secs,
            },
            notify: NotifyConfig {
                slack_webhook_url: var("SLACK_WEBHOOK_URL"),
                admin_email: var("ADMIN_EMAIL"),
                smtp_user: var("SMTP_USER"),
                smtp_app_password: var("SMTP_APP_PASSWORD"),
                smtp_host: var_or("SMTP_HOST", DEFAULT_SMTP_HOST),
                smtp_port,
            },
            flags: RuntimeFlags {
                demo_mode: flag("DEMO_MODE"),
                retry_failed: flag("RETRY_FAILED"),
                skip_email: flag("SKIP_EMAIL"),
                skip_slack: flag("SKIP_SLACK"),
            },
            paths: PathsConfig {
                output_dir: PathBuf::from(var_or("OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
                report_dir: PathBuf::from(var_or("REPORT_DIR", DEFAULT_REPORT_DIR)),
                audit_database_url: var_or("AUDIT_DATABASE_URL", DEFAULT_AUDIT_DATABASE_URL),
            },
        })
    }

    /// Check required settings. Runs before any row is read.
    pub fn validate(&self) -> Result<(), AppError> {
        self.sheet_reference()?;
        self.image_size()?;

        require_non_empty_file(&self.sheet.credentials_path)?;

        match self.storage.backend {
            StorageBackend::Drive => {
                if self.storage.drive_parent_folder_id.is_none() {
                    return Err(AppError::Configuration(
                        "STORAGE_BACKEND=drive requires GOOGLE_DRIVE_PARENT_FOLDER_ID".to_string(),
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() || self.storage.s3_region.is_none() {
                    return Err(AppError::Configuration(
                        "STORAGE_BACKEND=s3 requires S3_BUCKET and S3_REGION (or AWS_REGION)"
                            .to_string(),
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none()
                    || self.storage.local_storage_base_url.is_none()
                {
                    return Err(AppError::Configuration(
                        "STORAGE_BACKEND=local requires LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL"
                            .to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn sheet_reference(&self) -> Result<SheetReference, AppError> {
        SheetReference::parse(&self.sheet.reference)
    }

    pub fn image_size(&self) -> Result<ImageSize, AppError> {
        self.generation.image_size.parse()
    }

    /// Whether rows go through the real generative backend
    pub fn uses_generation_backend(&self) -> bool {
        !self.flags.demo_mode && self.generation.openai_api_key.is_some()
    }
}

/// Boolean env switch: `1`, `true`, `yes` and `on` enable it
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn require_non_empty_file(path: &Path) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path).map_err(|_| {
        AppError::Configuration(format!(
            "{} is missing. Download the service account JSON key and place it there",
            path.display()
        ))
    })?;
    if metadata.len() == 0 {
        return Err(AppError::Configuration(format!(
            "{} is empty. Download the service account JSON key and place it there",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const SHEET_ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz0123456789";

    #[test]
    fn sheet_reference_accepts_bare_key() {
        let reference = SheetReference::parse(SHEET_ID).unwrap();
        assert_eq!(reference.spreadsheet_id, SHEET_ID);
    }

    #[test]
    fn sheet_reference_accepts_link() {
        let link = format!("{}{}/edit#gid=0", SHEETS_URL_PREFIX, SHEET_ID);
        let reference = SheetReference::parse(&link).unwrap();
        assert_eq!(reference.spreadsheet_id, SHEET_ID);
    }

    #[test]
    fn sheet_reference_rejects_other_values() {
        assert!(matches!(
            SheetReference::parse(""),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            SheetReference::parse("https://example.com/sheet"),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            SheetReference::parse("short"),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn image_size_parsing() {
        assert_eq!(
            "1024x1024".parse::<ImageSize>().unwrap(),
            ImageSize {
                width: 1024,
                height: 1024
            }
        );
        assert_eq!("512X256".parse::<ImageSize>().unwrap().height, 256);
        assert!("1024".parse::<ImageSize>().is_err());
        assert!("0x10".parse::<ImageSize>().is_err());
        assert_eq!(ImageSize::default().to_string(), "1024x1024");
    }

    #[test]
    fn flags_default_off_and_accept_common_spellings() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.flags, RuntimeFlags::default());

        let config = config_from(&[
            ("DEMO_MODE", "1"),
            ("RETRY_FAILED", "true"),
            ("SKIP_EMAIL", "yes"),
            ("SKIP_SLACK", "0"),
        ])
        .unwrap();
        assert!(config.flags.demo_mode);
        assert!(config.flags.retry_failed);
        assert!(config.flags.skip_email);
        assert!(!config.flags.skip_slack);
    }

    #[test]
    fn defaults_are_applied() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Drive);
        assert_eq!(config.generation.image_model, "gpt-image-1");
        assert_eq!(config.notify.smtp_port, 465);
        assert_eq!(config.paths.audit_database_url, "sqlite://logs.db");
        assert_eq!(config.generation.placeholder_fetch_timeout_secs, 30);
        assert!(!config.uses_generation_backend());
    }

    #[test]
    fn generation_is_unbounded_unless_configured() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.generation.generation_timeout_secs, None);
        assert_eq!(config.generation.connect_timeout_secs, 10);

        let config = config_from(&[
            ("GENERATION_TIMEOUT_SECS", "300"),
            ("HTTP_CONNECT_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.generation.generation_timeout_secs, Some(300));
        assert_eq!(config.generation.connect_timeout_secs, 5);

        let config = config_from(&[("GENERATION_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.generation.generation_timeout_secs, None);
    }

    #[test]
    fn invalid_smtp_port_is_a_configuration_error() {
        let err = config_from(&[("SMTP_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn validate_requires_credentials_file() {
        let config = config_from(&[
            ("GOOGLE_SHEET_URL", SHEET_ID),
            ("GOOGLE_CREDENTIALS_PATH", "/nonexistent/credentials.json"),
            ("GOOGLE_DRIVE_PARENT_FOLDER_ID", "folder"),
        ])
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration(msg)) if msg.contains("missing")
        ));
    }

    #[test]
    fn validate_rejects_empty_credentials_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        let config = config_from(&[
            ("GOOGLE_SHEET_URL", SHEET_ID),
            ("GOOGLE_CREDENTIALS_PATH", &path),
            ("GOOGLE_DRIVE_PARENT_FOLDER_ID", "folder"),
        ])
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration(msg)) if msg.contains("empty")
        ));
    }

    #[test]
    fn validate_checks_backend_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"type\": \"service_account\"}}").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let drive_without_folder = config_from(&[
            ("GOOGLE_SHEET_URL", SHEET_ID),
            ("GOOGLE_CREDENTIALS_PATH", &path),
        ])
        .unwrap();
        assert!(drive_without_folder.validate().is_err());

        let local = config_from(&[
            ("GOOGLE_SHEET_URL", SHEET_ID),
            ("GOOGLE_CREDENTIALS_PATH", &path),
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/assetsmith"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8080/files"),
        ])
        .unwrap();
        assert!(local.validate().is_ok());
        assert_eq!(local.storage.destination_folder(), "assets");

        let drive = config_from(&[
            ("GOOGLE_SHEET_URL", SHEET_ID),
            ("GOOGLE_CREDENTIALS_PATH", &path),
            ("GOOGLE_DRIVE_PARENT_FOLDER_ID", "folder-123"),
        ])
        .unwrap();
        assert!(drive.validate().is_ok());
        assert_eq!(drive.storage.destination_folder(), "folder-123");
    }
}
