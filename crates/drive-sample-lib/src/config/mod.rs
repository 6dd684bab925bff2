use std::path::PathBuf;
use std::sync::OnceLock;

use crate::cloud::upload::{DEFAULT_CHUNK_SIZE, UPLOAD_CHUNK_UNIT};

/// Immutable application configuration initialized once at startup from environment variables.
///
/// Access via `SampleConfig::get()` which returns a `&'static SampleConfig`.
/// The singleton is lazily initialized on first access using `OnceLock`.
///
/// Environment variables:
/// - `DRIVE_SAMPLE_CONFIG_DIR` — directory holding secrets and token files
///   (default `~/.config/drive-sample`)
/// - `DRIVE_SAMPLE_SECRETS` — path to `client_secrets.json`
/// - `DRIVE_SAMPLE_DOWNLOAD_DIR` — where downloads are written (default `~/Downloads`)
/// - `DRIVE_SAMPLE_FOLDER` — default Drive folder name for uploads
/// - `DRIVE_SAMPLE_CHUNK_SIZE` — upload chunk size in bytes, clamped to a
///   multiple of the 256 KiB protocol unit
pub struct SampleConfig {
    pub home_dir: PathBuf,
    pub config_dir: PathBuf,
    pub secrets_file: PathBuf,
    pub token_file: PathBuf,
    pub download_dir: PathBuf,
    pub default_folder: String,
    pub chunk_size: u64,
}

static CONFIG: OnceLock<SampleConfig> = OnceLock::new();

impl SampleConfig {
    /// Returns a reference to the global `SampleConfig` singleton.
    /// Initializes from environment variables on first call.
    pub fn get() -> &'static SampleConfig {
        CONFIG.get_or_init(SampleConfig::from_env)
    }

    fn from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        let home_dir = PathBuf::from(&home);

        let config_dir = std::env::var("DRIVE_SAMPLE_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir.join(".config/drive-sample"));

        let secrets_file = std::env::var("DRIVE_SAMPLE_SECRETS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("client_secrets.json"));

        let download_dir = std::env::var("DRIVE_SAMPLE_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir.join("Downloads"));

        let chunk_size = std::env::var("DRIVE_SAMPLE_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(clamp_chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        Self {
            token_file: config_dir.join("token.json"),
            default_folder: std::env::var("DRIVE_SAMPLE_FOLDER").unwrap_or_default(),
            home_dir,
            config_dir,
            secrets_file,
            download_dir,
            chunk_size,
        }
    }
}

/// Clamp a requested chunk size to a non-zero multiple of the resumable
/// upload unit (256 KiB). Values below one unit round up; everything else
/// rounds down to the nearest unit boundary.
pub fn clamp_chunk_size(requested: u64) -> u64 {
    if requested < UPLOAD_CHUNK_UNIT {
        UPLOAD_CHUNK_UNIT
    } else {
        requested - (requested % UPLOAD_CHUNK_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_chunk_size_below_unit() {
        assert_eq!(clamp_chunk_size(0), UPLOAD_CHUNK_UNIT);
        assert_eq!(clamp_chunk_size(1), UPLOAD_CHUNK_UNIT);
        assert_eq!(clamp_chunk_size(UPLOAD_CHUNK_UNIT - 1), UPLOAD_CHUNK_UNIT);
    }

    #[test]
    fn test_clamp_chunk_size_exact_multiple() {
        assert_eq!(clamp_chunk_size(UPLOAD_CHUNK_UNIT), UPLOAD_CHUNK_UNIT);
        assert_eq!(clamp_chunk_size(DEFAULT_CHUNK_SIZE), DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_clamp_chunk_size_rounds_down() {
        assert_eq!(
            clamp_chunk_size(UPLOAD_CHUNK_UNIT * 3 + 17),
            UPLOAD_CHUNK_UNIT * 3
        );
    }

    #[test]
    fn test_default_chunk_is_twice_unit() {
        assert_eq!(DEFAULT_CHUNK_SIZE, UPLOAD_CHUNK_UNIT * 2);
    }
}
