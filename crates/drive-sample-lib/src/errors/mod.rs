use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("OAuth2 error: {0}")]
    OAuth2(String),

    #[error("Drive API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Folder not found: {name}")]
    FolderNotFound { name: String },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Command error: {0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, DriveError>;

/// Logs a fatal error and exits the process with code 1.
///
/// This function never returns (`-> !`). It is intended for unrecoverable
/// errors during initialization.
pub fn handle_fatal(err: DriveError) -> ! {
    tracing::error!("Fatal error: {}", err);
    std::process::exit(1)
}

/// Maps a `DriveError` to user-friendly CLI output with actionable suggestions.
///
/// Uses `crate::output::error()` for the main error message and
/// `crate::output::info()` for hints and suggestions.
pub fn handle_command_error(err: &DriveError) {
    use crate::output;

    match err {
        DriveError::Auth(msg) => {
            output::error(&format!("Authentication error: {}", msg));
            output::info("Run `drive-sample auth login` to authenticate.");
        }
        DriveError::OAuth2(msg) => {
            output::error(&format!("OAuth2 error: {}", msg));
            output::info("Run `drive-sample auth login` to re-authenticate.");
        }
        DriveError::Api { status, message } => {
            output::error(&format!("Drive API error ({}): {}", status, message));
            output::info("Check your network connection and Drive permissions.");
        }
        DriveError::FolderNotFound { name } => {
            output::error(&format!("Folder not found on Drive: {}", name));
            output::info("Create the folder on Drive first, or pass a different --folder.");
        }
        DriveError::Http(e) => {
            output::error(&format!("Network error: {}", e));
            output::info("Check your internet connection.");
        }
        DriveError::Io(e) => {
            output::error(&format!("File error: {}", e));
        }
        DriveError::Config(msg) => {
            output::error(&format!("Configuration error: {}", msg));
        }
        DriveError::Upload(msg) => {
            output::error(&format!("Upload failed: {}", msg));
        }
        DriveError::Download(msg) => {
            output::error(&format!("Download failed: {}", msg));
        }
        DriveError::Command(msg) => {
            output::error(&format!("Error: {}", msg));
        }
        _ => {
            output::error(&format!("{}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_not_found_display() {
        let err = DriveError::FolderNotFound {
            name: "LIVROS".into(),
        };
        assert_eq!(err.to_string(), "Folder not found: LIVROS");
    }

    #[test]
    fn test_api_error_display() {
        let err = DriveError::Api {
            status: 403,
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "Drive API error (403): quota exceeded");
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DriveError = io.into();
        assert!(matches!(err, DriveError::Io(_)));
    }

    #[test]
    fn test_handle_command_error_does_not_panic() {
        handle_command_error(&DriveError::Auth("no token".into()));
        handle_command_error(&DriveError::FolderNotFound { name: "x".into() });
        handle_command_error(&DriveError::Upload("session expired".into()));
    }
}
