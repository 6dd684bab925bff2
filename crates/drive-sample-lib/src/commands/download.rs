//! The `download` subcommand: chunked download with a progress bar.

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command};

use crate::cloud::gdrive::DriveClient;
use crate::config::SampleConfig;
use crate::errors::Result;
use crate::output;
use crate::output::progress::create_transfer_progress;

/// Build the `download` clap command.
pub fn download_command() -> Command {
    Command::new("download")
        .about("Download a file from Drive in 256 KiB chunks")
        .arg(
            Arg::new("file-id")
                .required(true)
                .help("File ID to download"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .help("Directory to write into (default: DRIVE_SAMPLE_DOWNLOAD_DIR)"),
        )
}

/// Handle the `download` command.
pub async fn handle_download(
    matches: &ArgMatches,
    client: &DriveClient,
    config: &SampleConfig,
) -> Result<()> {
    let file_id = matches.get_one::<String>("file-id").unwrap();
    let dest_dir = matches
        .get_one::<String>("output-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.download_dir.clone());

    // Length is unknown until the metadata lookup inside the client; the bar
    // picks it up from the first progress callback.
    let pb = create_transfer_progress(0);
    let result = client
        .download_file(file_id, &dest_dir, |written, total| {
            if let Some(total) = total {
                if pb.length() != Some(total) {
                    pb.set_length(total);
                }
            }
            pb.set_position(written);
        })
        .await;

    match result {
        Ok(download) => {
            pb.finish_with_message("Done");
            output::success(&format!(
                "{} was downloaded successfully ({})",
                download.path.display(),
                output::format_size(download.total_bytes)
            ));
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_requires_file_id() {
        let cmd = download_command();
        assert!(cmd.try_get_matches_from(["download"]).is_err());
    }

    #[test]
    fn test_download_parses_output_dir() {
        let cmd = download_command();
        let matches = cmd
            .try_get_matches_from(["download", "file123", "-o", "/tmp/out"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("file-id").map(|s| s.as_str()),
            Some("file123")
        );
        assert_eq!(
            matches.get_one::<String>("output-dir").map(|s| s.as_str()),
            Some("/tmp/out")
        );
    }
}
