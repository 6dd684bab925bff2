//! The `upload` subcommand: folder-scoped resumable upload with a progress bar.

use std::path::Path;

use clap::{Arg, ArgMatches, Command};

use crate::cloud::gdrive::DriveClient;
use crate::config::{clamp_chunk_size, SampleConfig};
use crate::errors::{DriveError, Result};
use crate::output;
use crate::output::progress::{create_spinner, create_transfer_progress};

/// Build the `upload` clap command.
pub fn upload_command() -> Command {
    Command::new("upload")
        .about("Upload a file into a Drive folder using the resumable protocol")
        .arg(
            Arg::new("path")
                .required(true)
                .help("Local file path to upload"),
        )
        .arg(
            Arg::new("folder")
                .long("folder")
                .short('f')
                .help("Destination folder name on Drive (default: DRIVE_SAMPLE_FOLDER)"),
        )
        .arg(
            Arg::new("mime-type")
                .long("mime-type")
                .short('m')
                .default_value("application/octet-stream")
                .help("MIME type of the uploaded content"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .value_parser(clap::value_parser!(u64))
                .help("Upload chunk size in bytes (clamped to a multiple of 256 KiB)"),
        )
}

/// Handle the `upload` command.
pub async fn handle_upload(
    matches: &ArgMatches,
    client: &DriveClient,
    config: &SampleConfig,
) -> Result<()> {
    let path_str = matches.get_one::<String>("path").unwrap();
    let path = Path::new(path_str);
    if !path.exists() {
        return Err(DriveError::Command(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let folder_name = matches
        .get_one::<String>("folder")
        .cloned()
        .unwrap_or_else(|| config.default_folder.clone());
    if folder_name.is_empty() {
        return Err(DriveError::Command(
            "No destination folder. Pass --folder or set DRIVE_SAMPLE_FOLDER.".into(),
        ));
    }

    let mime_type = matches.get_one::<String>("mime-type").unwrap();
    let chunk_size = matches
        .get_one::<u64>("chunk-size")
        .copied()
        .map(clamp_chunk_size)
        .unwrap_or(config.chunk_size);

    let spinner = create_spinner(&format!("Resolving folder \"{}\"...", folder_name));
    let resolved = client.resolve_folder(&folder_name).await;
    spinner.finish_and_clear();
    let folder = resolved?;

    let size = tokio::fs::metadata(path).await?.len();
    output::info(&format!(
        "Uploading {} ({}) to folder \"{}\"...",
        path.display(),
        output::format_size(size),
        folder.name
    ));

    let pb = create_transfer_progress(size);
    let result = client
        .upload_file(path, mime_type, &folder, chunk_size, |p| {
            pb.set_position(p.bytes_sent)
        })
        .await;

    match result {
        Ok(file) => {
            pb.finish_with_message("Done");
            output::success(&format!(
                "\"{}\" was uploaded successfully ({})",
                file.name, file.id
            ));
            if let Some(link) = &file.web_view_link {
                output::verbose(&format!("View: {}", link));
            }
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
    fn test_upload_requires_path() {
        let cmd = upload_command();
        assert!(cmd.try_get_matches_from(["upload"]).is_err());
    }

    #[test]
    fn test_upload_parses_all_flags() {
        let cmd = upload_command();
        let matches = cmd
            .try_get_matches_from([
                "upload",
                "Desert.jpg",
                "--folder",
                "LIVROS",
                "--mime-type",
                "image/jpeg",
                "--chunk-size",
                "524288",
            ])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("path").map(|s| s.as_str()),
            Some("Desert.jpg")
        );
        assert_eq!(
            matches.get_one::<String>("folder").map(|s| s.as_str()),
            Some("LIVROS")
        );
        assert_eq!(
            matches.get_one::<String>("mime-type").map(|s| s.as_str()),
            Some("image/jpeg")
        );
        assert_eq!(matches.get_one::<u64>("chunk-size"), Some(&524288));
    }

    #[test]
    fn test_upload_default_mime_type() {
        let cmd = upload_command();
        let matches = cmd.try_get_matches_from(["upload", "file.bin"]).unwrap();
        assert_eq!(
            matches.get_one::<String>("mime-type").map(|s| s.as_str()),
            Some("application/octet-stream")
        );
    }
}
