pub mod auth;
pub mod delete;
pub mod download;
pub mod upload;

use clap::{ArgMatches, Command};

use crate::cloud::gdrive::DriveClient;
use crate::config::SampleConfig;
use crate::errors::{DriveError, Result};
use crate::http_client::HttpClient;

/// Attach every sample subcommand to the root command.
pub fn register_commands(root: Command) -> Command {
    root.subcommand(auth::auth_command())
        .subcommand(upload::upload_command())
        .subcommand(download::download_command())
        .subcommand(delete::delete_command())
}

/// Route to the matched subcommand handler.
///
/// The `auth` handler loads OAuth2 credentials itself, so `auth status`
/// can report token state before `client_secrets.json` exists.
pub async fn dispatch_command(
    name: &str,
    matches: &ArgMatches,
    config: &SampleConfig,
) -> Result<()> {
    if name == "auth" {
        return auth::handle_auth(matches, config).await;
    }

    let http = HttpClient::new()?;
    let client = DriveClient::from_config(http, config).await?;

    match name {
        "upload" => upload::handle_upload(matches, &client, config).await,
        "download" => download::handle_download(matches, &client, config).await,
        "delete" => delete::handle_delete(matches, &client).await,
        _ => Err(DriveError::Command(format!("Unknown command: {name}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::create_root_command;

    #[test]
    fn test_all_subcommands_registered() {
        let root = register_commands(create_root_command());
        let names: Vec<&str> = root.get_subcommands().map(|c| c.get_name()).collect();
        assert!(names.contains(&"auth"));
        assert!(names.contains(&"upload"));
        assert!(names.contains(&"download"));
        assert!(names.contains(&"delete"));
        assert_eq!(names.len(), 4);
    }
}
