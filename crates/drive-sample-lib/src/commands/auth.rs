//! OAuth2 authentication subcommands: login, refresh, status.

use clap::{ArgMatches, Command};

use crate::cloud::gdrive::{DriveClient, StoredToken};
use crate::config::SampleConfig;
use crate::errors::{DriveError, Result};
use crate::http_client::HttpClient;
use crate::output;

/// Build the `auth` clap command.
pub fn auth_command() -> Command {
    Command::new("auth")
        .about("OAuth2 authentication flow")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("login").about("Start the OAuth2 login flow"))
        .subcommand(Command::new("refresh").about("Refresh the access token"))
        .subcommand(Command::new("status").about("Show current auth status"))
}

/// Build a client from the configured secrets file. Only the `login` and
/// `refresh` flows need one; `status` reads the token file directly.
async fn client_from(config: &SampleConfig) -> Result<DriveClient> {
    DriveClient::from_config(HttpClient::new()?, config).await
}

/// Handle the `auth` command dispatch.
pub async fn handle_auth(matches: &ArgMatches, config: &SampleConfig) -> Result<()> {
    match matches.subcommand() {
        Some(("login", _)) => {
            let client = client_from(config).await?;
            let (url, _csrf) = client.authorization_url()?;
            output::info("Open this URL in your browser to authorize:");
            println!("{}", url);
            println!();
            output::info("Enter the authorization code:");

            let mut code = String::new();
            std::io::stdin()
                .read_line(&mut code)
                .map_err(|e| DriveError::Command(format!("Failed to read auth code: {}", e)))?;
            let code = code.trim();

            if code.is_empty() {
                return Err(DriveError::Command(
                    "Authorization code cannot be empty".into(),
                ));
            }

            let token = client.exchange_code(code).await?;
            output::success(&format!(
                "Successfully authenticated. Token type: {}",
                token.token_type
            ));
            Ok(())
        }
        Some(("refresh", _)) => {
            let client = client_from(config).await?;
            let token = client.refresh_access_token().await?;
            output::success(&format!(
                "Token refreshed. Expires: {}",
                token
                    .expiry
                    .map(|e| e.to_rfc3339())
                    .unwrap_or_else(|| "unknown".into())
            ));
            Ok(())
        }
        Some(("status", _)) => {
            match StoredToken::read(&config.token_file).await? {
                Some(token) => {
                    output::success("Authenticated");
                    println!("  Token type:    {}", token.token_type);
                    println!(
                        "  Expires:       {}",
                        token
                            .expiry
                            .map(|e| e.to_rfc3339())
                            .unwrap_or_else(|| "unknown".into())
                    );
                    println!(
                        "  Refresh token: {}",
                        if token.refresh_token.is_some() {
                            "present"
                        } else {
                            "none"
                        }
                    );
                }
                None => {
                    output::warning("Not authenticated");
                    output::info("Run `drive-sample auth login` to authenticate.");
                }
            }
            Ok(())
        }
        _ => unreachable!("subcommand_required is set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::upload::DEFAULT_CHUNK_SIZE;

    fn config_in(dir: &std::path::Path) -> SampleConfig {
        SampleConfig {
            home_dir: dir.to_path_buf(),
            config_dir: dir.to_path_buf(),
            secrets_file: dir.join("client_secrets.json"),
            token_file: dir.join("token.json"),
            download_dir: dir.join("Downloads"),
            default_folder: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[tokio::test]
    async fn test_auth_status_needs_no_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let matches = auth_command()
            .try_get_matches_from(["auth", "status"])
            .unwrap();
        handle_auth(&matches, &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_status_reads_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        tokio::fs::write(
            &config.token_file,
            r#"{"access_token":"ya29.xxx","refresh_token":"1//xxx","token_type":"Bearer","expiry":null}"#,
        )
        .await
        .unwrap();

        let matches = auth_command()
            .try_get_matches_from(["auth", "status"])
            .unwrap();
        handle_auth(&matches, &config).await.unwrap();
    }

    #[test]
    fn test_auth_requires_subcommand() {
        let cmd = auth_command();
        assert!(cmd.try_get_matches_from(["auth"]).is_err());
    }

    #[test]
    fn test_auth_login_parses() {
        let cmd = auth_command();
        let matches = cmd.try_get_matches_from(["auth", "login"]).unwrap();
        assert_eq!(matches.subcommand_name(), Some("login"));
    }

    #[test]
    fn test_auth_status_parses() {
        let cmd = auth_command();
        let matches = cmd.try_get_matches_from(["auth", "status"]).unwrap();
        assert_eq!(matches.subcommand_name(), Some("status"));
    }
}
