//! The `delete` subcommand: remove a file from Drive by id.

use clap::{Arg, ArgMatches, Command};

use crate::cloud::gdrive::DriveClient;
use crate::errors::Result;
use crate::output;

/// Build the `delete` clap command.
pub fn delete_command() -> Command {
    Command::new("delete")
        .about("Delete a file on Drive (not the local file system)")
        .arg(Arg::new("file-id").required(true).help("File ID to delete"))
}

/// Handle the `delete` command.
pub async fn handle_delete(matches: &ArgMatches, client: &DriveClient) -> Result<()> {
    let file_id = matches.get_one::<String>("file-id").unwrap();

    output::info(&format!("Deleting file '{}'...", file_id));
    client.delete_file(file_id).await?;
    output::success("File was deleted successfully");
    Ok(())
}
