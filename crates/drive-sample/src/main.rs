use drive_sample_lib::cli::{create_root_command, is_verbose};
use drive_sample_lib::commands::{dispatch_command, register_commands};
use drive_sample_lib::config::SampleConfig;
use drive_sample_lib::errors::{handle_command_error, handle_fatal, DriveError};

#[tokio::main]
async fn main() {
    // Step 1: Initialize SampleConfig (singleton, from env vars)
    let config = SampleConfig::get();

    // Step 2: Parse the CLI
    let root = register_commands(create_root_command());
    let matches = root.get_matches();

    // Step 3: Initialize logger, wiring verbose mode from parsed args
    let verbose = is_verbose(&matches);
    drive_sample_lib::logger::init(verbose);
    drive_sample_lib::logger::set_verbose(verbose);

    // Step 4: Dispatch to subcommand handler
    match matches.subcommand() {
        Some((name, sub_matches)) => {
            tracing::debug!(command = name, "Executing command");
            if let Err(e) = dispatch_command(name, sub_matches, config).await {
                handle_command_error(&e);
                std::process::exit(1);
            }
        }
        None => {
            // No subcommand — print help
            let mut cmd = register_commands(create_root_command());
            if let Err(e) = cmd
                .print_help()
                .map_err(|e| DriveError::Command(format!("Failed to print help: {e}")))
            {
                handle_fatal(e);
            }
        }
    }
}
