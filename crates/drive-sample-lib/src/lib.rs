// drive-sample-lib: shared library for the drive-sample binary

pub mod cli;
pub mod cloud;
pub mod commands;
pub mod config;
pub mod errors;
pub mod http_client;
pub mod logger;
pub mod output;
