pub mod gdrive;
pub mod upload;
