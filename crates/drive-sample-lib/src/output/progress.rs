use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for upload/download transfers with bytes, speed, and ETA display.
pub fn create_transfer_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    pb
}

/// Create a spinner for indeterminate operations such as folder lookup.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(msg.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_transfer_progress() {
        let pb = create_transfer_progress(1024);
        assert_eq!(pb.length(), Some(1024));
        pb.finish_and_clear();
    }

    #[test]
    fn test_create_transfer_progress_zero() {
        let pb = create_transfer_progress(0);
        assert_eq!(pb.length(), Some(0));
        pb.finish_and_clear();
    }

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Resolving folder...");
        assert_eq!(pb.message(), "Resolving folder...");
        pb.finish_and_clear();
    }
}
