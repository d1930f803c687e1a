//! Progress indicators for long-running pipeline steps
//!
//! Bars draw to stderr and stay hidden when it is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar counting resources
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Spinner for steps without a known length
pub fn create_spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_bar() {
        let pb = create_progress_bar(12, "Hashing resources");
        assert_eq!(pb.length(), Some(12));
        pb.finish_and_clear();
    }

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Publishing documents");
        assert!(!pb.is_finished());
        pb.finish_and_clear();
    }
}
