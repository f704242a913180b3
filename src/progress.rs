//! Progress bar helpers for long-running transfers

use indicatif::{ProgressBar, ProgressStyle};

/// Create a byte-scaled progress bar for streaming a file into a table.
pub fn transfer_bar(total_bytes: u64, table: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_bytes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{msg} {spinner:.green} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Streaming {table}"));
    pb
}
