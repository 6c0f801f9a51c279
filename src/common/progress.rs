use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner counting records read, with the current file as its message.
pub fn create_record_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {human_pos} records ({per_sec}) {msg}")
            .expect("Failed to create progress style")
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(200));
    pb
}
