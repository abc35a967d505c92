use basinlink_ingest::wfs::DownloadEvent;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a byte-denominated bar for a download with a known total size
pub fn create_download_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n[{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) ETA: {eta}")
            .unwrap()
            .progress_chars("█▓▒░ "),
    );
    pb.set_message(message.to_string());
    pb
}

/// Progress display for a streaming download.
///
/// Starts as a spinner and switches to a byte bar once the server reports
/// a content length; servers that stream without one keep the spinner.
pub struct DownloadProgress {
    bar: ProgressBar,
    message: String,
}

impl DownloadProgress {
    pub fn new(message: &str) -> Self {
        Self {
            bar: create_spinner(message),
            message: message.to_string(),
        }
    }

    pub fn handle(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started {
                total_bytes: Some(total),
            } => {
                self.bar.finish_and_clear();
                self.bar = create_download_bar(total, &self.message);
            }
            DownloadEvent::Started { total_bytes: None } => {}
            DownloadEvent::Chunk { bytes_so_far } => {
                self.bar.set_position(bytes_so_far);
            }
            DownloadEvent::Finished { total_bytes } => {
                self.bar
                    .finish_with_message(format!("✓ Downloaded {} bytes", total_bytes));
            }
        }
    }

    /// Leave the bar in place when the download fails partway
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
