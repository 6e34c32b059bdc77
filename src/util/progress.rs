//! Progress indicators for per-file work.
//!
//! Bars are drawn only when stderr is an interactive terminal, so piped and
//! `--json` runs stay quiet.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress is shown only if stderr is an interactive terminal.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Determinate bar over `total` items; hidden unless `show`.
#[must_use]
pub fn create_progress_bar(total: u64, message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if show {
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_message(message.to_string());
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// A bar that decides for itself whether to draw.
pub struct FileProgress {
    bar: ProgressBar,
}

impl FileProgress {
    /// `quiet` suppresses the bar even on a terminal.
    #[must_use]
    pub fn new(total: usize, message: &str, quiet: bool) -> Self {
        let show = !quiet && should_show_progress();
        Self {
            bar: create_progress_bar(total as u64, message, show),
        }
    }

    /// Advance by one file, showing its name.
    pub fn advance(&self, file: &str) {
        self.bar.set_message(file.to_string());
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_hidden_when_not_shown() {
        let pb = create_progress_bar(3, "Compiling", false);
        pb.inc(3);
        pb.finish();
        assert_eq!(pb.position(), 3);
    }

    #[test]
    fn test_file_progress_quiet() {
        let progress = FileProgress::new(2, "Compiling", true);
        progress.advance("a.json");
        progress.advance("b.json");
        progress.finish();
    }
}
