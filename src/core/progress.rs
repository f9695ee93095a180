//! Progress reporting for the command line using indicatif.
//!
//! Bars are hidden whenever stderr is not a terminal, so piped JSON output
//! stays clean.

use indicatif::{ProgressBar, ProgressStyle};

/// Style templates.
pub mod styles {
    use super::*;

    /// Per-repository file extraction.
    pub fn file_progress() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("#>-")
    }

    /// Indeterminate stages: fetching, cross-file analysis.
    pub fn spinner() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template")
    }
}

/// Check if stderr is a TTY.
pub fn is_tty() -> bool {
    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}

/// File progress bar for one repository, labeled with its role.
pub fn create_progress(label: &str, total: usize) -> ProgressBar {
    if !is_tty() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(styles::file_progress());
    bar.set_prefix(label.to_string());
    bar.set_message("files");
    bar
}

/// Spinner for stages without a known length.
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_tty() {
        let bar = ProgressBar::new_spinner();
        bar.set_style(styles::spinner());
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar
    } else {
        ProgressBar::hidden()
    }
}

/// Progress callback driving a bar, for `AnalysisContext::with_progress`
/// and the pipeline.
pub fn callback(bar: &ProgressBar) -> impl Fn(usize, usize) + Send + Sync + 'static {
    let bar = bar.clone();
    move |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_hidden_in_tests() {
        let bar = create_progress("reference", 100);
        bar.inc(1);
        assert_eq!(bar.position(), 1);
    }

    #[test]
    fn test_callback_tracks_position_and_length() {
        let bar = ProgressBar::hidden();
        let report = callback(&bar);
        report(3, 10);
        assert_eq!(bar.position(), 3);
        assert_eq!(bar.length(), Some(10));
    }

    #[test]
    fn test_create_spinner() {
        let spinner = create_spinner("fetching");
        spinner.finish();
    }

    #[test]
    fn test_styles_dont_panic() {
        let _ = styles::file_progress();
        let _ = styles::spinner();
    }
}
