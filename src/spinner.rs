//! Pending indicators and terminal helpers
//!
//! Provides:
//! - Spinner shown while a single backend call is in flight
//! - Batch progress bar (one tick per file)
//! - Status icons and styled headers
//!
//! Spinners and bars are registered on a shared [`MultiProgress`]; anything
//! else written to the terminal while they are live goes through
//! [`MultiProgress::suspend`] so the bar line is redrawn afterwards.

use std::time::Duration;

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Width of the banner printed by [`print_header`]
const HEADER_WIDTH: usize = 60;

/// Status indicators
pub struct StatusIcons;

impl StatusIcons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const INFO: &'static str = "ℹ";
    pub const LEAF: &'static str = "🌱";
    pub const CAMERA: &'static str = "📷";
    pub const CHART: &'static str = "📈";
    pub const MODEL: &'static str = "🧠";
    pub const HISTORY: &'static str = "🗂";
}

/// Spinner marking an action as pending
///
/// Dropping it clears the line, so early returns never leave it spinning.
pub struct PendingSpinner {
    progress: MultiProgress,
    bar: ProgressBar,
}

impl PendingSpinner {
    pub fn start(progress: &MultiProgress, message: &str) -> Self {
        let bar = progress.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            progress: progress.clone(),
            bar,
        }
    }
}

impl Drop for PendingSpinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
        self.progress.remove(&self.bar);
    }
}

/// Progress bar for a batch run
pub struct BatchProgress {
    progress: MultiProgress,
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(progress: &MultiProgress, total: usize) -> Self {
        let bar = progress.add(ProgressBar::new(total as u64));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.green/white}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            progress: progress.clone(),
            bar,
        }
    }

    pub fn processing(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Print a line above the bar without tearing it
    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }

    /// Clear the bar and return how long the batch took
    pub fn finish(&self) -> Duration {
        let elapsed = self.bar.elapsed();
        self.bar.finish_and_clear();
        self.progress.remove(&self.bar);
        elapsed
    }
}

/// Format duration for display
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Centre `title` inside the header banner
fn header_title_line(title: &str) -> String {
    let padding = HEADER_WIDTH.saturating_sub(title.chars().count() + 4) / 2;
    format!("{}  {}  {}", " ".repeat(padding), title, " ".repeat(padding))
}

/// Print a styled header
pub fn print_header(title: &str) {
    let rule = "═".repeat(HEADER_WIDTH);
    println!();
    println!("{}", rule.green());
    println!("{}", header_title_line(title).bright_white().bold());
    println!("{}", rule.green());
}

/// Print a styled subheader
pub fn print_subheader(title: &str) {
    println!("\n{} {}", "▶".bright_green(), title.bright_white());
    println!("{}", "─".repeat(40).bright_black());
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.bright_black(), value.white());
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden_progress() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3700)), "1h 1m 40s");
    }

    #[test]
    fn test_header_title_is_centred() {
        let line = header_title_line("LacakTani");
        let padding = (HEADER_WIDTH - "LacakTani".len() - 4) / 2;
        assert!(line.starts_with(&" ".repeat(padding + 2)));
        assert_eq!(line.trim(), "LacakTani");
    }

    #[test]
    fn test_header_title_longer_than_banner() {
        let title = "x".repeat(HEADER_WIDTH + 10);
        assert_eq!(header_title_line(&title), format!("  {}  ", title));
    }

    #[test]
    fn test_spinner_leaves_shared_progress_on_drop() {
        let progress = hidden_progress();
        {
            let _spinner = PendingSpinner::start(&progress, "Saving settings...");
            progress.suspend(|| {});
        }
        let batch = BatchProgress::new(&progress, 2);
        batch.advance();
        batch.println("a.jpg");
        batch.finish();
    }
}
