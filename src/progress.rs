//! Progress display for group compilation
//!
//! Provides visual feedback on stderr using indicatif. Disabled in quiet
//! and JSON modes.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str = "{spinner:.cyan} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// Progress reporter for a run
pub struct Progress {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner for an indeterminate step
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let style = ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let spinner = ProgressBar::new_spinner().with_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Start a bar over `total` groups; `prefix` stays fixed while the
    /// message names the current group
    pub fn start(&mut self, total: u64, prefix: &str) {
        if !self.enabled || total == 0 {
            return;
        }

        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░");
        let bar = ProgressBar::new(total).with_style(style);
        bar.set_prefix(prefix.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Finish and clear the current bar or spinner
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(true)
    }
}
