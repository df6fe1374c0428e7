//! Spinners and progress bars with CI fallback

use super::context::UiContext;
use crate::http::RequestKey;
use crate::worker::ProgressHook;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Progress bar over the precache manifest.
///
/// Interactive terminals get an indicatif bar; CI gets one line per entry.
#[derive(Clone)]
pub struct InstallProgress {
    bar: Option<ProgressBar>,
}

impl InstallProgress {
    pub fn new(ctx: &UiContext, version: &str, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            if let Ok(bar_style) = ProgressStyle::default_bar().template(
                "  {spinner:.blue} Caching {prefix}  {bar:20.blue/dim} {pos}/{len} {msg:.dim}",
            ) {
                bar.set_style(bar_style.progress_chars("━╸─"));
            }
            bar.set_prefix(version.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Caching {} assets for {}...", total, version);
            None
        };
        Self { bar }
    }

    /// Record one cached entry
    pub fn inc(&self, key: &RequestKey) {
        match self.bar {
            Some(ref bar) => {
                bar.set_message(key.url.clone());
                bar.inc(1);
            }
            None => println!("  cached {}", key.url),
        }
    }

    /// Hook for the cache manager
    pub fn hook(&self) -> ProgressHook {
        let progress = self.clone();
        Arc::new(move |key: &RequestKey| progress.inc(key))
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
