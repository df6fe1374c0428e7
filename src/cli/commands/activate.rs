//! Activate command - purge caches left by other versions

use crate::cli::commands::{build_worker, open_storage};
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the activate command
pub async fn execute(config: &Config) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    let storage = open_storage(config);
    let worker = build_worker(config, storage, true)?;

    worker.resume_installed().await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Activating {}...", worker.version()));
    let report = match worker.activate().await {
        Ok(report) => {
            spinner.stop("Activated");
            report
        }
        Err(e) => {
            spinner.stop_error("Activation failed");
            return Err(e);
        }
    };

    if report.deleted.is_empty() {
        ui::step_ok(&ctx, "No stale caches");
    }
    for name in &report.deleted {
        ui::step_ok(&ctx, &format!("Removed {}", name));
    }
    for name in &report.failed {
        ui::step_warn(&ctx, &format!("Could not remove {}", name));
    }

    ui::outro_success(&ctx, &format!("{} is active", report.bucket));
    Ok(())
}
