//! Status command - worker identity, buckets and precache coverage

use crate::cli::commands::{build_worker, open_storage};
use crate::config::{Config, ConfigManager};
use crate::error::SwcacheResult;
use crate::storage::CacheStorage;
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(config: &Config) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "swcache status");

    let storage = open_storage(config);
    let worker = build_worker(config, storage.clone(), true)?;

    ui::section(&ctx, "Worker");
    ui::key_value(&ctx, "Version", worker.version());
    ui::key_value(&ctx, "Origin", &worker.origin().to_string());
    ui::key_value(
        &ctx,
        "Storage",
        &ConfigManager::storage_dir(config).display().to_string(),
    );

    ui::section(&ctx, "Buckets");
    let buckets = storage.keys().await?;
    if buckets.is_empty() {
        ui::step_info(&ctx, "No cache buckets");
    }
    for name in &buckets {
        let entries = storage.entries(name).await?.len();
        let label = format!("{} entries", entries);
        if name == worker.version() {
            ui::key_value_status(&ctx, name, &format!("{} (current)", label), true);
        } else {
            ui::key_value_status(&ctx, name, &format!("{} (stale)", label), false);
        }
    }

    ui::section(&ctx, "Precache");
    if !worker.is_installed().await? {
        ui::step_warn_hint(&ctx, "Current version not installed", "Run: swcache install");
        return Ok(());
    }

    let total = worker.manifest().len();
    let missing = worker.missing().await?;
    ui::key_value_status(
        &ctx,
        "Coverage",
        &format!("{}/{}", total - missing.len(), total),
        missing.is_empty(),
    );
    for key in &missing {
        ui::step_warn(&ctx, &format!("Missing {}", key.url));
    }

    if missing.is_empty() && buckets.len() == 1 {
        ui::outro_success(&ctx, "Ready for offline use");
    } else if buckets.len() > 1 {
        ui::outro_warn(&ctx, "Stale caches present - run: swcache activate");
    } else {
        ui::outro_warn(&ctx, "Precache incomplete - run: swcache install");
    }

    Ok(())
}
