//! Install command - precache the configured version and take control

use crate::cli::args::InstallArgs;
use crate::cli::commands::{build_worker, open_storage};
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::storage::CacheStorage;
use crate::ui::{self, InstallProgress, UiContext};
use crate::worker::Registration;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "swcache install");

    let storage = open_storage(config);
    let worker = build_worker(config, storage.clone(), false)?;
    let version = worker.version().to_string();

    ui::key_value(&ctx, "Version", &version);
    ui::key_value(&ctx, "Origin", &worker.origin().to_string());

    let progress = InstallProgress::new(&ctx, &version, worker.manifest().len());
    let worker = worker.with_progress(progress.hook());

    if args.no_activate {
        let result = worker.install().await;
        progress.finish();
        let report = result?;

        ui::step_ok_detail(
            &ctx,
            &format!("Cached {} assets", report.entries),
            &report.bucket,
        );
        ui::step_warn_hint(&ctx, "Not activated", "Run: swcache activate");
        ui::outro_success(&ctx, "Installed");
        return Ok(());
    }

    let before = storage.keys().await?;
    let registration = Registration::new();
    let result = registration.register(worker).await;
    progress.finish();
    let worker = result?;

    ui::step_ok_detail(
        &ctx,
        &format!("Cached {} assets", worker.manifest().len()),
        worker.version(),
    );

    let after = storage.keys().await?;
    for name in before.iter().filter(|name| !after.contains(name)) {
        ui::step_info(&ctx, &format!("Removed stale cache {}", name));
    }

    ui::outro_success(&ctx, &format!("{} is active", worker.version()));
    Ok(())
}
