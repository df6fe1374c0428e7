//! Cache command - inspect or clear cache buckets

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::commands::open_storage;
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::storage::CacheStorage;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> SwcacheResult<()> {
    let storage = open_storage(config);

    match args.action {
        CacheAction::List { format } => list_buckets(&*storage, config, format).await,
        CacheAction::Show { bucket } => show_bucket(&*storage, &bucket).await,
        CacheAction::Clear { yes } => clear_buckets(&*storage, yes).await,
    }
}

#[derive(Debug, Serialize)]
struct BucketSummary {
    name: String,
    entries: usize,
    current: bool,
}

async fn summarize(
    storage: &dyn CacheStorage,
    config: &Config,
) -> SwcacheResult<Vec<BucketSummary>> {
    let mut summaries = Vec::new();
    for name in storage.keys().await? {
        let entries = storage.entries(&name).await?.len();
        summaries.push(BucketSummary {
            current: name == config.worker.version,
            name,
            entries,
        });
    }
    Ok(summaries)
}

/// List all buckets
async fn list_buckets(
    storage: &dyn CacheStorage,
    config: &Config,
    format: OutputFormat,
) -> SwcacheResult<()> {
    let buckets = summarize(storage, config).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&buckets)?),
        OutputFormat::Plain => {
            for bucket in &buckets {
                println!("{}", bucket.name);
            }
        }
        OutputFormat::Table if buckets.is_empty() => println!("No cache buckets found."),
        OutputFormat::Table => print_bucket_table(&buckets),
    }

    Ok(())
}

fn print_bucket_table(buckets: &[BucketSummary]) {
    println!("{:<32} {:>8}  {:<8}", "BUCKET", "ENTRIES", "STATE");
    println!("{}", "-".repeat(50));

    for bucket in buckets {
        let state = if bucket.current {
            style("current").green().to_string()
        } else {
            style("stale").yellow().to_string()
        };
        println!("{:<32} {:>8}  {:<8}", bucket.name, bucket.entries, state);
    }

    println!();
    println!("Total: {} bucket(s)", buckets.len());
}

/// List the entries of one bucket
async fn show_bucket(storage: &dyn CacheStorage, bucket: &str) -> SwcacheResult<()> {
    let keys = storage.entries(bucket).await?;

    if keys.is_empty() {
        println!("Bucket {} is empty.", bucket);
        return Ok(());
    }

    println!(
        "{:<7} {:<6} {:<7} {:>9}  {:<16}  URL",
        "METHOD", "STATUS", "TYPE", "BYTES", "STORED"
    );
    println!("{}", "-".repeat(80));

    for key in &keys {
        let Some(entry) = storage.get(bucket, key).await? else {
            debug!("Entry {} vanished while listing", key);
            continue;
        };
        println!(
            "{:<7} {:<6} {:<7} {:>9}  {:<16}  {}",
            key.method.as_str(),
            entry.response.status,
            entry.response.kind.to_string(),
            entry.response.body.len(),
            entry.stored_at.format("%Y-%m-%d %H:%M").to_string(),
            key.url
        );
    }

    println!();
    println!("Total: {} entr(ies)", keys.len());
    Ok(())
}

/// Delete every bucket
async fn clear_buckets(storage: &dyn CacheStorage, yes: bool) -> SwcacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let buckets = storage.keys().await?;

    if buckets.is_empty() {
        println!("No cache buckets to clear.");
        return Ok(());
    }

    println!("This will remove {} bucket(s):", buckets.len());
    for name in &buckets {
        println!("  {} {}", style("•").red(), name);
    }
    println!();

    if !ui::confirm(&ctx, "Clear all caches?", false).await? {
        println!("Aborted.");
        return Ok(());
    }

    let mut removed = 0;
    for name in &buckets {
        if storage.delete(name).await? {
            removed += 1;
        }
    }

    ui::step_ok(&ctx, &format!("Cleared {} bucket(s)", removed));
    Ok(())
}
