//! Fetch command - resolve one request through the installed worker

use crate::cli::args::FetchArgs;
use crate::cli::commands::{build_worker, open_storage};
use crate::config::Config;
use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Request, Response};
use crate::worker::FetchOutcome;
use console::style;
use std::io::Write;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> SwcacheResult<()> {
    let storage = open_storage(config);
    let worker = build_worker(config, storage, args.offline)?;
    worker.resume().await?;

    let request = if args.navigate {
        Request::navigate(&args.url)
    } else {
        Request::get(&args.url)
    };
    // Validates the URL before it reaches the network
    request.origin()?;

    let outcome = worker.fetch(&request).await;
    worker.settle().await;

    match outcome? {
        FetchOutcome::Passthrough => {
            eprintln!(
                "{} {} is outside {}; not intercepted",
                style("passthrough").dim(),
                request.url,
                worker.origin()
            );
        }
        FetchOutcome::Respond { response, source } => {
            eprintln!(
                "{} {} {}",
                style(response.status).bold(),
                style(source).cyan(),
                describe(&response)
            );
            if args.body {
                std::io::stdout()
                    .write_all(&response.body)
                    .map_err(|e| SwcacheError::io("writing response body", e))?;
            }
        }
    }

    Ok(())
}

fn describe(response: &Response) -> String {
    let content_type = response.header("content-type").unwrap_or("-");
    format!(
        "{} {} bytes ({})",
        response.kind,
        response.body.len(),
        content_type
    )
}
