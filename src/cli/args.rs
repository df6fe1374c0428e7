//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// swcache - offline-first cache lifecycle for a static site
///
/// Installs a versioned precache, purges stale versions on activation and
/// resolves requests network-first or cache-first with an offline fallback.
#[derive(Parser, Debug)]
#[command(name = "swcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SWCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the configured version and take control
    Install(InstallArgs),

    /// Purge caches left by other versions
    Activate,

    /// Resolve one request through the installed worker
    Fetch(FetchArgs),

    /// Inspect or clear cache buckets
    Cache(CacheArgs),

    /// Show worker and cache status
    Status,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Precache only; leave older versions in place
    #[arg(long)]
    pub no_activate: bool,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Absolute URL to request
    pub url: String,

    /// Treat the request as a top-level page load
    #[arg(short, long)]
    pub navigate: bool,

    /// Simulate loss of connectivity
    #[arg(long)]
    pub offline: bool,

    /// Print the response body to stdout
    #[arg(short, long)]
    pub body: bool,
}

#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cache buckets
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List the entries of one bucket
    Show {
        /// Bucket name
        bucket: String,
    },

    /// Delete every bucket
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for `cache list`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// One bucket name per line
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_fetch() {
        let cli = Cli::parse_from([
            "swcache",
            "fetch",
            "https://example.com/",
            "--navigate",
            "--offline",
        ]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "https://example.com/");
                assert!(args.navigate);
                assert!(args.offline);
                assert!(!args.body);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_verbosity_and_config() {
        let cli = Cli::parse_from(["swcache", "-vv", "--config", "/tmp/sw.toml", "status"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sw.toml")));
    }

    #[test]
    fn parse_cache_list_format() {
        let cli = Cli::parse_from(["swcache", "cache", "list", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::List {
                    format: OutputFormat::Json
                }
            })
        ));
    }
}
