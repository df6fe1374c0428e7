//! swcache - offline-first cache lifecycle for a static site
//!
//! Models a versioned service worker: install precaches a manifest into a
//! bucket named after the version, activation purges every other bucket,
//! and fetches resolve network-first for pages and cache-first for assets,
//! with an offline page fallback.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod network;
pub mod storage;
pub mod ui;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{SwcacheError, SwcacheResult};
