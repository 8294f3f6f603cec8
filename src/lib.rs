//! # ddns-sync
//!
//! A single-pass dynamic DNS updater for Cloudflare written in Rust.
//!
//! ## Features
//!
//! - Fetches the current public IP from a plain-text service
//! - Remembers the last pushed IP in a local cache file
//! - Updates the Cloudflare DNS record only when the IP actually changed
//! - Designed to run once per invocation, from cron or a systemd timer
//!
//! ## Usage
//!
//! ```bash
//! # Write a configuration template
//! ddns-sync init
//!
//! # Run one sync pass
//! ddns-sync
//!
//! # Run with a specific config file and debug logging
//! ddns-sync --config /etc/ddns-sync/config.toml --verbose
//! ```

pub mod cache;
pub mod cloudflare;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod sync;

pub use config::Config;
pub use error::{Result, SyncError};
pub use sync::SyncOutcome;
