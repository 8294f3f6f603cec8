//! The single-pass sync workflow.

use std::path::Path;

use tracing::{info, warn};

use crate::cache::IpCache;
use crate::cloudflare::CloudflareUpdater;
use crate::error::{Result, SyncError};
use crate::fetcher::IpFetcher;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The record already points at the current IP; nothing was done.
    Unchanged { ip: String },

    /// The record was updated and the new IP persisted.
    Updated {
        previous: Option<String>,
        current: String,
    },
}

/// Run one sync pass.
///
/// Fetches the current public IP and, when it differs from the cached
/// value, updates the DNS record and persists the new IP. The cache only
/// advances after the provider confirms the update, so a failed update is
/// retried by the next scheduled run. If persisting fails after a
/// successful update, the cache stays stale on purpose and the next run
/// re-issues the same idempotent update.
pub async fn run(
    fetcher: &IpFetcher,
    updater: &CloudflareUpdater,
    cache_path: &Path,
) -> Result<SyncOutcome> {
    info!("Checking for IP changes");

    let mut cache = load_or_create(cache_path)?;
    let current_ip = fetcher.fetch().await?;
    let previous = cache.value().map(str::to_owned);

    if cache.compare(&current_ip, true) {
        info!("IP unchanged");
        return Ok(SyncOutcome::Unchanged { ip: current_ip });
    }

    info!("Current IP is {}", current_ip);

    updater.update(&current_ip).await?;
    info!("DNS record updated");

    cache.save()?;
    info!("Local cache updated");

    Ok(SyncOutcome::Updated {
        previous,
        current: current_ip,
    })
}

/// Load the cache, creating it empty on first run.
fn load_or_create(path: &Path) -> Result<IpCache> {
    match IpCache::load(path) {
        Ok(cache) => Ok(cache),
        Err(SyncError::CacheLoad(_)) => {
            warn!("Failed to locate cache file {}", path.display());
            let cache = IpCache::create(path, None)?;
            info!("Cache file created");
            Ok(cache)
        }
        Err(e) => Err(e),
    }
}
