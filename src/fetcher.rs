//! Public IP detection.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{Result, SyncError};

static IP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").expect("valid IP pattern")
});

/// Checks whether a string is a bare dotted-quad IP address.
///
/// Accepts exactly four dot-separated groups of 1-3 decimal digits with
/// nothing before or after. A multi-digit group must not start with zero.
/// Groups are not bounded to 255, so `"999.999.999.999"` validates; the
/// check guards the response format, not address correctness.
pub fn is_valid_ip(content: &str) -> bool {
    if content.contains('\n') {
        return false;
    }

    if !IP_PATTERN.is_match(content) {
        return false;
    }

    content
        .split('.')
        .all(|group| group.len() == 1 || !group.starts_with('0'))
}

/// Fetches the current public IP from an IP-report service.
///
/// The service must answer a plain GET with a body that is exactly the
/// caller's IP address; surrounding whitespace is tolerated. One attempt
/// per call, no fallback services.
pub struct IpFetcher {
    client: reqwest::Client,
    url: String,
}

impl IpFetcher {
    /// Create a fetcher for the given service URL.
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, url }
    }

    /// Fetch and validate the current public IP.
    pub async fn fetch(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::Connectivity(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let text = response.text().await?;
        let ip = text.trim();

        if !is_valid_ip(ip) {
            return Err(SyncError::Format(ip.to_string()));
        }

        tracing::debug!("IP service {} reported {}", self.url, ip);
        Ok(ip.to_string())
    }
}
