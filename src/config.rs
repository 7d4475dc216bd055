// src/config.rs
// =============================================================================
// The recognized link-checking options.
//
// A Config is an immutable snapshot. Two configs that compare equal (after
// canonicalization) describe the same profile and share one cache and one
// scheduler, see registry.rs.
//
// Field names on the wire are camelCase so a JSON config file reads like:
//
//   { "retry": 3, "preferGET": ["https://example.com"], "ignore": ["**/*.png"] }
// =============================================================================

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "link-checker/1.0";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// Check relative and local references, not only HTTP(S) ones
    pub check_relative: bool,

    /// Explicit base for relative references; wins over the document location
    #[serde(rename = "baseURI")]
    pub base_uri: Option<String>,

    /// Glob patterns; matching URIs are skipped without any I/O
    pub ignore: Vec<String>,

    /// Let ignore patterns match names that begin with `.`
    pub dot_in_ignore: bool,

    /// Suppress every diagnostic whose probe went through a redirect
    pub ignore_redirects: bool,

    /// Origins that are probed with GET straight away instead of HEAD
    #[serde(rename = "preferGET")]
    pub prefer_get: Vec<String>,

    /// Maximum retry attempts after the initial probe
    pub retry: u32,

    /// Maximum number of probes in flight at once
    pub concurrency: usize,

    /// Rate-limit window, in milliseconds
    pub interval: u64,

    /// Maximum probe starts per window; `None` disables rate limiting
    pub interval_cap: Option<u32>,

    pub user_agent: String,

    /// Cap on exponential backoff waits, in seconds
    pub max_retry_time: u64,

    /// Cap on `Retry-After` waits, in seconds
    pub max_retry_after_time: u64,

    /// Cache TTL, in milliseconds
    pub link_max_age: u64,

    /// Join every reference as a URL, skipping local-path heuristics
    pub http_only: bool,

    /// Per-request HTTP timeout, in seconds
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_relative: true,
            base_uri: None,
            ignore: Vec::new(),
            dot_in_ignore: false,
            ignore_redirects: false,
            prefer_get: Vec::new(),
            retry: 2,
            concurrency: 10,
            interval: 1000,
            interval_cap: Some(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retry_time: 10,
            max_retry_after_time: 90,
            link_max_age: 60 * 60 * 1000,
            http_only: false,
            timeout: 10,
        }
    }
}

impl Config {
    // Reads a JSON config file. Missing keys fall back to the defaults above.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        if self.interval_cap == Some(0) {
            return Err(Error::Config("intervalCap must be at least 1".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("userAgent must not be empty".into()));
        }
        Ok(())
    }

    // Sorts and dedups the list options. Order in `ignore` and `preferGET`
    // has no effect on checking, so it must not split profiles either.
    pub fn canonical(&self) -> Self {
        let mut config = self.clone();
        config.ignore.sort();
        config.ignore.dedup();
        config.prefer_get.sort();
        config.prefer_get.dedup();
        config
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    pub fn max_retry_time(&self) -> Duration {
        Duration::from_secs(self.max_retry_time)
    }

    pub fn max_retry_after_time(&self) -> Duration {
        Duration::from_secs(self.max_retry_after_time)
    }

    pub fn link_max_age(&self) -> Duration {
        Duration::from_millis(self.link_max_age)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
