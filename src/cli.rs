// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - check: find the links in Markdown files and report the dead/moved ones
// - probe: run a single remote probe and print the raw result
//
// Flags given here win over the same option in a --config file.
// =============================================================================

use clap::{Parser, Subcommand};
use link_liveness::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-liveness",
    version,
    about = "Checks whether the links in your documents are alive, dead, or redirected",
    long_about = "link-liveness probes every link in a Markdown document with HEAD-then-GET \
                  fallback, retries with backoff, and redirect detection. Redirected links \
                  are reported with their new location so they can be updated."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every link in one or more Markdown files
    ///
    /// Example: link-liveness check README.md docs/guide.md --retry 3
    Check {
        /// Markdown files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output findings as JSON instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: CheckOptions,
    },

    /// Probe a single URL and print the result
    ///
    /// Example: link-liveness probe https://example.com/old-page
    Probe {
        /// The URL to probe
        uri: String,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: CheckOptions,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct CheckOptions {
    /// JSON file with link-checking options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URI for relative links (defaults to each file's own location)
    #[arg(long, value_name = "URI")]
    pub base_uri: Option<String>,

    /// Don't check relative or local links
    #[arg(long)]
    pub no_check_relative: bool,

    /// Glob pattern of URIs to skip (repeatable)
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Don't report links that redirect
    #[arg(long)]
    pub ignore_redirects: bool,

    /// Origin to probe with GET instead of HEAD (repeatable)
    #[arg(long = "prefer-get", value_name = "ORIGIN")]
    pub prefer_get: Vec<String>,

    /// Maximum retries per link
    #[arg(long)]
    pub retry: Option<u32>,

    /// Maximum probes in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// User-Agent header to send
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Treat every reference as a URL to join against the base
    #[arg(long)]
    pub http_only: bool,
}

impl CheckOptions {
    // Starts from the config file (or defaults) and layers flags on top
    pub fn to_config(&self) -> link_liveness::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(base) = &self.base_uri {
            config.base_uri = Some(base.clone());
        }
        if self.no_check_relative {
            config.check_relative = false;
        }
        config.ignore.extend(self.ignore.iter().cloned());
        if self.ignore_redirects {
            config.ignore_redirects = true;
        }
        config.prefer_get.extend(self.prefer_get.iter().cloned());
        if let Some(retry) = self.retry {
            config.retry = retry;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if self.http_only {
            config.http_only = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from([
            "link-liveness",
            "check",
            "README.md",
            "--retry",
            "4",
            "--ignore",
            "https://localhost*/**",
            "--ignore",
            "**/*.png",
        ]);
        let Commands::Check { files, json, options } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(files, vec![PathBuf::from("README.md")]);
        assert!(!json);

        let config = options.to_config().unwrap();
        assert_eq!(config.retry, 4);
        assert_eq!(config.ignore.len(), 2);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");
        std::fs::write(&path, r#"{ "retry": 1, "userAgent": "from-file/1.0" }"#).unwrap();

        let options = CheckOptions {
            config: Some(path),
            retry: Some(6),
            no_check_relative: true,
            ..CheckOptions::default()
        };
        let config = options.to_config().unwrap();
        assert_eq!(config.retry, 6);
        assert_eq!(config.user_agent, "from-file/1.0");
        assert!(!config.check_relative);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let options = CheckOptions {
            concurrency: Some(0),
            ..CheckOptions::default()
        };
        assert!(options.to_config().is_err());
    }
}
