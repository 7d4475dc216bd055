// src/error.rs
// =============================================================================
// Error types for the library half of the crate.
//
// Probing itself never fails from the caller's point of view: every dead,
// unreachable or ambiguous link ends up as a ProbeResult. The errors here
// come from setup (bad configuration, bad ignore patterns, HTTP client
// construction) and from the transport layer before it is folded into a
// ProbeResult.
// =============================================================================

use thiserror::Error;

/// Errors produced while building or running a link-checking profile.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of range or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An ignore pattern could not be compiled.
    #[error("invalid ignore pattern `{pattern}`: {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A request failed before a response arrived (DNS, reset, timeout).
    #[error("{0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
