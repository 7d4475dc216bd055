// src/checker/probe.rs
// =============================================================================
// The values that flow through the probers.
//
// - Method: HEAD or GET
// - ProbeRequest: one attempt against one URI; a fresh value per retry
// - ProbeResult: the settled outcome of a whole probe chain
// =============================================================================

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Head,
    Get,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Head => f.write_str("HEAD"),
            Method::Get => f.write_str("GET"),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Head => reqwest::Method::HEAD,
            Method::Get => reqwest::Method::GET,
        }
    }
}

/// A single attempt. Retries never mutate a request, they derive a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub uri: String,
    pub method: Method,
    pub attempt: u32,
}

impl ProbeRequest {
    pub fn new(uri: impl Into<String>, method: Method) -> Self {
        Self {
            uri: uri.into(),
            method,
            attempt: 0,
        }
    }

    // Every retry is a GET, whatever the first attempt used
    pub fn retry(&self) -> Self {
        Self {
            uri: self.uri.clone(),
            method: Method::Get,
            attempt: self.attempt + 1,
        }
    }
}

/// The outcome of probing one reference.
///
/// `message` is a status line such as `"404 Not Found"` for HTTP probes,
/// `"OK"` for local hits, or the error text when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub ok: bool,
    pub message: String,
    pub redirected: bool,
    pub redirect_to: Option<String>,
}

impl ProbeResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            redirected: false,
            redirect_to: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            redirected: false,
            redirect_to: None,
        }
    }

    pub fn from_status(status: StatusCode) -> Self {
        Self {
            ok: status.is_success(),
            message: status_line(status),
            redirected: false,
            redirect_to: None,
        }
    }
}

// Formats a status the way servers print it: "404 Not Found".
// Unregistered codes come out as the bare number.
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
