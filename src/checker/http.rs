// src/checker/http.rs
// =============================================================================
// This module decides whether a remote URL is alive, dead, or moved.
//
// One probe chain is a small state machine driven by an explicit loop over
// (method, attempt):
//
//   Issue ──► redirect status? ──► follow once, report, stop
//     │
//     ├──► transport error ──► HEAD with retries left? retry as GET now
//     │                        otherwise stop with the error text
//     ├──► ok ──► stop
//     ├──► retries used up ──► stop with the status line
//     ├──► HEAD ──► retry as GET now (many servers mishandle HEAD)
//     └──► GET ──► wait (Retry-After or attempt² × 100ms, if under the cap)
//                  then retry as GET
//
// Redirects are never retried: a 301 is a definite answer. 5xx and
// connection trouble may be momentary, so those get the backoff path.
//
// The network is behind the Fetcher trait so the state machine can be
// driven by a scripted fake in tests. The real implementation lives in
// fetch.rs.
// =============================================================================

use super::probe::{status_line, Method, ProbeRequest, ProbeResult};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// How the transport treats 3xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// Return the 3xx response itself
    Manual,
    /// Follow the whole chain and return the last response
    Follow,
}

/// What the prober needs to know about a response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    /// Raw `Location` header, if any
    pub location: Option<String>,
    /// `Retry-After` in whole seconds, if present and numeric
    pub retry_after: Option<u64>,
    /// URL of the response after any followed redirects
    pub url: String,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &ProbeRequest, redirect: RedirectMode) -> Result<FetchResponse>;
}

pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

const BACKOFF_UNIT: Duration = Duration::from_millis(100);

/// Upper bounds for the waits between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retry_time: Duration,
    pub max_retry_after_time: Duration,
}

impl RetryPolicy {
    // A wait longer than its cap is skipped, not shortened: we retry
    // immediately rather than sleep through a server's rate-limit window.
    fn wait_before_retry(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let (wait, cap) = match retry_after {
            Some(seconds) => (Duration::from_secs(seconds), self.max_retry_after_time),
            None => (backoff(attempt), self.max_retry_time),
        };
        if wait <= cap {
            wait
        } else {
            Duration::ZERO
        }
    }
}

// attempt² × 100ms
fn backoff(attempt: u32) -> Duration {
    BACKOFF_UNIT.saturating_mul(attempt.saturating_mul(attempt))
}

pub struct RemoteProber {
    fetcher: Arc<dyn Fetcher>,
    policy: RetryPolicy,
}

impl RemoteProber {
    pub fn new(fetcher: Arc<dyn Fetcher>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    // Runs one probe chain to completion. Never fails: every outcome,
    // including transport errors, becomes a ProbeResult.
    pub async fn probe(&self, uri: &str, method: Method, max_retries: u32) -> ProbeResult {
        let mut request = ProbeRequest::new(uri, method);

        loop {
            debug!(uri = %request.uri, method = %request.method, attempt = request.attempt, "probing");

            let response = match self.fetcher.fetch(&request, RedirectMode::Manual).await {
                Ok(response) => response,
                Err(e) => {
                    // Network-level failures get one free method fallback
                    if request.method == Method::Head && request.attempt < max_retries {
                        debug!(uri = %request.uri, error = %e, "HEAD failed, retrying with GET");
                        request = request.retry();
                        continue;
                    }
                    return ProbeResult::failed(e.to_string());
                }
            };

            if REDIRECT_STATUSES.contains(&response.status.as_u16()) {
                return self.follow_redirect(&request, &response).await;
            }

            if response.status.is_success() || request.attempt >= max_retries {
                return ProbeResult::from_status(response.status);
            }

            if request.method == Method::Head {
                request = request.retry();
                continue;
            }

            let wait = self
                .policy
                .wait_before_retry(request.attempt, response.retry_after);
            warn!(
                uri = %request.uri,
                status = response.status.as_u16(),
                attempt = request.attempt,
                wait_ms = wait.as_millis() as u64,
                "retrying after failed probe"
            );
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            request = request.retry();
        }
    }

    // Resolves a redirect eagerly: one manual hop has told us where the
    // resource went, now let the client chase the rest of the chain.
    async fn follow_redirect(&self, request: &ProbeRequest, response: &FetchResponse) -> ProbeResult {
        let first_hop = status_line(response.status);

        let destination = response
            .location
            .as_deref()
            .and_then(|location| resolve_location(&request.uri, location));

        let Some(destination) = destination else {
            // A redirect we can't follow is reported, not ignored
            return ProbeResult {
                ok: false,
                message: first_hop,
                redirected: true,
                redirect_to: None,
            };
        };

        let follow = ProbeRequest {
            uri: destination.clone(),
            method: request.method,
            attempt: request.attempt,
        };

        match self.fetcher.fetch(&follow, RedirectMode::Follow).await {
            Ok(last) => {
                let redirect_to = keep_fragment(&request.uri, &last.url);
                info!(from = %request.uri, to = %redirect_to, status = %first_hop, "redirect resolved");
                ProbeResult {
                    ok: last.status.is_success(),
                    message: first_hop,
                    redirected: true,
                    redirect_to: Some(redirect_to),
                }
            }
            Err(e) => ProbeResult {
                ok: false,
                message: e.to_string(),
                redirected: true,
                redirect_to: Some(destination),
            },
        }
    }
}

// `Location` is resolved against the origin of the request that received
// it, never against the document's base.
fn resolve_location(request_uri: &str, location: &str) -> Option<String> {
    let request_url = Url::parse(request_uri).ok()?;
    let origin = Url::parse(&request_url.origin().ascii_serialization()).ok()?;
    origin.join(location).ok().map(String::from)
}

// Servers drop fragments on redirect; carry the original one over so the
// suggested replacement still points at the same section.
fn keep_fragment(original: &str, resolved: &str) -> String {
    let fragment = Url::parse(original)
        .ok()
        .and_then(|url| url.fragment().map(str::to_string));

    match (fragment, Url::parse(resolved)) {
        (Some(fragment), Ok(mut url)) if url.fragment().is_none() => {
            url.set_fragment(Some(&fragment));
            url.into()
        }
        _ => resolved.to_string(),
    }
}
