// src/checker/mod.rs
// =============================================================================
// Everything needed to answer "is this reference alive?" for one reference.
//
// Submodules:
// - classify: is it http, relative, or local?
// - resolve:  join a relative reference against a base
// - local:    filesystem existence check
// - http:     the remote probe state machine (retry, backoff, redirects)
// - fetch:    the reqwest transport behind http
// - cache:    TTL memoization in front of http
// - probe:    the request/result types shared by all of the above
// =============================================================================

mod cache;
mod classify;
mod fetch;
mod http;
mod local;
mod probe;
mod resolve;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheKey, CachedProber, ResultCache};
pub use classify::{is_http, is_local, is_relative};
pub use fetch::ReqwestFetcher;
pub use http::{FetchResponse, Fetcher, RedirectMode, RemoteProber, RetryPolicy, REDIRECT_STATUSES};
pub use local::probe_local;
pub use probe::{status_line, Method, ProbeRequest, ProbeResult};
pub use resolve::resolve;
