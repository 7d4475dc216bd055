// src/checker/fetch.rs
// =============================================================================
// The real network transport, built on reqwest.
//
// Two clients share one configuration (user agent, timeout) and differ only
// in redirect policy:
// - manual: never follows, so the prober sees the 3xx itself
// - follow: chases a chain (up to 10 hops) once the prober knows it is one
//
// Every request carries `Accept: */*`. Manual hops also pin the `Host`
// header to the target, which some proxies and CDNs insist on. Followed
// chains can cross hosts, so there the client sets `Host` per hop.
// =============================================================================

use super::http::{FetchResponse, Fetcher, RedirectMode};
use super::probe::ProbeRequest;
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, HOST, LOCATION, RETRY_AFTER};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

const MAX_FOLLOWED_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    manual: Client,
    follow: Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let build = |policy: Policy| {
            Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .redirect(policy)
                .build()
                .map_err(Error::Client)
        };

        Ok(Self {
            manual: build(Policy::none())?,
            follow: build(Policy::limited(MAX_FOLLOWED_REDIRECTS))?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.user_agent, config.timeout())
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &ProbeRequest, redirect: RedirectMode) -> Result<FetchResponse> {
        let url = Url::parse(&request.uri).map_err(|e| Error::Transport(e.to_string()))?;

        let client = match redirect {
            RedirectMode::Manual => &self.manual,
            RedirectMode::Follow => &self.follow,
        };

        let mut builder = client
            .request(request.method.into(), url.clone())
            .header(ACCEPT, "*/*");

        if redirect == RedirectMode::Manual {
            if let Some(host) = host_header(&url) {
                builder = builder.header(HOST, host);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(describe(&e)))?;

        let headers = response.headers();
        let location = headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let retry_after = headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| raw.trim().parse::<u64>().ok());

        Ok(FetchResponse {
            status: response.status(),
            location,
            retry_after,
            url: response.url().to_string(),
        })
    }
}

// host[:port], with the port only when it isn't the scheme default
fn host_header(url: &Url) -> Option<HeaderValue> {
    let host = url.host_str()?;
    let value = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    HeaderValue::from_str(&value).ok()
}

// reqwest's Display for a failed send is just "error sending request for
// url (...)"; the underlying cause (DNS, reset, timeout) is what people
// need to see in a dead-link report.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_header_default_port() {
        let url = Url::parse("https://example.com/a").unwrap();
        assert_eq!(host_header(&url).unwrap(), "example.com");
    }

    #[test]
    fn test_host_header_explicit_port() {
        let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
        assert_eq!(host_header(&url).unwrap(), "127.0.0.1:8080");
    }

    #[test]
    fn test_builds_from_default_config() {
        assert!(ReqwestFetcher::from_config(&Config::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unparseable_uri_is_transport_error() {
        let fetcher = ReqwestFetcher::from_config(&Config::default()).unwrap();
        let request = ProbeRequest::new("not a url", crate::checker::Method::Head);
        let result = fetcher.fetch(&request, RedirectMode::Manual).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
