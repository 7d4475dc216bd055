// src/checker/testing.rs
// =============================================================================
// A scripted Fetcher for unit tests.
//
// Replies are handed out in order, one per fetch, and every request is
// recorded so tests can assert exactly which methods and attempts were made.
// Running out of replies is a test bug and panics.
// =============================================================================

use super::http::{FetchResponse, Fetcher, RedirectMode};
use super::probe::ProbeRequest;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum Reply {
    Response {
        status: u16,
        location: Option<String>,
        retry_after: Option<u64>,
        url: Option<String>,
    },
    Error(String),
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Reply::Response {
            status,
            location: None,
            retry_after: None,
            url: None,
        }
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Reply::Response {
            status,
            location: Some(location.to_string()),
            retry_after: None,
            url: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Reply::Error(message.to_string())
    }

    // Final URL reported by the response (defaults to the request URI)
    pub fn at(mut self, final_url: &str) -> Self {
        if let Reply::Response { url, .. } = &mut self {
            *url = Some(final_url.to_string());
        }
        self
    }

    pub fn retry_after(mut self, seconds: u64) -> Self {
        if let Reply::Response { retry_after, .. } = &mut self {
            *retry_after = Some(seconds);
        }
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeFetcher {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(ProbeRequest, RedirectMode)>>,
}

impl FakeFetcher {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(ProbeRequest, RedirectMode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, request: &ProbeRequest, redirect: RedirectMode) -> Result<FetchResponse> {
        self.calls.lock().unwrap().push((request.clone(), redirect));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {} {}", request.method, request.uri));

        match reply {
            Reply::Response {
                status,
                location,
                retry_after,
                url,
            } => Ok(FetchResponse {
                status: StatusCode::from_u16(status).unwrap(),
                location,
                retry_after,
                url: url.unwrap_or_else(|| request.uri.clone()),
            }),
            Reply::Error(message) => Err(Error::Transport(message)),
        }
    }
}
