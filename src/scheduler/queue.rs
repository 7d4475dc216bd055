// src/scheduler/queue.rs
// =============================================================================
// A rate-limited task queue.
//
// How it works:
// 1. Tasks are pushed onto a FIFO queue (one per discovered URI)
// 2. `run` pops them in order; each pop waits for a concurrency permit and
//    then for the rate limiter before the task is spawned
// 3. Once the queue is drained, `run` waits for every spawned task to
//    settle and hands back whatever they produced
//
// Admission is FIFO, completion is not: a slow probe started first may
// finish last. Callers that need stable output sort afterwards.
//
// The permits and the limiter live on the Scheduler, which is shared by
// every run of one profile, so two documents checked at the same time
// still respect one concurrency cap.
// =============================================================================

use crate::config::Config;
use futures::future::{BoxFuture, FutureExt};
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use std::collections::VecDeque;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

type Task<T> = Box<dyn FnOnce() -> BoxFuture<'static, T> + Send>;

#[derive(Clone)]
pub struct Scheduler {
    permits: Arc<Semaphore>,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl Scheduler {
    // At most `interval_cap` starts in any window of length `interval`:
    // starts are spaced `interval / cap` apart, with no burst.
    //
    // A zero interval or no cap turns rate limiting off; concurrency is
    // always bounded.
    pub fn new(concurrency: usize, interval: Duration, interval_cap: Option<u32>) -> Self {
        let limiter = interval_cap
            .and_then(NonZeroU32::new)
            .and_then(|cap| Quota::with_period(interval / cap.get()))
            .map(|quota| Arc::new(RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN))));

        Self {
            permits: Arc::new(Semaphore::new(concurrency.clamp(1, Semaphore::MAX_PERMITS))),
            limiter,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.concurrency, config.interval(), config.interval_cap)
    }

    pub fn queue<T: Send + 'static>(&self) -> TaskQueue<T> {
        TaskQueue {
            scheduler: self.clone(),
            pending: VecDeque::new(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("available_permits", &self.permits.available_permits())
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

pub struct TaskQueue<T> {
    scheduler: Scheduler,
    pending: VecDeque<Task<T>>,
}

impl<T: Send + 'static> TaskQueue<T> {
    pub fn push<F, Fut>(&mut self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.pending.push_back(Box::new(move || task().boxed()));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    // Runs every queued task and waits until all of them have settled.
    // A task that panics is logged and contributes nothing.
    pub async fn run(mut self) -> Vec<T> {
        let mut running = JoinSet::new();
        let mut results = Vec::with_capacity(self.pending.len());

        while let Some(task) = self.pending.pop_front() {
            // The semaphore is never closed, so this only fails if that changes
            let Ok(permit) = Arc::clone(&self.scheduler.permits).acquire_owned().await else {
                warn!(dropped = self.pending.len() + 1, "scheduler closed, dropping queued tasks");
                break;
            };

            if let Some(limiter) = &self.scheduler.limiter {
                limiter.until_ready().await;
            }

            running.spawn(async move {
                let _permit = permit;
                task().await
            });
        }

        while let Some(joined) = running.join_next().await {
            match joined {
                Ok(output) => results.push(output),
                Err(e) => warn!(error = %e, "scheduled task did not complete"),
            }
        }

        results
    }
}
