// src/orchestrator/profile.rs
// =============================================================================
// One configuration, made runnable.
//
// A Profile owns everything a Config implies: the cached prober, the
// scheduler, the compiled ignore rules and the prefer-GET origins. It is
// shared behind an Arc by every document checked with that configuration.
//
// Per-item policy, in order:
//  1. ignored by pattern             → nothing
//  2. relative, checkRelative off    → nothing
//  3. relative, no base available    → "unable to resolve" diagnostic
//  4. resolve (fall back to the raw string)
//  5. neither local nor http(s)      → nothing (mailto:, ftp:, ...)
//  6. GET for prefer-GET origins, HEAD otherwise
//  7. probe locally or remotely (through the cache)
//  8. dead → dead-link; ok via redirect → obsolete-link with a fix,
//     unless redirects are ignored
// =============================================================================

use super::diagnostic::Diagnostic;
use super::ignore::{glob_predicate, IgnorePredicate};
use super::item::{CheckItem, Document};
use crate::checker::{
    is_http, is_local, is_relative, probe_local, resolve, CachedProber, Fetcher, Method,
    ProbeResult, RemoteProber, ResultCache, ReqwestFetcher, RetryPolicy,
};
use crate::config::Config;
use crate::error::Result;
use crate::scheduler::Scheduler;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

pub struct Profile {
    config: Config,
    prober: CachedProber,
    scheduler: Scheduler,
    ignore: IgnorePredicate,
    prefer_get: HashSet<String>,
}

impl Profile {
    // Builds a profile that talks to the network through reqwest.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = ReqwestFetcher::from_config(&config)?;
        Self::new(config, Arc::new(fetcher))
    }

    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let ignore = glob_predicate(&config.ignore, config.dot_in_ignore)?;
        Self::with_ignore(config, fetcher, ignore)
    }

    // Same as `new`, with a caller-supplied ignore matcher instead of the
    // config's glob patterns.
    pub fn with_ignore(config: Config, fetcher: Arc<dyn Fetcher>, ignore: IgnorePredicate) -> Result<Self> {
        config.validate()?;

        let policy = RetryPolicy {
            max_retry_time: config.max_retry_time(),
            max_retry_after_time: config.max_retry_after_time(),
        };
        let prober = CachedProber::new(RemoteProber::new(fetcher, policy), config.link_max_age());
        let scheduler = Scheduler::from_config(&config);
        let prefer_get = config.prefer_get.iter().map(|entry| origin_of(entry)).collect();

        Ok(Self {
            config,
            prober,
            scheduler,
            ignore,
            prefer_get,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        self.prober.cache()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // Checks every item of a document through the scheduler and returns
    // the findings once all checks have settled. Order is completion
    // order, not document order.
    pub async fn check_document(self: &Arc<Self>, document: Document) -> Vec<Diagnostic> {
        // Expired entries are otherwise only dropped when the same key is read
        self.prober.cache().purge_expired();

        let location: Option<Arc<str>> = document.location.map(Arc::from);
        let total = document.items.len();

        let mut queue = self.scheduler.queue();
        for item in document.items {
            let profile = Arc::clone(self);
            let location = location.clone();
            queue.push(move || async move { profile.check_item(&item, location.as_deref()).await });
        }

        let diagnostics: Vec<Diagnostic> = queue.run().await.into_iter().flatten().collect();
        info!(checked = total, findings = diagnostics.len(), "document checked");
        diagnostics
    }

    pub async fn check_item(&self, item: &CheckItem, document_location: Option<&str>) -> Option<Diagnostic> {
        let uri = item.uri.as_str();

        if (self.ignore)(uri) {
            debug!(uri, "ignored by pattern");
            return None;
        }

        let relative = is_relative(uri);
        if relative && !self.config.check_relative {
            return None;
        }

        let base = self.config.base_uri.as_deref().or(document_location);
        if relative && base.is_none() {
            return Some(Diagnostic::unresolvable(uri, item.span));
        }

        let target = base
            .and_then(|base| resolve(uri, base, self.config.http_only))
            .unwrap_or_else(|| uri.to_string());

        let result = if is_http(&target) {
            self.probe_remote(&target).await
        } else if is_local(&target) {
            probe_local(&target).await
        } else {
            debug!(uri, "not a checkable scheme");
            return None;
        };

        self.interpret(item, result)
    }

    // Probes one remote URL with this profile's method choice, retry
    // budget and cache.
    pub async fn probe_remote(&self, uri: &str) -> ProbeResult {
        let method = self.method_for(uri);
        self.prober.probe(uri, method, self.config.retry).await
    }

    fn interpret(&self, item: &CheckItem, result: ProbeResult) -> Option<Diagnostic> {
        if result.redirected && self.config.ignore_redirects {
            return None;
        }

        if !result.ok {
            Some(Diagnostic::dead(&item.uri, item.span, &result))
        } else if result.redirected {
            Some(Diagnostic::obsolete(&item.uri, item.span, &result))
        } else {
            None
        }
    }

    fn method_for(&self, uri: &str) -> Method {
        if !self.prefer_get.is_empty() && self.prefer_get.contains(&origin_of(uri)) {
            Method::Get
        } else {
            Method::Head
        }
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .field("cached", &self.cache().len())
            .finish()
    }
}

// scheme://host[:port]; entries that aren't URLs are compared as written
fn origin_of(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => uri.trim_end_matches('/').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::testing::{FakeFetcher, Reply};
    use crate::orchestrator::diagnostic::DiagnosticKind;
    use crate::orchestrator::item::Span;
    use std::time::Duration;

    fn item(uri: &str) -> CheckItem {
        CheckItem {
            span: Span {
                line: 1,
                column: 1,
                start: 0,
                end: uri.len(),
            },
            uri: uri.to_string(),
            index: 0,
        }
    }

    fn profile(config: Config, replies: Vec<Reply>) -> (Arc<Profile>, Arc<FakeFetcher>) {
        let fake = Arc::new(FakeFetcher::new(replies));
        let profile = Profile::new(config, fake.clone()).unwrap();
        (Arc::new(profile), fake)
    }

    #[tokio::test]
    async fn test_ignored_uri_does_no_io() {
        let config = Config {
            ignore: vec!["https://skip.test/**".into()],
            ..Config::default()
        };
        let (profile, fake) = profile(config, vec![]);

        let found = profile.check_item(&item("https://skip.test/a/b"), None).await;
        assert_eq!(found, None);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_relative_skipped_when_disabled() {
        let config = Config {
            check_relative: false,
            ..Config::default()
        };
        let (profile, fake) = profile(config, vec![]);

        let found = profile.check_item(&item("./missing.md"), None).await;
        assert_eq!(found, None);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_relative_without_base_is_unresolvable() {
        let (profile, _) = profile(Config::default(), vec![]);

        let found = profile.check_item(&item("./a.md"), None).await.unwrap();
        assert_eq!(found.kind, DiagnosticKind::UnresolvableRelative);
        assert!(found.message.contains("Unable to resolve relative URI"));
    }

    #[tokio::test]
    async fn test_inert_schemes_skipped() {
        let (profile, fake) = profile(Config::default(), vec![]);

        for uri in ["mailto:a@example.com", "ftp://example.com/f", "ws://example.com/s"] {
            assert_eq!(profile.check_item(&item(uri), Some("/docs/README.md")).await, None);
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prefer_get_origin() {
        let config = Config {
            prefer_get: vec!["https://get.test/".into()],
            ..Config::default()
        };
        let (profile, fake) = profile(config, vec![Reply::status(200), Reply::status(200)]);

        profile.check_item(&item("https://get.test/page"), None).await;
        profile.check_item(&item("https://head.test/page"), None).await;

        let calls = fake.calls();
        assert_eq!(calls[0].0.method, Method::Get);
        assert_eq!(calls[1].0.method, Method::Head);
    }

    #[tokio::test]
    async fn test_dead_link() {
        let config = Config {
            retry: 0,
            ..Config::default()
        };
        let (profile, _) = profile(config, vec![Reply::status(404)]);

        let found = profile.check_item(&item("https://a.test/x"), None).await.unwrap();
        assert_eq!(found.kind, DiagnosticKind::DeadLink);
        assert!(found.message.ends_with("404 Not Found"));
        assert_eq!(found.fix, None);
    }

    #[tokio::test]
    async fn test_redirect_is_obsolete_with_fix() {
        let (profile, _) = profile(
            Config::default(),
            vec![
                Reply::redirect(301, "/200"),
                Reply::status(200).at("https://a.test/200"),
            ],
        );

        let target = item("https://a.test/old");
        let found = profile.check_item(&target, None).await.unwrap();
        assert_eq!(found.kind, DiagnosticKind::ObsoleteLink);

        let fix = found.fix.unwrap();
        assert_eq!(fix.replacement, "https://a.test/200");
        assert_eq!(fix.span, target.span);
    }

    #[tokio::test]
    async fn test_ignore_redirects_suppresses() {
        let config = Config {
            ignore_redirects: true,
            ..Config::default()
        };
        let (profile, _) = profile(
            config,
            vec![
                Reply::redirect(301, "/200"),
                Reply::status(200).at("https://a.test/200"),
            ],
        );

        assert_eq!(profile.check_item(&item("https://a.test/old"), None).await, None);
    }

    #[tokio::test]
    async fn test_relative_resolved_against_configured_base() {
        let config = Config {
            base_uri: Some("https://docs.test/guide/".into()),
            ..Config::default()
        };
        let (profile, fake) = profile(config, vec![Reply::status(200)]);

        let found = profile.check_item(&item("./install"), Some("/ignored/README.md")).await;
        assert_eq!(found, None);
        assert_eq!(fake.calls()[0].0.uri, "https://docs.test/guide/install");
    }

    #[tokio::test]
    async fn test_local_reference_against_document_location() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.md"), "hi").unwrap();
        let document = dir.path().join("README.md").display().to_string();

        let (profile, fake) = profile(Config::default(), vec![]);

        let present = profile.check_item(&item("./present.md#top"), Some(document.as_str())).await;
        assert_eq!(present, None);

        let missing = profile
            .check_item(&item("./missing.md"), Some(document.as_str()))
            .await
            .unwrap();
        assert_eq!(missing.kind, DiagnosticKind::DeadLink);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_ignore_predicate() {
        let fake = Arc::new(FakeFetcher::new(vec![]));
        let ignore: IgnorePredicate = Arc::new(|uri: &str| uri.contains("internal"));
        let profile = Profile::with_ignore(Config::default(), fake.clone(), ignore).unwrap();

        assert_eq!(profile.check_item(&item("https://internal.test/"), None).await, None);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_document_collects_all_findings() {
        let config = Config {
            retry: 0,
            interval_cap: None,
            ..Config::default()
        };
        let (profile, _) = profile(config, vec![Reply::status(404), Reply::status(404)]);

        let mut second = item("https://a.test/two");
        second.index = 1;
        let document = Document::new(
            None,
            vec![item("https://a.test/one"), second, item("mailto:x@a.test")],
        );

        let found = profile.check_document(document).await;
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.kind == DiagnosticKind::DeadLink));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_document_drops_expired_cache_entries() {
        let config = Config {
            link_max_age: 1_000,
            interval_cap: None,
            ..Config::default()
        };
        let (profile, _) = profile(config, vec![Reply::status(200)]);

        profile.probe_remote("https://a.test/old").await;
        assert_eq!(profile.cache().len(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        profile.check_document(Document::new(None, vec![])).await;
        assert!(profile.cache().is_empty());
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(origin_of("https://a.test/x/y?z"), "https://a.test");
        assert_eq!(origin_of("http://a.test:8080/"), "http://a.test:8080");
        assert_eq!(origin_of("a.test/"), "a.test");
    }
}
