// src/lib.rs
// =============================================================================
// link-liveness: decides whether the URIs found in a document are alive,
// dead, or have moved.
//
// The pieces, leaf first:
// - checker:      classify, resolve and probe one reference (local or remote)
// - scheduler:    bound concurrency and start rate across many probes
// - orchestrator: per-URI policy, turning probe results into diagnostics
// - registry:     one Profile (cache + scheduler) per distinct Config
// - extract:      find URIs in Markdown
//
// Typical use:
//
//   let registry = ProfileRegistry::new();
//   let profile = registry.get_or_create(&Config::default())?;
//   let items = extract_markdown_links(&text);
//   let findings = profile.check_document(Document::new(Some(path), items)).await;
// =============================================================================

pub mod checker;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod registry;
pub mod scheduler;

pub use checker::{Method, ProbeResult};
pub use config::Config;
pub use error::{Error, Result};
pub use extract::extract_markdown_links;
pub use orchestrator::{CheckItem, Diagnostic, DiagnosticKind, Document, Fix, Profile, Span};
pub use registry::ProfileRegistry;
