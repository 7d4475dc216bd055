// src/orchestrator/mod.rs
// =============================================================================
// Per-URI policy: what to skip, what to resolve, how to probe, and how to
// turn a probe result into a finding.
//
// Submodules:
// - item:       CheckItem / Span / Document, the input side
// - diagnostic: Diagnostic / Fix, the output side
// - ignore:     ignore rules as an injectable predicate
// - profile:    a Config made runnable (cache + scheduler + prober)
// =============================================================================

mod diagnostic;
mod ignore;
mod item;
mod profile;

pub use diagnostic::{Diagnostic, DiagnosticKind, Fix};
pub use ignore::{glob_predicate, ignore_nothing, IgnorePredicate};
pub use item::{CheckItem, Document, Span};
pub use profile::Profile;
