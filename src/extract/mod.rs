// src/extract/mod.rs
// =============================================================================
// Sources of (uri, position) pairs for the orchestrator.
//
// Only Markdown for now; anything that can produce CheckItems can feed a
// Profile.
// =============================================================================

mod markdown;

pub use markdown::extract_markdown_links;
