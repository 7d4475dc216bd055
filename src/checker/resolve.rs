// src/checker/resolve.rs
// =============================================================================
// Turns a relative reference into something a prober can check.
//
// Two modes:
// - http-only: plain URL joining, `reference` against `base` as an absolute
//   URL. A base that is not a URL means there is nothing to join against.
// - default: only relative references are touched. The base may be a URL
//   or a bare filesystem path; a path is turned into a file:// URL first so
//   both go through the same join.
//
// The caller picks the base (configured baseURI first, then the document's
// own location).
// =============================================================================

use super::classify::is_relative;
use std::path::{Path, MAIN_SEPARATOR};
use url::Url;

pub fn resolve(reference: &str, base: &str, http_only: bool) -> Option<String> {
    if http_only {
        let base = Url::parse(base).ok()?;
        return base.join(reference).ok().map(String::from);
    }

    if !is_relative(reference) {
        return Some(reference.to_string());
    }

    let base = base_url(base)?;
    base.join(reference).ok().map(String::from)
}

// Coerces a base into a URL. URLs are used as-is; anything else is taken
// as a filesystem path (relative paths are anchored at the working
// directory). A trailing separator marks a directory, so `docs/` joins
// `a.md` as `docs/a.md` while `docs/index.md` joins it as a sibling.
fn base_url(base: &str) -> Option<Url> {
    if base.is_empty() {
        return None;
    }

    let path = Path::new(base);
    if !path.is_absolute() {
        if let Ok(url) = Url::parse(base) {
            return Some(url);
        }
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };

    if base.ends_with('/') || base.ends_with(MAIN_SEPARATOR) {
        Url::from_directory_path(absolute).ok()
    } else {
        Url::from_file_path(absolute).ok()
    }
}
