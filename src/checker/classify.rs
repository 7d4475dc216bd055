// src/checker/classify.rs
// =============================================================================
// Decides what kind of reference a string is, without touching the network
// or the filesystem.
//
// - http:     parses as a URL with scheme http or https
// - relative: no scheme and no host, or a host-less file: URL, and not an
//             absolute filesystem path
// - local:    an absolute filesystem path, or relative
//
// Everything else (mailto:, ftp:, ws:, ...) is inert and gets skipped by the
// orchestrator. Malformed input never panics; it simply classifies as
// relative / non-http and the downstream skip logic deals with it.
// =============================================================================

use std::path::Path;
use url::Url;

pub fn is_http(uri: &str) -> bool {
    match Url::parse(uri) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

pub fn is_relative(uri: &str) -> bool {
    if is_absolute_path(uri) {
        return false;
    }

    // "//host/path" has a host even though it has no scheme
    if uri.starts_with("//") {
        return false;
    }

    match Url::parse(uri) {
        Ok(url) => url.scheme() == "file" && url.host().is_none(),
        // No scheme at all (or garbage): a relative reference
        Err(_) => true,
    }
}

pub fn is_local(uri: &str) -> bool {
    is_absolute_path(uri) || is_relative(uri)
}

// Windows drive paths like `C:\docs` parse as URLs with scheme "c", so the
// path check has to run before any URL parsing.
fn is_absolute_path(uri: &str) -> bool {
    !uri.is_empty() && Path::new(uri).is_absolute()
}
