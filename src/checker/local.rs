// src/checker/local.rs
// =============================================================================
// Checks that a local reference points at something on disk.
//
// Accepts either a file:// URL (what the resolver produces) or a plain
// path. Query strings and fragments are dropped before the lookup, so
// `guide.md#install` checks `guide.md`.
//
// Local failures are final: a missing file will not appear if we ask again,
// so there is no retry here.
// =============================================================================

use super::probe::ProbeResult;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

pub async fn probe_local(reference: &str) -> ProbeResult {
    let path = match to_path(reference) {
        Some(path) => path,
        None => return ProbeResult::failed(format!("Not a local path: {reference}")),
    };

    debug!(path = %path.display(), "probing local reference");

    match tokio::fs::metadata(&path).await {
        Ok(_) => ProbeResult::ok("OK"),
        Err(e) => ProbeResult::failed(e.to_string()),
    }
}

fn to_path(reference: &str) -> Option<PathBuf> {
    if reference.starts_with("file:") {
        // to_file_path drops query and fragment and decodes %-escapes
        return Url::parse(reference).ok()?.to_file_path().ok();
    }

    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    let path = &reference[..end];
    if path.is_empty() {
        return None;
    }
    Some(PathBuf::from(path))
}
