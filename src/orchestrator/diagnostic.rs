// src/orchestrator/diagnostic.rs
// =============================================================================
// The findings reported back to the caller.
//
// Three kinds:
// - dead:         the link is unreachable (final status, error text, or a
//                 redirect we couldn't follow)
// - obsolete:     the link works but only through a redirect; carries a fix
// - unresolvable: a relative link with nothing to resolve it against
// =============================================================================

use super::item::Span;
use crate::checker::ProbeResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    DeadLink,
    ObsoleteLink,
    UnresolvableRelative,
}

/// A literal text replacement: put `replacement` where `span` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub span: Span,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub uri: String,
    pub message: String,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn dead(uri: &str, span: Span, result: &ProbeResult) -> Self {
        Self {
            kind: DiagnosticKind::DeadLink,
            uri: uri.to_string(),
            message: format!("Link to {uri} is dead: {}", result.message),
            span,
            fix: None,
        }
    }

    pub fn obsolete(uri: &str, span: Span, result: &ProbeResult) -> Self {
        let fix = result.redirect_to.as_ref().map(|to| Fix {
            span,
            replacement: to.clone(),
        });
        let message = match &result.redirect_to {
            Some(to) => format!("Link to {uri} redirects to {to} ({})", result.message),
            None => format!("Link to {uri} redirects ({})", result.message),
        };

        Self {
            kind: DiagnosticKind::ObsoleteLink,
            uri: uri.to_string(),
            message,
            span,
            fix,
        }
    }

    pub fn unresolvable(uri: &str, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::UnresolvableRelative,
            uri: uri.to_string(),
            message: format!(
                "Unable to resolve relative URI {uri}: no base URI configured and no document location"
            ),
            span,
            fix: None,
        }
    }
}
