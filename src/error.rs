//! Error types for listing retrieval, asset fetching and export
//!
//! Fetch failures are local to the part cache: a failed entry is dropped
//! and retried on the next request, never cached. Only listing retrieval
//! is fatal for a category.

use std::fmt;

/// Errors surfaced by the visage library
#[derive(Debug, Clone)]
pub enum VisageError {
    /// Variant listing unavailable - fatal for that category
    ListingFetch { category: String, reason: String },
    /// Single variant fetch failed - entry evicted, retried on next request
    AssetFetch {
        category: String,
        name: String,
        reason: String,
    },
    /// Malformed part SVG (missing layer or creator metadata)
    PartParse(String),
    /// Server-side render (permalink) request failed
    ServerRender(String),
    /// PNG/SVG export failed
    Export(String),
    /// No category with this name in the session
    UnknownCategory(String),
    /// No palette slot with this key
    UnknownPaletteKey(String),
    /// Color value is not a #rrggbb string
    InvalidColor(String),
    /// Category is driven by its linked primary and cannot be selected directly
    LinkedSelection(String),
    /// The awaited part did not settle within the fetch timeout
    SelectionTimeout { category: String, index: usize },
    /// HTTP client construction or transport-level failure
    Transport(String),
    /// Alignment table construction failed
    Alignment(String),
}

impl fmt::Display for VisageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisageError::ListingFetch { category, reason } => {
                write!(f, "listing fetch failed for '{}': {}", category, reason)
            }
            VisageError::AssetFetch {
                category,
                name,
                reason,
            } => {
                write!(f, "asset fetch failed for {}/{}: {}", category, name, reason)
            }
            VisageError::PartParse(reason) => write!(f, "part parse error: {}", reason),
            VisageError::ServerRender(reason) => write!(f, "server render failed: {}", reason),
            VisageError::Export(reason) => write!(f, "export failed: {}", reason),
            VisageError::UnknownCategory(name) => write!(f, "unknown category '{}'", name),
            VisageError::UnknownPaletteKey(key) => write!(f, "unknown palette key '{}'", key),
            VisageError::InvalidColor(value) => write!(f, "invalid color '{}'", value),
            VisageError::LinkedSelection(name) => {
                write!(f, "category '{}' follows its linked primary", name)
            }
            VisageError::SelectionTimeout { category, index } => {
                write!(f, "timed out waiting for {}[{}]", category, index)
            }
            VisageError::Transport(reason) => write!(f, "transport error: {}", reason),
            VisageError::Alignment(reason) => write!(f, "alignment error: {}", reason),
        }
    }
}

impl std::error::Error for VisageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = VisageError::AssetFetch {
            category: "eyes".to_string(),
            name: "eyes_0003_round.svg".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("eyes/eyes_0003_round.svg"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn listing_failure_names_category() {
        let err = VisageError::ListingFetch {
            category: "hat".to_string(),
            reason: "404".to_string(),
        };
        assert!(err.to_string().contains("'hat'"));
    }
}
