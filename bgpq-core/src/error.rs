//! Error types for bgpq-proxy.
//!
//! Every failure a lookup can produce is a [`ProxyError`]. Validation errors
//! are raised before any store or process interaction; resolver and store
//! errors are surfaced as-is and never retried.

use thiserror::Error;

use crate::types::ObjectKind;

/// Result type alias using `ProxyError`.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Main error type for all bgpq-proxy operations.
#[derive(Debug, Error)]
pub enum ProxyError {
    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Malformed AS or AS-SET syntax.
    #[error("Invalid {kind}: {identifier}{}", segment_suffix(.identifier, .segment))]
    InvalidIdentifier {
        /// Kind of object that was being normalized.
        kind: ObjectKind,
        /// The identifier after normalization.
        identifier: String,
        /// The first segment that failed validation.
        segment: String,
    },

    /// Depth is not a non-negative integer.
    #[error("depth must be a non-negative integer, got '{0}'")]
    InvalidDepth(String),

    /// Address family outside IPv4/IPv6.
    #[error("Unsupported address family: {0}")]
    UnsupportedFamily(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RESOLVER ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// The external expander failed or broke its output contract.
    #[error("{message}")]
    ResolverFailure {
        /// Exit code of the process, when it ran to completion.
        exit_code: Option<i32>,
        /// Trimmed standard error, when non-empty.
        stderr: Option<String>,
        /// Human-readable description.
        message: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // STORE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Key-value store round-trip failed.
    #[error("Store error: {0}")]
    Store(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION / IO / CONFIG
    // ═══════════════════════════════════════════════════════════════════════════
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Names the failing segment only when it is not the whole identifier.
fn segment_suffix(identifier: &str, segment: &str) -> String {
    if segment == identifier {
        String::new()
    } else {
        format!(" (part {})", segment)
    }
}

impl ProxyError {
    /// Builds an `InvalidIdentifier` error.
    pub fn invalid_identifier(
        kind: ObjectKind,
        identifier: impl Into<String>,
        segment: impl Into<String>,
    ) -> Self {
        ProxyError::InvalidIdentifier {
            kind,
            identifier: identifier.into(),
            segment: segment.into(),
        }
    }

    /// Builds a `ResolverFailure` without process details (spawn, timeout, output contract).
    pub fn resolver(message: impl Into<String>) -> Self {
        ProxyError::ResolverFailure {
            exit_code: None,
            stderr: None,
            message: message.into(),
        }
    }

    /// Returns true if the error was caused by caller input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProxyError::InvalidIdentifier { .. }
                | ProxyError::InvalidDepth(_)
                | ProxyError::UnsupportedFamily(_)
        )
    }

    /// Returns true if the external resolver failed.
    pub fn is_resolver_error(&self) -> bool {
        matches!(self, ProxyError::ResolverFailure { .. })
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            ProxyError::InvalidDepth(_) => "INVALID_DEPTH",
            ProxyError::UnsupportedFamily(_) => "UNSUPPORTED_FAMILY",
            ProxyError::ResolverFailure { .. } => "RESOLVER_FAILURE",
            ProxyError::Store(_) => "STORE_ERROR",
            ProxyError::Json(_) | ProxyError::Io(_) | ProxyError::Config(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProxyError::invalid_identifier(ObjectKind::AsSet, "AS-FOO:BOGUS", "BOGUS");
        assert_eq!(err.to_string(), "Invalid AS-SET: AS-FOO:BOGUS (part BOGUS)");

        let err = ProxyError::invalid_identifier(ObjectKind::Asn, "AS65X", "AS65X");
        assert_eq!(err.to_string(), "Invalid AS: AS65X");

        let err = ProxyError::InvalidDepth("abc".into());
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_error_classification() {
        assert!(ProxyError::InvalidDepth("x".into()).is_client_error());
        assert!(ProxyError::UnsupportedFamily("ipx".into()).is_client_error());
        assert!(!ProxyError::Store("down".into()).is_client_error());

        assert!(ProxyError::resolver("boom").is_resolver_error());
        assert!(!ProxyError::Store("down".into()).is_resolver_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ProxyError::resolver("boom").code(), "RESOLVER_FAILURE");
        assert_eq!(ProxyError::Config("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let proxy_result: Result<serde_json::Value> = json_result.map_err(ProxyError::from);
        assert!(matches!(proxy_result, Err(ProxyError::Json(_))));
    }
}
