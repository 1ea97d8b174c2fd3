//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use bgpq_cache::LookupOptions;
use bgpq_core::types::{AddressFamily, Depth};

use crate::error::ApiError;

/// Query parameters of a lookup.
///
/// Kept as raw strings so malformed values surface as domain errors
/// rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    /// Expansion depth (AS-SET only), default 0
    pub depth: Option<String>,
    /// Discard the cached entry first
    pub invalidate: Option<String>,
    /// Bypass the cache entirely
    pub no_cache: Option<String>,
    /// Restrict to one address family
    pub family: Option<String>,
}

fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool, ApiError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some(other) => Err(ApiError::bad_request(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

impl LookupParams {
    /// Converts to lookup options.
    pub fn options(&self) -> Result<LookupOptions, ApiError> {
        let depth = match self.depth.as_deref() {
            Some(raw) => raw.parse::<Depth>()?,
            None => Depth::UNBOUNDED,
        };

        Ok(LookupOptions {
            depth,
            invalidate: parse_flag("invalidate", self.invalidate.as_deref())?,
            no_cache: parse_flag("no_cache", self.no_cache.as_deref())?,
        })
    }

    /// Families to resolve: the requested one, or both.
    pub fn families(&self) -> Result<Vec<AddressFamily>, ApiError> {
        match self.family.as_deref() {
            Some(raw) => Ok(vec![raw.parse::<AddressFamily>()?]),
            None => Ok(AddressFamily::ALL.to_vec()),
        }
    }
}

/// Cached ASNs.
#[derive(Debug, Serialize)]
pub struct AsnListResponse {
    /// Distinct ASNs with at least one cached family
    pub asn: Vec<String>,
}

/// Cached AS-SETs.
#[derive(Debug, Serialize)]
pub struct AsSetListResponse {
    /// Distinct AS-SETs with at least one cached family or depth
    pub as_sets: Vec<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Crate version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(depth: Option<&str>, invalidate: Option<&str>, no_cache: Option<&str>) -> LookupParams {
        LookupParams {
            depth: depth.map(Into::into),
            invalidate: invalidate.map(Into::into),
            no_cache: no_cache.map(Into::into),
            family: None,
        }
    }

    #[test]
    fn test_defaults() {
        let options = LookupParams::default().options().unwrap();
        assert_eq!(options, LookupOptions::default());
        assert_eq!(LookupParams::default().families().unwrap(), AddressFamily::ALL.to_vec());
    }

    #[test]
    fn test_flags() {
        let options = params(Some("2"), Some("true"), Some("1")).options().unwrap();
        assert_eq!(options.depth, Depth::new(2));
        assert!(options.invalidate);
        assert!(options.no_cache);

        let options = params(None, Some("False"), Some("")).options().unwrap();
        assert!(!options.invalidate);
        assert!(!options.no_cache);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(params(Some("deep"), None, None).options().is_err());
        assert!(params(None, Some("maybe"), None).options().is_err());

        let bad_family = LookupParams {
            family: Some("ipx".into()),
            ..Default::default()
        };
        assert!(bad_family.families().is_err());
    }
}
