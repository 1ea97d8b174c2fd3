//! AS and AS-SET identifiers.
//!
//! Raw user tokens are canonicalized (bare numbers become `AS<n>`, AS-SET
//! names gain an `AS-` prefix, everything is uppercased) and then validated
//! against the RPSL naming rules:
//!
//! - AS: `AS` followed by digits
//! - AS-SET: `AS-` followed by word characters, optionally hierarchical
//!   (`AS-FOO:AS1234:AS-BAR`), where every segment is an AS-SET or an AS

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{AS_SET_KEY_PREFIX, ASN_KEY_PREFIX};
use crate::error::{ProxyError, Result};

static PATTERN_AS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^AS[0-9]+$").expect("valid AS pattern"));

// https://www.ripe.net/manage-ips-and-asns/db/support/documentation/ripe-database-documentation/rpsl-object-types/4-2-descriptions-of-primary-objects/4-2-7-description-of-the-as-set-object
static PATTERN_AS_SET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^AS-[A-Za-z0-9_]+$").expect("valid AS-SET pattern"));

// ═══════════════════════════════════════════════════════════════════════════════
// OBJECT KIND
// ═══════════════════════════════════════════════════════════════════════════════

/// Kind of IRR object being looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A single autonomous system.
    Asn,
    /// An AS-SET, possibly hierarchical.
    AsSet,
}

impl ObjectKind {
    /// Prefix used for this kind in store keys.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            ObjectKind::Asn => ASN_KEY_PREFIX,
            ObjectKind::AsSet => AS_SET_KEY_PREFIX,
        }
    }

    /// Store scan pattern matching every key of this kind.
    pub fn scan_pattern(&self) -> String {
        format!("{}:*", self.key_prefix())
    }

    /// Normalizes and validates a raw identifier of this kind.
    pub fn normalize(&self, raw: &str) -> Result<String> {
        match self {
            ObjectKind::Asn => normalize_asn(raw).map(AsIdentifier::into_inner),
            ObjectKind::AsSet => normalize_as_set(raw).map(AsSetIdentifier::into_inner),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Asn => f.write_str("AS"),
            ObjectKind::AsSet => f.write_str("AS-SET"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AS IDENTIFIER
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated, uppercase `AS<digits>` identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AsIdentifier(String);

impl AsIdentifier {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AsIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AsIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        normalize_asn(&raw).map_err(serde::de::Error::custom)
    }
}

/// Canonicalizes and validates an AS identifier.
///
/// A bare number is rewritten as `AS<number>`; the result is uppercased and
/// must match `^AS[0-9]+$`.
///
/// ```rust
/// use bgpq_core::normalize_asn;
///
/// assert_eq!(normalize_asn("1234").unwrap().as_str(), "AS1234");
/// assert_eq!(normalize_asn("as1234").unwrap().as_str(), "AS1234");
/// assert!(normalize_asn("AS-FOO").is_err());
/// ```
pub fn normalize_asn(raw: &str) -> Result<AsIdentifier> {
    let raw = raw.trim();

    let formatted = if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("AS{}", raw)
    } else {
        raw.to_string()
    };
    let normalized = formatted.to_uppercase();

    if !PATTERN_AS.is_match(&normalized) {
        return Err(ProxyError::invalid_identifier(
            ObjectKind::Asn,
            normalized.clone(),
            normalized,
        ));
    }

    Ok(AsIdentifier(normalized))
}

// ═══════════════════════════════════════════════════════════════════════════════
// AS-SET IDENTIFIER
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated, uppercase AS-SET name (possibly hierarchical).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AsSetIdentifier(String);

impl AsSetIdentifier {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AsSetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AsSetIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        normalize_as_set(&raw).map_err(serde::de::Error::custom)
    }
}

/// Canonicalizes and validates an AS-SET identifier.
///
/// `AS-` is prepended unless already present (in any case), then the name is
/// uppercased. A flat name must be an AS-SET; in a hierarchical name every
/// segment must be an AS-SET or an AS. The first offending segment is
/// reported.
///
/// ```rust
/// use bgpq_core::normalize_as_set;
///
/// assert_eq!(normalize_as_set("foo").unwrap().as_str(), "AS-FOO");
/// assert!(normalize_as_set("AS-FOO:AS1234:AS-BAR").is_ok());
/// assert!(normalize_as_set("AS-FOO:bogus").is_err());
/// ```
pub fn normalize_as_set(raw: &str) -> Result<AsSetIdentifier> {
    let raw = raw.trim();

    let has_prefix = raw
        .get(..3)
        .map(|p| p.eq_ignore_ascii_case("AS-"))
        .unwrap_or(false);
    let formatted = if has_prefix {
        raw.to_string()
    } else {
        format!("AS-{}", raw)
    };
    let normalized = formatted.to_uppercase();

    validate_as_set(&normalized)?;

    Ok(AsSetIdentifier(normalized))
}

fn validate_as_set(as_set: &str) -> Result<()> {
    if !as_set.contains(':') {
        if !PATTERN_AS_SET.is_match(as_set) {
            return Err(ProxyError::invalid_identifier(ObjectKind::AsSet, as_set, as_set));
        }
        return Ok(());
    }

    match as_set
        .split(':')
        .find(|part| !PATTERN_AS_SET.is_match(part) && !PATTERN_AS.is_match(part))
    {
        Some(part) => Err(ProxyError::invalid_identifier(ObjectKind::AsSet, as_set, part)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("1234", "AS1234")]
    #[test_case("AS1234", "AS1234")]
    #[test_case("as1234", "AS1234")]
    #[test_case("aS65000", "AS65000")]
    #[test_case(" 64512 ", "AS64512")]
    #[test_case("0", "AS0")]
    fn test_normalize_asn(input: &str, expected: &str) {
        assert_eq!(normalize_asn(input).unwrap().as_str(), expected);
    }

    #[test_case("")]
    #[test_case("AS")]
    #[test_case("AS-FOO")]
    #[test_case("ASX1")]
    #[test_case("-5")]
    #[test_case("+5")]
    #[test_case("AS12a")]
    #[test_case("foo")]
    fn test_normalize_asn_rejects(input: &str) {
        let err = normalize_asn(input).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidIdentifier { kind: ObjectKind::Asn, .. }));
    }

    #[test_case("foo", "AS-FOO")]
    #[test_case("AS-FOO", "AS-FOO")]
    #[test_case("as-foo", "AS-FOO")]
    #[test_case("As-Foo_Bar", "AS-FOO_BAR")]
    #[test_case("AS-FOO:AS1234:AS-BAR", "AS-FOO:AS1234:AS-BAR")]
    #[test_case("as1234:as-customers", "AS-AS1234:AS-CUSTOMERS")]
    fn test_normalize_as_set(input: &str, expected: &str) {
        assert_eq!(normalize_as_set(input).unwrap().as_str(), expected);
    }

    #[test]
    fn test_normalize_as_set_reports_segment() {
        match normalize_as_set("AS-FOO:bogus").unwrap_err() {
            ProxyError::InvalidIdentifier { kind, identifier, segment } => {
                assert_eq!(kind, ObjectKind::AsSet);
                assert_eq!(identifier, "AS-FOO:BOGUS");
                assert!(segment.eq_ignore_ascii_case("bogus"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test_case("AS-")]
    #[test_case("")]
    #[test_case("AS-FOO BAR")]
    #[test_case("AS-FOO.BAR")]
    #[test_case("AS-FOO::AS-BAR")]
    #[test_case("AS-FOO:")]
    fn test_normalize_as_set_rejects(input: &str) {
        assert!(matches!(
            normalize_as_set(input),
            Err(ProxyError::InvalidIdentifier { kind: ObjectKind::AsSet, .. })
        ));
    }

    #[test]
    fn test_kind_normalize_dispatch() {
        assert_eq!(ObjectKind::Asn.normalize("42").unwrap(), "AS42");
        assert_eq!(ObjectKind::AsSet.normalize("x").unwrap(), "AS-X");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let asn: AsIdentifier = serde_json::from_str("\"65000\"").unwrap();
        assert_eq!(asn.as_str(), "AS65000");
        assert!(serde_json::from_str::<AsSetIdentifier>("\"AS-FOO:???\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_numeric_asn_forms_agree(n in 0u64..u64::MAX) {
            let bare = normalize_asn(&n.to_string()).unwrap();
            let upper = normalize_asn(&format!("AS{n}")).unwrap();
            let lower = normalize_asn(&format!("as{n}")).unwrap();
            let expected = format!("AS{n}");
            prop_assert_eq!(bare.as_str(), expected.as_str());
            prop_assert_eq!(upper.as_str(), expected.as_str());
            prop_assert_eq!(lower.as_str(), expected.as_str());
        }

        #[test]
        fn prop_non_numeric_asn_rejected(s in "[A-Za-z_-]{1,12}") {
            prop_assert!(normalize_asn(&s).is_err());
        }

        #[test]
        fn prop_as_set_idempotent(name in "[A-Za-z0-9_]{1,16}") {
            let once = normalize_as_set(&name).unwrap();
            let twice = normalize_as_set(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
