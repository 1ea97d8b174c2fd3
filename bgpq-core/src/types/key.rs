//! Store keys for cached lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AddressFamily, Depth, ObjectKind};

/// Store key for one cached lookup.
///
/// Rendered as `<kind>:<identifier>:<ipv4|ipv6>`, with `:<depth>` appended
/// only when the depth is bounded. Distinct requests never share a key and
/// identical requests always do.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupKey {
    /// Kind of object.
    pub kind: ObjectKind,
    /// Normalized identifier.
    pub identifier: String,
    /// Address family.
    pub family: AddressFamily,
    /// Expansion depth (0 = unbounded).
    pub depth: Depth,
}

/// Builds the store key for a lookup.
pub fn build_key(kind: ObjectKind, identifier: &str, family: AddressFamily, depth: Depth) -> LookupKey {
    LookupKey {
        kind,
        identifier: identifier.to_string(),
        family,
        depth,
    }
}

impl LookupKey {
    /// Parses a rendered key back into its parts.
    ///
    /// AS-SET identifiers may contain colons, so the family token is located
    /// from the right: `as_set:<ID...>:<family>[:<depth>]`. AS keys must have
    /// exactly three segments. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<LookupKey> {
        let segments: Vec<&str> = raw.split(':').collect();
        let kind = match *segments.first()? {
            p if p == ObjectKind::Asn.key_prefix() => ObjectKind::Asn,
            p if p == ObjectKind::AsSet.key_prefix() => ObjectKind::AsSet,
            _ => return None,
        };

        match kind {
            ObjectKind::Asn => {
                if segments.len() != 3 || segments[1].is_empty() {
                    return None;
                }
                Some(LookupKey {
                    kind,
                    identifier: segments[1].to_string(),
                    family: parse_family_segment(segments[2])?,
                    depth: Depth::UNBOUNDED,
                })
            }
            ObjectKind::AsSet => {
                let last = *segments.last()?;
                let (family_index, depth) = match parse_family_segment(last) {
                    Some(_) => (segments.len() - 1, Depth::UNBOUNDED),
                    None => {
                        if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
                            return None;
                        }
                        (segments.len().checked_sub(2)?, Depth::new(last.parse().ok()?))
                    }
                };
                if family_index < 2 {
                    return None;
                }
                let family = parse_family_segment(segments[family_index])?;
                let identifier = segments[1..family_index].join(":");
                if segments[1..family_index].iter().any(|s| s.is_empty()) {
                    return None;
                }
                Some(LookupKey {
                    kind,
                    identifier,
                    family,
                    depth,
                })
            }
        }
    }
}

fn parse_family_segment(segment: &str) -> Option<AddressFamily> {
    match segment {
        "ipv4" => Some(AddressFamily::Ipv4),
        "ipv6" => Some(AddressFamily::Ipv6),
        _ => None,
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind.key_prefix(), self.identifier, self.family)?;
        if let Some(limit) = self.depth.limit() {
            write!(f, ":{}", limit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rendering() {
        let key = build_key(ObjectKind::Asn, "AS1234", AddressFamily::Ipv4, Depth::UNBOUNDED);
        assert_eq!(key.to_string(), "asn:AS1234:ipv4");

        let key = build_key(ObjectKind::AsSet, "AS-FOO:AS1", AddressFamily::Ipv6, Depth::new(3));
        assert_eq!(key.to_string(), "as_set:AS-FOO:AS1:ipv6:3");
    }

    #[test]
    fn test_key_determinism() {
        let a = build_key(ObjectKind::Asn, "AS1234", AddressFamily::Ipv4, Depth::new(0));
        let b = build_key(ObjectKind::Asn, "AS1234", AddressFamily::Ipv4, Depth::new(0));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_depth_zero_aliases_default() {
        let explicit = build_key(ObjectKind::AsSet, "AS-FOO", AddressFamily::Ipv4, Depth::new(0));
        let default = build_key(ObjectKind::AsSet, "AS-FOO", AddressFamily::Ipv4, Depth::default());
        assert_eq!(explicit.to_string(), default.to_string());
    }

    #[test]
    fn test_keys_do_not_collide() {
        let base = build_key(ObjectKind::AsSet, "AS-FOO", AddressFamily::Ipv4, Depth::UNBOUNDED);
        let deeper = build_key(ObjectKind::AsSet, "AS-FOO", AddressFamily::Ipv4, Depth::new(1));
        let v6 = build_key(ObjectKind::AsSet, "AS-FOO", AddressFamily::Ipv6, Depth::UNBOUNDED);
        let asn = build_key(ObjectKind::Asn, "AS-FOO", AddressFamily::Ipv4, Depth::UNBOUNDED);

        assert_ne!(base.to_string(), deeper.to_string());
        assert_ne!(base.to_string(), v6.to_string());
        assert_ne!(base.to_string(), asn.to_string());
    }

    #[test]
    fn test_parse_roundtrip() {
        for key in [
            build_key(ObjectKind::Asn, "AS1", AddressFamily::Ipv6, Depth::UNBOUNDED),
            build_key(ObjectKind::AsSet, "AS-FOO", AddressFamily::Ipv4, Depth::UNBOUNDED),
            build_key(ObjectKind::AsSet, "AS-FOO:AS1:AS-BAR", AddressFamily::Ipv4, Depth::new(5)),
        ] {
            assert_eq!(LookupKey::parse(&key.to_string()), Some(key));
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(LookupKey::parse("asn:AS1"), None);
        assert_eq!(LookupKey::parse("asn:AS1:ipv4:extra"), None);
        assert_eq!(LookupKey::parse("asn::ipv4"), None);
        assert_eq!(LookupKey::parse("as_set:ipv4"), None);
        assert_eq!(LookupKey::parse("as_set:AS-FOO"), None);
        assert_eq!(LookupKey::parse("as_set:AS-FOO:ipv5"), None);
        assert_eq!(LookupKey::parse("as_set::ipv4"), None);
        assert_eq!(LookupKey::parse("route:AS1:ipv4"), None);
        assert_eq!(LookupKey::parse(""), None);
    }
}
