//! AS-SET expansion depth.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, Result};

/// Maximum recursion level when expanding an AS-SET.
///
/// `0` is the resolver's default (unbounded) and is treated exactly like
/// "no depth given": it never appears in store keys nor on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Depth(u32);

impl Depth {
    /// Unbounded expansion.
    pub const UNBOUNDED: Depth = Depth(0);

    /// Creates a depth limit.
    pub const fn new(depth: u32) -> Self {
        Self(depth)
    }

    /// Returns the limit if one is set (depth > 0).
    pub fn limit(&self) -> Option<u32> {
        (self.0 > 0).then_some(self.0)
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Depth {
    type Err = ProxyError;

    /// Parses a base-10 non-negative integer; an empty string is the default depth.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Depth::UNBOUNDED);
        }
        trimmed
            .parse::<u32>()
            .map(Depth)
            .map_err(|_| ProxyError::InvalidDepth(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", 0)]
    #[test_case("3", 3)]
    #[test_case(" 12 ", 12)]
    #[test_case("", 0)]
    fn test_parse_depth(input: &str, expected: u32) {
        assert_eq!(input.parse::<Depth>().unwrap(), Depth::new(expected));
    }

    #[test_case("abc")]
    #[test_case("1.5")]
    #[test_case("-1")]
    #[test_case("99999999999")]
    fn test_parse_invalid_depth(input: &str) {
        let err = input.parse::<Depth>().unwrap_err();
        assert!(matches!(err, ProxyError::InvalidDepth(_)));
    }

    #[test]
    fn test_limit() {
        assert_eq!(Depth::UNBOUNDED.limit(), None);
        assert_eq!(Depth::new(2).limit(), Some(2));
    }
}
