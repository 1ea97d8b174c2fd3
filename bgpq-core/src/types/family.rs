//! IP address families accepted by the resolver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, Result};

/// An IP address family.
///
/// Only IPv4 and IPv6 exist at the resolver boundary; anything else is
/// rejected when parsed from text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4 prefixes.
    Ipv4,
    /// IPv6 prefixes.
    Ipv6,
}

impl AddressFamily {
    /// Both families, in response order.
    pub const ALL: [AddressFamily; 2] = [AddressFamily::Ipv4, AddressFamily::Ipv6];

    /// Segment used in store keys (`ipv4` / `ipv6`).
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }

    /// Command-line flag selecting this family for bgpq.
    pub fn bgpq_flag(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "-4",
            AddressFamily::Ipv6 => "-6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressFamily {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ipv4" | "4" | "inet" => Ok(AddressFamily::Ipv4),
            "ipv6" | "6" | "inet6" => Ok(AddressFamily::Ipv6),
            _ => Err(ProxyError::UnsupportedFamily(s.to_string())),
        }
    }
}
