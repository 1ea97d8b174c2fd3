//! Resolver output.

use serde::{Deserialize, Serialize};

use super::AddressFamily;

/// Ordered prefixes in CIDR notation, verbatim from the resolver.
pub type PrefixList = Vec<String>;

/// Prefix lists for both address families of one object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyPrefixes {
    /// IPv4 prefixes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<PrefixList>,
    /// IPv6 prefixes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<PrefixList>,
}

impl FamilyPrefixes {
    /// Stores the list for `family`.
    pub fn insert(&mut self, family: AddressFamily, prefixes: PrefixList) {
        match family {
            AddressFamily::Ipv4 => self.ipv4 = Some(prefixes),
            AddressFamily::Ipv6 => self.ipv6 = Some(prefixes),
        }
    }

    /// Returns the list for `family`, if it was resolved.
    pub fn get(&self, family: AddressFamily) -> Option<&PrefixList> {
        match family {
            AddressFamily::Ipv4 => self.ipv4.as_ref(),
            AddressFamily::Ipv6 => self.ipv6.as_ref(),
        }
    }
}
