//! Domain types for bgpq-proxy.
//!
//! - [`AsIdentifier`] / [`AsSetIdentifier`]: validated IRR object names
//! - [`AddressFamily`]: IPv4 or IPv6
//! - [`Depth`]: AS-SET recursion limit, 0 meaning unbounded
//! - [`LookupKey`]: the store key for one (kind, identifier, family, depth)
//! - [`PrefixList`] / [`FamilyPrefixes`]: resolver output

mod depth;
mod family;
mod identifier;
mod key;
mod prefix;

pub use depth::*;
pub use family::*;
pub use identifier::*;
pub use key::*;
pub use prefix::*;
