//! # bgpq-proxy Runner
//!
//! Expands AS and AS-SET objects into prefix lists by running bgpq3/bgpq4.
//!
//! ```rust,ignore
//! use bgpq_runner::{BgpqRunner, RunnerConfig};
//!
//! let runner = BgpqRunner::with_config(RunnerConfig::new("/usr/bin/bgpq4"));
//! let prefixes = runner.resolve("AS-EXAMPLE", AddressFamily::Ipv6, Depth::UNBOUNDED).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod runner;

pub use runner::{BgpqRunner, RunnerConfig};
