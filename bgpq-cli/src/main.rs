//! bgpq-proxy CLI
//!
//! Runs the caching API server, or performs one-shot lookups against the same
//! store and resolver.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use futures::TryStreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bgpq_api::{ApiServer, AppState, ProxyConfig};
use bgpq_cache::{CacheConfig, LookupOptions};
use bgpq_core::types::{AddressFamily, Depth, FamilyPrefixes, ObjectKind};

/// bgpq-proxy - caching front end for bgpq3/bgpq4
#[derive(Parser)]
#[command(name = "bgpq-proxy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Store and resolver settings; unset flags fall back to `ProxyConfig::from_env`.
#[derive(clap::Args)]
struct BackendArgs {
    /// bgpq3/bgpq4 binary (default: $BGPQ_PATH)
    #[arg(long, global = true)]
    bgpq_path: Option<PathBuf>,
    /// Resolver timeout in seconds (default: $BGPQ_TIMEOUT)
    #[arg(long, global = true)]
    bgpq_timeout: Option<u64>,
    /// Redis host (default: $REDIS_HOST)
    #[arg(long, global = true)]
    redis_host: Option<String>,
    /// Redis port (default: $REDIS_PORT)
    #[arg(long, global = true)]
    redis_port: Option<u16>,
    /// Redis database (default: $REDIS_DB)
    #[arg(long, global = true)]
    redis_db: Option<i64>,
    /// Cache entry lifetime in seconds (default: $CACHE_TIMEOUT)
    #[arg(long, global = true)]
    cache_timeout: Option<u64>,
    /// Keep the cache in process memory instead of Redis
    #[arg(long, global = true)]
    memory_store: bool,
}

impl BackendArgs {
    fn config(&self) -> ProxyConfig {
        let mut config = ProxyConfig::from_env();

        if let Some(path) = &self.bgpq_path {
            config.runner.path = path.clone();
        }
        if let Some(timeout) = self.bgpq_timeout {
            config.runner.timeout_seconds = timeout;
        }
        if let Some(host) = &self.redis_host {
            config.redis.host = host.clone();
        }
        if let Some(port) = self.redis_port {
            config.redis.port = port;
        }
        if let Some(db) = self.redis_db {
            config.redis.db = db;
        }
        if let Some(ttl) = self.cache_timeout {
            config.cache = CacheConfig::with_ttl(Duration::from_secs(ttl));
        }
        config
    }

    async fn state(&self) -> Result<AppState> {
        let config = self.config();
        if self.memory_store {
            return Ok(AppState::in_memory(config));
        }

        let url = config.redis.url();
        AppState::connect(config)
            .await
            .with_context(|| format!("Failed to connect to {}", url))
    }
}

/// Lookup flags shared by `asn` and `as-set`.
#[derive(clap::Args)]
struct LookupArgs {
    /// Only resolve one address family
    #[arg(short, long)]
    family: Option<FamilyArg>,
    /// Discard any cached entry before resolving
    #[arg(long)]
    invalidate: bool,
    /// Bypass the cache entirely
    #[arg(long)]
    no_cache: bool,
    /// Print raw JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FamilyArg {
    Ipv4,
    Ipv6,
}

impl From<FamilyArg> for AddressFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Ipv4 => AddressFamily::Ipv4,
            FamilyArg::Ipv6 => AddressFamily::Ipv6,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ListTarget {
    Asns,
    AsSets,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Look up the prefixes of an AS
    Asn {
        /// AS number, with or without the AS prefix
        asn: String,
        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Look up the prefixes of an AS-SET
    AsSet {
        /// AS-SET name, flat or hierarchical
        as_set: String,
        /// Expansion depth (0 = unlimited)
        #[arg(short, long, default_value_t = 0)]
        depth: u32,
        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// List identifiers currently cached
    List {
        #[arg(value_enum)]
        target: ListTarget,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "bgpq=debug,info"
    } else {
        "bgpq=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(&cli.backend, port, &bind).await,
        Commands::Asn { asn, lookup } => {
            cmd_lookup(&cli.backend, ObjectKind::Asn, &asn, Depth::UNBOUNDED, &lookup).await
        }
        Commands::AsSet { as_set, depth, lookup } => {
            cmd_lookup(&cli.backend, ObjectKind::AsSet, &as_set, Depth::new(depth), &lookup).await
        }
        Commands::List { target } => cmd_list(&cli.backend, target).await,
    }
}

/// Run the API server
async fn cmd_serve(backend: &BackendArgs, port: u16, bind: &str) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let server = ApiServer::new(backend.state().await?);

    println!("{}", "Starting bgpq-proxy API server...".cyan().bold());
    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} http://{}/health", "Health check:".dimmed(), addr);
    println!("\n   Press Ctrl+C to stop.\n");

    server.run(addr).await.context("API server failed")?;
    Ok(())
}

/// One-shot lookup
async fn cmd_lookup(
    backend: &BackendArgs,
    kind: ObjectKind,
    identifier: &str,
    depth: Depth,
    args: &LookupArgs,
) -> Result<()> {
    // Reject bad input before connecting anywhere.
    let normalized = kind.normalize(identifier)?;

    let families = match args.family {
        Some(family) => vec![family.into()],
        None => AddressFamily::ALL.to_vec(),
    };
    let options = LookupOptions {
        depth,
        invalidate: args.invalidate,
        no_cache: args.no_cache,
    };

    let state = backend.state().await?;
    let prefixes = state
        .cache
        .lookup_families(kind, &normalized, &families, &options)
        .await
        .with_context(|| format!("Lookup of {} failed", normalized))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prefixes)?);
    } else {
        print_prefixes(&normalized, &prefixes);
    }
    Ok(())
}

fn print_prefixes(identifier: &str, prefixes: &FamilyPrefixes) {
    println!("{}", identifier.cyan().bold());

    for family in AddressFamily::ALL {
        let Some(list) = prefixes.get(family) else {
            continue;
        };
        println!("   {} ({})", family.as_str().green(), list.len());
        for prefix in list {
            println!("      {}", prefix);
        }
    }
}

/// List cached identifiers
async fn cmd_list(backend: &BackendArgs, target: ListTarget) -> Result<()> {
    let state = backend.state().await?;

    let stream = match target {
        ListTarget::Asns => state.cache.list_cached_asns(),
        ListTarget::AsSets => state.cache.list_cached_as_sets(),
    };
    let identifiers: Vec<String> = stream
        .try_collect()
        .await
        .context("Failed to enumerate cache")?;

    if identifiers.is_empty() {
        println!("{}", "Nothing cached.".dimmed());
        return Ok(());
    }
    for identifier in &identifiers {
        println!("{}", identifier);
    }
    println!("\n{} {}", identifiers.len().to_string().bold(), "cached".dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgpq_core::constants::DEFAULT_REDIS_PORT;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_as_set_lookup() {
        let cli = Cli::try_parse_from([
            "bgpq-proxy",
            "as-set",
            "AS-EXAMPLE",
            "--depth",
            "2",
            "--family",
            "ipv6",
            "--invalidate",
        ])
        .unwrap();

        match cli.command {
            Commands::AsSet { as_set, depth, lookup } => {
                assert_eq!(as_set, "AS-EXAMPLE");
                assert_eq!(depth, 2);
                assert!(matches!(lookup.family, Some(FamilyArg::Ipv6)));
                assert!(lookup.invalidate);
                assert!(!lookup.no_cache);
            }
            _ => panic!("expected as-set command"),
        }
    }

    #[test]
    fn test_backend_overrides() {
        let cli = Cli::try_parse_from([
            "bgpq-proxy",
            "list",
            "asns",
            "--redis-host",
            "cache.internal",
            "--redis-db",
            "2",
            "--bgpq-path",
            "/usr/bin/bgpq4",
            "--cache-timeout",
            "60",
        ])
        .unwrap();

        let config = cli.backend.config();
        assert_eq!(config.redis.host, "cache.internal");
        assert_eq!(config.redis.db, 2);
        assert_eq!(config.runner.path, PathBuf::from("/usr/bin/bgpq4"));
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert!(matches!(cli.command, Commands::List { target: ListTarget::Asns }));
    }

    #[test]
    fn test_malformed_env_falls_back_to_default() {
        std::env::set_var("REDIS_PORT", "not-a-port");

        let cli = Cli::try_parse_from(["bgpq-proxy", "--memory-store", "list", "asns"]).unwrap();
        assert!(cli.backend.memory_store);
        assert_eq!(cli.backend.config().redis.port, DEFAULT_REDIS_PORT);

        let cli = Cli::try_parse_from(["bgpq-proxy", "list", "asns", "--redis-port", "6380"]).unwrap();
        assert_eq!(cli.backend.config().redis.port, 6380);

        std::env::remove_var("REDIS_PORT");
    }

    #[test]
    fn test_rejects_unknown_family() {
        assert!(Cli::try_parse_from(["bgpq-proxy", "asn", "AS1", "--family", "ipx"]).is_err());
    }
}
