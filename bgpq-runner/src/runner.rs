//! Process gateway to bgpq3/bgpq4.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use bgpq_core::constants::{DEFAULT_BGPQ_PATH, DEFAULT_RESOLVER_TIMEOUT_SECONDS, PREFIX_LIST_NAME};
use bgpq_core::error::{ProxyError, Result};
use bgpq_core::traits::PrefixResolver;
use bgpq_core::types::{AddressFamily, Depth, PrefixList};

/// Runner configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Path to the bgpq binary
    pub path: PathBuf,
    /// Maximum run time of one expansion, in seconds
    pub timeout_seconds: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_BGPQ_PATH),
            timeout_seconds: DEFAULT_RESOLVER_TIMEOUT_SECONDS,
        }
    }
}

impl RunnerConfig {
    /// Creates a config for the binary at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Sets the execution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs().max(1);
        self
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// An entry of bgpq's JSON output.
///
/// Depending on version and flags bgpq emits either bare strings or objects
/// carrying the prefix alongside match qualifiers.
#[derive(Deserialize)]
#[serde(untagged)]
enum PrefixEntry {
    Plain(String),
    Detailed { prefix: String },
}

impl From<PrefixEntry> for String {
    fn from(entry: PrefixEntry) -> Self {
        match entry {
            PrefixEntry::Plain(prefix) | PrefixEntry::Detailed { prefix } => prefix,
        }
    }
}

/// Runs bgpq once per call and parses its JSON output.
pub struct BgpqRunner {
    config: RunnerConfig,
    timeout: Duration,
}

impl BgpqRunner {
    /// Creates a runner with default configuration.
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Creates a runner with custom configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        let timeout = config.timeout();
        Self { config, timeout }
    }

    /// Overrides the execution timeout (sub-second values allowed).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds bgpq arguments for a JSON, aggregated prefix list.
    ///
    /// `-L <depth>` is only passed for a bounded depth; the identifier is
    /// always the last argument.
    pub fn command_args(identifier: &str, family: AddressFamily, depth: Depth) -> Vec<String> {
        let mut args: Vec<String> = vec![
            family.bgpq_flag().into(),
            "-A".into(),
            "-j".into(),
            "-l".into(),
            PREFIX_LIST_NAME.into(),
        ];

        if let Some(limit) = depth.limit() {
            args.push("-L".into());
            args.push(limit.to_string());
        }

        args.push(identifier.into());
        args
    }

    /// Parses bgpq stdout into a prefix list.
    pub fn parse_output(stdout: &[u8]) -> Result<PrefixList> {
        let mut document: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(stdout)
            .map_err(|e| ProxyError::resolver(format!("unparseable resolver output: {}", e)))?;

        let entries = document.remove(PREFIX_LIST_NAME).ok_or_else(|| {
            ProxyError::resolver(format!("resolver output has no '{}' field", PREFIX_LIST_NAME))
        })?;

        let entries: Vec<PrefixEntry> = serde_json::from_value(entries).map_err(|e| {
            ProxyError::resolver(format!("unexpected '{}' field in resolver output: {}", PREFIX_LIST_NAME, e))
        })?;

        Ok(entries.into_iter().map(String::from).collect())
    }

    fn failure(&self, status: std::process::ExitStatus, stderr: &[u8]) -> ProxyError {
        let path = self.config.path.display();
        let mut message = match status.code() {
            Some(code) => format!("{} exit code is {}", path, code),
            None => format!("{} terminated by signal", path),
        };

        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            None
        } else {
            message.push_str(&format!(", stderr: {}", stderr));
            Some(stderr)
        };

        ProxyError::ResolverFailure {
            exit_code: status.code(),
            stderr,
            message,
        }
    }
}

impl Default for BgpqRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrefixResolver for BgpqRunner {
    #[instrument(skip(self), fields(path = %self.config.path.display()))]
    async fn resolve(&self, identifier: &str, family: AddressFamily, depth: Depth) -> Result<PrefixList> {
        let args = Self::command_args(identifier, family, depth);
        debug!(?args, "Running bgpq");

        let child = Command::new(&self.config.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ProxyError::resolver(format!("failed to start {}: {}", self.config.path.display(), e))
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|e| {
                ProxyError::resolver(format!("failed to run {}: {}", self.config.path.display(), e))
            })?,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "bgpq timed out");
                return Err(ProxyError::resolver(format!(
                    "{} timed out after {:?}",
                    self.config.path.display(),
                    self.timeout
                )));
            }
        };

        if !output.status.success() {
            let err = self.failure(output.status, &output.stderr);
            warn!(error = %err, "bgpq failed");
            return Err(err);
        }

        let prefixes = Self::parse_output(&output.stdout)?;
        debug!(count = prefixes.len(), "bgpq expansion complete");
        Ok(prefixes)
    }
}
