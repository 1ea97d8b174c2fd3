//! Redis-backed key-value store.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use redis::aio::{ConnectionLike, ConnectionManager};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use bgpq_core::constants::{
    DEFAULT_REDIS_DB, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT, DEFAULT_SCAN_COUNT, MIN_CACHE_TTL_SECONDS,
};
use bgpq_core::error::{ProxyError, Result};
use bgpq_core::traits::{KeyTtl, KeyValueStore};

/// Redis connection configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Logical database index
    pub db: i64,
    /// `COUNT` hint for each `SCAN` page
    pub scan_count: usize,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.into(),
            port: DEFAULT_REDIS_PORT,
            db: DEFAULT_REDIS_DB,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }
}

impl RedisConfig {
    /// Creates a config for `host:port`, database 0.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Selects the logical database.
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Connection URL for this config.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

fn store_error(err: redis::RedisError) -> ProxyError {
    ProxyError::Store(err.to_string())
}

/// Redis store.
///
/// Generic over the connection; production uses a multiplexed,
/// auto-reconnecting [`ConnectionManager`], so cloning the store is cheap and
/// shares the connection.
#[derive(Clone)]
pub struct RedisStore<C = ConnectionManager> {
    conn: C,
    scan_count: usize,
}

impl RedisStore {
    /// Connects to the configured server.
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.db))]
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url())
            .map_err(|e| ProxyError::Config(format!("invalid Redis URL: {}", e)))?;
        let conn = ConnectionManager::new(client).await.map_err(store_error)?;

        info!("Connected to Redis");
        Ok(Self::with_connection(conn, config.scan_count))
    }
}

impl<C> RedisStore<C> {
    /// Wraps an established connection.
    pub fn with_connection(conn: C, scan_count: usize) -> Self {
        Self {
            conn,
            scan_count: scan_count.max(1),
        }
    }
}

#[async_trait]
impl<C> KeyValueStore for RedisStore<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_error)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(MIN_CACHE_TTL_SECONDS))
            .query_async(&mut conn)
            .await
            .map_err(store_error)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        debug!(key, removed, "Deleted key");
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut conn = self.conn.clone();
        let seconds: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(KeyTtl::from_seconds(seconds))
    }

    fn scan(&self, pattern: &str) -> BoxStream<'static, Result<String>> {
        let state = ScanState {
            conn: self.conn.clone(),
            pattern: pattern.to_string(),
            count: self.scan_count,
            cursor: Some(0),
            buffered: VecDeque::new(),
        };

        stream::try_unfold(state, next_scanned_key).boxed()
    }
}

/// Cursor state of one lazy `SCAN` iteration.
struct ScanState<C> {
    conn: C,
    pattern: String,
    count: usize,
    cursor: Option<u64>,
    buffered: VecDeque<String>,
}

/// Yields the next buffered key, fetching one `SCAN` page per refill.
///
/// Empty pages do not end the iteration; only a reply cursor of 0 does.
async fn next_scanned_key<C>(mut state: ScanState<C>) -> Result<Option<(String, ScanState<C>)>>
where
    C: ConnectionLike + Send,
{
    loop {
        if let Some(key) = state.buffered.pop_front() {
            return Ok(Some((key, state)));
        }
        let Some(cursor) = state.cursor else {
            return Ok(None);
        };

        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(&state.pattern)
            .arg("COUNT")
            .arg(state.count)
            .query_async(&mut state.conn)
            .await
            .map_err(store_error)?;

        state.buffered.extend(keys);
        state.cursor = (next != 0).then_some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use futures::{future, FutureExt, TryStreamExt};
    use parking_lot::Mutex;
    use redis::{Cmd, ErrorKind, Pipeline, RedisError, RedisFuture, Value};

    /// Connection replaying canned replies and recording every command sent.
    #[derive(Clone, Default)]
    struct ScriptedConnection {
        replies: Arc<Mutex<VecDeque<Value>>>,
        sent: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl ScriptedConnection {
        fn replying(replies: Vec<Value>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<Vec<String>> {
            self.sent.lock().clone()
        }
    }

    impl ConnectionLike for ScriptedConnection {
        fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
            self.sent.lock().push(decode_command(&cmd.get_packed_command()));
            let reply = self
                .replies
                .lock()
                .pop_front()
                .ok_or_else(|| RedisError::from((ErrorKind::IoError, "connection closed")));
            future::ready(reply).boxed()
        }

        fn req_packed_commands<'a>(
            &'a mut self,
            _cmd: &'a Pipeline,
            _offset: usize,
            _count: usize,
        ) -> RedisFuture<'a, Vec<Value>> {
            future::ready(Err(RedisError::from((ErrorKind::IoError, "pipelines not scripted")))).boxed()
        }

        fn get_db(&self) -> i64 {
            0
        }
    }

    /// Splits a RESP-encoded command into its arguments.
    fn decode_command(packed: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(packed);
        let mut lines = text.split("\r\n");
        let count: usize = lines.next().unwrap()[1..].parse().unwrap();
        (0..count)
            .map(|_| {
                lines.next();
                lines.next().unwrap().to_string()
            })
            .collect()
    }

    fn bulk(text: &str) -> Value {
        Value::BulkString(text.as_bytes().to_vec())
    }

    fn scan_page(cursor: &str, keys: &[&str]) -> Value {
        Value::Array(vec![bulk(cursor), Value::Array(keys.iter().map(|k| bulk(k)).collect())])
    }

    fn scan_command(cursor: &str, pattern: &str) -> Vec<String> {
        ["SCAN", cursor, "MATCH", pattern, "COUNT", "10"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn store(conn: &ScriptedConnection) -> RedisStore<ScriptedConnection> {
        RedisStore::with_connection(conn.clone(), DEFAULT_SCAN_COUNT)
    }

    #[tokio::test]
    async fn test_get_maps_nil_to_none() {
        let conn = ScriptedConnection::replying(vec![bulk(r#"["192.0.2.0/24"]"#), Value::Nil]);
        let store = store(&conn);

        assert_eq!(
            store.get("asn:AS1:ipv4").await.unwrap(),
            Some(br#"["192.0.2.0/24"]"#.to_vec())
        );
        assert_eq!(store.get("missing").await.unwrap(), None);
        assert_eq!(conn.sent(), vec![vec!["GET", "asn:AS1:ipv4"], vec!["GET", "missing"]]);
    }

    #[tokio::test]
    async fn test_set_uses_expiry_in_seconds() {
        let conn = ScriptedConnection::replying(vec![Value::Okay, Value::Okay]);
        let store = store(&conn);

        store.set("k", b"[]".to_vec(), Duration::from_secs(86_400)).await.unwrap();
        store.set("k", b"[]".to_vec(), Duration::ZERO).await.unwrap();

        assert_eq!(
            conn.sent(),
            vec![vec!["SET", "k", "[]", "EX", "86400"], vec!["SET", "k", "[]", "EX", "1"]]
        );
    }

    #[tokio::test]
    async fn test_delete_and_ttl() {
        let conn = ScriptedConnection::replying(vec![
            Value::Int(0),
            Value::Int(-2),
            Value::Int(-1),
            Value::Int(30),
        ]);
        let store = store(&conn);

        store.delete("k").await.unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), KeyTtl::Absent);
        assert_eq!(store.ttl("k").await.unwrap(), KeyTtl::Persistent);
        assert_eq!(store.ttl("k").await.unwrap(), KeyTtl::Expires(Duration::from_secs(30)));

        let sent = conn.sent();
        assert_eq!(sent[0], vec!["DEL", "k"]);
        assert_eq!(sent[1], vec!["TTL", "k"]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_store_error() {
        let conn = ScriptedConnection::replying(Vec::new());
        let err = store(&conn).get("k").await.unwrap_err();

        assert!(matches!(err, ProxyError::Store(_)));
    }

    #[tokio::test]
    async fn test_scan_continues_past_empty_pages() {
        let conn = ScriptedConnection::replying(vec![
            scan_page("7", &[]),
            scan_page("3", &["asn:AS1:ipv4"]),
            scan_page("0", &["asn:AS2:ipv6"]),
        ]);

        let keys: Vec<String> = store(&conn).scan("asn:*").try_collect().await.unwrap();

        assert_eq!(keys, vec!["asn:AS1:ipv4", "asn:AS2:ipv6"]);
        assert_eq!(
            conn.sent(),
            vec![
                scan_command("0", "asn:*"),
                scan_command("7", "asn:*"),
                scan_command("3", "asn:*"),
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_stops_at_zero_cursor() {
        let conn = ScriptedConnection::replying(vec![scan_page("0", &["as_set:AS-FOO:ipv4"])]);
        let keys: Vec<String> = store(&conn).scan("as_set:*").try_collect().await.unwrap();

        assert_eq!(keys, vec!["as_set:AS-FOO:ipv4"]);
        assert_eq!(conn.sent().len(), 1);

        let conn = ScriptedConnection::replying(vec![scan_page("0", &[])]);
        let keys: Vec<String> = store(&conn).scan("asn:*").try_collect().await.unwrap();

        assert!(keys.is_empty());
        assert_eq!(conn.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_is_lazy() {
        let conn = ScriptedConnection::replying(vec![scan_page("5", &["asn:AS1:ipv4"]), scan_page("0", &[])]);
        let mut keys = store(&conn).scan("asn:*");

        assert!(conn.sent().is_empty());
        assert_eq!(keys.try_next().await.unwrap().as_deref(), Some("asn:AS1:ipv4"));
        assert_eq!(conn.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_failure_is_yielded() {
        let conn = ScriptedConnection::replying(vec![scan_page("9", &["asn:AS1:ipv4"])]);
        let mut keys = store(&conn).scan("asn:*");

        assert!(keys.try_next().await.unwrap().is_some());
        assert!(matches!(keys.try_next().await, Err(ProxyError::Store(_))));
    }

    #[test]
    fn test_config_url() {
        let config = RedisConfig::new("cache.internal", 6380).with_db(3);
        assert_eq!(config.url(), "redis://cache.internal:6380/3");
    }

    #[test]
    fn test_config_default() {
        let config = RedisConfig::default();
        assert_eq!(config.url(), "redis://localhost:6379/0");
        assert_eq!(config.scan_count, DEFAULT_SCAN_COUNT);
    }
}
