//! In-process store server.
//!
//! [`MemoryServer`] stands in for a cluster: it holds records, honours TTLs,
//! and hands out [`MemoryClient`] connections through [`Connector`]. All
//! clones and all clients share the same records, so data written by one
//! connection is visible to the next, the way a reconnecting test suite sees
//! a real server.
//!
//! # Fault injection
//!
//! Tests can take the server offline or make the next N calls of a kind
//! fail with a transient error:
//!
//! ```
//! use aerofix_client::{Connector, ClientOptions, Key, MemoryServer, RetryPolicy, StoreClient};
//!
//! let server = MemoryServer::new();
//! let client = server.connect("127.0.0.1", 3000, &ClientOptions::default()).unwrap();
//! let key = Key::new("test", "cache", "k");
//! client.put(&key, &"v".into(), Default::default()).unwrap();
//!
//! server.fail_next_deletes(1);
//! // RetryPolicy::ONCE absorbs a single transient failure
//! client.delete(&key, &RetryPolicy::ONCE).unwrap();
//! assert!(!server.contains(&key));
//! ```
//!
//! # Limitations
//!
//! - Expired records are purged lazily, when they are next touched
//! - The namespace default TTL is "never expire" unless set with
//!   [`with_default_ttl`](MemoryServer::with_default_ttl)

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use aerofix_core::{ClientError, ClientResult, Key, RetryPolicy, Ttl, Value, VALUE_BIN};
use parking_lot::Mutex;
use tracing::debug;

use crate::traits::{ClientOptions, Connector, Deleted, StoreClient};

#[derive(Debug, Clone)]
struct Record {
    bins: BTreeMap<String, Value>,
    expires_at: Option<Instant>,
}

impl Record {
    fn new(value: Value, expires_at: Option<Instant>) -> Self {
        let mut bins = BTreeMap::new();
        bins.insert(VALUE_BIN.to_string(), value);
        Self { bins, expires_at }
    }

    fn value(&self) -> Value {
        self.bins.get(VALUE_BIN).cloned().unwrap_or(Value::Nil)
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Default)]
struct Faults {
    puts: u32,
    gets: u32,
    deletes: u32,
    exists: u32,
}

fn take_fault(counter: &mut u32) -> bool {
    if *counter > 0 {
        *counter -= 1;
        true
    } else {
        false
    }
}

#[derive(Debug)]
struct ServerState {
    records: HashMap<Key, Record>,
    online: bool,
    default_ttl: Option<Duration>,
    faults: Faults,
    connections_opened: u64,
    delete_attempts: u64,
    last_options: Option<ClientOptions>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            online: true,
            default_ttl: None,
            faults: Faults::default(),
            connections_opened: 0,
            delete_attempts: 0,
            last_options: None,
        }
    }

    fn live_record(&mut self, key: &Key) -> Option<&Record> {
        let now = Instant::now();
        if self.records.get(key).is_some_and(|r| r.is_expired(now)) {
            self.records.remove(key);
        }
        self.records.get(key)
    }

    fn expiry_for(&self, ttl: Ttl) -> Option<Instant> {
        match ttl {
            Ttl::NamespaceDefault => self.default_ttl.map(|d| Instant::now() + d),
            Ttl::Never => None,
            Ttl::Seconds(s) => Some(Instant::now() + Duration::from_secs(u64::from(s.get()))),
        }
    }
}

/// In-process server shared by every client it hands out.
///
/// Cheap to clone; all clones share the same records.
#[derive(Debug, Clone)]
pub struct MemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    /// Create an empty, online server.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState::new())),
        }
    }

    /// Set the namespace default TTL applied to `Ttl::NamespaceDefault` writes.
    pub fn with_default_ttl(self, ttl: Duration) -> Self {
        self.state.lock().default_ttl = Some(ttl);
        self
    }

    /// Refuse new connections and fail calls on open ones.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().online = !offline;
    }

    /// Fail the next `n` puts with a transient error.
    pub fn fail_next_puts(&self, n: u32) {
        self.state.lock().faults.puts = n;
    }

    /// Fail the next `n` gets with a transient error.
    pub fn fail_next_gets(&self, n: u32) {
        self.state.lock().faults.gets = n;
    }

    /// Fail the next `n` delete attempts with a transient error.
    pub fn fail_next_deletes(&self, n: u32) {
        self.state.lock().faults.deletes = n;
    }

    /// Fail the next `n` existence checks with a transient error.
    pub fn fail_next_exists(&self, n: u32) {
        self.state.lock().faults.exists = n;
    }

    /// Write a record directly, bypassing any client.
    pub fn insert(&self, key: Key, value: Value) {
        self.state.lock().records.insert(key, Record::new(value, None));
    }

    /// Remove a record directly, bypassing any client.
    pub fn remove(&self, key: &Key) -> Option<Value> {
        self.state.lock().records.remove(key).map(|r| r.value())
    }

    /// Whether a live record exists for `key`.
    pub fn contains(&self, key: &Key) -> bool {
        self.state.lock().live_record(key).is_some()
    }

    /// Current value of a live record.
    pub fn value_of(&self, key: &Key) -> Option<Value> {
        self.state.lock().live_record(key).map(Record::value)
    }

    /// Number of stored records, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful connects so far.
    pub fn connections_opened(&self) -> u64 {
        self.state.lock().connections_opened
    }

    /// Number of delete attempts, retries included.
    pub fn delete_attempts(&self) -> u64 {
        self.state.lock().delete_attempts
    }

    /// Options passed on the most recent connect.
    pub fn last_options(&self) -> Option<ClientOptions> {
        self.state.lock().last_options.clone()
    }
}

impl Connector for MemoryServer {
    type Client = MemoryClient;

    fn connect(
        &self,
        host: &str,
        port: u16,
        options: &ClientOptions,
    ) -> ClientResult<MemoryClient> {
        let address = format!("{}:{}", host, port);
        let mut state = self.state.lock();
        if !state.online {
            return Err(ClientError::Unreachable { address });
        }
        state.connections_opened += 1;
        state.last_options = Some(options.clone());
        debug!(%address, persistent = options.persistent, "memory server accepted connection");
        Ok(MemoryClient {
            state: Arc::clone(&self.state),
            address,
            connected: true,
        })
    }
}

/// Connection to a [`MemoryServer`].
#[derive(Debug)]
pub struct MemoryClient {
    state: Arc<Mutex<ServerState>>,
    address: String,
    connected: bool,
}

impl MemoryClient {
    /// Address this client dialed.
    pub fn address(&self) -> &str {
        &self.address
    }

    fn check_online(&self, state: &ServerState) -> ClientResult<()> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        if !state.online {
            return Err(ClientError::transient(format!(
                "connection to {} reset",
                self.address
            )));
        }
        Ok(())
    }

    fn delete_once(&self, key: &Key) -> ClientResult<Deleted> {
        let mut state = self.state.lock();
        self.check_online(&state)?;
        state.delete_attempts += 1;
        if take_fault(&mut state.faults.deletes) {
            return Err(ClientError::transient("delete timed out"));
        }
        let now = Instant::now();
        match state.records.remove(key) {
            Some(record) if !record.is_expired(now) => Ok(Deleted::Removed),
            _ => Ok(Deleted::NotFound),
        }
    }
}

impl StoreClient for MemoryClient {
    fn get(&self, key: &Key) -> ClientResult<Option<Value>> {
        let mut state = self.state.lock();
        self.check_online(&state)?;
        if take_fault(&mut state.faults.gets) {
            return Err(ClientError::transient("read timed out"));
        }
        Ok(state.live_record(key).map(Record::value))
    }

    fn put(&self, key: &Key, value: &Value, ttl: Ttl) -> ClientResult<()> {
        let mut state = self.state.lock();
        self.check_online(&state)?;
        if take_fault(&mut state.faults.puts) {
            return Err(ClientError::transient("write timed out"));
        }
        let expires_at = state.expiry_for(ttl);
        state
            .records
            .insert(key.clone(), Record::new(value.clone(), expires_at));
        Ok(())
    }

    fn delete(&self, key: &Key, policy: &RetryPolicy) -> ClientResult<Deleted> {
        policy.run("delete", || self.delete_once(key))
    }

    fn exists(&self, key: &Key) -> ClientResult<bool> {
        let mut state = self.state.lock();
        self.check_online(&state)?;
        if take_fault(&mut state.faults.exists) {
            return Err(ClientError::transient("exists timed out"));
        }
        Ok(state.live_record(key).is_some())
    }

    fn disconnect(&mut self) {
        if self.connected {
            debug!(address = %self.address, "memory client disconnected");
        }
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
