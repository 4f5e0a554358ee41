//! In-memory response cache with background expiry
//!
//! Provides an `ExpiringCache` that maps string keys to immutable byte bodies.
//! Every entry remembers when it was inserted, and a background sweeper task
//! purges entries once they are older than the cache's TTL. Reads never look
//! at entry age; removal is the sweeper's job alone.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Shortest sweep period, used when the cache is built with a zero TTL
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// A single cached body
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The raw, undecoded body
    value: Bytes,
    /// When the entry was inserted (monotonic)
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now > self.created_at + ttl
    }
}

#[derive(Debug)]
struct Shared {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Shared {
    /// Removes every entry older than the TTL, returning how many were dropped
    fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - entries.len()
    }
}

/// Thread-safe key to bytes store with age-based expiry
///
/// Cloning is cheap and every clone shares the same entries. All map access
/// goes through a single exclusive lock that is held only for the duration of
/// the lookup, insert or sweep; it is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct ExpiringCache {
    shared: Arc<Shared>,
}

impl ExpiringCache {
    /// Creates a cache and starts its sweeper
    ///
    /// The sweeper wakes every `ttl` and removes entries older than `ttl`, so an
    /// entry is gone at most two sweep periods after insertion.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Returns
    /// The cache and the handle that owns the sweeper task. Dropping the handle
    /// stops the sweeper, so keep it alive for as long as expiry is wanted.
    pub fn new(ttl: Duration) -> (Self, SweeperHandle) {
        let cache = Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(HashMap::new()),
                ttl,
            }),
        };
        let handle = SweeperHandle::spawn(Arc::downgrade(&cache.shared), ttl.max(MIN_SWEEP_PERIOD));
        (cache, handle)
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Inserts or overwrites the entry for `key`, resetting its age
    pub fn put(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let entry = CacheEntry {
            value: value.into(),
            created_at: Instant::now(),
        };
        self.shared.entries.lock().insert(key.into(), entry);
    }

    /// Returns the stored body for `key`, if present
    ///
    /// Stale entries that the sweeper has not reached yet are still returned.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.shared
            .entries
            .lock()
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.lock().is_empty()
    }

    /// Runs one sweep cycle immediately
    #[cfg(test)]
    fn sweep_expired(&self) -> usize {
        self.shared.sweep(Instant::now())
    }
}

/// Handle owning the background sweeper of an `ExpiringCache`
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    fn spawn(shared: Weak<Shared>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first tick (immediate)
            interval.tick().await;
            trace!(?period, "cache sweeper started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // The last cache clone is gone; nothing left to sweep
                        let Some(shared) = shared.upgrade() else {
                            break;
                        };
                        let removed = shared.sweep(Instant::now());
                        if removed > 0 {
                            debug!(removed, "swept expired cache entries");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            trace!("cache sweeper stopped");
        });

        Self { shutdown_tx, task }
    }

    /// Whether the sweeper task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the sweeper and waits for it to exit
    ///
    /// Entries already in the cache stay readable; they simply stop expiring.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}
