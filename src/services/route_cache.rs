//! In-memory TTL cache for optimized routes
//!
//! Entries expire lazily on read (an expired entry is reported as absent but
//! left in place) and are physically removed by a periodic sweeper task.
//! The sweeper has an explicit lifecycle: [`RouteCache::start`] spawns it,
//! [`RouteCache::stop`] cancels it, and dropping the cache cancels it too.
//!
//! Time is taken from `tokio::time::Instant` so tests can run against a
//! paused clock.
//!
//! Cache is process-local and resets on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::types::OptimizedRoute;

/// Default entry time-to-live (5 minutes)
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Default interval between sweeps (1 minute)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Longest accepted interval between sweeps (1 day)
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// Cache timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCacheConfig {
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    route: OptimizedRoute,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

type Entries = Arc<RwLock<HashMap<String, CacheEntry>>>;

struct Sweeper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Route cache keyed by request fingerprint
pub struct RouteCache {
    entries: Entries,
    config: RouteCacheConfig,
    sweeper: Mutex<Option<Sweeper>>,
}

impl RouteCache {
    pub fn new(config: RouteCacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
            sweeper: Mutex::new(None),
        }
    }

    pub fn config(&self) -> RouteCacheConfig {
        self.config
    }

    /// Look up a route. Expired entries read as absent.
    pub fn get(&self, key: &str) -> Option<OptimizedRoute> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now(), self.config.ttl) {
            return None;
        }
        Some(entry.route.clone())
    }

    /// Store a route, replacing any previous entry for the key
    pub fn put(&self, key: String, route: OptimizedRoute) {
        let entry = CacheEntry {
            route,
            created_at: Instant::now(),
        };
        self.entries.write().insert(key, entry);
    }

    /// Remove expired entries now. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        sweep(&self.entries, self.config.ttl)
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Spawn the periodic sweeper. Calling it while a sweeper runs is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() {
            debug!("Route cache sweeper already running");
            return;
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_sweeper(
            Arc::clone(&self.entries),
            self.config,
            token.clone(),
        ));

        info!(
            "Route cache sweeper started (ttl={}s, interval={}s)",
            self.config.ttl.as_secs(),
            self.config.sweep_interval.as_secs()
        );
        *sweeper = Some(Sweeper { token, handle });
    }

    /// Stop the sweeper and wait for it to finish
    pub async fn stop(&self) {
        let sweeper = self.sweeper.lock().take();
        if let Some(Sweeper { token, handle }) = sweeper {
            token.cancel();
            if let Err(e) = handle.await {
                warn!("Route cache sweeper ended abnormally: {}", e);
            }
            info!("Route cache sweeper stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.sweeper.lock().is_some()
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new(RouteCacheConfig::default())
    }
}

impl Drop for RouteCache {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.get_mut().take() {
            sweeper.token.cancel();
        }
    }
}

fn sweep(entries: &Entries, ttl: Duration) -> usize {
    let now = Instant::now();
    let mut entries = entries.write();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now, ttl));
    before - entries.len()
}

async fn run_sweeper(entries: Entries, config: RouteCacheConfig, token: CancellationToken) {
    let Some(first_tick) = Instant::now().checked_add(config.sweep_interval) else {
        warn!(
            "Route cache sweep interval {}s is out of range, sweeper not running",
            config.sweep_interval.as_secs()
        );
        return;
    };
    let mut ticker = tokio::time::interval_at(first_tick, config.sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let removed = sweep(&entries, config.ttl);
                if removed > 0 {
                    debug!("Route cache sweep removed {} expired entries", removed);
                }
            }
        }
    }
}
