//! High-Performance In-Memory Cache Module
//!
//! Thread-safe snapshot cache for the API server.
//! DashMap gives concurrent access without lock contention.
//!
//! Features:
//! - TTL-based expiration (60s default)
//! - Keyed by canonical address
//! - Rejected lookups are never stored
//! - Cache HIT/MISS counters

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::types::WalletSnapshot;
use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

/// Cache entry with creation time for TTL checks
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub snapshot: WalletSnapshot,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Seconds left before expiry
    pub fn remaining_ttl(&self) -> u64 {
        self.ttl.saturating_sub(self.created_at.elapsed()).as_secs()
    }
}

#[derive(Clone)]
pub struct SnapshotCache {
    /// canonical address -> entry
    store: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl SnapshotCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the snapshot on a live HIT; expired entries are evicted
    pub fn get(&self, address: &str) -> Option<WalletSnapshot> {
        if let Some(entry) = self.store.get(address) {
            if entry.is_expired() {
                drop(entry); // release read lock before remove
                self.store.remove(address);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS (expired): {}", address);
                None
            } else {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✅ CACHE HIT: {} (TTL: {}s remaining)", address, entry.remaining_ttl());
                Some(entry.snapshot.clone())
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", address);
            None
        }
    }

    /// Store a snapshot; rejected ones are skipped so the next request retries
    pub fn set(&self, snapshot: &WalletSnapshot) -> bool {
        if snapshot.is_rejected() || self.ttl.is_zero() {
            return false;
        }
        self.store.insert(
            snapshot.address.clone(),
            CacheEntry {
                snapshot: snapshot.clone(),
                created_at: Instant::now(),
                ttl: self.ttl,
            },
        );
        debug!("💾 CACHE SET: {} (TTL: {}s)", snapshot.address, self.ttl.as_secs());
        true
    }

    /// Drop every expired entry
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.store.len());
        if removed > 0 {
            debug!("🧹 CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate: if total > 0 {
                (hits as f64 / total as f64) * 100.0
            } else {
                0.0
            },
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}
