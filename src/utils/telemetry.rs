//! Lookup Telemetry
//!
//! In-memory counters for `/v1/stats`. Privacy-first: counts only, no
//! addresses are retained.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::models::types::{LookupStatus, WalletSnapshot};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LookupStatsSnapshot {
    pub total_lookups: u64,
    pub ok: u64,
    pub partial: u64,
    pub rejected: u64,
    pub invalid_format: u64,
    /// Lookups per attributed chain name
    pub by_chain: BTreeMap<String, u64>,
    pub cache_hits: u64,
    pub avg_latency_ms: f64,
    pub uptime_secs: u64,
}

/// Thread-safe collector, cheap to clone
#[derive(Clone)]
pub struct LookupStats {
    inner: Arc<Counters>,
}

struct Counters {
    total: AtomicU64,
    ok: AtomicU64,
    partial: AtomicU64,
    rejected: AtomicU64,
    invalid_format: AtomicU64,
    cache_hits: AtomicU64,
    total_latency_ms: AtomicU64,
    by_chain: DashMap<String, u64>,
    started: Instant,
}

impl Default for LookupStats {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Counters {
                total: AtomicU64::new(0),
                ok: AtomicU64::new(0),
                partial: AtomicU64::new(0),
                rejected: AtomicU64::new(0),
                invalid_format: AtomicU64::new(0),
                cache_hits: AtomicU64::new(0),
                total_latency_ms: AtomicU64::new(0),
                by_chain: DashMap::new(),
                started: Instant::now(),
            }),
        }
    }

    /// Record a finished lookup
    pub fn record(&self, snapshot: &WalletSnapshot, latency_ms: u64, from_cache: bool) {
        let c = &self.inner;
        c.total.fetch_add(1, Ordering::Relaxed);
        c.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        if from_cache {
            c.cache_hits.fetch_add(1, Ordering::Relaxed);
        }

        let counter = match snapshot.status {
            LookupStatus::Ok => &c.ok,
            LookupStatus::Partial => &c.partial,
            LookupStatus::Rejected => &c.rejected,
            LookupStatus::InvalidFormat => &c.invalid_format,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if snapshot.chain.is_some() {
            *c.by_chain.entry(snapshot.chain_name.clone()).or_insert(0) += 1;
        }
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> LookupStatsSnapshot {
        let c = &self.inner;
        let total = c.total.load(Ordering::Relaxed);
        let latency = c.total_latency_ms.load(Ordering::Relaxed);

        LookupStatsSnapshot {
            total_lookups: total,
            ok: c.ok.load(Ordering::Relaxed),
            partial: c.partial.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            invalid_format: c.invalid_format.load(Ordering::Relaxed),
            by_chain: c
                .by_chain
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
            cache_hits: c.cache_hits.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                latency as f64 / total as f64
            } else {
                0.0
            },
            uptime_secs: c.started.elapsed().as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Chain, FetchedAccount};
    use rust_decimal::Decimal;

    #[test]
    fn test_counts_by_status_and_chain() {
        let stats = LookupStats::new();
        let ok = WalletSnapshot::from_account("bc1qexample", Chain::Bitcoin, FetchedAccount::new(Decimal::ONE), "mempool");
        let rejected = WalletSnapshot::rejected("TExample", Chain::Tron, "❌ API rejected");
        let invalid = WalletSnapshot::invalid_format("???");

        stats.record(&ok, 100, false);
        stats.record(&ok, 0, true);
        stats.record(&rejected, 200, false);
        stats.record(&invalid, 0, false);

        let snap = stats.snapshot();
        assert_eq!(snap.total_lookups, 4);
        assert_eq!(snap.ok, 2);
        assert_eq!(snap.rejected, 1);
        assert_eq!(snap.invalid_format, 1);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.by_chain.get("Bitcoin"), Some(&2));
        assert_eq!(snap.by_chain.get("TRON"), Some(&1));
        assert!((snap.avg_latency_ms - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats() {
        let snap = LookupStats::new().snapshot();
        assert_eq!(snap.total_lookups, 0);
        assert_eq!(snap.avg_latency_ms, 0.0);
    }
}
