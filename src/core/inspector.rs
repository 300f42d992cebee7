//! Wallet Inspector - classify, fetch, score
//!
//! `inspect` never fails: bad input becomes an `invalid_format` snapshot and
//! exhausted cascades become `rejected` snapshots.
//!
//! EVM addresses are valid on Ethereum, Base and BSC alike. All three
//! cascades run concurrently and the network with the most activity wins,
//! with ties going to the fixed priority Ethereum > Base > BSC.

use futures_util::future::join_all;
use std::time::Instant;
use tracing::info;

use crate::core::classifier::classify;
use crate::core::risk_score::score_wallet;
use crate::models::config::SentryConfig;
use crate::models::errors::AppResult;
use crate::models::types::{ChainFamily, LookupStatus, WalletSnapshot};
use crate::providers::fallback::FallbackFetcher;
use crate::utils::constants::EVM_PRIORITY;

#[derive(Clone)]
pub struct WalletInspector {
    fetcher: FallbackFetcher,
}

impl WalletInspector {
    pub fn new(fetcher: FallbackFetcher) -> Self {
        Self { fetcher }
    }

    pub fn from_config(config: &SentryConfig) -> AppResult<Self> {
        Ok(Self::new(FallbackFetcher::from_config(config)?))
    }

    /// Full lookup for one raw address
    pub async fn inspect(&self, raw: &str) -> WalletSnapshot {
        let start = Instant::now();
        let classification = classify(raw);
        let address = classification.canonical.as_str();

        let mut snapshot = match classification.family {
            ChainFamily::Unknown => WalletSnapshot::invalid_format(address),
            ChainFamily::Evm => {
                let lookups = EVM_PRIORITY
                    .iter()
                    .map(|chain| self.fetcher.fetch_snapshot(*chain, address));
                pick_evm_network(join_all(lookups).await)
            }
            family => match family.chains().first() {
                Some(chain) => self.fetcher.fetch_snapshot(*chain, address).await,
                None => WalletSnapshot::invalid_format(address),
            },
        };

        apply_score(&mut snapshot);

        info!(
            family = classification.family.as_str(),
            chain = %snapshot.chain_name,
            status = snapshot.status.as_str(),
            score = snapshot.risk_score,
            "{} Inspected {} in {}ms",
            snapshot.risk_level.emoji(),
            address,
            start.elapsed().as_millis()
        );
        snapshot
    }
}

/// Score the snapshot's data and append the rule reasons
pub fn apply_score(snapshot: &mut WalletSnapshot) {
    let score = score_wallet(snapshot.balance, snapshot.tx_count, snapshot.wallet_age_days);
    snapshot.risk_score = score.total;
    snapshot.risk_level = score.level;
    snapshot.risk_reasons.extend(score.reasons);
}

/// Choose among per-network snapshots given in `EVM_PRIORITY` order.
///
/// Active networks (non-zero balance or transactions) are ranked by
/// `(tx_count, balance)`; an earlier network keeps the spot on a tie. With
/// no active network the first answered one wins, and when every network
/// was rejected the first (Ethereum) rejection is returned.
pub fn pick_evm_network(mut snapshots: Vec<WalletSnapshot>) -> WalletSnapshot {
    if snapshots.is_empty() {
        return WalletSnapshot::invalid_format("");
    }
    let answered = |s: &WalletSnapshot| s.status != LookupStatus::Rejected;

    let mut best: Option<usize> = None;
    for (i, candidate) in snapshots.iter().enumerate() {
        if !answered(candidate) || !candidate.has_activity() {
            continue;
        }
        let better = match best {
            None => true,
            Some(j) => {
                let current = &snapshots[j];
                (candidate.tx_count, candidate.balance) > (current.tx_count, current.balance)
            }
        };
        if better {
            best = Some(i);
        }
    }

    let chosen = best
        .or_else(|| snapshots.iter().position(answered))
        .unwrap_or(0);

    let also_active: Vec<_> = snapshots
        .iter()
        .enumerate()
        .filter(|(i, s)| *i != chosen && answered(*s) && s.has_activity())
        .filter_map(|(_, s)| s.chain)
        .collect();

    let mut picked = snapshots.swap_remove(chosen);
    if !also_active.is_empty() {
        let names: Vec<&str> = also_active.iter().map(|c| c.name()).collect();
        picked
            .risk_reasons
            .push(format!("Also active on {}", names.join(", ")));
        picked.also_active_on = also_active;
    }
    picked
}
