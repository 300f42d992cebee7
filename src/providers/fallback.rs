//! Fallback Fetcher - per-chain cascade over explorer endpoints
//!
//! Endpoints are tried in registry order. Any failure (transport, timeout,
//! HTTP status, bad JSON, RPC error object, missing field) is logged and the
//! next endpoint is tried. The first adapter that yields a balance wins.
//! When every endpoint fails the caller gets a `Rejected` outcome, never an
//! error.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::config::SentryConfig;
use crate::models::errors::AppResult;
use crate::models::types::{Chain, FetchedAccount, WalletSnapshot};
use crate::providers::http::HttpClient;
use crate::providers::registry::{Endpoint, ProviderRegistry, Shape};
use crate::providers::{bitcoin, evm, hedera, solana, tron, xrp};

/// Result of running one chain's cascade
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Found {
        account: FetchedAccount,
        /// Endpoint name that answered
        source: String,
    },
    Rejected {
        /// One "name: error" line per failed endpoint
        failures: Vec<String>,
    },
}

impl FetchOutcome {
    /// Unscored snapshot for this outcome
    pub fn into_snapshot(self, address: &str, chain: Chain) -> WalletSnapshot {
        match self {
            FetchOutcome::Found { account, source } => {
                WalletSnapshot::from_account(address, chain, account, source)
            }
            FetchOutcome::Rejected { failures } => {
                let detail = if failures.is_empty() {
                    "no endpoints configured".to_string()
                } else {
                    failures.join("; ")
                };
                WalletSnapshot::rejected(
                    address,
                    chain,
                    format!("❌ API rejected: all {} sources failed ({})", chain.name(), detail),
                )
            }
        }
    }
}

/// Runs cascades against a shared registry and HTTP client
#[derive(Clone)]
pub struct FallbackFetcher {
    http: HttpClient,
    registry: Arc<ProviderRegistry>,
}

impl FallbackFetcher {
    pub fn new(http: HttpClient, registry: ProviderRegistry) -> Self {
        Self {
            http,
            registry: Arc::new(registry),
        }
    }

    pub fn from_config(config: &SentryConfig) -> AppResult<Self> {
        Ok(Self::new(
            HttpClient::from_config(config)?,
            ProviderRegistry::from_config(config),
        ))
    }

    /// Try every endpoint for `chain` in order
    pub async fn fetch(&self, chain: Chain, address: &str) -> FetchOutcome {
        let endpoints = self.registry.endpoints(chain);
        let mut failures = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            debug!(chain = %chain, source = %endpoint.name, "🔍 Querying {}", endpoint.url);
            match self.run_adapter(endpoint, chain, address).await {
                Ok(account) => {
                    info!(
                        chain = %chain,
                        source = %endpoint.name,
                        partial = account.partial,
                        "✅ {} answered for {}",
                        endpoint.name,
                        address
                    );
                    return FetchOutcome::Found {
                        account,
                        source: endpoint.name.clone(),
                    };
                }
                Err(e) => {
                    warn!(
                        chain = %chain,
                        source = %endpoint.name,
                        shape = endpoint.shape.label(),
                        code = e.code_str(),
                        "⚠️ Provider failed: {}",
                        e
                    );
                    failures.push(format!("{}: {}", endpoint.name, e));
                }
            }
        }

        warn!(chain = %chain, "❌ All {} endpoints failed for {}", failures.len(), address);
        FetchOutcome::Rejected { failures }
    }

    /// Cascade straight to an (unscored) snapshot
    pub async fn fetch_snapshot(&self, chain: Chain, address: &str) -> WalletSnapshot {
        self.fetch(chain, address).await.into_snapshot(address, chain)
    }

    async fn run_adapter(&self, endpoint: &Endpoint, chain: Chain, address: &str) -> AppResult<FetchedAccount> {
        let http = &self.http;
        let url = endpoint.url.as_str();
        match &endpoint.shape {
            Shape::EvmJsonRpc => evm::fetch_rpc(http, url, chain, address).await,
            Shape::Etherscan { chain_id, api_key } => {
                evm::fetch_etherscan(http, url, *chain_id, api_key, chain, address).await
            }
            Shape::Esplora => bitcoin::fetch_esplora(http, url, address).await,
            Shape::BlockchainInfo => bitcoin::fetch_blockchain_info(http, url, address).await,
            Shape::BlockCypher => bitcoin::fetch_blockcypher(http, url, address).await,
            Shape::Blockchair => bitcoin::fetch_blockchair(http, url, address).await,
            Shape::Tronscan => tron::fetch_tronscan(http, url, address).await,
            Shape::TronGrid => tron::fetch_trongrid(http, url, address).await,
            Shape::Rippled => xrp::fetch_rippled(http, url, address).await,
            Shape::XrpScan => xrp::fetch_xrpscan(http, url, address).await,
            Shape::SolanaRpc => solana::fetch(http, url, address).await,
            Shape::HederaAccounts => hedera::fetch_account(http, url, address).await,
            Shape::HederaBalances => hedera::fetch_balances(http, url, address).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::LookupStatus;
    use rust_decimal::Decimal;

    #[test]
    fn test_rejected_outcome_lists_failures() {
        let outcome = FetchOutcome::Rejected {
            failures: vec![
                "tronscan: [UPSTREAM_TIMEOUT] Request timeout".to_string(),
                "trongrid: [UPSTREAM_BAD_STATUS] HTTP error: 503".to_string(),
            ],
        };
        let snapshot = outcome.into_snapshot("TJRabPrwbZy45sbavfcjinPJC18kjpRTv8", Chain::Tron);
        assert_eq!(snapshot.status, LookupStatus::Rejected);
        assert_eq!(snapshot.balance, Decimal::ZERO);
        assert!(snapshot.risk_reasons[0].contains("API rejected"));
        assert!(snapshot.risk_reasons[0].contains("UPSTREAM_TIMEOUT"));
    }

    #[test]
    fn test_found_outcome_carries_source() {
        let outcome = FetchOutcome::Found {
            account: FetchedAccount::new(Decimal::ONE).with_tx_count(4),
            source: "blockstream".to_string(),
        };
        let snapshot = outcome.into_snapshot("bc1qexample", Chain::Bitcoin);
        assert_eq!(snapshot.status, LookupStatus::Ok);
        assert_eq!(snapshot.source.as_deref(), Some("blockstream"));
        assert_eq!(snapshot.tx_count, 4);
    }

    #[tokio::test]
    async fn test_no_endpoints_is_rejected() {
        let fetcher = FallbackFetcher::new(
            HttpClient::new(std::time::Duration::from_secs(1), 1).unwrap(),
            ProviderRegistry::default(),
        );
        let snapshot = fetcher.fetch_snapshot(Chain::Hedera, "0.0.1").await;
        assert_eq!(snapshot.status, LookupStatus::Rejected);
        assert!(snapshot.risk_reasons[0].contains("no endpoints configured"));
    }
}
