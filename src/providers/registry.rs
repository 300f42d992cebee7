//! Provider Registry - ordered explorer endpoints per chain
//!
//! Built from `SentryConfig` and the endpoint tables in utils/constants.rs.
//! Order matters: the fallback cascade tries endpoints front to back.

use std::collections::HashMap;
use std::fmt;

use crate::models::config::SentryConfig;
use crate::models::types::Chain;
use crate::utils::constants::{
    get_evm_chain_id, BASE_RPCS, BITCOIN_ESPLORA, BLOCKCHAIN_INFO_URL, BLOCKCHAIR_URL,
    BLOCKCYPHER_URL, BSC_RPCS, ETHEREUM_RPCS, ETHERSCAN_V2_URL, HEDERA_MIRROR_URL, RIPPLED_NODES,
    SOLANA_RPCS, TRONGRID_URL, TRONSCAN_URL, XRPSCAN_URL,
};

/// Response shape an endpoint speaks; selects the adapter
#[derive(Clone, PartialEq, Eq)]
pub enum Shape {
    EvmJsonRpc,
    Etherscan { chain_id: u64, api_key: String },
    Esplora,
    BlockchainInfo,
    BlockCypher,
    Blockchair,
    Tronscan,
    TronGrid,
    Rippled,
    XrpScan,
    SolanaRpc,
    HederaAccounts,
    HederaBalances,
}

impl Shape {
    pub fn label(&self) -> &'static str {
        match self {
            Shape::EvmJsonRpc => "evm-rpc",
            Shape::Etherscan { .. } => "etherscan",
            Shape::Esplora => "esplora",
            Shape::BlockchainInfo => "blockchain.info",
            Shape::BlockCypher => "blockcypher",
            Shape::Blockchair => "blockchair",
            Shape::Tronscan => "tronscan",
            Shape::TronGrid => "trongrid",
            Shape::Rippled => "rippled",
            Shape::XrpScan => "xrpscan",
            Shape::SolanaRpc => "solana-rpc",
            Shape::HederaAccounts => "mirror-accounts",
            Shape::HederaBalances => "mirror-balances",
        }
    }
}

// API keys stay out of logs
impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Etherscan { chain_id, .. } => write!(f, "Etherscan {{ chain_id: {} }}", chain_id),
            other => f.write_str(other.label()),
        }
    }
}

/// One explorer endpoint in a cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Short provider name reported as the snapshot `source`
    pub name: String,
    pub url: String,
    pub shape: Shape,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            shape,
        }
    }
}

/// Ordered endpoint lists keyed by chain
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    endpoints: HashMap<Chain, Vec<Endpoint>>,
}

impl ProviderRegistry {
    /// Default public explorers; Etherscan v2 leads the EVM lists when a key is set
    pub fn from_config(config: &SentryConfig) -> Self {
        let mut registry = Self::default();

        for chain in Chain::ALL {
            let mut list = Vec::new();

            if let (Some(key), Some(chain_id)) = (&config.etherscan_api_key, get_evm_chain_id(chain)) {
                list.push(Endpoint::new(
                    "etherscan",
                    ETHERSCAN_V2_URL,
                    Shape::Etherscan {
                        chain_id,
                        api_key: key.clone(),
                    },
                ));
            }

            let table = |rows: &[(&str, &str)], shape: Shape| -> Vec<Endpoint> {
                rows.iter()
                    .map(|(name, url)| Endpoint::new(*name, *url, shape.clone()))
                    .collect()
            };

            match chain {
                Chain::Ethereum => list.extend(table(ETHEREUM_RPCS, Shape::EvmJsonRpc)),
                Chain::Base => list.extend(table(BASE_RPCS, Shape::EvmJsonRpc)),
                Chain::Bsc => list.extend(table(BSC_RPCS, Shape::EvmJsonRpc)),
                Chain::Bitcoin => {
                    list.extend(table(BITCOIN_ESPLORA, Shape::Esplora));
                    list.push(Endpoint::new("blockchain.info", BLOCKCHAIN_INFO_URL, Shape::BlockchainInfo));
                    list.push(Endpoint::new("blockcypher", BLOCKCYPHER_URL, Shape::BlockCypher));
                    list.push(Endpoint::new("blockchair", BLOCKCHAIR_URL, Shape::Blockchair));
                }
                Chain::Tron => {
                    list.push(Endpoint::new("tronscan", TRONSCAN_URL, Shape::Tronscan));
                    list.push(Endpoint::new("trongrid", TRONGRID_URL, Shape::TronGrid));
                }
                Chain::Xrp => {
                    list.extend(table(RIPPLED_NODES, Shape::Rippled));
                    list.push(Endpoint::new("xrpscan", XRPSCAN_URL, Shape::XrpScan));
                }
                Chain::Solana => list.extend(table(SOLANA_RPCS, Shape::SolanaRpc)),
                Chain::Hedera => {
                    list.push(Endpoint::new("mirror-accounts", HEDERA_MIRROR_URL, Shape::HederaAccounts));
                    list.push(Endpoint::new("mirror-balances", HEDERA_MIRROR_URL, Shape::HederaBalances));
                }
            }

            registry.endpoints.insert(chain, list);
        }

        registry
    }

    /// Replace the cascade for one chain
    pub fn with_endpoints(mut self, chain: Chain, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints.insert(chain, endpoints);
        self
    }

    pub fn endpoints(&self, chain: Chain) -> &[Endpoint] {
        self.endpoints.get(&chain).map(Vec::as_slice).unwrap_or_default()
    }
}
