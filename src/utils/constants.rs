//! Constants Module - Single Source of Truth
//!
//! Every explorer URL, chain attribute and tuning default lives here.
//! No hardcoded endpoints in other modules.

use crate::models::types::Chain;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "WalletSentry";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for explorer requests (some public APIs reject empty agents)
pub const USER_AGENT: &str = concat!("WalletSentry/", env!("CARGO_PKG_VERSION"));

/// Creditor name written into ISO 20022 exports
pub const ISO_CREDITOR_NAME: &str = "Wallet Sentry Validator";

/// Prefix of the ISO 20022 message id
pub const ISO_MSG_ID_PREFIX: &str = "WS-";

// ============================================
// TRANSPORT CONSTANTS
// ============================================

/// Default per-call timeout for explorer requests (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Attempts per endpoint before cascading to the next one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Base backoff between attempts on the same endpoint (ms)
pub const RETRY_BASE_MS: u64 = 250;

/// Backoff cap (ms)
pub const RETRY_MAX_MS: u64 = 2_000;

/// Random jitter applied to the backoff (percent)
pub const RETRY_JITTER_PERCENT: u64 = 20;

// ============================================
// SERVICE CONSTANTS
// ============================================

/// Default snapshot cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Default requests per minute per client
pub const DEFAULT_RATE_LIMIT_PER_MIN: u32 = 60;

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

// ============================================
// SNAPSHOT CONSTANTS
// ============================================

/// Maximum transactions kept on a snapshot
pub const MAX_RECENT_TXS: usize = 5;

/// Page size for Solana `getSignaturesForAddress`
pub const SOLANA_SIGNATURE_LIMIT: usize = 1_000;

/// Page size for rippled `account_tx`
pub const XRP_TX_PAGE_LIMIT: usize = 200;

/// Page size for Hedera mirror node account transactions (mirror max is 100)
pub const HEDERA_TX_PAGE_LIMIT: usize = 100;

/// Seconds between the Unix epoch and the Ripple epoch (2000-01-01)
pub const RIPPLE_EPOCH_OFFSET: i64 = 946_684_800;

/// EVM tie-break order when networks report equal activity
pub const EVM_PRIORITY: [Chain; 3] = [Chain::Ethereum, Chain::Base, Chain::Bsc];

// ============================================
// EXPLORER ENDPOINTS - Single Source of Truth
// ============================================

/// Etherscan v2 multichain API (needs ETHERSCAN_API_KEY)
pub const ETHERSCAN_V2_URL: &str = "https://api.etherscan.io/v2/api";

pub const ETHEREUM_RPCS: &[(&str, &str)] = &[
    ("cloudflare", "https://cloudflare-eth.com"),
    ("publicnode", "https://ethereum.publicnode.com"),
    ("ankr", "https://rpc.ankr.com/eth"),
    ("llamarpc", "https://eth.llamarpc.com"),
];

pub const BASE_RPCS: &[(&str, &str)] = &[
    ("base", "https://mainnet.base.org"),
    ("publicnode", "https://base.publicnode.com"),
    ("llamarpc", "https://base.llamarpc.com"),
];

pub const BSC_RPCS: &[(&str, &str)] = &[
    ("binance", "https://bsc-dataseed.binance.org"),
    ("publicnode", "https://bsc.publicnode.com"),
    ("ankr", "https://rpc.ankr.com/bsc"),
];

pub const BITCOIN_ESPLORA: &[(&str, &str)] = &[
    ("blockstream", "https://blockstream.info/api"),
    ("mempool", "https://mempool.space/api"),
];
pub const BLOCKCHAIN_INFO_URL: &str = "https://blockchain.info";
pub const BLOCKCYPHER_URL: &str = "https://api.blockcypher.com/v1/btc/main";
pub const BLOCKCHAIR_URL: &str = "https://api.blockchair.com/bitcoin";

pub const TRONSCAN_URL: &str = "https://apilist.tronscanapi.com/api";
pub const TRONGRID_URL: &str = "https://api.trongrid.io";

pub const RIPPLED_NODES: &[(&str, &str)] = &[
    ("xrplcluster", "https://xrplcluster.com"),
    ("ripple-s1", "https://s1.ripple.com:51234"),
    ("ripple-s2", "https://s2.ripple.com:51234"),
];
pub const XRPSCAN_URL: &str = "https://api.xrpscan.com/api/v1";

pub const SOLANA_RPCS: &[(&str, &str)] = &[
    ("mainnet-beta", "https://api.mainnet-beta.solana.com"),
    ("publicnode", "https://solana-rpc.publicnode.com"),
    ("ankr", "https://rpc.ankr.com/solana"),
];

pub const HEDERA_MIRROR_URL: &str = "https://mainnet-public.mirrornode.hedera.com/api/v1";

// ============================================
// CHAIN METADATA
// ============================================

/// Get chain display name
pub fn get_chain_name(chain: Chain) -> &'static str {
    match chain {
        Chain::Ethereum => "Ethereum",
        Chain::Base => "Base",
        Chain::Bsc => "BNB Smart Chain",
        Chain::Tron => "TRON",
        Chain::Bitcoin => "Bitcoin",
        Chain::Xrp => "XRP Ledger",
        Chain::Solana => "Solana",
        Chain::Hedera => "Hedera",
    }
}

/// Get native token symbol
pub fn get_native_symbol(chain: Chain) -> &'static str {
    match chain {
        Chain::Ethereum | Chain::Base => "ETH",
        Chain::Bsc => "BNB",
        Chain::Tron => "TRX",
        Chain::Bitcoin => "BTC",
        Chain::Xrp => "XRP",
        Chain::Solana => "SOL",
        Chain::Hedera => "HBAR",
    }
}

/// Decimals of the smallest unit (wei, sun, satoshi, drops, lamports, tinybar)
pub fn get_native_decimals(chain: Chain) -> u32 {
    match chain {
        Chain::Ethereum | Chain::Base | Chain::Bsc => 18,
        Chain::Tron => 6,
        Chain::Bitcoin => 8,
        Chain::Xrp => 6,
        Chain::Solana => 9,
        Chain::Hedera => 8,
    }
}

/// EVM chain id used by Etherscan v2
pub fn get_evm_chain_id(chain: Chain) -> Option<u64> {
    match chain {
        Chain::Ethereum => Some(1),
        Chain::Base => Some(8453),
        Chain::Bsc => Some(56),
        _ => None,
    }
}
