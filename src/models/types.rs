//! Type definitions for Wallet Sentry
//! All core data structures for wallet lookups

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::errors::AppError;
use crate::utils::constants::{
    get_chain_name, get_native_symbol, MAX_RECENT_TXS,
};

/// Concrete network a snapshot is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Ethereum,
    Base,
    Bsc,
    Tron,
    Bitcoin,
    Xrp,
    Solana,
    Hedera,
}

impl Chain {
    pub const ALL: [Chain; 8] = [
        Chain::Ethereum,
        Chain::Base,
        Chain::Bsc,
        Chain::Tron,
        Chain::Bitcoin,
        Chain::Xrp,
        Chain::Solana,
        Chain::Hedera,
    ];

    /// Get chain name (delegates to constants)
    pub fn name(&self) -> &'static str {
        get_chain_name(*self)
    }

    /// Get native symbol (delegates to constants)
    pub fn symbol(&self) -> &'static str {
        get_native_symbol(*self)
    }

    pub fn is_evm(&self) -> bool {
        matches!(self, Chain::Ethereum | Chain::Base | Chain::Bsc)
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            Chain::Ethereum | Chain::Base | Chain::Bsc => ChainFamily::Evm,
            Chain::Tron => ChainFamily::Tron,
            Chain::Bitcoin => ChainFamily::Bitcoin,
            Chain::Xrp => ChainFamily::Xrp,
            Chain::Solana => ChainFamily::Solana,
            Chain::Hedera => ChainFamily::Hedera,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifier output. `Evm` covers Ethereum, Base and BSC, which share an
/// address format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
    Evm,
    Tron,
    Bitcoin,
    Xrp,
    Solana,
    Hedera,
    Unknown,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Tron => "tron",
            ChainFamily::Bitcoin => "bitcoin",
            ChainFamily::Xrp => "xrp",
            ChainFamily::Solana => "solana",
            ChainFamily::Hedera => "hedera",
            ChainFamily::Unknown => "unknown",
        }
    }

    /// Networks to query for this family, in tie-break priority order
    pub fn chains(&self) -> &'static [Chain] {
        match self {
            ChainFamily::Evm => &crate::utils::constants::EVM_PRIORITY,
            ChainFamily::Tron => &[Chain::Tron],
            ChainFamily::Bitcoin => &[Chain::Bitcoin],
            ChainFamily::Xrp => &[Chain::Xrp],
            ChainFamily::Solana => &[Chain::Solana],
            ChainFamily::Hedera => &[Chain::Hedera],
            ChainFamily::Unknown => &[],
        }
    }
}

/// Risk level classification for wallets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Established, funded, active wallet
    Safe,
    /// Minor concerns
    Low,
    /// Proceed with caution
    Medium,
    /// Thin or unknown history
    High,
    /// Empty, new and inactive
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=20 => RiskLevel::Safe,
            21..=40 => RiskLevel::Low,
            41..=60 => RiskLevel::Medium,
            61..=80 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "✅",
            RiskLevel::Low => "🟡",
            RiskLevel::Medium => "🟠",
            RiskLevel::High => "🔴",
            RiskLevel::Critical => "💀",
        }
    }
}

/// Outcome of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    /// A provider answered with complete data
    Ok,
    /// A provider answered but history or age was unavailable
    Partial,
    /// Every configured endpoint failed
    Rejected,
    /// The address matched no supported chain
    InvalidFormat,
}

impl LookupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStatus::Ok => "ok",
            LookupStatus::Partial => "partial",
            LookupStatus::Rejected => "rejected",
            LookupStatus::InvalidFormat => "invalid_format",
        }
    }
}

/// One recent transaction, display oriented
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxSummary {
    pub hash: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub from: String,
    pub to: String,
    pub value: String,
}

impl TxSummary {
    /// Transaction with only a hash and time known
    pub fn bare(hash: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            hash: hash.into(),
            timestamp,
            from: "-".to_string(),
            to: "-".to_string(),
            value: "-".to_string(),
        }
    }
}

/// Normalized provider answer, produced by a shape adapter
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedAccount {
    /// Balance in native units
    pub balance: Decimal,
    pub tx_count: u64,
    /// Oldest activity the provider knows about
    pub first_seen: Option<DateTime<Utc>>,
    /// Newest first
    pub transactions: Vec<TxSummary>,
    /// Secondary data (history/age) could not be fetched
    pub partial: bool,
}

impl FetchedAccount {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: balance.max(Decimal::ZERO),
            tx_count: 0,
            first_seen: None,
            transactions: Vec::new(),
            partial: false,
        }
    }

    pub fn with_tx_count(mut self, tx_count: u64) -> Self {
        self.tx_count = tx_count;
        self
    }

    pub fn with_first_seen(mut self, first_seen: Option<DateTime<Utc>>) -> Self {
        self.first_seen = first_seen;
        self
    }

    pub fn with_transactions(mut self, mut transactions: Vec<TxSummary>) -> Self {
        transactions.truncate(MAX_RECENT_TXS);
        self.transactions = transactions;
        self
    }

    pub fn mark_partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// Non-zero balance or any recorded transaction
    pub fn has_activity(&self) -> bool {
        self.balance > Decimal::ZERO || self.tx_count > 0
    }

    /// Whole days since `first_seen`, 0 when unknown
    pub fn wallet_age_days(&self, now: DateTime<Utc>) -> u64 {
        self.first_seen
            .map(|first| (now - first).num_days().max(0) as u64)
            .unwrap_or(0)
    }
}

/// Normalized record of one address at lookup time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub address: String,
    pub family: ChainFamily,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Chain>,
    pub chain_name: String,
    pub symbol: String,
    /// Exact native amount, serialized as a decimal string
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub tx_count: u64,
    pub wallet_age_days: u64,
    pub last_transactions: Vec<TxSummary>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_reasons: Vec<String>,
    pub status: LookupStatus,
    /// Provider that answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Other EVM networks where the address also has activity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_active_on: Vec<Chain>,
    pub checked_at: DateTime<Utc>,
}

impl WalletSnapshot {
    fn empty(address: &str, family: ChainFamily, chain: Option<Chain>, status: LookupStatus) -> Self {
        Self {
            address: address.to_string(),
            family,
            chain,
            chain_name: chain.map(|c| c.name()).unwrap_or("Unknown").to_string(),
            symbol: chain.map(|c| c.symbol()).unwrap_or("-").to_string(),
            balance: Decimal::ZERO,
            tx_count: 0,
            wallet_age_days: 0,
            last_transactions: Vec::new(),
            risk_score: 0,
            risk_level: RiskLevel::Safe,
            risk_reasons: Vec::new(),
            status,
            source: None,
            also_active_on: Vec::new(),
            checked_at: Utc::now(),
        }
    }

    /// Snapshot built from a provider answer
    pub fn from_account(
        address: &str,
        chain: Chain,
        account: FetchedAccount,
        source: impl Into<String>,
    ) -> Self {
        let status = if account.partial {
            LookupStatus::Partial
        } else {
            LookupStatus::Ok
        };
        let mut snapshot = Self::empty(address, chain.family(), Some(chain), status);
        snapshot.wallet_age_days = account.wallet_age_days(snapshot.checked_at);
        snapshot.balance = account.balance.max(Decimal::ZERO);
        snapshot.tx_count = account.tx_count;
        snapshot.last_transactions = account.transactions;
        snapshot.last_transactions.truncate(MAX_RECENT_TXS);
        snapshot.source = Some(source.into());
        snapshot
    }

    /// Zero-valued snapshot for a chain whose endpoints all failed
    pub fn rejected(address: &str, chain: Chain, reason: impl Into<String>) -> Self {
        let mut snapshot = Self::empty(address, chain.family(), Some(chain), LookupStatus::Rejected);
        snapshot.risk_reasons.push(reason.into());
        snapshot
    }

    /// Snapshot for an address no classifier rule accepted
    pub fn invalid_format(address: &str) -> Self {
        let mut snapshot =
            Self::empty(address, ChainFamily::Unknown, None, LookupStatus::InvalidFormat);
        snapshot.risk_reasons.push("❌ Invalid wallet format".to_string());
        snapshot
    }

    pub fn is_rejected(&self) -> bool {
        self.status == LookupStatus::Rejected
    }

    pub fn has_activity(&self) -> bool {
        self.balance > Decimal::ZERO || self.tx_count > 0
    }

    /// Error form of a lookup that produced no data
    pub fn failure(&self) -> Option<AppError> {
        match self.status {
            LookupStatus::InvalidFormat => Some(AppError::invalid_format(&self.address)),
            LookupStatus::Rejected => Some(AppError::upstream_unavailable(
                self.risk_reasons.first().cloned().unwrap_or_default(),
            )),
            LookupStatus::Ok | LookupStatus::Partial => None,
        }
    }

    /// Balance with native symbol
    pub fn display_balance(&self) -> String {
        format!("{} {}", self.balance.normalize(), self.symbol)
    }
}
