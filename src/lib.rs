//! Wallet Sentry Library
//!
//! Multi-chain wallet risk lookup:
//! - Address classification across EVM, Bitcoin, TRON, XRP, Solana and Hedera
//! - Per-chain fallback cascades over public explorers
//! - Heuristic 0-100 risk scoring
//! - ISO 20022 (pain.001) XML export

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{classify, generate_iso_xml, score_wallet, RiskScore, WalletInspector};
pub use models::{AppError, AppResult, Chain, ChainFamily, LookupStatus, RiskLevel, SentryConfig, WalletSnapshot};
pub use providers::{FallbackFetcher, FetchOutcome, ProviderRegistry};
pub use utils::{LookupStats, SnapshotCache};
