//! Core Module - Business Logic
//!
//! Address classification, risk scoring, the lookup dispatcher and the
//! ISO 20022 export.

pub mod classifier;
pub mod inspector;
pub mod iso_export;
pub mod risk_score;

pub use classifier::{canonicalize, classify, is_valid, Classification};
pub use inspector::{apply_score, pick_evm_network, WalletInspector};
pub use iso_export::{generate_iso_xml, xml_escape};
pub use risk_score::{score_wallet, RiskScore, RiskScoreBuilder, ScoreFactor};
