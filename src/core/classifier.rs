//! Address Classifier
//!
//! Prefix/length heuristics, first match wins:
//! 1. `0.0.<n>`                          Hedera
//! 2. `0x` + 40 hex                      EVM (Ethereum / Base / BSC)
//! 3. `T` + 33 base58                    TRON
//! 4. `bc1` + bech32, `1`/`3` + base58   Bitcoin
//! 5. `r` + 24-34 base58                 XRP Ledger
//! 6. 43-44 base58                       Solana

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::models::types::ChainFamily;

lazy_static! {
    static ref HEDERA_RE: Regex = Regex::new(r"^0\.0\.\d{1,19}$").expect("valid regex");
    static ref EVM_RE: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid regex");
    static ref TRON_RE: Regex = Regex::new(r"^T[1-9A-HJ-NP-Za-km-z]{33}$").expect("valid regex");
    static ref BTC_BECH32_RE: Regex =
        Regex::new(r"^bc1[02-9ac-hj-np-z]{8,87}$").expect("valid regex");
    static ref BTC_BASE58_RE: Regex =
        Regex::new(r"^[13][1-9A-HJ-NP-Za-km-z]{25,34}$").expect("valid regex");
    static ref XRP_RE: Regex = Regex::new(r"^r[1-9A-HJ-NP-Za-km-z]{24,34}$").expect("valid regex");
    static ref SOLANA_RE: Regex = Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{43,44}$").expect("valid regex");
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub family: ChainFamily,
    /// Trimmed and case-normalized address
    pub canonical: String,
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        self.family != ChainFamily::Unknown
    }
}

/// Strip surrounding whitespace and quotes
fn strip(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
}

/// bech32 must be single-case; accept all-upper by lowering it
fn as_bech32(candidate: &str) -> Option<String> {
    let has_lower = candidate.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = candidate.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return None;
    }
    let lowered = candidate.to_ascii_lowercase();
    BTC_BECH32_RE.is_match(&lowered).then_some(lowered)
}

fn detect(candidate: &str) -> ChainFamily {
    if HEDERA_RE.is_match(candidate) {
        ChainFamily::Hedera
    } else if EVM_RE.is_match(candidate) {
        ChainFamily::Evm
    } else if TRON_RE.is_match(candidate) {
        ChainFamily::Tron
    } else if as_bech32(candidate).is_some() || BTC_BASE58_RE.is_match(candidate) {
        ChainFamily::Bitcoin
    } else if XRP_RE.is_match(candidate) {
        ChainFamily::Xrp
    } else if SOLANA_RE.is_match(candidate) {
        ChainFamily::Solana
    } else {
        ChainFamily::Unknown
    }
}

/// Classify a raw user-supplied address
pub fn classify(raw: &str) -> Classification {
    let family = detect(strip(raw));
    Classification {
        family,
        canonical: canonicalize(raw, family),
    }
}

pub fn is_valid(raw: &str) -> bool {
    detect(strip(raw)) != ChainFamily::Unknown
}

/// Canonical form for `family`: EVM hex and bech32 lower-cased, base58 kept
pub fn canonicalize(raw: &str, family: ChainFamily) -> String {
    let stripped = strip(raw);
    match family {
        ChainFamily::Evm => stripped.to_ascii_lowercase(),
        ChainFamily::Bitcoin => as_bech32(stripped).unwrap_or_else(|| stripped.to_string()),
        _ => stripped.to_string(),
    }
}
