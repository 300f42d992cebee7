//! Risk Scoring Module
//! Heuristic 0-100 wallet risk from balance, activity and age
//!
//! Higher is riskier. Rules are applied in a fixed order, the total is
//! clamped to 0..=100 and a verdict line closes the reason list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::types::RiskLevel;

/// Granular risk score (0-100)
/// - 0-20: Low Risk Wallet
/// - 21-50: Medium Risk Wallet
/// - 51-100: High Risk Wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    /// Overall score (0-100)
    pub total: u8,
    pub level: RiskLevel,
    /// Rule reasons in application order, verdict last
    pub reasons: Vec<String>,
    /// Detailed breakdown for transparency
    pub breakdown: Vec<ScoreFactor>,
}

/// Individual rule that fired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    /// Signed contribution before clamping
    pub delta: i16,
    pub reason: String,
}

impl RiskScore {
    /// Sum the fired rules, clamp, and attach the verdict
    pub fn calculate(factors: Vec<ScoreFactor>) -> Self {
        let raw: i32 = factors.iter().map(|f| i32::from(f.delta)).sum();
        let total = raw.clamp(0, 100) as u8;

        let mut reasons: Vec<String> = factors.iter().map(|f| f.reason.clone()).collect();
        reasons.push(Self::verdict(total).to_string());

        Self {
            total,
            level: RiskLevel::from_score(total),
            reasons,
            breakdown: factors,
        }
    }

    pub fn verdict(score: u8) -> &'static str {
        match score {
            0..=20 => "Low Risk Wallet",
            21..=50 => "Medium Risk Wallet",
            _ => "High Risk Wallet",
        }
    }
}

/// Builder applying the wallet rules in order
pub struct RiskScoreBuilder {
    factors: Vec<ScoreFactor>,
}

impl RiskScoreBuilder {
    pub fn new() -> Self {
        Self { factors: Vec::new() }
    }

    fn push(&mut self, name: &str, delta: i16, reason: &str) {
        self.factors.push(ScoreFactor {
            name: name.to_string(),
            delta,
            reason: reason.to_string(),
        });
    }

    /// Very low balance adds risk
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        if balance < Decimal::new(1, 2) {
            self.push("balance", 30, "Very low balance");
        }
        self
    }

    pub fn with_tx_count(mut self, tx_count: u64) -> Self {
        if tx_count < 3 {
            self.push("activity", 20, "Few transactions");
        }
        self
    }

    /// Unknown (0) or young wallets add risk
    pub fn with_wallet_age(mut self, days: u64) -> Self {
        match days {
            0 => self.push("age", 20, "No age data / too new"),
            1..=29 => self.push("age", 10, "Young wallet (< 30 days)"),
            _ => {}
        }
        self
    }

    /// A strong balance offsets some risk; applied last
    pub fn with_strong_balance(mut self, balance: Decimal) -> Self {
        if balance > Decimal::ONE {
            self.push("balance", -10, "Strong wallet balance");
        }
        self
    }

    /// Build final risk score
    pub fn build(self) -> RiskScore {
        RiskScore::calculate(self.factors)
    }
}

impl Default for RiskScoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Score a wallet from its three inputs
pub fn score_wallet(balance: Decimal, tx_count: u64, wallet_age_days: u64) -> RiskScore {
    RiskScoreBuilder::new()
        .with_balance(balance)
        .with_tx_count(tx_count)
        .with_wallet_age(wallet_age_days)
        .with_strong_balance(balance)
        .build()
}
