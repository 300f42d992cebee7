//! Native-unit conversion (wei, sun, satoshi, drops, lamports, tinybar)
//!
//! All conversions are exact decimal arithmetic so a raw integer survives
//! raw -> native -> raw unchanged.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::Chain;
use crate::utils::constants::{get_native_decimals, get_native_symbol};

/// Convert a raw integer amount into native units with `decimals` places
pub fn to_native(raw: u128, decimals: u32) -> AppResult<Decimal> {
    let raw = i128::try_from(raw)
        .map_err(|_| AppError::invalid_response(format!("Amount out of range: {}", raw)))?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(|d| d.normalize())
        .map_err(|_| AppError::invalid_response(format!("Amount out of range: {}", raw)))
}

/// Convert native units back to the raw integer. `None` when the amount is
/// negative, has more precision than the unit allows, or overflows.
pub fn from_native(amount: Decimal, decimals: u32) -> Option<u128> {
    if amount.is_sign_negative() {
        return None;
    }
    let factor = Decimal::from(10u64.checked_pow(decimals)?);
    let scaled = amount.checked_mul(factor)?;
    let mut integral = scaled.trunc();
    if integral != scaled {
        return None;
    }
    integral.rescale(0);
    u128::try_from(integral.mantissa()).ok()
}

/// Raw chain unit -> native amount for `chain`
pub fn raw_to_chain_native(raw: u128, chain: Chain) -> AppResult<Decimal> {
    to_native(raw, get_native_decimals(chain))
}

/// Parse a JSON-RPC hex quantity ("0x1bc16d674ec80000")
pub fn parse_hex_quantity(value: &str) -> AppResult<u128> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| AppError::invalid_response(format!("Not a hex quantity: {}", value)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|_| AppError::invalid_response(format!("Not a hex quantity: {}", value)))
}

/// Read a raw integer amount that providers send either as a JSON number or
/// as a numeric string
pub fn json_raw_amount(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u128)),
        Value::String(s) => s.trim().parse::<u128>().ok(),
        _ => None,
    }
}

/// Read a decimal amount already expressed in native units ("123.456")
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Human-readable amount with the chain's native symbol
pub fn format_amount(amount: Decimal, chain: Chain) -> String {
    format!("{} {}", amount.normalize(), get_native_symbol(chain))
}

/// Raw amount formatted for display, or "-" when it cannot be represented
pub fn format_raw(raw: u128, chain: Chain) -> String {
    raw_to_chain_native(raw, chain)
        .map(|amount| format_amount(amount, chain))
        .unwrap_or_else(|_| "-".to_string())
}

/// Signed net movement for display ("-0.5 BTC" for outgoing)
pub fn format_signed(net: i128, chain: Chain) -> String {
    let sign = if net < 0 { "-" } else { "" };
    format!("{}{}", sign, format_raw(net.unsigned_abs(), chain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wei_to_eth_round_trip() {
        let one_eth = raw_to_chain_native(1_000_000_000_000_000_000, Chain::Ethereum).unwrap();
        assert_eq!(one_eth, Decimal::ONE);
        assert_eq!(from_native(one_eth, 18), Some(1_000_000_000_000_000_000));
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(raw_to_chain_native(1_500_000, Chain::Tron).unwrap().to_string(), "1.5");
        assert_eq!(raw_to_chain_native(12_345, Chain::Bitcoin).unwrap().to_string(), "0.00012345");
        assert_eq!(raw_to_chain_native(2_000_000, Chain::Xrp).unwrap(), Decimal::from(2));
        assert_eq!(raw_to_chain_native(1, Chain::Solana).unwrap().to_string(), "0.000000001");
        assert_eq!(raw_to_chain_native(100_000_000, Chain::Hedera).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_from_native_rejects_excess_precision() {
        let amount = Decimal::from_str("0.0000000001").unwrap();
        assert_eq!(from_native(amount, 8), None);
        assert_eq!(from_native(Decimal::from(-1), 8), None);
    }

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0x").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0xde0b6b3a7640000").unwrap(), 1_000_000_000_000_000_000);
        assert!(parse_hex_quantity("1234").is_err());
        assert!(parse_hex_quantity("0xzz").is_err());
    }

    #[test]
    fn test_json_amounts() {
        assert_eq!(json_raw_amount(&json!(42)), Some(42));
        assert_eq!(json_raw_amount(&json!("42")), Some(42));
        assert_eq!(json_raw_amount(&json!(-1)), None);
        assert_eq!(json_raw_amount(&json!(null)), None);
        assert_eq!(json_decimal(&json!("12.5")), Some(Decimal::from_str("12.5").unwrap()));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_raw(250_000_000, Chain::Bitcoin), "2.5 BTC");
        assert_eq!(format_signed(-50_000_000, Chain::Bitcoin), "-0.5 BTC");
    }
}
