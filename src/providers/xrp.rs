//! XRP Ledger adapters
//!
//! rippled nodes speak their own JSON-RPC dialect: errors live inside
//! `result` (`{"result":{"error":"actNotFound","status":"error"}}`) rather
//! than in a top-level `error` object, so calls go through `post_json`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Chain, FetchedAccount, TxSummary};
use crate::providers::http::HttpClient;
use crate::providers::json::{as_i64, display_str, from_unix_secs, oldest, parse_datetime, require};
use crate::utils::constants::{RIPPLE_EPOCH_OFFSET, XRP_TX_PAGE_LIMIT};
use crate::utils::units::{format_amount, format_raw, json_decimal, json_raw_amount, raw_to_chain_native};

fn from_ripple_time(secs: i64) -> Option<DateTime<Utc>> {
    secs.checked_add(RIPPLE_EPOCH_OFFSET).and_then(from_unix_secs)
}

/// Drops string for XRP, `{value, currency}` object for issued currencies
fn display_amount(amount: Option<&Value>) -> String {
    match amount {
        Some(Value::Object(iou)) => format!(
            "{} {}",
            iou.get("value").and_then(Value::as_str).unwrap_or("?"),
            iou.get("currency").and_then(Value::as_str).unwrap_or("?")
        ),
        Some(value) => json_raw_amount(value)
            .map(|drops| format_raw(drops, Chain::Xrp))
            .unwrap_or_else(|| "-".to_string()),
        None => "-".to_string(),
    }
}

// ============================================
// RIPPLED
// ============================================

pub async fn fetch_rippled(http: &HttpClient, url: &str, address: &str) -> AppResult<FetchedAccount> {
    let info = http
        .post_json(
            url,
            &json!({
                "method": "account_info",
                "params": [{"account": address, "ledger_index": "validated"}]
            }),
        )
        .await?;
    let account = parse_account_info(&info)?;
    if !account.has_activity() {
        // Unfunded account: no history to fetch
        return Ok(account);
    }

    let history = http
        .post_json(
            url,
            &json!({
                "method": "account_tx",
                "params": [{
                    "account": address,
                    "ledger_index_min": -1,
                    "ledger_index_max": -1,
                    "limit": XRP_TX_PAGE_LIMIT,
                    "forward": false
                }]
            }),
        )
        .await
        .and_then(|doc| parse_account_tx(&doc));

    match history {
        Ok(transactions) => {
            let listed = transactions.len() as u64;
            let first_seen = oldest(transactions.iter().map(|tx| tx.timestamp));
            Ok(account
                .with_tx_count(listed)
                .with_first_seen(first_seen)
                .with_transactions(transactions))
        }
        Err(e) => {
            debug!("account_tx failed for {}: {}", address, e);
            Ok(account.mark_partial())
        }
    }
}

fn rippled_result(doc: &Value) -> AppResult<&Value> {
    let result = require(doc, "/result")?;
    if let Some(error) = result.get("error").and_then(Value::as_str) {
        let code = result.get("error_code").and_then(as_i64).unwrap_or(0);
        let message = result
            .get("error_message")
            .and_then(Value::as_str)
            .unwrap_or(error);
        return Err(AppError::rpc_error(code, message));
    }
    Ok(result)
}

/// `account_info`; `actNotFound` is an unfunded account with zero balance
pub fn parse_account_info(doc: &Value) -> AppResult<FetchedAccount> {
    if doc.pointer("/result/error").and_then(Value::as_str) == Some("actNotFound") {
        return Ok(FetchedAccount::new(Decimal::ZERO));
    }
    let result = rippled_result(doc)?;
    let drops = json_raw_amount(require(result, "/account_data/Balance")?)
        .ok_or_else(|| AppError::invalid_response("XRP balance is not numeric"))?;
    Ok(FetchedAccount::new(raw_to_chain_native(drops, Chain::Xrp)?))
}

/// Newest-first page from `account_tx`. Accepts both the classic `tx`
/// wrapper and the API v2 `tx_json` + top-level `hash` layout.
pub fn parse_account_tx(doc: &Value) -> AppResult<Vec<TxSummary>> {
    let entries = require(rippled_result(doc)?, "/transactions")?
        .as_array()
        .ok_or_else(|| AppError::invalid_response("account_tx transactions is not an array"))?;

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let tx = entry.get("tx_json").or_else(|| entry.get("tx"))?;
            let hash = entry
                .get("hash")
                .or_else(|| tx.get("hash"))
                .and_then(Value::as_str)
                .unwrap_or("-");
            let timestamp = tx
                .get("date")
                .and_then(as_i64)
                .and_then(from_ripple_time)
                .or_else(|| {
                    entry
                        .get("close_time_iso")
                        .and_then(Value::as_str)
                        .and_then(parse_datetime)
                });
            Some(TxSummary {
                hash: hash.to_string(),
                timestamp,
                from: display_str(tx, "Account"),
                to: display_str(tx, "Destination"),
                value: display_amount(tx.get("Amount").or_else(|| tx.get("DeliverMax"))),
            })
        })
        .collect())
}

// ============================================
// XRPSCAN
// ============================================

pub async fn fetch_xrpscan(http: &HttpClient, base_url: &str, address: &str) -> AppResult<FetchedAccount> {
    let doc = http.get_json(&format!("{}/account/{}", base_url, address)).await?;
    let account = parse_xrpscan_account(&doc)?;

    match http
        .get_json(&format!("{}/account/{}/transactions", base_url, address))
        .await
        .and_then(|doc| parse_xrpscan_transactions(&doc))
    {
        Ok(transactions) => {
            let listed = transactions.len() as u64;
            let first_seen = account
                .first_seen
                .or_else(|| oldest(transactions.iter().map(|tx| tx.timestamp)));
            Ok(account
                .with_tx_count(listed)
                .with_first_seen(first_seen)
                .with_transactions(transactions))
        }
        Err(e) => {
            debug!("XRPScan history failed for {}: {}", address, e);
            Ok(account.mark_partial())
        }
    }
}

/// `xrpBalance` is already in XRP; `inception` is the activation time
pub fn parse_xrpscan_account(doc: &Value) -> AppResult<FetchedAccount> {
    let balance = json_decimal(require(doc, "/xrpBalance")?)
        .ok_or_else(|| AppError::invalid_response("xrpBalance is not numeric"))?;
    let inception = doc
        .get("inception")
        .and_then(Value::as_str)
        .and_then(parse_datetime);
    Ok(FetchedAccount::new(balance).with_first_seen(inception))
}

/// Either a bare array or `{"transactions": [...]}`
pub fn parse_xrpscan_transactions(doc: &Value) -> AppResult<Vec<TxSummary>> {
    let entries = doc
        .as_array()
        .or_else(|| doc.get("transactions").and_then(Value::as_array))
        .ok_or_else(|| AppError::missing_field("transactions"))?;

    Ok(entries
        .iter()
        .map(|tx| {
            let amount = tx.get("Amount").or_else(|| tx.get("amount"));
            let value = match amount {
                Some(Value::Object(obj)) if obj.get("currency").and_then(Value::as_str) == Some("XRP") => {
                    obj.get("value")
                        .and_then(json_decimal)
                        .map(|v| format_amount(v, Chain::Xrp))
                        .unwrap_or_else(|| "-".to_string())
                }
                other => display_amount(other),
            };
            TxSummary {
                hash: display_str(tx, "hash"),
                timestamp: tx
                    .get("date")
                    .and_then(Value::as_str)
                    .and_then(parse_datetime),
                from: display_str(tx, "Account"),
                to: display_str(tx, "Destination"),
                value,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_account_info_balance() {
        let doc = json!({
            "result": {
                "account_data": {"Account": "rExample", "Balance": "25000000", "Sequence": 7},
                "status": "success",
                "validated": true
            }
        });
        let account = parse_account_info(&doc).unwrap();
        assert_eq!(account.balance, Decimal::from(25));
    }

    #[test]
    fn test_account_not_found_is_zero() {
        let doc = json!({"result": {"error": "actNotFound", "error_code": 19, "status": "error"}});
        let account = parse_account_info(&doc).unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn test_other_rippled_errors_fail() {
        let doc = json!({"result": {"error": "tooBusy", "status": "error"}});
        assert!(parse_account_info(&doc).is_err());
    }

    #[test]
    fn test_account_tx_both_layouts() {
        let doc = json!({
            "result": {
                "transactions": [
                    {"tx": {"hash": "A1", "date": 700_000_000, "Account": "rFrom", "Destination": "rTo", "Amount": "1500000"}},
                    {"hash": "B2", "tx_json": {"date": 600_000_000, "Account": "rFrom", "Destination": "rTo",
                                               "DeliverMax": {"value": "10", "currency": "USD"}}}
                ],
                "status": "success"
            }
        });
        let txs = parse_account_tx(&doc).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].hash, "A1");
        assert_eq!(txs[0].value, "1.5 XRP");
        assert_eq!(txs[0].timestamp.unwrap().timestamp(), 700_000_000 + RIPPLE_EPOCH_OFFSET);
        assert_eq!(txs[1].hash, "B2");
        assert_eq!(txs[1].value, "10 USD");
    }

    #[test]
    fn test_account_tx_extreme_date() {
        let doc = json!({
            "result": {
                "transactions": [
                    {"tx": {"hash": "C3", "date": i64::MAX, "Account": "rFrom", "Destination": "rTo", "Amount": "1"}}
                ],
                "status": "success"
            }
        });
        let txs = parse_account_tx(&doc).unwrap();
        assert_eq!(txs[0].hash, "C3");
        assert!(txs[0].timestamp.is_none());
        assert!(from_ripple_time(i64::MAX).is_none());
    }

    #[test]
    fn test_xrpscan_account() {
        let doc = json!({"account": "rExample", "xrpBalance": "19.5", "inception": "2018-01-02T03:04:05.000Z"});
        let account = parse_xrpscan_account(&doc).unwrap();
        assert_eq!(account.balance, Decimal::from_str("19.5").unwrap());
        assert!(account.first_seen.is_some());
        assert!(parse_xrpscan_account(&json!({"error": "not found"})).is_err());
    }
}
