//! TRON adapters: Tronscan and TronGrid. Balances are in sun (1 TRX = 1e6 sun).

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Chain, FetchedAccount, TxSummary};
use crate::providers::http::HttpClient;
use crate::providers::json::{as_i64, as_u64, display_str, from_unix_millis, oldest, require};
use crate::utils::constants::MAX_RECENT_TXS;
use crate::utils::units::{format_raw, json_raw_amount, raw_to_chain_native};

fn sun_amount(value: &Value) -> AppResult<u128> {
    json_raw_amount(value).ok_or_else(|| AppError::invalid_response("TRX balance is not numeric"))
}

fn display_sun(value: Option<&Value>) -> String {
    value
        .and_then(json_raw_amount)
        .map(|raw| format_raw(raw, Chain::Tron))
        .unwrap_or_else(|| "-".to_string())
}

// ============================================
// TRONSCAN
// ============================================

pub async fn fetch_tronscan(http: &HttpClient, base_url: &str, address: &str) -> AppResult<FetchedAccount> {
    let doc = http
        .get_json(&format!("{}/account?address={}", base_url, address))
        .await?;
    let account = parse_tronscan_account(&doc)?;

    let history_url = format!(
        "{}/transaction?sort=-timestamp&count=true&limit={}&start=0&address={}",
        base_url, MAX_RECENT_TXS, address
    );
    match http.get_json(&history_url).await.and_then(|doc| parse_tronscan_transactions(&doc)) {
        Ok((total, transactions)) => {
            let first_seen = account
                .first_seen
                .or_else(|| oldest(transactions.iter().map(|tx| tx.timestamp)));
            Ok(FetchedAccount {
                tx_count: account.tx_count.max(total),
                ..account
            }
            .with_first_seen(first_seen)
            .with_transactions(transactions))
        }
        Err(e) => {
            debug!("Tronscan history failed for {}: {}", address, e);
            Ok(account.mark_partial())
        }
    }
}

pub fn parse_tronscan_account(doc: &Value) -> AppResult<FetchedAccount> {
    let balance = raw_to_chain_native(sun_amount(require(doc, "/balance")?)?, Chain::Tron)?;
    let tx_count = doc.get("totalTransactionCount").and_then(as_u64).unwrap_or(0);
    let created = doc
        .get("date_created")
        .and_then(as_i64)
        .and_then(from_unix_millis);

    Ok(FetchedAccount::new(balance)
        .with_tx_count(tx_count)
        .with_first_seen(created))
}

/// `(total, newest transactions)` from `/transaction`
pub fn parse_tronscan_transactions(doc: &Value) -> AppResult<(u64, Vec<TxSummary>)> {
    let entries = require(doc, "/data")?
        .as_array()
        .ok_or_else(|| AppError::invalid_response("Tronscan data is not an array"))?;
    let total = doc.get("total").and_then(as_u64).unwrap_or(entries.len() as u64);

    let transactions = entries
        .iter()
        .map(|tx| TxSummary {
            hash: display_str(tx, "hash"),
            timestamp: tx.get("timestamp").and_then(as_i64).and_then(from_unix_millis),
            from: display_str(tx, "ownerAddress"),
            to: display_str(tx, "toAddress"),
            value: display_sun(tx.get("amount")),
        })
        .collect();
    Ok((total, transactions))
}

// ============================================
// TRONGRID
// ============================================

pub async fn fetch_trongrid(http: &HttpClient, base_url: &str, address: &str) -> AppResult<FetchedAccount> {
    let doc = http
        .get_json(&format!("{}/v1/accounts/{}", base_url, address))
        .await?;
    let account = parse_trongrid_account(&doc)?;

    let history_url = format!(
        "{}/v1/accounts/{}/transactions?limit={}&order_by=block_timestamp,desc",
        base_url, address, MAX_RECENT_TXS
    );
    match http.get_json(&history_url).await.and_then(|doc| parse_trongrid_transactions(&doc)) {
        Ok(transactions) => {
            let listed = transactions.len() as u64;
            let first_seen = account
                .first_seen
                .or_else(|| oldest(transactions.iter().map(|tx| tx.timestamp)));
            Ok(FetchedAccount {
                tx_count: account.tx_count.max(listed),
                ..account
            }
            .with_first_seen(first_seen)
            .with_transactions(transactions))
        }
        Err(e) => {
            debug!("TronGrid history failed for {}: {}", address, e);
            Ok(account.mark_partial())
        }
    }
}

/// `{"data":[{...}],"success":true}`; empty `data` is an unactivated account
pub fn parse_trongrid_account(doc: &Value) -> AppResult<FetchedAccount> {
    if doc.get("success").and_then(Value::as_bool) == Some(false) {
        let message = doc.get("error").and_then(Value::as_str).unwrap_or("request failed");
        return Err(AppError::invalid_response(format!("TronGrid error: {}", message)));
    }
    let entries = require(doc, "/data")?
        .as_array()
        .ok_or_else(|| AppError::invalid_response("TronGrid data is not an array"))?;

    let Some(entry) = entries.first() else {
        return Ok(FetchedAccount::new(Decimal::ZERO));
    };

    // Accounts holding zero TRX omit `balance`
    let raw = match entry.get("balance") {
        Some(value) => sun_amount(value)?,
        None => 0,
    };
    let created = entry
        .get("create_time")
        .and_then(as_i64)
        .and_then(from_unix_millis);

    Ok(FetchedAccount::new(raw_to_chain_native(raw, Chain::Tron)?).with_first_seen(created))
}

pub fn parse_trongrid_transactions(doc: &Value) -> AppResult<Vec<TxSummary>> {
    let entries = require(doc, "/data")?
        .as_array()
        .ok_or_else(|| AppError::invalid_response("TronGrid data is not an array"))?;

    Ok(entries
        .iter()
        .map(|tx| {
            let transfer = tx
                .pointer("/raw_data/contract/0/parameter/value")
                .unwrap_or(&Value::Null);
            TxSummary {
                hash: display_str(tx, "txID"),
                timestamp: tx.get("block_timestamp").and_then(as_i64).and_then(from_unix_millis),
                from: display_str(transfer, "owner_address"),
                to: display_str(transfer, "to_address"),
                value: display_sun(transfer.get("amount")),
            }
        })
        .collect())
}
