//! EVM adapters (Ethereum, Base, BSC)
//!
//! Two response shapes:
//! - plain JSON-RPC nodes: `eth_getBalance` + `eth_getTransactionCount`
//!   (no history, so the result is always partial)
//! - Etherscan v2 multichain API: balance, newest `txlist` page, oldest
//!   transaction for wallet age, proxy nonce for the count

use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Chain, FetchedAccount, TxSummary};
use crate::providers::http::{extract_rpc_result, HttpClient};
use crate::providers::json::{as_i64, display_str, from_unix_secs, require};
use crate::utils::constants::MAX_RECENT_TXS;
use crate::utils::units::{format_raw, json_raw_amount, parse_hex_quantity, raw_to_chain_native};

// ============================================
// JSON-RPC NODES
// ============================================

pub async fn fetch_rpc(
    http: &HttpClient,
    url: &str,
    chain: Chain,
    address: &str,
) -> AppResult<FetchedAccount> {
    let balance = http
        .rpc_call(url, "eth_getBalance", json!([address, "latest"]))
        .await?;
    let balance = parse_rpc_quantity(&balance, chain)?;

    let account = FetchedAccount::new(balance).mark_partial();
    match http
        .rpc_call(url, "eth_getTransactionCount", json!([address, "latest"]))
        .await
        .and_then(|count| parse_nonce(&count))
    {
        Ok(nonce) => Ok(account.with_tx_count(nonce)),
        Err(e) => {
            debug!(chain = %chain, "eth_getTransactionCount failed: {}", e);
            Ok(account)
        }
    }
}

/// `eth_getBalance` result (hex wei) -> native amount
pub fn parse_rpc_quantity(result: &Value, chain: Chain) -> AppResult<Decimal> {
    let hex = result
        .as_str()
        .ok_or_else(|| AppError::invalid_response("Balance is not a hex string"))?;
    raw_to_chain_native(parse_hex_quantity(hex)?, chain)
}

pub fn parse_nonce(result: &Value) -> AppResult<u64> {
    let hex = result
        .as_str()
        .ok_or_else(|| AppError::invalid_response("Nonce is not a hex string"))?;
    u64::try_from(parse_hex_quantity(hex)?)
        .map_err(|_| AppError::invalid_response("Nonce out of range"))
}

// ============================================
// ETHERSCAN V2
// ============================================

pub async fn fetch_etherscan(
    http: &HttpClient,
    base_url: &str,
    chain_id: u64,
    api_key: &str,
    chain: Chain,
    address: &str,
) -> AppResult<FetchedAccount> {
    let query = |params: &str| {
        format!(
            "{}?chainid={}&module=account&{}&address={}&apikey={}",
            base_url, chain_id, params, address, api_key
        )
    };

    let balance_doc = http.get_json(&query("action=balance&tag=latest")).await?;
    let balance = parse_etherscan_balance(&balance_doc, chain)?;
    let mut account = FetchedAccount::new(balance);

    let newest = http
        .get_json(&query(&format!(
            "action=txlist&startblock=0&endblock=99999999&page=1&offset={}&sort=desc",
            MAX_RECENT_TXS
        )))
        .await
        .and_then(|doc| parse_etherscan_txlist(&doc, address, chain));
    let oldest = http
        .get_json(&query(
            "action=txlist&startblock=0&endblock=99999999&page=1&offset=1&sort=asc",
        ))
        .await
        .and_then(|doc| parse_etherscan_txlist(&doc, address, chain));
    let nonce_url = format!(
        "{}?chainid={}&module=proxy&action=eth_getTransactionCount&address={}&tag=latest&apikey={}",
        base_url, chain_id, address, api_key
    );
    let nonce = http
        .get_json(&nonce_url)
        .await
        .and_then(extract_rpc_result)
        .and_then(|n| parse_nonce(&n));

    match (newest, oldest) {
        (Ok(newest), Ok(oldest)) => {
            let first_seen = oldest.first().and_then(|tx| tx.timestamp);
            let listed = newest.len() as u64;
            account = account
                .with_first_seen(first_seen)
                .with_transactions(newest)
                .with_tx_count(listed);
        }
        (newest, oldest) => {
            debug!(chain = %chain, "Etherscan history incomplete");
            if let Ok(newest) = newest {
                account.tx_count = newest.len() as u64;
                account = account.with_transactions(newest);
            }
            if let Ok(oldest) = oldest {
                account.first_seen = oldest.first().and_then(|tx| tx.timestamp);
            }
            account = account.mark_partial();
        }
    }

    // The nonce only counts outgoing transactions; the page length is a lower bound too
    if let Ok(nonce) = nonce {
        account.tx_count = account.tx_count.max(nonce);
    }
    Ok(account)
}

/// Etherscan envelope: `{"status":"1","message":"OK","result":...}`
fn etherscan_result(doc: &Value) -> AppResult<&Value> {
    let result = require(doc, "/result")?;
    match doc.get("status").and_then(Value::as_str) {
        Some("1") => Ok(result),
        // "No transactions found" is a valid empty page
        Some("0") if result.as_array().map_or(false, |a| a.is_empty()) => Ok(result),
        _ => {
            let message = result
                .as_str()
                .or_else(|| doc.get("message").and_then(Value::as_str))
                .unwrap_or("unknown error");
            Err(AppError::invalid_response(format!("Etherscan error: {}", message)))
        }
    }
}

pub fn parse_etherscan_balance(doc: &Value, chain: Chain) -> AppResult<Decimal> {
    let raw = json_raw_amount(etherscan_result(doc)?)
        .ok_or_else(|| AppError::invalid_response("Etherscan balance is not numeric"))?;
    raw_to_chain_native(raw, chain)
}

pub fn parse_etherscan_txlist(doc: &Value, address: &str, chain: Chain) -> AppResult<Vec<TxSummary>> {
    let entries = etherscan_result(doc)?
        .as_array()
        .ok_or_else(|| AppError::invalid_response("txlist result is not an array"))?;

    Ok(entries
        .iter()
        .map(|tx| {
            let from = display_str(tx, "from");
            let value = json_raw_amount(tx.get("value").unwrap_or(&Value::Null))
                .map(|raw| {
                    let sign = if from.eq_ignore_ascii_case(address) { "-" } else { "" };
                    format!("{}{}", sign, format_raw(raw, chain))
                })
                .unwrap_or_else(|| "-".to_string());
            TxSummary {
                hash: display_str(tx, "hash"),
                timestamp: tx.get("timeStamp").and_then(as_i64).and_then(from_unix_secs),
                from,
                to: display_str(tx, "to"),
                value,
            }
        })
        .collect())
}
