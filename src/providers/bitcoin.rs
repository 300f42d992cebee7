//! Bitcoin adapters
//!
//! - Esplora (Blockstream, mempool.space): `/address/{a}` + `/address/{a}/txs`
//! - blockchain.info `rawaddr`
//! - BlockCypher `addrs` (txrefs)
//! - Blockchair address dashboard
//!
//! All balances arrive in satoshi.

use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Chain, FetchedAccount, TxSummary};
use crate::providers::http::HttpClient;
use crate::providers::json::{as_i64, as_u64, display_str, from_unix_secs, oldest, parse_datetime, require};
use crate::utils::constants::MAX_RECENT_TXS;
use crate::utils::units::{format_signed, json_raw_amount, raw_to_chain_native};

fn satoshi(value: &Value, field: &str) -> AppResult<u128> {
    json_raw_amount(value)
        .ok_or_else(|| AppError::invalid_response(format!("{} is not a satoshi amount", field)))
}

// ============================================
// ESPLORA
// ============================================

pub async fn fetch_esplora(http: &HttpClient, base_url: &str, address: &str) -> AppResult<FetchedAccount> {
    let summary = http.get_json(&format!("{}/address/{}", base_url, address)).await?;
    let account = parse_esplora_address(&summary)?;

    let history = http
        .get_json(&format!("{}/address/{}/txs", base_url, address))
        .await
        .and_then(|txs| parse_esplora_txs(&txs, address));

    match history {
        Ok((transactions, first_seen)) => {
            Ok(account.with_first_seen(first_seen).with_transactions(transactions))
        }
        Err(e) => {
            debug!("Esplora history failed for {}: {}", address, e);
            Ok(account.mark_partial())
        }
    }
}

pub fn parse_esplora_address(doc: &Value) -> AppResult<FetchedAccount> {
    let funded = satoshi(require(doc, "/chain_stats/funded_txo_sum")?, "funded_txo_sum")?;
    let spent = satoshi(require(doc, "/chain_stats/spent_txo_sum")?, "spent_txo_sum")?;
    let tx_count = doc
        .pointer("/chain_stats/tx_count")
        .and_then(as_u64)
        .unwrap_or(0);

    let balance = raw_to_chain_native(funded.saturating_sub(spent), Chain::Bitcoin)?;
    Ok(FetchedAccount::new(balance).with_tx_count(tx_count))
}

/// Newest-first page of Esplora transactions plus the oldest block time in it
pub fn parse_esplora_txs(
    doc: &Value,
    address: &str,
) -> AppResult<(Vec<TxSummary>, Option<chrono::DateTime<chrono::Utc>>)> {
    let entries = doc
        .as_array()
        .ok_or_else(|| AppError::invalid_response("Esplora txs is not an array"))?;

    let timestamp = |tx: &Value| {
        tx.pointer("/status/block_time")
            .and_then(as_i64)
            .and_then(from_unix_secs)
    };
    let first_seen = oldest(entries.iter().map(timestamp));

    let transactions = entries
        .iter()
        .take(MAX_RECENT_TXS)
        .map(|tx| {
            let inputs: Vec<&Value> = tx
                .get("vin")
                .and_then(Value::as_array)
                .map(|vin| vin.iter().filter_map(|i| i.get("prevout")).collect())
                .unwrap_or_default();
            let outputs: Vec<&Value> = tx
                .get("vout")
                .and_then(Value::as_array)
                .map(|vout| vout.iter().collect())
                .unwrap_or_default();

            // None when a value is out of range; the tx then shows "-"
            let sum_for = |entries: &[&Value]| -> Option<i128> {
                entries
                    .iter()
                    .filter(|o| o.get("scriptpubkey_address").and_then(Value::as_str) == Some(address))
                    .filter_map(|o| o.get("value").and_then(json_raw_amount))
                    .try_fold(0i128, |acc, v| acc.checked_add(i128::try_from(v).ok()?))
            };
            let net = sum_for(&outputs)
                .zip(sum_for(&inputs))
                .and_then(|(received, sent)| received.checked_sub(sent));

            TxSummary {
                hash: display_str(tx, "txid"),
                timestamp: timestamp(tx),
                from: inputs
                    .first()
                    .map(|i| display_str(i, "scriptpubkey_address"))
                    .unwrap_or_else(|| "coinbase".to_string()),
                to: outputs
                    .iter()
                    .map(|o| display_str(o, "scriptpubkey_address"))
                    .find(|a| a != address && a != "-")
                    .unwrap_or_else(|| address.to_string()),
                value: net
                    .map(|net| format_signed(net, Chain::Bitcoin))
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect();

    Ok((transactions, first_seen))
}

// ============================================
// BLOCKCHAIN.INFO
// ============================================

pub async fn fetch_blockchain_info(
    http: &HttpClient,
    base_url: &str,
    address: &str,
) -> AppResult<FetchedAccount> {
    let doc = http
        .get_json(&format!("{}/rawaddr/{}?limit={}", base_url, address, MAX_RECENT_TXS))
        .await?;
    parse_blockchain_info(&doc)
}

pub fn parse_blockchain_info(doc: &Value) -> AppResult<FetchedAccount> {
    let balance = raw_to_chain_native(
        satoshi(require(doc, "/final_balance")?, "final_balance")?,
        Chain::Bitcoin,
    )?;
    let tx_count = doc.get("n_tx").and_then(as_u64).unwrap_or(0);

    let mut account = FetchedAccount::new(balance).with_tx_count(tx_count);
    match doc.get("txs").and_then(Value::as_array) {
        Some(entries) => {
            let transactions: Vec<TxSummary> = entries
                .iter()
                .map(|tx| TxSummary {
                    hash: display_str(tx, "hash"),
                    timestamp: tx.get("time").and_then(as_i64).and_then(from_unix_secs),
                    from: tx
                        .pointer("/inputs/0/prev_out/addr")
                        .and_then(Value::as_str)
                        .unwrap_or("coinbase")
                        .to_string(),
                    to: tx
                        .pointer("/out/0/addr")
                        .and_then(Value::as_str)
                        .unwrap_or("-")
                        .to_string(),
                    value: tx
                        .get("result")
                        .and_then(as_i64)
                        .map(|net| format_signed(i128::from(net), Chain::Bitcoin))
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            let first_seen = oldest(transactions.iter().map(|tx| tx.timestamp));
            account = account.with_first_seen(first_seen).with_transactions(transactions);
        }
        None => account = account.mark_partial(),
    }
    Ok(account)
}

// ============================================
// BLOCKCYPHER
// ============================================

pub async fn fetch_blockcypher(http: &HttpClient, base_url: &str, address: &str) -> AppResult<FetchedAccount> {
    let doc = http
        .get_json(&format!("{}/addrs/{}?limit={}", base_url, address, MAX_RECENT_TXS))
        .await?;
    parse_blockcypher(&doc)
}

pub fn parse_blockcypher(doc: &Value) -> AppResult<FetchedAccount> {
    let balance = raw_to_chain_native(
        satoshi(require(doc, "/final_balance")?, "final_balance")?,
        Chain::Bitcoin,
    )?;
    let tx_count = doc
        .get("final_n_tx")
        .or_else(|| doc.get("n_tx"))
        .and_then(as_u64)
        .unwrap_or(0);

    // One txref per input/output touching the address; keep the first per hash
    let mut seen = HashSet::new();
    let transactions: Vec<TxSummary> = doc
        .get("txrefs")
        .and_then(Value::as_array)
        .map(|refs| {
            refs.iter()
                .filter(|r| seen.insert(display_str(r, "tx_hash")))
                .map(|r| {
                    let spent = r.get("tx_input_n").and_then(as_i64).unwrap_or(-1) >= 0;
                    let amount = r
                        .get("value")
                        .and_then(json_raw_amount)
                        .and_then(|v| i128::try_from(v).ok())
                        .and_then(|v| if spent { v.checked_neg() } else { Some(v) });
                    TxSummary {
                        hash: display_str(r, "tx_hash"),
                        timestamp: r
                            .get("confirmed")
                            .and_then(Value::as_str)
                            .and_then(parse_datetime),
                        from: "-".to_string(),
                        to: "-".to_string(),
                        value: amount
                            .map(|net| format_signed(net, Chain::Bitcoin))
                            .unwrap_or_else(|| "-".to_string()),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let first_seen = oldest(transactions.iter().map(|tx| tx.timestamp));
    Ok(FetchedAccount::new(balance)
        .with_tx_count(tx_count)
        .with_first_seen(first_seen)
        .with_transactions(transactions))
}

// ============================================
// BLOCKCHAIR
// ============================================

pub async fn fetch_blockchair(http: &HttpClient, base_url: &str, address: &str) -> AppResult<FetchedAccount> {
    let doc = http
        .get_json(&format!(
            "{}/dashboards/address/{}?limit={}",
            base_url, address, MAX_RECENT_TXS
        ))
        .await?;
    parse_blockchair(&doc)
}

pub fn parse_blockchair(doc: &Value) -> AppResult<FetchedAccount> {
    let entry = require(doc, "/data")?
        .as_object()
        .and_then(|data| data.values().next())
        .ok_or_else(|| AppError::missing_field("data.<address>"))?;

    let info = require(entry, "/address")?;
    let balance = raw_to_chain_native(satoshi(require(info, "/balance")?, "balance")?, Chain::Bitcoin)?;
    let tx_count = info.get("transaction_count").and_then(as_u64).unwrap_or(0);
    let first_seen = info
        .get("first_seen_receiving")
        .and_then(Value::as_str)
        .and_then(parse_datetime);

    let transactions = entry
        .get("transactions")
        .and_then(Value::as_array)
        .map(|hashes| {
            hashes
                .iter()
                .filter_map(Value::as_str)
                .map(|hash| TxSummary::bare(hash, None))
                .collect()
        })
        .unwrap_or_default();

    Ok(FetchedAccount::new(balance)
        .with_tx_count(tx_count)
        .with_first_seen(first_seen)
        .with_transactions(transactions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    const ADDR: &str = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh";

    #[test]
    fn test_esplora_address() {
        let doc = json!({
            "address": ADDR,
            "chain_stats": {"funded_txo_sum": 150_000_000u64, "spent_txo_sum": 50_000_000u64, "tx_count": 7},
            "mempool_stats": {"funded_txo_sum": 0, "spent_txo_sum": 0, "tx_count": 0}
        });
        let account = parse_esplora_address(&doc).unwrap();
        assert_eq!(account.balance, Decimal::ONE);
        assert_eq!(account.tx_count, 7);

        let err = parse_esplora_address(&json!({"address": ADDR})).unwrap_err();
        assert!(err.message.contains("chain_stats"));
    }

    #[test]
    fn test_esplora_txs_net_value() {
        let doc = json!([
            {
                "txid": "newest",
                "status": {"confirmed": true, "block_time": 1_700_000_000},
                "vin": [{"prevout": {"scriptpubkey_address": ADDR, "value": 100_000_000u64}}],
                "vout": [
                    {"scriptpubkey_address": "bc1qother", "value": 60_000_000u64},
                    {"scriptpubkey_address": ADDR, "value": 40_000_000u64}
                ]
            },
            {
                "txid": "oldest",
                "status": {"confirmed": true, "block_time": 1_600_000_000},
                "vin": [{"prevout": {"scriptpubkey_address": "bc1qfunder", "value": 200_000_000u64}}],
                "vout": [{"scriptpubkey_address": ADDR, "value": 100_000_000u64}]
            }
        ]);
        let (txs, first_seen) = parse_esplora_txs(&doc, ADDR).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].value, "-0.6 BTC");
        assert_eq!(txs[0].to, "bc1qother");
        assert_eq!(txs[1].value, "1 BTC");
        assert_eq!(txs[1].from, "bc1qfunder");
        assert_eq!(first_seen.unwrap().timestamp(), 1_600_000_000);
    }

    #[test]
    fn test_esplora_txs_out_of_range_values() {
        let huge = "170141183460469231731687303715884105727";
        let doc = json!([
            {
                "txid": "overflowing-sum",
                "vin": [],
                "vout": [
                    {"scriptpubkey_address": ADDR, "value": huge},
                    {"scriptpubkey_address": ADDR, "value": huge}
                ]
            },
            {
                "txid": "beyond-i128",
                "vin": [],
                "vout": [{"scriptpubkey_address": ADDR, "value": u128::MAX.to_string()}]
            }
        ]);
        let (txs, first_seen) = parse_esplora_txs(&doc, ADDR).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].value, "-");
        assert_eq!(txs[1].value, "-");
        assert!(first_seen.is_none());
    }

    #[test]
    fn test_blockchain_info() {
        let doc = json!({
            "final_balance": 12_345,
            "n_tx": 3,
            "txs": [{"hash": "abc", "time": 1_650_000_000, "result": -1000,
                     "inputs": [{"prev_out": {"addr": ADDR}}], "out": [{"addr": "1Other"}]}]
        });
        let account = parse_blockchain_info(&doc).unwrap();
        assert_eq!(account.balance, Decimal::from_str("0.00012345").unwrap());
        assert_eq!(account.tx_count, 3);
        assert_eq!(account.transactions[0].value, "-0.00001 BTC");
        assert!(!account.partial);
    }

    #[test]
    fn test_blockcypher_dedupes_txrefs() {
        let doc = json!({
            "final_balance": 0,
            "final_n_tx": 2,
            "txrefs": [
                {"tx_hash": "h1", "tx_input_n": 0, "value": 5000, "confirmed": "2022-01-01T00:00:00Z"},
                {"tx_hash": "h1", "tx_input_n": -1, "value": 1000, "confirmed": "2022-01-01T00:00:00Z"},
                {"tx_hash": "h0", "tx_input_n": -1, "value": 5000, "confirmed": "2021-06-01T00:00:00Z"}
            ]
        });
        let account = parse_blockcypher(&doc).unwrap();
        assert_eq!(account.transactions.len(), 2);
        assert_eq!(account.transactions[0].value, "-0.00005 BTC");
        assert_eq!(account.first_seen, parse_datetime("2021-06-01T00:00:00Z"));
    }

    #[test]
    fn test_blockcypher_out_of_range_value() {
        let doc = json!({
            "final_balance": 0,
            "txrefs": [{"tx_hash": "h1", "tx_input_n": 0, "value": u128::MAX.to_string()}]
        });
        let account = parse_blockcypher(&doc).unwrap();
        assert_eq!(account.transactions[0].value, "-");
    }

    #[test]
    fn test_blockchair_dashboard() {
        let doc = json!({
            "data": {
                ADDR: {
                    "address": {"balance": 250_000_000u64, "transaction_count": 12,
                                "first_seen_receiving": "2019-05-01 10:00:00"},
                    "transactions": ["t1", "t2"]
                }
            }
        });
        let account = parse_blockchair(&doc).unwrap();
        assert_eq!(account.balance, Decimal::from_str("2.5").unwrap());
        assert_eq!(account.tx_count, 12);
        assert_eq!(account.transactions[1].hash, "t2");
        assert!(account.first_seen.is_some());

        assert!(parse_blockchair(&json!({"data": {}})).is_err());
    }
}
