//! Solana JSON-RPC adapter: `getBalance` + `getSignaturesForAddress`.
//! Balance in lamports (1 SOL = 1e9 lamports).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Chain, FetchedAccount, TxSummary};
use crate::providers::http::HttpClient;
use crate::providers::json::{as_i64, from_unix_secs, oldest, require};
use crate::utils::constants::SOLANA_SIGNATURE_LIMIT;
use crate::utils::units::{json_raw_amount, raw_to_chain_native};

pub async fn fetch(http: &HttpClient, url: &str, address: &str) -> AppResult<FetchedAccount> {
    let balance = http.rpc_call(url, "getBalance", json!([address])).await?;
    let account = FetchedAccount::new(parse_balance(&balance)?);

    let signatures = http
        .rpc_call(
            url,
            "getSignaturesForAddress",
            json!([address, {"limit": SOLANA_SIGNATURE_LIMIT}]),
        )
        .await
        .and_then(|result| parse_signatures(&result));

    match signatures {
        Ok((count, first_seen, transactions)) => Ok(account
            .with_tx_count(count)
            .with_first_seen(first_seen)
            .with_transactions(transactions)),
        Err(e) => {
            debug!("getSignaturesForAddress failed for {}: {}", address, e);
            Ok(account.mark_partial())
        }
    }
}

/// `{"context":{...},"value":<lamports>}`
pub fn parse_balance(result: &Value) -> AppResult<Decimal> {
    let lamports = json_raw_amount(require(result, "/value")?)
        .ok_or_else(|| AppError::invalid_response("Lamport balance is not numeric"))?;
    raw_to_chain_native(lamports, Chain::Solana)
}

/// Signature page (newest first): count, oldest block time, newest entries.
/// Signatures carry no amounts or parties.
pub fn parse_signatures(
    result: &Value,
) -> AppResult<(u64, Option<DateTime<Utc>>, Vec<TxSummary>)> {
    let entries = result
        .as_array()
        .ok_or_else(|| AppError::invalid_response("Signatures result is not an array"))?;

    let block_time = |entry: &Value| entry.get("blockTime").and_then(as_i64).and_then(from_unix_secs);
    let first_seen = oldest(entries.iter().map(block_time));

    let transactions = entries
        .iter()
        .filter_map(|entry| {
            let signature = entry.get("signature").and_then(Value::as_str)?;
            let mut tx = TxSummary::bare(signature, block_time(entry));
            if entry.get("err").map_or(false, |e| !e.is_null()) {
                tx.value = "failed".to_string();
            }
            Some(tx)
        })
        .collect();

    Ok((entries.len() as u64, first_seen, transactions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        let result = json!({"context": {"slot": 1}, "value": 2_500_000_000u64});
        assert_eq!(parse_balance(&result).unwrap().to_string(), "2.5");
        assert!(parse_balance(&json!({"context": {}})).is_err());
    }

    #[test]
    fn test_parse_signatures() {
        let result = json!([
            {"signature": "sig3", "blockTime": 1_700_000_300, "err": null},
            {"signature": "sig2", "blockTime": 1_700_000_200, "err": {"InstructionError": [0, "Custom"]}},
            {"signature": "sig1", "blockTime": 1_600_000_000, "err": null}
        ]);
        let (count, first_seen, txs) = parse_signatures(&result).unwrap();
        assert_eq!(count, 3);
        assert_eq!(first_seen.unwrap().timestamp(), 1_600_000_000);
        assert_eq!(txs[0].hash, "sig3");
        assert_eq!(txs[1].value, "failed");
    }

    #[test]
    fn test_empty_signatures() {
        let (count, first_seen, txs) = parse_signatures(&json!([])).unwrap();
        assert_eq!(count, 0);
        assert!(first_seen.is_none());
        assert!(txs.is_empty());
    }
}
