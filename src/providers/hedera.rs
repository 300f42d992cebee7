//! Hedera mirror node adapters. Balances in tinybar (1 HBAR = 1e8 tinybar).

use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Chain, FetchedAccount, TxSummary};
use crate::providers::http::HttpClient;
use crate::providers::json::{display_str, oldest, parse_consensus_timestamp, require};
use crate::utils::constants::HEDERA_TX_PAGE_LIMIT;
use crate::utils::units::{format_signed, json_raw_amount, raw_to_chain_native};

fn tinybar(value: &Value) -> AppResult<Decimal> {
    let raw = json_raw_amount(value)
        .ok_or_else(|| AppError::invalid_response("HBAR balance is not numeric"))?;
    raw_to_chain_native(raw, Chain::Hedera)
}

pub async fn fetch_account(http: &HttpClient, base_url: &str, account_id: &str) -> AppResult<FetchedAccount> {
    let doc = http
        .get_json(&format!(
            "{}/accounts/{}?limit={}&order=desc",
            base_url, account_id, HEDERA_TX_PAGE_LIMIT
        ))
        .await?;
    parse_account(&doc, account_id)
}

/// `/accounts/{id}`: balance, creation time and a page of transactions
pub fn parse_account(doc: &Value, account_id: &str) -> AppResult<FetchedAccount> {
    let balance = tinybar(require(doc, "/balance/balance")?)?;
    let created = doc
        .get("created_timestamp")
        .and_then(Value::as_str)
        .and_then(parse_consensus_timestamp);

    let account = FetchedAccount::new(balance);
    let Some(entries) = doc.get("transactions").and_then(Value::as_array) else {
        return Ok(account.with_first_seen(created).mark_partial());
    };

    let transactions: Vec<TxSummary> = entries
        .iter()
        .map(|tx| summarize(tx, account_id))
        .collect();
    let first_seen = created.or_else(|| oldest(transactions.iter().map(|tx| tx.timestamp)));

    Ok(account
        .with_tx_count(entries.len() as u64)
        .with_first_seen(first_seen)
        .with_transactions(transactions))
}

fn summarize(tx: &Value, account_id: &str) -> TxSummary {
    let transfers = tx
        .get("transfers")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let net: i128 = transfers
        .iter()
        .filter(|t| t.get("account").and_then(Value::as_str) == Some(account_id))
        .filter_map(|t| t.get("amount").and_then(Value::as_i64))
        .map(i128::from)
        .sum();

    // Payer is the account prefix of "0.0.123-1700000000-000000000"
    let from = tx
        .get("transaction_id")
        .and_then(Value::as_str)
        .and_then(|id| id.split('-').next())
        .unwrap_or("-")
        .to_string();
    // Largest credit that is not the payer
    let to = transfers
        .iter()
        .filter_map(|t| Some((display_str(t, "account"), t.get("amount")?.as_i64()?)))
        .filter(|(account, amount)| *amount > 0 && *account != from)
        .max_by_key(|(_, amount)| *amount)
        .map(|(account, _)| account)
        .unwrap_or_else(|| "-".to_string());

    TxSummary {
        hash: display_str(tx, "transaction_id"),
        timestamp: tx
            .get("consensus_timestamp")
            .and_then(Value::as_str)
            .and_then(parse_consensus_timestamp),
        from,
        to,
        value: format_signed(net, Chain::Hedera),
    }
}

pub async fn fetch_balances(http: &HttpClient, base_url: &str, account_id: &str) -> AppResult<FetchedAccount> {
    let doc = http
        .get_json(&format!("{}/balances?account.id={}", base_url, account_id))
        .await?;
    parse_balances(&doc)
}

/// `/balances?account.id=`; balance only, so always partial. An empty list
/// means the account does not exist yet.
pub fn parse_balances(doc: &Value) -> AppResult<FetchedAccount> {
    let entries = require(doc, "/balances")?
        .as_array()
        .ok_or_else(|| AppError::invalid_response("balances is not an array"))?;
    let balance = match entries.first() {
        Some(entry) => tinybar(require(entry, "/balance")?)?,
        None => Decimal::ZERO,
    };
    Ok(FetchedAccount::new(balance).mark_partial())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_account() {
        let doc = json!({
            "account": "0.0.1234",
            "balance": {"balance": 250_000_000u64, "timestamp": "1700000000.000000000"},
            "created_timestamp": "1568411616.448357000",
            "transactions": [
                {
                    "transaction_id": "0.0.1234-1700000000-000000001",
                    "consensus_timestamp": "1700000001.000000000",
                    "transfers": [
                        {"account": "0.0.1234", "amount": -100_000_000i64},
                        {"account": "0.0.98", "amount": 1_000i64},
                        {"account": "0.0.5678", "amount": 99_999_000i64}
                    ]
                }
            ]
        });
        let account = parse_account(&doc, "0.0.1234").unwrap();
        assert_eq!(account.balance, Decimal::new(25, 1));
        assert_eq!(account.tx_count, 1);
        assert_eq!(account.first_seen.unwrap().timestamp(), 1_568_411_616);

        let tx = &account.transactions[0];
        assert_eq!(tx.from, "0.0.1234");
        assert_eq!(tx.to, "0.0.5678");
        assert_eq!(tx.value, "-1 HBAR");
        assert!(!account.partial);
    }

    #[test]
    fn test_parse_account_requires_balance() {
        let err = parse_account(&json!({"_status": {"messages": [{"message": "Not found"}]}}), "0.0.1")
            .unwrap_err();
        assert!(err.message.contains("balance/balance"));
    }

    #[test]
    fn test_parse_balances() {
        let doc = json!({"timestamp": "1700000000.0", "balances": [{"account": "0.0.1234", "balance": 100_000_000u64, "tokens": []}]});
        let account = parse_balances(&doc).unwrap();
        assert_eq!(account.balance, Decimal::ONE);
        assert!(account.partial);

        let empty = parse_balances(&json!({"balances": []})).unwrap();
        assert_eq!(empty.balance, Decimal::ZERO);
    }
}
