//! Fallback cascade and API tests against a local stub explorer

use axum::{
    extract::Json,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use wallet_sentry::api::{create_router, AppState};
use wallet_sentry::providers::http::HttpClient;
use wallet_sentry::{
    Chain, FallbackFetcher, FetchOutcome, LookupStatus, ProviderRegistry, SentryConfig,
    WalletInspector,
};
use wallet_sentry::providers::{Endpoint, Shape};

const BTC_ADDR: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
const SOL_ADDR: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
const EVM_ADDR: &str = "0xDE0B295669a9FD93d5F28D9Ec85E40f4cb697BAe";
const XRP_ADDR: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

/// Nothing listens on port 1
const DEAD_URL: &str = "http://127.0.0.1:1";

async fn solana_rpc(Json(req): Json<Value>) -> Json<Value> {
    let result = match req["method"].as_str() {
        Some("getBalance") => json!({"context": {"slot": 1}, "value": 2_500_000_000u64}),
        Some("getSignaturesForAddress") => json!([
            {"signature": "sig-new", "blockTime": 1_700_000_000, "err": null},
            {"signature": "sig-old", "blockTime": 1_600_000_000, "err": null}
        ]),
        _ => return Json(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "Method not found"}})),
    };
    Json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

fn evm_reply(req: &Value, balance: &str, nonce: &str) -> Json<Value> {
    let result = match req["method"].as_str() {
        Some("eth_getBalance") => balance,
        Some("eth_getTransactionCount") => nonce,
        _ => return Json(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "Method not found"}})),
    };
    Json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

/// Serves one broken and one healthy explorer of each stubbed shape
async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/broken/address/:address", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/good/address/:address",
            get(|| async {
                Json(json!({
                    "chain_stats": {"funded_txo_sum": 250_000_000u64, "spent_txo_sum": 50_000_000u64, "tx_count": 12},
                    "mempool_stats": {"funded_txo_sum": 0, "spent_txo_sum": 0, "tx_count": 0}
                }))
            }),
        )
        .route("/good/address/:address/txs", get(|| async { Json(json!([])) }))
        .route(
            "/nohistory/address/:address",
            get(|| async {
                Json(json!({
                    "chain_stats": {"funded_txo_sum": 300_000_000u64, "spent_txo_sum": 0, "tx_count": 4}
                }))
            }),
        )
        .route(
            "/nohistory/address/:address/txs",
            get(|| async { Json(json!({"error": "history index offline"})) }),
        )
        .route("/evm-empty", post(|Json(req): Json<Value>| async move { evm_reply(&req, "0x0", "0x0") }))
        .route(
            "/evm-funded",
            post(|Json(req): Json<Value>| async move { evm_reply(&req, "0xde0b6b3a7640000", "0x5") }),
        )
        .route("/evm-dust", post(|Json(req): Json<Value>| async move { evm_reply(&req, "0x0", "0x2") }))
        .route(
            "/rippled-busy",
            post(|| async {
                Json(json!({"result": {"error": "tooBusy", "error_code": 9, "status": "error"}}))
            }),
        )
        .route(
            "/xrpscan/account/:address",
            get(|| async {
                Json(json!({"account": XRP_ADDR, "xrpBalance": "19.5", "inception": "2018-01-02T03:04:05.000Z"}))
            }),
        )
        .route(
            "/xrpscan/account/:address/transactions",
            get(|| async {
                Json(json!([
                    {"hash": "XRP-TX-1", "date": "2024-03-01T10:00:00.000Z", "Account": XRP_ADDR, "Destination": "rDest", "Amount": "1000000"}
                ]))
            }),
        )
        .route("/rpc-broken", post(|| async { StatusCode::BAD_GATEWAY }))
        .route("/rpc", post(solana_rpc));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn fetcher(registry: ProviderRegistry) -> FallbackFetcher {
    FallbackFetcher::new(HttpClient::new(Duration::from_secs(2), 1).unwrap(), registry)
}

fn bitcoin_registry(base: &str) -> ProviderRegistry {
    ProviderRegistry::default().with_endpoints(
        Chain::Bitcoin,
        vec![
            Endpoint::new("broken", format!("{}/broken", base), Shape::Esplora),
            Endpoint::new("good", format!("{}/good", base), Shape::Esplora),
        ],
    )
}

#[tokio::test]
async fn test_failing_first_endpoint_is_skipped() {
    let base = spawn_stub().await;
    let outcome = fetcher(bitcoin_registry(&base)).fetch(Chain::Bitcoin, BTC_ADDR).await;

    match outcome {
        FetchOutcome::Found { account, source } => {
            assert_eq!(source, "good");
            assert_eq!(account.balance.to_string(), "2");
            assert_eq!(account.tx_count, 12);
            assert!(!account.partial);
        }
        FetchOutcome::Rejected { failures } => panic!("expected data, got {:?}", failures),
    }
}

#[tokio::test]
async fn test_solana_rpc_fallback() {
    let base = spawn_stub().await;
    let registry = ProviderRegistry::default().with_endpoints(
        Chain::Solana,
        vec![
            Endpoint::new("dead", DEAD_URL, Shape::SolanaRpc),
            Endpoint::new("broken", format!("{}/rpc-broken", base), Shape::SolanaRpc),
            Endpoint::new("stub", format!("{}/rpc", base), Shape::SolanaRpc),
        ],
    );

    let snapshot = fetcher(registry).fetch_snapshot(Chain::Solana, SOL_ADDR).await;
    assert_eq!(snapshot.status, LookupStatus::Ok);
    assert_eq!(snapshot.source.as_deref(), Some("stub"));
    assert_eq!(snapshot.balance.to_string(), "2.5");
    assert_eq!(snapshot.tx_count, 2);
    assert_eq!(snapshot.last_transactions[0].hash, "sig-new");
    assert!(snapshot.wallet_age_days > 0);
}

#[tokio::test]
async fn test_missing_history_keeps_balance_as_partial() {
    let base = spawn_stub().await;
    let registry = ProviderRegistry::default().with_endpoints(
        Chain::Bitcoin,
        vec![Endpoint::new("nohistory", format!("{}/nohistory", base), Shape::Esplora)],
    );

    match fetcher(registry).fetch(Chain::Bitcoin, BTC_ADDR).await {
        FetchOutcome::Found { account, source } => {
            assert_eq!(source, "nohistory");
            assert_eq!(account.balance.to_string(), "3");
            assert_eq!(account.tx_count, 4);
            assert!(account.partial);
            assert!(account.transactions.is_empty());
        }
        FetchOutcome::Rejected { failures } => panic!("expected data, got {:?}", failures),
    }
}

fn evm_registry(base: &str, ethereum: &str, base_chain: &str, bsc: &str) -> ProviderRegistry {
    let node = |path: &str| vec![Endpoint::new(path, format!("{}{}", base, path), Shape::EvmJsonRpc)];
    ProviderRegistry::default()
        .with_endpoints(Chain::Ethereum, node(ethereum))
        .with_endpoints(Chain::Base, node(base_chain))
        .with_endpoints(Chain::Bsc, node(bsc))
}

#[tokio::test]
async fn test_evm_picks_active_network_over_ethereum() {
    let base = spawn_stub().await;
    let registry = evm_registry(&base, "/evm-empty", "/evm-funded", "/evm-empty");

    let snapshot = WalletInspector::new(fetcher(registry)).inspect(EVM_ADDR).await;
    assert_eq!(snapshot.chain, Some(Chain::Base));
    assert_eq!(snapshot.source.as_deref(), Some("/evm-funded"));
    assert_eq!(snapshot.status, LookupStatus::Partial);
    assert_eq!(snapshot.balance.to_string(), "1");
    assert_eq!(snapshot.tx_count, 5);
    assert!(snapshot.also_active_on.is_empty());
}

#[tokio::test]
async fn test_evm_reports_other_active_networks() {
    let base = spawn_stub().await;
    let registry = evm_registry(&base, "/evm-dust", "/evm-funded", "/evm-missing");

    let snapshot = WalletInspector::new(fetcher(registry)).inspect(EVM_ADDR).await;
    assert_eq!(snapshot.chain, Some(Chain::Base));
    assert_eq!(snapshot.also_active_on, vec![Chain::Ethereum]);
    assert!(snapshot.risk_reasons.iter().any(|r| r == "Also active on Ethereum"));
}

#[tokio::test]
async fn test_xrp_falls_back_to_xrpscan() {
    let base = spawn_stub().await;
    let registry = ProviderRegistry::default().with_endpoints(
        Chain::Xrp,
        vec![
            Endpoint::new("rippled", format!("{}/rippled-busy", base), Shape::Rippled),
            Endpoint::new("xrpscan", format!("{}/xrpscan", base), Shape::XrpScan),
        ],
    );

    let snapshot = fetcher(registry).fetch_snapshot(Chain::Xrp, XRP_ADDR).await;
    assert_eq!(snapshot.status, LookupStatus::Ok);
    assert_eq!(snapshot.source.as_deref(), Some("xrpscan"));
    assert_eq!(snapshot.balance.to_string(), "19.5");
    assert_eq!(snapshot.tx_count, 1);
    assert_eq!(snapshot.last_transactions[0].hash, "XRP-TX-1");
    assert!(snapshot.wallet_age_days > 365);
}

#[tokio::test]
async fn test_all_endpoints_failing_gives_rejected_zero_snapshot() {
    let registry = ProviderRegistry::default().with_endpoints(
        Chain::Bitcoin,
        vec![
            Endpoint::new("dead-1", DEAD_URL, Shape::Esplora),
            Endpoint::new("dead-2", DEAD_URL, Shape::BlockCypher),
        ],
    );

    let snapshot = WalletInspector::new(fetcher(registry)).inspect(BTC_ADDR).await;
    assert_eq!(snapshot.status, LookupStatus::Rejected);
    assert_eq!(snapshot.chain, Some(Chain::Bitcoin));
    assert!(snapshot.balance.is_zero());
    assert_eq!(snapshot.tx_count, 0);
    assert!(snapshot.risk_reasons[0].contains("dead-1"));
    assert!(snapshot.risk_reasons[0].contains("dead-2"));
    assert_eq!(snapshot.risk_score, 70);
}

async fn spawn_api(base: &str) -> String {
    let inspector = WalletInspector::new(fetcher(bitcoin_registry(base)));
    let state = Arc::new(AppState::new(inspector, &SentryConfig::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_api_lookup_cache_and_export() {
    let stub = spawn_stub().await;
    let api = spawn_api(&stub).await;
    let client = reqwest::Client::new();

    let health: Value = client.get(format!("{}/health", api)).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["data"]["status"], "healthy");

    let empty = client
        .post(format!("{}/v1/wallet/check", api))
        .json(&json!({"address": "  "}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), 400);
    let body: Value = empty.json().await.unwrap();
    assert_eq!(body["error"]["code"], "API_BAD_REQUEST");

    let first: Value = client
        .post(format!("{}/v1/wallet/check", api))
        .json(&json!({"address": BTC_ADDR}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["success"], true);
    assert_eq!(first["data"]["chain"], "bitcoin");
    assert_eq!(first["data"]["source"], "good");
    assert_eq!(first["data"]["status"], "ok");

    let second: Value = client
        .get(format!("{}/v1/wallet/{}", api, BTC_ADDR))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["data"]["address"], BTC_ADDR);

    let invalid = client.get(format!("{}/v1/wallet/not-a-wallet", api)).send().await.unwrap();
    assert_eq!(invalid.status(), 200);
    let body: Value = invalid.json().await.unwrap();
    assert_eq!(body["data"]["status"], "invalid_format");

    let xml = client
        .get(format!("{}/v1/wallet/{}/iso20022", api, BTC_ADDR))
        .send()
        .await
        .unwrap();
    assert!(xml
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("application/xml")));
    assert!(xml.text().await.unwrap().contains(BTC_ADDR));

    let stats: Value = client.get(format!("{}/v1/stats", api)).send().await.unwrap().json().await.unwrap();
    assert_eq!(stats["data"]["lookups"]["total_lookups"], 4);
    assert_eq!(stats["data"]["lookups"]["cache_hits"], 2);
    assert_eq!(stats["data"]["lookups"]["invalid_format"], 1);
    assert_eq!(stats["data"]["lookups"]["by_chain"]["Bitcoin"], 3);
}
