//! Wallet Sentry CLI
//!
//! Looks up one address and prints its risk snapshot.
//!
//! Usage:
//!   wallet_sentry <address> [--format text|json|xml]

use clap::{Parser, ValueEnum};
use eyre::Result;
use tracing_subscriber::EnvFilter;
use wallet_sentry::{generate_iso_xml, SentryConfig, WalletInspector, WalletSnapshot};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Xml,
}

/// Multi-chain wallet risk lookup
#[derive(Debug, Parser)]
#[command(name = "wallet_sentry", version, about)]
struct Cli {
    /// Wallet address (EVM, Bitcoin, TRON, XRP, Solana or Hedera)
    address: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so json/xml output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = SentryConfig::from_env()?;
    let inspector = WalletInspector::from_config(&config)?;
    let snapshot = inspector.inspect(&cli.address).await;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Xml => println!("{}", generate_iso_xml(&snapshot, &cli.address, chrono::Utc::now())),
        OutputFormat::Text => print_report(&snapshot),
    }

    // Non-zero exit for invalid input or unreachable explorers
    match snapshot.failure() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_report(s: &WalletSnapshot) {
    println!();
    println!("🔎 Wallet Sentry Report");
    println!("   Address:   {}", s.address);
    println!("   Chain:     {} ({})", s.chain_name, s.family.as_str());
    println!("   Status:    {}", s.status.as_str());
    if let Some(source) = &s.source {
        println!("   Source:    {}", source);
    }
    println!("   Balance:   {}", s.display_balance());
    println!("   Tx count:  {}", s.tx_count);
    println!("   Age:       {} days", s.wallet_age_days);
    println!();
    println!(
        "{} Risk Score: {}/100 ({})",
        s.risk_level.emoji(),
        s.risk_score,
        s.risk_level.as_str()
    );
    for reason in &s.risk_reasons {
        println!("   • {}", reason);
    }

    if !s.last_transactions.is_empty() {
        println!();
        println!("🧾 Last transactions:");
        for tx in &s.last_transactions {
            let when = tx
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("   {}  {}  {} → {}  {}", when, tx.hash, tx.from, tx.to, tx.value);
        }
    }
    println!();
}
