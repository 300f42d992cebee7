//! Providers Module - External Data Sources
//!
//! Block-explorer clients: one shared HTTP client, a per-chain endpoint
//! registry, the fallback cascade and one adapter module per chain family.

pub mod bitcoin;
pub mod evm;
pub mod fallback;
pub mod hedera;
pub mod http;
pub mod json;
pub mod registry;
pub mod solana;
pub mod tron;
pub mod xrp;

pub use fallback::{FallbackFetcher, FetchOutcome};
pub use http::HttpClient;
pub use registry::{Endpoint, ProviderRegistry, Shape};
