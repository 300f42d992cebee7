//! Wallet Sentry HTTP API
//! REST lookups, ISO 20022 exports and service stats

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
