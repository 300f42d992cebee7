//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, unit conversion, the snapshot cache and lookup telemetry.

pub mod cache;
pub mod constants;
pub mod telemetry;
pub mod units;

pub use cache::*;
pub use constants::*;
pub use telemetry::*;
pub use units::*;
