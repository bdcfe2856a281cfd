//! Settle shared types
//!
//! Fixed-point decimals with truncating arithmetic, coin sets, and the
//! identifiers used by staking and distribution.

pub mod coins;
pub mod decimal;
pub mod errors;
pub mod ids;

pub use coins::*;
pub use decimal::*;
pub use errors::*;
pub use ids::*;

/// Default bond denomination.
pub const DEFAULT_BOND_DENOM: &str = "stake";
