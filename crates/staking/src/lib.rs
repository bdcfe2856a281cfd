//! Settle staking view
//!
//! The subset of staking state the reward engine reads: validators with their
//! commission and probono rates, consensus-address lookups, the last-commit
//! vote list and token→power conversion.

pub mod errors;
pub mod migration;
pub mod params;
pub mod power;
pub mod registry;
pub mod validator;

pub use errors::*;
pub use migration::*;
pub use params::*;
pub use power::*;
pub use registry::*;
pub use validator::*;
