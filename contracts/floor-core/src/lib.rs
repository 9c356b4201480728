#![no_std]

//! Floor/roof liquidity management for a token paired in a bin-based pool.
//!
//! The embedding token contract supplies its ledger through [`FloorLedger`]
//! and forwards its transfer lifecycle into [`hook::before_transfer`]. Every
//! other entry point lives in [`range`] (roof mutations) and [`rebalance`]
//! (floor advances).

pub mod accountant;
pub mod bin_math;
mod error;
pub mod guard;
pub mod hook;
mod ledger;
pub mod pool;
pub mod range;
pub mod rebalance;
pub mod solver;
pub mod storage;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use error::FloorError;
pub use ledger::FloorLedger;
pub use storage::FloorConfig;
