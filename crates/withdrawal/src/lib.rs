//! Core protocol logic for proving L2→L1 withdrawals.
//!
//! - [`hash`]: canonical ABI encoding, withdrawal hash, and storage slot
//!   derivations (must match the settlement contracts byte for byte)
//! - [`proof`]: assembles the parameter bundle for `proveWithdrawalTransaction`
//! - [`wait`]: blocks until an output covering a block is published and its
//!   finalization period has elapsed
//! - [`state`]: withdrawal status queries and event scanning
//! - [`error`]: transport vs. integrity vs. cancellation taxonomy

pub mod error;
pub mod hash;
pub mod proof;
pub mod state;
pub mod types;
pub mod wait;
