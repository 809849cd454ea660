//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity contract interfaces used across the
//! project:
//! - L2ToL1MessagePasser (L2 predeploy that records withdrawals)
//! - OptimismPortal (L1 contract for proving and finalizing withdrawals)
//! - L2OutputOracle (L1 contract that stores proposed output roots)
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod rollup;
