use alloy_primitives::B256;

pub type WithdrawalHash = B256;

/// Lifecycle of a withdrawal as observed from chain state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalStatus {
    Initiated,
    Proven { timestamp: u64, l2_output_index: u64 },
    Finalized,
}
