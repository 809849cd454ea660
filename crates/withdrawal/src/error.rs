//! Error taxonomy for withdrawal proving.
//!
//! Callers need to tell three situations apart: a transport failure (the RPC
//! call itself failed, may be retried at the next tick), an integrity failure
//! (the chain data contradicts our own computation, must abort), and
//! cancellation (the caller withdrew interest). "Output not yet published" is
//! not an error at all; the polling loops express it as loop state.

use alloy_primitives::B256;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which step of the prove/wait flow an error surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fetching the withdrawal transaction receipt from L2
    ReceiptLookup,
    /// Fetching the storage proof via eth_getProof
    ProofFetch,
    /// Reading the L1 output oracle or portal
    OracleQuery,
    /// Polling for the output to be published
    PublicationWait,
    /// Waiting out the finalization period against L1 block time
    TimeWait,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReceiptLookup => "receipt lookup",
            Self::ProofFetch => "proof fetch",
            Self::OracleQuery => "oracle query",
            Self::PublicationWait => "publication wait",
            Self::TimeWait => "time wait",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// An RPC call failed. Retryable at the caller's discretion.
    #[error("transport failure during {phase}: {source}")]
    Transport {
        phase: Phase,
        #[source]
        source: BoxError,
    },

    /// The transaction receipt does not exist on L2.
    #[error("no receipt found for transaction {tx_hash}")]
    ReceiptNotFound { tx_hash: B256 },

    /// The receipt carries no MessagePassed log.
    #[error("no MessagePassed event in receipt for transaction {tx_hash}")]
    MessageNotFound { tx_hash: B256 },

    /// A log carried the MessagePassed topic but failed to decode.
    #[error("malformed MessagePassed event in transaction {tx_hash}: {source}")]
    MalformedEvent {
        tx_hash: B256,
        #[source]
        source: BoxError,
    },

    /// The recomputed withdrawal hash does not match the emitted one.
    /// Indicates codec/ABI drift; never retried.
    #[error("withdrawal hash mismatch: computed {computed}, emitted {emitted}")]
    HashMismatch { computed: B256, emitted: B256 },

    /// eth_getProof returned no proof entry for the requested slot.
    #[error("no storage proof returned for slot {slot}")]
    MissingStorageProof { slot: B256 },

    /// The oracle has no proposal at the rounded boundary (zero output root).
    #[error("empty output root at L2 block {l2_block}: no proposal exists at that point")]
    EmptyOutputRoot { l2_block: u64 },

    /// The caller cancelled the wait.
    #[error("wait cancelled during {phase}")]
    Cancelled { phase: Phase },
}

impl WithdrawalError {
    /// Wrap an RPC failure with the phase it occurred in.
    pub fn transport(phase: Phase, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            phase,
            source: source.into(),
        }
    }

    /// True for failures that indicate bad or inconsistent data rather than
    /// a flaky connection. These must never be retried.
    pub const fn is_integrity(&self) -> bool {
        matches!(
            self,
            Self::ReceiptNotFound { .. }
                | Self::MessageNotFound { .. }
                | Self::MalformedEvent { .. }
                | Self::HashMismatch { .. }
                | Self::MissingStorageProof { .. }
        )
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
