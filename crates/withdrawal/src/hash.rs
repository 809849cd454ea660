//! Canonical withdrawal encoding and hash/slot derivations.
//!
//! The encoding must reproduce the settlement contract's own
//! `abi.encode(nonce, sender, target, nativeValue, ethValue, gasLimit, data)`
//! byte for byte. Any divergence in field order, width, or padding produces a
//! proof the L1 contract rejects, so everything here is pure and covered by
//! layout tests.

use crate::types::WithdrawalHash;
use alloy_primitives::{keccak256, B256};
use alloy_sol_types::SolValue;
use binding::rollup::{OutputRootProof, WithdrawalTransaction};

/// ABI-encode a withdrawal the way the portal's Hashing library does.
pub fn encode_withdrawal(tx: &WithdrawalTransaction) -> Vec<u8> {
    // abi_encode_sequence encodes the fields directly, without the extra
    // offset word a wrapped single-tuple encoding would prepend.
    (
        &tx.nonce,
        &tx.sender,
        &tx.target,
        &tx.nativeValue,
        &tx.ethValue,
        &tx.gasLimit,
        &tx.data,
    )
        .abi_encode_sequence()
}

/// keccak256 of the canonical withdrawal encoding.
///
/// Must equal the `withdrawalHash` the message passer emits alongside the
/// `MessagePassed` event.
pub fn compute_withdrawal_hash(tx: &WithdrawalTransaction) -> WithdrawalHash {
    keccak256(encode_withdrawal(tx))
}

/// Compute the storage slot recording a withdrawal in the message passer.
///
/// The storage layout is `mapping(bytes32 => bool) public sentMessages` at
/// slot 0, so the Solidity slot is `keccak256(withdrawalHash || bytes32(0))`.
pub fn compute_storage_slot(withdrawal_hash: WithdrawalHash) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[0..32].copy_from_slice(withdrawal_hash.as_slice());
    // preimage[32..64] stays zero (mapping is at slot 0)
    keccak256(preimage)
}

/// Compute an L2 output root from its four-field preimage.
///
/// `keccak256(version || stateRoot || messagePasserStorageRoot || latestBlockhash)`,
/// matching what the proposer commits to the oracle.
pub fn compute_output_root(proof: &OutputRootProof) -> B256 {
    let mut preimage = [0u8; 128];
    preimage[0..32].copy_from_slice(proof.version.as_slice());
    preimage[32..64].copy_from_slice(proof.stateRoot.as_slice());
    preimage[64..96].copy_from_slice(proof.messagePasserStorageRoot.as_slice());
    preimage[96..128].copy_from_slice(proof.latestBlockhash.as_slice());
    keccak256(preimage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, U256};

    fn sample_withdrawal() -> WithdrawalTransaction {
        WithdrawalTransaction {
            nonce: U256::from(27),
            sender: Address::from([0xaa; 20]),
            target: Address::from([0xbb; 20]),
            nativeValue: U256::ZERO,
            ethValue: U256::from(1_000_000_000_000_000_000u64),
            gasLimit: U256::from(200_000),
            data: Bytes::new(),
        }
    }

    /// Independently build abi.encode(nonce, sender, target, nativeValue,
    /// ethValue, gasLimit, data) for empty calldata: six value words, the
    /// offset word for `bytes` (7 * 32 = 0xe0), then a zero length word.
    fn manual_encoding(tx: &WithdrawalTransaction) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.extend_from_slice(&tx.nonce.to_be_bytes::<32>());
        out.extend_from_slice(&[0u8; 12]);
        out.extend_from_slice(tx.sender.as_slice());
        out.extend_from_slice(&[0u8; 12]);
        out.extend_from_slice(tx.target.as_slice());
        out.extend_from_slice(&tx.nativeValue.to_be_bytes::<32>());
        out.extend_from_slice(&tx.ethValue.to_be_bytes::<32>());
        out.extend_from_slice(&tx.gasLimit.to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(224).to_be_bytes::<32>());
        out.extend_from_slice(&U256::ZERO.to_be_bytes::<32>());
        out
    }

    #[test]
    fn test_encoding_matches_abi_layout() {
        let tx = sample_withdrawal();
        let encoded = encode_withdrawal(&tx);
        assert_eq!(encoded.len(), 256);
        assert_eq!(encoded, manual_encoding(&tx));
    }

    #[test]
    fn test_hash_matches_manual_encoding() {
        let tx = sample_withdrawal();
        let hash = compute_withdrawal_hash(&tx);
        assert_eq!(hash, keccak256(manual_encoding(&tx)));

        let slot = compute_storage_slot(hash);
        let mut preimage = [0u8; 64];
        preimage[0..32].copy_from_slice(hash.as_slice());
        assert_eq!(slot, keccak256(preimage));
    }

    #[test]
    fn test_hash_deterministic() {
        let tx = sample_withdrawal();
        assert_eq!(compute_withdrawal_hash(&tx), compute_withdrawal_hash(&tx));
        assert_ne!(compute_withdrawal_hash(&tx), B256::ZERO);
    }

    #[test]
    fn test_hash_sensitive_to_every_field() {
        let base = sample_withdrawal();
        let base_hash = compute_withdrawal_hash(&base);

        let mut changed = base.clone();
        changed.nonce = U256::from(28);
        assert_ne!(compute_withdrawal_hash(&changed), base_hash);

        let mut changed = base.clone();
        changed.nativeValue = U256::from(1);
        assert_ne!(compute_withdrawal_hash(&changed), base_hash);

        let mut changed = base.clone();
        changed.ethValue = U256::from(1);
        assert_ne!(compute_withdrawal_hash(&changed), base_hash);

        // Swapping the two value fields must change the hash: the encoding
        // is order-sensitive.
        let mut swapped = base.clone();
        std::mem::swap(&mut swapped.nativeValue, &mut swapped.ethValue);
        assert_ne!(compute_withdrawal_hash(&swapped), base_hash);

        let mut changed = base;
        changed.data = Bytes::from(vec![0x01]);
        assert_ne!(compute_withdrawal_hash(&changed), base_hash);
    }

    #[test]
    fn test_storage_slot_is_pure_in_the_hash() {
        // The slot depends only on the 32-byte hash, never on the message
        // fields that produced it.
        let hash = B256::from([0x12; 32]);
        assert_eq!(compute_storage_slot(hash), compute_storage_slot(hash));

        let other = B256::from([0x13; 32]);
        assert_ne!(compute_storage_slot(hash), compute_storage_slot(other));
    }

    #[test]
    fn test_storage_slot_zero_hash() {
        // keccak256 of 64 zero bytes
        assert_eq!(compute_storage_slot(B256::ZERO), keccak256([0u8; 64]));
    }

    #[test]
    fn test_output_root_preimage_order() {
        let proof = OutputRootProof {
            version: B256::ZERO,
            stateRoot: B256::from([0x01; 32]),
            messagePasserStorageRoot: B256::from([0x02; 32]),
            latestBlockhash: B256::from([0x03; 32]),
        };

        let mut preimage = Vec::with_capacity(128);
        preimage.extend_from_slice(&[0u8; 32]);
        preimage.extend_from_slice(&[0x01; 32]);
        preimage.extend_from_slice(&[0x02; 32]);
        preimage.extend_from_slice(&[0x03; 32]);

        assert_eq!(compute_output_root(&proof), keccak256(preimage));

        // Swapping state root and storage root must change the commitment.
        let swapped = OutputRootProof {
            version: B256::ZERO,
            stateRoot: B256::from([0x02; 32]),
            messagePasserStorageRoot: B256::from([0x01; 32]),
            latestBlockhash: B256::from([0x03; 32]),
        };
        assert_ne!(compute_output_root(&proof), compute_output_root(&swapped));
    }
}
