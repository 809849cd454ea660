//! Proof assembly for L2→L1 withdrawals.
//!
//! Given the hash of the L2 transaction that initiated a withdrawal and an L2
//! header covered by a submitted output root, this module gathers everything
//! `proveWithdrawalTransaction` needs: the decoded withdrawal, the output
//! index covering the header, the output root preimage, and the storage
//! proof for the withdrawal's slot in the message passer.

use crate::{
    error::{Phase, WithdrawalError},
    hash::{compute_storage_slot, compute_withdrawal_hash},
    types::WithdrawalHash,
};
use alloy_contract::private::Provider;
use alloy_primitives::{Address, Bytes, Log, TxHash, U256};
use alloy_rpc_types_eth::{BlockNumberOrTag, Header};
use alloy_sol_types::SolEvent;
use binding::rollup::{
    IL2OutputOracle, IL2ToL1MessagePasser::MessagePassed, OutputRootProof, WithdrawalTransaction,
    OUTPUT_VERSION_V0,
};
use tracing::debug;

/// Parameters required to prove (and later finalize) a withdrawal on L1.
///
/// Assembled once per withdrawal; the same bundle is passed unchanged to
/// `proveWithdrawalTransaction` and `finalizeWithdrawalTransaction`.
#[derive(Debug, Clone)]
pub struct ProvenWithdrawalParameters {
    pub withdrawal: WithdrawalTransaction,
    pub withdrawal_hash: WithdrawalHash,
    pub l2_output_index: U256,
    pub output_root_proof: OutputRootProof,
    pub withdrawal_proof: Vec<Bytes>,
}

/// Query L1 and L2 to generate all parameters needed to prove a withdrawal.
///
/// The header matters: it must be an L2 block for which an output has been
/// (or will be) submitted to the oracle, otherwise the storage proof cannot
/// be verified against any committed state root. Use
/// [`crate::wait::wait_for_finalization`] to obtain such a block number.
///
/// # Arguments
/// * `l1_provider` - Provider for the L1 chain (oracle queries)
/// * `l2_provider` - Provider for the L2 chain (receipt, storage proof)
/// * `oracle_address` - L2OutputOracle address on L1
/// * `message_passer_address` - L2ToL1MessagePasser predeploy address on L2
/// * `tx_hash` - Hash of the initiateWithdrawal transaction on L2
/// * `header` - L2 header at which the storage proof is taken
pub async fn prove_withdrawal_parameters<P1, P2>(
    l1_provider: &P1,
    l2_provider: &P2,
    oracle_address: Address,
    message_passer_address: Address,
    tx_hash: TxHash,
    header: &Header,
) -> Result<ProvenWithdrawalParameters, WithdrawalError>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    let receipt = l2_provider
        .get_transaction_receipt(tx_hash)
        .await
        .map_err(|e| WithdrawalError::transport(Phase::ReceiptLookup, e))?
        .ok_or(WithdrawalError::ReceiptNotFound { tx_hash })?;

    let (withdrawal, withdrawal_hash) =
        extract_message_passed(receipt.logs().iter().map(|log| &log.inner), tx_hash)?;

    debug!(
        %withdrawal_hash,
        nonce = %withdrawal.nonce,
        sender = %withdrawal.sender,
        target = %withdrawal.target,
        "Decoded withdrawal from receipt"
    );

    let storage_slot = compute_storage_slot(withdrawal_hash);

    debug!(
        block = header.number,
        slot = %storage_slot,
        "Fetching storage proof for withdrawal slot"
    );
    let proof_result = l2_provider
        .get_proof(message_passer_address, vec![storage_slot])
        .block_id(BlockNumberOrTag::Number(header.number).into())
        .await
        .map_err(|e| WithdrawalError::transport(Phase::ProofFetch, e))?;

    let withdrawal_proof = proof_result
        .storage_proof
        .first()
        .ok_or(WithdrawalError::MissingStorageProof { slot: storage_slot })?
        .proof
        .clone();

    let oracle = IL2OutputOracle::new(oracle_address, l1_provider);
    let l2_output_index = oracle
        .getL2OutputIndexAfter(U256::from(header.number))
        .call()
        .await
        .map_err(|e| WithdrawalError::transport(Phase::OracleQuery, e))?;

    debug!(
        l2_output_index = %l2_output_index,
        proof_nodes = withdrawal_proof.len(),
        storage_root = %proof_result.storage_hash,
        "Assembled withdrawal proof"
    );

    Ok(ProvenWithdrawalParameters {
        withdrawal,
        withdrawal_hash,
        l2_output_index,
        output_root_proof: OutputRootProof {
            version: OUTPUT_VERSION_V0,
            stateRoot: header.state_root,
            messagePasserStorageRoot: proof_result.storage_hash,
            latestBlockhash: header.hash,
        },
        withdrawal_proof,
    })
}

/// Find and decode the single MessagePassed log in a receipt's logs, then
/// cross-check the emitted withdrawal hash against our own computation.
///
/// Multiple withdrawals per transaction are not supported; the first
/// matching log wins.
fn extract_message_passed<'a>(
    logs: impl IntoIterator<Item = &'a Log>,
    tx_hash: TxHash,
) -> Result<(WithdrawalTransaction, WithdrawalHash), WithdrawalError> {
    for log in logs {
        if log.topics().first() != Some(&MessagePassed::SIGNATURE_HASH) {
            continue;
        }

        let event = MessagePassed::decode_log(log)
            .map_err(|source| WithdrawalError::MalformedEvent {
                tx_hash,
                source: source.into(),
            })?
            .data;

        let withdrawal = WithdrawalTransaction {
            nonce: event.nonce,
            sender: event.sender,
            target: event.target,
            nativeValue: event.nativeValue,
            ethValue: event.ethValue,
            gasLimit: event.gasLimit,
            data: event.data,
        };

        // The emitted hash is a consistency check, not a derivation: a
        // mismatch means our encoding diverged from the contract's and any
        // proof built from it would be rejected on L1.
        let computed = compute_withdrawal_hash(&withdrawal);
        if computed != event.withdrawalHash {
            return Err(WithdrawalError::HashMismatch {
                computed,
                emitted: event.withdrawalHash,
            });
        }

        return Ok((withdrawal, computed));
    }

    Err(WithdrawalError::MessageNotFound { tx_hash })
}
