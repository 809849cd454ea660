//! Prove withdrawal action.
//!
//! Submits a proof to L1 that a withdrawal was initiated on L2. The proof is
//! taken against the submission-interval boundary covering the withdrawal's
//! L2 block, so the action only becomes ready once the oracle has an output
//! at or past that boundary.

use crate::{Action, SignerFn};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::rollup::{IL2OutputOracle, IOptimismPortal, WithdrawalTransaction};
use tracing::info;
use withdrawal::{
    proof::prove_withdrawal_parameters, state::WithdrawalStateProvider, types::WithdrawalHash,
    wait::next_submission_boundary,
};

/// Input data for proving a withdrawal on L1.
#[derive(Clone, Debug)]
pub struct Prove {
    /// OptimismPortal contract address on L1
    pub portal_address: Address,
    /// L2OutputOracle contract address on L1
    pub oracle_address: Address,
    /// L2ToL1MessagePasser predeploy address on L2
    pub message_passer_address: Address,
    /// Transaction hash of the initiateWithdrawal call on L2
    pub l2_tx_hash: alloy_primitives::TxHash,
    /// The withdrawal transaction details
    pub withdrawal: WithdrawalTransaction,
    /// Hash of the withdrawal
    pub withdrawal_hash: WithdrawalHash,
    /// L2 block number where the withdrawal was initiated
    pub l2_block: u64,
    /// Address that will submit the proof transaction
    pub from: Address,
}

/// Action to prove a withdrawal on L1.
pub struct ProveAction<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    signer: SignerFn,
    action: Prove,
}

impl<P1, P2> ProveAction<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub fn new(l1_provider: P1, l2_provider: P2, signer: SignerFn, action: Prove) -> Self {
        Self {
            l1_provider,
            l2_provider,
            signer,
            action,
        }
    }

    /// Get the withdrawal hash for this action.
    pub const fn withdrawal_hash(&self) -> WithdrawalHash {
        self.action.withdrawal_hash
    }

    async fn check_is_proven(&self) -> eyre::Result<bool> {
        let state = WithdrawalStateProvider::new(
            self.l1_provider.clone(),
            self.l2_provider.clone(),
            self.action.portal_address,
            self.action.message_passer_address,
        );

        let proven = state.is_proven(self.action.withdrawal_hash).await?;

        Ok(proven.is_some())
    }

    /// Boundary block the proof must be taken at: the first
    /// submission-interval multiple at or after the withdrawal's block.
    async fn proof_boundary(&self) -> eyre::Result<U256> {
        let oracle = IL2OutputOracle::new(self.action.oracle_address, &self.l1_provider);
        let submission_interval = oracle.SUBMISSION_INTERVAL().call().await?;
        let starting_block_number = oracle.startingBlockNumber().call().await?;

        Ok(next_submission_boundary(
            starting_block_number,
            submission_interval,
            U256::from(self.action.l2_block),
        ))
    }

    /// True once the oracle has an output at or past the proof boundary.
    async fn output_published(&self) -> eyre::Result<bool> {
        let oracle = IL2OutputOracle::new(self.action.oracle_address, &self.l1_provider);
        let latest = oracle.latestBlockNumber().call().await?;
        Ok(latest >= self.proof_boundary().await?)
    }
}

impl<P1, P2> Action for ProveAction<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        if self.check_is_proven().await? {
            return Ok(false);
        }

        self.output_published().await
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        self.check_is_proven().await
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        if self.is_completed().await? {
            eyre::bail!("Withdrawal already proven")
        }

        let boundary = self.proof_boundary().await?;
        if !self.output_published().await? {
            eyre::bail!(
                "No output published covering L2 block {} (boundary {})",
                self.action.l2_block,
                boundary
            )
        }

        // The storage proof must be taken at the boundary block, the state
        // the proposer actually committed, not at the withdrawal's own block.
        let boundary_block: u64 = boundary.saturating_to();
        let block = self
            .l2_provider
            .get_block_by_number(BlockNumberOrTag::Number(boundary_block))
            .await?
            .ok_or_else(|| eyre::eyre!("L2 block not found: {}", boundary_block))?;

        info!(
            withdrawal_hash = %self.action.withdrawal_hash,
            l2_block = self.action.l2_block,
            boundary = boundary_block,
            "Generating withdrawal proof"
        );

        let params = prove_withdrawal_parameters(
            &self.l1_provider,
            &self.l2_provider,
            self.action.oracle_address,
            self.action.message_passer_address,
            self.action.l2_tx_hash,
            &block.header,
        )
        .await?;

        if params.withdrawal_hash != self.action.withdrawal_hash {
            eyre::bail!(
                "Assembled proof is for withdrawal {}, expected {}",
                params.withdrawal_hash,
                self.action.withdrawal_hash
            )
        }

        info!(
            l2_output_index = %params.l2_output_index,
            proof_nodes = params.withdrawal_proof.len(),
            "Proof generated, submitting to L1"
        );

        // Build the transaction request
        let portal = IOptimismPortal::new(self.action.portal_address, &self.l1_provider);
        let call = portal.proveWithdrawalTransaction(
            params.withdrawal,
            params.l2_output_index,
            params.output_root_proof,
            params.withdrawal_proof,
        );
        let tx_request = call.into_transaction_request().from(self.action.from);

        // Fill transaction fields (nonce, gas, fees) using our provider
        let filled_tx = client::fill_transaction(tx_request, &self.l1_provider).await?;

        // Sign externally
        let signed_tx = (self.signer)(filled_tx).await?;

        // Broadcast the signed transaction
        let pending = self.l1_provider.send_raw_transaction(&signed_tx).await?;
        let receipt = pending.get_receipt().await?;

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            withdrawal_hash = %self.action.withdrawal_hash,
            "Withdrawal proven on L1"
        );

        Ok(crate::Result {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!("Proving withdrawal {} on L1", self.action.withdrawal_hash)
    }
}
