//! Orchestration flows for the withdrawal prover binary.
//!
//! Glues the scanning, proving, waiting, and finalizing pieces together for
//! the CLI. All protocol logic lives in the `withdrawal` crate; this layer
//! only sequences actions and records metrics.

pub mod config;
pub mod metrics;

use action::{
    finalize::{Finalize, FinalizeAction},
    prove::{Prove, ProveAction},
    Action, SignerFn,
};
use crate::{config::Config, metrics::Metrics};
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use withdrawal::{
    state::{PendingWithdrawal, WithdrawalStateProvider},
    types::WithdrawalStatus,
    wait::wait_for_finalization,
};

/// Scan a block range for pending withdrawals belonging to anyone.
pub async fn scan_pending_withdrawals<P1, P2>(
    l1_provider: P1,
    l2_provider: P2,
    cfg: &Config,
    from_block: u64,
    to_block: BlockNumberOrTag,
) -> eyre::Result<Vec<PendingWithdrawal>>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    let network = cfg.network_config();
    let state = WithdrawalStateProvider::new(
        l1_provider,
        l2_provider,
        network.ethereum.portal,
        network.rollup.message_passer,
    );

    state
        .get_pending_withdrawals(BlockNumberOrTag::Number(from_block), to_block)
        .await
}

/// Process every pending withdrawal in the range: prove the initiated ones
/// whose output is published, finalize the proven ones past their window.
pub async fn process_pending_withdrawals<P1, P2>(
    l1_provider: P1,
    l2_provider: P2,
    signer: SignerFn,
    cfg: &Config,
    from_block: u64,
) -> eyre::Result<()>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    let network = cfg.network_config();
    let metrics = Metrics::new();

    let withdrawals = scan_pending_withdrawals(
        l1_provider.clone(),
        l2_provider.clone(),
        cfg,
        from_block,
        BlockNumberOrTag::Latest,
    )
    .await?;

    metrics.record_scanned(withdrawals.len());
    info!(count = withdrawals.len(), "Found pending withdrawals");

    for withdrawal in withdrawals {
        match withdrawal.status {
            WithdrawalStatus::Initiated => {
                let prove = Prove {
                    portal_address: network.ethereum.portal,
                    oracle_address: network.ethereum.output_oracle,
                    message_passer_address: network.rollup.message_passer,
                    l2_tx_hash: withdrawal.l2_tx_hash,
                    withdrawal: withdrawal.transaction.clone(),
                    withdrawal_hash: withdrawal.hash,
                    l2_block: withdrawal.l2_block,
                    from: cfg.eoa_address,
                };
                let mut action = ProveAction::new(
                    l1_provider.clone(),
                    l2_provider.clone(),
                    signer.clone(),
                    prove,
                );

                if !action.is_ready().await? {
                    info!(hash = %withdrawal.hash, "Not ready to prove (output not yet published)");
                    continue;
                }
                if cfg.dry_run {
                    info!(action = %action.description(), "Dry-run: skipping execution");
                    continue;
                }
                match action.execute().await {
                    Ok(result) => {
                        metrics.record_proven();
                        info!(tx_hash = %result.tx_hash, hash = %withdrawal.hash, "Proved withdrawal");
                    }
                    Err(e) => {
                        metrics.record_prove_failure();
                        warn!(hash = %withdrawal.hash, error = %e, "Prove failed");
                    }
                }
            }
            WithdrawalStatus::Proven { .. } => {
                let finalize = Finalize {
                    portal_address: network.ethereum.portal,
                    oracle_address: network.ethereum.output_oracle,
                    withdrawal: withdrawal.transaction.clone(),
                    withdrawal_hash: withdrawal.hash,
                    from: cfg.eoa_address,
                };
                let mut action = FinalizeAction::new(
                    l1_provider.clone(),
                    l2_provider.clone(),
                    signer.clone(),
                    finalize,
                );

                if !action.is_ready().await? {
                    info!(hash = %withdrawal.hash, "Not ready to finalize (window not elapsed)");
                    continue;
                }
                if cfg.dry_run {
                    info!(action = %action.description(), "Dry-run: skipping execution");
                    continue;
                }
                match action.execute().await {
                    Ok(result) => {
                        metrics.record_finalized();
                        info!(tx_hash = %result.tx_hash, hash = %withdrawal.hash, "Finalized withdrawal");
                    }
                    Err(e) => {
                        metrics.record_finalize_failure();
                        warn!(hash = %withdrawal.hash, error = %e, "Finalize failed");
                    }
                }
            }
            WithdrawalStatus::Finalized => {}
        }
    }

    Ok(())
}

/// Block until the output covering `l2_block` is published and finalized.
///
/// Returns the submission boundary block number the proof should be taken
/// at. Cancelling the token aborts the wait.
pub async fn wait_until_finalizable<P>(
    l1_provider: &P,
    cfg: &Config,
    l2_block: u64,
    cancel: &CancellationToken,
) -> eyre::Result<u64>
where
    P: Provider + Clone,
{
    let network = cfg.network_config();
    let metrics = Metrics::new();

    let started = Instant::now();
    let boundary =
        wait_for_finalization(l1_provider, network.ethereum.portal, l2_block, cancel).await?;
    metrics.record_finalization_wait(started.elapsed());

    Ok(boundary)
}
