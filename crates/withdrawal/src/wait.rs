//! Finalization waiting for L2→L1 withdrawals.
//!
//! A withdrawal can only be proven against an output root the proposer has
//! published, and only finalized once the dispute window after that output's
//! L1 timestamp has elapsed. [`wait_for_finalization`] blocks cooperatively
//! through both conditions: it rounds the withdrawal's L2 block up to the
//! oracle's next submission boundary, polls until an output covering that
//! boundary exists, then waits out the finalization period against L1 block
//! time rather than the local clock alone.
//!
//! Every suspension point races against the caller's [`CancellationToken`],
//! so the wait can be abandoned without leaking a polling timer.

use crate::error::{Phase, WithdrawalError};
use alloy_contract::private::Provider;
use alloy_primitives::{Address, B256, U256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::rollup::{IL2OutputOracle, IOptimismPortal};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Poll cadence while the proposer is still far from the target boundary.
const COARSE_POLL: Duration = Duration::from_secs(60);

/// Poll cadence once the proposer is close, and for L1 header polling.
const FINE_POLL: Duration = Duration::from_secs(1);

/// Gap (in L2 blocks) above which the coarse cadence is used.
const COARSE_GAP_BLOCKS: u64 = 10;

/// Round an L2 block number up to the next submission-interval boundary.
///
/// Outputs are only proposed at `startingBlockNumber + k * SUBMISSION_INTERVAL`,
/// so this is the lowest block number at or after `l2_block_number` for which
/// an output can ever exist. Rounds up only when the division leaves a
/// nonzero remainder; a block already on a boundary maps to itself.
pub fn next_submission_boundary(
    starting_block_number: U256,
    submission_interval: U256,
    l2_block_number: U256,
) -> U256 {
    if submission_interval.is_zero() {
        return l2_block_number;
    }

    let delta = l2_block_number.saturating_sub(starting_block_number);
    let (mut intervals, rem) = delta.div_rem(submission_interval);
    if !rem.is_zero() {
        intervals += U256::from(1);
    }

    starting_block_number + intervals * submission_interval
}

/// Choose the publication poll cadence from the remaining block gap.
fn publication_poll_interval(boundary: U256, latest: U256) -> Duration {
    if boundary.saturating_sub(latest) > U256::from(COARSE_GAP_BLOCKS) {
        COARSE_POLL
    } else {
        FINE_POLL
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Wait until the output covering `l2_block_number` is published and its
/// finalization period has elapsed.
///
/// Resolves the oracle through the portal's `L2_ORACLE()`, rounds the block
/// to the next submission boundary, polls `latestBlockNumber()` until the
/// boundary is covered, fetches the output proposal, then sleeps until
/// `output.timestamp + FINALIZATION_PERIOD_SECONDS` and polls L1 headers
/// until one's timestamp strictly exceeds that target (the chain's clock is
/// authoritative, not ours).
///
/// Returns the rounded boundary block number; fetch the L2 header at that
/// block to assemble the proof. Cancelling `cancel` aborts the wait at the
/// next suspension point with [`WithdrawalError::Cancelled`].
pub async fn wait_for_finalization<P>(
    l1_provider: &P,
    portal_address: Address,
    l2_block_number: u64,
    cancel: &CancellationToken,
) -> Result<u64, WithdrawalError>
where
    P: Provider + Clone,
{
    let oracle_query = |e| WithdrawalError::transport(Phase::OracleQuery, e);

    let portal = IOptimismPortal::new(portal_address, l1_provider);
    let oracle_address = portal.L2_ORACLE().call().await.map_err(oracle_query)?;
    let oracle = IL2OutputOracle::new(oracle_address, l1_provider);

    let submission_interval = oracle
        .SUBMISSION_INTERVAL()
        .call()
        .await
        .map_err(oracle_query)?;
    let starting_block_number = oracle
        .startingBlockNumber()
        .call()
        .await
        .map_err(oracle_query)?;
    let finalization_period = oracle
        .FINALIZATION_PERIOD_SECONDS()
        .call()
        .await
        .map_err(oracle_query)?;

    let boundary = next_submission_boundary(
        starting_block_number,
        submission_interval,
        U256::from(l2_block_number),
    );

    debug!(
        oracle = %oracle_address,
        submission_interval = %submission_interval,
        starting_block_number = %starting_block_number,
        l2_block = l2_block_number,
        boundary = %boundary,
        "Rounded withdrawal block to submission boundary"
    );

    // Phase: publication wait. Poll the oracle until the proposer has
    // submitted an output at or past the boundary.
    let mut latest = oracle
        .latestBlockNumber()
        .call()
        .await
        .map_err(|e| WithdrawalError::transport(Phase::PublicationWait, e))?;

    if latest < boundary {
        let mut ticker = time::interval(publication_poll_interval(boundary, latest));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick completes immediately; consume it so the
        // polls below are actually spaced out.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(WithdrawalError::Cancelled {
                        phase: Phase::PublicationWait,
                    });
                }
                _ = ticker.tick() => {
                    latest = oracle
                        .latestBlockNumber()
                        .call()
                        .await
                        .map_err(|e| WithdrawalError::transport(Phase::PublicationWait, e))?;
                    if latest >= boundary {
                        break;
                    }
                    debug!(latest = %latest, boundary = %boundary, "Output not yet published");
                }
            }
        }
    }

    // Phase: output retrieval. A zero root here means nothing was ever
    // proposed at this point, which is a different condition from "not yet
    // published" and will not resolve by waiting longer.
    let output = oracle
        .getL2OutputAfter(boundary)
        .call()
        .await
        .map_err(oracle_query)?;
    if output.outputRoot == B256::ZERO {
        return Err(WithdrawalError::EmptyOutputRoot {
            l2_block: boundary.saturating_to(),
        });
    }

    let output_timestamp = u64::try_from(output.timestamp).unwrap_or(u64::MAX);
    let target_timestamp =
        output_timestamp.saturating_add(finalization_period.saturating_to::<u64>());

    info!(
        boundary = %boundary,
        output_timestamp,
        target_timestamp,
        "Output published; waiting out finalization period"
    );

    // Phase: time wait. Sleep to the target on the local clock, then trust
    // only L1 header timestamps for the final call.
    let now = unix_now();
    if target_timestamp > now {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(WithdrawalError::Cancelled { phase: Phase::TimeWait });
            }
            () = time::sleep(Duration::from_secs(target_timestamp - now)) => {}
        }
    }

    let mut ticker = time::interval(FINE_POLL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(WithdrawalError::Cancelled { phase: Phase::TimeWait });
            }
            _ = ticker.tick() => {
                let header = l1_provider
                    .get_block_by_number(BlockNumberOrTag::Latest)
                    .await
                    .map_err(|e| WithdrawalError::transport(Phase::TimeWait, e))?
                    .ok_or_else(|| {
                        WithdrawalError::transport(
                            Phase::TimeWait,
                            "latest L1 block unavailable".to_string(),
                        )
                    })?
                    .header;

                // Strictly greater: guards against skew between our clock
                // and the chain's.
                if header.timestamp > target_timestamp {
                    return Ok(boundary.saturating_to());
                }
                debug!(
                    l1_timestamp = header.timestamp,
                    target_timestamp,
                    "Finalization period not yet elapsed on L1"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_rounds_up_to_next_interval() {
        // startingBlockNumber=0, submissionInterval=10, block 23 -> 30
        let boundary =
            next_submission_boundary(U256::ZERO, U256::from(10), U256::from(23));
        assert_eq!(boundary, U256::from(30));
    }

    #[test]
    fn test_boundary_on_interval_maps_to_itself() {
        let boundary =
            next_submission_boundary(U256::ZERO, U256::from(10), U256::from(30));
        assert_eq!(boundary, U256::from(30));
    }

    #[test]
    fn test_boundary_at_starting_block() {
        let boundary =
            next_submission_boundary(U256::from(100), U256::from(10), U256::from(100));
        assert_eq!(boundary, U256::from(100));
    }

    #[test]
    fn test_boundary_with_nonzero_start() {
        // start=5, interval=10: boundaries are 5, 15, 25, ...
        let boundary =
            next_submission_boundary(U256::from(5), U256::from(10), U256::from(17));
        assert_eq!(boundary, U256::from(25));
    }

    #[test]
    fn test_boundary_properties_exhaustive() {
        let start = U256::from(7);
        let interval = U256::from(12);

        for block in 7u64..=200 {
            let block = U256::from(block);
            let boundary = next_submission_boundary(start, interval, block);

            assert!(boundary >= block, "boundary below target block");
            assert!(
                boundary < block + interval,
                "boundary further than one interval away"
            );
            assert_eq!(
                (boundary - start) % interval,
                U256::ZERO,
                "boundary not on an interval"
            );
        }
    }

    #[test]
    fn test_boundary_zero_interval_is_identity() {
        let boundary =
            next_submission_boundary(U256::ZERO, U256::ZERO, U256::from(42));
        assert_eq!(boundary, U256::from(42));
    }

    #[test]
    fn test_poll_cadence_selection() {
        // Large gap: poll coarsely. Small gap: poll every second.
        assert_eq!(
            publication_poll_interval(U256::from(1000), U256::from(0)),
            COARSE_POLL
        );
        assert_eq!(
            publication_poll_interval(U256::from(30), U256::from(25)),
            FINE_POLL
        );
        // Gap of exactly the threshold stays fine-grained.
        assert_eq!(
            publication_poll_interval(U256::from(10), U256::from(0)),
            FINE_POLL
        );
        // Boundary already covered.
        assert_eq!(
            publication_poll_interval(U256::from(10), U256::from(50)),
            FINE_POLL
        );
    }
}
