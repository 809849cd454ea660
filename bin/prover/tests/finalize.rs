//! Integration tests for the finalize action.
//!
//! Exercises finalizing a proven withdrawal once the oracle's finalization
//! period has elapsed.

use crate::setup::{load_test_config, setup_provider, setup_signer};
use action::{
    finalize::{Finalize, FinalizeAction},
    Action,
};
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use withdrawal::{state::WithdrawalStateProvider, types::WithdrawalStatus};

#[path = "setup.rs"]
mod setup;

/// Test executing finalize action for a real proven withdrawal
///
/// This test:
/// 1. Scans L2 for pending withdrawals
/// 2. Picks the most recent proven withdrawal
/// 3. Creates a FinalizeAction and executes it if the window has elapsed
#[tokio::test]
#[ignore = "requires a proven withdrawal past its window and submits actual transaction"]
async fn test_finalize_action_execute() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = load_test_config();
    let network = config.network_config();

    println!("Testing finalize action execution");
    println!("L1 RPC: {}", config.l1_rpc_url);
    println!("L2 RPC: {}", config.l2_rpc_url);
    println!("Portal: {}", network.ethereum.portal);
    println!("EOA: {}", config.eoa_address);

    let l1_provider = setup_provider(&config.l1_rpc_url).await;
    let l2_provider = setup_provider(&config.l2_rpc_url).await;
    let signer = setup_signer(l1_provider.clone(), network.ethereum.chain_id);

    let state_provider = WithdrawalStateProvider::new(
        l1_provider.clone(),
        l2_provider.clone(),
        network.ethereum.portal,
        network.rollup.message_passer,
    );

    let current_block = l2_provider.get_block_number().await.unwrap();
    let from_block = current_block.saturating_sub(300_000);

    let withdrawals = state_provider
        .get_pending_withdrawals(
            BlockNumberOrTag::Number(from_block),
            BlockNumberOrTag::Latest,
        )
        .await
        .expect("Failed to scan withdrawals");

    println!("Found {} pending withdrawals", withdrawals.len());

    let proven_withdrawal = withdrawals
        .iter()
        .rev()
        .find(|w| matches!(w.status, WithdrawalStatus::Proven { .. }));

    let Some(withdrawal) = proven_withdrawal else {
        println!("⚠ No proven withdrawals found - cannot test finalize action");
        println!("  Prove a withdrawal first, then run this test");
        return;
    };

    println!("\nFinalizing withdrawal:");
    println!("  Hash: {}", withdrawal.hash);
    println!("  Status: {:?}", withdrawal.status);

    let finalize = Finalize {
        portal_address: network.ethereum.portal,
        oracle_address: network.ethereum.output_oracle,
        withdrawal: withdrawal.transaction.clone(),
        withdrawal_hash: withdrawal.hash,
        from: config.eoa_address,
    };

    let mut action = FinalizeAction::new(l1_provider, l2_provider, signer, finalize);

    println!("\nChecking if action is ready...");
    match action.is_ready().await {
        Ok(true) => println!("✓ Action is ready"),
        Ok(false) => {
            println!("✗ Action is not ready (finalization period not elapsed)");
            return;
        }
        Err(e) => {
            println!("✗ Failed to check readiness: {}", e);
            return;
        }
    }

    println!("\nExecuting finalize action...");
    let result = action
        .execute()
        .await
        .expect("Failed to execute finalize action");

    println!("✓ Successfully finalized withdrawal on L1!");
    println!("  Transaction hash: {}", result.tx_hash);
    println!("  Block number: {:?}", result.block_number);
    println!("  Gas used: {:?}", result.gas_used);

    let completed = action
        .is_completed()
        .await
        .expect("Failed to check completion");
    assert!(completed, "Action should be completed after execution");
    println!("✓ Withdrawal is now finalized on L1");
}
