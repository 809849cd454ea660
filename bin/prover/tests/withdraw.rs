//! Integration tests for the withdraw action.

use crate::setup::{load_test_config, setup_provider};
use action::{
    withdraw::{Withdraw, WithdrawAction},
    Action,
};
use alloy_primitives::{Address, Bytes, U256};
use binding::rollup::MESSAGE_PASSER_ADDRESS;

#[path = "setup.rs"]
mod setup;

fn create_test_withdrawal(source: Address, target: Address) -> Withdraw {
    Withdraw {
        contract: MESSAGE_PASSER_ADDRESS,
        source,
        target,
        value: U256::from(1_000_000),
        gas_limit: U256::from(200_000),
        data: Bytes::new(),
        tx_hash: None,
    }
}

/// Readiness requires a nonzero value, a nonzero target, and enough balance.
#[tokio::test]
#[ignore = "requires live L2 RPC from tests/test-config.toml"]
async fn test_withdraw_action_validation() {
    let config = load_test_config();
    let provider = setup_provider(&config.l2_rpc_url).await;

    let valid = create_test_withdrawal(config.eoa_address, config.eoa_address);
    let action = WithdrawAction::new(provider.clone(), valid);
    let ready = action
        .is_ready()
        .await
        .expect("Failed to check is_ready for valid config");
    assert!(ready);

    // Zero target is never ready
    let mut invalid = create_test_withdrawal(config.eoa_address, Address::ZERO);
    let action = WithdrawAction::new(provider.clone(), invalid.clone());
    let ready = action.is_ready().await.expect("Failed to check is_ready");
    assert!(!ready);

    // Zero value is never ready
    invalid.value = U256::ZERO;
    invalid.target = config.eoa_address;
    let action = WithdrawAction::new(provider, invalid);
    let ready = action.is_ready().await.expect("Failed to check is_ready");
    assert!(!ready);
}

/// An action without an execution transaction hash is never completed.
#[tokio::test]
#[ignore = "requires live L2 RPC from tests/test-config.toml"]
async fn test_withdraw_action_not_completed_before_execution() {
    let config = load_test_config();
    let provider = setup_provider(&config.l2_rpc_url).await;

    let withdraw = create_test_withdrawal(config.eoa_address, config.eoa_address);
    let action = WithdrawAction::new(provider, withdraw);

    let completed = action
        .is_completed()
        .await
        .expect("Failed to check is_completed");
    assert!(!completed);
}
