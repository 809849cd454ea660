//! Initiate withdrawal action.
//!
//! Calls `initiateWithdrawal` on the L2 message passer and reads the emitted
//! `MessagePassed` event back out of the receipt.

use crate::Action;
use alloy_primitives::{utils::format_ether, Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_sol_types::SolEvent;
use binding::rollup::{IL2ToL1MessagePasser, WithdrawalTransaction};
use tracing::info;
use withdrawal::types::WithdrawalHash;

/// Withdraw input data.
#[derive(Clone)]
pub struct Withdraw {
    /// L2ToL1MessagePasser predeploy address
    pub contract: Address,
    pub source: Address,
    pub target: Address,
    /// Amount of the native asset to withdraw (sent as msg.value)
    pub value: U256,
    pub gas_limit: U256,
    pub data: Bytes,
    /// Optional: only exists on initiated withdrawal
    /// transaction hash from execution
    pub tx_hash: Option<B256>,
}

pub struct WithdrawAction<P> {
    provider: P,
    action: Withdraw,
}

impl<P: Provider + Clone> WithdrawAction<P> {
    pub const fn new(provider: P, action: Withdraw) -> Self {
        Self { provider, action }
    }
}

impl<P> Action for WithdrawAction<P>
where
    P: Provider + Clone,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        if self.action.value == U256::ZERO {
            return Ok(false);
        }

        if self.action.target == Address::ZERO {
            return Ok(false);
        }

        let balance = self.provider.get_balance(self.action.source).await?;
        Ok(balance >= self.action.value)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        let Some(tx_hash) = self.action.tx_hash else {
            return Ok(false);
        };

        // Transaction must exist and be mined
        let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? else {
            return Ok(false);
        };

        // Parse the MessagePassed event to verify it's our withdrawal
        let Ok((withdrawal_tx, _)) = parse_message_passed_event(&receipt) else {
            return Ok(false);
        };

        // Double-check this is our withdrawal by comparing parameters
        if withdrawal_tx.sender != self.action.source
            || withdrawal_tx.target != self.action.target
            || withdrawal_tx.nativeValue != self.action.value
            || withdrawal_tx.gasLimit != self.action.gas_limit
            || withdrawal_tx.data != self.action.data
        {
            return Ok(false);
        }

        Ok(true)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        if self.is_completed().await? {
            eyre::bail!("Withdrawal already initiated")
        }

        let contract = IL2ToL1MessagePasser::new(self.action.contract, &self.provider);

        let tx = contract
            .initiateWithdrawal(
                self.action.target,
                self.action.gas_limit,
                self.action.data.clone(),
            )
            .value(self.action.value)
            .send()
            .await?;

        let receipt = tx.get_receipt().await?;

        let (withdrawal_tx, withdrawal_hash) = parse_message_passed_event(&receipt)?;
        self.action.tx_hash = Some(receipt.transaction_hash);

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            withdrawal_hash = %withdrawal_hash,
            withdrawal_tx = ?withdrawal_tx,
            "Withdrawal initiated."
        );

        Ok(crate::Result {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        let amount = format_ether(self.action.value);
        format!("Withdrawing {} of the native asset to L1", amount)
    }
}

fn parse_message_passed_event(
    receipt: &alloy_rpc_types_eth::TransactionReceipt,
) -> eyre::Result<(WithdrawalTransaction, WithdrawalHash)> {
    for log in receipt.logs() {
        if let Ok(event) = IL2ToL1MessagePasser::MessagePassed::decode_log(&log.inner) {
            let tx = WithdrawalTransaction {
                nonce: event.nonce,
                sender: event.sender,
                target: event.target,
                nativeValue: event.nativeValue,
                ethValue: event.ethValue,
                gasLimit: event.gasLimit,
                data: event.data.data.clone(),
            };

            let hash = event.withdrawalHash;

            return Ok((tx, hash));
        }
    }

    eyre::bail!("MessagePassed event not found in receipt")
}
