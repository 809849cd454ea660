//! CLI for proving and finalizing L2→L1 withdrawals.
//!
//! Each subcommand runs one step of the withdrawal lifecycle independently:
//! - `status`: Scan an L2 block range and report every pending withdrawal
//! - `withdraw`: Initiate a withdrawal on L2
//! - `prove`: Prove a single withdrawal identified by its L2 transaction hash
//! - `wait`: Block until the output covering an L2 block is finalized
//! - `finalize`: Finalize a single proven withdrawal
//! - `process-withdrawals`: Prove and finalize everything that is ready

use alloy_primitives::{Address, Bytes, TxHash, U256};
use clap::{Parser, Subcommand};
use prover::{config::Config, process_pending_withdrawals, scan_pending_withdrawals, wait_until_finalizable};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "prover")]
#[command(about = "Prove and finalize L2 to L1 withdrawals")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: String,

    /// Dry-run mode: log actions without executing transactions
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan an L2 block range and report every pending withdrawal
    Status {
        /// First L2 block of the scan range
        #[arg(long)]
        from_block: u64,
    },

    /// Initiate a withdrawal of the native asset on L2
    Withdraw {
        /// L1 recipient address
        #[arg(long)]
        target: Address,

        /// Amount to withdraw, in wei
        #[arg(long)]
        value: U256,

        /// Gas limit for the L1 execution of the withdrawal
        #[arg(long, default_value_t = 200_000)]
        gas_limit: u64,
    },

    /// Prove a single withdrawal identified by its initiating L2 transaction
    Prove {
        /// Hash of the L2 transaction that initiated the withdrawal
        tx_hash: TxHash,
    },

    /// Block until the output covering the given L2 block is finalized
    Wait {
        /// L2 block number the withdrawal was initiated in
        l2_block: u64,
    },

    /// Finalize a single proven withdrawal identified by its initiating L2
    /// transaction
    Finalize {
        /// Hash of the L2 transaction that initiated the withdrawal
        tx_hash: TxHash,
    },

    /// Prove and finalize every pending withdrawal that is ready
    ProcessWithdrawals {
        /// First L2 block of the scan range
        #[arg(long)]
        from_block: u64,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_file(&cli.config)?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.dry_run = true;
    }

    let network = config.network_config();

    info!("Loaded config:");
    info!("  Network: {:?}", config.network);
    info!("  L1 Portal: {}", network.ethereum.portal);
    info!("  L2 Output Oracle: {}", network.ethereum.output_oracle);
    info!("  EOA: {}", config.eoa_address);
    if config.dry_run {
        info!("  Mode: DRY-RUN (no transactions will be executed)");
    }

    metrics_exporter_prometheus::PrometheusBuilder::new().install()?;

    match cli.command {
        Command::Status { from_block } => {
            info!("Running: status");

            let l1_provider = client::create_provider(&config.l1_rpc_url).await?;
            let l2_provider = client::create_provider(&config.l2_rpc_url).await?;

            let withdrawals = scan_pending_withdrawals(
                l1_provider,
                l2_provider,
                &config,
                from_block,
                alloy_rpc_types_eth::BlockNumberOrTag::Latest,
            )
            .await?;

            info!(count = withdrawals.len(), "Pending withdrawals");
            for withdrawal in &withdrawals {
                info!(
                    hash = %withdrawal.hash,
                    l2_block = withdrawal.l2_block,
                    l2_tx = %withdrawal.l2_tx_hash,
                    status = ?withdrawal.status,
                    "Pending withdrawal"
                );
            }
        }
        Command::Withdraw {
            target,
            value,
            gas_limit,
        } => {
            info!("Running: withdraw");

            // The withdraw action sends through the provider's own wallet.
            let l2_provider =
                client::create_wallet_provider(&config.l2_rpc_url, &cli.private_key)?;

            let withdraw = action::withdraw::Withdraw {
                contract: network.rollup.message_passer,
                source: config.eoa_address,
                target,
                value,
                gas_limit: U256::from(gas_limit),
                data: Bytes::new(),
                tx_hash: None,
            };
            let mut withdraw_action =
                action::withdraw::WithdrawAction::new(l2_provider, withdraw);

            run_action(&mut withdraw_action, &config).await?;
        }
        Command::Prove { tx_hash } => {
            info!("Running: prove");

            let l1_provider = client::create_provider(&config.l1_rpc_url).await?;
            let l2_provider = client::create_provider(&config.l2_rpc_url).await?;
            let signer = client::local_signer_fn(
                &cli.private_key,
                network.ethereum.chain_id,
                l1_provider.clone(),
            )?;

            let withdrawal =
                locate_withdrawal(&l1_provider, &l2_provider, &config, tx_hash).await?;

            let prove = action::prove::Prove {
                portal_address: network.ethereum.portal,
                oracle_address: network.ethereum.output_oracle,
                message_passer_address: network.rollup.message_passer,
                l2_tx_hash: withdrawal.l2_tx_hash,
                withdrawal: withdrawal.transaction,
                withdrawal_hash: withdrawal.hash,
                l2_block: withdrawal.l2_block,
                from: config.eoa_address,
            };
            let mut prove_action =
                action::prove::ProveAction::new(l1_provider, l2_provider, signer, prove);

            run_action(&mut prove_action, &config).await?;
        }
        Command::Wait { l2_block } => {
            info!("Running: wait");

            let l1_provider = client::create_provider(&config.l1_rpc_url).await?;

            let cancel = CancellationToken::new();
            let cancel_on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received ctrl-c, aborting wait");
                    cancel_on_signal.cancel();
                }
            });

            let boundary = wait_until_finalizable(&l1_provider, &config, l2_block, &cancel).await?;

            info!(
                l2_block,
                boundary, "Output covering block is published and finalized"
            );
        }
        Command::Finalize { tx_hash } => {
            info!("Running: finalize");

            let l1_provider = client::create_provider(&config.l1_rpc_url).await?;
            let l2_provider = client::create_provider(&config.l2_rpc_url).await?;
            let signer = client::local_signer_fn(
                &cli.private_key,
                network.ethereum.chain_id,
                l1_provider.clone(),
            )?;

            let withdrawal =
                locate_withdrawal(&l1_provider, &l2_provider, &config, tx_hash).await?;

            let finalize = action::finalize::Finalize {
                portal_address: network.ethereum.portal,
                oracle_address: network.ethereum.output_oracle,
                withdrawal: withdrawal.transaction,
                withdrawal_hash: withdrawal.hash,
                from: config.eoa_address,
            };
            let mut finalize_action =
                action::finalize::FinalizeAction::new(l1_provider, l2_provider, signer, finalize);

            run_action(&mut finalize_action, &config).await?;
        }
        Command::ProcessWithdrawals { from_block } => {
            info!("Running: process-withdrawals");

            let l1_provider = client::create_provider(&config.l1_rpc_url).await?;
            let l2_provider = client::create_provider(&config.l2_rpc_url).await?;
            let signer = client::local_signer_fn(
                &cli.private_key,
                network.ethereum.chain_id,
                l1_provider.clone(),
            )?;

            process_pending_withdrawals(l1_provider, l2_provider, signer, &config, from_block)
                .await?;

            info!("Step completed: process-withdrawals");
        }
    }

    Ok(())
}

/// Find the pending withdrawal initiated by the given L2 transaction.
async fn locate_withdrawal<P1, P2>(
    l1_provider: &P1,
    l2_provider: &P2,
    config: &Config,
    tx_hash: TxHash,
) -> eyre::Result<withdrawal::state::PendingWithdrawal>
where
    P1: alloy_provider::Provider + Clone,
    P2: alloy_provider::Provider + Clone,
{
    let receipt = l2_provider
        .get_transaction_receipt(tx_hash)
        .await?
        .ok_or_else(|| eyre::eyre!("L2 transaction not found: {}", tx_hash))?;
    let block = receipt
        .block_number
        .ok_or_else(|| eyre::eyre!("Transaction not yet included in a block: {}", tx_hash))?;

    let withdrawals = scan_pending_withdrawals(
        l1_provider.clone(),
        l2_provider.clone(),
        config,
        block,
        alloy_rpc_types_eth::BlockNumberOrTag::Number(block),
    )
    .await?;

    withdrawals
        .into_iter()
        .find(|w| w.l2_tx_hash == tx_hash)
        .ok_or_else(|| {
            eyre::eyre!(
                "No pending withdrawal found for transaction {} (already finalized?)",
                tx_hash
            )
        })
}

/// Run a single action with readiness checks and dry-run support.
async fn run_action<A: action::Action>(action: &mut A, config: &Config) -> eyre::Result<()> {
    if action.is_completed().await? {
        info!(action = %action.description(), "Already completed, nothing to do");
        return Ok(());
    }
    if !action.is_ready().await? {
        eyre::bail!("Not ready: {}", action.description())
    }
    if config.dry_run {
        info!(action = %action.description(), "Dry-run: skipping execution");
        return Ok(());
    }

    let result = action.execute().await?;
    info!(
        tx_hash = %result.tx_hash,
        block_number = result.block_number,
        "Action executed"
    );

    Ok(())
}
