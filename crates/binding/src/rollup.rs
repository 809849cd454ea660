//! Rollup contract bindings.
//!
//! Includes the contracts involved in L2→L1 withdrawals:
//! - L2ToL1MessagePasser (L2 predeploy)
//! - OptimismPortal (L1 contract)
//! - L2OutputOracle (L1 contract)
//!
//! This deployment carries two value fields per withdrawal: `nativeValue`
//! denominated in the chain's gas-paying token and `ethValue` denominated
//! in bridged ETH. Both are part of the ABI tuple that the portal hashes,
//! so field order here must match the contracts exactly.

use alloy_primitives::{address, Address, B256};
use alloy_sol_types::sol;

/// Address of the L2ToL1MessagePasser predeploy on L2.
pub const MESSAGE_PASSER_ADDRESS: Address =
    address!("0x4200000000000000000000000000000000000016");

/// Output root version byte for the initial protocol version.
pub const OUTPUT_VERSION_V0: B256 = B256::ZERO;

sol! {
    /// Withdrawal transaction structure (shared across contracts).
    ///
    /// ABI tuple: `(uint256,address,address,uint256,uint256,uint256,bytes)`.
    #[derive(Debug, PartialEq, Eq)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 nativeValue;
        uint256 ethValue;
        uint256 gasLimit;
        bytes data;
    }

    /// Output root proof structure (preimage of a committed output root).
    #[derive(Debug, PartialEq, Eq)]
    struct OutputRootProof {
        bytes32 version;
        bytes32 stateRoot;
        bytes32 messagePasserStorageRoot;
        bytes32 latestBlockhash;
    }

    /// L2ToL1MessagePasser - L2 predeploy contract for initiating withdrawals.
    /// Address: 0x4200000000000000000000000000000000000016
    #[sol(rpc)]
    interface IL2ToL1MessagePasser {
        /// Emitted when a withdrawal is initiated on L2
        event MessagePassed(
            uint256 indexed nonce,
            address indexed sender,
            address indexed target,
            uint256 nativeValue,
            uint256 ethValue,
            uint256 gasLimit,
            bytes data,
            bytes32 withdrawalHash
        );

        /// Initiate a withdrawal from L2 to L1
        function initiateWithdrawal(
            address _target,
            uint256 _gasLimit,
            bytes calldata _data
        ) external payable;

        /// Check if a withdrawal message has been sent
        function sentMessages(bytes32) external view returns (bool);

        /// Get the current message nonce (with version encoded in top 2 bytes)
        function messageNonce() external view returns (uint256);
    }

    /// OptimismPortal - Main L1 contract for withdrawal proving and finalization
    #[sol(rpc)]
    interface IOptimismPortal {
        /// Proven withdrawal data stored on L1
        #[derive(Debug)]
        struct ProvenWithdrawal {
            bytes32 outputRoot;
            uint128 timestamp;
            uint128 l2OutputIndex;
        }

        /// Emitted when a withdrawal is proven on L1
        event WithdrawalProven(
            bytes32 indexed withdrawalHash,
            address indexed from,
            address indexed to
        );

        /// Emitted when a withdrawal is finalized on L1
        event WithdrawalFinalized(
            bytes32 indexed withdrawalHash,
            bool success
        );

        /// Get the address of the L2OutputOracle this portal reads from
        function L2_ORACLE() external view returns (address);

        /// Query proven withdrawals by hash
        function provenWithdrawals(bytes32 withdrawalHash)
            external view returns (ProvenWithdrawal memory);

        /// Query if a withdrawal has been finalized
        function finalizedWithdrawals(bytes32 withdrawalHash)
            external view returns (bool);

        /// Check whether the output at the given index is past its
        /// finalization window
        function isOutputFinalized(uint256 _l2OutputIndex)
            external view returns (bool);

        /// Prove a withdrawal transaction (requires merkle proof)
        function proveWithdrawalTransaction(
            WithdrawalTransaction calldata _tx,
            uint256 _l2OutputIndex,
            OutputRootProof calldata _outputRootProof,
            bytes[] calldata _withdrawalProof
        ) external;

        /// Finalize a proven withdrawal transaction
        function finalizeWithdrawalTransaction(
            WithdrawalTransaction calldata _tx
        ) external;
    }

    /// L2OutputOracle - stores output roots proposed per submission interval
    #[sol(rpc)]
    interface IL2OutputOracle {
        /// An output root with its L1 timestamp and covered L2 block
        #[derive(Debug)]
        struct OutputProposal {
            bytes32 outputRoot;
            uint128 timestamp;
            uint128 l2BlockNumber;
        }

        /// Emitted when an output root is proposed
        event OutputProposed(
            bytes32 indexed outputRoot,
            uint256 indexed l2OutputIndex,
            uint256 indexed l2BlockNumber,
            uint256 l1Timestamp
        );

        /// Spacing (in L2 blocks) between proposed outputs
        function SUBMISSION_INTERVAL() external view returns (uint256);

        /// Dispute window after which an output may be used to finalize
        function FINALIZATION_PERIOD_SECONDS() external view returns (uint256);

        /// First L2 block covered by this oracle
        function startingBlockNumber() external view returns (uint256);

        /// Highest L2 block with a proposed output
        function latestBlockNumber() external view returns (uint256);

        /// Index of the first output whose block number is >= the argument
        function getL2OutputIndexAfter(uint256 _l2BlockNumber)
            external view returns (uint256);

        /// First output proposal whose block number is >= the argument
        function getL2OutputAfter(uint256 _l2BlockNumber)
            external view returns (OutputProposal memory);
    }
}
