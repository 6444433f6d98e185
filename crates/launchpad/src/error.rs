use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::types::RoundId;

/// Errors returned by launchpad entry points.
///
/// Policy violations are reported in the order they are checked: window,
/// whitelist, payment, wallet cap, supply.
#[derive(Debug, Error)]
pub enum LaunchpadError {
    /// Round parameters violate a creation/update constraint.
    #[error("invalid round config: {0}")]
    InvalidConfig(&'static str),
    /// Caller is not the launchpad admin.
    #[error("unauthorized caller {caller}")]
    Unauthorized {
        /// Address that attempted the call.
        caller: Address,
    },
    /// No round exists under this id.
    #[error("round {0} not found")]
    RoundNotFound(RoundId),
    /// Every round id has been allocated.
    #[error("round ids exhausted")]
    RoundIdsExhausted,
    /// Mint request asked for zero units.
    #[error("requested amount must be positive")]
    InvalidAmount,
    /// Current time falls outside the round's admission window.
    #[error("round {round_id} is not open at {now} (window {start_time}..={end_time})")]
    OutsideWindow {
        /// Round the mint targeted.
        round_id: RoundId,
        /// Time the request was evaluated at.
        now: u64,
        /// Window start.
        start_time: u64,
        /// Window end.
        end_time: u64,
    },
    /// Round is whitelist-only and the buyer is not a member.
    #[error("{buyer} is not whitelisted for round {round_id}")]
    NotWhitelisted {
        /// Round the mint targeted.
        round_id: RoundId,
        /// Rejected buyer.
        buyer: Address,
    },
    /// Attached value differs from the unit price.
    #[error("incorrect payment: expected {expected}, received {received}")]
    IncorrectPayment {
        /// Unit price of the round.
        expected: U256,
        /// Value attached to the request.
        received: U256,
    },
    /// Buyer already holds the per-wallet maximum for this round.
    #[error("{buyer} reached the per-wallet cap of {max_per_wallet} in round {round_id}")]
    WalletCapExceeded {
        /// Round the mint targeted.
        round_id: RoundId,
        /// Rejected buyer.
        buyer: Address,
        /// Configured cap.
        max_per_wallet: u64,
    },
    /// Round has issued its full supply.
    #[error("round {round_id} supply of {supply_cap} is exhausted")]
    SupplyExhausted {
        /// Round the mint targeted.
        round_id: RoundId,
        /// Configured cap.
        supply_cap: u64,
    },
    /// Item contract refused to issue the unit. All staged effects were rolled back.
    #[error("issuance failed: {0}")]
    IssuanceFailed(#[from] IssuanceError),
    /// Value transfer to the beneficiary failed. Nothing was issued.
    #[error("payment failed: {0}")]
    PaymentFailed(#[from] PaymentError),
}

/// Failure reported by the item contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("item contract {contract} rejected issuance: {reason}")]
pub struct IssuanceError {
    /// Contract that was asked to issue.
    pub contract: Address,
    /// Collaborator-provided reason, not interpreted further.
    pub reason: String,
}

impl IssuanceError {
    /// Creates an issuance error for `contract`.
    pub fn new(contract: Address, reason: impl Into<String>) -> Self {
        Self { contract, reason: reason.into() }
    }
}

/// Failure reported by the value-transfer primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Transfer was refused by the ledger.
    #[error("transfer of {amount} to {beneficiary} rejected")]
    Rejected {
        /// Intended recipient.
        beneficiary: Address,
        /// Amount that was not transferred.
        amount: U256,
    },
    /// Crediting the recipient would overflow its balance.
    #[error("balance overflow for {0}")]
    Overflow(Address),
    /// A reversal referenced a transfer the ledger does not know about.
    #[error("unknown payment receipt {0}")]
    UnknownReceipt(u64),
    /// The ledger refused to undo a completed transfer.
    #[error("reversal of payment {0} refused")]
    ReversalRefused(u64),
}

/// Errors raised while reading or writing a state snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot could not be encoded or decoded.
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    /// Temp file could not be moved into place.
    #[error("failed to persist snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),
    /// Snapshot was written in a format this build does not read.
    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },
    /// A stored round breaks a round invariant.
    #[error("snapshot round {round_id} is invalid: {reason}")]
    InvalidRound {
        /// Offending round.
        round_id: RoundId,
        /// Broken invariant.
        reason: &'static str,
    },
}
