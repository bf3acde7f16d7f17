//! Instruction handlers
//!
//! A handler reads what it needs from the store, checks every precondition
//! and returns a [`Transition`]: the post-operation commitment, the batch of
//! writes that realizes it, and the event to publish. Handlers never write;
//! the engine commits the batch while it still holds the record lock.

use crate::config::VaultConfig;
use crate::error::{Result, VaultError};
use crate::events::VaultEvent;
use crate::state::{
    decode, encode, ClosedCommitment, Commitment, CommitmentStatus, PenaltyRoute, Vault,
};
use crate::store::{RecordStore, Slot, WriteBatch};
use anchor_lang::prelude::*;

macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub mod acknowledge;
pub mod claim;
pub mod create_commitment;
pub mod emergency_refund;
pub mod slash;
pub mod snooze;
pub mod sweep_acknowledged;

pub use acknowledge::process_acknowledge;
pub use claim::process_claim;
pub use create_commitment::{process_create_commitment, CreateCommitmentArgs};
pub use emergency_refund::process_emergency_refund;
pub use slash::process_slash;
pub use snooze::process_snooze;
pub use sweep_acknowledged::process_sweep_acknowledged;

/// Everything a handler may look at.
pub struct Context<'a> {
    pub store: &'a dyn RecordStore,
    pub config: &'a VaultConfig,
    /// Authenticated identity submitting the operation
    pub caller: Pubkey,
    /// Clock reading taken once, under the record lock
    pub now: i64,
}

/// Result of a successful handler run.
#[derive(Clone, Debug)]
pub struct Transition {
    pub commitment: Commitment,
    pub batch: WriteBatch,
    pub event: VaultEvent,
}

/// Wire form of an operation, as submitted by an external queue.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum VaultInstruction {
    CreateCommitment {
        commitment_id: u64,
        fire_time: i64,
        deadline: Option<i64>,
        deposit_amount: u64,
        penalty_route: u8,
        penalty_destination: Option<Pubkey>,
    },
    Acknowledge {
        commitment: Pubkey,
    },
    Snooze {
        commitment: Pubkey,
        expected_snooze_count: u8,
    },
    Claim {
        commitment: Pubkey,
    },
    SweepAcknowledged {
        commitment: Pubkey,
    },
    Slash {
        commitment: Pubkey,
        penalty_recipient: Pubkey,
    },
    EmergencyRefund {
        commitment: Pubkey,
    },
}

impl VaultInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            VaultInstruction::CreateCommitment { .. } => "create_commitment",
            VaultInstruction::Acknowledge { .. } => "acknowledge",
            VaultInstruction::Snooze { .. } => "snooze",
            VaultInstruction::Claim { .. } => "claim",
            VaultInstruction::SweepAcknowledged { .. } => "sweep_acknowledged",
            VaultInstruction::Slash { .. } => "slash",
            VaultInstruction::EmergencyRefund { .. } => "emergency_refund",
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        encode(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        decode(data)
    }
}

pub(crate) fn decode_route(route: u8) -> Result<PenaltyRoute> {
    PenaltyRoute::try_from(route).map_err(|_| VaultError::InvalidPenaltyRoute)
}

/// Load an open commitment, or explain why there is none.
pub(crate) fn load_commitment(ctx: &Context<'_>, address: &Pubkey) -> Result<Commitment> {
    match ctx.store.load(address)? {
        Some(Slot::Open(data)) => decode(&data),
        Some(Slot::Retired(data)) => {
            let closed: ClosedCommitment = decode(&data)?;
            Err(VaultError::CommitmentClosed {
                status: closed.status,
            })
        }
        None => Err(VaultError::CommitmentNotFound),
    }
}

/// Load the paired vault and its balance. The balance must cover the
/// remaining deposit plus the reserve floor.
pub(crate) fn load_vault(ctx: &Context<'_>, commitment: &Commitment) -> Result<(Vault, u64)> {
    let vault: Vault = match ctx.store.load(&commitment.vault)? {
        Some(Slot::Open(data)) => decode(&data)?,
        _ => {
            return Err(VaultError::CorruptRecord(format!(
                "vault {} missing for open commitment",
                commitment.vault
            )))
        }
    };
    let balance = ctx.store.balance(&commitment.vault)?;
    let required = commitment
        .remaining_amount
        .checked_add(vault.reserve_floor)
        .ok_or(VaultError::Overflow)?;
    ensure!(
        balance >= required,
        VaultError::VaultUnderfunded { balance, required }
    );
    Ok((vault, balance))
}

pub(crate) fn require_owner(commitment: &Commitment, caller: &Pubkey) -> Result<()> {
    ensure!(commitment.owner == *caller, VaultError::Unauthorized);
    Ok(())
}

pub(crate) fn require_status(commitment: &Commitment, allowed: &[CommitmentStatus]) -> Result<()> {
    ensure!(
        allowed.contains(&commitment.status),
        VaultError::InvalidCommitmentState
    );
    Ok(())
}

/// Amounts produced by closing a pair.
pub(crate) struct Closure {
    pub commitment: Commitment,
    pub batch: WriteBatch,
    /// Deposit share sent to `stake_recipient`
    pub stake_moved: u64,
    /// Everything else in the vault, returned to the owner
    pub reserve_returned: u64,
}

/// Close a commitment + vault pair.
///
/// `stake` of the vault balance goes to `stake_recipient`; the rest (reserve
/// floor plus any surplus) goes back to the owner. The vault record is
/// removed and the commitment address retired with `final_status`.
pub(crate) fn close_pair(
    ctx: &Context<'_>,
    commitment: &Commitment,
    vault_balance: u64,
    extra_transfers: &[(Pubkey, u64)],
    stake_recipient: Pubkey,
    stake: u64,
    final_status: CommitmentStatus,
) -> Result<Closure> {
    let mut batch = WriteBatch::new();
    let mut left = vault_balance;
    for (to, amount) in extra_transfers {
        left = left.checked_sub(*amount).ok_or(VaultError::Overflow)?;
        batch.transfer(commitment.vault, *to, *amount);
    }
    left = left.checked_sub(stake).ok_or(VaultError::Overflow)?;
    batch.transfer(commitment.vault, stake_recipient, stake);
    batch.transfer(commitment.vault, commitment.owner, left);

    let tombstone = ClosedCommitment {
        owner: commitment.owner,
        commitment_id: commitment.commitment_id,
        status: final_status,
        closed_at: ctx.now,
    };
    batch
        .remove(commitment.vault)
        .retire(commitment.address(), encode(&tombstone));

    let mut closed = commitment.clone();
    closed.status = final_status;
    closed.remaining_amount = 0;

    Ok(Closure {
        commitment: closed,
        batch,
        stake_moved: stake,
        reserve_returned: left,
    })
}
