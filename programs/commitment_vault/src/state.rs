//! Record definitions

use crate::constants::{COMMITMENT_SEED, VAULT_SEED};
use anchor_lang::prelude::*;

/// Status of a commitment
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum CommitmentStatus {
    #[default]
    Created,
    Acknowledged,
    Claimed,
    Slashed,
}

impl CommitmentStatus {
    /// `Claimed` and `Slashed` are absorbing.
    pub fn is_terminal(self) -> bool {
        matches!(self, CommitmentStatus::Claimed | CommitmentStatus::Slashed)
    }
}

/// Penalty route for failed commitments
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PenaltyRoute {
    Burn,   // Send to sink address
    Donate, // Send to charity
    Buddy,  // Send to friend
}

impl PenaltyRoute {
    pub fn requires_destination(self) -> bool {
        matches!(self, PenaltyRoute::Donate | PenaltyRoute::Buddy)
    }
}

impl TryFrom<u8> for PenaltyRoute {
    type Error = ();

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(PenaltyRoute::Burn),
            1 => Ok(PenaltyRoute::Donate),
            2 => Ok(PenaltyRoute::Buddy),
            _ => Err(()),
        }
    }
}

impl From<PenaltyRoute> for u8 {
    fn from(route: PenaltyRoute) -> u8 {
        match route {
            PenaltyRoute::Burn => 0,
            PenaltyRoute::Donate => 1,
            PenaltyRoute::Buddy => 2,
        }
    }
}

/// One staked promise.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct Commitment {
    /// Depositor; the only identity allowed to acknowledge, snooze, claim or refund
    pub owner: Pubkey,
    /// Caller-chosen id, unique per owner
    pub commitment_id: u64,
    /// Start of the acknowledge window (Unix timestamp)
    pub fire_time: i64,
    /// Deadline for acknowledging (Unix timestamp), always > fire_time
    pub deadline: i64,
    /// Initial deposit amount
    pub initial_amount: u64,
    /// Remaining deposit amount
    pub remaining_amount: u64,
    pub penalty_route: PenaltyRoute,
    /// Penalty destination address (Donate/Buddy only)
    pub penalty_destination: Option<Pubkey>,
    /// Number of snoozes used
    pub snooze_count: u8,
    pub status: CommitmentStatus,
    /// Address of the paired vault
    pub vault: Pubkey,
    pub created_at: i64,
    pub acknowledged_at: Option<i64>,
}

impl Commitment {
    /// Deterministic record address for `(owner, commitment_id)`.
    pub fn derive_address(owner: &Pubkey, commitment_id: u64) -> Pubkey {
        let mut hasher = blake3::Hasher::new();
        hasher.update(COMMITMENT_SEED);
        hasher.update(owner.as_ref());
        hasher.update(&commitment_id.to_le_bytes());
        Pubkey::new_from_array(*hasher.finalize().as_bytes())
    }

    pub fn address(&self) -> Pubkey {
        Self::derive_address(&self.owner, self.commitment_id)
    }

    /// Amount that has left the vault so far (snooze costs).
    pub fn moved_out(&self) -> u64 {
        self.initial_amount.saturating_sub(self.remaining_amount)
    }
}

/// Value-holding record paired 1:1 with a commitment. The balance itself
/// lives in the store under the vault address.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct Vault {
    /// Associated commitment address
    pub commitment: Pubkey,
    /// Minimum balance kept while open
    pub reserve_floor: u64,
}

impl Vault {
    pub fn derive_address(commitment: &Pubkey) -> Pubkey {
        let mut hasher = blake3::Hasher::new();
        hasher.update(VAULT_SEED);
        hasher.update(commitment.as_ref());
        Pubkey::new_from_array(*hasher.finalize().as_bytes())
    }
}

/// Tombstone left at a commitment address once its pair has been closed.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct ClosedCommitment {
    pub owner: Pubkey,
    pub commitment_id: u64,
    pub status: CommitmentStatus,
    pub closed_at: i64,
}

/// What lives at a commitment address.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CommitmentRecord {
    Open(Commitment),
    Closed(ClosedCommitment),
}

impl CommitmentRecord {
    pub fn status(&self) -> CommitmentStatus {
        match self {
            CommitmentRecord::Open(c) => c.status,
            CommitmentRecord::Closed(c) => c.status,
        }
    }
}

pub(crate) fn encode<T: AnchorSerialize>(value: &T) -> Vec<u8> {
    let mut data = Vec::with_capacity(256);
    // Writing into a Vec cannot fail.
    let _ = value.serialize(&mut data);
    data
}

pub(crate) fn decode<T: AnchorDeserialize>(data: &[u8]) -> crate::error::Result<T> {
    T::try_from_slice(data).map_err(|e| crate::error::VaultError::CorruptRecord(e.to_string()))
}
