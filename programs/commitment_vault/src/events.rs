//! Engine events for observers
//!
//! Every successful operation appends one structured event so that external
//! observers (the offline reconciliation queue, indexers) can track the full
//! commitment lifecycle without reading records.
//!
//! All events include `commitment` (the record address) and `commitment_id`
//! for client-side correlation.

use anchor_lang::prelude::*;
use anchor_lang::Event;
use std::sync::{RwLock, RwLockWriteGuard};

use crate::store::StoreError;

/// Emitted when a new commitment + vault is created
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentCreated {
    pub owner: Pubkey,
    pub commitment: Pubkey,
    pub commitment_id: u64,
    pub fire_time: i64,
    pub deadline: i64,
    pub deposit_amount: u64,
    /// Reserve floor paid into the vault on top of the deposit
    pub reserve_amount: u64,
    pub penalty_route: u8,
}

/// Emitted when the owner acknowledges in time
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WakeAcknowledged {
    pub owner: Pubkey,
    pub commitment: Pubkey,
    pub commitment_id: u64,
    pub timestamp: i64,
}

/// Emitted when a commitment is snoozed
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentSnoozed {
    pub owner: Pubkey,
    pub commitment: Pubkey,
    pub commitment_id: u64,
    pub snooze_count: u8,
    pub cost: u64,
    pub remaining: u64,
    pub new_fire_time: i64,
    pub new_deadline: i64,
}

/// Emitted when the owner claims
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentClaimed {
    pub owner: Pubkey,
    pub commitment: Pubkey,
    pub commitment_id: u64,
    pub returned_amount: u64,
    pub reserve_returned: u64,
}

/// Emitted when an acknowledged commitment is swept after the claim grace window
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentSwept {
    pub owner: Pubkey,
    pub commitment: Pubkey,
    pub commitment_id: u64,
    pub returned_amount: u64,
    pub reserve_returned: u64,
    pub caller: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a commitment is slashed after deadline
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentSlashed {
    pub commitment: Pubkey,
    pub commitment_id: u64,
    pub penalty_recipient: Pubkey,
    pub slashed_amount: u64,
    pub reserve_returned: u64,
    pub caller: Pubkey,
}

/// Emitted when an emergency refund is executed
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmergencyRefundExecuted {
    pub owner: Pubkey,
    pub commitment: Pubkey,
    pub commitment_id: u64,
    pub penalty_amount: u64,
    /// Deposit share returned to owner (remaining - penalty)
    pub returned_amount: u64,
    pub reserve_returned: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultEvent {
    Created(CommitmentCreated),
    Acknowledged(WakeAcknowledged),
    Snoozed(CommitmentSnoozed),
    Claimed(CommitmentClaimed),
    Swept(CommitmentSwept),
    Slashed(CommitmentSlashed),
    Refunded(EmergencyRefundExecuted),
}

impl VaultEvent {
    pub fn name(&self) -> &'static str {
        match self {
            VaultEvent::Created(_) => "CommitmentCreated",
            VaultEvent::Acknowledged(_) => "WakeAcknowledged",
            VaultEvent::Snoozed(_) => "CommitmentSnoozed",
            VaultEvent::Claimed(_) => "CommitmentClaimed",
            VaultEvent::Swept(_) => "CommitmentSwept",
            VaultEvent::Slashed(_) => "CommitmentSlashed",
            VaultEvent::Refunded(_) => "EmergencyRefundExecuted",
        }
    }

    pub fn commitment(&self) -> Pubkey {
        match self {
            VaultEvent::Created(e) => e.commitment,
            VaultEvent::Acknowledged(e) => e.commitment,
            VaultEvent::Snoozed(e) => e.commitment,
            VaultEvent::Claimed(e) => e.commitment,
            VaultEvent::Swept(e) => e.commitment,
            VaultEvent::Slashed(e) => e.commitment,
            VaultEvent::Refunded(e) => e.commitment,
        }
    }

    /// Deposit value that left the vault with this event, excluding the
    /// reserve floor.
    pub fn amount_moved_out(&self) -> u64 {
        match self {
            VaultEvent::Created(_) | VaultEvent::Acknowledged(_) => 0,
            VaultEvent::Snoozed(e) => e.cost,
            VaultEvent::Claimed(e) => e.returned_amount,
            VaultEvent::Swept(e) => e.returned_amount,
            VaultEvent::Slashed(e) => e.slashed_amount,
            VaultEvent::Refunded(e) => e.penalty_amount.saturating_add(e.returned_amount),
        }
    }

    /// Discriminator-prefixed borsh payload.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            VaultEvent::Created(e) => e.data(),
            VaultEvent::Acknowledged(e) => e.data(),
            VaultEvent::Snoozed(e) => e.data(),
            VaultEvent::Claimed(e) => e.data(),
            VaultEvent::Swept(e) => e.data(),
            VaultEvent::Slashed(e) => e.data(),
            VaultEvent::Refunded(e) => e.data(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    /// Starts at 1, strictly increasing
    pub sequence: u64,
    pub timestamp: i64,
    pub event: VaultEvent,
}

/// Append-only event log.
#[derive(Debug, Default)]
pub struct EventLog {
    records: RwLock<Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, timestamp: i64, event: VaultEvent) -> std::result::Result<u64, StoreError> {
        Ok(self.writer()?.append(timestamp, event))
    }

    /// Exclusive append access. Appends through the writer cannot fail.
    pub fn writer(&self) -> std::result::Result<EventWriter<'_>, StoreError> {
        let records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(EventWriter { records })
    }

    /// Records with `sequence > after`.
    pub fn since(&self, after: u64) -> std::result::Result<Vec<EventRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        let start = usize::try_from(after).unwrap_or(usize::MAX).min(records.len());
        Ok(records[start..].to_vec())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write guard over an [`EventLog`].
pub struct EventWriter<'a> {
    records: RwLockWriteGuard<'a, Vec<EventRecord>>,
}

impl EventWriter<'_> {
    pub fn append(&mut self, timestamp: i64, event: VaultEvent) -> u64 {
        let sequence = self.records.len() as u64 + 1;
        self.records.push(EventRecord {
            sequence,
            timestamp,
            event,
        });
        sequence
    }
}
