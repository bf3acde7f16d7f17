//! Protocol engine
//!
//! Runs one operation at a time per commitment address. Each call takes the
//! address lock, reads the clock, runs the handler against the store,
//! commits the handler's batch and appends its event before releasing the
//! lock. Racing callers on one record therefore observe each other's effects
//! in full; different records only meet inside the store's commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anchor_lang::prelude::Pubkey;

use crate::clock::Clock;
use crate::config::VaultConfig;
use crate::error::{Result, VaultError};
use crate::events::{EventLog, EventRecord};
use crate::instructions::{
    self, CreateCommitmentArgs, Transition, VaultInstruction,
};
use crate::state::{decode, ClosedCommitment, Commitment, CommitmentRecord};
use crate::store::{RecordStore, Slot, StoreError};
use crate::windows::{self, WindowReport};

/// One mutex per commitment address that has an operation in flight.
///
/// Handles are cloned and dropped only under the map lock, so a strong
/// count of two at release (map plus caller) means nobody else is waiting.
#[derive(Default)]
struct RecordLocks {
    slots: Mutex<HashMap<Pubkey, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    fn slot(&self, address: Pubkey) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut slots = self.slots.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Arc::clone(slots.entry(address).or_default()))
    }

    fn release(&self, address: &Pubkey, slot: Arc<Mutex<()>>) {
        let Ok(mut slots) = self.slots.lock() else {
            return;
        };
        if Arc::strong_count(&slot) == 2 {
            slots.remove(address);
        }
        drop(slot);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(usize::MAX)
    }
}

pub struct VaultEngine<S, C> {
    store: S,
    clock: C,
    config: VaultConfig,
    locks: RecordLocks,
    events: EventLog,
}

impl<S: RecordStore, C: Clock> VaultEngine<S, C> {
    pub fn new(store: S, clock: C, config: VaultConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
            locks: RecordLocks::default(),
            events: EventLog::new(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Addresses with an operation in flight.
    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.tracked()
    }

    /// Events appended after sequence number `after`.
    pub fn events_since(&self, after: u64) -> Result<Vec<EventRecord>> {
        Ok(self.events.since(after)?)
    }

    pub fn commitment_address(owner: &Pubkey, commitment_id: u64) -> Pubkey {
        Commitment::derive_address(owner, commitment_id)
    }

    pub fn balance(&self, identity: &Pubkey) -> Result<u64> {
        Ok(self.store.balance(identity)?)
    }

    /// What currently lives at `address`, if anything.
    pub fn record(&self, address: &Pubkey) -> Result<Option<CommitmentRecord>> {
        match self.store.load(address)? {
            Some(Slot::Open(data)) => Ok(Some(CommitmentRecord::Open(decode::<Commitment>(
                &data,
            )?))),
            Some(Slot::Retired(data)) => Ok(Some(CommitmentRecord::Closed(decode::<
                ClosedCommitment,
            >(&data)?))),
            None => Ok(None),
        }
    }

    /// Operations legal for `address` right now. Closed records permit nothing.
    pub fn permitted_operations(&self, address: &Pubkey) -> Result<WindowReport> {
        match self.record(address)? {
            Some(CommitmentRecord::Open(commitment)) => Ok(windows::evaluate(
                self.clock.unix_timestamp(),
                &commitment,
                &self.config,
            )),
            Some(CommitmentRecord::Closed(_)) => Ok(WindowReport::default()),
            None => Err(VaultError::CommitmentNotFound),
        }
    }

    pub fn create_commitment(
        &self,
        owner: Pubkey,
        args: CreateCommitmentArgs,
    ) -> Result<Commitment> {
        let address = Commitment::derive_address(&owner, args.commitment_id);
        self.execute("create_commitment", owner, address, |ctx| {
            instructions::process_create_commitment(ctx, args)
        })
    }

    pub fn acknowledge(&self, caller: Pubkey, commitment: Pubkey) -> Result<Commitment> {
        self.execute("acknowledge", caller, commitment, |ctx| {
            instructions::process_acknowledge(ctx, commitment)
        })
    }

    pub fn snooze(
        &self,
        caller: Pubkey,
        commitment: Pubkey,
        expected_snooze_count: u8,
    ) -> Result<Commitment> {
        self.execute("snooze", caller, commitment, |ctx| {
            instructions::process_snooze(ctx, commitment, expected_snooze_count)
        })
    }

    pub fn claim(&self, caller: Pubkey, commitment: Pubkey) -> Result<Commitment> {
        self.execute("claim", caller, commitment, |ctx| {
            instructions::process_claim(ctx, commitment)
        })
    }

    pub fn sweep_acknowledged(&self, caller: Pubkey, commitment: Pubkey) -> Result<Commitment> {
        self.execute("sweep_acknowledged", caller, commitment, |ctx| {
            instructions::process_sweep_acknowledged(ctx, commitment)
        })
    }

    pub fn slash(
        &self,
        caller: Pubkey,
        commitment: Pubkey,
        penalty_recipient: Pubkey,
    ) -> Result<Commitment> {
        self.execute("slash", caller, commitment, |ctx| {
            instructions::process_slash(ctx, commitment, penalty_recipient)
        })
    }

    pub fn emergency_refund(&self, caller: Pubkey, commitment: Pubkey) -> Result<Commitment> {
        self.execute("emergency_refund", caller, commitment, |ctx| {
            instructions::process_emergency_refund(ctx, commitment)
        })
    }

    /// Dispatch a wire instruction on behalf of `caller`.
    pub fn submit(&self, caller: Pubkey, instruction: VaultInstruction) -> Result<Commitment> {
        match instruction {
            VaultInstruction::CreateCommitment {
                commitment_id,
                fire_time,
                deadline,
                deposit_amount,
                penalty_route,
                penalty_destination,
            } => self.create_commitment(
                caller,
                CreateCommitmentArgs {
                    commitment_id,
                    fire_time,
                    deadline,
                    deposit_amount,
                    penalty_route,
                    penalty_destination,
                },
            ),
            VaultInstruction::Acknowledge { commitment } => self.acknowledge(caller, commitment),
            VaultInstruction::Snooze {
                commitment,
                expected_snooze_count,
            } => self.snooze(caller, commitment, expected_snooze_count),
            VaultInstruction::Claim { commitment } => self.claim(caller, commitment),
            VaultInstruction::SweepAcknowledged { commitment } => {
                self.sweep_acknowledged(caller, commitment)
            }
            VaultInstruction::Slash {
                commitment,
                penalty_recipient,
            } => self.slash(caller, commitment, penalty_recipient),
            VaultInstruction::EmergencyRefund { commitment } => {
                self.emergency_refund(caller, commitment)
            }
        }
    }

    /// Decode a borsh-encoded [`VaultInstruction`] and dispatch it.
    pub fn submit_encoded(&self, caller: Pubkey, data: &[u8]) -> Result<Commitment> {
        let instruction = VaultInstruction::decode(data)?;
        self.submit(caller, instruction)
    }

    fn execute<F>(
        &self,
        operation: &'static str,
        caller: Pubkey,
        address: Pubkey,
        handler: F,
    ) -> Result<Commitment>
    where
        F: FnOnce(&instructions::Context<'_>) -> Result<Transition>,
    {
        let slot = self.locks.slot(address)?;
        let result = match slot.lock() {
            Ok(_guard) => self.apply(operation, caller, address, handler),
            Err(_) => Err(StoreError::LockPoisoned.into()),
        };
        self.locks.release(&address, slot);
        result
    }

    fn apply<F>(
        &self,
        operation: &'static str,
        caller: Pubkey,
        address: Pubkey,
        handler: F,
    ) -> Result<Commitment>
    where
        F: FnOnce(&instructions::Context<'_>) -> Result<Transition>,
    {
        let now = self.clock.unix_timestamp();
        let ctx = instructions::Context {
            store: &self.store,
            config: &self.config,
            caller,
            now,
        };

        let Transition {
            commitment,
            batch,
            event,
        } = match handler(&ctx) {
            Ok(transition) => transition,
            Err(err) => {
                tracing::debug!(
                    operation,
                    caller = %caller,
                    commitment = %address,
                    kind = ?err.kind(),
                    error = %err,
                    "operation rejected"
                );
                return Err(err);
            }
        };

        // Held across the commit so an applied batch always gets its event.
        let mut events = self.events.writer()?;
        if let Err(err) = self.store.commit(batch) {
            tracing::warn!(
                operation,
                caller = %caller,
                commitment = %address,
                error = %err,
                "commit failed"
            );
            return Err(err.into());
        }

        let moved = event.amount_moved_out();
        let name = event.name();
        let sequence = events.append(now, event);
        drop(events);

        tracing::info!(
            operation,
            caller = %caller,
            commitment = %address,
            event = name,
            sequence,
            moved,
            remaining = commitment.remaining_amount,
            status = ?commitment.status,
            "operation applied"
        );

        Ok(commitment)
    }
}
