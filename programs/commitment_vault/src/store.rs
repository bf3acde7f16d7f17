//! Keyed record store with atomic batch commits.
//!
//! A store holds three things keyed by address: open records (encoded
//! bytes), retired records (tombstones that can never be reopened) and
//! balances. Handlers only read from it; every mutation goes through
//! [`RecordStore::commit`], which applies a [`WriteBatch`] completely or not
//! at all.

use anchor_lang::prelude::Pubkey;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Insufficient funds at {address}: required {required}, available {available}")]
    InsufficientFunds {
        address: Pubkey,
        required: u64,
        available: u64,
    },

    #[error("Balance overflow at {address}")]
    BalanceOverflow { address: Pubkey },

    #[error("Cannot remove {address} while it still holds {balance}")]
    CloseWithBalance { address: Pubkey, balance: u64 },

    #[error("Address {address} is retired")]
    Retired { address: Pubkey },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Content of an address slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Open(Vec<u8>),
    Retired(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    /// Create or overwrite an open record.
    Put { address: Pubkey, data: Vec<u8> },
    /// Replace an open record with a permanent tombstone.
    Retire { address: Pubkey, tombstone: Vec<u8> },
    /// Drop a record entirely. Its balance must be zero after the batch.
    Remove { address: Pubkey },
    /// Move value between two balances.
    Transfer {
        from: Pubkey,
        to: Pubkey,
        amount: u64,
    },
}

/// Ordered set of writes committed as one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, address: Pubkey, data: Vec<u8>) -> &mut Self {
        self.ops.push(WriteOp::Put { address, data });
        self
    }

    pub fn retire(&mut self, address: Pubkey, tombstone: Vec<u8>) -> &mut Self {
        self.ops.push(WriteOp::Retire { address, tombstone });
        self
    }

    pub fn remove(&mut self, address: Pubkey) -> &mut Self {
        self.ops.push(WriteOp::Remove { address });
        self
    }

    /// Zero-amount transfers are dropped.
    pub fn transfer(&mut self, from: Pubkey, to: Pubkey, amount: u64) -> &mut Self {
        if amount > 0 {
            self.ops.push(WriteOp::Transfer { from, to, amount });
        }
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Durable keyed storage for commitments, vaults and balances.
pub trait RecordStore: Send + Sync {
    fn load(&self, address: &Pubkey) -> Result<Option<Slot>, StoreError>;

    fn balance(&self, address: &Pubkey) -> Result<u64, StoreError>;

    /// Apply every op of `batch`, or none of them.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

#[derive(Default)]
struct Tables {
    records: HashMap<Pubkey, Slot>,
    balances: HashMap<Pubkey, u64>,
}

/// In-memory implementation of [`RecordStore`]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Credit `amount` to `address` from outside the protocol.
    pub fn fund(&self, address: Pubkey, amount: u64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let balance = tables.balances.entry(address).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(StoreError::BalanceOverflow { address })?;
        Ok(*balance)
    }

    /// Sum of every balance held by the store.
    pub fn total_supply(&self) -> Result<u128, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.balances.values().map(|b| u128::from(*b)).sum())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryStore {
    fn load(&self, address: &Pubkey) -> Result<Option<Slot>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.records.get(address).cloned())
    }

    fn balance(&self, address: &Pubkey) -> Result<u64, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.balances.get(address).copied().unwrap_or(0))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;

        // Dry run against scratch balances and slots first.
        let mut scratch: HashMap<Pubkey, u64> = HashMap::new();
        let mut retired: Vec<Pubkey> = Vec::new();
        for op in batch.ops() {
            match op {
                WriteOp::Transfer { from, to, amount } => {
                    let available = scratch
                        .get(from)
                        .copied()
                        .unwrap_or_else(|| tables.balances.get(from).copied().unwrap_or(0));
                    let debited =
                        available
                            .checked_sub(*amount)
                            .ok_or(StoreError::InsufficientFunds {
                                address: *from,
                                required: *amount,
                                available,
                            })?;
                    scratch.insert(*from, debited);

                    let current = scratch
                        .get(to)
                        .copied()
                        .unwrap_or_else(|| tables.balances.get(to).copied().unwrap_or(0));
                    let credited = current
                        .checked_add(*amount)
                        .ok_or(StoreError::BalanceOverflow { address: *to })?;
                    scratch.insert(*to, credited);
                }
                WriteOp::Put { address, .. } => {
                    let already_retired = retired.contains(address)
                        || matches!(tables.records.get(address), Some(Slot::Retired(_)));
                    if already_retired {
                        return Err(StoreError::Retired { address: *address });
                    }
                }
                WriteOp::Retire { address, .. } => retired.push(*address),
                WriteOp::Remove { .. } => {}
            }
        }
        for op in batch.ops() {
            if let WriteOp::Remove { address } = op {
                let balance = scratch
                    .get(address)
                    .copied()
                    .unwrap_or_else(|| tables.balances.get(address).copied().unwrap_or(0));
                if balance != 0 {
                    return Err(StoreError::CloseWithBalance {
                        address: *address,
                        balance,
                    });
                }
            }
        }

        // Nothing below can fail.
        for (address, balance) in scratch {
            tables.balances.insert(address, balance);
        }
        for op in batch.ops {
            match op {
                WriteOp::Put { address, data } => {
                    tables.records.insert(address, Slot::Open(data));
                }
                WriteOp::Retire { address, tombstone } => {
                    tables.records.insert(address, Slot::Retired(tombstone));
                }
                WriteOp::Remove { address } => {
                    tables.records.remove(&address);
                    tables.balances.remove(&address);
                }
                WriteOp::Transfer { .. } => {}
            }
        }
        Ok(())
    }
}
