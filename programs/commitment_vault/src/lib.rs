//! Commitment Vault
//!
//! A protocol engine for staked wake-up commitments. An owner locks a
//! deposit behind a promise to acknowledge inside a time window. Acknowledge
//! in time and the deposit comes back; snooze and part of it burns; miss the
//! deadline and anyone may route it to the chosen penalty recipient.
//!
//! [`VaultEngine`] is the entry point. It serializes operations per record,
//! commits each one atomically to a [`RecordStore`] and appends a
//! [`VaultEvent`] for every state change.

pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod helpers;
pub mod instructions;
pub mod state;
pub mod store;
pub mod windows;


pub use clock::{Clock, ManualClock, SystemClock};
pub use config::VaultConfig;
pub use engine::VaultEngine;
pub use error::{ErrorKind, Result, VaultError};
pub use events::{EventLog, EventRecord, EventWriter, VaultEvent};
pub use instructions::{CreateCommitmentArgs, VaultInstruction};
pub use state::{
    ClosedCommitment, Commitment, CommitmentRecord, CommitmentStatus, PenaltyRoute, Vault,
};
pub use store::{InMemoryStore, RecordStore, StoreError, WriteBatch};
pub use windows::{Operation, WindowReport};
