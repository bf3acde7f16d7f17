//! Engine error definitions

use crate::state::CommitmentStatus;
use crate::store::StoreError;
use thiserror::Error;

pub type Result<T, E = VaultError> = std::result::Result<T, E>;

/// Coarse classification of a failure, for callers that decide whether to
/// resubmit. Every [`VaultError`] maps onto exactly one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operation attempted outside its legal time window.
    WindowViolation,
    /// Status precondition not met (includes replays and double spends).
    InvalidState,
    /// Caller identity mismatch.
    Unauthorized,
    /// Snooze `expected_snooze_count` no longer matches the record.
    StaleExpectation,
    /// Missing destination, or slash recipient does not match the route.
    InvalidRoute,
    /// Deposit under the configured floor.
    BelowMinimum,
    /// A caller-supplied value cannot be represented safely.
    Overflow,
    /// Store, codec or configuration failure. Not caused by the request.
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Commitment deadline has passed")]
    DeadlinePassed,

    #[error("Commitment deadline has not passed yet")]
    DeadlineNotPassed,

    #[error("Cannot perform operation before fire time")]
    TooEarly,

    #[error("Cannot request refund after fire time has passed")]
    TooLateForRefund,

    #[error("Claim grace window has expired")]
    ClaimGraceExpired,

    #[error("Claim grace window has not expired yet")]
    ClaimGraceNotExpired,

    #[error("Fire time must be in the future")]
    FireTimeInPast,

    #[error("Deadline must be after fire time")]
    InvalidDeadline,

    #[error("Commitment is not in a valid state for this operation")]
    InvalidCommitmentState,

    #[error("Commitment is closed ({status:?})")]
    CommitmentClosed { status: CommitmentStatus },

    #[error("Commitment not found")]
    CommitmentNotFound,

    #[error("Commitment already exists at this address")]
    CommitmentAlreadyExists,

    #[error("Maximum snooze count reached")]
    MaxSnoozesReached,

    #[error("Caller is not the commitment owner")]
    Unauthorized,

    #[error("Buddy-only slash window active: only the buddy may slash")]
    BuddyOnlySlashWindow,

    #[error("Stale snooze count: expected {expected}, record has {actual}")]
    StaleSnoozeCount { expected: u8, actual: u8 },

    #[error("Invalid penalty route")]
    InvalidPenaltyRoute,

    #[error("Donate or Buddy route requires destination address")]
    PenaltyDestinationRequired,

    #[error("Penalty destination not set for this route")]
    PenaltyDestinationNotSet,

    #[error("Invalid penalty recipient address")]
    InvalidPenaltyRecipient,

    #[error("Deposit amount too small (minimum {minimum})")]
    DepositTooSmall { minimum: u64 },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Timestamps must not be negative")]
    NegativeTimestamp,

    #[error("Vault balance {balance} cannot cover {required}")]
    VaultUnderfunded { balance: u64, required: u64 },

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::DeadlinePassed
            | VaultError::DeadlineNotPassed
            | VaultError::TooEarly
            | VaultError::TooLateForRefund
            | VaultError::ClaimGraceExpired
            | VaultError::ClaimGraceNotExpired
            | VaultError::FireTimeInPast
            | VaultError::InvalidDeadline => ErrorKind::WindowViolation,

            VaultError::InvalidCommitmentState
            | VaultError::CommitmentClosed { .. }
            | VaultError::CommitmentNotFound
            | VaultError::CommitmentAlreadyExists
            | VaultError::MaxSnoozesReached => ErrorKind::InvalidState,

            VaultError::Unauthorized | VaultError::BuddyOnlySlashWindow => ErrorKind::Unauthorized,

            VaultError::StaleSnoozeCount { .. } => ErrorKind::StaleExpectation,

            VaultError::InvalidPenaltyRoute
            | VaultError::PenaltyDestinationRequired
            | VaultError::PenaltyDestinationNotSet
            | VaultError::InvalidPenaltyRecipient => ErrorKind::InvalidRoute,

            VaultError::DepositTooSmall { .. } => ErrorKind::BelowMinimum,

            VaultError::Overflow | VaultError::NegativeTimestamp => ErrorKind::Overflow,

            VaultError::VaultUnderfunded { .. }
            | VaultError::CorruptRecord(_)
            | VaultError::Config(_)
            | VaultError::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// True when the same request can succeed later without anyone else
    /// acting first: the window it needs simply has not opened yet.
    pub fn is_retryable_later(&self) -> bool {
        matches!(
            self,
            VaultError::TooEarly
                | VaultError::DeadlineNotPassed
                | VaultError::ClaimGraceNotExpired
                | VaultError::BuddyOnlySlashWindow
        )
    }
}
