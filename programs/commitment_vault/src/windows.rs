//! Time window evaluation.
//!
//! Boundaries favor the earlier window: at `now == deadline` slash is open
//! and acknowledge/snooze are closed; at `now == deadline + claim_grace`
//! claim is still open and sweep is not. Window ends are computed with
//! saturating arithmetic so every function is total over `i64`.

use crate::config::VaultConfig;
use crate::state::{Commitment, CommitmentStatus, PenaltyRoute};
use anchor_lang::prelude::Pubkey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Refund,
    Acknowledge,
    Snooze,
    Claim,
    Sweep,
    Slash,
}

/// Valid when `current_time < fire_time`.
pub fn is_refund_window(fire_time: i64, current_time: i64) -> bool {
    current_time < fire_time
}

/// Valid when `fire_time <= current_time < deadline`.
pub fn is_acknowledge_window(fire_time: i64, deadline: i64, current_time: i64) -> bool {
    current_time >= fire_time && current_time < deadline
}

/// Same window as acknowledge.
pub fn is_snooze_window(fire_time: i64, deadline: i64, current_time: i64) -> bool {
    is_acknowledge_window(fire_time, deadline, current_time)
}

/// Claim window of an unacknowledged commitment: `fire_time <= now < deadline`.
pub fn is_claim_window(fire_time: i64, deadline: i64, current_time: i64) -> bool {
    current_time >= fire_time && current_time < deadline
}

/// Last instant an acknowledged commitment may still be claimed.
pub fn claim_deadline_with_grace(deadline: i64, claim_grace_seconds: i64) -> i64 {
    deadline.saturating_add(claim_grace_seconds)
}

/// Claim window of an acknowledged commitment:
/// `fire_time <= now <= deadline + claim_grace`.
pub fn is_claim_window_with_grace(
    fire_time: i64,
    deadline: i64,
    claim_grace_seconds: i64,
    current_time: i64,
) -> bool {
    current_time >= fire_time
        && current_time <= claim_deadline_with_grace(deadline, claim_grace_seconds)
}

/// Valid strictly after the claim grace window: `now > deadline + claim_grace`.
pub fn is_sweep_window(deadline: i64, claim_grace_seconds: i64, current_time: i64) -> bool {
    current_time > claim_deadline_with_grace(deadline, claim_grace_seconds)
}

/// Valid when `current_time >= deadline`.
pub fn is_slash_window(deadline: i64, current_time: i64) -> bool {
    current_time >= deadline
}

/// Valid when `deadline <= now < deadline + buddy_only_seconds`.
pub fn is_buddy_only_window(deadline: i64, buddy_only_seconds: i64, current_time: i64) -> bool {
    current_time >= deadline && current_time < deadline.saturating_add(buddy_only_seconds)
}

/// Operations legal for one commitment at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowReport {
    pub operations: Vec<Operation>,
    /// Set while slash is open but reserved for the buddy.
    pub slash_restricted_to: Option<Pubkey>,
}

impl WindowReport {
    pub fn permits(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    /// Whether `caller` may slash right now.
    pub fn permits_slash_by(&self, caller: &Pubkey) -> bool {
        self.permits(Operation::Slash)
            && self
                .slash_restricted_to
                .map_or(true, |buddy| buddy == *caller)
    }
}

/// Map `(now, commitment)` to the set of operations currently permitted.
///
/// Caller identity is not considered except for the buddy-only slash
/// restriction, which is reported rather than filtered.
pub fn evaluate(current_time: i64, commitment: &Commitment, config: &VaultConfig) -> WindowReport {
    let fire_time = commitment.fire_time;
    let deadline = commitment.deadline;
    let snooze_count = commitment.snooze_count;
    let mut report = WindowReport::default();

    match commitment.status {
        CommitmentStatus::Created => {
            if is_refund_window(fire_time, current_time) {
                report.operations.push(Operation::Refund);
            }
            if is_acknowledge_window(fire_time, deadline, current_time) {
                report.operations.push(Operation::Acknowledge);
            }
            if is_snooze_window(fire_time, deadline, current_time)
                && snooze_count < config.max_snooze_count
            {
                report.operations.push(Operation::Snooze);
            }
            if is_claim_window(fire_time, deadline, current_time) {
                report.operations.push(Operation::Claim);
            }
            if is_slash_window(deadline, current_time) {
                report.operations.push(Operation::Slash);
                if commitment.penalty_route == PenaltyRoute::Buddy
                    && is_buddy_only_window(deadline, config.buddy_only_seconds, current_time)
                {
                    report.slash_restricted_to = commitment.penalty_destination;
                }
            }
        }
        CommitmentStatus::Acknowledged => {
            if is_claim_window_with_grace(
                fire_time,
                deadline,
                config.claim_grace_seconds,
                current_time,
            ) {
                report.operations.push(Operation::Claim);
            }
            if is_sweep_window(deadline, config.claim_grace_seconds, current_time) {
                report.operations.push(Operation::Sweep);
            }
        }
        CommitmentStatus::Claimed | CommitmentStatus::Slashed => {}
    }

    report
}
