//! Pure business logic helpers. No store or clock dependency.
//!
//! Handlers delegate arithmetic and validation here so the rules can be
//! tested without an engine.

use crate::config::VaultConfig;
use crate::constants::SNOOZE_SHIFT_CAP;
use crate::error::{Result, VaultError};
use crate::state::PenaltyRoute;
use anchor_lang::prelude::Pubkey;

// =========================================================================
// Snooze cost arithmetic
// =========================================================================

/// Calculate the snooze cost (before reserve-floor capping).
///
/// Formula: `min(remaining * snooze_percent / 100 * 2^snooze_count, remaining)`
///
/// The percentage is taken in `u128`, so the base cost is exact for any
/// deposit. The exponent is capped at [`SNOOZE_SHIFT_CAP`] and a product
/// past the remaining deposit yields the remaining deposit.
pub fn snooze_cost(remaining_amount: u64, snooze_count: u8, snooze_percent: u64) -> u64 {
    let remaining = u128::from(remaining_amount);
    let base = remaining * u128::from(snooze_percent) / 100;

    let shift = u32::from(snooze_count.min(SNOOZE_SHIFT_CAP));
    let cost = base.saturating_mul(1u128 << shift).min(remaining);
    u64::try_from(cost).unwrap_or(remaining_amount)
}

/// Returns `true` when further snoozes should be blocked.
pub fn is_max_snooze(snooze_count: u8, max_snooze_count: u8) -> bool {
    snooze_count >= max_snooze_count
}

// =========================================================================
// Emergency refund penalty
// =========================================================================

/// Calculate the emergency refund penalty.
///
/// Formula: `initial * refund_penalty_percent / 100`, capped at `remaining`.
pub fn emergency_penalty(initial_amount: u64, remaining_amount: u64, penalty_percent: u64) -> u64 {
    let penalty = u128::from(initial_amount) * u128::from(penalty_percent) / 100;
    u64::try_from(penalty.min(u128::from(remaining_amount))).unwrap_or(remaining_amount)
}

/// Split the remaining deposit of a refund into `(penalty, payout)`.
pub fn refund_split(
    initial_amount: u64,
    remaining_amount: u64,
    penalty_percent: u64,
) -> (u64, u64) {
    let penalty = emergency_penalty(initial_amount, remaining_amount, penalty_percent);
    (penalty, remaining_amount - penalty)
}

// =========================================================================
// Creation validation (pure)
// =========================================================================

/// Validate commitment parameters before anything is allocated.
pub fn validate_commitment_params(
    fire_time: i64,
    deadline: i64,
    current_time: i64,
    deposit_amount: u64,
    penalty_route: PenaltyRoute,
    has_destination: bool,
    config: &VaultConfig,
) -> Result<()> {
    if fire_time < 0 || deadline < 0 {
        return Err(VaultError::NegativeTimestamp);
    }
    if deadline <= fire_time {
        return Err(VaultError::InvalidDeadline);
    }
    if fire_time <= current_time {
        return Err(VaultError::FireTimeInPast);
    }
    if deposit_amount < config.min_deposit {
        return Err(VaultError::DepositTooSmall {
            minimum: config.min_deposit,
        });
    }
    if penalty_route.requires_destination() && !has_destination {
        return Err(VaultError::PenaltyDestinationRequired);
    }

    // Every later window boundary and every snooze extension must stay
    // representable for the lifetime of the record.
    let max_extension = config
        .snooze_extension_seconds
        .checked_mul(i64::from(config.max_snooze_count))
        .ok_or(VaultError::Overflow)?;
    let latest_deadline = deadline
        .checked_add(max_extension)
        .ok_or(VaultError::Overflow)?;
    latest_deadline
        .checked_add(config.claim_grace_seconds.max(config.buddy_only_seconds))
        .ok_or(VaultError::Overflow)?;
    Ok(())
}

/// Resolve the deadline for a new commitment.
pub fn resolve_deadline(fire_time: i64, deadline: Option<i64>, grace_seconds: i64) -> Result<i64> {
    match deadline {
        Some(deadline) => Ok(deadline),
        None => fire_time
            .checked_add(grace_seconds)
            .ok_or(VaultError::Overflow),
    }
}

// =========================================================================
// Penalty routing
// =========================================================================

/// The single identity allowed to receive a slashed deposit.
///
/// For Burn route → `burn_sink`.
/// For Donate/Buddy → the stored `penalty_destination`.
pub fn expected_penalty_recipient(
    route: PenaltyRoute,
    burn_sink: &Pubkey,
    penalty_destination: Option<&Pubkey>,
) -> Result<Pubkey> {
    match route {
        PenaltyRoute::Burn => Ok(*burn_sink),
        PenaltyRoute::Donate | PenaltyRoute::Buddy => penalty_destination
            .copied()
            .ok_or(VaultError::PenaltyDestinationNotSet),
    }
}

/// Validate the penalty recipient address matches the expected target.
pub fn validate_penalty_recipient(
    route: PenaltyRoute,
    recipient: &Pubkey,
    burn_sink: &Pubkey,
    penalty_destination: Option<&Pubkey>,
) -> Result<()> {
    let expected = expected_penalty_recipient(route, burn_sink, penalty_destination)?;
    if *recipient != expected {
        return Err(VaultError::InvalidPenaltyRecipient);
    }
    Ok(())
}

// =========================================================================
// Snooze time extension
// =========================================================================

/// Calculate new fire_time and deadline after a snooze.
///
/// Returns `(new_fire_time, new_deadline)` or `None` on overflow.
pub fn snooze_time_extension(
    fire_time: i64,
    deadline: i64,
    extension_seconds: i64,
) -> Option<(i64, i64)> {
    let new_fire = fire_time.checked_add(extension_seconds)?;
    let new_deadline = deadline.checked_add(extension_seconds)?;
    Some((new_fire, new_deadline))
}

// =========================================================================
// Reserve-floor capping
// =========================================================================

/// Cap a deduction at what's available above the reserve floor.
///
/// Returns the actual deductible amount.
pub fn cap_at_reserve_floor(desired: u64, current_balance: u64, reserve_floor: u64) -> u64 {
    let available = current_balance.saturating_sub(reserve_floor);
    desired.min(available)
}
