//! Protocol constants
//!
//! These are the defaults behind [`crate::config::VaultConfig`]. Handlers never
//! read them directly; they read the engine's config so every value can be
//! overridden per deployment.

use anchor_lang::prelude::*;

/// Sink identity for burned value. Nobody holds a key for it, so anything
/// moved here is gone for good.
pub const BURN_SINK: Pubkey = Pubkey::new_from_array([
    0, 51, 144, 114, 141, 52, 17, 96, 121, 189, 201, 17, 191, 255, 0, 219, 212, 77, 46, 205, 204,
    247, 156, 166, 225, 0, 56, 225, 0, 0, 0, 0,
]);

/// Default snooze cost percentage (10% of remaining)
pub const DEFAULT_SNOOZE_PERCENT: u64 = 10;

/// Maximum snooze count before snoozing is refused
pub const MAX_SNOOZE_COUNT: u8 = 10;

/// Highest exponent used for the snooze multiplier. `2^30` times any u64 base
/// still fits the checked multiply path without a shift overflow.
pub const SNOOZE_SHIFT_CAP: u8 = 30;

/// Minimum deposit amount in base units
pub const MIN_DEPOSIT_AMOUNT: u64 = 1_000_000;

/// Emergency refund penalty percent (5% of the initial deposit)
pub const EMERGENCY_REFUND_PENALTY_PERCENT: u64 = 5;

/// Window between fire time and deadline when the caller does not give one.
/// Default: 30 minutes = 1800 seconds
pub const DEFAULT_GRACE_PERIOD: i64 = 1800;

/// Default snooze extension (in seconds)
/// Default: 5 minutes = 300 seconds
pub const DEFAULT_SNOOZE_EXTENSION_SECONDS: i64 = 300;

/// Claim grace window after `commitment.deadline` (in seconds).
///
/// If the owner acknowledged in time, they may still claim up to
/// `deadline + CLAIM_GRACE_SECONDS`.
pub const CLAIM_GRACE_SECONDS: i64 = 120;

/// Buddy-only slash window after `commitment.deadline` (in seconds).
///
/// Only applies when `penalty_route == Buddy`. During this window, only the buddy
/// (the configured `penalty_destination`) may call `slash`. After it expires,
/// slash becomes permissionless again.
pub const BUDDY_ONLY_SECONDS: i64 = 120;

/// Balance a vault must keep while open, on top of the amount at stake.
/// Paid by the owner at creation and returned to the owner on close.
pub const VAULT_RESERVE_FLOOR: u64 = 890_880;

/// Domain separators for derived addresses.
pub const COMMITMENT_SEED: &[u8] = b"commitment";
pub const VAULT_SEED: &[u8] = b"vault";
