//! Snooze instruction - trade part of the deposit for extra time

use super::{load_commitment, load_vault, require_owner, require_status, Context, Transition};
use crate::constants::BURN_SINK;
use crate::error::{Result, VaultError};
use crate::events::{CommitmentSnoozed, VaultEvent};
use crate::helpers;
use crate::state::{encode, CommitmentStatus};
use crate::store::WriteBatch;
use anchor_lang::prelude::Pubkey;

pub fn process_snooze(
    ctx: &Context<'_>,
    address: Pubkey,
    expected_snooze_count: u8,
) -> Result<Transition> {
    let mut commitment = load_commitment(ctx, &address)?;
    require_owner(&commitment, &ctx.caller)?;
    require_status(&commitment, &[CommitmentStatus::Created])?;

    // Idempotency guard: a resubmitted snooze carries a stale count and must
    // never be charged twice.
    ensure!(
        expected_snooze_count == commitment.snooze_count,
        VaultError::StaleSnoozeCount {
            expected: expected_snooze_count,
            actual: commitment.snooze_count,
        }
    );

    ensure!(
        !helpers::is_max_snooze(commitment.snooze_count, ctx.config.max_snooze_count),
        VaultError::MaxSnoozesReached
    );

    // Cannot snooze BEFORE fire time
    ensure!(ctx.now >= commitment.fire_time, VaultError::TooEarly);

    // Check deadline not passed
    ensure!(ctx.now < commitment.deadline, VaultError::DeadlinePassed);

    let (vault, vault_balance) = load_vault(ctx, &commitment)?;

    // Exponential: snooze_percent * 2^snooze_count of what is left
    let cost = helpers::snooze_cost(
        commitment.remaining_amount,
        commitment.snooze_count,
        ctx.config.snooze_percent,
    );
    let cost = helpers::cap_at_reserve_floor(cost, vault_balance, vault.reserve_floor);

    let (new_fire_time, new_deadline) = helpers::snooze_time_extension(
        commitment.fire_time,
        commitment.deadline,
        ctx.config.snooze_extension_seconds,
    )
    .ok_or(VaultError::Overflow)?;

    commitment.remaining_amount = commitment
        .remaining_amount
        .checked_sub(cost)
        .ok_or(VaultError::Overflow)?;
    commitment.snooze_count = commitment
        .snooze_count
        .checked_add(1)
        .ok_or(VaultError::Overflow)?;
    commitment.fire_time = new_fire_time;
    commitment.deadline = new_deadline;

    let mut batch = WriteBatch::new();
    batch
        .transfer(commitment.vault, BURN_SINK, cost)
        .put(address, encode(&commitment));

    tracing::debug!(
        commitment = %address,
        snooze = commitment.snooze_count,
        cost,
        remaining = commitment.remaining_amount,
        "snooze prepared"
    );

    let event = VaultEvent::Snoozed(CommitmentSnoozed {
        owner: commitment.owner,
        commitment: address,
        commitment_id: commitment.commitment_id,
        snooze_count: commitment.snooze_count,
        cost,
        remaining: commitment.remaining_amount,
        new_fire_time,
        new_deadline,
    });

    Ok(Transition {
        commitment,
        batch,
        event,
    })
}
