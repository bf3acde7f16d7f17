//! Slash instruction - transfer deposit after deadline (Buddy route has an initial buddy-only window)

use super::{close_pair, load_commitment, load_vault, require_status, Context, Transition};
use crate::constants::BURN_SINK;
use crate::error::{Result, VaultError};
use crate::events::{CommitmentSlashed, VaultEvent};
use crate::helpers;
use crate::state::{CommitmentStatus, PenaltyRoute};
use crate::windows;
use anchor_lang::prelude::Pubkey;

pub fn process_slash(
    ctx: &Context<'_>,
    address: Pubkey,
    penalty_recipient: Pubkey,
) -> Result<Transition> {
    let commitment = load_commitment(ctx, &address)?;

    // Acknowledgement makes slash impossible.
    require_status(&commitment, &[CommitmentStatus::Created])?;

    // Can only slash AFTER deadline
    ensure!(
        windows::is_slash_window(commitment.deadline, ctx.now),
        VaultError::DeadlineNotPassed
    );

    // Buddy-only window: for a short period after deadline, only the buddy may slash.
    if commitment.penalty_route == PenaltyRoute::Buddy
        && windows::is_buddy_only_window(
            commitment.deadline,
            ctx.config.buddy_only_seconds,
            ctx.now,
        )
    {
        let buddy = commitment
            .penalty_destination
            .ok_or(VaultError::PenaltyDestinationNotSet)?;
        ensure!(ctx.caller == buddy, VaultError::BuddyOnlySlashWindow);
    }

    helpers::validate_penalty_recipient(
        commitment.penalty_route,
        &penalty_recipient,
        &BURN_SINK,
        commitment.penalty_destination.as_ref(),
    )?;

    let (_, vault_balance) = load_vault(ctx, &commitment)?;
    let closure = close_pair(
        ctx,
        &commitment,
        vault_balance,
        &[],
        penalty_recipient,
        commitment.remaining_amount,
        CommitmentStatus::Slashed,
    )?;

    tracing::debug!(
        caller = %ctx.caller,
        commitment = %address,
        recipient = %penalty_recipient,
        route = ?commitment.penalty_route,
        slashed = closure.stake_moved,
        "slash prepared"
    );

    let event = VaultEvent::Slashed(CommitmentSlashed {
        commitment: address,
        commitment_id: commitment.commitment_id,
        penalty_recipient,
        slashed_amount: closure.stake_moved,
        reserve_returned: closure.reserve_returned,
        caller: ctx.caller,
    });

    Ok(Transition {
        commitment: closure.commitment,
        batch: closure.batch,
        event,
    })
}
