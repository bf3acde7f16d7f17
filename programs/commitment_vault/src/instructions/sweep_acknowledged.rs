//! Sweep acknowledged instruction - permissionless owner return after claim grace.
//!
//! An owner who acknowledged in time but never got a claim through would
//! otherwise have funds stuck behind an owner-only gate. Anyone may sweep;
//! the value only ever goes back to the owner.

use super::{close_pair, load_commitment, load_vault, require_status, Context, Transition};
use crate::error::{Result, VaultError};
use crate::events::{CommitmentSwept, VaultEvent};
use crate::state::CommitmentStatus;
use crate::windows;
use anchor_lang::prelude::Pubkey;

pub fn process_sweep_acknowledged(ctx: &Context<'_>, address: Pubkey) -> Result<Transition> {
    let commitment = load_commitment(ctx, &address)?;
    require_status(&commitment, &[CommitmentStatus::Acknowledged])?;

    // Sweep is only allowed strictly after claim grace has expired.
    ensure!(
        windows::is_sweep_window(
            commitment.deadline,
            ctx.config.claim_grace_seconds,
            ctx.now
        ),
        VaultError::ClaimGraceNotExpired
    );

    let (_, vault_balance) = load_vault(ctx, &commitment)?;
    let closure = close_pair(
        ctx,
        &commitment,
        vault_balance,
        &[],
        commitment.owner,
        commitment.remaining_amount,
        CommitmentStatus::Claimed,
    )?;

    tracing::debug!(
        caller = %ctx.caller,
        owner = %commitment.owner,
        commitment = %address,
        returned = closure.stake_moved,
        "sweep prepared"
    );

    let event = VaultEvent::Swept(CommitmentSwept {
        owner: commitment.owner,
        commitment: address,
        commitment_id: commitment.commitment_id,
        returned_amount: closure.stake_moved,
        reserve_returned: closure.reserve_returned,
        caller: ctx.caller,
        timestamp: ctx.now,
    });

    Ok(Transition {
        commitment: closure.commitment,
        batch: closure.batch,
        event,
    })
}
