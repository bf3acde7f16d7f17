//! Claim instruction - return deposit to owner

use super::{
    close_pair, load_commitment, load_vault, require_owner, require_status, Context, Transition,
};
use crate::error::{Result, VaultError};
use crate::events::{CommitmentClaimed, VaultEvent};
use crate::state::CommitmentStatus;
use crate::windows;
use anchor_lang::prelude::Pubkey;

pub fn process_claim(ctx: &Context<'_>, address: Pubkey) -> Result<Transition> {
    let commitment = load_commitment(ctx, &address)?;
    require_owner(&commitment, &ctx.caller)?;
    require_status(
        &commitment,
        &[CommitmentStatus::Created, CommitmentStatus::Acknowledged],
    )?;

    ensure!(ctx.now >= commitment.fire_time, VaultError::TooEarly);

    if commitment.status == CommitmentStatus::Acknowledged {
        // Acknowledged owners keep a grace window past the deadline.
        let claim_deadline =
            windows::claim_deadline_with_grace(commitment.deadline, ctx.config.claim_grace_seconds);
        ensure!(ctx.now <= claim_deadline, VaultError::ClaimGraceExpired);
    } else {
        ensure!(ctx.now < commitment.deadline, VaultError::DeadlinePassed);
    }

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
        owner = %commitment.owner,
        commitment = %address,
        returned = closure.stake_moved,
        reserve = closure.reserve_returned,
        "claim prepared"
    );

    let event = VaultEvent::Claimed(CommitmentClaimed {
        owner: commitment.owner,
        commitment: address,
        commitment_id: commitment.commitment_id,
        returned_amount: closure.stake_moved,
        reserve_returned: closure.reserve_returned,
    });

    Ok(Transition {
        commitment: closure.commitment,
        batch: closure.batch,
        event,
    })
}
