//! Emergency refund instruction - owner can cancel before fire time for a penalty

use super::{
    close_pair, load_commitment, load_vault, require_owner, require_status, Context, Transition,
};
use crate::constants::BURN_SINK;
use crate::error::{Result, VaultError};
use crate::events::{EmergencyRefundExecuted, VaultEvent};
use crate::helpers;
use crate::state::CommitmentStatus;
use anchor_lang::prelude::Pubkey;

pub fn process_emergency_refund(ctx: &Context<'_>, address: Pubkey) -> Result<Transition> {
    let commitment = load_commitment(ctx, &address)?;
    require_owner(&commitment, &ctx.caller)?;
    require_status(&commitment, &[CommitmentStatus::Created])?;

    // Escape hatch only exists BEFORE fire time
    ensure!(ctx.now < commitment.fire_time, VaultError::TooLateForRefund);

    let (vault, vault_balance) = load_vault(ctx, &commitment)?;

    let (penalty, payout) = helpers::refund_split(
        commitment.initial_amount,
        commitment.remaining_amount,
        ctx.config.refund_penalty_percent,
    );
    let penalty = helpers::cap_at_reserve_floor(penalty, vault_balance, vault.reserve_floor);

    let closure = close_pair(
        ctx,
        &commitment,
        vault_balance,
        &[(BURN_SINK, penalty)],
        commitment.owner,
        payout,
        CommitmentStatus::Claimed,
    )?;

    tracing::debug!(
        owner = %commitment.owner,
        commitment = %address,
        remaining = commitment.remaining_amount,
        penalty,
        payout,
        "emergency refund prepared"
    );

    let event = VaultEvent::Refunded(EmergencyRefundExecuted {
        owner: commitment.owner,
        commitment: address,
        commitment_id: commitment.commitment_id,
        penalty_amount: penalty,
        returned_amount: payout,
        reserve_returned: closure.reserve_returned,
    });

    Ok(Transition {
        commitment: closure.commitment,
        batch: closure.batch,
        event,
    })
}
