//! Acknowledge instruction - record wake proof completion
//!
//! Called by the owner after completing the wake proof on the client side.
//! It transitions the commitment from Created → Acknowledged. Once
//! acknowledged, slash is impossible for the lifetime of the record.

use super::{load_commitment, require_owner, require_status, Context, Transition};
use crate::error::{Result, VaultError};
use crate::events::{VaultEvent, WakeAcknowledged};
use crate::state::{encode, CommitmentStatus};
use crate::store::WriteBatch;
use anchor_lang::prelude::Pubkey;

pub fn process_acknowledge(ctx: &Context<'_>, address: Pubkey) -> Result<Transition> {
    let mut commitment = load_commitment(ctx, &address)?;
    require_owner(&commitment, &ctx.caller)?;
    require_status(&commitment, &[CommitmentStatus::Created])?;

    // Acknowledge opens at fire_time
    ensure!(ctx.now >= commitment.fire_time, VaultError::TooEarly);

    // Can only acknowledge before deadline
    ensure!(ctx.now < commitment.deadline, VaultError::DeadlinePassed);

    commitment.status = CommitmentStatus::Acknowledged;
    commitment.acknowledged_at = Some(ctx.now);

    let mut batch = WriteBatch::new();
    batch.put(address, encode(&commitment));

    tracing::debug!(
        owner = %ctx.caller,
        commitment = %address,
        timestamp = ctx.now,
        "acknowledgement prepared"
    );

    let event = VaultEvent::Acknowledged(WakeAcknowledged {
        owner: ctx.caller,
        commitment: address,
        commitment_id: commitment.commitment_id,
        timestamp: ctx.now,
    });

    Ok(Transition {
        commitment,
        batch,
        event,
    })
}
