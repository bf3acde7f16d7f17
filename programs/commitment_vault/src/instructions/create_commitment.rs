//! Create commitment instruction - lock a deposit behind a wake-up promise

use super::{decode_route, Context, Transition};
use crate::error::{Result, VaultError};
use crate::events::{CommitmentCreated, VaultEvent};
use crate::helpers;
use crate::state::{decode, encode, ClosedCommitment, Commitment, CommitmentStatus, Vault};
use crate::store::{Slot, WriteBatch};
use anchor_lang::prelude::Pubkey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateCommitmentArgs {
    pub commitment_id: u64,
    pub fire_time: i64,
    /// `None` means `fire_time + default_grace_seconds`
    pub deadline: Option<i64>,
    pub deposit_amount: u64,
    /// 0 = Burn, 1 = Donate, 2 = Buddy
    pub penalty_route: u8,
    pub penalty_destination: Option<Pubkey>,
}

pub fn process_create_commitment(
    ctx: &Context<'_>,
    args: CreateCommitmentArgs,
) -> Result<Transition> {
    let owner = ctx.caller;
    let address = Commitment::derive_address(&owner, args.commitment_id);

    // Same owner + id always resolves here; a retired address stays retired.
    match ctx.store.load(&address)? {
        Some(Slot::Open(_)) => return Err(VaultError::CommitmentAlreadyExists),
        Some(Slot::Retired(data)) => {
            let closed: ClosedCommitment = decode(&data)?;
            return Err(VaultError::CommitmentClosed {
                status: closed.status,
            });
        }
        None => {}
    }

    let route = decode_route(args.penalty_route)?;
    let deadline = helpers::resolve_deadline(
        args.fire_time,
        args.deadline,
        ctx.config.default_grace_seconds,
    )?;
    helpers::validate_commitment_params(
        args.fire_time,
        deadline,
        ctx.now,
        args.deposit_amount,
        route,
        args.penalty_destination.is_some(),
        ctx.config,
    )?;

    let reserve_floor = ctx.config.vault_reserve_floor;
    let funding = args
        .deposit_amount
        .checked_add(reserve_floor)
        .ok_or(VaultError::Overflow)?;

    let vault_address = Vault::derive_address(&address);
    let commitment = Commitment {
        owner,
        commitment_id: args.commitment_id,
        fire_time: args.fire_time,
        deadline,
        initial_amount: args.deposit_amount,
        remaining_amount: args.deposit_amount,
        penalty_route: route,
        penalty_destination: if route.requires_destination() {
            args.penalty_destination
        } else {
            None
        },
        snooze_count: 0,
        status: CommitmentStatus::Created,
        vault: vault_address,
        created_at: ctx.now,
        acknowledged_at: None,
    };
    let vault = Vault {
        commitment: address,
        reserve_floor,
    };

    let mut batch = WriteBatch::new();
    batch
        .transfer(owner, vault_address, funding)
        .put(address, encode(&commitment))
        .put(vault_address, encode(&vault));

    tracing::debug!(
        owner = %owner,
        commitment = %address,
        fire_time = args.fire_time,
        deadline,
        deposit = args.deposit_amount,
        reserve = reserve_floor,
        "commitment prepared"
    );

    let event = VaultEvent::Created(CommitmentCreated {
        owner,
        commitment: address,
        commitment_id: args.commitment_id,
        fire_time: args.fire_time,
        deadline,
        deposit_amount: args.deposit_amount,
        reserve_amount: reserve_floor,
        penalty_route: route.into(),
    });

    Ok(Transition {
        commitment,
        batch,
        event,
    })
}
