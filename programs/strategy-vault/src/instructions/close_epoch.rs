use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Close the active epoch and open the next one
///
/// Fails while the previous epoch is still awaiting its price: at most one
/// epoch is ever closed-but-unprocessed.
#[derive(Accounts)]
pub struct CloseEpoch<'info> {
    pub operator: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = operator @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [WITHDRAWAL_QUEUE_SEED, vault_state.key().as_ref()],
        bump = withdrawal_queue.bump,
    )]
    pub withdrawal_queue: Account<'info, WithdrawalQueue>,
}

pub fn handler(ctx: Context<CloseEpoch>) -> Result<()> {
    let queue = &mut ctx.accounts.withdrawal_queue;
    let (closed_epoch, requested_shares, new_active_epoch) = queue.close_epoch()?;

    emit!(EpochClosed {
        vault: ctx.accounts.vault_state.key(),
        closed_epoch,
        new_active_epoch,
        requested_shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
