use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Post a strategy's live valuation and current withdraw capacity
///
/// The vault treats strategy valuations as oracle input, the same posture
/// the async queue takes for its share price. The report lands in the
/// registry; the next accrual realizes it into the allocation ledger.
#[derive(Accounts)]
pub struct ReportStrategy<'info> {
    pub operator: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = operator @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn handler(
    ctx: Context<ReportStrategy>,
    strategy: Pubkey,
    total_value: u64,
    max_withdraw: u64,
) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;
    registry.report(&strategy, total_value, max_withdraw)?;

    emit!(StrategyReported {
        vault: ctx.accounts.vault_state.key(),
        strategy,
        total_value,
        max_withdraw,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
