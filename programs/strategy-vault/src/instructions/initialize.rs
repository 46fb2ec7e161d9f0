use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeParams {
    /// Operator role: allocation, valuation reports, epoch lifecycle
    pub operator: Pubkey,
    pub management_fee_bps: u16,
    pub management_fee_recipient: Pubkey,
    pub performance_fee_bps: u16,
    pub performance_fee_recipient: Pubkey,
    pub min_deposit_amount: u64,
    pub max_deposit_amount: u64,
    pub min_withdraw_amount: u64,
    pub max_withdraw_amount: u64,
}

/// Initialize a new vault for a given asset token
///
/// Invoked exactly once by the deploying factory; Anchor's `init`
/// constraints make re-initialization fail.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Vault authority - admin role, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    #[account(
        init,
        payer = authority,
        space = VAULT_STATE_SIZE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Asset token mint (the underlying token users deposit)
    pub asset_mint: Account<'info, Mint>,

    /// Share token mint PDA (vault shares)
    #[account(
        init,
        payer = authority,
        seeds = [SHARE_MINT_SEED, asset_mint.key().as_ref()],
        bump,
        mint::decimals = asset_mint.decimals,
        mint::authority = vault_authority,
    )]
    pub share_mint: Account<'info, Mint>,

    /// Vault authority PDA - mint authority for shares and owner of the
    /// vault's token accounts
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's idle asset account
    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    /// Vault's own share account, escrow for queued redemption requests
    #[account(
        init,
        payer = authority,
        associated_token::mint = share_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_share_account: Account<'info, TokenAccount>,

    /// Strategy registry PDA
    #[account(
        init,
        payer = authority,
        space = STRATEGY_REGISTRY_SIZE,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    /// Withdrawal queue PDA, starts at epoch 1
    #[account(
        init,
        payer = authority,
        space = WITHDRAWAL_QUEUE_SIZE,
        seeds = [WITHDRAWAL_QUEUE_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub withdrawal_queue: Account<'info, WithdrawalQueue>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    // CHECKS: fee and limit configuration must be coherent from the start
    VaultState::validate_fee_config(
        params.management_fee_bps,
        MAX_MANAGEMENT_FEE_BPS,
        &params.management_fee_recipient,
    )?;
    VaultState::validate_fee_config(
        params.performance_fee_bps,
        MAX_PERFORMANCE_FEE_BPS,
        &params.performance_fee_recipient,
    )?;
    VaultState::validate_limits(params.min_deposit_amount, params.max_deposit_amount)?;
    VaultState::validate_limits(params.min_withdraw_amount, params.max_withdraw_amount)?;

    let now = Clock::get()?.unix_timestamp;

    // EFFECTS: Initialize vault state
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.authority = ctx.accounts.authority.key();
    vault_state.operator = params.operator;
    vault_state.asset_mint = ctx.accounts.asset_mint.key();
    vault_state.share_mint = ctx.accounts.share_mint.key();
    vault_state.management_fee_recipient = params.management_fee_recipient;
    vault_state.performance_fee_recipient = params.performance_fee_recipient;
    vault_state.total_shares = 0;
    vault_state.cached_total_assets = 0;
    vault_state.idle_assets = 0;
    vault_state.min_deposit_amount = params.min_deposit_amount;
    vault_state.max_deposit_amount = params.max_deposit_amount;
    vault_state.min_withdraw_amount = params.min_withdraw_amount;
    vault_state.max_withdraw_amount = params.max_withdraw_amount;
    vault_state.pending_management_fee_shares = 0;
    vault_state.pending_performance_fee_shares = 0;
    vault_state.high_water_mark = PRICE_SCALE;
    vault_state.management_fee_bps = params.management_fee_bps;
    vault_state.performance_fee_bps = params.performance_fee_bps;
    vault_state.last_fee_accrual = now;
    vault_state.version = 1;
    vault_state.bump = ctx.bumps.vault_state;
    vault_state.share_bump = ctx.bumps.share_mint;
    vault_state.authority_bump = ctx.bumps.vault_authority;
    vault_state._reserved = [0; 128];

    let registry = &mut ctx.accounts.strategy_registry;
    registry.vault = vault_state.key();
    registry.strategies = Vec::new();
    registry.deallocation_order = Vec::new();
    registry.bump = ctx.bumps.strategy_registry;

    let queue = &mut ctx.accounts.withdrawal_queue;
    queue.vault = vault_state.key();
    queue.active_epoch_id = 1;
    queue.unclaimed_assets = 0;
    queue.epochs = vec![EpochEntry {
        id: 1,
        total_requested_shares: 0,
        price_per_share: None,
    }];
    queue.requests = Vec::new();
    queue.bump = ctx.bumps.withdrawal_queue;

    // INTERACTIONS: Emit event
    emit!(VaultInitialized {
        vault: vault_state.key(),
        authority: vault_state.authority,
        operator: vault_state.operator,
        asset_mint: vault_state.asset_mint,
        share_mint: vault_state.share_mint,
        timestamp: now,
    });

    Ok(())
}
