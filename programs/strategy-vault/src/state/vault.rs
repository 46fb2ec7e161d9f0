use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, PRICE_SCALE, SECONDS_PER_YEAR};
use crate::errors::VaultError;
use crate::math::{
    assets_from_shares_nonzero, mul_div, share_price, shares_from_assets_nonzero, Rounding,
};

/// Global vault state tracking assets, shares, fees, and limits
///
/// Security considerations:
/// - Role pubkeys stored in state (not instruction args)
/// - Total assets are cached and reconciled explicitly, decoupled from the
///   live token balance so mid-transaction balance changes cannot move the
///   share price
/// - Bumps stored for efficient PDA signing
/// - 128 bytes padding for future upgrades
#[account]
pub struct VaultState {
    /// Admin role: strategy set, fee/limit configuration, upgrades
    pub authority: Pubkey,

    /// Operator role: allocation, valuation reports, epoch lifecycle
    pub operator: Pubkey,

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,

    /// Mint of the vault share token
    pub share_mint: Pubkey,

    /// Recipient of accrued management fees
    pub management_fee_recipient: Pubkey,

    /// Recipient of accrued performance fees
    pub performance_fee_recipient: Pubkey,

    /// All outstanding shares, including accrued-but-uncollected fee shares.
    /// The SPL mint supply lags this figure until collect_fees runs.
    pub total_shares: u64,

    /// Last-reconciled total value of vault holdings (idle + allocated)
    pub cached_total_assets: u64,

    /// Bookkept assets not allocated to any strategy
    pub idle_assets: u64,

    pub min_deposit_amount: u64,
    pub max_deposit_amount: u64,
    pub min_withdraw_amount: u64,
    pub max_withdraw_amount: u64,

    /// Accrued management-fee shares awaiting mint-out
    pub pending_management_fee_shares: u64,

    /// Accrued performance-fee shares awaiting mint-out
    pub pending_performance_fee_shares: u64,

    /// Per-share price (PRICE_SCALE fixed point) above which performance
    /// fees charge; never decreases
    pub high_water_mark: u64,

    /// Annualized management fee in basis points
    pub management_fee_bps: u16,

    /// Performance fee in basis points, charged above the high-water mark
    pub performance_fee_bps: u16,

    /// Timestamp of the last fee accrual; advances monotonically
    pub last_fee_accrual: i64,

    /// Schema/logic version for upgrade gating
    pub version: u16,

    /// Bump seed for vault state PDA
    pub bump: u8,

    /// Bump seed for share mint PDA
    pub share_bump: u8,

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,

    // Padding for future upgrades
    pub _reserved: [u8; 128],
}

/// Outcome of one yield/fee reconciliation, computed without mutation so
/// preview paths and the mutating accrual share one code path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccrualOutcome {
    /// idle + strategy-reported value, pre-fee
    pub gross_assets: u64,
    pub profit: u64,
    pub loss: u64,
    pub management_fee_assets: u64,
    pub performance_fee_assets: u64,
    pub management_fee_shares: u64,
    pub performance_fee_shares: u64,
    /// Post-accrual mark; never below the current one
    pub high_water_mark: u64,
}

impl AccrualOutcome {
    pub fn total_fee_shares(&self) -> u64 {
        self.management_fee_shares
            .saturating_add(self.performance_fee_shares)
    }
}

impl VaultState {
    /// Reconcile the cache against live strategy valuations and settle fees,
    /// without mutating state. `strategy_total` is the registry's summed
    /// reported value.
    pub fn preview_accrual(&self, strategy_total: u64, now: i64) -> Result<AccrualOutcome> {
        let gross = self
            .idle_assets
            .checked_add(strategy_total)
            .ok_or(VaultError::MathOverflow)?;

        let (profit, loss) = if gross >= self.cached_total_assets {
            (gross - self.cached_total_assets, 0)
        } else {
            (0, self.cached_total_assets - gross)
        };

        let mut outcome = AccrualOutcome {
            gross_assets: gross,
            profit,
            loss,
            high_water_mark: self.high_water_mark,
            ..Default::default()
        };

        // No holders to dilute (or nothing left to dilute them with); the
        // timestamp still advances on apply so a later first deposit is not
        // back-charged for the empty period.
        if self.total_shares == 0 || gross == 0 {
            return Ok(outcome);
        }

        let elapsed = (now.saturating_sub(self.last_fee_accrual)).max(0) as u64;
        let mut management_fee = self.management_fee_assets(elapsed)?;

        let price_now = share_price(self.total_shares, gross)?;
        let mut performance_fee = 0u64;
        if price_now > self.high_water_mark {
            performance_fee = self.performance_fee_assets(price_now - self.high_water_mark)?;
            outcome.high_water_mark = price_now;
        }

        // Fees can never consume the entire gross figure
        let fee_ceiling = gross.saturating_sub(1);
        management_fee = management_fee.min(fee_ceiling);
        performance_fee = performance_fee.min(fee_ceiling - management_fee);

        let diluted_base = gross - management_fee - performance_fee;
        outcome.management_fee_assets = management_fee;
        outcome.performance_fee_assets = performance_fee;
        outcome.management_fee_shares =
            mul_div(management_fee, self.total_shares, diluted_base, Rounding::Floor)?;
        outcome.performance_fee_shares =
            mul_div(performance_fee, self.total_shares, diluted_base, Rounding::Floor)?;

        Ok(outcome)
    }

    /// Commit a previously computed accrual outcome. The caller realizes the
    /// registry valuations (`StrategyRegistry::realize_valuations`) in the
    /// same transaction so asset conservation holds.
    pub fn apply_accrual(&mut self, outcome: &AccrualOutcome, now: i64) -> Result<()> {
        self.cached_total_assets = outcome.gross_assets;
        self.total_shares = self
            .total_shares
            .checked_add(outcome.total_fee_shares())
            .ok_or(VaultError::MathOverflow)?;
        self.pending_management_fee_shares = self
            .pending_management_fee_shares
            .checked_add(outcome.management_fee_shares)
            .ok_or(VaultError::MathOverflow)?;
        self.pending_performance_fee_shares = self
            .pending_performance_fee_shares
            .checked_add(outcome.performance_fee_shares)
            .ok_or(VaultError::MathOverflow)?;
        self.high_water_mark = outcome.high_water_mark;
        self.last_fee_accrual = self.last_fee_accrual.max(now);
        Ok(())
    }

    /// Post-accrual conversion totals for preview/max view paths
    pub fn preview_totals(&self, strategy_total: u64, now: i64) -> Result<(u64, u64)> {
        let outcome = self.preview_accrual(strategy_total, now)?;
        let supply = self
            .total_shares
            .checked_add(outcome.total_fee_shares())
            .ok_or(VaultError::MathOverflow)?;
        Ok((supply, outcome.gross_assets))
    }

    /// Time-prorated management fee on the standing cached figure
    fn management_fee_assets(&self, elapsed: u64) -> Result<u64> {
        if self.management_fee_bps == 0 || elapsed == 0 {
            return Ok(0);
        }
        let fee = (self.cached_total_assets as u128)
            .checked_mul(self.management_fee_bps as u128)
            .ok_or(VaultError::MathOverflow)?
            .checked_mul(elapsed as u128)
            .ok_or(VaultError::MathOverflow)?
            / (BPS_DENOMINATOR as u128 * SECONDS_PER_YEAR as u128);
        u64::try_from(fee).map_err(|_| error!(VaultError::MathOverflow))
    }

    /// Performance fee on the per-share value above the high-water mark
    fn performance_fee_assets(&self, excess_per_share: u64) -> Result<u64> {
        if self.performance_fee_bps == 0 {
            return Ok(0);
        }
        let excess_value = (excess_per_share as u128)
            .checked_mul(self.total_shares as u128)
            .ok_or(VaultError::MathOverflow)?
            / PRICE_SCALE as u128;
        let fee = excess_value
            .checked_mul(self.performance_fee_bps as u128)
            .ok_or(VaultError::MathOverflow)?
            / BPS_DENOMINATOR as u128;
        u64::try_from(fee).map_err(|_| error!(VaultError::MathOverflow))
    }

    // ---- conversions (post-accrual state) ----

    /// Shares minted for a deposit: floor, nonzero required
    pub fn shares_for_deposit(&self, assets: u64) -> Result<u64> {
        shares_from_assets_nonzero(
            assets,
            self.total_shares,
            self.cached_total_assets,
            Rounding::Floor,
        )
    }

    /// Assets owed for an exact-share mint: ceiling, nonzero required
    pub fn assets_for_mint(&self, shares: u64) -> Result<u64> {
        assets_from_shares_nonzero(
            shares,
            self.total_shares,
            self.cached_total_assets,
            Rounding::Ceiling,
        )
    }

    /// Shares burned for an exact-asset withdrawal: ceiling, nonzero required
    pub fn shares_for_withdraw(&self, assets: u64) -> Result<u64> {
        shares_from_assets_nonzero(
            assets,
            self.total_shares,
            self.cached_total_assets,
            Rounding::Ceiling,
        )
    }

    /// Assets returned for a redemption: floor, nonzero required
    pub fn assets_for_redeem(&self, shares: u64) -> Result<u64> {
        assets_from_shares_nonzero(
            shares,
            self.total_shares,
            self.cached_total_assets,
            Rounding::Floor,
        )
    }

    // ---- bounds ----

    pub fn check_deposit_bounds(&self, assets: u64) -> Result<()> {
        require!(assets >= self.min_deposit_amount, VaultError::DepositBelowMinimum);
        require!(assets <= self.max_deposit_amount, VaultError::DepositAboveMaximum);
        Ok(())
    }

    pub fn check_withdraw_bounds(&self, assets: u64) -> Result<()> {
        require!(assets >= self.min_withdraw_amount, VaultError::WithdrawBelowMinimum);
        require!(assets <= self.max_withdraw_amount, VaultError::WithdrawAboveMaximum);
        Ok(())
    }

    pub fn validate_fee_config(bps: u16, cap: u16, recipient: &Pubkey) -> Result<()> {
        require!(bps <= cap, VaultError::FeeTooHigh);
        if bps > 0 {
            require!(*recipient != Pubkey::default(), VaultError::FeeRecipientRequired);
        }
        Ok(())
    }

    pub fn validate_limits(min: u64, max: u64) -> Result<()> {
        require!(max >= min, VaultError::InvalidLimits);
        Ok(())
    }

    // ---- ledger transitions ----

    pub fn record_deposit(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.cached_total_assets = self
            .cached_total_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.idle_assets = self
            .idle_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    pub fn record_withdrawal(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.cached_total_assets = self
            .cached_total_assets
            .checked_sub(assets)
            .ok_or(VaultError::InsufficientAssets)?;
        self.idle_assets = self
            .idle_assets
            .checked_sub(assets)
            .ok_or(VaultError::InsufficientIdleAssets)?;
        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::InsufficientShares)?;
        Ok(())
    }

    /// Move bookkept assets between idle and allocated on an allocation push
    /// (`is_deposit`) or pull. The cache total is unchanged; only the split
    /// moves.
    pub fn record_allocation_shift(&mut self, is_deposit: bool, amount: u64) -> Result<()> {
        if is_deposit {
            self.idle_assets = self
                .idle_assets
                .checked_sub(amount)
                .ok_or(VaultError::InsufficientIdleAssets)?;
        } else {
            self.idle_assets = self
                .idle_assets
                .checked_add(amount)
                .ok_or(VaultError::MathOverflow)?;
        }
        Ok(())
    }

    /// Earmark a processed epoch's assets out of the vault: the burned
    /// shares leave supply and the assets leave idle/cached for the
    /// unclaimed pool.
    pub fn record_epoch_settlement(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.record_withdrawal(assets, shares)
    }

    /// Write a halted strategy's stranded allocation off the cache
    pub fn record_write_off(&mut self, amount: u64) -> Result<()> {
        self.cached_total_assets = self
            .cached_total_assets
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientAssets)?;
        Ok(())
    }

    pub fn collect_pending_fees(&mut self) -> (u64, u64) {
        let management = self.pending_management_fee_shares;
        let performance = self.pending_performance_fee_shares;
        self.pending_management_fee_shares = 0;
        self.pending_performance_fee_shares = 0;
        (management, performance)
    }
}
