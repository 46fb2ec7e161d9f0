use anchor_lang::prelude::*;

use crate::constants::PRICE_SCALE;
use crate::errors::VaultError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceiling,
}

/// Convert an asset amount to shares with virtual-offset protection against
/// empty-vault share-price manipulation.
///
/// Formula: shares = assets × (total_shares + 1) / (total_assets + 1)
///
/// The virtual share/asset pair keeps the conversion well-defined at
/// total_shares == 0 and makes donation-style inflation attacks unprofitable.
pub fn shares_from_assets(
    assets: u64,
    total_shares: u64,
    total_assets: u64,
    rounding: Rounding,
) -> Result<u64> {
    let virtual_shares = total_shares.checked_add(1).ok_or(VaultError::MathOverflow)?;
    let virtual_assets = total_assets.checked_add(1).ok_or(VaultError::MathOverflow)?;

    mul_div(assets, virtual_shares, virtual_assets, rounding)
}

/// Convert a share amount to assets with virtual-offset protection.
///
/// Formula: assets = shares × (total_assets + 1) / (total_shares + 1)
pub fn assets_from_shares(
    shares: u64,
    total_shares: u64,
    total_assets: u64,
    rounding: Rounding,
) -> Result<u64> {
    let virtual_shares = total_shares.checked_add(1).ok_or(VaultError::MathOverflow)?;
    let virtual_assets = total_assets.checked_add(1).ok_or(VaultError::MathOverflow)?;

    mul_div(shares, virtual_assets, virtual_shares, rounding)
}

/// Safe-mode variant: rejects a conversion that would mint zero shares.
/// Used where a nonzero result is economically required (e.g. a deposit that
/// would mint nothing must fail rather than silently succeed).
pub fn shares_from_assets_nonzero(
    assets: u64,
    total_shares: u64,
    total_assets: u64,
    rounding: Rounding,
) -> Result<u64> {
    let shares = shares_from_assets(assets, total_shares, total_assets, rounding)?;
    require!(shares > 0, VaultError::InsufficientShares);
    Ok(shares)
}

/// Safe-mode variant: rejects a conversion that would credit zero assets.
pub fn assets_from_shares_nonzero(
    shares: u64,
    total_shares: u64,
    total_assets: u64,
    rounding: Rounding,
) -> Result<u64> {
    let assets = assets_from_shares(shares, total_shares, total_assets, rounding)?;
    require!(assets > 0, VaultError::InsufficientAssets);
    Ok(assets)
}

/// Per-share price scaled by PRICE_SCALE, computed over the virtual-offset
/// totals so an empty vault prices at exactly 1.0.
pub fn share_price(total_shares: u64, total_assets: u64) -> Result<u64> {
    let virtual_shares = total_shares.checked_add(1).ok_or(VaultError::MathOverflow)?;
    let virtual_assets = total_assets.checked_add(1).ok_or(VaultError::MathOverflow)?;

    mul_div(virtual_assets, PRICE_SCALE, virtual_shares, Rounding::Floor)
}

/// Safe multiplication then division with configurable rounding.
///
/// Computes: (value × numerator) / denominator
/// Uses u128 intermediate to prevent overflow.
pub fn mul_div(value: u64, numerator: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);

    let product = (value as u128)
        .checked_mul(numerator as u128)
        .ok_or(VaultError::MathOverflow)?;

    let result = match rounding {
        Rounding::Floor => product / (denominator as u128),
        Rounding::Ceiling => {
            let denom = denominator as u128;
            product
                .checked_add(denom)
                .ok_or(VaultError::MathOverflow)?
                .checked_sub(1)
                .ok_or(VaultError::MathOverflow)?
                / denom
        }
    };

    require!(result <= u64::MAX as u128, VaultError::MathOverflow);
    Ok(result as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Floor).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Floor).unwrap(), 33);
    }

    #[test]
    fn test_mul_div_ceiling() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Ceiling).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Ceiling).unwrap(), 34);
    }

    #[test]
    fn test_genesis_identity() {
        // Empty vault: shares = assets * (0 + 1) / (0 + 1) = assets
        let shares = shares_from_assets(1000, 0, 0, Rounding::Floor).unwrap();
        assert_eq!(shares, 1000);

        let assets = assets_from_shares(1000, 0, 0, Rounding::Floor).unwrap();
        assert_eq!(assets, 1000);
    }

    #[test]
    fn test_proportional_conversion() {
        // Vault holds 2000 assets against 1000 shares (price 2.0)
        let shares = shares_from_assets(500, 1000, 2000, Rounding::Floor).unwrap();
        // 500 * 1001 / 2001 = 250 (floor)
        assert_eq!(shares, 250);

        let assets = assets_from_shares(250, 1000, 2000, Rounding::Floor).unwrap();
        // 250 * 2001 / 1001 = 499 (floor)
        assert_eq!(assets, 499);
    }

    #[test]
    fn test_round_trip_favors_vault() {
        // Deposit then redeem must never return more than was put in
        for (supply, assets_held) in [(0u64, 0u64), (1000, 1000), (1000, 2000), (333, 1000)] {
            let deposit = 777u64;
            let shares = shares_from_assets(deposit, supply, assets_held, Rounding::Floor).unwrap();
            let back = assets_from_shares(
                shares,
                supply + shares,
                assets_held + deposit,
                Rounding::Floor,
            )
            .unwrap();
            assert!(back <= deposit, "round trip leaked value: {back} > {deposit}");
            assert!(deposit - back <= 2, "round trip discrepancy too large");
        }
    }

    #[test]
    fn test_inflation_attack_unprofitable() {
        // Donate 1M into an empty vault, then deposit 1: the virtual share
        // makes the attacker's marginal deposit round to zero shares.
        let shares = shares_from_assets(1, 0, 1_000_000, Rounding::Floor).unwrap();
        assert_eq!(shares, 0);
    }

    #[test]
    fn test_safe_mode_rejects_zero_output() {
        let err = shares_from_assets_nonzero(1, 0, 1_000_000, Rounding::Floor).unwrap_err();
        assert_eq!(err, VaultError::InsufficientShares.into());

        let err = assets_from_shares_nonzero(0, 1000, 1000, Rounding::Floor).unwrap_err();
        assert_eq!(err, VaultError::InsufficientAssets.into());
    }

    #[test]
    fn test_share_price_scaling() {
        assert_eq!(share_price(0, 0).unwrap(), PRICE_SCALE);
        // 1000 shares over 2000 assets: (2001 * SCALE) / 1001 ≈ 1.999 * SCALE
        let price = share_price(1000, 2000).unwrap();
        assert!(price > PRICE_SCALE * 199 / 100 && price < PRICE_SCALE * 2);
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let large = u64::MAX / 2;
        assert!(shares_from_assets(large, large, large, Rounding::Floor).is_ok());
        assert!(assets_from_shares(large, large, large, Rounding::Ceiling).is_ok());
    }
}
