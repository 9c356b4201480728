//! Bin id <-> price conversion and the fixed-point helpers built on it.
//!
//! Prices are unsigned 128.128 fixed-point numbers held in a host `U256`:
//! `price(id) = (1 + bin_step / 10_000) ^ (id - 2^23)`, so id `2^23` quotes
//! one base unit for one quote unit.

use soroban_sdk::{Env, U256};

use crate::FloorError;

/// Fractional bits of a 128.128 price.
pub const SCALE_OFFSET: u32 = 128;

/// Bin id whose price is exactly 1.
pub const REAL_ID_SHIFT: i64 = 1 << 23;

pub const BASIS_POINT_MAX: u32 = 10_000;

/// Weight precision used by liquidity distributions (1e18 = 100%).
pub const PRECISION: u64 = 1_000_000_000_000_000_000;

/// Exponents must stay strictly below 2^20 so squaring never leaves 256 bits.
const MAX_EXPONENT: u64 = 1 << 20;

pub fn scale(e: &Env) -> U256 {
    U256::from_u32(e, 1).shl(SCALE_OFFSET)
}

fn u256_max(e: &Env) -> U256 {
    U256::from_parts(e, u64::MAX, u64::MAX, u64::MAX, u64::MAX)
}

fn from_amount(e: &Env, amount: i128) -> Result<U256, FloorError> {
    if amount < 0 {
        return Err(FloorError::MathOverflow);
    }
    Ok(U256::from_u128(e, amount as u128))
}

fn to_amount(value: &U256) -> Result<i128, FloorError> {
    match value.to_u128() {
        Some(v) if v <= i128::MAX as u128 => Ok(v as i128),
        _ => Err(FloorError::MathOverflow),
    }
}

/// `1 + bin_step / 10_000` in 128.128.
fn base_from_step(e: &Env, bin_step: u32) -> U256 {
    let step = U256::from_u32(e, bin_step)
        .shl(SCALE_OFFSET)
        .div(&U256::from_u32(e, BASIS_POINT_MAX));
    scale(e).add(&step)
}

/// Price of bin `id` as a 128.128 fixed-point number.
pub fn price_from_id(e: &Env, id: u32, bin_step: u32) -> Result<U256, FloorError> {
    if bin_step == 0 {
        return Err(FloorError::InvalidConfig);
    }
    let exponent = id as i64 - REAL_ID_SHIFT;
    pow(e, &base_from_step(e, bin_step), exponent)
}

/// `x ^ y` for a 128.128 `x`, by squaring.
///
/// Bases above one are inverted first so that every running value stays
/// below 2^128 and each product fits in 256 bits; the result is inverted back
/// at the end when needed.
pub fn pow(e: &Env, x: &U256, y: i64) -> Result<U256, FloorError> {
    let abs_y = y.unsigned_abs();
    if abs_y >= MAX_EXPONENT {
        return Err(FloorError::BinIdOverflow);
    }
    let one = scale(e);
    if abs_y == 0 {
        return Ok(one);
    }

    let mut invert = y < 0;
    let mut squared = x.clone();
    if squared >= one {
        squared = u256_max(e).div(&squared);
        invert = !invert;
    }

    let mut result = one;
    let mut remaining = abs_y;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.mul(&squared).shr(SCALE_OFFSET);
        }
        remaining >>= 1;
        if remaining > 0 {
            squared = squared.mul(&squared).shr(SCALE_OFFSET);
        }
    }

    if result == U256::from_u32(e, 0) {
        return Err(FloorError::BinIdOverflow);
    }
    if invert {
        Ok(u256_max(e).div(&result))
    } else {
        Ok(result)
    }
}

/// `ceil(amount * price / 2^128)`, the quote needed to buy `amount` base at
/// `price`.
///
/// The price is split into integer and fractional halves so that neither
/// partial product can exceed 256 bits. The result stays a `U256` because
/// the cost of buying a large supply high in the curve may not fit an
/// amount.
pub fn mul_shift_round_up(e: &Env, amount: i128, price: &U256) -> Result<U256, FloorError> {
    let amount = from_amount(e, amount)?;
    let whole = price.shr(SCALE_OFFSET);
    let frac = price.sub(&whole.shl(SCALE_OFFSET));

    let frac_product = amount.mul(&frac);
    let frac_part = frac_product.shr(SCALE_OFFSET);
    let mut result = amount.mul(&whole).add(&frac_part);
    if frac_part.shl(SCALE_OFFSET) != frac_product {
        result = result.add(&U256::from_u32(e, 1));
    }
    Ok(result)
}

/// `floor(amount * price / 2^128)`.
pub fn mul_shift_round_down(e: &Env, amount: i128, price: &U256) -> Result<i128, FloorError> {
    let amount = from_amount(e, amount)?;
    let whole = price.shr(SCALE_OFFSET);
    let frac = price.sub(&whole.shl(SCALE_OFFSET));
    let result = amount
        .mul(&whole)
        .add(&amount.mul(&frac).shr(SCALE_OFFSET));
    to_amount(&result)
}

/// `floor(amount * 2^128 / price)`, the base bought by `amount` quote at
/// `price`. Saturates at `i128::MAX` for prices far below one.
pub fn shift_div_round_down(e: &Env, amount: i128, price: &U256) -> Result<i128, FloorError> {
    if *price == U256::from_u32(e, 0) {
        return Err(FloorError::MathOverflow);
    }
    let result = from_amount(e, amount)?.shl(SCALE_OFFSET).div(price);
    Ok(to_amount(&result).unwrap_or(i128::MAX))
}

/// `floor(x * y / denominator)` for non-negative amounts.
pub fn mul_div_round_down(
    e: &Env,
    x: i128,
    y: i128,
    denominator: i128,
) -> Result<i128, FloorError> {
    if denominator <= 0 {
        return Err(FloorError::MathOverflow);
    }
    let product = from_amount(e, x)?.mul(&from_amount(e, y)?);
    to_amount(&product.div(&from_amount(e, denominator)?))
}

/// `ceil(x * y / denominator)` for non-negative amounts.
pub fn mul_div_round_up(
    e: &Env,
    x: i128,
    y: i128,
    denominator: i128,
) -> Result<i128, FloorError> {
    if denominator <= 0 {
        return Err(FloorError::MathOverflow);
    }
    let denominator = from_amount(e, denominator)?;
    let product = from_amount(e, x)?.mul(&from_amount(e, y)?);
    let quotient = product.div(&denominator);
    if quotient.mul(&denominator) != product {
        return to_amount(&quotient.add(&U256::from_u32(e, 1)));
    }
    to_amount(&quotient)
}

#[cfg(test)]
mod test {
    use super::*;

    const MID: u32 = REAL_ID_SHIFT as u32;

    #[test]
    fn test_price_at_mid_is_one() {
        let env = Env::default();
        assert_eq!(price_from_id(&env, MID, 25).unwrap(), scale(&env));
        assert_eq!(price_from_id(&env, MID, 100).unwrap(), scale(&env));
    }

    #[test]
    fn test_price_one_bin_up() {
        let env = Env::default();
        // 1.01 in 128.128, truncated once by the inversion round trip
        let expected = scale(&env).add(&scale(&env).div(&U256::from_u32(&env, 100)));
        let price = price_from_id(&env, MID + 1, 100).unwrap();
        let diff = if price > expected {
            price.sub(&expected)
        } else {
            expected.sub(&price)
        };
        assert!(diff <= U256::from_u32(&env, 4));
    }

    #[test]
    fn test_price_strictly_monotonic() {
        let env = Env::default();
        let mut previous = price_from_id(&env, MID - 50, 25).unwrap();
        for id in (MID - 49)..=(MID + 50) {
            let price = price_from_id(&env, id, 25).unwrap();
            assert!(price > previous, "price must grow with id {}", id);
            previous = price;
        }
    }

    #[test]
    fn test_price_composes_without_drift() {
        // price(MID - 2n) == price(MID - n)^2 after thousands of bins
        let env = Env::default();
        let half = price_from_id(&env, MID - 2_500, 25).unwrap();
        let full = price_from_id(&env, MID - 5_000, 25).unwrap();
        let squared = half.mul(&half).shr(SCALE_OFFSET);
        let drift = if squared > full {
            squared.sub(&full)
        } else {
            full.sub(&squared)
        };
        // relative drift below 1e-18
        let tolerance = full.div(&U256::from_u128(&env, 1_000_000_000_000_000_000));
        assert!(drift <= tolerance);
    }

    #[test]
    fn test_price_matches_whole_powers() {
        // bin_step 10_000 doubles the price every bin
        let env = Env::default();
        let expected = scale(&env).shl(10);
        let price = price_from_id(&env, MID + 10, 10_000).unwrap();
        let drift = if price > expected {
            price.sub(&expected)
        } else {
            expected.sub(&price)
        };
        assert!(drift <= expected.shr(64));
    }

    #[test]
    fn test_price_rejects_far_ids() {
        let env = Env::default();
        assert_eq!(
            price_from_id(&env, MID + (1 << 20), 25),
            Err(FloorError::BinIdOverflow)
        );
        assert_eq!(price_from_id(&env, 0, 25), Err(FloorError::BinIdOverflow));
        assert_eq!(price_from_id(&env, MID, 0), Err(FloorError::InvalidConfig));
    }

    #[test]
    fn test_mul_shift_rounding() {
        let env = Env::default();
        // 1.5
        let price = scale(&env).add(&scale(&env).shr(1));
        assert_eq!(
            mul_shift_round_up(&env, 3, &price).unwrap(),
            U256::from_u32(&env, 5)
        );
        assert_eq!(mul_shift_round_down(&env, 3, &price).unwrap(), 4);
        assert_eq!(
            mul_shift_round_up(&env, 4, &price).unwrap(),
            U256::from_u32(&env, 6)
        );
        assert_eq!(shift_div_round_down(&env, 7, &price).unwrap(), 4);
    }

    #[test]
    fn test_mul_shift_large_supply_high_price() {
        let env = Env::default();
        let price = scale(&env).shl(100);
        let cost = mul_shift_round_up(&env, i128::MAX, &price).unwrap();
        assert_eq!(cost, U256::from_u128(&env, i128::MAX as u128).shl(100));
    }

    #[test]
    fn test_shift_div_saturates() {
        let env = Env::default();
        assert_eq!(
            shift_div_round_down(&env, i128::MAX, &U256::from_u32(&env, 1)).unwrap(),
            i128::MAX
        );
    }

    #[test]
    fn test_mul_div() {
        let env = Env::default();
        assert_eq!(mul_div_round_down(&env, 10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div_round_up(&env, 10, 10, 3).unwrap(), 34);
        assert_eq!(mul_div_round_up(&env, 10, 9, 3).unwrap(), 30);
        assert_eq!(
            mul_div_round_down(&env, i128::MAX, i128::MAX, i128::MAX).unwrap(),
            i128::MAX
        );
        assert_eq!(
            mul_div_round_down(&env, 1, 1, 0),
            Err(FloorError::MathOverflow)
        );
    }
}
