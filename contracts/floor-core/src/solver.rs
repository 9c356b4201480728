//! Where the floor can move to.

use soroban_sdk::{Env, Vec, U256};

use crate::{bin_math, FloorError};

/// Highest bin the floor can move to while the quote held in the range still
/// buys back every circulating token at or above that bin's price.
///
/// Walks down from `active_id`. A bin qualifies when `quote_available` covers
/// `circulating_supply * price` (rounded up). Otherwise sellers would drain
/// that bin before reaching lower prices, so its quote leaves the budget and
/// the base it buys back leaves the circulating supply before the next bin is
/// tried.
///
/// The result is strictly below `active_id` so the pool always quotes above
/// the new floor bin.
pub fn compute_new_floor_id(
    e: &Env,
    bin_step: u32,
    floor_id: u32,
    active_id: u32,
    circulating_supply: i128,
    quote_available: i128,
    quote_per_bin: &Vec<i128>,
) -> Result<u32, FloorError> {
    if floor_id >= active_id {
        return Ok(floor_id);
    }

    let mut circulating = circulating_supply.max(0);
    let mut available = quote_available.max(0);
    let mut id = active_id;

    while id > floor_id {
        let price = bin_math::price_from_id(e, id, bin_step)?;
        let needed = bin_math::mul_shift_round_up(e, circulating, &price)?;
        if U256::from_u128(e, available as u128) >= needed {
            break;
        }

        let bin_quote = quote_per_bin.get(id - floor_id).unwrap_or(0);
        available = available.saturating_sub(bin_quote).max(0);
        let bought_back = bin_math::shift_div_round_down(e, bin_quote, &price)?;
        circulating = circulating.saturating_sub(bought_back).max(0);

        id -= 1;
    }

    Ok(id.min(active_id - 1))
}
