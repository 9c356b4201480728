//! What the controller owns inside the pool.

use soroban_sdk::{Address, Env, Vec};

use crate::{bin_math, pool::BinPoolClient, FloorError};

/// Controller claims over `[floor_id, roof_id]`.
#[derive(Clone, Debug)]
pub struct Holdings {
    pub base: i128,
    pub quote: i128,
    /// Quote claim per bin for `[floor_id, min(active_id, roof_id)]`,
    /// indexed by `id - floor_id`.
    pub quote_per_bin: Vec<i128>,
}

/// Sums the controller's claims over its range.
///
/// Claims are `shares * reserve / total_shares` rounded down, so holdings are
/// never overstated. Cost is linear in the range width, which the range
/// manager keeps below `max_range`.
pub fn amounts_in_range(
    e: &Env,
    pool: &BinPoolClient,
    owner: &Address,
    floor_id: u32,
    active_id: u32,
    roof_id: u32,
) -> Result<Holdings, FloorError> {
    let mut holdings = Holdings {
        base: 0,
        quote: 0,
        quote_per_bin: Vec::new(e),
    };
    if roof_id < floor_id {
        return Ok(holdings);
    }

    for id in floor_id..=roof_id {
        let shares = pool.balance_of(owner, &id);
        let (base, quote) = if shares > 0 {
            let total_shares = pool.total_supply(&id);
            let (bin_base, bin_quote) = pool.get_bin(&id);
            (
                bin_math::mul_div_round_down(e, shares, bin_base, total_shares)?,
                bin_math::mul_div_round_down(e, shares, bin_quote, total_shares)?,
            )
        } else {
            (0, 0)
        };

        holdings.base = holdings
            .base
            .checked_add(base)
            .ok_or(FloorError::MathOverflow)?;
        holdings.quote = holdings
            .quote
            .checked_add(quote)
            .ok_or(FloorError::MathOverflow)?;
        if id <= active_id {
            holdings.quote_per_bin.push_back(quote);
        }
    }

    Ok(holdings)
}
