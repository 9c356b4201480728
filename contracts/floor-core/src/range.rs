//! Roof mutations: minting fresh inventory above the range and retiring
//! inventory from its top.

use soroban_sdk::{vec, Address, Env, Symbol, Vec};

use crate::{
    bin_math,
    guard,
    pool::{BinPoolClient, LiquidityConfig},
    storage, FloorError, FloorLedger,
};

/// Base held by the pool that neither its reserves nor its protocol fees
/// account for, i.e. tokens sent to it directly.
fn unaccounted_base<L: FloorLedger>(e: &Env, pool: &BinPoolClient, pool_id: &Address) -> i128 {
    let (reserve_base, _) = pool.get_reserves();
    let (fee_base, _) = pool.get_protocol_fees();
    (L::balance(e, pool_id) - reserve_base - fee_base).max(0)
}

/// Mints `token_per_bin * nb_bins` into the bins right above the roof, or
/// into `[floor, floor + nb_bins)` for the first raise.
///
/// Base already sitting unaccounted in the pool is folded into the deposit
/// and only the difference is minted, so a direct transfer to the pool
/// cannot inflate the inventory. Each new bin must end up holding exactly
/// `token_per_bin`; anything else fails with
/// [`FloorError::InventoryMismatch`].
pub fn raise_roof<L: FloorLedger>(e: &Env, nb_bins: u32) -> Result<(), FloorError> {
    if nb_bins == 0 {
        return Err(FloorError::ZeroBins);
    }
    let config = storage::get_config(e)?;

    guard::non_reentrant(e, || {
        let (floor_id, roof_id) = storage::get_range(e);
        let pool = BinPoolClient::new(e, &config.pool);
        let active_id = pool.get_active_id();

        let (from_id, top_id) = if roof_id == 0 {
            (floor_id, floor_id)
        } else {
            (roof_id.checked_add(1).ok_or(FloorError::BinIdOverflow)?, roof_id)
        };
        if active_id > top_id {
            return Err(FloorError::ActiveIdAboveRoof);
        }
        let new_roof_id = from_id
            .checked_add(nb_bins - 1)
            .ok_or(FloorError::BinIdOverflow)?;
        if new_roof_id - floor_id > config.max_range {
            return Err(FloorError::MaxRangeExceeded);
        }
        // the new top must be priceable
        bin_math::price_from_id(e, new_roof_id, config.bin_step)?;

        let amount = config
            .token_per_bin
            .checked_mul(nb_bins as i128)
            .ok_or(FloorError::MathOverflow)?;

        let stray = unaccounted_base::<L>(e, &pool, &config.pool);
        if amount > stray {
            L::mint(e, &config.pool, amount - stray);
        } else if stray > amount {
            L::burn(e, &config.pool, stray - amount);
        }

        let this = e.current_contract_address();
        let (reserve_before, _) = pool.get_reserves();
        for id in from_id..=new_roof_id {
            let deposited = pool.deposit(
                &this,
                &config.pool,
                &config.token_per_bin,
                &0,
                &vec![
                    e,
                    LiquidityConfig {
                        id,
                        distribution_base: bin_math::PRECISION,
                        distribution_quote: 0,
                    },
                ],
            );
            if deposited.base_received != config.token_per_bin {
                return Err(FloorError::InventoryMismatch);
            }
        }
        let (reserve_after, _) = pool.get_reserves();
        if reserve_after - reserve_before != amount
            || unaccounted_base::<L>(e, &pool, &config.pool) != 0
        {
            return Err(FloorError::InventoryMismatch);
        }

        storage::set_roof_id(e, new_roof_id);
        e.events().publish(
            (Symbol::new(e, "roof_raised"),),
            (roof_id, new_roof_id, amount),
        );
        Ok(())
    })
}

/// Withdraws the top `nb_bins` of the range and retires the base they held.
///
/// The new roof has to stay strictly above the active bin so the floor
/// inventory is never touched. Proceeds are withdrawn into the pool and
/// burned from its balance there, which keeps the pool from having to
/// call back into this token.
pub fn reduce_roof<L: FloorLedger>(e: &Env, nb_bins: u32) -> Result<(), FloorError> {
    if nb_bins == 0 {
        return Err(FloorError::ZeroBins);
    }
    let config = storage::get_config(e)?;

    guard::non_reentrant(e, || {
        let (floor_id, roof_id) = storage::get_range(e);
        if roof_id == 0 || nb_bins > roof_id - floor_id {
            return Err(FloorError::RoofBelowFloor);
        }
        let new_roof_id = roof_id - nb_bins;

        let pool = BinPoolClient::new(e, &config.pool);
        if new_roof_id <= pool.get_active_id() {
            return Err(FloorError::RoofNotAboveActive);
        }

        let this = e.current_contract_address();
        let mut ids = Vec::new(e);
        let mut amounts = Vec::new(e);
        for id in (new_roof_id + 1)..=roof_id {
            let shares = pool.balance_of(&this, &id);
            if shares > 0 {
                ids.push_back(id);
                amounts.push_back(shares);
            }
        }

        let mut released = 0;
        if !ids.is_empty() {
            let (base, _) = pool.withdraw(&this, &config.pool, &ids, &amounts);
            released = base;
        }
        let stray = unaccounted_base::<L>(e, &pool, &config.pool);
        if stray > 0 {
            L::burn(e, &config.pool, stray);
        }

        storage::set_roof_id(e, new_roof_id);
        e.events().publish(
            (Symbol::new(e, "roof_reduced"),),
            (roof_id, new_roof_id, released),
        );
        Ok(())
    })
}
