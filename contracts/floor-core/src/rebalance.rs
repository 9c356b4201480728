//! Floor advances and the liquidity migration that backs them.

use soroban_sdk::{token::TokenClient, vec, Address, Env, Symbol, Vec};
use stellar_contract_utils::pausable;

use crate::{
    accountant::{self, Holdings},
    bin_math::{self, PRECISION},
    guard,
    pool::{BinPoolClient, LiquidityConfig},
    solver, storage, FloorConfig, FloorError, FloorLedger,
};

struct Snapshot {
    config: FloorConfig,
    floor_id: u32,
    roof_id: u32,
    active_id: u32,
    holdings: Holdings,
}

fn snapshot(e: &Env) -> Result<Snapshot, FloorError> {
    let config = storage::get_config(e)?;
    let (floor_id, roof_id) = storage::get_range(e);
    let pool = BinPoolClient::new(e, &config.pool);
    let active_id = pool.get_active_id();
    let holdings = if roof_id == 0 {
        Holdings {
            base: 0,
            quote: 0,
            quote_per_bin: Vec::new(e),
        }
    } else {
        accountant::amounts_in_range(
            e,
            &pool,
            &e.current_contract_address(),
            floor_id,
            active_id,
            roof_id,
        )?
    };
    Ok(Snapshot {
        config,
        floor_id,
        roof_id,
        active_id,
        holdings,
    })
}

fn circulating<L: FloorLedger>(e: &Env, holdings: &Holdings) -> i128 {
    (L::total_supply(e) - holdings.base).max(0)
}

/// Total supply minus the base the controller holds in its range.
pub fn circulating_supply<L: FloorLedger>(e: &Env) -> Result<i128, FloorError> {
    let snapshot = snapshot(e)?;
    Ok(circulating::<L>(e, &snapshot.holdings))
}

/// `(base, quote)` the controller can claim from the pool over its range.
pub fn tokens_in_pair(e: &Env) -> Result<(i128, i128), FloorError> {
    let snapshot = snapshot(e)?;
    Ok((snapshot.holdings.base, snapshot.holdings.quote))
}

fn solve<L: FloorLedger>(e: &Env, snapshot: &Snapshot) -> Result<u32, FloorError> {
    if snapshot.roof_id == 0 {
        return Ok(snapshot.floor_id);
    }
    let new_floor_id = solver::compute_new_floor_id(
        e,
        snapshot.config.bin_step,
        snapshot.floor_id,
        snapshot.active_id,
        circulating::<L>(e, &snapshot.holdings),
        snapshot.holdings.quote,
        &snapshot.holdings.quote_per_bin,
    )?;
    // the floor never leaves the range
    Ok(new_floor_id.min(snapshot.roof_id))
}

/// Floor the next rebalance would move to. Read-only.
pub fn calculate_new_floor_id<L: FloorLedger>(e: &Env) -> Result<u32, FloorError> {
    let snapshot = snapshot(e)?;
    solve::<L>(e, &snapshot)
}

/// Advances the floor when the range holds enough quote to do so.
///
/// Returns `false` when the floor stays where it is. Fails with
/// [`FloorError::RebalancePaused`] while rebalancing is paused.
pub fn attempt_rebalance<L: FloorLedger>(e: &Env) -> Result<bool, FloorError> {
    if pausable::paused(e) {
        return Err(FloorError::RebalancePaused);
    }

    guard::non_reentrant(e, || {
        let snapshot = snapshot(e)?;
        let new_floor_id = solve::<L>(e, &snapshot)?;
        if new_floor_id <= snapshot.floor_id {
            return Ok(false);
        }

        storage::set_floor_id(e, new_floor_id);
        migrate(e, &snapshot.config, snapshot.floor_id, new_floor_id)?;

        e.events().publish(
            (Symbol::new(e, "floor_raised"),),
            (snapshot.floor_id, new_floor_id),
        );
        Ok(true)
    })
}

/// Permissionless rebalance. Returns the new floor id.
pub fn rebalance_floor<L: FloorLedger>(e: &Env) -> Result<u32, FloorError> {
    if !attempt_rebalance::<L>(e)? {
        return Err(FloorError::NoRebalanceNeeded);
    }
    Ok(storage::get_range(e).0)
}

/// Moves the quote of bins `[old_floor_id, new_floor_id)` into `new_floor_id`.
///
/// Withdrawn quote lands in the pool, next to any quote a third party sent
/// there directly. The redeposit claims the smallest fraction of that pooled
/// balance that still covers what was withdrawn, leaving the rest and the
/// protocol fees untouched. Base reserves must not move.
fn migrate(
    e: &Env,
    config: &FloorConfig,
    old_floor_id: u32,
    new_floor_id: u32,
) -> Result<(), FloorError> {
    let pool = BinPoolClient::new(e, &config.pool);
    let this = e.current_contract_address();
    let (base_before, quote_before) = pool.get_reserves();

    let mut ids = Vec::new(e);
    let mut amounts = Vec::new(e);
    for id in old_floor_id..new_floor_id {
        let shares = pool.balance_of(&this, &id);
        if shares > 0 {
            ids.push_back(id);
            amounts.push_back(shares);
        }
    }
    if !ids.is_empty() {
        pool.withdraw(&this, &config.pool, &ids, &amounts);
    }

    let (_, quote_withdrawn) = pool.get_reserves();
    let freed = quote_before - quote_withdrawn;
    if freed > 0 {
        redeposit(e, &pool, config, &this, new_floor_id, quote_withdrawn, freed)?;
    }

    let (base_after, _) = pool.get_reserves();
    if base_after != base_before {
        return Err(FloorError::BaseReserveChanged);
    }
    Ok(())
}

fn redeposit(
    e: &Env,
    pool: &BinPoolClient,
    config: &FloorConfig,
    this: &Address,
    new_floor_id: u32,
    quote_reserve: i128,
    freed: i128,
) -> Result<(), FloorError> {
    let (_, fee_quote) = pool.get_protocol_fees();
    let balance = TokenClient::new(e, &config.quote_token).balance(&config.pool) - fee_quote;
    let available = balance - quote_reserve;
    if available < freed {
        return Err(FloorError::QuoteEntitlementMismatch);
    }

    let precision = PRECISION as i128;
    let ratio = bin_math::mul_div_round_up(e, freed, precision, available)?.min(precision);
    let configs = vec![
        e,
        LiquidityConfig {
            id: new_floor_id,
            distribution_base: 0,
            distribution_quote: ratio as u64,
        },
    ];
    let deposited = pool.deposit(this, &config.pool, &0, &available, &configs);

    let entitled = bin_math::mul_div_round_down(e, available, ratio, precision)?;
    if deposited.quote_received != entitled || deposited.quote_received < freed {
        return Err(FloorError::QuoteEntitlementMismatch);
    }
    Ok(())
}
