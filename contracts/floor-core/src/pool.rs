//! Interface of the bin-based pool the floor token is paired in.

use soroban_sdk::{contractclient, contracttype, Address, Env, Vec};

/// Share of a deposit routed to one bin. Distributions are expressed in
/// [`crate::bin_math::PRECISION`] units (1e18 = the whole amount).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidityConfig {
    pub id: u32,
    pub distribution_base: u64,
    pub distribution_quote: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositResult {
    pub base_received: i128,
    pub quote_received: i128,
    pub base_leftover: i128,
    pub quote_leftover: i128,
}

/// Read and liquidity surface consumed from the pool.
///
/// Bins above the active id only take base, bins below only take quote and
/// the active bin takes both. Whatever a deposit does not absorb is reported
/// as leftover and sent to `refund_to`.
///
/// `deposit` takes declared amounts: the caller moves the funds into the pool
/// before invoking it, since the pool cannot read the base ledger while the
/// token contract is on the call stack.
#[contractclient(name = "BinPoolClient")]
pub trait BinPoolInterface {
    fn get_active_id(env: Env) -> u32;

    fn get_bin_step(env: Env) -> u32;

    /// `(base, quote)` reserves of one bin.
    fn get_bin(env: Env, id: u32) -> (i128, i128);

    fn balance_of(env: Env, owner: Address, id: u32) -> i128;

    fn total_supply(env: Env, id: u32) -> i128;

    /// `(base, quote)` summed over every bin.
    fn get_reserves(env: Env) -> (i128, i128);

    fn get_protocol_fees(env: Env) -> (i128, i128);

    fn deposit(
        env: Env,
        to: Address,
        refund_to: Address,
        amount_base: i128,
        amount_quote: i128,
        configs: Vec<LiquidityConfig>,
    ) -> DepositResult;

    fn withdraw(
        env: Env,
        from: Address,
        to: Address,
        ids: Vec<u32>,
        amounts: Vec<i128>,
    ) -> (i128, i128);
}
