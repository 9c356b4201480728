#![no_std]

use floor_core::{
    bin_math, hook, pool::BinPoolClient, range, rebalance, storage, FloorConfig, FloorError,
    FloorLedger,
};
use soroban_sdk::{
    contract, contractimpl, token::TokenInterface, Address, BytesN, Env, MuxedAddress, String,
    Symbol, U256,
};
use stellar_access::ownable::{self, Ownable};
use stellar_contract_utils::pausable;
use stellar_macros::only_owner;
use stellar_tokens::fungible::Base;


const DECIMALS: u32 = 7;

// ─── Contract ────────────────────────────────────────────────────

#[contract]
pub struct FloorToken;

// Supply moves for the floor machinery bypass the transfer hook.
impl FloorLedger for FloorToken {
    fn total_supply(e: &Env) -> i128 {
        Base::total_supply(e)
    }

    fn balance(e: &Env, account: &Address) -> i128 {
        Base::balance(e, account)
    }

    fn mint(e: &Env, to: &Address, amount: i128) {
        Base::update(e, None, Some(to), amount);
    }

    fn burn(e: &Env, from: &Address, amount: i128) {
        Base::update(e, Some(from), None, amount);
    }
}

// ─── SEP-41 Token Interface (canonical trait for indexer detection) ──

#[contractimpl]
impl TokenInterface for FloorToken {
    fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        Base::allowance(&env, &from, &spender)
    }

    fn approve(env: Env, from: Address, spender: Address, amount: i128, expiration_ledger: u32) {
        Base::approve(&env, &from, &spender, amount, expiration_ledger);
    }

    fn balance(env: Env, id: Address) -> i128 {
        Base::balance(&env, &id)
    }

    fn transfer(env: Env, from: Address, to: MuxedAddress, amount: i128) {
        hook::before_transfer::<FloorToken>(&env, Some(&from), Some(&to.address()));
        Base::transfer(&env, &from, &to, amount);
    }

    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        hook::before_transfer::<FloorToken>(&env, Some(&from), Some(&to));
        Base::transfer_from(&env, &spender, &from, &to, amount);
    }

    fn burn(env: Env, from: Address, amount: i128) {
        Base::burn(&env, &from, amount);
    }

    fn burn_from(env: Env, spender: Address, from: Address, amount: i128) {
        Base::burn_from(&env, &spender, &from, amount);
    }

    fn decimals(env: Env) -> u32 {
        Base::decimals(&env)
    }

    fn name(env: Env) -> String {
        Base::name(&env)
    }

    fn symbol(env: Env) -> String {
        Base::symbol(&env)
    }
}

// Ownable (2-step transfer)
#[contractimpl(contracttrait)]
impl Ownable for FloorToken {}

// ─── Floor Functions ─────────────────────────────────────────────

#[contractimpl]
impl FloorToken {
    /// Total token supply (not part of TokenInterface but commonly expected).
    pub fn total_supply(env: Env) -> i128 {
        Base::total_supply(&env)
    }

    /// Pairs the token with `config.pool` and opens an empty range at
    /// `initial_floor_id`. No inventory exists until the first `raise_roof`.
    /// The designated owner must authorize the call.
    pub fn initialize(
        env: Env,
        owner: Address,
        name: String,
        symbol: String,
        initial_floor_id: u32,
        config: FloorConfig,
    ) -> Result<(), FloorError> {
        if storage::is_initialized(&env) {
            return Err(FloorError::AlreadyInitialized);
        }
        owner.require_auth();
        config.validate()?;
        let pool = BinPoolClient::new(&env, &config.pool);
        if pool.get_bin_step() != config.bin_step {
            return Err(FloorError::BinStepMismatch);
        }

        storage::init(&env, &config, initial_floor_id)?;
        ownable::set_owner(&env, &owner);
        Base::set_metadata(&env, DECIMALS, name, symbol);

        env.events().publish(
            (Symbol::new(&env, "initialized"),),
            (owner, config.pool, initial_floor_id),
        );
        Ok(())
    }

    // ─── Range Management ───────────────────────────────────────

    #[only_owner]
    pub fn raise_roof(env: Env, nb_bins: u32) -> Result<(), FloorError> {
        storage::extend_ttl(&env);
        range::raise_roof::<FloorToken>(&env, nb_bins)
    }

    #[only_owner]
    pub fn reduce_roof(env: Env, nb_bins: u32) -> Result<(), FloorError> {
        storage::extend_ttl(&env);
        range::reduce_roof::<FloorToken>(&env, nb_bins)
    }

    /// Moves the floor up when the range holds enough quote. Callable by
    /// anyone; fails with `NoRebalanceNeeded` when the floor cannot move.
    pub fn rebalance_floor(env: Env) -> Result<u32, FloorError> {
        storage::extend_ttl(&env);
        rebalance::rebalance_floor::<FloorToken>(&env)
    }

    #[only_owner]
    pub fn pause_rebalance(env: Env) {
        pausable::pause(&env);
    }

    #[only_owner]
    pub fn unpause_rebalance(env: Env) {
        pausable::unpause(&env);
    }

    // ─── Reads ──────────────────────────────────────────────────

    pub fn rebalance_paused(env: Env) -> bool {
        pausable::paused(&env)
    }

    /// `(floor_id, roof_id)`; a zero roof means no inventory yet.
    pub fn range(env: Env) -> (u32, u32) {
        storage::get_range(&env)
    }

    /// Price of the floor bin, 128.128 fixed point.
    pub fn floor_price(env: Env) -> Result<U256, FloorError> {
        let config = storage::get_config(&env)?;
        let (floor_id, _) = storage::get_range(&env);
        bin_math::price_from_id(&env, floor_id, config.bin_step)
    }

    /// `(base, quote)` the token holds as liquidity across its range.
    pub fn tokens_in_pair(env: Env) -> Result<(i128, i128), FloorError> {
        rebalance::tokens_in_pair(&env)
    }

    pub fn calculate_new_floor_id(env: Env) -> Result<u32, FloorError> {
        rebalance::calculate_new_floor_id::<FloorToken>(&env)
    }

    pub fn circulating_supply(env: Env) -> Result<i128, FloorError> {
        rebalance::circulating_supply::<FloorToken>(&env)
    }

    pub fn config(env: Env) -> Result<FloorConfig, FloorError> {
        storage::get_config(&env)
    }

    /// Owner upgrades the contract WASM. Requires owner auth.
    #[only_owner]
    pub fn upgrade(env: Env, wasm_hash: BytesN<32>) {
        storage::extend_ttl(&env);
        env.deployer().update_current_contract_wasm(wasm_hash);
    }
}
