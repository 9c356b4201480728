use soroban_sdk::{
    contract, contractimpl, contracttype, token::TokenClient, Address, Env, Vec, U256,
};

use crate::{
    bin_math::{self, BASIS_POINT_MAX, PRECISION},
    pool::{BinPoolInterface, DepositResult, LiquidityConfig},
};

#[contracttype]
#[derive(Clone)]
enum MockPoolKey {
    BaseToken,
    QuoteToken,
    BinStep,
    ActiveId,
    FeeBps,
    ProtocolShareBps,
    Reserves,
    ProtocolFees,
    Bin(u32),
    TotalShares(u32),
    Shares(Address, u32),
    Fault,
}

/// Misbehaviour a [`MockBinPool`] can be told to exhibit.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MockFault {
    Honest,
    /// `withdraw` also drains one unit of base from the reserves.
    LeakBaseOnWithdraw,
    /// `deposit` reports one unit less quote than it took.
    UnderReportQuote,
    /// `deposit` reports one unit less base than it took.
    UnderReportBase,
}

/// Bin-based pool with per-bin share ledgers.
///
/// Swaps charge `fee_bps` on the input and keep it in the bins, except for
/// `protocol_share_bps` of it which is set aside as protocol fees. Deposits
/// trust the declared amounts; tests move the funds in beforehand.
#[contract]
pub struct MockBinPool;

fn get_u32(env: &Env, key: &MockPoolKey) -> u32 {
    env.storage().instance().get(key).unwrap_or(0)
}

fn get_pair(env: &Env, key: &MockPoolKey) -> (i128, i128) {
    env.storage().instance().get(key).unwrap_or((0, 0))
}

fn set_pair(env: &Env, key: &MockPoolKey, value: (i128, i128)) {
    env.storage().instance().set(key, &value);
}

fn get_amount(env: &Env, key: &MockPoolKey) -> i128 {
    env.storage().instance().get(key).unwrap_or(0)
}

fn fault(env: &Env) -> MockFault {
    env.storage()
        .instance()
        .get(&MockPoolKey::Fault)
        .unwrap_or(MockFault::Honest)
}

fn base_token(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&MockPoolKey::BaseToken)
        .expect("pool not initialized")
}

fn quote_token(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&MockPoolKey::QuoteToken)
        .expect("pool not initialized")
}

fn price(env: &Env, id: u32) -> U256 {
    bin_math::price_from_id(env, id, get_u32(env, &MockPoolKey::BinStep)).expect("bad bin id")
}

/// Moves `(base, quote)` between a bin and the pool totals.
fn adjust_bin(env: &Env, id: u32, base: i128, quote: i128) {
    let (bin_base, bin_quote) = get_pair(env, &MockPoolKey::Bin(id));
    assert!(bin_base + base >= 0 && bin_quote + quote >= 0, "bin underflow");
    set_pair(env, &MockPoolKey::Bin(id), (bin_base + base, bin_quote + quote));
    let (res_base, res_quote) = get_pair(env, &MockPoolKey::Reserves);
    set_pair(env, &MockPoolKey::Reserves, (res_base + base, res_quote + quote));
}

fn adjust_shares(env: &Env, owner: &Address, id: u32, shares: i128) {
    let key = MockPoolKey::Shares(owner.clone(), id);
    let balance = get_amount(env, &key) + shares;
    assert!(balance >= 0, "insufficient shares");
    env.storage().instance().set(&key, &balance);
    let total_key = MockPoolKey::TotalShares(id);
    let total = get_amount(env, &total_key) + shares;
    env.storage().instance().set(&total_key, &total);
}

/// Splits `fee` into the part kept by liquidity providers and the protocol
/// part.
fn split_fee(env: &Env, fee: i128) -> (i128, i128) {
    let share = get_u32(env, &MockPoolKey::ProtocolShareBps) as i128;
    let protocol = fee * share / BASIS_POINT_MAX as i128;
    (fee - protocol, protocol)
}

fn fee_on(env: &Env, amount: i128) -> i128 {
    let fee_bps = get_u32(env, &MockPoolKey::FeeBps) as i128;
    bin_math::mul_div_round_up(env, amount, fee_bps, BASIS_POINT_MAX as i128)
        .expect("fee overflow")
}

fn send(env: &Env, token: &Address, to: &Address, amount: i128) {
    if amount > 0 && *to != env.current_contract_address() {
        TokenClient::new(env, token).transfer(&env.current_contract_address(), to, &amount);
    }
}

#[contractimpl]
impl MockBinPool {
    pub fn init(
        env: Env,
        base_token: Address,
        quote_token: Address,
        bin_step: u32,
        active_id: u32,
        fee_bps: u32,
        protocol_share_bps: u32,
    ) {
        let storage = env.storage().instance();
        storage.set(&MockPoolKey::BaseToken, &base_token);
        storage.set(&MockPoolKey::QuoteToken, &quote_token);
        storage.set(&MockPoolKey::BinStep, &bin_step);
        storage.set(&MockPoolKey::ActiveId, &active_id);
        storage.set(&MockPoolKey::FeeBps, &fee_bps);
        storage.set(&MockPoolKey::ProtocolShareBps, &protocol_share_bps);
    }

    pub fn set_fault(env: Env, fault: MockFault) {
        env.storage().instance().set(&MockPoolKey::Fault, &fault);
    }

    /// Adds quote to a bin without minting shares, like accrued fees.
    pub fn donate_quote(env: Env, id: u32, amount: i128) {
        adjust_bin(&env, id, 0, amount);
    }

    /// Buys out the base of `nb_bins` bins starting at the active one.
    /// Returns `(quote_in, base_out)`.
    pub fn buy_bins(env: Env, trader: Address, nb_bins: u32) -> (i128, i128) {
        trader.require_auth();
        let mut active_id = get_u32(&env, &MockPoolKey::ActiveId);
        let mut quote_in = 0;
        let mut base_out = 0;
        let mut protocol_quote = 0;

        for _ in 0..nb_bins {
            let (bin_base, _) = get_pair(&env, &MockPoolKey::Bin(active_id));
            if bin_base > 0 {
                let cost = bin_math::mul_shift_round_up(&env, bin_base, &price(&env, active_id))
                    .expect("cost overflow")
                    .to_u128()
                    .expect("cost overflow") as i128;
                let (kept, protocol) = split_fee(&env, fee_on(&env, cost));
                adjust_bin(&env, active_id, -bin_base, cost + kept);
                quote_in += cost + kept + protocol;
                protocol_quote += protocol;
                base_out += bin_base;
            }
            active_id += 1;
        }
        env.storage().instance().set(&MockPoolKey::ActiveId, &active_id);
        let (fee_base, fee_quote) = get_pair(&env, &MockPoolKey::ProtocolFees);
        set_pair(
            &env,
            &MockPoolKey::ProtocolFees,
            (fee_base, fee_quote + protocol_quote),
        );

        let pool = env.current_contract_address();
        TokenClient::new(&env, &quote_token(&env)).transfer(&trader, &pool, &quote_in);
        send(&env, &base_token(&env), &trader, base_out);
        (quote_in, base_out)
    }

    /// Sells up to `base_in` walking down from the active bin. Returns
    /// `(base_used, quote_out)`; whatever the bins cannot absorb stays with
    /// the trader.
    pub fn sell(env: Env, trader: Address, base_in: i128) -> (i128, i128) {
        trader.require_auth();
        let start_id = get_u32(&env, &MockPoolKey::ActiveId);
        let fee = fee_on(&env, base_in);
        let (kept, protocol) = split_fee(&env, fee);
        let mut remaining = base_in - fee;
        let mut quote_out = 0;
        let mut active_id = start_id;

        while remaining > 0 {
            let (_, reserve_quote) = get_pair(&env, &MockPoolKey::Reserves);
            if reserve_quote == 0 {
                break;
            }
            let (_, bin_quote) = get_pair(&env, &MockPoolKey::Bin(active_id));
            let bin_price = price(&env, active_id);
            let value = bin_math::mul_shift_round_down(&env, remaining, &bin_price)
                .expect("value overflow");
            if value <= bin_quote {
                adjust_bin(&env, active_id, remaining, -value);
                quote_out += value;
                remaining = 0;
                break;
            }
            if bin_quote > 0 {
                let used = bin_math::shift_div_round_down(&env, bin_quote, &bin_price)
                    .expect("value overflow")
                    + 1;
                adjust_bin(&env, active_id, used, -bin_quote);
                quote_out += bin_quote;
                remaining -= used;
            }
            if active_id == 0 {
                break;
            }
            active_id -= 1;
        }

        let base_used = base_in - remaining;
        adjust_bin(&env, start_id, kept, 0);
        let (fee_base, fee_quote) = get_pair(&env, &MockPoolKey::ProtocolFees);
        set_pair(
            &env,
            &MockPoolKey::ProtocolFees,
            (fee_base + protocol, fee_quote),
        );
        env.storage().instance().set(&MockPoolKey::ActiveId, &active_id);

        let pool = env.current_contract_address();
        TokenClient::new(&env, &base_token(&env)).transfer(&trader, &pool, &base_used);
        send(&env, &quote_token(&env), &trader, quote_out);
        (base_used, quote_out)
    }
}

#[contractimpl]
impl BinPoolInterface for MockBinPool {
    fn get_active_id(env: Env) -> u32 {
        get_u32(&env, &MockPoolKey::ActiveId)
    }

    fn get_bin_step(env: Env) -> u32 {
        get_u32(&env, &MockPoolKey::BinStep)
    }

    fn get_bin(env: Env, id: u32) -> (i128, i128) {
        get_pair(&env, &MockPoolKey::Bin(id))
    }

    fn balance_of(env: Env, owner: Address, id: u32) -> i128 {
        get_amount(&env, &MockPoolKey::Shares(owner, id))
    }

    fn total_supply(env: Env, id: u32) -> i128 {
        get_amount(&env, &MockPoolKey::TotalShares(id))
    }

    fn get_reserves(env: Env) -> (i128, i128) {
        get_pair(&env, &MockPoolKey::Reserves)
    }

    fn get_protocol_fees(env: Env) -> (i128, i128) {
        get_pair(&env, &MockPoolKey::ProtocolFees)
    }

    fn deposit(
        env: Env,
        to: Address,
        refund_to: Address,
        amount_base: i128,
        amount_quote: i128,
        configs: Vec<LiquidityConfig>,
    ) -> DepositResult {
        let active_id = get_u32(&env, &MockPoolKey::ActiveId);
        let mut base_received = 0;
        let mut quote_received = 0;

        for config in configs.iter() {
            let mut base = bin_math::mul_div_round_down(
                &env,
                amount_base,
                config.distribution_base as i128,
                PRECISION as i128,
            )
            .expect("distribution overflow");
            let mut quote = bin_math::mul_div_round_down(
                &env,
                amount_quote,
                config.distribution_quote as i128,
                PRECISION as i128,
            )
            .expect("distribution overflow");
            if config.id > active_id {
                quote = 0;
            }
            if config.id < active_id {
                base = 0;
            }

            let bin_price = price(&env, config.id);
            let value = bin_math::mul_shift_round_down(&env, base, &bin_price)
                .expect("value overflow")
                + quote;
            if value == 0 {
                continue;
            }
            let (bin_base, bin_quote) = get_pair(&env, &MockPoolKey::Bin(config.id));
            let bin_value = bin_math::mul_shift_round_down(&env, bin_base, &bin_price)
                .expect("value overflow")
                + bin_quote;
            let total_shares = get_amount(&env, &MockPoolKey::TotalShares(config.id));
            let shares = if total_shares == 0 || bin_value == 0 {
                value
            } else {
                bin_math::mul_div_round_down(&env, value, total_shares, bin_value)
                    .expect("share overflow")
            };
            if shares == 0 {
                continue;
            }

            adjust_bin(&env, config.id, base, quote);
            adjust_shares(&env, &to, config.id, shares);
            base_received += base;
            quote_received += quote;
        }

        send(&env, &base_token(&env), &refund_to, amount_base - base_received);
        send(&env, &quote_token(&env), &refund_to, amount_quote - quote_received);
        let mut result = DepositResult {
            base_received,
            quote_received,
            base_leftover: amount_base - base_received,
            quote_leftover: amount_quote - quote_received,
        };
        match fault(&env) {
            MockFault::UnderReportBase if base_received > 0 => result.base_received -= 1,
            MockFault::UnderReportQuote if quote_received > 0 => result.quote_received -= 1,
            _ => {}
        }
        result
    }

    fn withdraw(
        env: Env,
        from: Address,
        to: Address,
        ids: Vec<u32>,
        amounts: Vec<i128>,
    ) -> (i128, i128) {
        from.require_auth();
        assert_eq!(ids.len(), amounts.len(), "length mismatch");
        let mut base_out = 0;
        let mut quote_out = 0;

        for (id, shares) in ids.iter().zip(amounts.iter()) {
            let total_shares = get_amount(&env, &MockPoolKey::TotalShares(id));
            let (bin_base, bin_quote) = get_pair(&env, &MockPoolKey::Bin(id));
            let base = bin_math::mul_div_round_down(&env, shares, bin_base, total_shares)
                .expect("claim overflow");
            let quote = bin_math::mul_div_round_down(&env, shares, bin_quote, total_shares)
                .expect("claim overflow");
            adjust_shares(&env, &from, id, -shares);
            adjust_bin(&env, id, -base, -quote);
            base_out += base;
            quote_out += quote;
        }
        if fault(&env) == MockFault::LeakBaseOnWithdraw {
            let (res_base, res_quote) = get_pair(&env, &MockPoolKey::Reserves);
            set_pair(&env, &MockPoolKey::Reserves, (res_base - 1, res_quote));
        }

        send(&env, &base_token(&env), &to, base_out);
        send(&env, &quote_token(&env), &to, quote_out);
        (base_out, quote_out)
    }
}
