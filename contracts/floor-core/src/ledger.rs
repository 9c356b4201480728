use soroban_sdk::{Address, Env};

/// Balance capability of the token the floor protects.
///
/// `mint` and `burn` move supply without going through the token's transfer
/// lifecycle, so they never re-arm the transfer hook.
pub trait FloorLedger {
    fn total_supply(e: &Env) -> i128;

    fn balance(e: &Env, account: &Address) -> i128;

    fn mint(e: &Env, to: &Address, amount: i128);

    fn burn(e: &Env, from: &Address, amount: i128);
}
