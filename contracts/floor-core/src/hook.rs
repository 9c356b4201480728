//! Rebalance trigger run before every holder-to-holder transfer.

use soroban_sdk::{log, panic_with_error, Address, Env};
use stellar_contract_utils::pausable;

use crate::{guard, rebalance, storage, FloorLedger};

/// Opportunistically advances the floor ahead of a transfer.
///
/// Mints and burns (`None` on either side) never trigger. Transfers touching
/// the pool are skipped too: the pool is already on the call stack when it
/// moves tokens, and a contract cannot be re-entered. Recoverable failures
/// are logged and the transfer proceeds; fatal ones abort it.
pub fn before_transfer<L: FloorLedger>(e: &Env, from: Option<&Address>, to: Option<&Address>) {
    let (Some(from), Some(to)) = (from, to) else {
        return;
    };
    let Ok(config) = storage::get_config(e) else {
        return;
    };
    if *from == config.pool || *to == config.pool {
        return;
    }
    if pausable::paused(e) || guard::is_entered(e) {
        return;
    }

    if let Err(err) = rebalance::attempt_rebalance::<L>(e) {
        if err.is_fatal() {
            panic_with_error!(e, err);
        }
        log!(e, "rebalance skipped", err as u32);
    }
}
