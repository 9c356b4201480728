//! Single-slot reentrancy status for the fund-moving sections.

use soroban_sdk::{contracttype, Env};

use crate::{storage::FloorDataKey, FloorError};

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ReentrancyStatus {
    NotEntered = 1,
    Entered = 2,
}

pub fn status(e: &Env) -> ReentrancyStatus {
    e.storage()
        .instance()
        .get(&FloorDataKey::ReentrancyStatus)
        .unwrap_or(ReentrancyStatus::NotEntered)
}

pub fn is_entered(e: &Env) -> bool {
    status(e) == ReentrancyStatus::Entered
}

fn set_status(e: &Env, status: ReentrancyStatus) {
    e.storage()
        .instance()
        .set(&FloorDataKey::ReentrancyStatus, &status);
}

/// Runs `f` holding the lock. The status is cleared whatever `f` returns;
/// a nested call fails with [`FloorError::ReentrantCall`].
pub fn non_reentrant<T>(
    e: &Env,
    f: impl FnOnce() -> Result<T, FloorError>,
) -> Result<T, FloorError> {
    if is_entered(e) {
        return Err(FloorError::ReentrantCall);
    }
    set_status(e, ReentrancyStatus::Entered);
    let result = f();
    set_status(e, ReentrancyStatus::NotEntered);
    result
}
