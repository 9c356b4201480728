use soroban_sdk::{contracttype, Address, Env};

use crate::{bin_math, FloorError};

// TTL constants: extend instance storage proactively to prevent archival
pub const TTL_THRESHOLD: u32 = 17_280; // ~1 day at 5s/ledger
pub const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

/// Upper bound for `FloorConfig::max_range`. Every transfer may walk the whole
/// window, so it has to stay small.
pub const MAX_RANGE_LIMIT: u32 = 100;

pub const DEFAULT_MAX_RANGE: u32 = 100;

// ─── Storage Keys ────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
pub enum FloorDataKey {
    FloorConfig,
    FloorId,
    RoofId,
    ReentrancyStatus,
}

/// Immutable parameters fixed at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FloorConfig {
    /// Bin pool the token is paired in.
    pub pool: Address,
    /// Asset backing the floor.
    pub quote_token: Address,
    /// Bin width in basis points; must match the pool.
    pub bin_step: u32,
    /// Base inventory minted into each bin added by a roof raise.
    pub token_per_bin: i128,
    /// Largest allowed `roof_id - floor_id`.
    pub max_range: u32,
}

impl FloorConfig {
    pub fn validate(&self) -> Result<(), FloorError> {
        if self.bin_step == 0 || self.bin_step > bin_math::BASIS_POINT_MAX {
            return Err(FloorError::InvalidConfig);
        }
        if self.token_per_bin <= 0 {
            return Err(FloorError::InvalidConfig);
        }
        if self.max_range == 0 || self.max_range > MAX_RANGE_LIMIT {
            return Err(FloorError::InvalidConfig);
        }
        Ok(())
    }
}

pub fn extend_ttl(e: &Env) {
    e.storage().instance().extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn is_initialized(e: &Env) -> bool {
    e.storage().instance().has(&FloorDataKey::FloorConfig)
}

/// Stores the configuration and opens an empty range at `floor_id`.
pub fn init(e: &Env, config: &FloorConfig, floor_id: u32) -> Result<(), FloorError> {
    if is_initialized(e) {
        return Err(FloorError::AlreadyInitialized);
    }
    config.validate()?;
    // the starting floor must be priceable
    bin_math::price_from_id(e, floor_id, config.bin_step)?;

    e.storage().instance().set(&FloorDataKey::FloorConfig, config);
    e.storage().instance().set(&FloorDataKey::FloorId, &floor_id);
    e.storage().instance().set(&FloorDataKey::RoofId, &0u32);
    extend_ttl(e);
    Ok(())
}

pub fn get_config(e: &Env) -> Result<FloorConfig, FloorError> {
    e.storage()
        .instance()
        .get(&FloorDataKey::FloorConfig)
        .ok_or(FloorError::NotInitialized)
}

/// `(floor_id, roof_id)`; a zero roof means no inventory was deposited yet.
pub fn get_range(e: &Env) -> (u32, u32) {
    let floor_id: u32 = e
        .storage()
        .instance()
        .get(&FloorDataKey::FloorId)
        .unwrap_or(0);
    let roof_id: u32 = e
        .storage()
        .instance()
        .get(&FloorDataKey::RoofId)
        .unwrap_or(0);
    (floor_id, roof_id)
}

pub fn set_floor_id(e: &Env, floor_id: u32) {
    e.storage().instance().set(&FloorDataKey::FloorId, &floor_id);
}

pub fn set_roof_id(e: &Env, roof_id: u32) {
    e.storage().instance().set(&FloorDataKey::RoofId, &roof_id);
}
