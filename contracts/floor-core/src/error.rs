use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FloorError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidConfig = 3,
    BinStepMismatch = 4,
    RebalancePaused = 5,
    NoRebalanceNeeded = 6,
    ZeroBins = 7,
    MaxRangeExceeded = 8,
    ActiveIdAboveRoof = 9,
    RoofNotAboveActive = 10,
    RoofBelowFloor = 11,
    ReentrantCall = 12,
    BinIdOverflow = 13,
    MathOverflow = 14,
    BaseReserveChanged = 15,
    QuoteEntitlementMismatch = 16,
    InventoryMismatch = 17,
}

impl FloorError {
    /// Broken arithmetic or a violated post-condition. These must abort the
    /// enclosing invocation even when raised from the transfer hook.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FloorError::BinIdOverflow
                | FloorError::MathOverflow
                | FloorError::BaseReserveChanged
                | FloorError::QuoteEntitlementMismatch
                | FloorError::InventoryMismatch
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_only_broken_invariants_are_fatal() {
        assert!(!FloorError::NoRebalanceNeeded.is_fatal());
        assert!(!FloorError::RebalancePaused.is_fatal());
        assert!(!FloorError::ReentrantCall.is_fatal());
        assert!(FloorError::BinIdOverflow.is_fatal());
        assert!(FloorError::BaseReserveChanged.is_fatal());
        assert!(FloorError::QuoteEntitlementMismatch.is_fatal());
        assert!(FloorError::InventoryMismatch.is_fatal());
    }
}
