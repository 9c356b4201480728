//! In-process stand-ins for the collaborators of a floor token: a bin pool
//! and a bare quote token.

mod bin_pool;
mod quote_token;

pub use bin_pool::{MockBinPool, MockBinPoolClient, MockFault};
pub use quote_token::{MockQuoteToken, MockQuoteTokenClient};
