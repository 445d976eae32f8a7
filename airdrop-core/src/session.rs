use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// The connected wallet: who is sending, and on which chain.
///
/// Passed explicitly into every operation that reads holder state. The
/// signing capability lives with the [`crate::chain::ChainClient`] bound to
/// the same holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub holder: Address,
    pub chain_id: u64,
}

impl Session {
    pub fn new(holder: Address, chain_id: u64) -> Self {
        Self { holder, chain_id }
    }
}
