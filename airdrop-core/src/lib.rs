pub mod chain;
pub mod error;
pub mod events;
pub mod executor;
pub mod gate;
pub mod recipient;
pub mod session;
pub mod token;
pub mod units;
pub mod workflow;

pub use alloy_primitives::{Address, TxHash, U256};
