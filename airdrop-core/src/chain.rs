use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::{error::ChainError, token::TokenReference};

pub type Result<T> = std::result::Result<T, ChainError>;

/// Final status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
    /// Abandoned or paused by the user or wallet before it was mined
    Dropped,
}

/// Contract reads and writes needed by the distribution workflow.
///
/// Implementations are bound to a signer; write calls are sent from that
/// signer's address. `distribute` takes parallel slices of equal length with
/// amounts already scaled to integer token units.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    async fn symbol(&self, token: Address) -> Result<String>;

    async fn decimals(&self, token: Address) -> Result<u8>;

    async fn balance_of(&self, token: &TokenReference, holder: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, holder: Address, spender: Address) -> Result<U256>;

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;

    async fn distribute(
        &self,
        token: &TokenReference,
        recipients: &[Address],
        amounts: &[U256],
    ) -> Result<TxHash>;

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptStatus>;
}
