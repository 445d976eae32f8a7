use std::time::Duration;

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol,
    transports::http::reqwest::Url,
};
use hyperdrop_core::{
    chain::{self, ChainClient, ReceiptStatus},
    error::ChainError,
    token::TokenReference,
};
use tracing::{debug, instrument};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IAirdrop {
        function drop(address token, address[] recipients, uint256[] amounts) external payable;
    }
}

/// Polls without a receipt or a mempool entry before a transaction counts as dropped.
const DROPPED_AFTER_POLLS: u32 = 3;

/// [`ChainClient`] over JSON-RPC. Write calls are signed locally when a signer
/// is configured.
#[derive(Clone)]
pub struct EvmClient {
    provider: DynProvider,
    distributor: Address,
    poll_interval: Duration,
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient")
            .field("distributor", &self.distributor)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl EvmClient {
    pub fn connect(
        rpc_url: &str,
        signer: Option<PrivateKeySigner>,
        distributor: Address,
        poll_interval: Duration,
    ) -> anyhow::Result<Self> {
        let url: Url = rpc_url.parse()?;
        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };
        Ok(Self {
            provider,
            distributor,
            poll_interval,
        })
    }

    pub async fn chain_id(&self) -> chain::Result<u64> {
        self.provider.get_chain_id().await.map_err(classify)
    }
}

/// Wallet refusals are told apart from transport failures by message, the
/// only place JSON-RPC wallets surface them.
fn classify(e: impl std::fmt::Display) -> ChainError {
    let message = e.to_string();
    let lower = message.to_lowercase();
    if lower.contains("user rejected") || lower.contains("user denied") {
        ChainError::Rejected(message)
    } else {
        ChainError::Rpc(message)
    }
}

impl ChainClient for EvmClient {
    async fn symbol(&self, token: Address) -> chain::Result<String> {
        IERC20::new(token, self.provider.clone())
            .symbol()
            .call()
            .await
            .map_err(classify)
    }

    async fn decimals(&self, token: Address) -> chain::Result<u8> {
        IERC20::new(token, self.provider.clone())
            .decimals()
            .call()
            .await
            .map_err(classify)
    }

    async fn balance_of(&self, token: &TokenReference, holder: Address) -> chain::Result<U256> {
        match token.contract() {
            Some(token) => IERC20::new(token, self.provider.clone())
                .balanceOf(holder)
                .call()
                .await
                .map_err(classify),
            None => self.provider.get_balance(holder).await.map_err(classify),
        }
    }

    async fn allowance(&self, token: Address, holder: Address, spender: Address) -> chain::Result<U256> {
        IERC20::new(token, self.provider.clone())
            .allowance(holder, spender)
            .call()
            .await
            .map_err(classify)
    }

    #[instrument(skip(self))]
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> chain::Result<TxHash> {
        let pending = IERC20::new(token, self.provider.clone())
            .approve(spender, amount)
            .send()
            .await
            .map_err(classify)?;
        Ok(*pending.tx_hash())
    }

    #[instrument(skip(self, recipients, amounts), fields(recipients = recipients.len()))]
    async fn distribute(
        &self,
        token: &TokenReference,
        recipients: &[Address],
        amounts: &[U256],
    ) -> chain::Result<TxHash> {
        let airdrop = IAirdrop::new(self.distributor, self.provider.clone());
        let mut call = airdrop.drop(token.call_address(), recipients.to_vec(), amounts.to_vec());
        if token.is_native() {
            let value = amounts.iter().fold(U256::ZERO, |acc, a| acc.saturating_add(*a));
            call = call.value(value);
        }
        let pending = call.send().await.map_err(classify)?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> chain::Result<ReceiptStatus> {
        let mut missing = 0;
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(classify)?;
            if let Some(receipt) = receipt {
                return Ok(if receipt.status() {
                    ReceiptStatus::Success
                } else {
                    ReceiptStatus::Reverted
                });
            }

            let known = self
                .provider
                .get_transaction_by_hash(tx_hash)
                .await
                .map_err(classify)?
                .is_some();
            missing = if known { 0 } else { missing + 1 };
            if missing >= DROPPED_AFTER_POLLS {
                return Ok(ReceiptStatus::Dropped);
            }

            debug!("waiting for receipt of {}", tx_hash);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_wallet_rejection() {
        assert!(matches!(
            classify("User rejected the request."),
            ChainError::Rejected(_)
        ));
        assert!(matches!(
            classify("error sending request for url"),
            ChainError::Rpc(_)
        ));
    }
}
