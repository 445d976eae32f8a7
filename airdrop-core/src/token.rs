use std::{fmt, str::FromStr};

use alloy_primitives::{hex::FromHexError, Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::{
    chain::ChainClient,
    error::{AmountError, ChainError},
    session::Session,
    units::{format_amount, AmountUnits},
};

/// Wire value used for the chain's base currency.
pub const NATIVE_TOKEN: &str = "native";

/// Either an ERC-20 style contract or the chain's native asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenReference {
    #[default]
    Native,
    Contract(Address),
}

impl TokenReference {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenReference::Native)
    }

    pub fn contract(&self) -> Option<Address> {
        match self {
            TokenReference::Native => None,
            TokenReference::Contract(address) => Some(*address),
        }
    }

    /// Token argument for the distributor contract; the zero address stands
    /// for the native asset.
    pub fn call_address(&self) -> Address {
        self.contract().unwrap_or(Address::ZERO)
    }
}

impl FromStr for TokenReference {
    type Err = FromHexError;

    /// Empty input, `native`, or the zero address select the native asset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(NATIVE_TOKEN) {
            return Ok(TokenReference::Native);
        }
        let address = Address::from_str(s)?;
        if address.is_zero() {
            return Ok(TokenReference::Native);
        }
        Ok(TokenReference::Contract(address))
    }
}

impl fmt::Display for TokenReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenReference::Native => f.write_str(NATIVE_TOKEN),
            TokenReference::Contract(address) => write!(f, "{address}"),
        }
    }
}

/// Symbol and precision of the chain's base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeAsset {
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeAsset {
    fn default() -> Self {
        Self {
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

impl NativeAsset {
    pub fn units(&self) -> AmountUnits {
        AmountUnits::new(self.symbol.clone(), self.decimals)
    }
}

/// Snapshot of a token as seen by the current holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenContext {
    pub reference: TokenReference,
    pub symbol: String,
    pub decimals: u8,
    pub holder_balance: U256,
    /// Only meaningful for contract tokens
    pub allowance_to_spender: Option<U256>,
}

impl TokenContext {
    /// Read symbol, decimals, balance and allowance concurrently.
    ///
    /// Returns `Ok(None)` for the native asset. Any failed read fails the whole
    /// resolution; a context is never partially populated.
    #[instrument(skip(client))]
    pub async fn resolve<C: ChainClient>(
        client: &C,
        reference: &TokenReference,
        session: &Session,
        spender: Address,
    ) -> Result<Option<Self>, ChainError> {
        let Some(token) = reference.contract() else {
            return Ok(None);
        };

        let (symbol, decimals, holder_balance, allowance) = tokio::try_join!(
            client.symbol(token),
            client.decimals(token),
            client.balance_of(reference, session.holder),
            client.allowance(token, session.holder, spender),
        )?;

        Ok(Some(Self {
            reference: *reference,
            symbol,
            decimals,
            holder_balance,
            allowance_to_spender: Some(allowance),
        }))
    }

    pub fn units(&self) -> AmountUnits {
        AmountUnits::new(self.symbol.clone(), self.decimals)
    }

    pub fn formatted_balance(&self) -> Result<String, AmountError> {
        format_amount(self.holder_balance, self.decimals)
    }
}

/// Holds the current [`TokenContext`] and recomputes it when the selected
/// token or the holder changes, or after an approval confirms.
#[derive(Debug, Clone, Default)]
pub struct TokenContextTracker {
    reference: TokenReference,
    context: Option<TokenContext>,
}

impl TokenContextTracker {
    pub fn new(reference: TokenReference) -> Self {
        Self {
            reference,
            context: None,
        }
    }

    pub fn reference(&self) -> &TokenReference {
        &self.reference
    }

    pub fn context(&self) -> Option<&TokenContext> {
        self.context.as_ref()
    }

    pub async fn select<C: ChainClient>(
        &mut self,
        client: &C,
        reference: TokenReference,
        session: &Session,
        spender: Address,
    ) -> Option<&TokenContext> {
        self.reference = reference;
        self.context = None;
        self.recompute(client, session, spender).await
    }

    /// Safe to call repeatedly; a failed read leaves the context absent.
    pub async fn recompute<C: ChainClient>(
        &mut self,
        client: &C,
        session: &Session,
        spender: Address,
    ) -> Option<&TokenContext> {
        self.context = match TokenContext::resolve(client, &self.reference, session, spender).await
        {
            Ok(context) => context,
            Err(e) => {
                warn!("failed to resolve token {}: {}", self.reference, e);
                None
            }
        };
        self.context.as_ref()
    }

    /// Re-read only the allowance and fold it into the current context.
    pub async fn refresh_allowance<C: ChainClient>(
        &mut self,
        client: &C,
        session: &Session,
        spender: Address,
    ) -> Result<U256, ChainError> {
        let token = self
            .reference
            .contract()
            .ok_or(ChainError::UnresolvedContext)?;
        let context = self.context.as_mut().ok_or(ChainError::UnresolvedContext)?;

        let allowance = client.allowance(token, session.holder, spender).await?;
        context.allowance_to_spender = Some(allowance);
        Ok(allowance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_reference() {
        assert_eq!(TokenReference::from_str("").unwrap(), TokenReference::Native);
        assert_eq!(
            TokenReference::from_str("NATIVE").unwrap(),
            TokenReference::Native
        );
        assert_eq!(
            TokenReference::from_str("0x0000000000000000000000000000000000000000").unwrap(),
            TokenReference::Native
        );

        let token = TokenReference::from_str("0x5B38Da6a701c568545dCfcB03FcB875f56beddC4").unwrap();
        assert!(!token.is_native());
        assert_eq!(token.call_address(), token.contract().unwrap());
        assert!(TokenReference::from_str("0x123").is_err());
    }

    #[test]
    fn test_native_call_address_is_zero() {
        assert_eq!(TokenReference::Native.call_address(), Address::ZERO);
        assert_eq!(TokenReference::Native.to_string(), "native");
    }
}
