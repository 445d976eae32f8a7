use std::{future::Future, pin::Pin};

use alloy_primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::{
    error::HandlerError, executor::DistributionRequest, recipient::Recipient,
    token::TokenReference,
};

/// Emitted once when a batch transfer is confirmed on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConfirmed {
    pub from_address: Address,
    pub token: TokenReference,
    pub token_symbol: String,
    pub recipients: Vec<Recipient>,
    /// Exact decimal ui amount
    pub total_amount: String,
    pub tx_hash: TxHash,
    pub confirmed_at: DateTime<Utc>,
}

impl DistributionConfirmed {
    pub fn new(
        request: &DistributionRequest,
        from_address: Address,
        tx_hash: TxHash,
        confirmed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            from_address,
            token: request.token,
            token_symbol: request.units.symbol.clone(),
            recipients: request.recipients.clone(),
            total_amount: request.formatted_total(),
            tx_hash,
            confirmed_at,
        }
    }
}

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + 'a>>;

/// A subscriber to confirmed distributions, e.g. persistence or notification.
pub trait ConfirmationHandler {
    fn name(&self) -> &'static str;

    fn handle<'a>(&'a self, event: &'a DistributionConfirmed) -> HandlerFuture<'a>;
}

/// Fans a confirmation out to every handler. A failing handler does not stop
/// the others.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Box<dyn ConfirmationHandler>>,
}

impl EventDispatcher {
    pub fn subscribe<H: ConfirmationHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub async fn dispatch(&self, event: &DistributionConfirmed) -> Vec<HandlerError> {
        let mut failures = Vec::new();
        for handler in self.handlers.iter() {
            if let Err(e) = handler.handle(event).await {
                error!("{}", e);
                failures.push(e);
            }
        }
        failures
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Reports confirmed distributions to the operator.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ConfirmationHandler for LogNotifier {
    fn name(&self) -> &'static str {
        "notifier"
    }

    fn handle<'a>(&'a self, event: &'a DistributionConfirmed) -> HandlerFuture<'a> {
        Box::pin(async move {
            info!(
                "Airdrop executed successfully to {} recipients: {} {} (tx {})",
                event.recipients.len(),
                event.total_amount,
                event.token_symbol,
                event.tx_hash
            );
            Ok(())
        })
    }
}
