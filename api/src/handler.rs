use hyperdrop_core::{
    error::HandlerError,
    events::{ConfirmationHandler, DistributionConfirmed, HandlerFuture},
};

use crate::{client::AirdropApiClient, types::SaveAirdropRequest};

/// Records each confirmed distribution with the backend.
///
/// The transfer already happened on-chain; a failure here is reported but
/// never changes the distribution outcome.
#[derive(Debug, Clone)]
pub struct PersistHandler {
    client: AirdropApiClient,
}

impl PersistHandler {
    pub fn new(client: AirdropApiClient) -> Self {
        Self { client }
    }
}

impl ConfirmationHandler for PersistHandler {
    fn name(&self) -> &'static str {
        "persistence"
    }

    fn handle<'a>(&'a self, event: &'a DistributionConfirmed) -> HandlerFuture<'a> {
        Box::pin(async move {
            let request = SaveAirdropRequest::from(event);
            self.client
                .record_distribution(&request)
                .await
                .map_err(|e| HandlerError {
                    handler: self.name(),
                    reason: format!("Error saving airdrop: {e}"),
                })
        })
    }
}
