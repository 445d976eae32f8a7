use std::str::FromStr;

use alloy_primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    chain::ReceiptStatus,
    error::{ChainError, ExecutorError, TxFailure, ValidationError},
    events::DistributionConfirmed,
    recipient::Recipient,
    token::TokenReference,
    units::AmountUnits,
};

/// A validated batch, ready to hand to the distributor contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRequest {
    pub token: TokenReference,
    pub units: AmountUnits,
    pub recipients: Vec<Recipient>,
    pub addresses: Vec<Address>,
    /// `amounts[i]` is `recipients[i].amount` scaled to `units.decimals`
    pub amounts: Vec<U256>,
    pub total_amount: U256,
}

impl DistributionRequest {
    /// Only succeeds when the list is non-empty and every entry has a
    /// well-formed address and a positive amount.
    pub fn new(
        token: TokenReference,
        recipients: &[Recipient],
        units: &AmountUnits,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::EmptyRecipientList);
        }

        let mut addresses = Vec::with_capacity(recipients.len());
        let mut amounts = Vec::with_capacity(recipients.len());
        let mut total_amount = U256::ZERO;

        for (index, recipient) in recipients.iter().enumerate() {
            let raw_address = recipient.address.trim();
            if raw_address.is_empty() {
                return Err(ValidationError::MissingAddress { index });
            }
            let address = Address::from_str(raw_address).map_err(|_| {
                ValidationError::MalformedAddress {
                    index,
                    address: recipient.address.clone(),
                }
            })?;
            let amount =
                units
                    .parse(&recipient.amount)
                    .map_err(|reason| ValidationError::InvalidAmount {
                        index,
                        amount: recipient.amount.clone(),
                        reason,
                    })?;

            total_amount = total_amount
                .checked_add(amount)
                .ok_or(ValidationError::TotalOverflow)?;
            addresses.push(address);
            amounts.push(amount);
        }

        Ok(Self {
            token,
            units: units.clone(),
            recipients: recipients.to_vec(),
            addresses,
            amounts,
            total_amount,
        })
    }

    pub fn formatted_total(&self) -> String {
        self.units
            .format(self.total_amount)
            .unwrap_or_else(|_| self.total_amount.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Submitting,
    AwaitingConfirmation { tx_hash: TxHash },
    Succeeded { tx_hash: TxHash },
    Failed(TxFailure),
    Cancelled { reason: String },
}

/// Tracks one batch transfer from submission to receipt.
///
/// The confirmation event is produced by the single transition out of
/// `AwaitingConfirmation`, so it is emitted at most once per transaction no
/// matter how often the receipt is reported.
#[derive(Debug, Clone)]
pub struct DistributionExecutor {
    state: ExecutionState,
    request: Option<DistributionRequest>,
}

impl Default for DistributionExecutor {
    fn default() -> Self {
        Self {
            state: ExecutionState::Idle,
            request: None,
        }
    }
}

impl DistributionExecutor {
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn request(&self) -> Option<&DistributionRequest> {
        self.request.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            ExecutionState::Submitting | ExecutionState::AwaitingConfirmation { .. }
        )
    }

    /// `Idle -> Submitting`. Also allowed from any terminal state.
    pub fn begin(
        &mut self,
        request: DistributionRequest,
    ) -> Result<&DistributionRequest, ExecutorError> {
        if self.is_busy() {
            return Err(ExecutorError::Busy);
        }
        self.state = ExecutionState::Submitting;
        Ok(self.request.insert(request))
    }

    /// Resubmit the last request after a cancellation or failure.
    pub fn retry(&mut self) -> Result<&DistributionRequest, ExecutorError> {
        if self.is_busy() {
            return Err(ExecutorError::Busy);
        }
        match (&self.state, &self.request) {
            (
                ExecutionState::Idle
                | ExecutionState::Cancelled { .. }
                | ExecutionState::Failed(_),
                Some(_),
            ) => {
                self.state = ExecutionState::Submitting;
                self.request.as_ref().ok_or(ExecutorError::NothingToRetry)
            }
            _ => Err(ExecutorError::NothingToRetry),
        }
    }

    /// `Submitting -> AwaitingConfirmation`.
    pub fn submitted(&mut self, tx_hash: TxHash) {
        if self.state == ExecutionState::Submitting {
            info!("distribution submitted: {}", tx_hash);
            self.state = ExecutionState::AwaitingConfirmation { tx_hash };
        }
    }

    /// The wallet never broadcast the transaction.
    pub fn submission_failed(&mut self, error: &ChainError) -> &ExecutionState {
        if self.state == ExecutionState::Submitting {
            self.state = match TxFailure::from_submission(error) {
                TxFailure::Cancelled(reason) => ExecutionState::Cancelled { reason },
                failure => ExecutionState::Failed(failure),
            };
        }
        &self.state
    }

    /// Apply the receipt. Returns the confirmation event on success, exactly
    /// once.
    pub fn resolve(
        &mut self,
        receipt: ReceiptStatus,
        from_address: Address,
        confirmed_at: DateTime<Utc>,
    ) -> Option<DistributionConfirmed> {
        let ExecutionState::AwaitingConfirmation { tx_hash } = self.state else {
            return None;
        };

        match receipt {
            ReceiptStatus::Success => {
                self.state = ExecutionState::Succeeded { tx_hash };
                let request = self.request.as_ref()?;
                Some(DistributionConfirmed::new(
                    request,
                    from_address,
                    tx_hash,
                    confirmed_at,
                ))
            }
            ReceiptStatus::Reverted => {
                warn!("distribution {} reverted", tx_hash);
                self.state = ExecutionState::Failed(TxFailure::Reverted { tx_hash });
                None
            }
            ReceiptStatus::Dropped => {
                warn!("distribution {} dropped before confirmation", tx_hash);
                self.state = ExecutionState::Cancelled {
                    reason: format!("transaction {tx_hash} was abandoned before confirmation"),
                };
                None
            }
        }
    }

    /// Back to `Idle` from a terminal state, keeping the last request for retry.
    pub fn reset(&mut self) {
        if !self.is_busy() {
            self.state = ExecutionState::Idle;
        }
    }
}
