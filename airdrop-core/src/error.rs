use alloy_primitives::TxHash;
use thiserror::Error;

use crate::gate::AuthorizationState;

/// Why a single amount string could not be turned into token units.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is negative")]
    Negative,
    #[error("amount must be greater than zero")]
    Zero,
    #[error("amount is not a decimal number")]
    NotANumber,
    #[error("amount has more than {0} fractional digits")]
    TooPrecise(u8),
    #[error("{0} decimals is not a supported precision")]
    UnsupportedDecimals(u8),
    #[error("amount does not fit in 256 bits")]
    TooLarge,
}

/// Recipient list problems caught before any chain interaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No recipients added")]
    EmptyRecipientList,
    #[error("Recipient #{index} has no address")]
    MissingAddress { index: usize },
    #[error("Recipient #{index} has malformed address {address}")]
    MalformedAddress { index: usize, address: String },
    #[error("Recipient #{index} has invalid amount {amount:?}: {reason}")]
    InvalidAmount {
        index: usize,
        amount: String,
        reason: AmountError,
    },
    #[error("Total amount overflows 256 bits")]
    TotalOverflow,
}

#[derive(Error, Debug)]
pub enum RecipientFileError {
    #[error("io Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Csv Error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing column {0:?} in header row")]
    MissingColumn(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Rpc error: {0}")]
    Rpc(String),
    #[error("Rejected by wallet: {0}")]
    Rejected(String),
    #[error("Token context is not resolved")]
    UnresolvedContext,
}

/// How a submitted (or attempted) transaction ended when it did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxFailure {
    #[error("Nothing was sent on-chain: {0}")]
    NotSubmitted(String),
    #[error("Transaction {tx_hash} reverted on-chain")]
    Reverted { tx_hash: TxHash },
    #[error("Cancelled: {0}")]
    Cancelled(String),
    #[error("Transaction {tx_hash} was not confirmed in time")]
    Unconfirmed { tx_hash: TxHash },
    #[error("Transaction {tx_hash} was sent but its receipt could not be read: {reason}")]
    ReceiptUnavailable { tx_hash: TxHash, reason: String },
}

impl TxFailure {
    /// Classify an error returned while handing a transaction to the wallet.
    pub fn from_submission(error: &ChainError) -> Self {
        match error {
            ChainError::Rejected(reason) => TxFailure::Cancelled(reason.clone()),
            other => TxFailure::NotSubmitted(other.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Native assets never need an approval")]
    NativeAsset,
    #[error("An approval is already in flight")]
    ApprovalInFlight,
    #[error("Approval is not required in state {0:?}")]
    NotRequired(AuthorizationState),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("A distribution is already in progress")]
    Busy,
    #[error("There is no distribution to retry")]
    NothingToRetry,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{handler} failed: {reason}")]
pub struct HandlerError {
    pub handler: &'static str,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Validation Error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Gate Error: {0}")]
    Gate(#[from] GateError),
    #[error("Executor Error: {0}")]
    Executor(#[from] ExecutorError),
    #[error("Token information not available")]
    TokenUnresolved,
    #[error("Token spending is not authorized yet ({0:?})")]
    NotAuthorized(AuthorizationState),
    #[error("Approval failed: {0}")]
    Approval(TxFailure),
}
