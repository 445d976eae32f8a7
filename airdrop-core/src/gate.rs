use alloy_primitives::{TxHash, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{ChainError, GateError},
    token::{TokenContext, TokenReference},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationState {
    /// Native asset, nothing to approve
    NotRequired,
    /// Allowance has not been read yet
    Unchecked,
    Required,
    InFlight,
    Granted,
    /// Approval confirmed but the allowance could not be re-read
    Failed,
}

/// Decides whether the distributor may spend the holder's tokens, and tracks
/// the approval transaction when it may not.
///
/// Allowance and total are compared as integers at the token's precision.
/// `Granted` is only ever reached from an allowance value read after the
/// latest approval confirmed.
#[derive(Debug, Clone)]
pub struct AllowanceGate {
    state: AuthorizationState,
    checked_allowance: Option<U256>,
    required_total: U256,
    pending_approval: Option<TxHash>,
}

impl AllowanceGate {
    pub fn new(token: &TokenReference) -> Self {
        let state = if token.is_native() {
            AuthorizationState::NotRequired
        } else {
            AuthorizationState::Unchecked
        };
        Self {
            state,
            checked_allowance: None,
            required_total: U256::ZERO,
            pending_approval: None,
        }
    }

    pub fn state(&self) -> AuthorizationState {
        self.state
    }

    /// Whether a distribution may be submitted.
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            AuthorizationState::NotRequired | AuthorizationState::Granted
        )
    }

    pub fn checked_allowance(&self) -> Option<U256> {
        self.checked_allowance
    }

    pub fn required_total(&self) -> U256 {
        self.required_total
    }

    pub fn pending_approval(&self) -> Option<TxHash> {
        self.pending_approval
    }

    /// Re-derive the state from the latest context and the scaled recipient
    /// total. `total` is `None` when the recipient amounts do not parse.
    pub fn evaluate(
        &mut self,
        context: Option<&TokenContext>,
        total: Option<U256>,
    ) -> AuthorizationState {
        match self.state {
            AuthorizationState::NotRequired | AuthorizationState::InFlight => {}
            _ => {
                let allowance = context.and_then(|c| c.allowance_to_spender);
                match (allowance, total) {
                    (Some(allowance), Some(total)) => {
                        self.checked_allowance = Some(allowance);
                        self.required_total = total;
                        self.state = if allowance < total {
                            AuthorizationState::Required
                        } else {
                            AuthorizationState::Granted
                        };
                    }
                    // keep Failed visible until a fresh read succeeds
                    _ if self.state == AuthorizationState::Failed => {}
                    _ => self.state = AuthorizationState::Unchecked,
                }
            }
        }
        debug!("allowance gate: {:?}", self.state);
        self.state
    }

    /// `Required -> InFlight`. Returns the amount the approval should grant.
    pub fn begin_approval(&mut self) -> Result<U256, GateError> {
        match self.state {
            AuthorizationState::Required => {
                self.state = AuthorizationState::InFlight;
                Ok(self.required_total)
            }
            AuthorizationState::NotRequired => Err(GateError::NativeAsset),
            AuthorizationState::InFlight => Err(GateError::ApprovalInFlight),
            other => Err(GateError::NotRequired(other)),
        }
    }

    pub fn approval_submitted(&mut self, tx_hash: TxHash) {
        if self.state == AuthorizationState::InFlight {
            self.pending_approval = Some(tx_hash);
        }
    }

    /// Approval failed, reverted or was cancelled: back to `Required`.
    pub fn approval_abandoned(&mut self) {
        if self.state == AuthorizationState::InFlight {
            self.state = AuthorizationState::Required;
            self.pending_approval = None;
        }
    }

    /// The approval was sent but its outcome is unknown. It may still be
    /// mined, so the gate drops to `Unchecked` and a fresh allowance read is
    /// needed before another approval can start.
    pub fn approval_unresolved(&mut self) {
        if self.state == AuthorizationState::InFlight {
            self.state = AuthorizationState::Unchecked;
            self.pending_approval = None;
        }
    }

    /// Approval receipt confirmed. `refreshed` is the allowance read after the
    /// confirmation; the gate opens only if it covers the total.
    pub fn approval_confirmed(
        &mut self,
        refreshed: Result<U256, ChainError>,
    ) -> AuthorizationState {
        if self.state != AuthorizationState::InFlight {
            return self.state;
        }
        self.pending_approval = None;
        match refreshed {
            Ok(allowance) => {
                self.checked_allowance = Some(allowance);
                self.state = if allowance < self.required_total {
                    AuthorizationState::Required
                } else {
                    AuthorizationState::Granted
                };
            }
            Err(e) => {
                warn!("allowance refresh after approval failed: {}", e);
                self.state = AuthorizationState::Failed;
            }
        }
        self.state
    }
}
