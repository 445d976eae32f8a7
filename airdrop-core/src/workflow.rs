use std::time::Duration;

use alloy_primitives::{Address, TxHash, U256};
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::{
    chain::{ChainClient, ReceiptStatus},
    error::{ChainError, HandlerError, TxFailure, WorkflowError},
    events::{ConfirmationHandler, EventDispatcher},
    executor::{DistributionExecutor, DistributionRequest, ExecutionState},
    gate::{AllowanceGate, AuthorizationState},
    recipient::RecipientList,
    session::Session,
    token::{NativeAsset, TokenContext, TokenContextTracker, TokenReference},
    units::AmountUnits,
};

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Distributor contract; the spender approvals are granted to
    pub spender: Address,
    pub native: NativeAsset,
    /// Upper bound on waiting for a receipt. `None` waits indefinitely.
    pub confirmation_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Succeeded {
        tx_hash: TxHash,
        /// Handlers that failed after the transfer was already confirmed
        handler_failures: Vec<HandlerError>,
    },
    Failed(TxFailure),
    Cancelled {
        reason: String,
    },
    /// Submitted, but no receipt within the configured timeout
    Pending {
        tx_hash: TxHash,
    },
}

/// Drives token selection, the allowance gate and the executor against a
/// chain client for one session.
pub struct Workflow<C> {
    client: C,
    session: Session,
    config: WorkflowConfig,
    tokens: TokenContextTracker,
    recipients: RecipientList,
    gate: AllowanceGate,
    executor: DistributionExecutor,
    dispatcher: EventDispatcher,
}

impl<C: ChainClient> Workflow<C> {
    pub fn new(client: C, session: Session, config: WorkflowConfig) -> Self {
        Self {
            client,
            session,
            config,
            tokens: TokenContextTracker::default(),
            recipients: RecipientList::default(),
            gate: AllowanceGate::new(&TokenReference::Native),
            executor: DistributionExecutor::default(),
            dispatcher: EventDispatcher::default(),
        }
    }

    pub fn subscribe<H: ConfirmationHandler + 'static>(&mut self, handler: H) {
        self.dispatcher.subscribe(handler);
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> &TokenReference {
        self.tokens.reference()
    }

    pub fn token_context(&self) -> Option<&TokenContext> {
        self.tokens.context()
    }

    pub fn recipients(&self) -> &RecipientList {
        &self.recipients
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.gate.state()
    }

    pub fn gate(&self) -> &AllowanceGate {
        &self.gate
    }

    pub fn execution(&self) -> &ExecutionState {
        self.executor.state()
    }

    /// Units used to scale amounts: the token's, or the native asset's.
    pub fn units(&self) -> Option<AmountUnits> {
        match self.tokens.reference() {
            TokenReference::Native => Some(self.config.native.units()),
            TokenReference::Contract(_) => self.tokens.context().map(TokenContext::units),
        }
    }

    /// Scaled recipient total, if every amount parses.
    pub fn total_amount(&self) -> Option<U256> {
        let units = self.units()?;
        self.recipients.total_amount(units.decimals).ok()
    }

    /// Holder balance of the selected token or of the native asset. Uses the
    /// resolved context when there is one.
    pub async fn holder_balance(&self) -> std::result::Result<U256, ChainError> {
        if let Some(context) = self.tokens.context() {
            return Ok(context.holder_balance);
        }
        self.client
            .balance_of(self.tokens.reference(), self.session.holder)
            .await
    }

    #[instrument(skip(self))]
    pub async fn select_token(&mut self, reference: TokenReference) -> AuthorizationState {
        self.gate = AllowanceGate::new(&reference);
        self.tokens
            .select(&self.client, reference, &self.session, self.config.spender)
            .await;
        self.reevaluate()
    }

    /// A different holder was connected.
    pub async fn set_session(&mut self, session: Session) -> AuthorizationState {
        self.session = session;
        self.gate = AllowanceGate::new(self.tokens.reference());
        self.refresh().await
    }

    /// Re-read the token context and re-derive the gate.
    pub async fn refresh(&mut self) -> AuthorizationState {
        self.tokens
            .recompute(&self.client, &self.session, self.config.spender)
            .await;
        self.reevaluate()
    }

    /// Apply an edit to the recipient list, then re-derive the gate.
    pub fn edit_recipients<F: FnOnce(&mut RecipientList)>(&mut self, edit: F) -> AuthorizationState {
        edit(&mut self.recipients);
        self.reevaluate()
    }

    fn reevaluate(&mut self) -> AuthorizationState {
        let total = self.total_amount();
        self.gate.evaluate(self.tokens.context(), total)
    }

    /// Submit an approval for the current total and wait for it.
    ///
    /// The allowance is re-read after the receipt confirms and before the
    /// gate can report `Granted`.
    #[instrument(skip(self))]
    pub async fn approve(&mut self) -> Result<AuthorizationState> {
        let token = self
            .tokens
            .reference()
            .contract()
            .ok_or(crate::error::GateError::NativeAsset)?;
        let amount = self.gate.begin_approval()?;
        info!("approving {} of {} for {}", amount, token, self.config.spender);

        let tx_hash = match self.client.approve(token, self.config.spender, amount).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                self.gate.approval_abandoned();
                return Err(WorkflowError::Approval(TxFailure::from_submission(&e)));
            }
        };
        self.gate.approval_submitted(tx_hash);

        let failure = match self.wait_for_receipt(tx_hash).await {
            Ok(Some(ReceiptStatus::Success)) => {
                let refreshed = self
                    .tokens
                    .refresh_allowance(&self.client, &self.session, self.config.spender)
                    .await;
                return Ok(self.gate.approval_confirmed(refreshed));
            }
            Ok(Some(ReceiptStatus::Reverted)) => TxFailure::Reverted { tx_hash },
            Ok(Some(ReceiptStatus::Dropped)) => {
                TxFailure::Cancelled(format!("approval {tx_hash} was abandoned"))
            }
            Ok(None) => {
                self.gate.approval_unresolved();
                return Err(WorkflowError::Approval(TxFailure::Unconfirmed { tx_hash }));
            }
            Err(e) => {
                warn!("receipt lookup for approval {} failed: {}", tx_hash, e);
                self.gate.approval_unresolved();
                return Err(WorkflowError::Approval(TxFailure::ReceiptUnavailable {
                    tx_hash,
                    reason: e.to_string(),
                }));
            }
        };
        self.gate.approval_abandoned();
        Err(WorkflowError::Approval(failure))
    }

    /// Validate the recipient list and submit the batch transfer.
    #[instrument(skip(self))]
    pub async fn execute(&mut self) -> Result<ExecutionOutcome> {
        if !self.gate.is_open() {
            return Err(WorkflowError::NotAuthorized(self.gate.state()));
        }
        let units = self.units().ok_or(WorkflowError::TokenUnresolved)?;
        let request =
            DistributionRequest::new(*self.tokens.reference(), self.recipients.as_slice(), &units)?;

        let request = self.executor.begin(request)?.clone();
        self.submit(request).await
    }

    /// Resubmit the last request after a cancellation or failure.
    pub async fn retry(&mut self) -> Result<ExecutionOutcome> {
        if !self.gate.is_open() {
            return Err(WorkflowError::NotAuthorized(self.gate.state()));
        }
        let request = self.executor.retry()?.clone();
        self.submit(request).await
    }

    /// Keep waiting on a distribution left pending by a timeout.
    pub async fn resume(&mut self) -> Option<ExecutionOutcome> {
        let ExecutionState::AwaitingConfirmation { tx_hash } = *self.executor.state() else {
            return None;
        };
        Some(self.confirm(tx_hash).await)
    }

    async fn submit(&mut self, request: DistributionRequest) -> Result<ExecutionOutcome> {
        info!(
            "submitting distribution of {} {} to {} recipients",
            request.formatted_total(),
            request.units.symbol,
            request.addresses.len()
        );
        let submitted = self
            .client
            .distribute(&request.token, &request.addresses, &request.amounts)
            .await;
        let tx_hash = match submitted {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                warn!("distribution not submitted: {}", e);
                self.executor.submission_failed(&e);
                return Ok(self.terminal_outcome());
            }
        };
        self.executor.submitted(tx_hash);
        Ok(self.confirm(tx_hash).await)
    }

    async fn confirm(&mut self, tx_hash: TxHash) -> ExecutionOutcome {
        let receipt = match self.wait_for_receipt(tx_hash).await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                warn!("no receipt for {} yet", tx_hash);
                return ExecutionOutcome::Pending { tx_hash };
            }
            Err(e) => {
                warn!("receipt lookup for {} failed: {}", tx_hash, e);
                return ExecutionOutcome::Pending { tx_hash };
            }
        };

        match self.executor.resolve(receipt, self.session.holder, Utc::now()) {
            Some(event) => {
                let handler_failures = self.dispatcher.dispatch(&event).await;
                ExecutionOutcome::Succeeded {
                    tx_hash,
                    handler_failures,
                }
            }
            None => self.terminal_outcome(),
        }
    }

    fn terminal_outcome(&self) -> ExecutionOutcome {
        match self.executor.state() {
            ExecutionState::Failed(failure) => ExecutionOutcome::Failed(failure.clone()),
            ExecutionState::Cancelled { reason } => ExecutionOutcome::Cancelled {
                reason: reason.clone(),
            },
            ExecutionState::Succeeded { tx_hash } => ExecutionOutcome::Succeeded {
                tx_hash: *tx_hash,
                handler_failures: vec![],
            },
            ExecutionState::AwaitingConfirmation { tx_hash } => {
                ExecutionOutcome::Pending { tx_hash: *tx_hash }
            }
            ExecutionState::Idle | ExecutionState::Submitting => {
                ExecutionOutcome::Failed(TxFailure::NotSubmitted("not submitted".to_string()))
            }
        }
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> std::result::Result<Option<ReceiptStatus>, ChainError> {
        match self.config.confirmation_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.client.wait_for_receipt(tx_hash)).await {
                    Ok(receipt) => receipt.map(Some),
                    Err(_) => Ok(None),
                }
            }
            None => self.client.wait_for_receipt(tx_hash).await.map(Some),
        }
    }
}

impl<C> std::fmt::Debug for Workflow<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("session", &self.session)
            .field("token", self.tokens.reference())
            .field("recipients", &self.recipients.len())
            .field("authorization", &self.gate.state())
            .field("execution", self.executor.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
        str::FromStr,
    };

    use super::*;
    use crate::{
        chain,
        events::{DistributionConfirmed, HandlerFuture},
        recipient::Recipient,
    };

    const APPROVE_TX: TxHash = TxHash::repeat_byte(0xaa);
    const DISTRIBUTE_TX: TxHash = TxHash::repeat_byte(0xdd);
    const AAA: &str = "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4";
    const BBB: &str = "0xAb8483F64d9C6d1EcF9b849Ae677dD3315835cb2";

    struct MockChain {
        decimals: u8,
        allowance: Cell<U256>,
        pending_approval: Cell<Option<U256>>,
        approve_receipt: Cell<ReceiptStatus>,
        distribute_receipt: Cell<ReceiptStatus>,
        reject_distribute: Cell<bool>,
        fail_reads: Cell<bool>,
        fail_approve_receipt: Cell<bool>,
        hang: Cell<bool>,
        calls: RefCell<Vec<&'static str>>,
        distributed: RefCell<Vec<(TokenReference, Vec<Address>, Vec<U256>)>>,
    }

    impl MockChain {
        fn new(decimals: u8, allowance: u64) -> Self {
            Self {
                decimals,
                allowance: Cell::new(U256::from(allowance)),
                pending_approval: Cell::new(None),
                approve_receipt: Cell::new(ReceiptStatus::Success),
                distribute_receipt: Cell::new(ReceiptStatus::Success),
                reject_distribute: Cell::new(false),
                fail_reads: Cell::new(false),
                fail_approve_receipt: Cell::new(false),
                hang: Cell::new(false),
                calls: RefCell::new(vec![]),
                distributed: RefCell::new(vec![]),
            }
        }

        fn record(&self, call: &'static str) {
            self.calls.borrow_mut().push(call);
        }

        fn count(&self, call: &str) -> usize {
            self.calls.borrow().iter().filter(|c| **c == call).count()
        }

        fn read<T>(&self, call: &'static str, value: T) -> chain::Result<T> {
            self.record(call);
            if self.fail_reads.get() {
                return Err(ChainError::Rpc("execution reverted".to_string()));
            }
            Ok(value)
        }
    }

    impl ChainClient for MockChain {
        async fn symbol(&self, _token: Address) -> chain::Result<String> {
            self.read("symbol", "USDT".to_string())
        }

        async fn decimals(&self, _token: Address) -> chain::Result<u8> {
            self.read("decimals", self.decimals)
        }

        async fn balance_of(&self, _token: &TokenReference, _holder: Address) -> chain::Result<U256> {
            self.read("balance_of", U256::from(1_000_000_000_000u64))
        }

        async fn allowance(
            &self,
            _token: Address,
            _holder: Address,
            _spender: Address,
        ) -> chain::Result<U256> {
            self.read("allowance", self.allowance.get())
        }

        async fn approve(
            &self,
            _token: Address,
            _spender: Address,
            amount: U256,
        ) -> chain::Result<TxHash> {
            self.record("approve");
            self.pending_approval.set(Some(amount));
            Ok(APPROVE_TX)
        }

        async fn distribute(
            &self,
            token: &TokenReference,
            recipients: &[Address],
            amounts: &[U256],
        ) -> chain::Result<TxHash> {
            self.record("distribute");
            if self.reject_distribute.get() {
                return Err(ChainError::Rejected("User rejected the request".to_string()));
            }
            self.distributed
                .borrow_mut()
                .push((*token, recipients.to_vec(), amounts.to_vec()));
            Ok(DISTRIBUTE_TX)
        }

        async fn wait_for_receipt(&self, tx_hash: TxHash) -> chain::Result<ReceiptStatus> {
            self.record("receipt");
            if self.hang.get() {
                std::future::pending::<()>().await;
            }
            if tx_hash == APPROVE_TX {
                if self.fail_approve_receipt.get() {
                    return Err(ChainError::Rpc("connection reset".to_string()));
                }
                let status = self.approve_receipt.get();
                if status == ReceiptStatus::Success {
                    if let Some(amount) = self.pending_approval.take() {
                        self.allowance.set(amount);
                    }
                }
                return Ok(status);
            }
            Ok(self.distribute_receipt.get())
        }
    }

    struct Counting(Rc<Cell<usize>>);

    impl ConfirmationHandler for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn handle<'a>(&'a self, _event: &'a DistributionConfirmed) -> HandlerFuture<'a> {
            Box::pin(async move {
                self.0.set(self.0.get() + 1);
                Ok(())
            })
        }
    }

    fn token() -> TokenReference {
        TokenReference::from_str("0x78731D3Ca6b7E34aC0F824c42a7cC18A495cabaB").unwrap()
    }

    fn workflow(chain: MockChain, timeout: Option<Duration>) -> (Workflow<MockChain>, Rc<Cell<usize>>) {
        let config = WorkflowConfig {
            spender: Address::from_str("0x1e3a0AD09978f9c7bfCEA6b5eeE5bDC7DE8B324d").unwrap(),
            native: NativeAsset::default(),
            confirmation_timeout: timeout,
        };
        let session = Session::new(Address::repeat_byte(0x11), 11155111);
        let mut workflow = Workflow::new(chain, session, config);
        let writes = Rc::new(Cell::new(0));
        workflow.subscribe(Counting(writes.clone()));
        (workflow, writes)
    }

    fn ten_tokens(list: &mut RecipientList) {
        list.push(Recipient::new(AAA, "6"));
        list.push(Recipient::new(BBB, "4"));
    }

    #[tokio::test]
    async fn test_native_never_requires_approval() {
        let (mut workflow, writes) = workflow(MockChain::new(6, 0), None);
        assert_eq!(
            workflow.select_token(TokenReference::Native).await,
            AuthorizationState::NotRequired
        );
        assert_eq!(workflow.edit_recipients(ten_tokens), AuthorizationState::NotRequired);

        let outcome = workflow.execute().await.unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Succeeded { .. }));
        assert_eq!(writes.get(), 1);

        let chain = workflow.client();
        assert_eq!(chain.count("approve"), 0);
        assert_eq!(chain.count("allowance"), 0);
        let distributed = chain.distributed.borrow();
        assert_eq!(distributed[0].0, TokenReference::Native);
        // native amounts scale at 18 decimals
        assert_eq!(distributed[0].2[0], U256::from(6_000_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn test_holder_balance_for_native_reads_chain() {
        let (mut workflow, _) = workflow(MockChain::new(6, 0), None);
        workflow.select_token(TokenReference::Native).await;
        assert!(workflow.token_context().is_none());

        assert_eq!(
            workflow.holder_balance().await,
            Ok(U256::from(1_000_000_000_000u64))
        );
        assert_eq!(workflow.client().count("balance_of"), 1);

        workflow.select_token(token()).await;
        assert_eq!(workflow.client().count("balance_of"), 2);
        workflow.holder_balance().await.unwrap();
        // served from the resolved context
        assert_eq!(workflow.client().count("balance_of"), 2);
    }

    #[tokio::test]
    async fn test_approve_then_execute() {
        let (mut workflow, writes) = workflow(MockChain::new(6, 5_000_000), None);
        workflow.edit_recipients(ten_tokens);
        assert_eq!(
            workflow.select_token(token()).await,
            AuthorizationState::Required
        );
        assert!(matches!(
            workflow.execute().await,
            Err(WorkflowError::NotAuthorized(AuthorizationState::Required))
        ));

        assert_eq!(workflow.approve().await.unwrap(), AuthorizationState::Granted);
        // once when resolving, once after the approval confirmed
        assert_eq!(workflow.client().count("allowance"), 2);
        assert_eq!(workflow.gate().checked_allowance(), Some(U256::from(10_000_000u64)));
        assert_eq!(
            workflow.token_context().unwrap().allowance_to_spender,
            Some(U256::from(10_000_000u64))
        );

        let outcome = workflow.execute().await.unwrap();
        assert_eq!(
            outcome,
            ExecutionOutcome::Succeeded {
                tx_hash: DISTRIBUTE_TX,
                handler_failures: vec![]
            }
        );
        assert_eq!(writes.get(), 1);
    }

    #[tokio::test]
    async fn test_sufficient_allowance_skips_approval() {
        let (mut workflow, _) = workflow(MockChain::new(6, 10_000_000), None);
        workflow.edit_recipients(ten_tokens);
        assert_eq!(workflow.select_token(token()).await, AuthorizationState::Granted);
        assert!(matches!(
            workflow.approve().await,
            Err(WorkflowError::Gate(_))
        ));
        assert_eq!(workflow.client().count("approve"), 0);
    }

    #[tokio::test]
    async fn test_reverted_approval_returns_to_required() {
        let chain = MockChain::new(6, 0);
        chain.approve_receipt.set(ReceiptStatus::Reverted);
        let (mut workflow, _) = workflow(chain, None);
        workflow.edit_recipients(ten_tokens);
        workflow.select_token(token()).await;

        assert!(matches!(
            workflow.approve().await,
            Err(WorkflowError::Approval(TxFailure::Reverted { .. }))
        ));
        assert_eq!(workflow.authorization(), AuthorizationState::Required);
    }

    #[tokio::test]
    async fn test_unreadable_approval_receipt_keeps_tx_hash() {
        let chain = MockChain::new(6, 0);
        chain.fail_approve_receipt.set(true);
        let (mut workflow, _) = workflow(chain, None);
        workflow.edit_recipients(ten_tokens);
        workflow.select_token(token()).await;

        let err = workflow.approve().await.unwrap_err();
        assert!(matches!(
            &err,
            WorkflowError::Approval(TxFailure::ReceiptUnavailable { tx_hash, .. })
                if *tx_hash == APPROVE_TX
        ));
        assert!(!err.to_string().contains("Nothing was sent"));
        assert_eq!(workflow.authorization(), AuthorizationState::Unchecked);

        // no second approval until the allowance is re-read
        assert!(matches!(workflow.approve().await, Err(WorkflowError::Gate(_))));
        assert_eq!(workflow.client().count("approve"), 1);

        // the approval was mined after all
        workflow.client().allowance.set(U256::from(10_000_000u64));
        assert_eq!(workflow.refresh().await, AuthorizationState::Granted);
    }

    #[tokio::test]
    async fn test_overflowing_total_cannot_be_approved() {
        let (mut workflow, _) = workflow(MockChain::new(0, 0), None);
        let half = (U256::from(1u64) << 255usize).to_string();
        workflow.edit_recipients(|list| {
            list.push(Recipient::new(AAA, half.clone()));
            list.push(Recipient::new(BBB, half));
        });

        assert_eq!(workflow.select_token(token()).await, AuthorizationState::Unchecked);
        assert_eq!(workflow.total_amount(), None);
        assert!(matches!(workflow.approve().await, Err(WorkflowError::Gate(_))));
        assert!(matches!(
            workflow.execute().await,
            Err(WorkflowError::NotAuthorized(AuthorizationState::Unchecked))
        ));
        assert_eq!(workflow.client().count("approve"), 0);
    }

    #[tokio::test]
    async fn test_invalid_list_blocks_before_chain_calls() {
        let (mut workflow, _) = workflow(MockChain::new(6, 0), None);
        workflow.select_token(TokenReference::Native).await;
        workflow.edit_recipients(|list| {
            list.push(Recipient::new(AAA, "1"));
            list.push(Recipient::new("", "5"));
        });

        assert!(matches!(
            workflow.execute().await,
            Err(WorkflowError::Validation(_))
        ));
        assert_eq!(workflow.client().count("distribute"), 0);
        assert_eq!(workflow.execution(), &ExecutionState::Idle);

        workflow.edit_recipients(|list| list.replace_all(RecipientList::default()));
        assert!(matches!(
            workflow.execute().await,
            Err(WorkflowError::Validation(crate::error::ValidationError::EmptyRecipientList))
        ));
    }

    #[tokio::test]
    async fn test_revert_does_not_persist() {
        let chain = MockChain::new(6, 0);
        chain.distribute_receipt.set(ReceiptStatus::Reverted);
        let (mut workflow, writes) = workflow(chain, None);
        workflow.edit_recipients(ten_tokens);

        let outcome = workflow.execute().await.unwrap();
        assert_eq!(
            outcome,
            ExecutionOutcome::Failed(TxFailure::Reverted {
                tx_hash: DISTRIBUTE_TX
            })
        );
        assert_eq!(writes.get(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_then_retried() {
        let chain = MockChain::new(6, 0);
        chain.reject_distribute.set(true);
        let (mut workflow, writes) = workflow(chain, None);
        workflow.edit_recipients(ten_tokens);

        assert!(matches!(
            workflow.execute().await.unwrap(),
            ExecutionOutcome::Cancelled { .. }
        ));
        assert_eq!(writes.get(), 0);

        workflow.client().reject_distribute.set(false);
        assert!(matches!(
            workflow.retry().await.unwrap(),
            ExecutionOutcome::Succeeded { .. }
        ));
        assert_eq!(writes.get(), 1);
        assert_eq!(workflow.client().distributed.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_leaves_pending_and_resume_persists_once() {
        let chain = MockChain::new(6, 0);
        chain.hang.set(true);
        let (mut workflow, writes) = workflow(chain, Some(Duration::from_millis(20)));
        workflow.edit_recipients(ten_tokens);

        assert_eq!(
            workflow.execute().await.unwrap(),
            ExecutionOutcome::Pending {
                tx_hash: DISTRIBUTE_TX
            }
        );
        assert_eq!(
            workflow.execution(),
            &ExecutionState::AwaitingConfirmation {
                tx_hash: DISTRIBUTE_TX
            }
        );
        assert!(matches!(
            workflow.execute().await,
            Err(WorkflowError::Executor(_))
        ));

        workflow.client().hang.set(false);
        assert!(matches!(
            workflow.resume().await,
            Some(ExecutionOutcome::Succeeded { .. })
        ));
        assert!(workflow.resume().await.is_none());
        assert_eq!(writes.get(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_leaves_context_absent() {
        let chain = MockChain::new(6, 0);
        chain.fail_reads.set(true);
        let (mut workflow, _) = workflow(chain, None);
        workflow.edit_recipients(ten_tokens);

        assert_eq!(workflow.select_token(token()).await, AuthorizationState::Unchecked);
        assert!(workflow.token_context().is_none());
        assert!(matches!(
            workflow.execute().await,
            Err(WorkflowError::NotAuthorized(AuthorizationState::Unchecked))
        ));

        workflow.client().fail_reads.set(false);
        assert_eq!(workflow.refresh().await, AuthorizationState::Required);
    }
}
