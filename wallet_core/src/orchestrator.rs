//! Write-path state machine.
//!
//! Every balance-changing operation flows through here: validate the
//! payload, reserve the per-kind slot, submit through the gateway, then
//! track confirmation in a background task. The orchestrator owns all
//! in-flight [`PendingTransaction`] records; at most one record per kind
//! may be submitted at a time, and a record is discarded once it reaches
//! a terminal status. Confirmed writes trigger a read-model refresh
//! strictly after the confirmation is observed; reverted writes do not.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};

use coffer_types::{Amount, BankName, TxHash, TxKind, TxStatus};

use crate::connector::WalletSession;
use crate::error::{ControllerError, LedgerError};
use crate::ledger::LedgerGateway;
use crate::read_model::ReadModelStore;
use crate::validate;

/// A write operation as entered by the user, before validation.
#[derive(Debug, Clone)]
pub enum WriteRequest {
    Deposit { amount: String },
    Withdraw { amount: String },
    SetName { name: String },
}

/// An in-flight write operation.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub kind: TxKind,
    pub hash: TxHash,
    pub status: TxStatus,
}

/// Returned to the caller once a write is confirmed.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub kind: TxKind,
    pub hash: TxHash,
}

enum Validated {
    Deposit(Amount),
    Withdraw(Amount),
    SetName(BankName),
}

impl Validated {
    fn kind(&self) -> TxKind {
        match self {
            Self::Deposit(_) => TxKind::Deposit,
            Self::Withdraw(_) => TxKind::Withdraw,
            Self::SetName(_) => TxKind::SetName,
        }
    }
}

/// Sequences validate -> submit -> await-confirmation -> resync for
/// each write operation.
pub struct TransactionOrchestrator {
    gateway: Arc<dyn LedgerGateway>,
    store: Arc<ReadModelStore>,
    session: WalletSession,
    pending: Arc<Mutex<HashMap<TxKind, PendingTransaction>>>,
    confirmation_timeout: Option<Duration>,
}

impl TransactionOrchestrator {
    /// `confirmation_timeout` is advisory: when set, `submit` returns a
    /// [`ControllerError::ConfirmationTimeout`] after that long, but the
    /// background tracker keeps waiting and the pending record keeps its
    /// status until the network resolves it.
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        store: Arc<ReadModelStore>,
        session: WalletSession,
        confirmation_timeout: Option<Duration>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            store,
            session,
            pending: Arc::new(Mutex::new(HashMap::new())),
            confirmation_timeout,
        })
    }

    /// In-flight transactions, for display surfaces.
    pub async fn pending(&self) -> Vec<PendingTransaction> {
        self.pending.lock().await.values().cloned().collect()
    }

    /// Submit a write operation against the contract.
    ///
    /// Validation failures and the advisory withdraw sufficiency check
    /// reject before anything touches the network. A second submission
    /// of a kind that is already in flight is rejected with
    /// [`ControllerError::ConcurrentSubmission`]; the kind slot is
    /// reserved before the network submit and held until the network
    /// resolves the transaction, so an abandoned wait cannot enable an
    /// overlapping same-kind write.
    pub async fn submit(&self, request: WriteRequest) -> Result<TxReceipt, ControllerError> {
        let validated = self.validate(request)?;
        let kind = validated.kind();

        {
            let mut pending = self.pending.lock().await;
            if pending.contains_key(&kind) {
                return Err(ControllerError::ConcurrentSubmission { kind });
            }
            pending.insert(
                kind,
                PendingTransaction {
                    kind,
                    hash: TxHash::ZERO,
                    status: TxStatus::Submitted,
                },
            );
        }

        let hash = match self.dispatch(&validated).await {
            Ok(hash) => hash,
            Err(e) => {
                self.pending.lock().await.remove(&kind);
                return Err(submission_error(e));
            }
        };
        if let Some(record) = self.pending.lock().await.get_mut(&kind) {
            record.hash = hash;
        }
        tracing::info!(%kind, %hash, "transaction submitted");

        let completion = self.spawn_tracker(kind, hash);
        self.await_completion(kind, hash, completion).await
    }

    fn validate(&self, request: WriteRequest) -> Result<Validated, ControllerError> {
        match request {
            WriteRequest::Deposit { amount } => {
                Ok(Validated::Deposit(validate::parse_amount(&amount)?))
            }
            WriteRequest::Withdraw { amount } => {
                let amount = validate::parse_amount(&amount)?;
                // Advisory check against the last known cached balance;
                // the contract remains the final authority and may still
                // reject for staleness.
                if let Some(available) = self.store.snapshot().balance {
                    if amount > available {
                        return Err(ControllerError::InsufficientBalance {
                            needed: amount,
                            available,
                        });
                    }
                }
                Ok(Validated::Withdraw(amount))
            }
            WriteRequest::SetName { name } => {
                Ok(Validated::SetName(validate::parse_name(&name)?))
            }
        }
    }

    async fn dispatch(&self, validated: &Validated) -> Result<TxHash, LedgerError> {
        let from = self.session.address();
        match validated {
            Validated::Deposit(value) => self.gateway.submit_deposit(from, *value).await,
            // The original flow withdraws to the caller's own address.
            Validated::Withdraw(amount) => {
                self.gateway.submit_withdraw(from, from, *amount).await
            }
            Validated::SetName(name) => self.gateway.submit_set_name(from, name).await,
        }
    }

    /// Spawn the confirmation tracker for a submitted transaction.
    ///
    /// The tracker owns the record's terminal transition: on
    /// confirmation it discards the record and then triggers the
    /// read-model refresh; on revert it discards the record without a
    /// refresh (the contract state is assumed unchanged).
    fn spawn_tracker(
        &self,
        kind: TxKind,
        hash: TxHash,
    ) -> oneshot::Receiver<Result<(), LedgerError>> {
        let (done_tx, done_rx) = oneshot::channel();
        let gateway = Arc::clone(&self.gateway);
        let store = Arc::clone(&self.store);
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            let outcome = gateway.await_confirmation(&hash).await;
            let terminal = match &outcome {
                Ok(()) => TxStatus::Confirmed,
                Err(_) => TxStatus::Reverted,
            };
            {
                let mut pending = pending.lock().await;
                if let Some(record) = pending.get_mut(&kind) {
                    record.status = terminal;
                }
                pending.remove(&kind);
            }
            match &outcome {
                Ok(()) => {
                    tracing::info!(%kind, %hash, "transaction confirmed");
                    store.refresh().await;
                }
                Err(e) => {
                    tracing::warn!(%kind, %hash, "transaction reverted: {e}");
                }
            }
            let _ = done_tx.send(outcome);
        });
        done_rx
    }

    async fn await_completion(
        &self,
        kind: TxKind,
        hash: TxHash,
        completion: oneshot::Receiver<Result<(), LedgerError>>,
    ) -> Result<TxReceipt, ControllerError> {
        let outcome = match self.confirmation_timeout {
            Some(limit) => match tokio::time::timeout(limit, completion).await {
                Ok(received) => received,
                // Advisory: the tracker keeps running and the kind slot
                // stays reserved until the network resolves it.
                Err(_) => return Err(ControllerError::ConfirmationTimeout { kind, hash }),
            },
            None => completion.await,
        };
        match outcome {
            Ok(Ok(())) => Ok(TxReceipt { kind, hash }),
            Ok(Err(e)) => Err(submission_error(e)),
            Err(_) => Err(ControllerError::Ledger(LedgerError::Rpc(
                "confirmation tracker dropped".into(),
            ))),
        }
    }
}

fn submission_error(e: LedgerError) -> ControllerError {
    match e {
        LedgerError::Submission { reason } => ControllerError::Submission { reason },
        other => ControllerError::Ledger(other),
    }
}
