//! Nullable ledger — a scripted in-memory bank contract.
//!
//! Reads answer from scripted state, writes are recorded instead of
//! broadcast, and confirmation is driven programmatically: `confirm`
//! applies the recorded operation's effect to the scripted state before
//! releasing waiters, so a post-confirmation re-read observes the
//! contract-computed result. `set_auto_confirm` collapses submit and
//! confirm into one step for tests that only care about the happy path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use coffer_types::{Address, Amount, BankName, TxHash, TxKind};
use coffer_wallet_core::error::{LedgerError, ReadField};
use coffer_wallet_core::ledger::LedgerGateway;

/// A write operation recorded by the null ledger.
#[derive(Debug, Clone)]
pub struct SubmittedOp {
    pub hash: TxHash,
    pub kind: TxKind,
    payload: Payload,
}

#[derive(Debug, Clone)]
enum Payload {
    Deposit { account: Address, value: Amount },
    Withdraw { account: Address, amount: Amount },
    SetName { name: BankName },
}

enum Outcome {
    Confirmed,
    Reverted(String),
}

struct LedgerState {
    bank_name: BankName,
    owner: Option<Address>,
    balances: HashMap<Address, Amount>,
    fail_name: Option<String>,
    fail_owner: Option<String>,
    fail_balance: Option<String>,
    read_delay: Option<Duration>,
    auto_confirm: bool,
    reject_reason: Option<String>,
    next_hash: u64,
    submitted: Vec<SubmittedOp>,
    outcomes: HashMap<TxHash, Outcome>,
}

/// A test ledger that records submissions instead of sending them.
pub struct NullLedger {
    state: Mutex<LedgerState>,
    name_reads: AtomicUsize,
    owner_reads: AtomicUsize,
    balance_reads: AtomicUsize,
    changed: Notify,
}

impl NullLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LedgerState {
                bank_name: BankName::from_bytes([0u8; 32]),
                owner: None,
                balances: HashMap::new(),
                fail_name: None,
                fail_owner: None,
                fail_balance: None,
                read_delay: None,
                auto_confirm: false,
                reject_reason: None,
                next_hash: 0,
                submitted: Vec::new(),
                outcomes: HashMap::new(),
            }),
            name_reads: AtomicUsize::new(0),
            owner_reads: AtomicUsize::new(0),
            balance_reads: AtomicUsize::new(0),
            changed: Notify::new(),
        })
    }

    // ── Scripting ───────────────────────────────────────────────────────

    /// Script the bank name slot.
    pub fn set_bank_name(&self, name: BankName) {
        self.lock().bank_name = name;
    }

    /// Script the bank owner. Unset reads answer with the zero address.
    pub fn set_owner(&self, owner: Address) {
        self.lock().owner = Some(owner);
    }

    /// Script an account balance. Unknown accounts read as zero.
    pub fn set_balance(&self, account: Address, amount: Amount) {
        self.lock().balances.insert(account, amount);
    }

    /// Confirm every submission immediately, applying its effect.
    pub fn set_auto_confirm(&self, auto_confirm: bool) {
        self.lock().auto_confirm = auto_confirm;
    }

    /// Delay every read by the given duration.
    pub fn set_read_delay(&self, delay: Duration) {
        self.lock().read_delay = Some(delay);
    }

    /// Script bank name reads to fail with the given reason.
    pub fn fail_name_reads(&self, reason: Option<String>) {
        self.lock().fail_name = reason;
    }

    /// Script owner reads to fail with the given reason.
    pub fn fail_owner_reads(&self, reason: Option<String>) {
        self.lock().fail_owner = reason;
    }

    /// Script balance reads to fail with the given reason.
    pub fn fail_balance_reads(&self, reason: Option<String>) {
        self.lock().fail_balance = reason;
    }

    /// Script submissions to be rejected at the door with the given reason.
    pub fn reject_submissions(&self, reason: Option<String>) {
        self.lock().reject_reason = reason;
    }

    // ── Assertions ──────────────────────────────────────────────────────

    /// All operations "submitted" so far (for assertions).
    pub fn submitted(&self) -> Vec<SubmittedOp> {
        self.lock().submitted.clone()
    }

    pub fn name_read_count(&self) -> usize {
        self.name_reads.load(Ordering::SeqCst)
    }

    pub fn owner_read_count(&self) -> usize {
        self.owner_reads.load(Ordering::SeqCst)
    }

    pub fn balance_read_count(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst)
    }

    // ── Confirmation control ────────────────────────────────────────────

    /// Mark the transaction confirmed, apply its effect, release waiters.
    pub fn confirm(&self, hash: TxHash) {
        {
            let mut state = self.lock();
            if let Some(op) = state
                .submitted
                .iter()
                .find(|op| op.hash == hash)
                .cloned()
            {
                state.apply(&op);
                state.outcomes.insert(hash, Outcome::Confirmed);
            }
        }
        self.changed.notify_waiters();
    }

    /// Mark the transaction reverted with the given reason. The scripted
    /// state is left untouched.
    pub fn revert(&self, hash: TxHash, reason: impl Into<String>) {
        self.lock()
            .outcomes
            .insert(hash, Outcome::Reverted(reason.into()));
        self.changed.notify_waiters();
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().expect("ledger state poisoned")
    }

    async fn read_delay(&self) {
        let delay = self.lock().read_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn record(&self, kind: TxKind, payload: Payload) -> Result<TxHash, LedgerError> {
        let mut state = self.lock();
        if let Some(reason) = &state.reject_reason {
            return Err(LedgerError::Submission {
                reason: reason.clone(),
            });
        }
        state.next_hash += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&state.next_hash.to_be_bytes());
        let hash = TxHash::new(bytes);
        let op = SubmittedOp {
            hash,
            kind,
            payload,
        };
        state.submitted.push(op.clone());
        if state.auto_confirm {
            state.apply(&op);
            state.outcomes.insert(hash, Outcome::Confirmed);
        }
        drop(state);
        self.changed.notify_waiters();
        Ok(hash)
    }
}

impl LedgerState {
    fn apply(&mut self, op: &SubmittedOp) {
        match &op.payload {
            Payload::Deposit { account, value } => {
                let current = self.balance_of(account);
                let next = current
                    .checked_add(*value)
                    .expect("scripted balance overflowed");
                self.balances.insert(account.clone(), next);
            }
            Payload::Withdraw { account, amount } => {
                let current = self.balance_of(account);
                self.balances
                    .insert(account.clone(), current.saturating_sub(*amount));
            }
            Payload::SetName { name } => {
                self.bank_name = *name;
            }
        }
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }
}

#[async_trait]
impl LedgerGateway for NullLedger {
    async fn read_name(&self) -> Result<BankName, LedgerError> {
        self.name_reads.fetch_add(1, Ordering::SeqCst);
        self.read_delay().await;
        let state = self.lock();
        if let Some(reason) = &state.fail_name {
            return Err(LedgerError::Read {
                field: ReadField::BankName,
                reason: reason.clone(),
            });
        }
        Ok(state.bank_name)
    }

    async fn read_owner(&self) -> Result<Address, LedgerError> {
        self.owner_reads.fetch_add(1, Ordering::SeqCst);
        self.read_delay().await;
        let state = self.lock();
        if let Some(reason) = &state.fail_owner {
            return Err(LedgerError::Read {
                field: ReadField::BankOwner,
                reason: reason.clone(),
            });
        }
        Ok(state.owner.clone().unwrap_or_else(Address::zero))
    }

    async fn read_balance(&self, account: &Address) -> Result<Amount, LedgerError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        self.read_delay().await;
        let state = self.lock();
        if let Some(reason) = &state.fail_balance {
            return Err(LedgerError::Read {
                field: ReadField::Balance,
                reason: reason.clone(),
            });
        }
        Ok(state.balance_of(account))
    }

    async fn submit_deposit(
        &self,
        from: &Address,
        value: Amount,
    ) -> Result<TxHash, LedgerError> {
        self.record(
            TxKind::Deposit,
            Payload::Deposit {
                account: from.clone(),
                value,
            },
        )
    }

    async fn submit_withdraw(
        &self,
        from: &Address,
        _to: &Address,
        amount: Amount,
    ) -> Result<TxHash, LedgerError> {
        self.record(
            TxKind::Withdraw,
            Payload::Withdraw {
                account: from.clone(),
                amount,
            },
        )
    }

    async fn submit_set_name(
        &self,
        from: &Address,
        name: &BankName,
    ) -> Result<TxHash, LedgerError> {
        let _ = from;
        self.record(TxKind::SetName, Payload::SetName { name: *name })
    }

    async fn await_confirmation(&self, hash: &TxHash) -> Result<(), LedgerError> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            // Register before checking so a notify between the check and
            // the await cannot be missed.
            notified.as_mut().enable();
            {
                let state = self.lock();
                match state.outcomes.get(hash) {
                    Some(Outcome::Confirmed) => return Ok(()),
                    Some(Outcome::Reverted(reason)) => {
                        return Err(LedgerError::Submission {
                            reason: reason.clone(),
                        })
                    }
                    None => {}
                }
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: &str) -> Address {
        Address::parse(&format!("0x{:0>40}", last)).unwrap()
    }

    fn tokens(n: u128) -> Amount {
        Amount::new(n * Amount::UNITS_PER_TOKEN)
    }

    #[tokio::test]
    async fn reads_answer_from_scripted_state() {
        let ledger = NullLedger::new();
        ledger.set_owner(addr("aa"));
        ledger.set_balance(addr("bb"), tokens(7));

        assert_eq!(ledger.read_owner().await.unwrap(), addr("aa"));
        assert_eq!(ledger.read_balance(&addr("bb")).await.unwrap(), tokens(7));
        assert_eq!(ledger.read_balance(&addr("cc")).await.unwrap(), Amount::ZERO);
        assert_eq!(ledger.owner_read_count(), 1);
        assert_eq!(ledger.balance_read_count(), 2);
    }

    #[tokio::test]
    async fn confirm_applies_the_recorded_effect() {
        let ledger = NullLedger::new();
        ledger.set_balance(addr("aa"), tokens(10));

        let hash = ledger
            .submit_withdraw(&addr("aa"), &addr("aa"), tokens(4))
            .await
            .unwrap();
        // Not applied yet: the submission is only recorded.
        assert_eq!(ledger.read_balance(&addr("aa")).await.unwrap(), tokens(10));

        ledger.confirm(hash);
        ledger.await_confirmation(&hash).await.unwrap();
        assert_eq!(ledger.read_balance(&addr("aa")).await.unwrap(), tokens(6));
    }

    #[tokio::test]
    async fn revert_releases_waiters_without_applying() {
        let ledger = NullLedger::new();
        let hash = ledger
            .submit_deposit(&addr("aa"), tokens(1))
            .await
            .unwrap();

        let waiter = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.await_confirmation(&hash).await }
        });
        ledger.revert(hash, "out of service");

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(LedgerError::Submission { .. })));
        assert_eq!(ledger.read_balance(&addr("aa")).await.unwrap(), Amount::ZERO);
    }

    #[tokio::test]
    async fn rejected_submissions_are_not_recorded() {
        let ledger = NullLedger::new();
        ledger.reject_submissions(Some("bank is closed".into()));

        let result = ledger.submit_deposit(&addr("aa"), tokens(1)).await;
        assert!(matches!(result, Err(LedgerError::Submission { .. })));
        assert!(ledger.submitted().is_empty());
    }

    #[tokio::test]
    async fn hashes_are_sequential_and_distinct() {
        let ledger = NullLedger::new();
        let a = ledger.submit_deposit(&addr("aa"), tokens(1)).await.unwrap();
        let b = ledger.submit_deposit(&addr("aa"), tokens(1)).await.unwrap();
        assert_ne!(a, b);
        assert!(!a.is_zero());
    }
}
