//! Cached read-model of the contract's observable state.
//!
//! The store is the single writer of the cached snapshot. `refresh()`
//! performs the three contract reads concurrently and records each
//! failure per field, keeping the previous cached value; partial success
//! is the normal case on a flaky network. Overlapping refresh requests
//! coalesce into the in-flight one instead of issuing duplicate reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use coffer_types::{Address, Amount};

use crate::ledger::LedgerGateway;

/// The three observable contract fields, each paired with the error
/// marker from the last refresh that touched it.
///
/// `None` values mean the field has never been read successfully; a set
/// error marker means the last refresh failed for that field and the
/// value shown is the previous cached one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub bank_name: Option<String>,
    pub owner: Option<Address>,
    pub balance: Option<Amount>,
    pub name_error: Option<String>,
    pub owner_error: Option<String>,
    pub balance_error: Option<String>,
}

impl Snapshot {
    /// Whether the given address is the bank owner per the cached state.
    pub fn is_owner(&self, address: &Address) -> bool {
        self.owner.as_ref() == Some(address)
    }

    /// Whether the last refresh recorded any field failure.
    pub fn has_errors(&self) -> bool {
        self.name_error.is_some() || self.owner_error.is_some() || self.balance_error.is_some()
    }
}

/// Owns the cached [`Snapshot`] and the guarded refresh path.
pub struct ReadModelStore {
    gateway: Arc<dyn LedgerGateway>,
    account: Address,
    snapshot: RwLock<Snapshot>,
    refresh_gate: Mutex<()>,
    generation: AtomicU64,
}

impl ReadModelStore {
    pub fn new(gateway: Arc<dyn LedgerGateway>, account: Address) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            account,
            snapshot: RwLock::new(Snapshot::default()),
            refresh_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        })
    }

    /// The account whose balance this store tracks.
    pub fn account(&self) -> &Address {
        &self.account
    }

    /// The current cached snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    /// Re-read the three contract fields and update the cache.
    ///
    /// Callers that arrive while a refresh is already in flight await it
    /// and return its result without issuing duplicate network reads:
    /// the generation counter recorded before taking the gate tells a
    /// waiter whether a refresh completed while it was queued.
    pub async fn refresh(&self) -> Snapshot {
        let entry_generation = self.generation.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;
        if self.generation.load(Ordering::Acquire) != entry_generation {
            return self.snapshot();
        }

        let (name, owner, balance) = tokio::join!(
            self.gateway.read_name(),
            self.gateway.read_owner(),
            self.gateway.read_balance(&self.account),
        );

        {
            let mut snapshot = self.snapshot.write().expect("snapshot lock poisoned");
            match name.map(|slot| slot.decode()) {
                Ok(Ok(text)) => {
                    snapshot.bank_name = Some(text);
                    snapshot.name_error = None;
                }
                Ok(Err(e)) => {
                    tracing::warn!("bank name decode failed: {e}");
                    snapshot.name_error = Some(e.to_string());
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    snapshot.name_error = Some(e.to_string());
                }
            }
            match owner {
                Ok(address) => {
                    snapshot.owner = Some(address);
                    snapshot.owner_error = None;
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    snapshot.owner_error = Some(e.to_string());
                }
            }
            match balance {
                Ok(amount) => {
                    snapshot.balance = Some(amount);
                    snapshot.balance_error = None;
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    snapshot.balance_error = Some(e.to_string());
                }
            }
        }

        self.generation.fetch_add(1, Ordering::Release);
        self.snapshot()
    }
}
