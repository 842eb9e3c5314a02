//! Nullable account provider — scripted accounts, no prompts shown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use coffer_types::Address;
use coffer_wallet_core::error::ProviderError;
use coffer_wallet_core::provider::{AccountProvider, ProviderEvent};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A test provider that answers account requests from a scripted list.
///
/// Every `request_accounts` call counts as one authorization prompt,
/// whether it succeeds or is scripted to reject.
pub struct NullProvider {
    accounts: Mutex<Vec<Address>>,
    reject: Mutex<bool>,
    prompts: AtomicUsize,
    events: broadcast::Sender<ProviderEvent>,
}

impl NullProvider {
    pub fn new() -> Arc<Self> {
        Self::with_accounts(Vec::new())
    }

    /// Create a provider whose user has authorized the given accounts.
    pub fn with_accounts(accounts: Vec<Address>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            accounts: Mutex::new(accounts),
            reject: Mutex::new(false),
            prompts: AtomicUsize::new(0),
            events,
        })
    }

    /// Replace the scripted account list.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().expect("accounts lock poisoned") = accounts;
    }

    /// Script the next prompts to be rejected by the user.
    pub fn set_reject(&self, reject: bool) {
        *self.reject.lock().expect("reject lock poisoned") = reject;
    }

    /// How many authorization prompts the provider has shown.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Push a change notification to all subscribers.
    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl AccountProvider for NullProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if *self.reject.lock().expect("reject lock poisoned") {
            return Err(ProviderError::Rejected(
                "user rejected the request".to_string(),
            ));
        }
        Ok(self.accounts.lock().expect("accounts lock poisoned").clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(self.accounts.lock().expect("accounts lock poisoned").clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
