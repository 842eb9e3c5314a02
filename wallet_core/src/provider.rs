//! Account provider seam.
//!
//! The provider is the external authority over which account addresses
//! this client may act as. [`AccountProvider`] is the trait seam the
//! connector works against; [`RpcProvider`] is the HTTP implementation
//! used by the binary.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use coffer_types::Address;

use crate::error::ProviderError;

/// Change notifications pushed by the provider.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// The authorized account list changed. Empty means disconnected.
    AccountsChanged(Vec<Address>),
    /// The provider switched to a different chain.
    ChainChanged(u64),
}

/// External authority over the acting account.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Request access to accounts, prompting the user if necessary.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Query the currently authorized accounts without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Subscribe to account and chain change notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

// ── RpcProvider ─────────────────────────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// HTTP client for the account provider's JSON-RPC endpoint.
pub struct RpcProvider {
    http: reqwest::Client,
    endpoint: String,
    events: broadcast::Sender<ProviderEvent>,
    last_seen: Mutex<PolledState>,
}

#[derive(Default)]
struct PolledState {
    accounts: Option<Vec<Address>>,
    chain_id: Option<u64>,
}

impl RpcProvider {
    /// Create a provider client targeting the given endpoint.
    ///
    /// Fails with [`ProviderError::Missing`] when no endpoint is
    /// configured, mirroring the "no wallet installed" case.
    pub fn new(endpoint: impl Into<String>) -> Result<Arc<Self>, ProviderError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ProviderError::Missing);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::Rpc(format!("failed to create HTTP client: {e}")))?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            http,
            endpoint,
            events,
            last_seen: Mutex::new(PolledState::default()),
        }))
    }

    /// The configured provider endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| ProviderError::Rpc("params must be a JSON object".into()))?
            .insert("action".to_string(), serde_json::json!(action));

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Rpc(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ProviderError::Rpc(format!(
                "provider returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Rpc(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Err(ProviderError::Rejected(err.to_string()));
        }

        Ok(json.get("result").cloned().unwrap_or(json))
    }

    async fn fetch_accounts(&self, action: &str) -> Result<Vec<Address>, ProviderError> {
        let result = self.rpc_call(action, serde_json::json!({})).await?;
        let resp: AccountsResult = serde_json::from_value(result)
            .map_err(|e| ProviderError::Rpc(format!("invalid accounts response: {e}")))?;
        resp.accounts
            .iter()
            .map(|raw| {
                Address::parse(raw)
                    .map_err(|e| ProviderError::Rpc(format!("invalid account address: {e}")))
            })
            .collect()
    }

    async fn fetch_chain_id(&self) -> Result<u64, ProviderError> {
        let result = self.rpc_call("chain_id", serde_json::json!({})).await?;
        let resp: ChainIdResult = serde_json::from_value(result)
            .map_err(|e| ProviderError::Rpc(format!("invalid chain_id response: {e}")))?;
        Ok(resp.chain_id)
    }

    /// Spawn a background poller that turns the provider's pull interface
    /// into the push-style event channel the connector listens on.
    ///
    /// Polls the authorized account list and chain id and broadcasts a
    /// [`ProviderEvent`] whenever either changes. Poll errors are logged
    /// and skipped; the next tick retries.
    pub fn spawn_poller(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match provider.accounts().await {
                    Ok(accounts) => provider.observe_accounts(accounts),
                    Err(e) => tracing::debug!("account poll failed: {e}"),
                }
                match provider.fetch_chain_id().await {
                    Ok(chain_id) => provider.observe_chain(chain_id),
                    Err(e) => tracing::debug!("chain poll failed: {e}"),
                }
            }
        })
    }

    fn observe_accounts(&self, accounts: Vec<Address>) {
        let mut last = self.last_seen.lock().expect("provider poll state poisoned");
        if last.accounts.as_ref() != Some(&accounts) {
            let changed = last.accounts.is_some();
            last.accounts = Some(accounts.clone());
            drop(last);
            if changed {
                tracing::info!(count = accounts.len(), "authorized accounts changed");
                let _ = self.events.send(ProviderEvent::AccountsChanged(accounts));
            }
        }
    }

    fn observe_chain(&self, chain_id: u64) {
        let mut last = self.last_seen.lock().expect("provider poll state poisoned");
        if last.chain_id != Some(chain_id) {
            let changed = last.chain_id.is_some();
            last.chain_id = Some(chain_id);
            drop(last);
            if changed {
                tracing::info!(chain_id, "provider chain changed");
                let _ = self.events.send(ProviderEvent::ChainChanged(chain_id));
            }
        }
    }
}

#[async_trait]
impl AccountProvider for RpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.fetch_accounts("request_accounts").await
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.fetch_accounts("accounts").await
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// Accounts response from the provider.
#[derive(Debug, Clone, Deserialize)]
struct AccountsResult {
    #[serde(default)]
    accounts: Vec<String>,
}

/// Chain id response from the provider.
#[derive(Debug, Clone, Deserialize)]
struct ChainIdResult {
    chain_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_endpoint_means_no_provider() {
        assert!(matches!(RpcProvider::new(""), Err(ProviderError::Missing)));
        assert!(matches!(
            RpcProvider::new("   "),
            Err(ProviderError::Missing)
        ));
    }

    #[test]
    fn provider_creation() {
        let provider = RpcProvider::new("http://127.0.0.1:8545").unwrap();
        assert_eq!(provider.endpoint(), "http://127.0.0.1:8545");
    }

    #[test]
    fn accounts_response_parses() {
        let json = serde_json::json!({
            "accounts": ["0xd47afa75b77f0e3cf792e676f295194fbab74853"]
        });
        let resp: AccountsResult = serde_json::from_value(json).unwrap();
        assert_eq!(resp.accounts.len(), 1);
    }

    #[test]
    fn accounts_response_defaults_to_empty() {
        let resp: AccountsResult = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(resp.accounts.is_empty());
    }
}
