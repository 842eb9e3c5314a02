//! Wallet connection state machine.
//!
//! Tracks the identity session obtained from the external account
//! provider: `Disconnected -> Connecting -> Connected`. The session
//! address is immutable once connected; any account switch or chain
//! change destroys the session rather than rebinding it, and the next
//! `connect()` adopts whatever identity the provider then reports.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use coffer_types::Address;

use crate::error::ProviderError;
use crate::provider::{AccountProvider, ProviderEvent};

/// The identity an end user acts as. At most one session is active;
/// its address never changes for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    address: Address,
}

impl WalletSession {
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Connection lifecycle of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

struct ConnectorInner {
    state: ConnectionState,
    session: Option<WalletSession>,
}

/// Obtains and tracks the connected identity.
pub struct WalletConnector {
    provider: Arc<dyn AccountProvider>,
    inner: RwLock<ConnectorInner>,
}

impl WalletConnector {
    pub fn new(provider: Arc<dyn AccountProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            inner: RwLock::new(ConnectorInner {
                state: ConnectionState::Disconnected,
                session: None,
            }),
        })
    }

    /// Establish a session, prompting the provider for account access.
    ///
    /// Idempotent: when already connected the existing session is
    /// returned without a new provider request, so repeated calls issue
    /// at most one authorization prompt per Disconnected-to-Connected
    /// transition. Concurrent callers serialize on the state lock and
    /// the losers reuse the winner's session.
    pub async fn connect(&self) -> Result<WalletSession, ProviderError> {
        let mut inner = self.inner.write().await;
        if let Some(session) = &inner.session {
            return Ok(session.clone());
        }

        inner.state = ConnectionState::Connecting;
        let result = self.provider.request_accounts().await;
        let accounts = match result {
            Ok(accounts) => accounts,
            Err(e) => {
                inner.state = ConnectionState::Disconnected;
                return Err(e);
            }
        };

        let Some(address) = accounts.into_iter().next() else {
            inner.state = ConnectionState::Disconnected;
            return Err(ProviderError::Rejected(
                "provider returned no authorized accounts".into(),
            ));
        };

        tracing::info!(account = %address.short(), "wallet connected");
        let session = WalletSession { address };
        inner.state = ConnectionState::Connected;
        inner.session = Some(session.clone());
        Ok(session)
    }

    /// The current session, if connected.
    pub async fn session(&self) -> Option<WalletSession> {
        self.inner.read().await.session.clone()
    }

    /// The current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.inner.read().await.state
    }

    /// React to a provider change notification.
    ///
    /// An empty account list, a switch to a different first account, or
    /// a chain change all force `Connected -> Disconnected`. Cached
    /// contract state belongs to the old identity or chain and is
    /// rebuilt after the next connect.
    pub async fn handle_event(&self, event: ProviderEvent) {
        let mut inner = self.inner.write().await;
        let Some(session) = &inner.session else {
            return;
        };
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                match accounts.first() {
                    Some(first) if first == session.address() => {}
                    Some(first) => {
                        tracing::info!(
                            old = %session.address().short(),
                            new = %first.short(),
                            "account switched, session destroyed"
                        );
                        inner.state = ConnectionState::Disconnected;
                        inner.session = None;
                    }
                    None => {
                        tracing::info!("provider reports no accounts, session destroyed");
                        inner.state = ConnectionState::Disconnected;
                        inner.session = None;
                    }
                }
            }
            ProviderEvent::ChainChanged(chain_id) => {
                tracing::info!(chain_id, "chain changed, session destroyed");
                inner.state = ConnectionState::Disconnected;
                inner.session = None;
            }
        }
    }

    /// Spawn a background task draining provider events into
    /// [`Self::handle_event`].
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let connector = Arc::clone(self);
        let mut events = connector.provider.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => connector.handle_event(event).await,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "provider event listener lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
