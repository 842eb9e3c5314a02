//! Ledger contract gateway.
//!
//! [`LedgerGateway`] is the trait seam over the remote bank contract:
//! three independent reads, three non-blocking writes that return a
//! transaction hash immediately, and `await_confirmation` which suspends
//! until the network reports a terminal status. [`LedgerClient`] is the
//! JSON-RPC implementation bound to `(endpoint, contract, session)`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use coffer_types::{Address, Amount, BankName, TxHash};

use crate::connector::WalletSession;
use crate::error::{LedgerError, ReadField};

/// Typed handle to the remote bank contract.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Read the bank name slot. Fails independently of the other reads.
    async fn read_name(&self) -> Result<BankName, LedgerError>;

    /// Read the bank owner address. Fails independently of the other reads.
    async fn read_owner(&self) -> Result<Address, LedgerError>;

    /// Read the given account's balance. Fails independently of the other reads.
    async fn read_balance(&self, account: &Address) -> Result<Amount, LedgerError>;

    /// Submit a deposit of `value` from `from`. Returns the hash
    /// immediately; the effect is final only after confirmation.
    async fn submit_deposit(&self, from: &Address, value: Amount)
        -> Result<TxHash, LedgerError>;

    /// Submit a withdrawal of `amount` from `from`'s account to `to`.
    async fn submit_withdraw(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<TxHash, LedgerError>;

    /// Submit a bank rename. The contract enforces the owner restriction.
    async fn submit_set_name(
        &self,
        from: &Address,
        name: &BankName,
    ) -> Result<TxHash, LedgerError>;

    /// Suspend until the network reports inclusion of `hash`.
    ///
    /// Resolves `Ok(())` on confirmation or fails with
    /// [`LedgerError::Submission`] carrying the revert reason when the
    /// network reports one.
    async fn await_confirmation(&self, hash: &TxHash) -> Result<(), LedgerError>;
}

// ── LedgerClient ────────────────────────────────────────────────────────

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// HTTP client for the bank contract via the ledger node's JSON-RPC.
///
/// Wire actions mirror the contract's fixed interface: `bank_name`,
/// `bank_owner`, `customer_balance`, `deposit_money`, `withdraw_money`,
/// `set_bank_name`, plus `transaction_status` for confirmation polling.
#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    endpoint: String,
    contract: Address,
    session: WalletSession,
    poll_interval: Duration,
}

impl LedgerClient {
    /// Construct a bound contract handle and probe the endpoint.
    ///
    /// Fails with [`LedgerError::Unreachable`] when the endpoint does
    /// not answer the `ping` probe.
    pub async fn connect(
        endpoint: impl Into<String>,
        contract: Address,
        session: WalletSession,
    ) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LedgerError::Rpc(format!("failed to create HTTP client: {e}")))?;
        let client = Self {
            http,
            endpoint: endpoint.into(),
            contract,
            session,
            poll_interval: DEFAULT_POLL_INTERVAL,
        };
        client
            .rpc_call("ping", serde_json::json!({}))
            .await
            .map_err(|e| LedgerError::Unreachable(e.to_string()))?;
        Ok(client)
    }

    /// Override the confirmation poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The configured ledger endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerError> {
        let mut body = params;
        let object = body
            .as_object_mut()
            .ok_or_else(|| LedgerError::Rpc("params must be a JSON object".into()))?;
        object.insert("action".to_string(), serde_json::json!(action));
        object.insert(
            "contract".to_string(),
            serde_json::json!(self.contract.as_str()),
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerError::Rpc(format!(
                "ledger returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Rpc(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Err(LedgerError::Rpc(format!("ledger error: {err}")));
        }

        Ok(json.get("result").cloned().unwrap_or(json))
    }

    async fn submit(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<TxHash, LedgerError> {
        let result = self.rpc_call(action, params).await.map_err(|e| {
            LedgerError::Submission {
                reason: e.to_string(),
            }
        })?;
        let resp: SubmitResult = serde_json::from_value(result)
            .map_err(|e| LedgerError::InvalidResponse(format!("bad {action} response: {e}")))?;
        if !resp.accepted {
            return Err(LedgerError::Submission {
                reason: resp
                    .detail
                    .unwrap_or_else(|| "rejected by ledger".to_string()),
            });
        }
        let hash = TxHash::from_hex(&resp.hash)
            .map_err(|e| LedgerError::InvalidResponse(format!("bad {action} hash: {e}")))?;
        tracing::debug!(%hash, action, "transaction submitted");
        Ok(hash)
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatusResult, LedgerError> {
        let result = self
            .rpc_call(
                "transaction_status",
                serde_json::json!({ "hash": hash.to_string() }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| LedgerError::InvalidResponse(format!("bad status response: {e}")))
    }
}

#[async_trait]
impl LedgerGateway for LedgerClient {
    async fn read_name(&self) -> Result<BankName, LedgerError> {
        let result = self
            .rpc_call("bank_name", serde_json::json!({}))
            .await
            .map_err(|e| LedgerError::Read {
                field: ReadField::BankName,
                reason: e.to_string(),
            })?;
        let resp: BankNameResult =
            serde_json::from_value(result).map_err(|e| LedgerError::Read {
                field: ReadField::BankName,
                reason: format!("invalid response: {e}"),
            })?;
        BankName::from_hex(&resp.name).map_err(|e| LedgerError::Read {
            field: ReadField::BankName,
            reason: e.to_string(),
        })
    }

    async fn read_owner(&self) -> Result<Address, LedgerError> {
        let result = self
            .rpc_call("bank_owner", serde_json::json!({}))
            .await
            .map_err(|e| LedgerError::Read {
                field: ReadField::BankOwner,
                reason: e.to_string(),
            })?;
        let resp: BankOwnerResult =
            serde_json::from_value(result).map_err(|e| LedgerError::Read {
                field: ReadField::BankOwner,
                reason: format!("invalid response: {e}"),
            })?;
        Address::parse(&resp.owner).map_err(|e| LedgerError::Read {
            field: ReadField::BankOwner,
            reason: e.to_string(),
        })
    }

    async fn read_balance(&self, account: &Address) -> Result<Amount, LedgerError> {
        let result = self
            .rpc_call(
                "customer_balance",
                serde_json::json!({ "account": account.as_str() }),
            )
            .await
            .map_err(|e| LedgerError::Read {
                field: ReadField::Balance,
                reason: e.to_string(),
            })?;
        let resp: BalanceResult =
            serde_json::from_value(result).map_err(|e| LedgerError::Read {
                field: ReadField::Balance,
                reason: format!("invalid response: {e}"),
            })?;
        resp.balance
            .parse::<u128>()
            .map(Amount::new)
            .map_err(|e| LedgerError::Read {
                field: ReadField::Balance,
                reason: format!("invalid balance value: {e}"),
            })
    }

    async fn submit_deposit(
        &self,
        from: &Address,
        value: Amount,
    ) -> Result<TxHash, LedgerError> {
        self.submit(
            "deposit_money",
            serde_json::json!({
                "from": from.as_str(),
                "value": value.raw().to_string(),
            }),
        )
        .await
    }

    async fn submit_withdraw(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<TxHash, LedgerError> {
        self.submit(
            "withdraw_money",
            serde_json::json!({
                "from": from.as_str(),
                "to": to.as_str(),
                "amount": amount.raw().to_string(),
            }),
        )
        .await
    }

    async fn submit_set_name(
        &self,
        from: &Address,
        name: &BankName,
    ) -> Result<TxHash, LedgerError> {
        self.submit(
            "set_bank_name",
            serde_json::json!({
                "from": from.as_str(),
                "name": name.to_hex(),
            }),
        )
        .await
    }

    async fn await_confirmation(&self, hash: &TxHash) -> Result<(), LedgerError> {
        loop {
            let status = self.transaction_status(hash).await?;
            match status.status.as_str() {
                "confirmed" => {
                    tracing::debug!(%hash, "transaction confirmed");
                    return Ok(());
                }
                "reverted" => {
                    return Err(LedgerError::Submission {
                        reason: status
                            .reason
                            .unwrap_or_else(|| "reverted without a reason".to_string()),
                    });
                }
                "pending" | "submitted" => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    return Err(LedgerError::InvalidResponse(format!(
                        "unknown transaction status: {other}"
                    )));
                }
            }
        }
    }
}

/// Bank name response: hex of the 32-byte slot.
#[derive(Debug, Clone, Deserialize)]
struct BankNameResult {
    name: String,
}

/// Bank owner response.
#[derive(Debug, Clone, Deserialize)]
struct BankOwnerResult {
    owner: String,
}

/// Balance response: raw units as a decimal string.
#[derive(Debug, Clone, Deserialize)]
struct BalanceResult {
    balance: String,
}

/// Response from a write submission.
#[derive(Debug, Clone, Deserialize)]
struct SubmitResult {
    hash: String,
    accepted: bool,
    #[serde(default)]
    detail: Option<String>,
}

/// Response from the `transaction_status` action.
#[derive(Debug, Clone, Deserialize)]
struct TxStatusResult {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_response_parses() {
        let json = serde_json::json!({
            "hash": TxHash::new([9u8; 32]).to_string(),
            "accepted": true,
        });
        let resp: SubmitResult = serde_json::from_value(json).unwrap();
        assert!(resp.accepted);
        assert!(resp.detail.is_none());
    }

    #[test]
    fn submit_response_carries_revert_detail() {
        let json = serde_json::json!({
            "hash": TxHash::ZERO.to_string(),
            "accepted": false,
            "detail": "insufficient balance in bank account",
        });
        let resp: SubmitResult = serde_json::from_value(json).unwrap();
        assert!(!resp.accepted);
        assert_eq!(
            resp.detail.as_deref(),
            Some("insufficient balance in bank account")
        );
    }

    #[test]
    fn status_response_parses_without_reason() {
        let json = serde_json::json!({ "status": "pending" });
        let resp: TxStatusResult = serde_json::from_value(json).unwrap();
        assert_eq!(resp.status, "pending");
        assert!(resp.reason.is_none());
    }

    #[test]
    fn balance_response_parses_raw_units() {
        let json = serde_json::json!({ "balance": "500000000000000000000" });
        let resp: BalanceResult = serde_json::from_value(json).unwrap();
        assert_eq!(resp.balance.parse::<u128>().unwrap(), 500 * 10u128.pow(18));
    }
}
