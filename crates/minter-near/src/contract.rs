//! Change-method calls through `near-workspaces`
//!
//! The client connects on the first call and keeps the account for the rest
//! of the run. Access keys come from the same credentials file the
//! [`FileKeyStore`](crate::FileKeyStore) reads for auth tokens.

use crate::error::RpcError;
use near_workspaces::types::{Gas, NearToken};
use near_workspaces::{Account, AccountId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// Result of a committed function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    /// Base58 transaction hash
    pub tx_hash: String,
}

/// Signing account bound to a NEAR node
pub struct ContractClient {
    network_id: String,
    node_url: String,
    account_id: String,
    credentials_file: PathBuf,
    account: OnceCell<Account>,
}

impl ContractClient {
    /// Client for `account_id`, signing with the key in `credentials_file`
    #[must_use]
    pub fn new(
        network_id: impl Into<String>,
        node_url: impl Into<String>,
        account_id: impl Into<String>,
        credentials_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            node_url: node_url.into(),
            account_id: account_id.into(),
            credentials_file: credentials_file.into(),
            account: OnceCell::new(),
        }
    }

    /// Signing account id
    #[inline]
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Credentials file used for transactions
    #[inline]
    #[must_use]
    pub fn credentials_file(&self) -> &Path {
        &self.credentials_file
    }

    /// Connected account, connecting first if needed
    async fn account(&self) -> Result<&Account, RpcError> {
        self.account.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Account, RpcError> {
        // fail on missing credentials before touching the network
        tokio::fs::metadata(&self.credentials_file)
            .await
            .map_err(|e| RpcError::Credentials {
                path: self.credentials_file.clone(),
                message: e.to_string(),
            })?;

        let account = if self.network_id == "mainnet" {
            let worker = near_workspaces::mainnet().rpc_addr(&self.node_url).await?;
            Account::from_file(&self.credentials_file, &worker)?
        } else {
            let worker = near_workspaces::testnet().rpc_addr(&self.node_url).await?;
            Account::from_file(&self.credentials_file, &worker)?
        };

        if account.id().as_str() != self.account_id {
            tracing::warn!(
                path = %self.credentials_file.display(),
                stored = %account.id(),
                account_id = %self.account_id,
                "credentials file names another account"
            );
        }
        tracing::info!(network = %self.network_id, node_url = %self.node_url, "connected to NEAR node");
        Ok(account)
    }

    /// Call a change method with JSON arguments and wait for the final outcome
    ///
    /// # Errors
    /// Returns [`RpcError::ExecutionFailure`] when the transaction executed
    /// and failed; node and client failures are sorted by
    /// [`RpcError::from_node_message`]
    pub async fn call_change_method<A: Serialize + Sync>(
        &self,
        contract_id: &str,
        method_name: &str,
        args: &A,
        gas: u64,
        deposit: u128,
    ) -> Result<CallOutcome, RpcError> {
        let contract = contract_id
            .parse::<AccountId>()
            .map_err(|e| RpcError::InvalidAccountId {
                account_id: contract_id.to_string(),
                message: e.to_string(),
            })?;
        let account = self.account().await?;

        let result = account
            .call(&contract, method_name)
            .args_json(args)
            .gas(Gas::from_gas(gas))
            .deposit(NearToken::from_yoctonear(deposit))
            .transact()
            .await?;

        let tx_hash = result.outcome().transaction_hash.to_string();
        tracing::debug!(%tx_hash, contract_id, method_name, "transaction committed");
        match result.into_result() {
            Ok(_) => Ok(CallOutcome { tx_hash }),
            Err(failure) => Err(RpcError::ExecutionFailure {
                tx_hash,
                failure: format!("{failure:?}"),
            }),
        }
    }
}

impl std::fmt::Debug for ContractClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractClient")
            .field("network_id", &self.network_id)
            .field("node_url", &self.node_url)
            .field("account_id", &self.account_id)
            .field("connected", &self.account.initialized())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credentials_fail_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let client = ContractClient::new(
            "testnet",
            "http://127.0.0.1:9",
            "projectp.testnet",
            dir.path().join("testnet/projectp.testnet.json"),
        );

        let err = client
            .call_change_method("paras-token-v1.testnet", "nft_create_series", &(), 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::Credentials { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn invalid_contract_id_is_rejected() {
        let client = ContractClient::new("testnet", "http://127.0.0.1:9", "a.testnet", "/nope");
        let err = client
            .call_change_method("Not A Valid Id", "nft_create_series", &(), 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidAccountId { .. }));
    }
}
