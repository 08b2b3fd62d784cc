//! Series minting with retry on transient contract failures

use crate::error::{ContractError, MintError};
use crate::services::SeriesContract;
use minter_model::{retry, RetryError, RetryPolicy, SeriesParams};
use std::sync::Arc;

/// Registers series on the token contract
#[derive(Clone)]
pub struct SeriesMinter {
    contract: Arc<dyn SeriesContract>,
    policy: RetryPolicy,
    gas: u64,
    deposit: u128,
}

impl SeriesMinter {
    /// Create minter with fixed gas and deposit
    #[must_use]
    pub fn new(contract: Arc<dyn SeriesContract>, policy: RetryPolicy, gas: u64, deposit: u128) -> Self {
        Self {
            contract,
            policy,
            gas,
            deposit,
        }
    }

    /// Register one series; returns the transaction hash
    ///
    /// # Errors
    /// Returns [`MintError::MintFailed`] on the first fatal failure or after
    /// the policy's attempts are used up
    pub async fn create_series(&self, params: &SeriesParams) -> Result<String, MintError> {
        let result = retry(&self.policy, "nft_create_series", |attempt| {
            let contract = Arc::clone(&self.contract);
            async move {
                tracing::debug!(attempt, title = %params.token_metadata.title, "calling nft_create_series");
                contract.create_series(params, self.gas, self.deposit).await
            }
        })
        .await;

        result.map_err(|err: RetryError<ContractError>| MintError::MintFailed {
            attempts: err.attempts(),
            source: err.into_inner(),
        })
    }
}

impl std::fmt::Debug for SeriesMinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesMinter")
            .field("policy", &self.policy)
            .field("gas", &self.gas)
            .field("deposit", &self.deposit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractErrorKind;
    use crate::services::MockSeriesContract;
    use minter_model::{Royalty, TokenMetadata};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn params() -> SeriesParams {
        SeriesParams {
            creator_id: "projectp.testnet".to_string(),
            token_metadata: TokenMetadata {
                title: "Avatar Example 1".to_string(),
                media: "bafymedia".to_string(),
                copies: 1,
                reference: "bafyref".to_string(),
            },
            royalty: Royalty::single("projectp.testnet", 1000),
        }
    }

    fn minter(mock: MockSeriesContract) -> SeriesMinter {
        SeriesMinter::new(Arc::new(mock), RetryPolicy::contract_call(), 100, 200)
    }

    #[tokio::test(start_paused = true)]
    async fn retries_please_try_again() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut mock = MockSeriesContract::new();
        mock.expect_create_series()
            .times(3)
            .returning(move |_, gas, deposit| {
                assert_eq!((gas, deposit), (100, 200));
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ContractError::new("Please try again"))
                } else {
                    Ok("txhash".to_string())
                }
            });

        let tx = minter(mock).create_series(&params()).await.unwrap();
        assert_eq!(tx, "txhash");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_error_stops_immediately() {
        let mut mock = MockSeriesContract::new();
        mock.expect_create_series()
            .times(1)
            .returning(|_, _, _| Err(ContractError::new("Smart contract panicked: not enough deposit")));

        let err = minter(mock).create_series(&params()).await.unwrap_err();
        match err {
            MintError::MintFailed { attempts, source } => {
                assert_eq!(attempts, 1);
                assert_eq!(source.kind, ContractErrorKind::Fatal);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_stop_at_one_hundred_attempts() {
        let mut mock = MockSeriesContract::new();
        mock.expect_create_series()
            .times(100)
            .returning(|_, _, _| Err(ContractError::new("GatewayTimeoutError: http 504")));

        let err = minter(mock).create_series(&params()).await.unwrap_err();
        assert!(matches!(err, MintError::MintFailed { attempts: 100, .. }));
    }
}
