//! Error types for the minting pipeline
//!
//! Contract failures are classified once, when they cross the contract
//! boundary, into [`ContractErrorKind`]; everything downstream matches on the
//! kind instead of on message text.

use minter_media::MediaError;
use minter_model::{ModelError, Retryable};
use minter_near::{AuthError, RpcError};
use minter_paras::ParasError;

/// Message fragments that mark a contract call as worth retrying
///
/// The NEAR client renders node and gateway timeouts as `GatewayTimeoutError`
/// and stale block hashes as `Transaction has expired`. Stale nonces are
/// recognised by variant, see [`ContractError::from`].
pub const TRANSIENT_PATTERNS: [&str; 3] = [
    "Transaction has expired",
    "GatewayTimeoutError",
    "Please try again",
];

/// Retry classification of a contract failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractErrorKind {
    /// Network or validity-window failure; resubmitting may succeed
    Transient,
    /// Anything else; the run must stop
    Fatal,
}

impl ContractErrorKind {
    /// Classify an error message
    #[must_use]
    pub fn classify(message: &str) -> Self {
        if TRANSIENT_PATTERNS.iter().any(|p| message.contains(p)) {
            Self::Transient
        } else {
            Self::Fatal
        }
    }
}

/// Failed contract call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ContractError {
    /// Retry classification
    pub kind: ContractErrorKind,
    /// Rendered error
    pub message: String,
}

impl ContractError {
    /// Build from a message, classifying it
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ContractErrorKind::classify(&message),
            message,
        }
    }
}

impl From<RpcError> for ContractError {
    fn from(err: RpcError) -> Self {
        let message = err.to_string();
        if err.is_transient() {
            Self {
                kind: ContractErrorKind::Transient,
                message,
            }
        } else {
            Self::new(message)
        }
    }
}

impl Retryable for ContractError {
    fn is_transient(&self) -> bool {
        self.kind == ContractErrorKind::Transient
    }
}

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// Target collection is missing or belongs to someone else
    #[error("collection '{collection_id}' by {creator_id} does not exist")]
    CollectionNotFound {
        creator_id: String,
        collection_id: String,
    },

    /// Configuration or asset loading failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Image hashing failed
    #[error("image hashing failed: {0}")]
    Media(#[from] MediaError),

    /// Auth token could not be generated
    #[error("auth token: {0}")]
    Auth(#[from] AuthError),

    /// Marketplace request failed
    #[error("marketplace: {0}")]
    Marketplace(#[from] ParasError),

    /// Contract client could not be set up
    #[error("rpc: {0}")]
    Rpc(#[from] RpcError),

    /// `nft_create_series` failed fatally or ran out of attempts
    #[error("nft_create_series failed after {attempts} attempt(s): {source}")]
    MintFailed {
        attempts: u32,
        #[source]
        source: ContractError,
    },

    /// Failure while processing one item
    #[error("item {index}: {source}")]
    Item {
        index: u32,
        #[source]
        source: Box<MintError>,
    },
}

impl MintError {
    /// Attach the item index
    #[must_use]
    pub fn for_item(self, index: u32) -> Self {
        match self {
            Self::Item { .. } => self,
            other => Self::Item {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Innermost error, without item context
    #[must_use]
    pub fn root(&self) -> &MintError {
        match self {
            Self::Item { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the target collection check failed
    #[inline]
    #[must_use]
    pub fn is_collection_missing(&self) -> bool {
        matches!(self.root(), Self::CollectionNotFound { .. })
    }

    /// Process exit code for this failure
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_documented_patterns() {
        assert_eq!(
            ContractErrorKind::classify("Transaction has expired"),
            ContractErrorKind::Transient
        );
        assert_eq!(
            ContractErrorKind::classify("GatewayTimeoutError: http 504"),
            ContractErrorKind::Transient
        );
        assert_eq!(
            ContractErrorKind::classify("Server error. Please try again later"),
            ContractErrorKind::Transient
        );
    }

    #[test]
    fn everything_else_is_fatal() {
        assert_eq!(
            ContractErrorKind::classify("Smart contract panicked: Paras: Only creator"),
            ContractErrorKind::Fatal
        );
        assert_eq!(ContractErrorKind::classify(""), ContractErrorKind::Fatal);
        // matching is case sensitive
        assert_eq!(
            ContractErrorKind::classify("please try again"),
            ContractErrorKind::Fatal
        );
    }

    #[test]
    fn rpc_errors_classify_through_display() {
        assert!(ContractError::from(RpcError::Expired).is_transient());
        assert!(ContractError::from(RpcError::GatewayTimeout("x".into())).is_transient());
        assert!(!ContractError::from(RpcError::Server("x".into())).is_transient());
    }

    #[test]
    fn stale_nonce_after_timeout_is_retried() {
        let err = ContractError::from(RpcError::from_node_message(
            r#"{"TxExecutionError":{"InvalidTxError":{"InvalidNonce":{"tx_nonce":7,"ak_nonce":7}}}}"#,
        ));
        assert_eq!(err.kind, ContractErrorKind::Transient);
        assert!(err.message.starts_with("InvalidNonce"));
    }

    #[test]
    fn item_context_is_not_nested_twice() {
        let err = MintError::CollectionNotFound {
            creator_id: "a".into(),
            collection_id: "b".into(),
        }
        .for_item(3)
        .for_item(4);

        assert!(err.to_string().starts_with("item 3:"));
        assert!(err.is_collection_missing());
        assert_eq!(err.exit_code(), 1);
    }
}
