//! Error types for NEAR access
//!
//! Covers:
//! - Key store lookups
//! - Message signing
//! - Contract calls through the NEAR client

use std::path::PathBuf;

/// Key store errors
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    /// No key stored for the account on this network
    #[error("no key for {account_id} on {network_id}")]
    KeyNotFound {
        network_id: String,
        account_id: String,
    },

    /// IO error while reading a credentials file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credentials file is not valid JSON
    #[error("invalid credentials file {path}: {message}")]
    InvalidFile { path: PathBuf, message: String },

    /// Key string is not `ed25519:<base58>` of the right length
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Message signing errors
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// Signing key unavailable
    #[error("key store error: {0}")]
    KeyStore(#[from] KeyStoreError),
}

/// Auth token errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Signer failed to sign the account id
    #[error("failed to sign auth message for {account_id}: {source}")]
    Signing {
        account_id: String,
        #[source]
        source: SignerError,
    },

    /// Token is not base64 of `account&pubkey&signature`
    #[error("malformed auth token: {0}")]
    Malformed(String),
}

/// Contract call errors
///
/// Node failures are sorted into variants once, in
/// [`RpcError::from_node_message`]; callers decide on retries with
/// [`RpcError::is_transient`].
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Gateway or node timed out, or the node could not be reached
    #[error("GatewayTimeoutError: {0}")]
    GatewayTimeout(String),

    /// Transaction block hash is too old
    #[error("Transaction has expired")]
    Expired,

    /// Nonce already used, usually by a transaction still in flight
    #[error("InvalidNonce: {0}")]
    InvalidNonce(String),

    /// Any other node or client error
    #[error("rpc error: {0}")]
    Server(String),

    /// Transaction was included but its execution failed
    #[error("transaction {tx_hash} failed: {failure}")]
    ExecutionFailure { tx_hash: String, failure: String },

    /// Credentials file missing or unreadable
    #[error("credentials {path}: {message}")]
    Credentials { path: PathBuf, message: String },

    /// Account id rejected by the client
    #[error("invalid account id '{account_id}': {message}")]
    InvalidAccountId { account_id: String, message: String },
}

/// Fragments of node errors that mean the gateway or node timed out
const TIMEOUT_MARKERS: [&str; 8] = [
    "TIMEOUT_ERROR",
    "TimeoutError",
    "timed out",
    "502 Bad Gateway",
    "503 Service Unavailable",
    "504 Gateway Timeout",
    "error sending request",
    "Connection refused",
];

impl RpcError {
    /// Sort a rendered client error into a variant
    #[must_use]
    pub fn from_node_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("InvalidNonce") {
            Self::InvalidNonce(message)
        } else if message.contains("Expired") && message.contains("InvalidTxError") {
            Self::Expired
        } else if TIMEOUT_MARKERS.iter().any(|m| message.contains(m)) {
            Self::GatewayTimeout(message)
        } else {
            Self::Server(message)
        }
    }

    /// Whether resubmitting a fresh transaction may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::GatewayTimeout(_) | Self::Expired | Self::InvalidNonce(_)
        )
    }
}

impl From<near_workspaces::error::Error> for RpcError {
    fn from(err: near_workspaces::error::Error) -> Self {
        Self::from_node_message(format!("{err}: {err:?}"))
    }
}
