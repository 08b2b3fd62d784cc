//! Marketplace bearer tokens
//!
//! Token layout: `base64("{account_id}&{hex(public_key)}&{hex(signature)}")`
//! where the signature covers the account id bytes.

use crate::error::AuthError;
use crate::signer::MessageSigner;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;

/// Opaque bearer token for the upload API
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

/// Decoded parts of an [`AuthToken`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokenParts {
    /// Account the token was issued for
    pub account_id: String,
    /// Hex-encoded public key
    pub public_key_hex: String,
    /// Hex-encoded signature
    pub signature_hex: String,
}

impl AuthToken {
    /// Header value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an already encoded token
    #[inline]
    #[must_use]
    pub fn from_encoded(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Split the token back into its parts
    ///
    /// # Errors
    /// Returns [`AuthError::Malformed`] if the token is not base64 of three
    /// `&`-separated fields
    pub fn decode(&self) -> Result<AuthTokenParts, AuthError> {
        let raw = STANDARD
            .decode(&self.0)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        let text = String::from_utf8(raw).map_err(|e| AuthError::Malformed(e.to_string()))?;

        let mut fields = text.rsplitn(3, '&');
        let signature_hex = fields.next();
        let public_key_hex = fields.next();
        let account_id = fields.next();
        match (account_id, public_key_hex, signature_hex) {
            (Some(account_id), Some(public_key_hex), Some(signature_hex)) => Ok(AuthTokenParts {
                account_id: account_id.to_string(),
                public_key_hex: public_key_hex.to_string(),
                signature_hex: signature_hex.to_string(),
            }),
            _ => Err(AuthError::Malformed(format!(
                "expected 3 fields in '{text}'"
            ))),
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // tokens are credentials
        write!(f, "AuthToken(..{} chars)", self.0.len())
    }
}

/// Generate a bearer token for `account_id`
///
/// # Errors
/// Returns [`AuthError::Signing`] if the signer cannot sign for the account
pub async fn generate_auth_token(
    account_id: &str,
    signer: &dyn MessageSigner,
    network_id: &str,
) -> Result<AuthToken, AuthError> {
    // account ids are ASCII, so the bytes equal the character codes
    let message = account_id.as_bytes();
    let signed = signer
        .sign_message(message, account_id, network_id)
        .await
        .map_err(|source| AuthError::Signing {
            account_id: account_id.to_string(),
            source,
        })?;

    let payload = [
        account_id.to_string(),
        hex::encode(signed.public_key.as_bytes()),
        hex::encode(signed.signature),
    ]
    .join("&");

    tracing::debug!(account_id, public_key = %signed.public_key, "generated auth token");
    Ok(AuthToken(STANDARD.encode(payload)))
}
