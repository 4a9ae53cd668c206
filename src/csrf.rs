//! # Delete Token Verification
//!
//! This module issues and verifies the tokens gating the destructive delete
//! operation, using HMAC-SHA256 over a purpose-and-id payload with
//! constant-time comparison to prevent timing attacks.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Purpose label baked into the token payload. A token minted for delete
/// cannot be replayed against any other operation.
const DELETE_TOKEN_PURPOSE: &str = "delete";

/// Errors that can occur during delete token verification
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Missing delete token")]
    MissingToken,

    #[error("Delete token contains invalid hex")]
    InvalidTokenFormat,

    #[error("Delete token verification failed")]
    VerificationFailed,

    #[error("Token secret rejected by HMAC")]
    InvalidSecret,
}

/// Result type for delete token operations
pub type TokenResult<T> = Result<T, TokenError>;

fn delete_payload(provider_id: i32) -> String {
    format!("{}:{}", DELETE_TOKEN_PURPOSE, provider_id)
}

/// Issues the delete token for a provider id as lowercase hex
pub fn issue_delete_token(provider_id: i32, secret: &str) -> TokenResult<String> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidSecret)?;
    mac.update(delete_payload(provider_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a submitted delete token against the expected HMAC for this id
pub fn verify_delete_token(provider_id: i32, provided: &str, secret: &str) -> TokenResult<()> {
    if provided.is_empty() {
        return Err(TokenError::MissingToken);
    }

    // Decode the provided token
    let provided_bytes = hex::decode(provided).map_err(|_| TokenError::InvalidTokenFormat)?;

    // Compute HMAC-SHA256 of the purpose-and-id payload
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidSecret)?;
    mac.update(delete_payload(provider_id).as_bytes());
    let expected_bytes = mac.finalize().into_bytes();

    // Compare tokens using constant-time comparison to prevent timing attacks
    let expected_bytes_array: &[u8] = expected_bytes.as_ref();
    if subtle::ConstantTimeEq::ct_eq(expected_bytes_array, &provided_bytes[..]).into() {
        Ok(())
    } else {
        Err(TokenError::VerificationFailed)
    }
}
