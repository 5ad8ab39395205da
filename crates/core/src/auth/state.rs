//! Signed OAuth `state` tokens.
//!
//! The `state` parameter round-tripped through the provider redirect embeds
//! the local user id so the callback can be attributed without server-side
//! session storage. The payload is HMAC-SHA256 signed so a tampered or
//! forged state cannot link a marketplace account to the wrong user.
//!
//! Format: `base64url(user_id:nonce) "." base64url(signature)`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use stockline_domain::{Result, StocklineError};

type HmacSha256 = Hmac<Sha256>;

/// Decoded contents of a verified state token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user_id: String,
    pub nonce: String,
}

/// Build a signed state token for the given user.
pub fn encode(secret: &str, user_id: &str) -> Result<String> {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let payload = format!("{user_id}:{nonce}");
    let signature = sign(secret, payload.as_bytes())?;

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(payload.as_bytes()),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verify a state token and recover the embedded user id.
pub fn decode(secret: &str, state: &str) -> Result<AuthState> {
    let (payload_b64, signature_b64) = state
        .split_once('.')
        .ok_or_else(|| StocklineError::InvalidState("malformed state token".to_string()))?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| StocklineError::InvalidState("undecodable state payload".to_string()))?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| StocklineError::InvalidState("undecodable state signature".to_string()))?;

    let mut mac = new_mac(secret)?;
    mac.update(&payload);
    mac.verify_slice(&signature)
        .map_err(|_| StocklineError::InvalidState("state signature mismatch".to_string()))?;

    let payload = String::from_utf8(payload)
        .map_err(|_| StocklineError::InvalidState("state payload is not UTF-8".to_string()))?;

    // The nonce is hex, so the user id is everything before the last colon.
    let (user_id, nonce) = payload
        .rsplit_once(':')
        .ok_or_else(|| StocklineError::InvalidState("state payload missing nonce".to_string()))?;

    if user_id.is_empty() {
        return Err(StocklineError::InvalidState("state payload missing user id".to_string()));
    }

    Ok(AuthState { user_id: user_id.to_string(), nonce: nonce.to_string() })
}

fn sign(secret: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let mut mac = new_mac(secret)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn new_mac(secret: &str) -> Result<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| StocklineError::Internal(format!("failed to initialize state signer: {e}")))
}
