//! Signed OAuth `state` parameter
//!
//! The state travels through the user's browser and the provider, so it is
//! signed to detect tampering and forged callbacks:
//!
//! `state = BASE64URL(json) "." BASE64URL(HMAC-SHA256(key, BASE64URL(json)))`
//!
//! The key is generated once per process (or loaded from configuration) and
//! shared by every provider.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::Secret;
use hmac::{Hmac, Mac};
use provider::{ProviderError, Result, State};
use rand::RngExt;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of generated signing keys in bytes.
pub const SECURITY_KEY_LEN: usize = 64;

/// Generate a random state-signing key.
pub fn generate_security_key() -> Secret<Vec<u8>> {
    let mut bytes = [0u8; SECURITY_KEY_LEN];
    rand::rng().fill(&mut bytes);
    Secret::new(bytes.to_vec())
}

/// Encode and sign a state for the authorization URL.
pub fn sign_state(key: &[u8], state: &State) -> Result<String> {
    let json = serde_json::to_vec(state)
        .map_err(|e| ProviderError::InvalidState(format!("state not serializable: {e}")))?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    let signature = URL_SAFE_NO_PAD.encode(mac(key, &payload)?.finalize().into_bytes());
    Ok(format!("{payload}.{signature}"))
}

/// Check the signature of a state returned on the callback and decode it.
pub fn verify_state(key: &[u8], encoded: &str) -> Result<State> {
    let (payload, signature) = encoded
        .split_once('.')
        .ok_or_else(|| ProviderError::InvalidState("malformed state".into()))?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| ProviderError::InvalidState("malformed signature".into()))?;
    mac(key, payload)?
        .verify_slice(&signature)
        .map_err(|_| ProviderError::InvalidState("signature mismatch".into()))?;

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| ProviderError::InvalidState("malformed payload".into()))?;
    serde_json::from_slice(&json)
        .map_err(|e| ProviderError::InvalidState(format!("undecodable payload: {e}")))
}

fn mac(key: &[u8], payload: &str) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ProviderError::Config(format!("unusable security key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_have_expected_length_and_differ() {
        let a = generate_security_key();
        let b = generate_security_key();
        assert_eq!(a.expose().len(), SECURITY_KEY_LEN);
        assert_ne!(a.expose(), b.expose(), "two keys must not collide");
    }

    #[test]
    fn signed_state_verifies_under_same_key() {
        let key = generate_security_key();
        let state = State::pair("after", "success").with("nonce", "n-1");
        let encoded = sign_state(key.expose(), &state).unwrap();
        assert_eq!(verify_state(key.expose(), &encoded).unwrap(), state);
    }

    #[test]
    fn signed_state_is_url_safe() {
        let encoded = sign_state(b"key", &State::pair("after", "success")).unwrap();
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'),
            "state must not need escaping: {encoded}"
        );
    }

    #[test]
    fn other_key_is_rejected() {
        let encoded = sign_state(b"key-one", &State::pair("after", "success")).unwrap();
        let err = verify_state(b"key-two", &encoded).unwrap_err();
        assert!(err.to_string().contains("signature mismatch"), "got: {err}");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let encoded = sign_state(b"key", &State::pair("after", "success")).unwrap();
        let (_, signature) = encoded.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"after":"evil"}"#);
        let forged = format!("{forged_payload}.{signature}");
        assert!(verify_state(b"key", &forged).is_err());
    }

    #[test]
    fn unsigned_value_is_rejected() {
        let err = verify_state(b"key", "xyz").unwrap_err();
        assert!(err.to_string().contains("malformed state"), "got: {err}");
    }
}
