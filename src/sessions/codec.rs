//! Signed session envelopes.
//!
//! Wire form: `base64(json || tamper_check)` where `tamper_check` is the first
//! [`DIGEST_LEN`] bytes of `SHA256(json || secret_key)`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::conf::Settings;
use crate::error::{AppError, SessionError};

/// Length of the tamper check appended to the serialized payload.
pub const DIGEST_LEN: usize = 20;

/// Decoded session contents.
pub type SessionData = Map<String, Value>;

/// Encodes and verifies session envelopes with one secret key.
#[derive(Clone)]
pub struct SessionCodec {
    secret_key: Vec<u8>,
}

impl SessionCodec {
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
        }
    }

    /// Codec keyed with the `SECRET_KEY` setting.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self::new(settings.secret_key()?))
    }

    /// First 8 hex chars of `SHA256(secret_key)`, safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.secret_key);
        hex::encode(digest)[..8].to_string()
    }

    fn tamper_check(&self, serialized: &[u8]) -> [u8; DIGEST_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(serialized);
        hasher.update(&self.secret_key);
        let digest = hasher.finalize();
        let mut check = [0u8; DIGEST_LEN];
        check.copy_from_slice(&digest[..DIGEST_LEN]);
        check
    }

    /// Serialize and sign `payload`. It must serialize to a JSON object.
    pub fn encode<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, SessionError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| SessionError::PayloadEncoding(e.to_string()))?;
        if !value.is_object() {
            return Err(SessionError::PayloadEncoding(
                "session payload must be a mapping".into(),
            ));
        }
        let mut bytes = serde_json::to_vec(&value)
            .map_err(|e| SessionError::PayloadEncoding(e.to_string()))?;
        let check = self.tamper_check(&bytes);
        bytes.extend_from_slice(&check);
        Ok(STANDARD.encode(bytes))
    }

    /// Verify and decode an envelope, reporting why it was rejected.
    ///
    /// A payload that passes the tamper check but does not deserialize to a
    /// mapping yields an empty session rather than an error.
    pub fn decode_checked(&self, envelope: &str) -> Result<SessionData, SessionError> {
        let raw = STANDARD
            .decode(envelope.trim())
            .map_err(|e| SessionError::Decode(format!("invalid base64: {e}")))?;
        if raw.len() < DIGEST_LEN {
            return Err(SessionError::Decode(format!(
                "envelope is {} bytes, shorter than the {DIGEST_LEN}-byte tamper check",
                raw.len()
            )));
        }

        let (serialized, tamper) = raw.split_at(raw.len() - DIGEST_LEN);
        let expected = self.tamper_check(serialized);
        if !bool::from(expected[..].ct_eq(tamper)) {
            return Err(SessionError::TamperDetected);
        }

        match serde_json::from_slice::<SessionData>(serialized) {
            Ok(data) => Ok(data),
            Err(e) => {
                debug!(error = %e, "signed session payload did not deserialize; using empty session");
                Ok(SessionData::new())
            }
        }
    }

    /// Decode an envelope; any failure yields an empty session.
    pub fn decode(&self, envelope: &str) -> SessionData {
        match self.decode_checked(envelope) {
            Ok(data) => data,
            Err(SessionError::TamperDetected) => {
                warn!("session tamper check failed; discarding session");
                SessionData::new()
            }
            Err(e) => {
                debug!(error = %e, "discarding undecodable session");
                SessionData::new()
            }
        }
    }
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
