//! Persisted session record: a signed envelope plus its expiry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

use super::codec::{SessionCodec, SessionData};

/// What a session store keeps per browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Signed envelope produced by [`SessionCodec::encode`].
    pub data: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Encode `payload` into a record that expires `age` after `now`.
    pub fn new<T: Serialize + ?Sized>(
        codec: &SessionCodec,
        payload: &T,
        now: DateTime<Utc>,
        age: Duration,
    ) -> Result<Self, SessionError> {
        let age = chrono::Duration::from_std(age)
            .map_err(|e| SessionError::PayloadEncoding(format!("session age out of range: {e}")))?;
        let expires_at = now.checked_add_signed(age).ok_or_else(|| {
            SessionError::PayloadEncoding(format!(
                "session age of {}s overflows the expiry date",
                age.num_seconds()
            ))
        })?;
        Ok(Self {
            data: codec.encode(payload)?,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The session contents, or an empty session when the record has expired
    /// or its envelope does not verify.
    pub fn decoded(&self, codec: &SessionCodec, now: DateTime<Utc>) -> SessionData {
        if self.is_expired(now) {
            return SessionData::new();
        }
        codec.decode(&self.data)
    }
}

/// Cache key for a session id, e.g. `gaesess:abc123`.
pub fn session_key(prefix: &str, session_id: &str) -> String {
    format!("{prefix}{session_id}")
}
