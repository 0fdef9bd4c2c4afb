//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The override unit (or a wildcard prefix) could not be loaded.
    #[error("config error: could not load settings unit '{unit}'")]
    ConfigLoad {
        unit: String,
        #[source]
        source: UnitError,
    },

    #[error("improperly configured: {0}")]
    ImproperlyConfigured(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a [`crate::conf::UnitLoader`].
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("unit not found: {0}")]
    NotFound(String),

    #[error("malformed unit {unit}: {reason}")]
    Malformed { unit: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session envelope failures. Callers normally go through
/// [`crate::sessions::SessionCodec::decode`], which turns every decode-side
/// variant into an empty session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session payload cannot be encoded: {0}")]
    PayloadEncoding(String),

    #[error("session envelope cannot be decoded: {0}")]
    Decode(String),

    #[error("session tamper check failed")]
    TamperDetected,
}

/// Distributed-cache backend failures. Always non-fatal to the caller.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}
