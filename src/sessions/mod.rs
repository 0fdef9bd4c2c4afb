//! Session payload encoding.
//!
//! - **codec** — `SessionCodec`: JSON payload, keyed SHA-256 tamper check,
//!   base64 envelope. Every decode failure degrades to an empty session.
//! - **record** — `SessionRecord`: the envelope paired with its expiry.
//!
//! Storage and cookie handling belong to the web layer.

mod codec;
mod record;

pub use codec::{DIGEST_LEN, SessionCodec, SessionData};
pub use record::{SessionRecord, session_key};
