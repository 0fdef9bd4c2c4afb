//! Kay core — layered settings resolution and signed session envelopes.
//!
//! - **conf** — built-in defaults overlaid by a project's settings unit,
//!   resolved lazily and exactly once.
//! - **sessions** — session payload encode/verify/decode.
//! - **cache** / **timezone** — best-effort shared cache and zone lookup.
//! - **processors** — explicit registry of template context processors.
//! - **context** — `AppContext`, built at startup and passed by reference.

pub mod cache;
pub mod conf;
pub mod context;
pub mod error;
pub mod logger;
pub mod processors;
pub mod sessions;
pub mod timezone;

pub use context::AppContext;
pub use error::AppError;
