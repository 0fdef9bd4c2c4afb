//! Layered settings resolution.
//!
//! The built-in defaults in `config/global_settings.toml` are overlaid with a
//! project's settings unit; only upper-case keys count as settings.
//!
//! # Module layout
//!
//! - **defaults** — the embedded base layer.
//! - **loader** — `UnitLoader` plus the filesystem and registry loaders.
//! - **settings** — `Settings` and `resolve`, including list coercion and
//!   `INSTALLED_APPS` wildcard expansion.
//! - **lazy** — `LazySettings`, which defers `resolve` to first access.

mod defaults;
mod lazy;
mod loader;
mod settings;

pub use defaults::{GLOBAL_SETTINGS, PLACEHOLDER_SECRET_KEY, base_layer};
pub use lazy::{DEFAULT_SETTINGS_MODULE, LazySettings};
pub use loader::{FsUnitLoader, SubUnit, UnitLoader, UnitRegistry, expand_home};
pub use settings::*;
