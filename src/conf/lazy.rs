//! Deferred settings: nothing is loaded until the first [`LazySettings::get`].

use std::sync::{Arc, Mutex, OnceLock};

use crate::error::AppError;

use super::loader::UnitLoader;
use super::settings::{Settings, resolve};

/// Identifier used when none is given.
pub const DEFAULT_SETTINGS_MODULE: &str = "settings";

/// Resolves settings on first access and keeps the result for its lifetime.
///
/// The first access resolves while holding the module lock, so concurrent
/// first accesses wait for it and a racing [`LazySettings::set_module`]
/// either lands before resolution or is rejected. Every caller sees the same
/// `Arc`.
pub struct LazySettings {
    module: Mutex<String>,
    loader: Box<dyn UnitLoader>,
    resolved: OnceLock<Arc<Settings>>,
}

impl LazySettings {
    pub fn new(module: impl Into<String>, loader: impl UnitLoader + 'static) -> Self {
        Self {
            module: Mutex::new(module.into()),
            loader: Box::new(loader),
            resolved: OnceLock::new(),
        }
    }

    pub fn with_default_module(loader: impl UnitLoader + 'static) -> Self {
        Self::new(DEFAULT_SETTINGS_MODULE, loader)
    }

    /// The resolved settings, resolving them now if this is the first access.
    pub fn get(&self) -> Result<Arc<Settings>, AppError> {
        if let Some(settings) = self.resolved.get() {
            return Ok(Arc::clone(settings));
        }

        let module = self
            .module
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(settings) = self.resolved.get() {
            return Ok(Arc::clone(settings));
        }
        let settings = Arc::new(resolve(&module, self.loader.as_ref())?);
        Ok(Arc::clone(self.resolved.get_or_init(|| settings)))
    }

    /// Whether settings have been resolved or installed.
    pub fn configured(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub fn module(&self) -> String {
        self.module
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Point at a different settings unit. Only allowed before first use.
    pub fn set_module(&self, module: impl Into<String>) -> Result<(), AppError> {
        let mut guard = self
            .module
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.configured() {
            return Err(AppError::ImproperlyConfigured(
                "settings are already configured; the settings module can no longer change".into(),
            ));
        }
        *guard = module.into();
        Ok(())
    }

    /// Install a hand-built set instead of resolving one. Only allowed before
    /// first use.
    pub fn configure(&self, settings: Settings) -> Result<(), AppError> {
        self.resolved
            .set(Arc::new(settings))
            .map_err(|_| AppError::ImproperlyConfigured("settings are already configured".into()))
    }
}

impl std::fmt::Debug for LazySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySettings")
            .field("module", &self.module())
            .field("configured", &self.configured())
            .finish()
    }
}
