//! Application context — everything resolved once at startup and shared by
//! reference afterwards.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{KvCache, NullCache};
use crate::conf::{LazySettings, Settings, UnitLoader};
use crate::error::AppError;
use crate::sessions::SessionCodec;
use crate::timezone::TimezoneCache;

pub struct AppContext<C: KvCache = NullCache> {
    settings: Arc<Settings>,
    codec: SessionCodec,
    timezones: TimezoneCache<C>,
}

impl AppContext<NullCache> {
    /// Resolve the settings unit `module` and build the context without a
    /// shared cache.
    pub fn bootstrap(module: &str, loader: impl UnitLoader + 'static) -> Result<Self, AppError> {
        Self::bootstrap_with_cache(module, loader, NullCache)
    }
}

impl<C: KvCache> AppContext<C> {
    pub fn bootstrap_with_cache(
        module: &str,
        loader: impl UnitLoader + 'static,
        cache: C,
    ) -> Result<Self, AppError> {
        let lazy = LazySettings::new(module, loader);
        Self::from_settings(lazy.get()?, cache)
    }

    /// Build from already-resolved settings. Fails when `DEFAULT_TIMEZONE`
    /// or `SECRET_KEY` are unusable.
    pub fn from_settings(settings: Arc<Settings>, cache: C) -> Result<Self, AppError> {
        let codec = SessionCodec::from_settings(&settings)?;
        if settings.uses_placeholder_secret() {
            warn!("SECRET_KEY is still the built-in placeholder; set it in the settings unit");
        }

        let timezones = TimezoneCache::with_shared(cache);
        let tz = timezones.get(settings.default_timezone()?)?;

        info!(
            module = settings.settings_module().unwrap_or_default(),
            secret = %codec.fingerprint(),
            timezone = tz.name(),
            "application context ready"
        );

        Ok(Self {
            settings,
            codec,
            timezones,
        })
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn timezones(&self) -> &TimezoneCache<C> {
        &self.timezones
    }

    /// The project's default zone, served from the timezone cache.
    pub fn default_timezone(&self) -> Result<chrono_tz::Tz, AppError> {
        self.timezones.get(self.settings.default_timezone()?)
    }
}
