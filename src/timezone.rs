//! Timezone lookup with a per-process cache and a best-effort shared cache.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::cache::{KvCache, NullCache};
use crate::error::AppError;

/// How long a resolved zone stays in the shared cache.
pub const TZ_CACHE_TTL: Duration = Duration::from_secs(86_400);

fn cache_key(name: &str) -> String {
    format!("tz:{name}")
}

fn parse_tz(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Resolves zone names, keyed by name, local map first, then the shared cache.
pub struct TimezoneCache<C: KvCache = NullCache> {
    local: RwLock<HashMap<String, Tz>>,
    shared: C,
}

impl TimezoneCache<NullCache> {
    pub fn new() -> Self {
        Self::with_shared(NullCache)
    }
}

impl Default for TimezoneCache<NullCache> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: KvCache> TimezoneCache<C> {
    pub fn with_shared(shared: C) -> Self {
        Self {
            local: RwLock::new(HashMap::new()),
            shared,
        }
    }

    pub fn shared(&self) -> &C {
        &self.shared
    }

    /// Resolve `name`. Shared-cache failures are logged and treated as misses.
    pub fn get(&self, name: &str) -> Result<Tz, AppError> {
        if let Some(tz) = self
            .local
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
        {
            return Ok(*tz);
        }

        let key = cache_key(name);
        let cached = match self.shared.get(&key) {
            Ok(Some(stored)) => parse_tz(&stored),
            Ok(None) => None,
            Err(e) => {
                debug!(tz = name, error = %e, "timezone get failed");
                None
            }
        };

        let tz = match cached {
            Some(tz) => tz,
            None => {
                let tz = parse_tz(name).ok_or_else(|| {
                    AppError::ImproperlyConfigured(format!("unknown timezone '{name}'"))
                })?;
                if let Err(e) = self.shared.set(&key, tz.name(), TZ_CACHE_TTL) {
                    debug!(tz = name, error = %e, "timezone set failed");
                }
                tz
            }
        };

        self.local
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), tz);
        Ok(tz)
    }

    /// Number of zones held locally.
    pub fn len(&self) -> usize {
        self.local
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: KvCache> std::fmt::Debug for TimezoneCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimezoneCache").field("local", &self.len()).finish()
    }
}

/// Convert a UTC instant to wall-clock time in `tz`.
pub fn to_local_timezone(utc: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    utc.with_timezone(&tz)
}

/// Convert wall-clock time in `tz` to naive UTC. Ambiguous times take the
/// earlier instant; times skipped by a DST jump return `None`.
pub fn to_utc(local: NaiveDateTime, tz: Tz) -> Option<NaiveDateTime> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
}
