//! The resolved configuration set and the resolver that builds it.

use std::collections::BTreeMap;
use std::time::Duration;

use toml::Value;
use tracing::{debug, info};

use crate::error::AppError;

use super::defaults::{PLACEHOLDER_SECRET_KEY, base_layer};
use super::loader::UnitLoader;

pub const SETTINGS_MODULE: &str = "SETTINGS_MODULE";
pub const SECRET_KEY: &str = "SECRET_KEY";
pub const COOKIE_AGE: &str = "COOKIE_AGE";
pub const SESSION_MEMCACHE_AGE: &str = "SESSION_MEMCACHE_AGE";
pub const SESSION_PREFIX: &str = "SESSION_PREFIX";
pub const INSTALLED_APPS: &str = "INSTALLED_APPS";
pub const TEMPLATE_DIRS: &str = "TEMPLATE_DIRS";
pub const DEFAULT_TIMEZONE: &str = "DEFAULT_TIMEZONE";
pub const CONTEXT_PROCESSORS: &str = "CONTEXT_PROCESSORS";

/// Settings that must always end up as lists, even when given as one string.
const LIST_SETTINGS: [&str; 2] = [INSTALLED_APPS, TEMPLATE_DIRS];

const WILDCARD_SUFFIX: &str = ".*";

/// A fully resolved configuration set. Immutable once built by [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, Value>,
}

/// Resolve the settings unit `identifier` on top of the built-in defaults.
///
/// Upper-case keys of the unit replace the defaults, `INSTALLED_APPS` and
/// `TEMPLATE_DIRS` are coerced to lists, and `pkg.*` entries in
/// `INSTALLED_APPS` are expanded to every composite sub-unit of `pkg`.
pub fn resolve(identifier: &str, loader: &dyn UnitLoader) -> Result<Settings, AppError> {
    if identifier.trim().is_empty() {
        return Err(AppError::ImproperlyConfigured(
            "settings cannot be resolved: the settings module identifier is empty".into(),
        ));
    }

    let mut settings = Settings::defaults()?;
    settings
        .values
        .insert(SETTINGS_MODULE.to_string(), Value::String(identifier.to_string()));

    let unit = loader.load(identifier).map_err(|source| AppError::ConfigLoad {
        unit: identifier.to_string(),
        source,
    })?;

    for (name, value) in unit {
        if !is_setting_name(&name) {
            continue;
        }
        let value = match value {
            Value::String(s) if LIST_SETTINGS.contains(&name.as_str()) => {
                Value::Array(vec![Value::String(s)])
            }
            other => other,
        };
        settings.values.insert(name, value);
    }

    let apps = expand_installed_apps(settings.get_list(INSTALLED_APPS)?, loader)?;
    settings.values.insert(
        INSTALLED_APPS.to_string(),
        Value::Array(apps.into_iter().map(Value::String).collect()),
    );
    settings.get_list(TEMPLATE_DIRS)?;

    info!(
        module = identifier,
        settings = settings.values.len(),
        installed_apps = settings.installed_apps().len(),
        "settings resolved"
    );
    Ok(settings)
}

/// Replace each `prefix.*` entry by `prefix.<sub>` for every composite,
/// identifier-named sub-unit of `prefix`, sorted. Other entries keep their place.
fn expand_installed_apps(apps: Vec<String>, loader: &dyn UnitLoader) -> Result<Vec<String>, AppError> {
    let mut expanded = Vec::with_capacity(apps.len());
    for app in apps {
        let Some(prefix) = app.strip_suffix(WILDCARD_SUFFIX) else {
            expanded.push(app);
            continue;
        };

        let subs = loader.sub_units(prefix).map_err(|source| AppError::ConfigLoad {
            unit: prefix.to_string(),
            source,
        })?;
        let mut names: Vec<String> = subs
            .into_iter()
            .filter(|s| s.composite && is_identifier(&s.name))
            .map(|s| s.name)
            .collect();
        names.sort();

        debug!(wildcard = %app, found = names.len(), "expanding installed apps");
        expanded.extend(names.into_iter().map(|name| format!("{prefix}.{name}")));
    }
    Ok(expanded)
}

/// Only names without lower-case letters (and with at least one letter) are settings.
fn is_setting_name(name: &str) -> bool {
    name.chars().any(char::is_alphabetic) && !name.chars().any(char::is_lowercase)
}

/// An ASCII letter or underscore, then ASCII word characters.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn wrong_shape(name: &str, expected: &str) -> AppError {
    AppError::ImproperlyConfigured(format!("setting {name} must be {expected}"))
}

impl Settings {
    /// The base layer alone, for administrative configuration before first use.
    pub fn defaults() -> Result<Self, AppError> {
        let values = base_layer()?
            .into_iter()
            .filter(|(name, _)| is_setting_name(name))
            .collect();
        Ok(Self { values })
    }

    /// Set one value. Only valid while building a set by hand; a set returned
    /// from [`resolve`] is shared behind an `Arc` and never mutated.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AppError> {
        if !is_setting_name(name) {
            return Err(AppError::ImproperlyConfigured(format!(
                "'{name}' is not an upper-case setting name"
            )));
        }
        let value = match value.into() {
            Value::String(s) if LIST_SETTINGS.contains(&name) => Value::Array(vec![Value::String(s)]),
            other => other,
        };
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Every resolved setting name, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_str(&self, name: &str) -> Result<&str, AppError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| wrong_shape(name, "a string"))
    }

    pub fn get_int(&self, name: &str) -> Result<i64, AppError> {
        self.get(name)
            .and_then(Value::as_integer)
            .ok_or_else(|| wrong_shape(name, "an integer"))
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, AppError> {
        self.get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| wrong_shape(name, "a boolean"))
    }

    /// A non-negative integer setting read as seconds.
    pub fn get_seconds(&self, name: &str) -> Result<Duration, AppError> {
        let secs = self.get_int(name)?;
        u64::try_from(secs)
            .map(Duration::from_secs)
            .map_err(|_| wrong_shape(name, "a non-negative number of seconds"))
    }

    pub fn get_list(&self, name: &str) -> Result<Vec<String>, AppError> {
        let items = self
            .get(name)
            .and_then(Value::as_array)
            .ok_or_else(|| wrong_shape(name, "a list of strings"))?;
        items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| wrong_shape(name, "a list of strings"))
    }

    pub fn get_map(&self, name: &str) -> Result<BTreeMap<String, String>, AppError> {
        let table = self
            .get(name)
            .and_then(Value::as_table)
            .ok_or_else(|| wrong_shape(name, "a table of strings"))?;
        table
            .iter()
            .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect::<Option<BTreeMap<_, _>>>()
            .ok_or_else(|| wrong_shape(name, "a table of strings"))
    }

    pub fn settings_module(&self) -> Option<&str> {
        self.get(SETTINGS_MODULE).and_then(Value::as_str)
    }

    pub fn secret_key(&self) -> Result<&str, AppError> {
        self.get_str(SECRET_KEY)
    }

    /// `true` while `SECRET_KEY` still holds the shipped placeholder.
    pub fn uses_placeholder_secret(&self) -> bool {
        matches!(self.secret_key(), Ok(PLACEHOLDER_SECRET_KEY))
    }

    pub fn cookie_age(&self) -> Result<Duration, AppError> {
        self.get_seconds(COOKIE_AGE)
    }

    pub fn session_memcache_age(&self) -> Result<Duration, AppError> {
        self.get_seconds(SESSION_MEMCACHE_AGE)
    }

    pub fn session_prefix(&self) -> Result<&str, AppError> {
        self.get_str(SESSION_PREFIX)
    }

    pub fn default_timezone(&self) -> Result<&str, AppError> {
        self.get_str(DEFAULT_TIMEZONE)
    }

    /// Installed apps with wildcards already expanded. Empty when the
    /// setting is absent or malformed.
    pub fn installed_apps(&self) -> Vec<String> {
        self.get_list(INSTALLED_APPS).unwrap_or_default()
    }

    pub fn template_dirs(&self) -> Vec<String> {
        self.get_list(TEMPLATE_DIRS).unwrap_or_default()
    }

    pub fn context_processors(&self) -> Result<Vec<String>, AppError> {
        self.get_list(CONTEXT_PROCESSORS)
    }
}
