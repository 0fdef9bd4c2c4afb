//! Base layer — the built-in defaults every project starts from.

use crate::error::AppError;

/// The defaults document, embedded at build time so resolution does not
/// depend on the working directory.
pub const GLOBAL_SETTINGS: &str = include_str!("../../config/global_settings.toml");

/// Placeholder shipped as the default `SECRET_KEY`.
pub const PLACEHOLDER_SECRET_KEY: &str = "please set secret keys here";

/// Parse the embedded defaults into a fresh table.
pub fn base_layer() -> Result<toml::Table, AppError> {
    toml::from_str(GLOBAL_SETTINGS)
        .map_err(|e| AppError::ImproperlyConfigured(format!("built-in defaults are invalid: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_layer_parses() {
        let base = base_layer().unwrap();
        assert_eq!(base["COOKIE_AGE"].as_integer(), Some(1_209_600));
        assert_eq!(base["SESSION_MEMCACHE_AGE"].as_integer(), Some(3600));
        assert_eq!(base["DEFAULT_TIMEZONE"].as_str(), Some("Asia/Tokyo"));
        assert_eq!(base["SECRET_KEY"].as_str(), Some(PLACEHOLDER_SECRET_KEY));
    }

    #[test]
    fn list_defaults_are_empty_arrays() {
        let base = base_layer().unwrap();
        assert_eq!(base["INSTALLED_APPS"].as_array().map(Vec::len), Some(0));
        assert_eq!(base["TEMPLATE_DIRS"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn tables_stay_top_level() {
        let base = base_layer().unwrap();
        assert!(base["APP_MOUNT_POINTS"].as_table().unwrap().is_empty());
        assert_eq!(
            base["JINJA2_FILTERS"].get("nl2br").and_then(|v| v.as_str()),
            Some("kay.utils.filters.nl2br")
        );
        // Keys declared above the first table must not be swallowed by it.
        assert!(base.contains_key("USE_DB_HOOK"));
    }
}
