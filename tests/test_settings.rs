//! Settings resolution against a project directory on disk.

use std::fs;
use std::sync::Arc;

use kay_core::AppError;
use kay_core::conf::{FsUnitLoader, LazySettings, resolve};
use tempfile::TempDir;

fn project(settings: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("settings.toml"), settings).unwrap();
    dir
}

#[test]
fn override_unit_replaces_defaults() {
    let dir = project("COOKIE_AGE = 42\nSECRET_KEY = \"prod\"\n");
    let s = resolve("settings", &FsUnitLoader::new(dir.path())).unwrap();
    assert_eq!(s.get_int("COOKIE_AGE").unwrap(), 42);
    assert_eq!(s.secret_key().unwrap(), "prod");
    assert_eq!(s.get_int("SESSION_MEMCACHE_AGE").unwrap(), 3600);
}

#[test]
fn scalar_installed_apps_becomes_list() {
    let dir = project("INSTALLED_APPS = \"appone\"\n");
    let s = resolve("settings", &FsUnitLoader::new(dir.path())).unwrap();
    assert_eq!(s.installed_apps(), vec!["appone"]);
}

#[test]
fn wildcard_expands_directories_on_disk() {
    let dir = project("INSTALLED_APPS = [\"kay.auth\", \"pkg.*\"]\n");
    for sub in ["b_app", "a_app", "2bad"] {
        fs::create_dir_all(dir.path().join("pkg").join(sub)).unwrap();
    }
    fs::write(dir.path().join("pkg/c_module.toml"), "").unwrap();

    let s = resolve("settings", &FsUnitLoader::new(dir.path())).unwrap();
    assert_eq!(s.installed_apps(), vec!["kay.auth", "pkg.a_app", "pkg.b_app"]);
}

#[test]
fn nested_wildcard_prefix() {
    let dir = project("INSTALLED_APPS = [\"vendor.contrib.*\"]\n");
    fs::create_dir_all(dir.path().join("vendor/contrib/admin")).unwrap();
    let s = resolve("settings", &FsUnitLoader::new(dir.path())).unwrap();
    assert_eq!(s.installed_apps(), vec!["vendor.contrib.admin"]);
}

#[test]
fn malformed_unit_is_config_load_error() {
    let dir = project("COOKIE_AGE = = 1\n");
    let err = resolve("settings", &FsUnitLoader::new(dir.path())).unwrap_err();
    assert!(matches!(err, AppError::ConfigLoad { .. }));
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("parse error"));
}

#[test]
fn lazy_settings_resolve_once() {
    let dir = project("COOKIE_AGE = 42\n");
    let lazy = LazySettings::with_default_module(FsUnitLoader::new(dir.path()));
    let first = lazy.get().unwrap();

    // A changed file is not picked up: the first result is kept.
    fs::write(dir.path().join("settings.toml"), "COOKIE_AGE = 1\n").unwrap();
    let second = lazy.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.get_int("COOKIE_AGE").unwrap(), 42);
}
