//! Kay core — bootstrap entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Init logger
//!   3. Resolve settings from `KAY_SETTINGS_MODULE` under `KAY_PROJECT_DIR`
//!   4. Build the application context
//!   5. Print status and exit

use std::env;
use std::error::Error;

use tracing::{debug, info};

use kay_core::conf::{DEFAULT_SETTINGS_MODULE, FsUnitLoader};
use kay_core::{AppContext, AppError, logger};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        let mut cause = e.source();
        while let Some(c) = cause {
            eprintln!("  caused by: {c}");
            cause = c.source();
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let log_level = env::var(logger::LOG_LEVEL_VAR).ok();
    logger::init(log_level.as_deref())?;

    let module = env::var("KAY_SETTINGS_MODULE").unwrap_or_else(|_| DEFAULT_SETTINGS_MODULE.to_string());
    let project_dir = env::var("KAY_PROJECT_DIR").unwrap_or_else(|_| ".".to_string());
    let loader = FsUnitLoader::from_dir(&project_dir);

    info!(module = %module, project_dir = %loader.root().display(), "resolving settings");
    let ctx = AppContext::bootstrap(&module, loader)?;

    let settings = ctx.settings();
    for name in settings.names() {
        debug!(setting = name, "resolved");
    }

    println!(
        "✓ Settings resolved: module={} settings={} installed_apps={} secret={}",
        module,
        settings.len(),
        settings.installed_apps().join(","),
        ctx.codec().fingerprint()
    );

    Ok(())
}
