//! Logging setup.
//!
//! The level comes from `KAY_LOG_LEVEL` and is validated before the
//! subscriber is installed, so a typo fails startup instead of silently
//! logging at the wrong level. With no level given, `RUST_LOG` is honoured and
//! [`DEFAULT_LEVEL`] applies when that is unset too.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub const LOG_LEVEL_VAR: &str = "KAY_LOG_LEVEL";
pub const DEFAULT_LEVEL: &str = "info";

/// A bare level name: `off`, `error`, `warn`, `info`, `debug` or `trace`.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger(format!("{LOG_LEVEL_VAR} must not be empty")));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised {LOG_LEVEL_VAR} value '{level}'")))
}

/// Build the filter for `level`.
///
/// Values containing `=` or `,` are full directives (`kay_core=debug,warn`);
/// anything else must be a level name accepted by [`parse_level`].
pub fn filter_for(level: Option<&str>) -> Result<EnvFilter, AppError> {
    let Some(level) = level.map(str::trim) else {
        return Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)));
    };

    if level.contains(['=', ',']) {
        return EnvFilter::try_new(level)
            .map_err(|e| AppError::Logger(format!("invalid {LOG_LEVEL_VAR} directive '{level}': {e}")));
    }

    let max = parse_level(level)?;
    Ok(EnvFilter::default().add_directive(max.into()))
}

/// Install the global subscriber, writing to stderr.
pub fn init(level: Option<&str>) -> Result<(), AppError> {
    let filter = filter_for(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        for l in ["off", "error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn bad_level_names_are_rejected() {
        for l in ["verbose", "", "INFO_LEVEL"] {
            let err = parse_level(l).unwrap_err();
            assert!(err.to_string().contains(LOG_LEVEL_VAR));
        }
    }

    #[test]
    fn level_sets_max_hint() {
        let filter = filter_for(Some(" debug ")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn bad_level_fails_before_install() {
        assert!(matches!(filter_for(Some("loud")), Err(AppError::Logger(_))));
    }

    #[test]
    fn directives_pass_through() {
        assert!(filter_for(Some("kay_core=debug,warn")).is_ok());
    }

    #[test]
    fn unset_level_falls_back() {
        assert!(filter_for(None).is_ok());
    }

    #[test]
    fn init_succeeds_or_already_init() {
        // Another test in this process may have installed a subscriber first.
        match init(Some("info")) {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
