//! Engine configuration file.
//!
//! The file is TOML with a single `[engine]` table. Every key is optional
//! and falls back to [`EngineConfig::default`]:
//!
//! ```toml
//! [engine]
//! opening_cash_balance = 250000
//! runway_sentinel = 999
//! burn_window_months = 3
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use forecast_core::{ConfigError, EngineConfig};

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    engine: EngineConfig,
}

/// Parses and validates config text.
pub fn parse_config(text: &str) -> Result<EngineConfig, ConfigFileError> {
    let file: ConfigFile = toml::from_str(text)?;
    file.engine.validate()?;
    Ok(file.engine)
}

/// Reads the config at `path`, or returns the defaults when no path is given.
///
/// # Errors
///
/// A path that was given but cannot be read is an error, as is any parse or
/// validation failure.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigFileError> {
    let Some(path) = path else {
        debug!("no config file given; using defaults");
        return Ok(EngineConfig::default());
    };

    let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text)?;
    debug!(path = %path.display(), ?config, "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_engine_table_merges_over_defaults() {
        let text = "[engine]\nopening_cash_balance = 250000\n";

        let config = parse_config(text).unwrap();

        assert_eq!(config.opening_cash_balance, dec!(250000));
        assert_eq!(config.runway_sentinel, dec!(999));
        assert_eq!(config.burn_window_months, 1);
    }

    #[test]
    fn decimal_strings_are_accepted() {
        let text = "[engine]\nopening_cash_balance = \"1234.56\"\nburn_window_months = 3\n";

        let config = parse_config(text).unwrap();

        assert_eq!(config.opening_cash_balance, dec!(1234.56));
        assert_eq!(config.burn_window_months, 3);
    }

    #[test]
    fn zero_burn_window_is_rejected() {
        let result = parse_config("[engine]\nburn_window_months = 0\n");

        assert!(matches!(
            result,
            Err(ConfigFileError::Invalid(ConfigError::InvalidBurnWindow(0)))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = parse_config("[engnie]\nburn_window_months = 2\n");

        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn mistyped_engine_key_is_rejected() {
        let result = parse_config("[engine]\nopening_cash = 5\n");

        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn missing_path_is_defaults_but_missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("forecast-cli-no-such-config.toml");

        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
        assert!(matches!(
            load_config(Some(&missing)),
            Err(ConfigFileError::Read { .. })
        ));
    }
}
