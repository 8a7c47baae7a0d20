//! Shared configuration types for tunefm
//!
//! This crate loads the Last.fm application credentials and endpoint
//! settings from the environment, so the client library and the `tunefm`
//! binary agree on variable names and defaults.

mod error;
mod lastfm;

pub use error::{ConfigError, ConfigResult};
pub use lastfm::{
    LastfmConfig, DEFAULT_API_URL, DEFAULT_AUTH_URL, DEFAULT_MIN_INTERVAL_MS,
    DEFAULT_TIMEOUT_SECS,
};

use std::env;

/// Helper function to get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_required_env_missing() {
        temp_env::with_var_unset("TUNEFM_TEST_REQUIRED", || {
            let result = get_required_env("TUNEFM_TEST_REQUIRED");
            assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
        });
    }

    #[test]
    fn test_get_env_or_default() {
        temp_env::with_var("TUNEFM_TEST_DEFAULT", Some("set"), || {
            assert_eq!(get_env_or_default("TUNEFM_TEST_DEFAULT", "fallback"), "set");
        });
        temp_env::with_var_unset("TUNEFM_TEST_DEFAULT", || {
            assert_eq!(
                get_env_or_default("TUNEFM_TEST_DEFAULT", "fallback"),
                "fallback"
            );
        });
    }

    #[test]
    fn test_parse_env() {
        temp_env::with_var("TUNEFM_TEST_NUMBER", Some("42"), || {
            assert_eq!(parse_env("TUNEFM_TEST_NUMBER", 7u64).unwrap(), 42);
        });
        temp_env::with_var("TUNEFM_TEST_NUMBER", Some("forty-two"), || {
            let result = parse_env("TUNEFM_TEST_NUMBER", 7u64);
            assert!(matches!(result, Err(ConfigError::InvalidValue(..))));
        });
        temp_env::with_var_unset("TUNEFM_TEST_NUMBER", || {
            assert_eq!(parse_env("TUNEFM_TEST_NUMBER", 7u64).unwrap(), 7);
        });
    }
}
