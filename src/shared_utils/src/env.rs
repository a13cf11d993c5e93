use std::{fmt::Display, str::FromStr};

use crate::config::ConfigError;

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, ConfigError> {
    get_env_var_opt(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Reads an optional environment variable. Blank values count as unset.
pub fn get_env_var_opt(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

/// Trims a raw value and maps blank strings to `None`.
pub fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses a raw variable value, falling back to `default` when it is absent.
///
/// # Arguments
/// * `name` - The variable name, used in the error message.
/// * `raw` - The value as looked up, if any.
/// * `default` - Returned unchanged when `raw` is `None`.
pub fn parse_or<T>(name: &str, raw: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
