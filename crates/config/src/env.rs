//! Environment variable access
//!
//! The process environment is captured once into an [`EnvVars`] snapshot so
//! that configuration loading is a pure function of that snapshot.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

/// Snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Replace a variable in the snapshot, used for command-line overrides
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Raw lookup. Empty values count as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Read a variable, falling back to `default` when it is unset.
    ///
    /// Fails with [`ConfigError::MissingEnvVar`] when the variable is unset
    /// and no default was given.
    pub fn get_env_var(&self, name: &str, default: Option<&str>) -> ConfigResult<String> {
        match (self.get(name), default) {
            (Some(value), _) => {
                debug!("Using environment variable: {} = \"{}\"", name, redact(name, value));
                Ok(value.to_string())
            }
            (None, Some(default)) => {
                debug!(
                    "Environment variable '{}' not set, using default: \"{}\"",
                    name, default
                );
                Ok(default.to_string())
            }
            (None, None) => {
                warn!("Environment variable '{}' not set and has no default", name);
                Err(ConfigError::MissingEnvVar(name.to_string()))
            }
        }
    }

    /// Read a variable with a default value
    pub fn get_env_or_default(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    /// `true` only when the variable is exactly `"true"` (case-insensitive)
    pub fn get_env_flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Comma separated list, trimmed, empty entries dropped
    pub fn get_env_list(&self, name: &str, default: &str) -> Vec<String> {
        self.get(name)
            .unwrap_or(default)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parse a variable into `T`, falling back to `default` when unset
    pub fn get_env_parsed<T>(&self, name: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
                var: name.to_string(),
                message: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    /// Whether the variable is present and non-empty
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

fn redact<'a>(name: &str, value: &'a str) -> &'a str {
    let upper = name.to_ascii_uppercase();
    let sensitive = ["SECRET", "KEY", "PASSWORD", "DATABASE_URL"];
    if sensitive.iter().any(|s| upper.contains(s)) {
        "***"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_get_env_var_prefers_value() {
        let env = EnvVars::from_pairs([("PORT", "8080")]);
        assert_eq!(env.get_env_var("PORT", Some("3000")).unwrap(), "8080");
    }

    #[test]
    fn test_get_env_var_falls_back_to_default() {
        let env = EnvVars::default();
        assert_eq!(env.get_env_var("PORT", Some("3000")).unwrap(), "3000");
    }

    #[test]
    fn test_get_env_var_missing_without_default() {
        let env = EnvVars::default();
        assert_matches!(
            env.get_env_var("CLOUD_NAME", None),
            Err(ConfigError::MissingEnvVar(name)) if name == "CLOUD_NAME"
        );
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let env = EnvVars::from_pairs([("PORT", "  ")]);
        assert_eq!(env.get_env_or_default("PORT", "3000"), "3000");
        assert!(!env.is_set("PORT"));
    }

    #[test]
    fn test_flag_and_list() {
        let env = EnvVars::from_pairs([
            ("ENABLE_CLOUDINARY", "TRUE"),
            ("CORS_ENFORCE", "yes"),
            ("ORIGINS", " http://a.com, ,http://b.com "),
        ]);
        assert!(env.get_env_flag("ENABLE_CLOUDINARY"));
        assert!(!env.get_env_flag("CORS_ENFORCE"));
        assert!(!env.get_env_flag("MISSING"));
        assert_eq!(
            env.get_env_list("ORIGINS", ""),
            vec!["http://a.com".to_string(), "http://b.com".to_string()]
        );
    }

    #[test]
    fn test_parsed_value() {
        let env = EnvVars::from_pairs([("PORT", "abc"), ("MAX", "42")]);
        assert_eq!(env.get_env_parsed::<u64>("MAX", 1).unwrap(), 42);
        assert_eq!(env.get_env_parsed::<u16>("OTHER", 7).unwrap(), 7);
        assert_matches!(
            env.get_env_parsed::<u16>("PORT", 3000),
            Err(ConfigError::InvalidEnvVar { var, .. }) if var == "PORT"
        );
    }
}
