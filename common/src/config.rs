//! Global process configuration.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton holding
//! the settings that are shared by every run mode of the seeder: where to log,
//! which API to talk to, where fixtures live and how to reach DynamoDB.
//! Values come from `.env` and the process environment; missing or malformed
//! values fall back to defaults instead of aborting the run.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Reads `key` from the environment and parses it, falling back to `default`
/// when the variable is absent or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads `key` as a string, falling back to `default`.
pub fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

/// Reads `key` as a boolean flag. Accepts `true/false`, `1/0`, `yes/no`.
pub fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key).map(|v| v.trim().to_ascii_lowercase()) {
        Ok(v) if matches!(v.as_str(), "true" | "1" | "yes") => true,
        Ok(v) if matches!(v.as_str(), "false" | "0" | "no") => false,
        _ => default,
    }
}

/// Process-level configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub output_dir: String,
    pub aws_region: String,
    pub dynamodb_endpoint: Option<String>,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env_string("APP_ENV", "development"),
            project_name: env_string("PROJECT_NAME", "tasmai-seeder"),
            log_level: env_string("LOG_LEVEL", "seeder=info"),
            log_file: env_string("LOG_FILE", "seeder.log"),
            log_to_stdout: env_flag("LOG_TO_STDOUT", true),
            api_base: env_string(
                "API_BASE",
                "https://zkbsgdbbhc.execute-api.us-east-1.amazonaws.com/Dev",
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            output_dir: env_string("OUTPUT_DIR", "output"),
            aws_region: env_string("AWS_REGION", "us-east-1"),
            dynamodb_endpoint: env::var("DYNAMODB_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Returns a snapshot of the global configuration.
    ///
    /// A poisoned lock still yields the last written value.
    pub fn global() -> AppConfig {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        match lock.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Reloads the configuration from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = match lock.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = match lock.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        setter(&mut guard);
    }

    pub fn set_api_base(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.api_base = value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_or_falls_back_on_garbage() {
        unsafe {
            env::set_var("SEEDER_TEST_NUMBER", "not-a-number");
        }
        assert_eq!(env_or("SEEDER_TEST_NUMBER", 7u32), 7);
        unsafe {
            env::set_var("SEEDER_TEST_NUMBER", " 42 ");
        }
        assert_eq!(env_or("SEEDER_TEST_NUMBER", 7u32), 42);
        unsafe {
            env::remove_var("SEEDER_TEST_NUMBER");
        }
        assert_eq!(env_or("SEEDER_TEST_NUMBER", 7u32), 7);
    }

    #[test]
    #[serial]
    fn env_flag_accepts_common_spellings() {
        for (raw, expected) in [("true", true), ("1", true), ("YES", true), ("0", false), ("no", false)] {
            unsafe {
                env::set_var("SEEDER_TEST_FLAG", raw);
            }
            assert_eq!(env_flag("SEEDER_TEST_FLAG", !expected), expected, "raw={raw}");
        }
        unsafe {
            env::set_var("SEEDER_TEST_FLAG", "maybe");
        }
        assert!(env_flag("SEEDER_TEST_FLAG", true));
        unsafe {
            env::remove_var("SEEDER_TEST_FLAG");
        }
    }

    #[test]
    #[serial]
    fn setters_override_and_reset_restores() {
        unsafe {
            env::set_var("API_BASE", "http://localhost:3000");
        }
        AppConfig::reset();
        AppConfig::set_api_base("http://example.invalid");
        assert_eq!(AppConfig::global().api_base, "http://example.invalid");

        AppConfig::reset();
        assert_eq!(AppConfig::global().api_base, "http://localhost:3000");
        unsafe {
            env::remove_var("API_BASE");
        }
        AppConfig::reset();
    }

    #[test]
    #[serial]
    fn blank_dynamodb_endpoint_is_none() {
        unsafe {
            env::set_var("DYNAMODB_ENDPOINT", "  ");
        }
        assert!(AppConfig::from_env().dynamodb_endpoint.is_none());
        unsafe {
            env::set_var("DYNAMODB_ENDPOINT", "http://localhost:8000");
        }
        assert_eq!(
            AppConfig::from_env().dynamodb_endpoint.as_deref(),
            Some("http://localhost:8000")
        );
        unsafe {
            env::remove_var("DYNAMODB_ENDPOINT");
        }
    }
}
