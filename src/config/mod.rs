//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ENGAGEMENT` prefix and
//! nested values are separated by double underscores. Every section has
//! defaults, so an empty environment yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use service_engagement::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Top services in reports: {}", config.reconciliation.top_services);
//! ```

mod error;
mod logging;
mod reconciliation;
mod uploads;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use reconciliation::ReconciliationConfig;
pub use uploads::UploadsConfig;

use serde::Deserialize;

const ENV_PREFIX: &str = "ENGAGEMENT";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Payment proof uploads
    #[serde(default)]
    pub uploads: UploadsConfig,

    /// Revenue report windows
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ENGAGEMENT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ENGAGEMENT__UPLOADS__MAX_PROOF_BYTES=5242880` -> `uploads.max_proof_bytes`
    /// - `ENGAGEMENT__UPLOADS__ALLOWED_MIME_TYPES=image/png,image/jpeg` -> list
    /// - `ENGAGEMENT__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("uploads.allowed_mime_types")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.uploads.validate()?;
        self.reconciliation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "ENGAGEMENT__UPLOADS__MAX_PROOF_BYTES",
        "ENGAGEMENT__UPLOADS__ALLOWED_MIME_TYPES",
        "ENGAGEMENT__LOGGING__JSON",
        "ENGAGEMENT__RECONCILIATION__TOP_SERVICES",
        "ENGAGEMENT__UPLOADS__ENDPOINT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.uploads.max_proof_bytes, 5 * 1024 * 1024);
        assert_eq!(config.uploads.folder, "payment_proofs");
        assert_eq!(config.reconciliation.current_window_days, 30);
        assert_eq!(config.reconciliation.currency_symbol, "₱");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ENGAGEMENT__UPLOADS__MAX_PROOF_BYTES", "1048576");
        env::set_var("ENGAGEMENT__UPLOADS__ALLOWED_MIME_TYPES", "image/png,image/jpeg");
        env::set_var("ENGAGEMENT__LOGGING__JSON", "true");
        env::set_var("ENGAGEMENT__RECONCILIATION__TOP_SERVICES", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.uploads.max_proof_bytes, 1_048_576);
        assert_eq!(config.uploads.allowed_mime_types, vec!["image/png", "image/jpeg"]);
        assert!(config.logging.json);
        assert_eq!(config.reconciliation.top_services, 3);
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ENGAGEMENT__UPLOADS__ENDPOINT", "media.example");
        let result = AppConfig::load_validated();
        clear_env();

        assert!(matches!(
            result,
            Err(ConfigError::ValidationFailed(ValidationError::InvalidUploadEndpoint))
        ));
    }
}
