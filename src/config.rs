use std::{env, path::PathBuf};

use thiserror::Error;

use crate::teller::DEFAULT_PIN_ATTEMPTS;

pub const DATABASE_VAR: &str = "TELLER_DATABASE";
pub const PIN_ATTEMPTS_VAR: &str = "TELLER_PIN_ATTEMPTS";
pub const DEFAULT_DATABASE: &str = "teller.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding the accounts table, `:memory:` for a throwaway store.
    pub database: PathBuf,
    pub max_pin_attempts: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            max_pin_attempts: DEFAULT_PIN_ATTEMPTS,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(database) = lookup(DATABASE_VAR).filter(|value| !value.trim().is_empty()) {
            config.database = PathBuf::from(database.trim());
        }
        if let Some(attempts) = lookup(PIN_ATTEMPTS_VAR) {
            config.max_pin_attempts = match attempts.trim().parse::<u8>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidValue {
                        key: PIN_ATTEMPTS_VAR.to_string(),
                        message: "must be at least 1".to_string(),
                    });
                }
                Ok(value) => value,
                Err(err) => {
                    return Err(ConfigError::InvalidValue {
                        key: PIN_ATTEMPTS_VAR.to_string(),
                        message: err.to_string(),
                    });
                }
            };
        }
        Ok(config)
    }
}
