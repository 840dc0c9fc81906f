use std::fs;
use std::io;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::auth::ResetPolicy;
use crate::{DEFAULT_KDF_ITERATIONS, DEFAULT_TOKEN_VALIDITY_MINUTES, TOKENS_FILE, USERS_FILE};

pub const DATA_DIR_ENV: &str = "RECOVERY_DATA_DIR";
pub const TOKEN_TTL_ENV: &str = "RECOVERY_TOKEN_TTL_MINUTES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: String, value: String },
}

/// Runtime settings for the reset tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub token_validity_minutes: u32,
    pub single_use: bool,
    pub kdf_iterations: NonZeroU32,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            token_validity_minutes: DEFAULT_TOKEN_VALIDITY_MINUTES,
            single_use: true,
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// absent, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::load_file(path)?;
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read the settings file alone; missing fields take their defaults
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(minutes) = lookup(TOKEN_TTL_ENV) {
            self.token_validity_minutes = minutes.trim().parse().map_err(|_| {
                ConfigError::InvalidValue {
                    key: TOKEN_TTL_ENV.to_string(),
                    value: minutes.clone(),
                }
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_validity_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "token_validity_minutes".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn policy(&self) -> ResetPolicy {
        ResetPolicy {
            validity_window: TimeDelta::minutes(i64::from(self.token_validity_minutes)),
            single_use: self.single_use,
        }
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.data_dir.join(TOKENS_FILE)
    }
}
