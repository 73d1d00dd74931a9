//! User settings: default projection horizon and display currency

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SettingsError;
use crate::projection::DEFAULT_PROJECTION_MONTHS;

/// Longest default horizon accepted from a settings file (50 years)
pub const MAX_DEFAULT_PROJECTION_MONTHS: u32 = 600;

fn default_projection_months() -> u32 {
    DEFAULT_PROJECTION_MONTHS
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_projection_months")]
    pub default_projection_months: u32,

    /// ISO 4217 code used when formatting amounts
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_projection_months: default_projection_months(),
            currency: default_currency(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_json_path(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_DEFAULT_PROJECTION_MONTHS).contains(&self.default_projection_months) {
            return Err(SettingsError::ProjectionMonthsOutOfRange {
                value: self.default_projection_months,
                max: MAX_DEFAULT_PROJECTION_MONTHS,
            });
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SettingsError::InvalidCurrency(self.currency.clone()));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
