use std::path::PathBuf;

use cashflow_domain::{OverduePolicy, WINDOW_DAYS_LIMIT};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Keys accepted by [`Config::set`], in display order.
pub const CONFIG_KEYS: [&str; 8] = [
    "max_window_days",
    "heuristic_delay_days",
    "overdue_policy",
    "currency",
    "locale",
    "currency_precision",
    "ui_color_enabled",
    "snapshot_root",
];

/// Stores projection limits and CLI display preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_max_window_days")]
    pub max_window_days: i64,
    #[serde(default = "Config::default_heuristic_delay_days")]
    pub heuristic_delay_days: i64,
    #[serde(default)]
    pub overdue_policy: OverduePolicy,
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency_precision")]
    pub currency_precision: u8,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for snapshot files. Defaults to `~/Documents/CashFlow`.
    pub snapshot_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_snapshot: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_window_days: Self::default_max_window_days(),
            heuristic_delay_days: Self::default_heuristic_delay_days(),
            overdue_policy: OverduePolicy::default(),
            currency: Self::default_currency(),
            locale: Self::default_locale(),
            currency_precision: Self::default_currency_precision(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            snapshot_root: None,
            last_opened_snapshot: None,
        }
    }
}

impl Config {
    pub fn default_max_window_days() -> i64 {
        1096
    }

    pub fn default_heuristic_delay_days() -> i64 {
        5
    }

    pub fn default_currency() -> String {
        "USD".into()
    }

    pub fn default_locale() -> String {
        "en-US".into()
    }

    pub fn default_currency_precision() -> u8 {
        2
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_snapshot_root(&self) -> PathBuf {
        if let Some(path) = &self.snapshot_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("CashFlow")
    }

    /// Current value of `key` rendered for display.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "max_window_days" => self.max_window_days.to_string(),
            "heuristic_delay_days" => self.heuristic_delay_days.to_string(),
            "overdue_policy" => self.overdue_policy.to_string(),
            "currency" => self.currency.clone(),
            "locale" => self.locale.clone(),
            "currency_precision" => self.currency_precision.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "snapshot_root" => self.resolve_snapshot_root().display().to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parses `value` and stores it under `key`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let trimmed = value.trim();
        match key {
            "max_window_days" => {
                let days: i64 = trimmed.parse().map_err(|_| invalid())?;
                if !(1..=WINDOW_DAYS_LIMIT).contains(&days) {
                    return Err(invalid());
                }
                self.max_window_days = days;
            }
            "heuristic_delay_days" => {
                self.heuristic_delay_days = trimmed.parse().map_err(|_| invalid())?;
            }
            "overdue_policy" => {
                self.overdue_policy = OverduePolicy::parse(trimmed).ok_or_else(invalid)?;
            }
            "currency" => {
                if trimmed.is_empty() {
                    return Err(invalid());
                }
                self.currency = trimmed.to_ascii_uppercase();
            }
            "locale" => {
                if trimmed.is_empty() {
                    return Err(invalid());
                }
                self.locale = trimmed.to_string();
            }
            "currency_precision" => {
                let precision: u8 = trimmed.parse().map_err(|_| invalid())?;
                if precision > 6 {
                    return Err(invalid());
                }
                self.currency_precision = precision;
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = match trimmed.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => return Err(invalid()),
                };
            }
            "snapshot_root" => {
                self.snapshot_root = if trimmed.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(trimmed))
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
