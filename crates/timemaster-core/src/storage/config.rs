//! TOML-based application configuration.
//!
//! Holds the tunables of the game:
//! - Timer interval lengths and long-break cadence
//! - Distraction probability, cooldown and poll interval
//! - Day settlement policy and starter tasks
//!
//! Configuration is stored at `~/.config/timemaster/config.toml`.
//! Game state itself is never written to disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::config_dir;
use crate::distraction::DistractionSettings;
use crate::error::ConfigError;
use crate::session::SettlementPolicy;
use crate::timer::TimerSettings;

/// Timer-specific configuration (minutes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u64,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u64,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
}

/// Distraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistractionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_probability")]
    pub probability: f64,
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: i64,
    #[serde(default = "default_escalation")]
    pub escalation_secs: i64,
    /// How often the host polls while the timer counts.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

/// Game rules configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub settlement: SettlementPolicy,
    #[serde(default = "default_true")]
    pub seed_sample_tasks: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timemaster/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub distraction: DistractionConfig,
    #[serde(default)]
    pub game: GameConfig,
}

// Default functions
fn default_work_minutes() -> u64 {
    25
}
fn default_short_break() -> u64 {
    5
}
fn default_long_break() -> u64 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_probability() -> f64 {
    0.3
}
fn default_cooldown() -> i64 {
    60
}
fn default_escalation() -> i64 {
    300
}
fn default_poll_interval() -> u64 {
    10
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            long_break_interval: default_long_break_interval(),
        }
    }
}

impl Default for DistractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probability: default_probability(),
            cooldown_secs: default_cooldown(),
            escalation_secs: default_escalation(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            settlement: SettlementPolicy::default(),
            seed_sample_tasks: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if part.is_empty() {
                break;
            }
            if parts.peek().is_some() {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                continue;
            }

            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<i64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot set a whole section".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default location of the config file.
    pub fn path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load from the default location, or defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed,
    /// or fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The change is validated
    /// but not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.distraction_settings()
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "distraction".into(),
                message: e.to_string(),
            })?;
        if self.timer.work_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.work_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.timer.long_break_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.long_break_interval".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.distraction.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "distraction.poll_interval_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings::from_minutes(
            self.timer.work_minutes,
            self.timer.short_break_minutes,
            self.timer.long_break_minutes,
            self.timer.long_break_interval,
        )
    }

    /// Firing gate settings. A disabled gate never fires.
    pub fn distraction_settings(&self) -> DistractionSettings {
        DistractionSettings {
            probability: if self.distraction.enabled {
                self.distraction.probability
            } else {
                0.0
            },
            cooldown_secs: self.distraction.cooldown_secs,
            escalation_secs: self.distraction.escalation_secs,
        }
    }
}
