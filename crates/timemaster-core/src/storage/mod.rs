mod config;

pub use config::{Config, DistractionConfig, GameConfig, TimerConfig};

use std::path::PathBuf;

/// Returns the configuration directory.
///
/// `TIMEMASTER_CONFIG_DIR` overrides the default `~/.config/timemaster/`.
/// The directory is not created here; `Config::save_to` creates it on write.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TIMEMASTER_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("timemaster")
}
