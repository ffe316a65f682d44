//! Runtime configuration (environment) and scoring thresholds.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Score thresholds used by the live match engine and achievement rules.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// One side at or above this while the other is 0 raises the sweep alert.
    pub sweep_alert: u32,
    /// One side at or above this while the other is 0 ends the game as a special win.
    pub sweep_win: u32,
    /// Score that ends a game.
    pub target: u32,
    /// Reaching the target while the other side is below this is a special win.
    pub special_floor: u32,
    /// Deficit the eventual winner must have faced for a comeback.
    pub comeback_deficit: u32,
    /// Streak that unlocks the dominator achievement.
    pub dominator_streak: u32,
    /// Total win value that unlocks the ten wins achievement.
    pub ten_wins: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            sweep_alert: 50,
            sweep_win: 75,
            target: 150,
            special_floor: 75,
            comeback_deficit: 50,
            dominator_streak: 5,
            ten_wins: 10,
        }
    }
}

/// Server settings. Every field can be overridden from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub rules: ScoringRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            rules: ScoringRules::default(),
        }
    }
}

impl AppConfig {
    /// Read HOST, PORT and DATA_DIR; unset or unparsable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            rules: defaults.rules,
        }
    }
}
