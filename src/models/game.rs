//! GameRecord: one finished game, frozen at match end.

use crate::models::entity::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a game record.
pub type GameId = Uuid;

/// 1v1 (players) or 2v2 (teams).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Single,
    Team,
}

/// How a game was won.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinType {
    Regular,
    /// Sweep (other side at 0) or 150 while the other side stayed under 75. Worth double.
    Special,
}

/// Game value for a win: 2 for special wins, otherwise 1.
pub fn game_value(is_special_win: bool) -> u32 {
    if is_special_win {
        2
    } else {
        1
    }
}

/// A finished game. Immutable except through an explicit edit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub game_mode: GameMode,
    /// Player (single mode) or team (team mode).
    pub winner: EntityRef,
    pub loser: EntityRef,
    pub winner_score: u32,
    pub loser_score: u32,
    pub date: DateTime<Utc>,
    pub duration_ms: i64,
    pub is_special_win: bool,
    /// Unit added to win/loss/streak counters.
    pub game_value: u32,
    pub was_comeback: bool,
}

impl GameRecord {
    /// Duration as `m:ss`.
    pub fn duration_display(&self) -> String {
        format_duration(self.duration_ms)
    }
}

/// Format milliseconds as `m:ss` (negative durations clamp to 0).
pub fn format_duration(ms: i64) -> String {
    let seconds = ms.max(0) / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
