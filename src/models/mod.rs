//! Data structures for the domino scoreboard: roster, live match, game log, derived views.

mod achievement;
mod entity;
mod game;
mod live_match;
mod player;
mod scoreboard;

pub use achievement::{
    AchievementDefinition, AchievementKey, AchievementRecord, StreakState, UnlockedAchievement,
    ACHIEVEMENT_CATALOG,
};
pub use entity::{EntityKind, EntityRef, ParseEntityError};
pub use game::{format_duration, game_value, GameId, GameMode, GameRecord, WinType};
pub use live_match::{LiveMatch, Participant, ScoreEvent, Side};
pub use player::{Player, PlayerId, Team, TeamId};
pub use scoreboard::{entity_name, ErrorKind, ScoreError, Scoreboard};
