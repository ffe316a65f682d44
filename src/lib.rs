//! Domino score tracker: library with models, scoring logic and persistence.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{AppConfig, ScoringRules};
pub use logic::{
    achievement_summaries, aggregate_rankings, apply_delta, apply_new_game, build_game_record,
    compare_head_to_head, confirm_result, correct_result, daily_player_summary, delete_game,
    edit_game, end_match, entity_stats, filter_games_by_period, grant, leaderboard, period_start,
    period_streaks, recompute_all, reset_match, reset_today, special_win_counts, start_match,
    terminal_win_type, undo, was_comeback, AchievementSummary, ComparisonSide, ConfirmedGame,
    DailyGameLine, DeltaOutcome, EntityStats, GameEdit, HeadToHead, Leaderboard, MatchSetup, Medal,
    Period, PlayerCount, PlayerDaySummary, PlayerStreak, RankingRow, RecomputeSummary, StreakKind,
    UndoOutcome, Unlock,
};
pub use models::{
    AchievementDefinition, AchievementKey, AchievementRecord, EntityKind, EntityRef, ErrorKind,
    GameId, GameMode, GameRecord, LiveMatch, Participant, Player, PlayerId, ScoreError, ScoreEvent,
    Scoreboard, Side, StreakState, Team, TeamId, UnlockedAchievement, WinType,
    ACHIEVEMENT_CATALOG,
};
pub use store::{load_scoreboard, save_scoreboard, JsonFileStore, MemoryStore, Store, StoreError};
