//! Scoring logic: live match engine, game records, achievements/streaks, period aggregation.

mod achievements;
mod live;
mod period;
mod rankings;
mod record;

pub use achievements::{
    achievement_summaries, apply_new_game, grant, recompute_all, win_total, AchievementSummary,
    RecomputeSummary, Unlock,
};
pub use live::{
    apply_delta, confirm_result, correct_result, end_match, reset_match, start_match,
    sweep_alert, terminal_win_type, undo, ConfirmedGame, DeltaOutcome, MatchSetup, UndoOutcome,
};
pub use period::{filter_games_by_period, local_day_start, period_start, Period};
pub use rankings::{
    aggregate_rankings, compare_head_to_head, daily_player_summary, entity_stats, leaderboard,
    period_streaks, special_win_counts, ComparisonSide, DailyGameLine, EntityStats, HeadToHead,
    Leaderboard, Medal, PlayerCount, PlayerDaySummary, PlayerStreak, RankingRow, StreakKind,
};
pub use record::{
    build_game_record, delete_game, edit_game, reset_today, was_comeback, winning_side, GameEdit,
};
