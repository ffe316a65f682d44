//! Achievements and streaks: a replayable view over the game log.
//!
//! Every game goes through the same per-game step, both when it is first confirmed
//! (incremental) and when the whole log is replayed in date order (full recompute).
//! Unlock dates are the date of the game that triggered them, so replaying the same
//! log always yields the same views.

use crate::config::ScoringRules;
use crate::models::{
    AchievementDefinition, AchievementKey, AchievementRecord, EntityRef, GameRecord, Scoreboard,
    StreakState, Team, UnlockedAchievement, ACHIEVEMENT_CATALOG,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// An achievement newly unlocked by an entity.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Unlock {
    pub entity: EntityRef,
    pub key: AchievementKey,
}

/// Summary of a full recompute.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RecomputeSummary {
    pub games: usize,
    pub unlocked: usize,
}

/// Grant `key` to `entity` unless already unlocked. Returns true if it was new.
/// A repeated grant keeps the first unlock date.
pub fn grant(
    achievements: &mut AchievementRecord,
    entity: &EntityRef,
    key: AchievementKey,
    date: DateTime<Utc>,
) -> bool {
    let unlocked = achievements.entry(entity.clone()).or_default();
    if unlocked.iter().any(|a| a.key == key) {
        return false;
    }
    unlocked.push(UnlockedAchievement { key, date });
    true
}

/// Mutable views plus the context needed to apply one game at a time.
struct Replay<'a> {
    teams: &'a [Team],
    rules: &'a ScoringRules,
    achievements: &'a mut AchievementRecord,
    streaks: &'a mut StreakState,
    unlocked: Vec<Unlock>,
}

impl Replay<'_> {
    fn grant(&mut self, entity: &EntityRef, key: AchievementKey, date: DateTime<Utc>) {
        if grant(self.achievements, entity, key, date) {
            log::info!("Achievement granted: {} to {}", key.definition().label, entity);
            self.unlocked.push(Unlock {
                entity: entity.clone(),
                key,
            });
        }
    }

    /// Constituent players of a team entity; empty for players or deleted teams.
    fn members(&self, entity: &EntityRef) -> Vec<EntityRef> {
        let Some(team_id) = entity.as_team() else {
            return Vec::new();
        };
        match self.teams.iter().find(|t| t.id == team_id) {
            Some(team) => team
                .members()
                .iter()
                .map(|name| EntityRef::player(*name))
                .collect(),
            None => {
                log::warn!("Team {} no longer exists; player streaks not updated", team_id);
                Vec::new()
            }
        }
    }

    /// Apply one game. `win_total` is the winner's accumulated win value including this game.
    fn apply_game(&mut self, game: &GameRecord, win_total: u32) {
        if game.is_special_win {
            self.grant(&game.winner, AchievementKey::FirstSpecialWin, game.date);
        }
        if win_total >= self.rules.ten_wins {
            self.grant(&game.winner, AchievementKey::TenWins, game.date);
        }
        if game.was_comeback {
            self.grant(&game.winner, AchievementKey::ComebackKing, game.date);
        }
        self.update_streaks(game);
    }

    /// Loser side resets to 0, winner side grows by the game value. Team results move the
    /// team and both of its players.
    fn update_streaks(&mut self, game: &GameRecord) {
        let mut losers = vec![game.loser.clone()];
        losers.extend(self.members(&game.loser));
        for entity in losers {
            self.streaks.insert(entity, 0);
        }

        let mut winners = vec![game.winner.clone()];
        winners.extend(self.members(&game.winner));
        for entity in winners {
            let streak = self.streaks.entry(entity.clone()).or_insert(0);
            *streak += game.game_value;
            let streak = *streak;
            log::debug!("{} streak: {} (+{})", entity, streak, game.game_value);
            if streak >= self.rules.dominator_streak {
                self.grant(&entity, AchievementKey::Dominator, game.date);
            }
        }
    }
}

/// Total win value of `entity` across `games`.
pub fn win_total(games: &[GameRecord], entity: &EntityRef) -> u32 {
    games
        .iter()
        .filter(|g| &g.winner == entity)
        .map(|g| g.game_value)
        .sum()
}

/// Incremental update for a newly confirmed game already appended to `board.games`.
pub fn apply_new_game(board: &mut Scoreboard, game: &GameRecord) -> Vec<Unlock> {
    let total = win_total(&board.games, &game.winner);
    let mut replay = Replay {
        teams: &board.teams,
        rules: &board.rules,
        achievements: &mut board.achievements,
        streaks: &mut board.streaks,
        unlocked: Vec::new(),
    };
    replay.apply_game(game, total);
    replay.unlocked
}

/// Rebuild achievements and streaks from scratch by replaying every game in date order.
/// Running it twice in a row yields identical views.
pub fn recompute_all(board: &mut Scoreboard) -> RecomputeSummary {
    let mut ordered: Vec<&GameRecord> = board.games.iter().collect();
    ordered.sort_by_key(|g| g.date);

    let mut achievements = AchievementRecord::new();
    let mut streaks = StreakState::new();
    let mut totals: BTreeMap<EntityRef, u32> = BTreeMap::new();
    let mut replay = Replay {
        teams: &board.teams,
        rules: &board.rules,
        achievements: &mut achievements,
        streaks: &mut streaks,
        unlocked: Vec::new(),
    };
    for (i, game) in ordered.iter().enumerate() {
        log::debug!("Replaying game {}/{} ({})", i + 1, ordered.len(), game.id);
        let total = totals.entry(game.winner.clone()).or_insert(0);
        *total += game.game_value;
        let total = *total;
        replay.apply_game(game, total);
    }
    let summary = RecomputeSummary {
        games: ordered.len(),
        unlocked: replay.unlocked.len(),
    };

    board.achievements = achievements;
    board.streaks = streaks;
    log::info!(
        "Recomputed achievements from {} game(s): {} unlocked",
        summary.games,
        summary.unlocked
    );
    summary
}

/// One catalog entry with the display names of everyone who unlocked it.
#[derive(Clone, Debug, Serialize)]
pub struct AchievementSummary {
    pub definition: AchievementDefinition,
    pub unlocked_by: Vec<String>,
}

/// The whole catalog, locked entries included (empty `unlocked_by`).
pub fn achievement_summaries(board: &Scoreboard) -> Vec<AchievementSummary> {
    ACHIEVEMENT_CATALOG
        .iter()
        .map(|def| AchievementSummary {
            definition: *def,
            unlocked_by: board
                .achievements
                .iter()
                .filter(|(_, unlocked)| unlocked.iter().any(|a| a.key == def.key))
                .map(|(entity, _)| board.entity_name(entity))
                .collect(),
        })
        .collect()
}
