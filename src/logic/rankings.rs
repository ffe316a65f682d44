//! Rankings, head-to-head comparison and leaderboards over a set of games.
//!
//! Players are credited for their single games and for every team game one of their
//! teams played. Teams are credited for team games only.

use crate::logic::period::{filter_games_by_period, Period};
use crate::models::{EntityKind, EntityRef, GameMode, GameRecord, ScoreError, Scoreboard, Team};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Win/loss totals for one entity (wins and losses in game-value units).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EntityStats {
    pub wins: u32,
    pub losses: u32,
    /// Special wins scored.
    pub specials_given: u32,
    /// Special wins suffered.
    pub specials_received: u32,
}

impl EntityStats {
    /// `wins / (wins + losses)`, or 0 with no games.
    pub fn win_rate(&self) -> f64 {
        let total = self.wins + self.losses;
        if total == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(total)
        }
    }

    pub fn has_games(&self) -> bool {
        self.wins + self.losses > 0
    }

    fn record(&mut self, game: &GameRecord, won: bool) {
        if won {
            self.wins += game.game_value;
            if game.is_special_win {
                self.specials_given += 1;
            }
        } else {
            self.losses += game.game_value;
            if game.is_special_win {
                self.specials_received += 1;
            }
        }
    }
}

fn team_has(teams: &[Team], entity: &EntityRef, player: &str) -> bool {
    entity
        .as_team()
        .and_then(|id| teams.iter().find(|t| t.id == id))
        .is_some_and(|t| t.has_player(player))
}

/// `Some(true)` if `entity` is credited with the win, `Some(false)` with the loss.
fn outcome_for(teams: &[Team], game: &GameRecord, entity: &EntityRef) -> Option<bool> {
    match (entity, game.game_mode) {
        (EntityRef::Player(name), GameMode::Team) => {
            if team_has(teams, &game.winner, name) {
                Some(true)
            } else if team_has(teams, &game.loser, name) {
                Some(false)
            } else {
                None
            }
        }
        _ if &game.winner == entity => Some(true),
        _ if &game.loser == entity => Some(false),
        _ => None,
    }
}

/// Overall record of one entity over `games`.
pub fn entity_stats(teams: &[Team], games: &[GameRecord], entity: &EntityRef) -> EntityStats {
    let mut stats = EntityStats::default();
    for game in games {
        if let Some(won) = outcome_for(teams, game, entity) {
            stats.record(game, won);
        }
    }
    stats
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

/// One line of a ranking table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingRow {
    /// 1-based position.
    pub rank: usize,
    pub medal: Option<Medal>,
    pub entity: EntityRef,
    pub name: String,
    pub stats: EntityStats,
    pub win_rate: f64,
}

/// Rank every registered player or team with at least one game in `games`:
/// win rate descending, then raw wins descending, then name.
pub fn aggregate_rankings(
    board: &Scoreboard,
    games: &[GameRecord],
    kind: EntityKind,
) -> Vec<RankingRow> {
    let entities: Vec<EntityRef> = match kind {
        EntityKind::Player => board
            .players
            .iter()
            .map(|p| EntityRef::player(p.name.as_str()))
            .collect(),
        EntityKind::Team => board.teams.iter().map(|t| EntityRef::Team(t.id)).collect(),
    };
    let mut rows: Vec<RankingRow> = entities
        .into_iter()
        .filter_map(|entity| {
            let stats = entity_stats(&board.teams, games, &entity);
            stats.has_games().then(|| RankingRow {
                rank: 0,
                medal: None,
                name: board.entity_name(&entity),
                win_rate: stats.win_rate(),
                entity,
                stats,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| b.stats.wins.cmp(&a.stats.wins))
            .then_with(|| a.name.cmp(&b.name))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
        row.medal = match i {
            0 => Some(Medal::Gold),
            1 => Some(Medal::Silver),
            2 => Some(Medal::Bronze),
            _ => None,
        };
    }
    rows
}

/// Side of a head-to-head comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonSide {
    pub entity: EntityRef,
    pub name: String,
    pub stats: EntityStats,
    /// `None` when the entity has no games in the period.
    pub win_rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeadToHead {
    pub period: Period,
    pub a: ComparisonSide,
    pub b: ComparisonSide,
}

/// Compare the overall records of two entities in a period.
///
/// Each side is that entity's record against everyone, not only games between the two.
pub fn compare_head_to_head<Tz: TimeZone>(
    board: &Scoreboard,
    a: &EntityRef,
    b: &EntityRef,
    period: Period,
    now: &DateTime<Tz>,
) -> Result<HeadToHead, ScoreError> {
    if a == b {
        return Err(ScoreError::validation(
            "Please select two different opponents",
        ));
    }
    for entity in [a, b] {
        let known = match entity {
            EntityRef::Player(name) => board.players.iter().any(|p| &p.name == name),
            EntityRef::Team(id) => board.team(*id).is_some(),
        };
        if !known {
            return Err(ScoreError::NotFound(entity.to_string()));
        }
    }
    let games = filter_games_by_period(&board.games, period, now);
    let side = |entity: &EntityRef| {
        let stats = entity_stats(&board.teams, &games, entity);
        ComparisonSide {
            entity: entity.clone(),
            name: board.entity_name(entity),
            win_rate: stats.has_games().then(|| stats.win_rate()),
            stats,
        }
    };
    Ok(HeadToHead {
        period,
        a: side(a),
        b: side(b),
    })
}

/// Players credited with a win and with a loss in one game.
fn game_players(teams: &[Team], game: &GameRecord) -> (Vec<String>, Vec<String>) {
    let names = |entity: &EntityRef| -> Vec<String> {
        match entity {
            EntityRef::Player(name) => vec![name.clone()],
            EntityRef::Team(id) => teams
                .iter()
                .find(|t| t.id == *id)
                .map(|t| vec![t.player1.clone(), t.player2.clone()])
                .unwrap_or_default(),
        }
    };
    (names(&game.winner), names(&game.loser))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakKind {
    Win,
    Loss,
}

/// Current run of one player within a period.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PlayerStreak {
    pub name: String,
    pub kind: StreakKind,
    /// Length in game-value units.
    pub length: u32,
}

/// Current per-player win/loss runs over `games`, replayed in date order from scratch.
/// Only registered players are tracked.
pub fn period_streaks(board: &Scoreboard, games: &[GameRecord]) -> Vec<PlayerStreak> {
    let mut ordered: Vec<&GameRecord> = games.iter().collect();
    ordered.sort_by_key(|g| g.date);

    let mut runs: BTreeMap<&str, (StreakKind, u32)> = BTreeMap::new();
    for game in ordered {
        let (winners, losers) = game_players(&board.teams, game);
        for (names, kind) in [(winners, StreakKind::Win), (losers, StreakKind::Loss)] {
            for name in names {
                let Some(player) = board.players.iter().find(|p| p.name == name) else {
                    continue;
                };
                let run = runs.entry(player.name.as_str()).or_insert((kind, 0));
                if run.0 == kind {
                    run.1 += game.game_value;
                } else {
                    *run = (kind, game.game_value);
                }
            }
        }
    }
    runs.into_iter()
        .map(|(name, (kind, length))| PlayerStreak {
            name: name.to_string(),
            kind,
            length,
        })
        .collect()
}

/// A player and a count.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PlayerCount {
    pub name: String,
    pub count: u32,
}

/// Special wins given and received per registered player.
pub fn special_win_counts(
    board: &Scoreboard,
    games: &[GameRecord],
) -> (Vec<PlayerCount>, Vec<PlayerCount>) {
    let mut given: BTreeMap<String, u32> = BTreeMap::new();
    let mut received: BTreeMap<String, u32> = BTreeMap::new();
    for game in games.iter().filter(|g| g.is_special_win) {
        let (winners, losers) = game_players(&board.teams, game);
        for name in winners {
            *given.entry(name).or_default() += 1;
        }
        for name in losers {
            *received.entry(name).or_default() += 1;
        }
    }
    let to_counts = |m: BTreeMap<String, u32>| -> Vec<PlayerCount> {
        m.into_iter()
            .filter(|(name, _)| board.players.iter().any(|p| &p.name == name))
            .map(|(name, count)| PlayerCount { name, count })
            .collect()
    };
    (to_counts(given), to_counts(received))
}

/// One game in a player's daily summary, seen from that player's side.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DailyGameLine {
    pub won: bool,
    /// Teammate in team games.
    pub partner: Option<String>,
    /// Opposing label: a player name or "A & B".
    pub opponents: String,
    pub own_score: u32,
    pub opponent_score: u32,
    pub is_special_win: bool,
}

/// A player's results for today, in game-value units.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PlayerDaySummary {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub games: Vec<DailyGameLine>,
}

/// Per-player recap of today's games, sorted by name.
///
/// Single games count even for players no longer registered. Team games whose teams were
/// deleted are skipped.
pub fn daily_player_summary<Tz: TimeZone>(
    board: &Scoreboard,
    now: &DateTime<Tz>,
) -> Vec<PlayerDaySummary> {
    let mut games = filter_games_by_period(&board.games, Period::Daily, now);
    games.sort_by_key(|g| g.date);

    let mut summaries: BTreeMap<String, PlayerDaySummary> = BTreeMap::new();
    let mut push = |name: &str, won: bool, game: &GameRecord, line: DailyGameLine| {
        let summary = summaries
            .entry(name.to_string())
            .or_insert_with(|| PlayerDaySummary {
                name: name.to_string(),
                wins: 0,
                losses: 0,
                games: Vec::new(),
            });
        if won {
            summary.wins += game.game_value;
        } else {
            summary.losses += game.game_value;
        }
        summary.games.push(line);
    };

    for game in &games {
        let (winners, losers) = match (&game.winner, &game.loser) {
            (EntityRef::Player(w), EntityRef::Player(l)) => (vec![w.clone()], vec![l.clone()]),
            (EntityRef::Team(w), EntityRef::Team(l)) => match (board.team(*w), board.team(*l)) {
                (Some(w), Some(l)) => (
                    vec![w.player1.clone(), w.player2.clone()],
                    vec![l.player1.clone(), l.player2.clone()],
                ),
                _ => {
                    log::debug!("Skipping game {} in daily summary: team deleted", game.id);
                    continue;
                }
            },
            _ => {
                log::warn!("Game {} mixes players and teams", game.id);
                continue;
            }
        };
        for (own, other, won) in [(&winners, &losers, true), (&losers, &winners, false)] {
            let (own_score, opponent_score) = if won {
                (game.winner_score, game.loser_score)
            } else {
                (game.loser_score, game.winner_score)
            };
            for name in own {
                let line = DailyGameLine {
                    won,
                    partner: own.iter().find(|p| *p != name).cloned(),
                    opponents: other.join(" & "),
                    own_score,
                    opponent_score,
                    is_special_win: game.is_special_win,
                };
                push(name.as_str(), won, game, line);
            }
        }
    }
    summaries.into_values().collect()
}

/// Everything the leaderboard screen shows for one period.
#[derive(Clone, Debug, Serialize)]
pub struct Leaderboard {
    pub period: Period,
    pub team_rankings: Vec<RankingRow>,
    pub player_rankings: Vec<RankingRow>,
    pub winning_streaks: Vec<PlayerStreak>,
    pub losing_streaks: Vec<PlayerStreak>,
    pub most_specials_given: Vec<PlayerCount>,
    pub most_specials_received: Vec<PlayerCount>,
}

const TOP_PLAYERS: usize = 10;
const TOP_BOARD: usize = 3;
const MIN_STREAK: u32 = 2;

fn top_streaks(streaks: &[PlayerStreak], kind: StreakKind) -> Vec<PlayerStreak> {
    let mut top: Vec<PlayerStreak> = streaks
        .iter()
        .filter(|s| s.kind == kind && s.length >= MIN_STREAK)
        .cloned()
        .collect();
    top.sort_by(|a, b| b.length.cmp(&a.length).then_with(|| a.name.cmp(&b.name)));
    top.truncate(TOP_BOARD);
    top
}

fn top_counts(mut counts: Vec<PlayerCount>) -> Vec<PlayerCount> {
    counts.retain(|c| c.count > 0);
    counts.sort_by(|a, b| match b.count.cmp(&a.count) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
    counts.truncate(TOP_BOARD);
    counts
}

/// Build the leaderboard for `period`.
pub fn leaderboard<Tz: TimeZone>(
    board: &Scoreboard,
    period: Period,
    now: &DateTime<Tz>,
) -> Leaderboard {
    let games = filter_games_by_period(&board.games, period, now);
    let mut player_rankings = aggregate_rankings(board, &games, EntityKind::Player);
    player_rankings.truncate(TOP_PLAYERS);
    let streaks = period_streaks(board, &games);
    let (given, received) = special_win_counts(board, &games);
    Leaderboard {
        period,
        team_rankings: aggregate_rankings(board, &games, EntityKind::Team),
        player_rankings,
        winning_streaks: top_streaks(&streaks, StreakKind::Win),
        losing_streaks: top_streaks(&streaks, StreakKind::Loss),
        most_specials_given: top_counts(given),
        most_specials_received: top_counts(received),
    }
}
