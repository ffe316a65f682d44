//! Game records: build at match end, edit, delete, reset a day. Every change to the
//! game log is followed by a full recompute of achievements and streaks.

use crate::config::ScoringRules;
use crate::logic::achievements::recompute_all;
use crate::logic::period::local_day_start;
use crate::models::{
    game_value, EntityRef, GameId, GameMode, GameRecord, LiveMatch, ScoreError, Scoreboard, Side,
    WinType,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// New values for an existing game.
#[derive(Clone, Debug, Deserialize)]
pub struct GameEdit {
    pub winner: EntityRef,
    pub loser: EntityRef,
    pub winner_score: u32,
    pub loser_score: u32,
    pub is_special_win: bool,
}

/// Side holding the higher score. On a tie, the side that scored last (it reached the
/// terminal score); with no history at all, side A.
pub fn winning_side(live: &LiveMatch) -> Side {
    if live.score_a != live.score_b {
        return if live.score_a > live.score_b {
            Side::A
        } else {
            Side::B
        };
    }
    live.history
        .last()
        .and_then(|e| live.side_of(e))
        .unwrap_or(Side::A)
}

/// True if the eventual winner was ever `deficit` or more points behind.
pub fn was_comeback(live: &LiveMatch, winner: Side, deficit: u32) -> bool {
    live.history.iter().any(|e| {
        let (own, other) = match winner {
            Side::A => (e.score_a_snapshot, e.score_b_snapshot),
            Side::B => (e.score_b_snapshot, e.score_a_snapshot),
        };
        other >= own.saturating_add(deficit)
    })
}

/// Freeze a live match into a game record. Returns the record and the winning side.
pub fn build_game_record(
    live: &LiveMatch,
    win_type: WinType,
    rules: &ScoringRules,
    now: DateTime<Utc>,
) -> (GameRecord, Side) {
    let winner = winning_side(live);
    let loser = winner.other();
    let is_special_win = win_type == WinType::Special;
    let record = GameRecord {
        id: Uuid::new_v4(),
        game_mode: live.mode,
        winner: live.participant(winner).entity(),
        loser: live.participant(loser).entity(),
        winner_score: live.score(winner),
        loser_score: live.score(loser),
        date: now,
        duration_ms: (now - live.start_time).num_milliseconds(),
        is_special_win,
        game_value: game_value(is_special_win),
        was_comeback: was_comeback(live, winner, rules.comeback_deficit),
    };
    (record, winner)
}

/// Amend a stored game, then rebuild achievements and streaks from the whole log.
pub fn edit_game(
    board: &mut Scoreboard,
    id: GameId,
    edit: GameEdit,
) -> Result<&GameRecord, ScoreError> {
    let idx = board
        .games
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| ScoreError::NotFound(format!("Game {}", id)))?;
    validate_edit(board, board.games[idx].game_mode, &edit)?;

    let game = &mut board.games[idx];
    game.winner = edit.winner;
    game.loser = edit.loser;
    game.winner_score = edit.winner_score;
    game.loser_score = edit.loser_score;
    game.is_special_win = edit.is_special_win;
    game.game_value = game_value(edit.is_special_win);
    log::info!("Edited game {}", id);

    recompute_all(board);
    Ok(&board.games[idx])
}

fn validate_edit(board: &Scoreboard, mode: GameMode, edit: &GameEdit) -> Result<(), ScoreError> {
    if edit.winner == edit.loser {
        return Err(ScoreError::validation("Winner and loser must differ"));
    }
    for entity in [&edit.winner, &edit.loser] {
        match (mode, entity) {
            (GameMode::Single, EntityRef::Player(name)) => {
                if !board.players.iter().any(|p| &p.name == name) {
                    return Err(ScoreError::NotFound(format!("Player {}", name)));
                }
            }
            (GameMode::Team, EntityRef::Team(team_id)) => {
                if board.team(*team_id).is_none() {
                    return Err(ScoreError::NotFound(format!("Team {}", team_id)));
                }
            }
            _ => {
                return Err(ScoreError::validation(
                    "Winner and loser must match the game mode",
                ))
            }
        }
    }
    Ok(())
}

/// Remove a stored game, then rebuild achievements and streaks.
pub fn delete_game(board: &mut Scoreboard, id: GameId) -> Result<GameRecord, ScoreError> {
    let idx = board
        .games
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| ScoreError::NotFound(format!("Game {}", id)))?;
    let removed = board.games.remove(idx);
    log::info!("Deleted game {}", id);
    recompute_all(board);
    Ok(removed)
}

/// Delete every game played on `now`'s local day, then rebuild the derived views.
/// Returns how many games were removed.
pub fn reset_today<Tz: TimeZone>(board: &mut Scoreboard, now: &DateTime<Tz>) -> usize {
    let start = local_day_start(now).with_timezone(&Utc);
    let end = start + Duration::days(1);
    let before = board.games.len();
    board.games.retain(|g| g.date < start || g.date >= end);
    let removed = before - board.games.len();
    log::info!("Reset today: removed {} game(s)", removed);
    recompute_all(board);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Participant, ScoreEvent};
    use chrono::TimeZone;

    fn live_with(events: &[(Side, u32, u32)]) -> LiveMatch {
        let mut live = LiveMatch::new(
            GameMode::Single,
            Participant::Player { name: "Ann".into() },
            Participant::Player { name: "Ben".into() },
            1,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        );
        for &(side, a, b) in events {
            live.history.push(ScoreEvent {
                participant_label: live.label(side),
                points_delta: 0,
                score_a_snapshot: a,
                score_b_snapshot: b,
            });
        }
        if let Some(&(_, a, b)) = events.last() {
            live.score_a = a;
            live.score_b = b;
        }
        live
    }

    #[test]
    fn comeback_needs_full_deficit_at_some_snapshot() {
        let live = live_with(&[(Side::B, 0, 60), (Side::A, 30, 60), (Side::A, 150, 60)]);
        assert!(was_comeback(&live, Side::A, 50));
        let close = live_with(&[(Side::B, 0, 49), (Side::A, 150, 49)]);
        assert!(!was_comeback(&close, Side::A, 50));
    }

    #[test]
    fn comeback_scan_tolerates_saturated_scores() {
        let live = live_with(&[(Side::A, u32::MAX, 0), (Side::B, u32::MAX, 10)]);
        assert!(!was_comeback(&live, Side::A, 50));
        assert!(was_comeback(&live, Side::B, 50));
    }

    #[test]
    fn tie_goes_to_side_that_scored_last() {
        let live = live_with(&[(Side::A, 150, 0), (Side::B, 150, 150)]);
        assert_eq!(winning_side(&live), Side::B);
    }
}
