//! Live match engine: start, score, confirm/correct a terminal score, undo, reset, end.

use crate::config::ScoringRules;
use crate::logic::achievements::{apply_new_game, Unlock};
use crate::logic::record::build_game_record;
use crate::models::{
    GameMode, GameRecord, LiveMatch, Participant, ScoreError, ScoreEvent, Scoreboard, Side,
    WinType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Input for [`start_match`]: one name per side in single mode, two in team mode.
#[derive(Clone, Debug, Deserialize)]
pub struct MatchSetup {
    pub mode: GameMode,
    pub side_a: Vec<String>,
    pub side_b: Vec<String>,
    #[serde(default = "default_best_of")]
    pub best_of: u32,
}

fn default_best_of() -> u32 {
    1
}

/// Result of [`apply_delta`]. `Ignored` means nothing changed (no match, ended, or awaiting
/// confirmation).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DeltaOutcome {
    Ignored,
    Applied {
        score_a: u32,
        score_b: u32,
        /// One side is at 50+ while the other has nothing; display only.
        sweep_alert: bool,
        /// Terminal score reached; the caller must confirm or correct.
        pending: Option<WinType>,
    },
}

/// Result of [`undo`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum UndoOutcome {
    Ignored,
    Undone { score_a: u32, score_b: u32 },
}

/// A confirmed game: the stored record, what it unlocked, and the series state.
#[derive(Clone, Debug, Serialize)]
pub struct ConfirmedGame {
    pub record: GameRecord,
    pub unlocked: Vec<Unlock>,
    pub series_a: u32,
    pub series_b: u32,
    pub series_over: bool,
}

/// Start a new match, replacing any live one.
///
/// Single mode needs two distinct names, team mode four distinct names (case-insensitive).
/// New players are registered and each team side is resolved with find-or-create.
pub fn start_match<'a>(
    board: &'a mut Scoreboard,
    setup: &MatchSetup,
    now: DateTime<Utc>,
) -> Result<&'a LiveMatch, ScoreError> {
    if setup.best_of == 0 || setup.best_of % 2 == 0 {
        return Err(ScoreError::validation("Match length must be an odd number of games"));
    }
    let per_side = match setup.mode {
        GameMode::Single => 1,
        GameMode::Team => 2,
    };
    let names: Vec<&str> = setup
        .side_a
        .iter()
        .chain(setup.side_b.iter())
        .map(|n| n.trim())
        .collect();
    if setup.side_a.len() != per_side
        || setup.side_b.len() != per_side
        || names.iter().any(|n| n.is_empty())
    {
        return Err(ScoreError::validation(match setup.mode {
            GameMode::Single => "Please select both players",
            GameMode::Team => "Please enter all four player names",
        }));
    }
    let unique: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
    if unique.len() != names.len() {
        return Err(ScoreError::validation(match setup.mode {
            GameMode::Single => "Players must be different",
            GameMode::Team => "Please enter four unique player names",
        }));
    }

    let stored: Vec<String> = names.iter().map(|n| board.ensure_player(n)).collect();
    let (side_a, side_b) = match setup.mode {
        GameMode::Single => (
            Participant::Player {
                name: stored[0].clone(),
            },
            Participant::Player {
                name: stored[1].clone(),
            },
        ),
        GameMode::Team => (
            Participant::Team {
                team: board.find_or_create_team(&stored[0], &stored[1]),
            },
            Participant::Team {
                team: board.find_or_create_team(&stored[2], &stored[3]),
            },
        ),
    };

    if board.live.as_ref().is_some_and(|m| !m.ended) {
        log::info!("Discarding unfinished live match");
    }
    let live = LiveMatch::new(setup.mode, side_a, side_b, setup.best_of, now);
    log::info!(
        "Match started: {} vs {} (best of {})",
        live.label(Side::A),
        live.label(Side::B),
        live.best_of
    );
    Ok(board.live.insert(live))
}

/// Terminal condition for a pair of scores, if any.
pub fn terminal_win_type(score_a: u32, score_b: u32, rules: &ScoringRules) -> Option<WinType> {
    let sweep = |winner: u32, other: u32| winner >= rules.sweep_win && other == 0;
    if sweep(score_a, score_b) || sweep(score_b, score_a) {
        return Some(WinType::Special);
    }
    if score_a >= rules.target || score_b >= rules.target {
        let crushed =
            |winner: u32, other: u32| winner >= rules.target && other < rules.special_floor;
        return Some(if crushed(score_a, score_b) || crushed(score_b, score_a) {
            WinType::Special
        } else {
            WinType::Regular
        });
    }
    None
}

/// True when one side is at the alert threshold and the other is still at 0.
pub fn sweep_alert(score_a: u32, score_b: u32, rules: &ScoringRules) -> bool {
    (score_a >= rules.sweep_alert && score_b == 0) || (score_b >= rules.sweep_alert && score_a == 0)
}

/// Add `points` (may be negative) to a side. Scores never drop below 0.
///
/// Ignored when no match is live, it has ended, or a terminal score awaits confirmation.
pub fn apply_delta(board: &mut Scoreboard, side: Side, points: i32) -> DeltaOutcome {
    let rules = board.rules;
    let Some(live) = board.live.as_mut() else {
        return DeltaOutcome::Ignored;
    };
    if !live.is_accepting_input() {
        return DeltaOutcome::Ignored;
    }

    let before = live.score(side);
    let after = before.saturating_add_signed(points);
    *live.score_mut(side) = after;
    let event = ScoreEvent {
        participant_label: live.label(side),
        // |effective| <= |points|, so the narrowing cannot truncate.
        points_delta: (i64::from(after) - i64::from(before)) as i32,
        score_a_snapshot: live.score_a,
        score_b_snapshot: live.score_b,
    };
    live.history.push(event);

    let pending = terminal_win_type(live.score_a, live.score_b, &rules);
    if let Some(win_type) = pending {
        log::info!(
            "Terminal score {}-{} ({:?}), awaiting confirmation",
            live.score_a,
            live.score_b,
            win_type
        );
        live.pending = Some(win_type);
    }
    DeltaOutcome::Applied {
        score_a: live.score_a,
        score_b: live.score_b,
        sweep_alert: sweep_alert(live.score_a, live.score_b, &rules),
        pending,
    }
}

/// Commit the pending terminal score: end the game, store its record, update achievements
/// and streaks, and add its value to the series.
pub fn confirm_result(
    board: &mut Scoreboard,
    now: DateTime<Utc>,
) -> Result<ConfirmedGame, ScoreError> {
    let rules = board.rules;
    let live = board
        .live
        .as_mut()
        .ok_or_else(|| ScoreError::State("No match in progress".to_string()))?;
    let win_type = live
        .pending
        .take()
        .ok_or_else(|| ScoreError::State("No result awaiting confirmation".to_string()))?;

    let (record, winner_side) = build_game_record(live, win_type, &rules, now);
    live.ended = true;
    match winner_side {
        Side::A => live.series_a += record.game_value,
        Side::B => live.series_b += record.game_value,
    }
    let (series_a, series_b, series_over) = (live.series_a, live.series_b, live.is_series_over());
    log::info!(
        "Game confirmed: {} {}-{} (special: {}, series {}-{})",
        board.entity_name(&record.winner),
        record.winner_score,
        record.loser_score,
        record.is_special_win,
        series_a,
        series_b
    );

    board.games.push(record.clone());
    let unlocked = apply_new_game(board, &record);
    Ok(ConfirmedGame {
        record,
        unlocked,
        series_a,
        series_b,
        series_over,
    })
}

/// Discard the pending terminal score so scoring can continue (operator mis-entry).
pub fn correct_result(board: &mut Scoreboard) -> Result<(), ScoreError> {
    let live = board
        .live
        .as_mut()
        .ok_or_else(|| ScoreError::State("No match in progress".to_string()))?;
    if live.pending.take().is_none() {
        return Err(ScoreError::State("No result awaiting confirmation".to_string()));
    }
    Ok(())
}

/// Remove the most recent event for `side` and rebuild both scores from the remaining history.
pub fn undo(board: &mut Scoreboard, side: Side) -> UndoOutcome {
    let Some(live) = board.live.as_mut() else {
        return UndoOutcome::Ignored;
    };
    if !live.is_accepting_input() {
        return UndoOutcome::Ignored;
    }
    let label = live.label(side);
    let Some(idx) = live
        .history
        .iter()
        .rposition(|e| e.participant_label == label)
    else {
        return UndoOutcome::Ignored;
    };
    live.history.remove(idx);
    live.recalculate_from_history();
    UndoOutcome::Undone {
        score_a: live.score_a,
        score_b: live.score_b,
    }
}

/// Clear scores and history for the next game of the series.
///
/// `start_time` is kept, so durations of later games count from the first start.
pub fn reset_match(board: &mut Scoreboard) -> Result<&LiveMatch, ScoreError> {
    let live = board
        .live
        .as_mut()
        .ok_or_else(|| ScoreError::State("No match in progress".to_string()))?;
    if live.is_series_over() {
        return Err(ScoreError::State(
            "Series is over; end the match".to_string(),
        ));
    }
    live.score_a = 0;
    live.score_b = 0;
    live.history.clear();
    live.ended = false;
    live.pending = None;
    Ok(live)
}

/// Drop the live match, returning it if there was one.
pub fn end_match(board: &mut Scoreboard) -> Option<LiveMatch> {
    board.live.take()
}
