//! LiveMatch: the single in-progress game (never persisted).

use crate::models::entity::EntityRef;
use crate::models::game::{GameMode, WinType};
use crate::models::player::Team;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two sides of a live match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Who plays on a side: a single player or a resolved team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Participant {
    Player { name: String },
    Team { team: Team },
}

impl Participant {
    /// Label recorded on score events, e.g. "Alice" or "Alice & Bob".
    pub fn label(&self) -> String {
        match self {
            Participant::Player { name } => name.clone(),
            Participant::Team { team } => team.label(),
        }
    }

    pub fn entity(&self) -> EntityRef {
        match self {
            Participant::Player { name } => EntityRef::Player(name.clone()),
            Participant::Team { team } => EntityRef::Team(team.id),
        }
    }
}

/// A single score change with the scores right after it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub participant_label: String,
    /// Effective change (after clamping at 0).
    pub points_delta: i32,
    pub score_a_snapshot: u32,
    pub score_b_snapshot: u32,
}

/// Live scoring state for one game (and the best-of series it belongs to).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiveMatch {
    pub mode: GameMode,
    pub side_a: Participant,
    pub side_b: Participant,
    pub score_a: u32,
    pub score_b: u32,
    pub history: Vec<ScoreEvent>,
    pub start_time: DateTime<Utc>,
    pub ended: bool,
    /// Set when a terminal score is reached and awaits confirm/correct.
    pub pending: Option<WinType>,
    /// Series length (odd, >= 1).
    pub best_of: u32,
    /// Series tallies in game-value units.
    pub series_a: u32,
    pub series_b: u32,
}

impl LiveMatch {
    pub fn new(
        mode: GameMode,
        side_a: Participant,
        side_b: Participant,
        best_of: u32,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            mode,
            side_a,
            side_b,
            score_a: 0,
            score_b: 0,
            history: Vec::new(),
            start_time,
            ended: false,
            pending: None,
            best_of,
            series_a: 0,
            series_b: 0,
        }
    }

    pub fn participant(&self, side: Side) -> &Participant {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn label(&self, side: Side) -> String {
        self.participant(side).label()
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    pub fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::A => &mut self.score_a,
            Side::B => &mut self.score_b,
        }
    }

    /// Side an event belongs to, by label equality against the current sides.
    pub fn side_of(&self, event: &ScoreEvent) -> Option<Side> {
        if event.participant_label == self.label(Side::A) {
            Some(Side::A)
        } else if event.participant_label == self.label(Side::B) {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Rebuild both scores and every snapshot by replaying history in order.
    pub fn recalculate_from_history(&mut self) {
        let label_a = self.label(Side::A);
        let label_b = self.label(Side::B);
        let (mut a, mut b) = (0u32, 0u32);
        for event in &mut self.history {
            if event.participant_label == label_a {
                a = a.saturating_add_signed(event.points_delta);
            } else if event.participant_label == label_b {
                b = b.saturating_add_signed(event.points_delta);
            }
            event.score_a_snapshot = a;
            event.score_b_snapshot = b;
        }
        self.score_a = a;
        self.score_b = b;
    }

    /// Series wins a side needs to take the match.
    pub fn wins_needed(&self) -> u32 {
        self.best_of.div_ceil(2)
    }

    pub fn is_series_over(&self) -> bool {
        let needed = self.wins_needed();
        self.series_a >= needed || self.series_b >= needed
    }

    pub fn is_accepting_input(&self) -> bool {
        !self.ended && self.pending.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn live() -> LiveMatch {
        LiveMatch::new(
            GameMode::Single,
            Participant::Player { name: "Ann".into() },
            Participant::Player { name: "Ben".into() },
            3,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    fn event(label: &str, delta: i32) -> ScoreEvent {
        ScoreEvent {
            participant_label: label.into(),
            points_delta: delta,
            score_a_snapshot: 999,
            score_b_snapshot: 999,
        }
    }

    #[test]
    fn replay_rebuilds_scores_and_snapshots() {
        let mut m = live();
        m.history = vec![event("Ann", 20), event("Ben", 15), event("Ann", -5)];
        m.recalculate_from_history();
        assert_eq!((m.score_a, m.score_b), (15, 15));
        assert_eq!(m.history[0].score_a_snapshot, 20);
        assert_eq!(m.history[1].score_b_snapshot, 15);
        assert_eq!(m.history[2].score_a_snapshot, 15);
    }

    #[test]
    fn best_of_three_needs_two() {
        let mut m = live();
        assert_eq!(m.wins_needed(), 2);
        m.series_b = 2;
        assert!(m.is_series_over());
    }
}
