//! Scoreboard (the whole application state) and ScoreError.

use crate::config::ScoringRules;
use crate::models::achievement::{AchievementRecord, StreakState};
use crate::models::entity::EntityRef;
use crate::models::game::GameRecord;
use crate::models::live_match::LiveMatch;
use crate::models::player::{Player, PlayerId, Team, TeamId};
use serde::{Deserialize, Serialize};

/// Errors returned by scoreboard operations. None of them are fatal.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ScoreError {
    /// Bad, missing or duplicate input.
    #[error("{0}")]
    Validation(String),
    /// A referenced game, team or player no longer exists.
    #[error("{0} not found")]
    NotFound(String),
    /// Operation not valid in the current match state.
    #[error("{0}")]
    State(String),
    /// Persistence failed.
    #[error("storage error: {0}")]
    Store(String),
}

/// Coarse category of a [`ScoreError`], for mapping to transport status codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    State,
    Store,
}

impl ScoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ScoreError::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoreError::Validation(_) => ErrorKind::Validation,
            ScoreError::NotFound(_) => ErrorKind::NotFound,
            ScoreError::State(_) => ErrorKind::State,
            ScoreError::Store(_) => ErrorKind::Store,
        }
    }
}

/// All state owned by one scoreboard: roster, game log, derived views, live match.
///
/// `games` is the source of truth; `achievements` and `streaks` can always be rebuilt
/// from it with [`crate::recompute_all`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub games: Vec<GameRecord>,
    pub achievements: AchievementRecord,
    pub streaks: StreakState,
    /// Not persisted.
    #[serde(skip)]
    pub live: Option<LiveMatch>,
    #[serde(skip)]
    pub rules: ScoringRules,
}

impl Scoreboard {
    pub fn new(rules: ScoringRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Case-insensitive player lookup by name.
    pub fn find_player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.is_named(name))
    }

    /// Register a new player. Names are trimmed and must be unique (case-insensitive).
    pub fn add_player(&mut self, name: &str) -> Result<&Player, ScoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoreError::validation("Please enter a player name"));
        }
        if self.find_player(name).is_some() {
            return Err(ScoreError::validation(format!(
                "A player named {} already exists",
                name
            )));
        }
        self.players.push(Player::new(name));
        Ok(&self.players[self.players.len() - 1])
    }

    /// Find-or-create a player; returns the stored spelling of the name.
    pub fn ensure_player(&mut self, name: &str) -> String {
        let name = name.trim();
        if let Some(p) = self.find_player(name) {
            return p.name.clone();
        }
        log::info!("Registering new player {}", name);
        self.players.push(Player::new(name));
        name.to_string()
    }

    /// Delete a player and every team containing them.
    pub fn delete_player(&mut self, id: PlayerId) -> Result<Player, ScoreError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ScoreError::NotFound(format!("Player {}", id)))?;
        let player = self.players.remove(idx);
        let before = self.teams.len();
        self.teams.retain(|t| !t.has_player(&player.name));
        let removed = before - self.teams.len();
        if removed > 0 {
            log::info!("Deleted {} team(s) containing {}", removed, player.name);
        }
        Ok(player)
    }

    /// Return the team made of these two names, creating it if needed.
    /// Names are expected to be stored player names (see [`Self::ensure_player`]).
    pub fn find_or_create_team(&mut self, a: &str, b: &str) -> Team {
        if let Some(team) = self.teams.iter().find(|t| t.is_pair(a, b)) {
            return team.clone();
        }
        let team = Team::new(a, b);
        log::info!("Created team {}", team.label());
        self.teams.push(team.clone());
        team
    }

    /// Create (or return the existing) team for two distinct player names.
    pub fn create_team(&mut self, a: &str, b: &str) -> Result<Team, ScoreError> {
        let (a, b) = (a.trim(), b.trim());
        if a.is_empty() || b.is_empty() {
            return Err(ScoreError::validation("Please enter both player names"));
        }
        if a.to_lowercase() == b.to_lowercase() {
            return Err(ScoreError::validation(
                "Please enter two different player names",
            ));
        }
        let a = self.ensure_player(a);
        let b = self.ensure_player(b);
        Ok(self.find_or_create_team(&a, &b))
    }

    /// Delete a team. Its players are kept.
    pub fn delete_team(&mut self, id: TeamId) -> Result<Team, ScoreError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ScoreError::NotFound(format!("Team {}", id)))?;
        Ok(self.teams.remove(idx))
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Display name: the player name, "A & B" for teams, "Unknown Team" for deleted teams.
    pub fn entity_name(&self, entity: &EntityRef) -> String {
        entity_name(&self.teams, entity)
    }

    /// Drop everything: roster, games, derived views and the live match.
    pub fn reset_all(&mut self) {
        let rules = self.rules;
        *self = Self::new(rules);
    }
}

/// Display name of an entity given the team list.
pub fn entity_name(teams: &[Team], entity: &EntityRef) -> String {
    match entity {
        EntityRef::Player(name) => name.clone(),
        EntityRef::Team(id) => teams
            .iter()
            .find(|t| t.id == *id)
            .map(Team::label)
            .unwrap_or_else(|| "Unknown Team".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_player_rejects_empty_and_duplicates() {
        let mut b = Scoreboard::default();
        b.add_player("  Alice ").unwrap();
        assert_eq!(b.players[0].name, "Alice");
        assert!(matches!(b.add_player("alice"), Err(ScoreError::Validation(_))));
        assert!(matches!(b.add_player("   "), Err(ScoreError::Validation(_))));
    }

    #[test]
    fn ensure_player_returns_stored_spelling() {
        let mut b = Scoreboard::default();
        b.add_player("Alice").unwrap();
        assert_eq!(b.ensure_player("ALICE"), "Alice");
        assert_eq!(b.players.len(), 1);
        assert_eq!(b.ensure_player("Bob"), "Bob");
        assert_eq!(b.players.len(), 2);
    }

    #[test]
    fn find_or_create_team_is_order_independent() {
        let mut b = Scoreboard::default();
        let t1 = b.find_or_create_team("Bob", "Alice");
        let t2 = b.find_or_create_team("Alice", "Bob");
        assert_eq!(t1, t2);
        assert_eq!(b.teams.len(), 1);
    }

    #[test]
    fn create_team_validates_names() {
        let mut b = Scoreboard::default();
        assert!(matches!(b.create_team("Al", ""), Err(ScoreError::Validation(_))));
        assert!(matches!(b.create_team("Al", "al"), Err(ScoreError::Validation(_))));
        let t = b.create_team("Zed", "Al").unwrap();
        assert_eq!((t.player1.as_str(), t.player2.as_str()), ("Al", "Zed"));
        assert_eq!(b.players.len(), 2);
    }

    #[test]
    fn deleting_player_cascades_to_teams() {
        let mut b = Scoreboard::default();
        b.create_team("Al", "Bo").unwrap();
        b.create_team("Cy", "Di").unwrap();
        let al = b.find_player("Al").unwrap().id;
        b.delete_player(al).unwrap();
        assert_eq!(b.teams.len(), 1);
        assert_eq!(b.teams[0].label(), "Cy & Di");
        assert!(matches!(b.delete_player(al), Err(ScoreError::NotFound(_))));
    }

    #[test]
    fn deleted_team_has_unknown_name() {
        let mut b = Scoreboard::default();
        let t = b.create_team("Al", "Bo").unwrap();
        b.delete_team(t.id).unwrap();
        assert_eq!(b.entity_name(&EntityRef::Team(t.id)), "Unknown Team");
        assert_eq!(b.entity_name(&EntityRef::player("Al")), "Al");
    }
}
