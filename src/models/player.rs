//! Player and Team data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player record (names are the identity used in games).
pub type PlayerId = Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// A registered player. Names are unique, case-insensitive.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    /// Create a new player with the given (already trimmed) name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A two-player team. `player1`/`player2` are always stored in lexicographic order,
/// so the unordered name pair identifies the team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub player1: String,
    pub player2: String,
}

impl Team {
    /// Create a team from two names in any order.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (player1, player2) = canonical_pair(a.into(), b.into());
        Self {
            id: Uuid::new_v4(),
            player1,
            player2,
        }
    }

    /// True if this team is made of exactly these two names (any order).
    pub fn is_pair(&self, a: &str, b: &str) -> bool {
        let (p1, p2) = canonical_pair(a.to_string(), b.to_string());
        self.player1 == p1 && self.player2 == p2
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.player1 == name || self.player2 == name
    }

    pub fn members(&self) -> [&str; 2] {
        [&self.player1, &self.player2]
    }

    /// Display label, e.g. "Alice & Bob".
    pub fn label(&self) -> String {
        format!("{} & {}", self.player1, self.player2)
    }
}

fn canonical_pair(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_names_are_sorted() {
        let t = Team::new("Bob", "Alice");
        assert_eq!(t.player1, "Alice");
        assert_eq!(t.player2, "Bob");
        assert!(t.is_pair("Bob", "Alice"));
        assert!(t.is_pair("Alice", "Bob"));
        assert_eq!(t.label(), "Alice & Bob");
    }

    #[test]
    fn player_name_match_ignores_case() {
        let p = Player::new("Alice");
        assert!(p.is_named("aLiCe"));
        assert!(!p.is_named("Alicia"));
    }
}
