//! EntityRef: the unit wins, losses, streaks and achievements are tracked over.

use crate::models::player::TeamId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A player (by name) or a team (by id).
///
/// Serialized as `player:<name>` / `team:<uuid>` so it can key JSON objects.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EntityRef {
    Player(String),
    Team(TeamId),
}

/// Which kind of entity a ranking is computed over.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Player,
    Team,
}

impl EntityRef {
    pub fn player(name: impl Into<String>) -> Self {
        EntityRef::Player(name.into())
    }

    pub fn as_team(&self) -> Option<TeamId> {
        match self {
            EntityRef::Team(id) => Some(*id),
            EntityRef::Player(_) => None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Player(name) => write!(f, "player:{}", name),
            EntityRef::Team(id) => write!(f, "team:{}", id),
        }
    }
}

/// Error parsing an entity string.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid entity reference: {0}")]
pub struct ParseEntityError(pub String);

impl FromStr for EntityRef {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("player", name)) if !name.is_empty() => Ok(EntityRef::Player(name.to_string())),
            Some(("team", id)) => Uuid::parse_str(id)
                .map(EntityRef::Team)
                .map_err(|_| ParseEntityError(s.to_string())),
            _ => Err(ParseEntityError(s.to_string())),
        }
    }
}

impl From<EntityRef> for String {
    fn from(e: EntityRef) -> Self {
        e.to_string()
    }
}

impl TryFrom<String> for EntityRef {
    type Error = ParseEntityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
