//! Persistence: whole-collection get/set by key, backed by JSON files or memory.

use crate::config::ScoringRules;
use crate::logic::recompute_all;
use crate::models::{ScoreError, Scoreboard, StreakState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const PLAYERS_KEY: &str = "players";
pub const TEAMS_KEY: &str = "teams";
pub const GAMES_KEY: &str = "games";
pub const ACHIEVEMENTS_KEY: &str = "achievements";
pub const STREAKS_KEY: &str = "streaks";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON for {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for ScoreError {
    fn from(e: StoreError) -> Self {
        ScoreError::Store(e.to_string())
    }
}

/// Key-value store of whole collections.
pub trait Store {
    /// `Ok(None)` when nothing was saved under `key` yet.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>;
}

/// One pretty-printed `<key>.json` file per collection.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates `dir` if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for JsonFileStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let raw = match fs::read_to_string(self.path(key)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            })
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        // Write then rename so a crash never leaves a half-written collection.
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, self.path(key)).map_err(io_err)
    }
}

/// In-process store holding JSON values.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values
            .get(key)
            .map(|v| {
                serde_json::from_value(v.clone()).map_err(|source| StoreError::Json {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        self.values
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(key.to_string(), json);
        Ok(())
    }
}

/// Load every collection. Missing collections start empty.
///
/// Achievements and streaks are always rebuilt from the games, so stored views that are
/// missing or out of step with the game log never reach the running board.
pub fn load_scoreboard<S: Store>(store: &S, rules: ScoringRules) -> Result<Scoreboard, StoreError> {
    let mut board = Scoreboard::new(rules);
    board.players = store.load(PLAYERS_KEY)?.unwrap_or_default();
    board.teams = store.load(TEAMS_KEY)?.unwrap_or_default();
    board.games = store.load(GAMES_KEY)?.unwrap_or_default();
    let stored_streaks: Option<StreakState> = store.load(STREAKS_KEY)?;
    recompute_all(&mut board);
    if stored_streaks.is_some_and(|s| s != board.streaks) {
        log::warn!("Stored streaks were out of step with the game log; rebuilt");
    }
    log::info!(
        "Loaded {} player(s), {} team(s), {} game(s)",
        board.players.len(),
        board.teams.len(),
        board.games.len()
    );
    Ok(board)
}

/// Save every persisted collection (the live match is never saved).
pub fn save_scoreboard<S: Store>(store: &S, board: &Scoreboard) -> Result<(), StoreError> {
    store.save(PLAYERS_KEY, &board.players)?;
    store.save(TEAMS_KEY, &board.teams)?;
    store.save(GAMES_KEY, &board.games)?;
    store.save(ACHIEVEMENTS_KEY, &board.achievements)?;
    store.save(STREAKS_KEY, &board.streaks)
}
