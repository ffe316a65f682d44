//! Achievement catalog and the materialized views (achievements, streaks).

use crate::models::entity::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed set of achievements. Add a variant and a catalog entry to extend it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKey {
    FirstSpecialWin,
    TenWins,
    ComebackKing,
    Dominator,
}

/// Display data for one achievement.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct AchievementDefinition {
    pub key: AchievementKey,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub const ACHIEVEMENT_CATALOG: [AchievementDefinition; 4] = [
    AchievementDefinition {
        key: AchievementKey::TenWins,
        label: "Ten Wins Club",
        icon: "medal",
        description: "Win 10 games",
    },
    AchievementDefinition {
        key: AchievementKey::FirstSpecialWin,
        label: "First Special Win",
        icon: "fire",
        description: "Achieve your first special win",
    },
    AchievementDefinition {
        key: AchievementKey::ComebackKing,
        label: "Comeback King",
        icon: "crown",
        description: "Win after being down by 50+ points",
    },
    AchievementDefinition {
        key: AchievementKey::Dominator,
        label: "Dominator",
        icon: "trophy",
        description: "Win 5 games in a row",
    },
];

impl AchievementKey {
    pub fn definition(self) -> &'static AchievementDefinition {
        // Every key has exactly one catalog entry.
        match self {
            AchievementKey::TenWins => &ACHIEVEMENT_CATALOG[0],
            AchievementKey::FirstSpecialWin => &ACHIEVEMENT_CATALOG[1],
            AchievementKey::ComebackKing => &ACHIEVEMENT_CATALOG[2],
            AchievementKey::Dominator => &ACHIEVEMENT_CATALOG[3],
        }
    }
}

/// An unlocked achievement and the date of the game that unlocked it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub key: AchievementKey,
    pub date: DateTime<Utc>,
}

/// Unlocked achievements per entity, in unlock order.
pub type AchievementRecord = BTreeMap<EntityRef, Vec<UnlockedAchievement>>;

/// Current consecutive-win run per entity, in game-value units.
pub type StreakState = BTreeMap<EntityRef, u32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_matches_key() {
        for def in &ACHIEVEMENT_CATALOG {
            assert_eq!(def.key.definition().key, def.key);
        }
    }
}
