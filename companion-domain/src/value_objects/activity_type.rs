// Activity type value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    RaidCompletion,
    BossKill,
    Kill,
    Drop,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::RaidCompletion => "RAID_COMPLETION",
            ActivityType::BossKill => "BOSS_KILL",
            ActivityType::Kill => "KILL",
            ActivityType::Drop => "DROP",
        }
    }

    /// True for the record that counts the kill itself, as opposed to a loot drop.
    pub fn is_kill_type(&self) -> bool {
        !matches!(self, ActivityType::Drop)
    }
}

impl From<&str> for ActivityType {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "RAID_COMPLETION" => ActivityType::RaidCompletion,
            "BOSS_KILL" => ActivityType::BossKill,
            "DROP" => ActivityType::Drop,
            _ => ActivityType::Kill,
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
