// Classification ruleset entity

use serde::{Deserialize, Serialize};

pub const DEFAULT_VALUE_THRESHOLD: i64 = 1_000_000;

const RAID_BOSSES: &[&str] = &[
    // Theatre of Blood
    "Maiden of Sugadinti",
    "Xarpus",
    "Verzik Vitur",
    // Chambers of Xeric
    "Great Olm",
    // Tombs of Amascut
    "Warden",
    "Tumeken",
];

const BOSSES: &[&str] = &[
    "King Black Dragon",
    "Corporeal Beast",
    "Commander Zilyana",
    "General Graardor",
    "Kree'arra",
    "K'ril Tsutsaroth",
    "Kalphite Queen",
    "Chaos Elemental",
    "Zulrah",
    "Vorkath",
    "Alchemical Hydra",
    "The Nightmare",
    "Phosani's Nightmare",
    "Cerberus",
    "Abyssal Sire",
    "Kraken",
    "Thermonuclear Smoke Devil",
];

const BOSS_FAMILIES: &[&str] = &["Dagannoth"];

const RARE_ITEMS: &[&str] = &[
    "Dragon warhammer",
    "Twisted bow",
    "Scythe",
    "Rapier",
    "Avernic",
    "Primordial",
    "Eternal",
    "Pegasian",
    "Armadyl",
    "Bandos",
    "Zamorak",
    "Saradomin",
    "Elysian",
    "Spectral",
    "Arcane",
];

const PET_KEYWORDS: &[&str] = &["pet", "puppy", "kitten", "heron", "beaver", "squirrel"];

/// Static classification tables.
///
/// `raid_bosses`, `boss_families`, `rare_items` and `pet_keywords` match as
/// substrings; `bosses` must match the whole name. Every field may be
/// overridden from the ruleset file, missing fields keep the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub raid_bosses: Vec<String>,
    pub bosses: Vec<String>,
    pub boss_families: Vec<String>,
    pub rare_items: Vec<String>,
    pub pet_keywords: Vec<String>,
    pub value_threshold: i64,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            raid_bosses: to_owned(RAID_BOSSES),
            bosses: to_owned(BOSSES),
            boss_families: to_owned(BOSS_FAMILIES),
            rare_items: to_owned(RARE_ITEMS),
            pet_keywords: to_owned(PET_KEYWORDS),
            value_threshold: DEFAULT_VALUE_THRESHOLD,
        }
    }
}

impl Ruleset {
    /// Trims entries, drops blanks and restores a sane threshold.
    pub fn normalized(mut self) -> Self {
        for list in [
            &mut self.raid_bosses,
            &mut self.bosses,
            &mut self.boss_families,
            &mut self.rare_items,
            &mut self.pet_keywords,
        ] {
            let cleaned = std::mem::take(list)
                .into_iter()
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect();
            *list = cleaned;
        }
        if self.value_threshold <= 0 {
            self.value_threshold = DEFAULT_VALUE_THRESHOLD;
        }
        self
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
