// Game event entity
// Raw kill / loot notifications coming from the game client

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventKind {
    Kill,
    LootDrop,
}

impl From<&str> for GameEventKind {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "LOOT_DROP" | "LOOTDROP" | "LOOT" => GameEventKind::LootDrop,
            _ => GameEventKind::Kill,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub unit_value: i64,
}

impl LootItem {
    pub fn new(name: impl Into<String>, quantity: i64, unit_value: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_value,
        }
    }

    pub fn total_value(&self) -> i64 {
        self.unit_value.saturating_mul(self.quantity)
    }
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    pub subject_name: String,
    pub kind: GameEventKind,
    pub loot_items: Vec<LootItem>,
    pub occurred_at_millis: i64,
}

impl GameEvent {
    pub fn kill(subject_name: impl Into<String>, occurred_at_millis: i64) -> Self {
        Self {
            subject_name: subject_name.into(),
            kind: GameEventKind::Kill,
            loot_items: Vec::new(),
            occurred_at_millis,
        }
    }

    pub fn loot(
        subject_name: impl Into<String>,
        loot_items: Vec<LootItem>,
        occurred_at_millis: i64,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            kind: GameEventKind::LootDrop,
            loot_items,
            occurred_at_millis,
        }
    }
}

/// Wire form accepted from the game-side plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEventPayload {
    pub subject_name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub loot_items: Vec<LootItem>,
    #[serde(default)]
    pub occurred_at: Option<i64>,
}

impl GameEventPayload {
    pub fn into_event(self, received_at_millis: i64) -> GameEvent {
        let kind = match self.kind.as_deref() {
            Some(raw) => GameEventKind::from(raw),
            None if !self.loot_items.is_empty() => GameEventKind::LootDrop,
            None => GameEventKind::Kill,
        };
        GameEvent {
            subject_name: self.subject_name,
            kind,
            loot_items: self.loot_items,
            occurred_at_millis: self.occurred_at.unwrap_or(received_at_millis),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameEventEnvelope {
    #[serde(default)]
    pub events: Vec<GameEventPayload>,
}
