// Competition-side read models, already normalized from the wire

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupStatus {
    pub signed_up: bool,
    pub accepted: bool,
    pub message: String,
}

impl SignupStatus {
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            signed_up: false,
            accepted: false,
            message: message.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.signed_up, self.accepted) {
            (true, true) => "Signed up & Accepted",
            (true, false) => "Signed up",
            _ => "Not signed up",
        }
    }
}

pub const DEFAULT_TOTAL_TILES: i64 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BingoEvent {
    pub bingo_id: String,
    pub name: String,
    pub group_id: String,
    pub duration_days: i64,
    pub days_remaining: i64,
    pub total_tiles: i64,
    /// True unless the service says otherwise; the active-events listing only
    /// carries running events, so a missing flag counts as active.
    pub is_active: bool,
    pub prize_pool: String,
    pub participants: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEvents {
    pub has_active_event: bool,
    pub events: Vec<BingoEvent>,
}

impl ActiveEvents {
    pub fn from_events(events: Vec<BingoEvent>) -> Self {
        Self {
            has_active_event: !events.is_empty(),
            events,
        }
    }

    pub fn find(&self, bingo_id: &str) -> Option<&BingoEvent> {
        self.events.iter().find(|event| event.bingo_id == bingo_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub player_rsn: String,
    pub activity_type: String,
    pub timestamp: i64,
    pub monster_name: String,
    pub drop_name: Option<String>,
    pub total_kc: i64,
    pub screenshot_url: Option<String>,
    pub team_id: Option<String>,
}

impl ActivityLogEntry {
    pub fn display_time(&self) -> String {
        Local
            .timestamp_opt(self.timestamp, 0)
            .single()
            .map(|time| time.format("%H:%M-%d/%m").to_string())
            .unwrap_or_default()
    }
}
