// Participation status snapshot read by the UI

use serde::{Deserialize, Serialize};

use crate::entities::{ActivityLogEntry, BingoEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Unknown,
    Online,
    Degraded,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationStatus {
    pub participating: bool,
    pub event_id: Option<String>,
    pub events: Vec<BingoEvent>,
    pub activity_log: Vec<ActivityLogEntry>,
    pub connectivity: Connectivity,
    pub last_refresh_at: Option<i64>,
}

impl ParticipationStatus {
    pub fn active_event_id(&self) -> Option<&str> {
        if self.participating {
            self.event_id.as_deref()
        } else {
            None
        }
    }

    pub fn clear_selection(&mut self) {
        self.participating = false;
        self.event_id = None;
        self.activity_log.clear();
    }
}
