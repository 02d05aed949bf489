// Activity record entity
// One reportable activity, immutable once built

use serde::Serialize;
use serde_json::Value;

use crate::value_objects::ActivityType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    activity_type: ActivityType,
    subject_name: String,
    drop_name: Option<String>,
    screenshot_url: Option<String>,
    occurred_at_epoch_seconds: i64,
    team_id: String,
}

impl ActivityRecord {
    pub fn new(
        activity_type: ActivityType,
        subject_name: impl Into<String>,
        drop_name: Option<String>,
        occurred_at_epoch_seconds: i64,
        team_id: impl Into<String>,
    ) -> Self {
        Self {
            activity_type,
            subject_name: subject_name.into(),
            drop_name,
            screenshot_url: None,
            occurred_at_epoch_seconds,
            team_id: team_id.into(),
        }
    }

    pub fn with_screenshot_url(self, screenshot_url: Option<String>) -> Self {
        Self {
            screenshot_url,
            ..self
        }
    }

    pub fn activity_type(&self) -> ActivityType {
        self.activity_type
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn drop_name(&self) -> Option<&str> {
        self.drop_name.as_deref()
    }

    pub fn screenshot_url(&self) -> Option<&str> {
        self.screenshot_url.as_deref()
    }

    pub fn occurred_at_epoch_seconds(&self) -> i64 {
        self.occurred_at_epoch_seconds
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn to_submission(&self, rsn: &str) -> ActivitySubmission {
        ActivitySubmission {
            rsn: rsn.to_string(),
            activity_type: self.activity_type,
            monster_name: self.subject_name.clone(),
            drop_name: self.drop_name.clone(),
            screenshot_url: self.screenshot_url.clone(),
            kill_count: 1,
            total_kc: 1,
            team_id: team_id_value(&self.team_id),
            timestamp: self.occurred_at_epoch_seconds,
        }
    }
}

/// Body of `POST /api/bingo/activity/:eventId`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySubmission {
    pub rsn: String,
    pub activity_type: ActivityType,
    pub monster_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_url: Option<String>,
    pub kill_count: u32,
    pub total_kc: u32,
    pub team_id: Value,
    pub timestamp: i64,
}

// The service stores team ids as integers; keep non-numeric ids as strings.
fn team_id_value(team_id: &str) -> Value {
    match team_id.trim().parse::<i64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::from(team_id.trim()),
    }
}
