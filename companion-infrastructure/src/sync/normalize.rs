// Tolerant readers for the competition service's response shapes

use serde_json::{Map, Value};

use companion_domain::{
    ActiveEvents, ActivityLogEntry, BingoEvent, Credential, SignupStatus, DEFAULT_TOTAL_TILES,
};

const PRIZE_POOL_KEYS: [&str; 6] = ["prizePool", "prizepool", "prize_pool", "prize", "prizeAmount", "reward"];

/// Accepts a bare array, `{events}`, `{hasActiveEvent, activeEvents}` or any
/// object whose first array-valued field holds the events.
pub fn active_events(body: &Value) -> Option<ActiveEvents> {
    match body {
        Value::Array(items) => Some(ActiveEvents::from_events(bingo_events(items))),
        Value::Object(map) => {
            let has_active = map.get("hasActiveEvent").and_then(Value::as_bool);
            if let Some(Value::Array(items)) = map.get("activeEvents") {
                if has_active != Some(false) {
                    return Some(ActiveEvents::from_events(bingo_events(items)));
                }
            }
            if has_active == Some(false) {
                return Some(ActiveEvents::default());
            }
            if let Some(Value::Array(items)) = map.get("events") {
                return Some(ActiveEvents::from_events(bingo_events(items)));
            }
            let first_array = map.values().find_map(|value| value.as_array());
            Some(ActiveEvents::from_events(
                first_array.map(|items| bingo_events(items)).unwrap_or_default(),
            ))
        }
        _ => None,
    }
}

fn bingo_events(items: &[Value]) -> Vec<BingoEvent> {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(bingo_event)
        .collect()
}

fn bingo_event(event: &Map<String, Value>) -> Option<BingoEvent> {
    let bingo_id = string_field(event, &["bingoId", "bingoid", "id"]).filter(|id| !id.is_empty())?;
    let duration_days = int_field(event, &["durationDays", "durationdays"]).unwrap_or(0);
    Some(BingoEvent {
        bingo_id,
        name: string_field(event, &["name"]).unwrap_or_default(),
        group_id: string_field(event, &["groupId", "groupid"]).unwrap_or_default(),
        duration_days,
        days_remaining: int_field(event, &["daysRemaining", "daysremaining"]).unwrap_or(duration_days),
        total_tiles: int_field(event, &["totalTiles", "totaltiles"]).unwrap_or(DEFAULT_TOTAL_TILES),
        is_active: bool_field(event, &["isActive", "isactive"]).unwrap_or(true),
        prize_pool: PRIZE_POOL_KEYS
            .iter()
            .filter_map(|key| string_field(event, &[key]))
            .find(|value| !value.is_empty())
            .unwrap_or_default(),
        participants: int_field(event, &["participants", "participantCount"]).unwrap_or(0),
    })
}

/// `{activities: [...]}` or a bare array.
pub fn activity_log(body: &Value) -> Option<Vec<ActivityLogEntry>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(map) => map.get("activities")?.as_array()?,
        _ => return None,
    };
    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(activity_entry)
            .collect(),
    )
}

fn activity_entry(entry: &Map<String, Value>) -> Option<ActivityLogEntry> {
    Some(ActivityLogEntry {
        player_rsn: string_field(entry, &["playerRsn", "rsn"])?,
        activity_type: string_field(entry, &["activityType"]).unwrap_or_default(),
        timestamp: int_field(entry, &["timestamp"]).unwrap_or(0),
        monster_name: string_field(entry, &["monsterName"]).unwrap_or_default(),
        drop_name: string_field(entry, &["dropName"]).filter(|name| !name.is_empty()),
        total_kc: int_field(entry, &["totalKc"]).unwrap_or(0),
        screenshot_url: string_field(entry, &["screenshotUrl"]).filter(|url| !url.is_empty()),
        team_id: string_field(entry, &["teamId"]),
    })
}

/// A bare boolean means signed up and accepted alike.
pub fn signup_status(body: &Value) -> Option<SignupStatus> {
    match body {
        Value::Bool(flag) => Some(SignupStatus {
            signed_up: *flag,
            accepted: *flag,
            message: String::new(),
        }),
        Value::Object(map) => {
            let signed_up = bool_field(map, &["signedUp", "isSignedUp", "signed_up"])?;
            Some(SignupStatus {
                signed_up,
                accepted: bool_field(map, &["accepted", "isAccepted"]).unwrap_or(false),
                message: string_field(map, &["message"]).unwrap_or_default(),
            })
        }
        _ => None,
    }
}

/// `{success, value}`, a JSON string, or a plain-text body.
pub fn image_host_token(body: &Value) -> Option<String> {
    let token = match body {
        Value::String(token) => token.clone(),
        Value::Object(map) => {
            if map.get("success").and_then(Value::as_bool) == Some(false) {
                return None;
            }
            string_field(map, &["value", "clientId"])?
        }
        _ => return None,
    };
    let token = token.trim().trim_matches('"').trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// `{token, user: {teamId}}`; a missing team id yields an empty one.
pub fn credential(rsn: &str, body: &Value) -> Option<Credential> {
    let map = body.as_object()?;
    let jwt = string_field(map, &["token", "jwt", "accessToken"]).filter(|jwt| !jwt.is_empty())?;
    let team_id = map
        .get("user")
        .and_then(Value::as_object)
        .and_then(|user| string_field(user, &["teamId", "team_id"]))
        .or_else(|| string_field(map, &["teamId"]))
        .unwrap_or_default();
    Some(Credential::new(rsn, jwt, team_id))
}

/// First `max_chars` characters of a response body, for logs.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(value) => Some(value.trim().to_string()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    })
}

fn int_field(map: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::Number(value) => value.as_i64().or_else(|| value.as_f64().map(|v| v as i64)),
        Value::String(value) => value.trim().parse().ok(),
        _ => None,
    })
}

fn bool_field(map: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::Bool(value) => Some(*value),
        Value::String(value) => value.trim().parse().ok(),
        _ => None,
    })
}
