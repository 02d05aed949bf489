use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use companion_domain::{GameEvent, GameEventEnvelope, RuntimeConfig};

/// Local callers must present the configured api token, if any.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    authorize_token(config, extract_bearer(headers).as_deref())
}

pub fn authorize_token(config: &RuntimeConfig, presented: Option<&str>) -> bool {
    match &config.api_token {
        Some(api_token) => presented.map(|token| token == api_token).unwrap_or(false),
        None => true,
    }
}

/// Decodes an ingest body (JSON, optionally gzip) into game events.
/// Events without an `occurredAt` are stamped with `received_at_millis`.
pub fn parse_game_events(headers: &HeaderMap, body: &[u8], received_at_millis: i64) -> Result<Vec<GameEvent>> {
    let content = maybe_gunzip(headers, body)?;
    let envelope: GameEventEnvelope = serde_json::from_str(&content)?;
    Ok(envelope
        .events
        .into_iter()
        .map(|payload| payload.into_event(received_at_millis))
        .collect())
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("").eq_ignore_ascii_case("gzip") {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
