use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use companion_domain::{current_millis, ActivityRecord, ActivityType, DedupKey, GameEvent};

use crate::{AppState, EvidenceContext};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub accepted: usize,
    pub dispatched: usize,
    pub suppressed: usize,
    pub dropped: usize,
    pub ignored: usize,
}

/// Classifies incoming game events and queues the reportable ones.
///
/// Never waits on the network: submission and evidence run on the worker
/// pool. Events are ignored while not participating or without a team.
pub async fn handle_game_events(state: &AppState, events: Vec<GameEvent>) -> DispatchSummary {
    state.metrics.record_events(events.len());
    let mut summary = DispatchSummary {
        accepted: events.len(),
        ..DispatchSummary::default()
    };

    let event_id = {
        let status = state.participation.read().await;
        status.active_event_id().map(str::to_string)
    };
    let Some(event_id) = event_id else {
        debug!(count = events.len(), "not participating, ignoring game events");
        summary.ignored = events.len();
        return summary;
    };
    let Some(credential) = state.session.current() else {
        debug!(count = events.len(), "no session, ignoring game events");
        summary.ignored = events.len();
        return summary;
    };
    if !credential.has_team() {
        warn!(rsn = %credential.rsn, "no team id on session, ignoring game events");
        summary.ignored = events.len();
        return summary;
    }

    let now = current_millis();
    let bucket_seconds = state.config.dedup_bucket_seconds as i64;
    for event in &events {
        let records = state.classifier.classify(event, &credential.team_id);
        if records.is_empty() {
            summary.ignored += 1;
            continue;
        }
        for record in records {
            let key = DedupKey::for_record(&record, bucket_seconds);
            if !state.deduplicator.check_and_record(key.clone(), now) {
                debug!(key = %key, "duplicate activity suppressed");
                state.metrics.record_suppressed();
                summary.suppressed += 1;
                continue;
            }
            if dispatch(state, &event_id, &credential.rsn, record) {
                state.metrics.record_reported();
                summary.dispatched += 1;
            } else {
                // nothing was sent, so a resend must not be suppressed
                state.deduplicator.forget(&key, now);
                state.metrics.record_job_dropped();
                summary.dropped += 1;
            }
        }
    }
    summary
}

/// Evicts expired dedup keys once per window so an idle companion does not
/// hold stale keys until the next game event arrives.
pub fn spawn_dedup_sweeper(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.dedup_window_seconds.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = state.deduplicator.sweep(current_millis());
            if evicted > 0 {
                debug!(evicted, remaining = state.deduplicator.len(), "dedup sweep");
            }
        }
    })
}

fn dispatch(state: &AppState, event_id: &str, rsn: &str, record: ActivityRecord) -> bool {
    let span = info_span!(
        "activity_job",
        job_id = %Uuid::new_v4(),
        activity = %record.activity_type(),
        subject = %record.subject_name(),
    );
    let job_state = state.clone();
    let ctx = EvidenceContext {
        event_id: event_id.to_string(),
        rsn: rsn.to_string(),
    };
    state
        .workers
        .try_submit(submit_activity(job_state, ctx, record).instrument(span))
}

async fn submit_activity(state: AppState, ctx: EvidenceContext, record: ActivityRecord) {
    let record = if record.activity_type() == ActivityType::Drop {
        let record = state.evidence.attach_evidence(record, &ctx).await;
        if record.screenshot_url().is_some() {
            state.metrics.record_evidence_uploaded();
        }
        record
    } else {
        record
    };

    let ok = state
        .sync_api
        .submit_activity(&ctx.event_id, &ctx.rsn, &record)
        .await;
    state.metrics.record_submission(ok);
    if !ok {
        warn!("activity submission failed, not retrying");
        return;
    }
    info!(drop = ?record.drop_name(), "activity submitted");
    let outcome = state.scheduler.try_heartbeat(&state).await;
    debug!(?outcome, "post-submission heartbeat");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use companion_domain::{Credential, LootItem, RuntimeConfig};
    use tokio::sync::Notify;

    use super::*;
    use crate::testing::{test_state, FakeSync};

    async fn participating_state(sync: Arc<FakeSync>) -> AppState {
        participating_state_with(RuntimeConfig::default(), sync).await
    }

    async fn participating_state_with(config: RuntimeConfig, sync: Arc<FakeSync>) -> AppState {
        let state = test_state(config, sync);
        state.session.establish(Credential::new("Zezima", "jwt", "7"));
        let mut status = state.participation.write().await;
        status.participating = true;
        status.event_id = Some("evt-1".to_string());
        drop(status);
        state
    }

    async fn wait_for_submissions(sync: &FakeSync, expected: usize) {
        for _ in 0..100 {
            if sync.submissions.lock().await.len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn ignores_events_when_not_participating() {
        let sync = Arc::new(FakeSync::default());
        let state = test_state(RuntimeConfig::default(), sync);
        let summary = handle_game_events(&state, vec![GameEvent::kill("Zulrah", 1_000)]).await;
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.dispatched, 0);
    }

    #[tokio::test]
    async fn boss_kill_with_valuable_drop_submits_both() {
        let sync = Arc::new(FakeSync::default());
        let state = participating_state(sync.clone()).await;
        let event = GameEvent::loot(
            "Vorkath",
            vec![
                LootItem::new("Draconic visage", 1, 5_000_000),
                LootItem::new("Superior dragon bones", 2, 15_000),
            ],
            1_700_000_000_000,
        );

        let summary = handle_game_events(&state, vec![event]).await;
        assert_eq!(summary.dispatched, 2);
        wait_for_submissions(&sync, 2).await;

        let submissions = sync.submissions.lock().await;
        assert_eq!(submissions.len(), 2);
        let types: Vec<ActivityType> = submissions
            .iter()
            .map(|(_, _, record)| record.activity_type())
            .collect();
        assert!(types.contains(&ActivityType::BossKill));
        assert!(types.contains(&ActivityType::Drop));
        assert!(submissions.iter().all(|(event_id, rsn, _)| event_id == "evt-1" && rsn == "Zezima"));
    }

    #[tokio::test]
    async fn repeated_event_in_window_is_suppressed() {
        let sync = Arc::new(FakeSync::default());
        let state = participating_state(sync.clone()).await;
        let event = GameEvent::kill("Zulrah", 1_700_000_000_000);

        let first = handle_game_events(&state, vec![event.clone()]).await;
        let second = handle_game_events(&state, vec![event]).await;

        assert_eq!(first.dispatched, 1);
        assert_eq!(second.suppressed, 1);
        wait_for_submissions(&sync, 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(sync.submissions.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_team_blocks_reporting() {
        let sync = Arc::new(FakeSync::default());
        let state = participating_state(sync).await;
        state.session.establish(Credential::new("Zezima", "jwt", ""));
        let summary = handle_game_events(&state, vec![GameEvent::kill("Zulrah", 1_000)]).await;
        assert_eq!(summary.ignored, 1);
    }

    #[tokio::test]
    async fn dropped_job_does_not_suppress_resend() {
        let sync = Arc::new(FakeSync::default());
        let config = RuntimeConfig {
            worker_count: 1,
            queue_capacity: 1,
            ..RuntimeConfig::default()
        };
        let state = participating_state_with(config, sync.clone()).await;

        // occupy the only worker, then fill the only queue slot
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        assert!(state.workers.try_submit({
            let started = started.clone();
            let release = release.clone();
            async move {
                started.notify_one();
                release.notified().await;
            }
        }));
        started.notified().await;
        assert!(state.workers.try_submit(async {}));

        let event = GameEvent::kill("Zulrah", 1_700_000_000_000);
        let first = handle_game_events(&state, vec![event.clone()]).await;
        assert_eq!(first.dropped, 1);

        release.notify_one();
        for _ in 0..100 {
            if state.workers.queued() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let second = handle_game_events(&state, vec![event]).await;
        assert_eq!(second.dispatched, 1);
        assert_eq!(second.suppressed, 0);
        wait_for_submissions(&sync, 1).await;
        assert_eq!(sync.submissions.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn sweeper_evicts_expired_keys() {
        let state = test_state(RuntimeConfig::default(), Arc::new(FakeSync::default()));
        let stale_at = current_millis() - 2 * state.config.dedup_window_millis();
        let key = DedupKey::for_record(
            &ActivityRecord::new(ActivityType::Kill, "Zulrah", None, stale_at / 1000, "7"),
            state.config.dedup_bucket_seconds as i64,
        );
        assert!(state.deduplicator.check_and_record(key, stale_at));
        assert_eq!(state.deduplicator.len(), 1);

        let sweeper = spawn_dedup_sweeper(state.clone());
        for _ in 0..100 {
            if state.deduplicator.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        sweeper.abort();
        assert!(state.deduplicator.is_empty());
    }
}
