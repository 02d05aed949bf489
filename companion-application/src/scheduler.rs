use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::queries::event_queries;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatOutcome {
    Sent,
    Suppressed,
    NotAuthenticated,
    Failed,
}

/// Time of the last claimed heartbeat slot, in scheduler-clock millis.
#[derive(Debug)]
pub struct HeartbeatState {
    last_sent_at_millis: AtomicI64,
}

impl Default for HeartbeatState {
    fn default() -> Self {
        Self {
            last_sent_at_millis: AtomicI64::new(i64::MIN),
        }
    }
}

impl HeartbeatState {
    /// Claims the slot at `now_ms` if at least `min_spacing_ms` has passed
    /// since the previous claim. Two racing callers cannot both win.
    pub fn try_claim(&self, now_ms: i64, min_spacing_ms: i64) -> bool {
        let mut last = self.last_sent_at_millis.load(Ordering::Acquire);
        loop {
            if now_ms.saturating_sub(last) < min_spacing_ms {
                return false;
            }
            match self.last_sent_at_millis.compare_exchange(
                last,
                now_ms,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(current) => last = current,
            }
        }
    }

    pub fn last_sent_at_millis(&self) -> Option<i64> {
        let value = self.last_sent_at_millis.load(Ordering::Acquire);
        (value != i64::MIN).then_some(value)
    }
}

/// Owns the heartbeat and refresh loops.
pub struct LivenessScheduler {
    origin: Instant,
    heartbeat: HeartbeatState,
    heartbeat_task: Mutex<Option<JoinHandle<()>>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for LivenessScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            heartbeat: HeartbeatState::default(),
            heartbeat_task: Mutex::new(None),
            refresh_task: Mutex::new(None),
        }
    }

    pub fn heartbeat_state(&self) -> &HeartbeatState {
        &self.heartbeat
    }

    fn now_millis(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    /// One heartbeat attempt, shared by the periodic loop and manual triggers.
    pub async fn try_heartbeat(&self, state: &AppState) -> HeartbeatOutcome {
        let Some(credential) = state.session.current() else {
            return HeartbeatOutcome::NotAuthenticated;
        };
        let spacing = state.config.heartbeat_min_spacing_millis();
        if !self.heartbeat.try_claim(self.now_millis(), spacing) {
            debug!("heartbeat suppressed, last one too recent");
            return HeartbeatOutcome::Suppressed;
        }
        if state.sync_api.send_heartbeat(&credential.rsn).await {
            state.metrics.record_heartbeat();
            HeartbeatOutcome::Sent
        } else {
            HeartbeatOutcome::Failed
        }
    }

    pub fn start_heartbeat(&self, state: AppState) {
        let mut slot = lock(&self.heartbeat_task);
        if is_running(&slot) {
            return;
        }
        let period = Duration::from_secs(state.config.heartbeat_interval_seconds.max(1));
        let jitter = jitter(state.config.loop_jitter_millis);
        info!(period_secs = period.as_secs(), "starting heartbeat loop");
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(jitter).await;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match state.scheduler.try_heartbeat(&state).await {
                    HeartbeatOutcome::Failed => warn!("heartbeat failed"),
                    outcome => debug!(?outcome, "heartbeat tick"),
                }
            }
        }));
    }

    pub fn start_refresh(&self, state: AppState) {
        let mut slot = lock(&self.refresh_task);
        if is_running(&slot) {
            return;
        }
        let period = Duration::from_secs(state.config.refresh_interval_seconds.max(1));
        let jitter = jitter(state.config.loop_jitter_millis);
        info!(period_secs = period.as_secs(), "starting refresh loop");
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(jitter).await;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !event_queries::refresh_active_events(&state).await {
                    info!("participation ended, refresh loop exiting");
                    break;
                }
            }
        }));
    }

    pub fn stop_heartbeat(&self) {
        if let Some(handle) = lock(&self.heartbeat_task).take() {
            handle.abort();
            info!("heartbeat loop stopped");
        }
    }

    pub fn stop_refresh(&self) {
        if let Some(handle) = lock(&self.refresh_task).take() {
            handle.abort();
            info!("refresh loop stopped");
        }
    }

    pub fn stop_all(&self) {
        self.stop_heartbeat();
        self.stop_refresh();
    }

    pub fn heartbeat_running(&self) -> bool {
        is_running(&lock(&self.heartbeat_task))
    }

    pub fn refresh_running(&self) -> bool {
        is_running(&lock(&self.refresh_task))
    }
}

fn lock(slot: &Mutex<Option<JoinHandle<()>>>) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn is_running(slot: &Option<JoinHandle<()>>) -> bool {
    slot.as_ref().is_some_and(|handle| !handle.is_finished())
}

fn jitter(max_millis: u64) -> Duration {
    if max_millis == 0 {
        return Duration::ZERO;
    }
    let seed = uuid::Uuid::new_v4().as_u128();
    Duration::from_millis((seed % u128::from(max_millis + 1)) as u64)
}
