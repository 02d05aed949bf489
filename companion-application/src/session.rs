use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use companion_domain::{Credential, SessionSnapshot};

const CHANNEL_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Authenticated { rsn: String },
    LoggedOut,
    Expired,
}

/// The one piece of shared mutable state: the current credential.
///
/// Writers are `establish` (successful login or restore), `logout` and
/// `expire` (a 401 seen by the sync client). Every transition is published on
/// a broadcast channel so the scheduler, persistence and UI react on their own.
pub struct Session {
    credential: RwLock<Option<Credential>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (events, _rx) = broadcast::channel(CHANNEL_BUFFER);
        Self {
            credential: RwLock::new(None),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn current(&self) -> Option<Credential> {
        self.read().clone()
    }

    pub fn bearer(&self) -> Option<String> {
        self.read().as_ref().map(|credential| credential.jwt.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(self.read().as_ref())
    }

    pub fn establish(&self, credential: Credential) {
        let rsn = credential.rsn.clone();
        let mut guard = self.write();
        *guard = Some(credential);
        info!(rsn = %rsn, "session established");
        let _ = self.events.send(SessionEvent::Authenticated { rsn });
    }

    /// Explicit logout. Returns false when there was no session.
    pub fn logout(&self) -> bool {
        let mut guard = self.write();
        if guard.take().is_none() {
            return false;
        }
        info!("session closed by logout");
        let _ = self.events.send(SessionEvent::LoggedOut);
        true
    }

    /// Guarded authenticated → unauthenticated transition after a 401.
    ///
    /// Only the credential that carried `jwt_used` is dropped, so a late 401
    /// for an old token never kills a fresh login. Concurrent callers for the
    /// same token produce exactly one `Expired` event.
    pub fn expire(&self, jwt_used: &str) -> bool {
        let mut guard = self.write();
        let matches = guard
            .as_ref()
            .map(|credential| credential.jwt == jwt_used)
            .unwrap_or(false);
        if !matches {
            return false;
        }
        *guard = None;
        warn!("credential rejected by remote service, session expired");
        let _ = self.events.send(SessionEvent::Expired);
        true
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Credential>> {
        self.credential
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Credential>> {
        self.credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
