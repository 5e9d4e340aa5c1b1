//! Session freshness notifications.
//!
//! One subscription point for "this browser's session just changed": storage
//! writes and the periodic sweep both funnel through [`SessionMonitor`], which
//! re-classifies the affected scope and publishes a [`SessionEvent`] when the
//! outcome differs from what it saw last time.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{AuthService, SessionState};
use crate::storage::{Storage, StorageChange, scope_token_of};

const EVENT_CHANNEL_CAPACITY: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    SignedIn,
    SignedOut,
    Expired,
    ResetCleared,
}

impl SessionEventKind {
    /// Whether the session is gone after this event.
    pub fn ends_session(self) -> bool {
        matches!(self, SessionEventKind::SignedOut | SessionEventKind::Expired)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionEvent {
    pub token: Uuid,
    pub kind: SessionEventKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tracked {
    Active,
    MustReset,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub expired: usize,
    pub signed_out: usize,
}

#[derive(Clone)]
pub struct SessionMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    storage: Storage,
    auth: AuthService,
    events: broadcast::Sender<SessionEvent>,
    tracked: Mutex<HashMap<Uuid, Tracked>>,
}

impl SessionMonitor {
    pub fn new(storage: Storage, auth: AuthService) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(MonitorInner {
                storage,
                auth,
                events,
                tracked: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn storage_changes(&self) -> broadcast::Receiver<StorageChange> {
        self.inner.storage.subscribe()
    }

    pub fn handle_change(&self, change: &StorageChange) -> Option<SessionEvent> {
        let token = scope_token_of(&change.key)?;
        self.observe(token)
    }

    /// Re-classify every scope in storage plus every scope seen before.
    pub fn sweep(&self) -> SweepReport {
        let mut tokens = self.inner.storage.scope_tokens();
        {
            let tracked = self
                .inner
                .tracked
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            tokens.extend(tracked.keys().copied());
        }
        tokens.sort_unstable();
        tokens.dedup();

        let mut report = SweepReport {
            checked: tokens.len(),
            ..SweepReport::default()
        };
        for token in tokens {
            match self.observe(token).map(|event| event.kind) {
                Some(SessionEventKind::Expired) => report.expired += 1,
                Some(SessionEventKind::SignedOut) => report.signed_out += 1,
                _ => {}
            }
        }
        report
    }

    /// Classify one scope and publish the transition, if any.
    pub fn observe(&self, token: Uuid) -> Option<SessionEvent> {
        let scope = self.inner.storage.scoped(token);
        let current = match self.inner.auth.session_state(&scope) {
            SessionState::Valid(_) => Some(Tracked::Active),
            SessionState::MustReset(_) => Some(Tracked::MustReset),
            SessionState::Expired => {
                self.forget(token);
                return self.publish(token, SessionEventKind::Expired);
            }
            SessionState::Unauthenticated => None,
        };

        let previous = {
            let mut tracked = self
                .inner
                .tracked
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match current {
                Some(state) => tracked.insert(token, state),
                None => tracked.remove(&token),
            }
        };

        let kind = match (previous, current) {
            (None, Some(_)) => SessionEventKind::SignedIn,
            (Some(Tracked::MustReset), Some(Tracked::Active)) => SessionEventKind::ResetCleared,
            (Some(_), None) => SessionEventKind::SignedOut,
            _ => return None,
        };
        self.publish(token, kind)
    }

    fn forget(&self, token: Uuid) {
        self.inner
            .tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token);
    }

    fn publish(&self, token: Uuid, kind: SessionEventKind) -> Option<SessionEvent> {
        let event = SessionEvent { token, kind };
        let _ = self.inner.events.send(event.clone());
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{
            SESSION_TTL_MILLIS,
            tests::{T0, service},
        },
        clock::ManualClock,
        config::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD},
    };

    fn setup(production: bool) -> (Storage, AuthService, ManualClock, SessionMonitor) {
        let storage = Storage::in_memory();
        let clock = ManualClock::new(T0);
        let auth = service(production, &clock);
        let monitor = SessionMonitor::new(storage.clone(), auth.clone());
        (storage, auth, clock, monitor)
    }

    #[tokio::test]
    async fn login_and_logout_are_reported_once() {
        let (storage, auth, _clock, monitor) = setup(false);
        let token = Uuid::new_v4();
        let scope = storage.scoped(token);

        auth.login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;
        assert_eq!(
            monitor.observe(token),
            Some(SessionEvent {
                token,
                kind: SessionEventKind::SignedIn
            })
        );
        assert_eq!(monitor.observe(token), None);

        auth.logout(&scope);
        assert_eq!(
            monitor.observe(token).map(|e| e.kind),
            Some(SessionEventKind::SignedOut)
        );
        assert_eq!(monitor.observe(token), None);
    }

    #[tokio::test]
    async fn sweep_detects_expiry_without_requests() {
        let (storage, auth, clock, monitor) = setup(false);
        let token = Uuid::new_v4();
        auth.login(
            &storage.scoped(token),
            DEFAULT_ADMIN_EMAIL,
            DEFAULT_ADMIN_PASSWORD,
        )
        .await;
        monitor.sweep();

        let mut events = monitor.subscribe();
        clock.advance(SESSION_TTL_MILLIS + 1);
        let report = monitor.sweep();

        assert_eq!(
            report,
            SweepReport {
                checked: 1,
                expired: 1,
                signed_out: 0
            }
        );
        let event = events.recv().await.expect("expiry event");
        assert_eq!(event.token, token);
        assert!(event.kind.ends_session());
        assert!(storage.scope_tokens().is_empty());
    }

    #[tokio::test]
    async fn clearing_forced_reset_is_reported() {
        let (storage, auth, _clock, monitor) = setup(true);
        let token = Uuid::new_v4();
        let scope = storage.scoped(token);
        auth.login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;
        monitor.observe(token);

        assert!(auth.update_password(&scope, "brand-new-pass").await);
        assert_eq!(
            monitor.observe(token).map(|e| e.kind),
            Some(SessionEventKind::ResetCleared)
        );
    }

    #[tokio::test]
    async fn storage_changes_outside_scopes_are_ignored() {
        let (storage, _auth, _clock, monitor) = setup(false);
        let mut changes = monitor.storage_changes();
        storage.set("areas", "[]").expect("set");

        let change = changes.recv().await.expect("change");
        assert_eq!(monitor.handle_change(&change), None);
    }
}
