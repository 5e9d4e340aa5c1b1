use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use axum_extra::extract::cookie::CookieJar;
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{
        AdminUser, SessionState,
        monitor::{SessionEvent, SessionEventKind},
    },
    web::{AppState, auth::session_scope},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: &'static str,
    pub authenticated: bool,
    pub user: Option<AdminUser>,
    pub expires_at: Option<i64>,
}

/// JSON view of the caller's session classification.
pub async fn session_snapshot(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<SessionSnapshot> {
    let Some(scope) = session_scope(&state, &jar) else {
        return Json(SessionSnapshot {
            state: SessionState::Unauthenticated.as_str(),
            authenticated: false,
            user: None,
            expires_at: None,
        });
    };

    let session = state.auth().session_state(&scope);
    Json(SessionSnapshot {
        state: session.as_str(),
        authenticated: session.user().is_some(),
        user: session.user().cloned(),
        expires_at: state.auth().expires_at(&scope),
    })
}

/// Server-sent session events for the caller's scope.
///
/// A browser without a live session gets one terminal event straight away so the
/// page script can leave.
pub async fn session_events(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let monitor = state.monitor().clone();
    let mut rx = monitor.subscribe();
    let scope = session_scope(&state, &jar);
    let initial = match &scope {
        Some(scope) => match state.auth().session_state(scope) {
            SessionState::Valid(_) | SessionState::MustReset(_) => None,
            SessionState::Expired => Some(SessionEventKind::Expired),
            SessionState::Unauthenticated => Some(SessionEventKind::SignedOut),
        },
        None => Some(SessionEventKind::SignedOut),
    };
    let token = scope.map(|scope| scope.token());
    if let Some(token) = token {
        monitor.observe(token);
    }

    let stream = async_stream::stream! {
        match (initial, token) {
            (Some(kind), _) => {
                if let Some(event) = encode(token, kind) {
                    yield Ok(event);
                }
            }
            (None, Some(token)) => loop {
                let event = match rx.recv().await {
                    Ok(event) if event.token == token => event,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, %token, "session event stream lagged, re-checking scope");
                        match monitor.observe(token) {
                            Some(event) => event,
                            None => continue,
                        }
                    }
                    Err(RecvError::Closed) => break,
                };

                let ends = event.kind.ends_session();
                if let Some(sse) = encode(Some(token), event.kind) {
                    yield Ok(sse);
                }
                if ends {
                    break;
                }
            },
            (None, None) => {}
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn encode(token: Option<Uuid>, kind: SessionEventKind) -> Option<Event> {
    let payload = match token {
        Some(token) => serde_json::to_string(&SessionEvent { token, kind }),
        None => serde_json::to_string(&serde_json::json!({ "kind": kind })),
    };
    payload
        .ok()
        .map(|data| Event::default().event("session").data(data))
}
