use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::{
        AdminUser,
        gate::{self, AdminRoute, GateDecision, LOGIN_PATH},
    },
    web::{AppState, auth::session_state},
};

/// Classify the request's session and apply the gate for `route`.
pub fn require_admin(
    state: &AppState,
    jar: &CookieJar,
    route: AdminRoute,
) -> Result<AdminUser, Redirect> {
    match gate::decide(&session_state(state, jar), route) {
        GateDecision::Allow(user) => Ok(user),
        GateDecision::Redirect(target) => Err(Redirect::to(&target)),
        GateDecision::AllowAnonymous => Err(Redirect::to(LOGIN_PATH)),
    }
}
