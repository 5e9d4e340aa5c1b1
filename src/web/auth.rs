use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        SESSION_TTL_HOURS, SessionState,
        gate::{self, AdminRoute, DASHBOARD_PATH, GateDecision, LOGIN_PATH, RESET_PATH},
    },
    storage::ScopedStorage,
    web::{
        AppState, admin::require_admin, admin_utils::compose_flash_message, escape_html,
        templates::render_admin_auth_page,
    },
};

pub const SESSION_COOKIE: &str = "sahli_admin";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

#[derive(Default, Deserialize)]
pub struct AuthPageQuery {
    pub status: Option<String>,
    pub error: Option<String>,
    pub forced: Option<String>,
    pub token: Option<String>,
}

/// Storage scope addressed by the browser's session cookie, if it carries one.
pub fn session_scope(state: &AppState, jar: &CookieJar) -> Option<ScopedStorage> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let token = Uuid::parse_str(cookie.value()).ok()?;
    Some(state.storage().scoped(token))
}

pub fn session_state(state: &AppState, jar: &CookieJar) -> SessionState {
    match session_scope(state, jar) {
        Some(scope) => state.auth().session_state(&scope),
        None => SessionState::Unauthenticated,
    }
}

/// Gate for the signed-out views: a live session is sent onward instead.
fn gate_public(state: &AppState, jar: &CookieJar, route: AdminRoute) -> Result<(), Redirect> {
    match gate::decide(&session_state(state, jar), route) {
        GateDecision::Redirect(target) => Err(Redirect::to(&target)),
        GateDecision::Allow(_) | GateDecision::AllowAnonymous => Ok(()),
    }
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<AuthPageQuery>,
) -> Result<Html<String>, Redirect> {
    gate_public(&state, &jar, AdminRoute::Login)?;

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    Ok(Html(render_login_page(&flash, "")))
}

pub async fn process_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let email = form.email.trim();
    let token = Uuid::new_v4();
    let scope = state.storage().scoped(token);

    let outcome = state.auth().login(&scope, email, &form.password).await;
    let Some(user) = outcome.user else {
        let flash = compose_flash_message(None, Some("invalid_credentials"));
        return Err((
            StatusCode::UNAUTHORIZED,
            Html(render_login_page(&flash, email)),
        ));
    };

    // A browser holds one session: the one it replaces is signed out.
    if let Some(previous) = session_scope(&state, &jar) {
        state.auth().logout(&previous);
    }

    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(state.config().production);
    cookie.set_max_age(CookieDuration::hours(SESSION_TTL_HOURS));

    let target = if user.must_reset_password {
        format!("{RESET_PATH}?forced=1")
    } else {
        DASHBOARD_PATH.to_string()
    };
    Ok((jar.add(cookie), Redirect::to(&target)))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(scope) = session_scope(&state, &jar) {
        state.auth().logout(&scope);
        info!(token = %scope.token(), "admin signed out");
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));

    (
        jar.remove(removal),
        Redirect::to(&format!("{LOGIN_PATH}?status=logged_out")),
    )
}

pub async fn forgot_password_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<AuthPageQuery>,
) -> Result<Html<String>, Redirect> {
    gate_public(&state, &jar, AdminRoute::ForgotPassword)?;

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    let form = r#"<p>Enter the administrator email and we will pass the request on.</p>
            <form method="post" action="/admin/forgot-password">
                <label for="email">Email</label>
                <input id="email" name="email" type="email" required autocomplete="email">
                <button type="submit">Request reset</button>
            </form>
            <div class="links"><a href="/admin/login">Back to sign in</a></div>"#;
    Ok(Html(render_admin_auth_page("Forgot password", &flash, form)))
}

pub async fn process_forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Redirect {
    let email = form.email.trim();
    if email.is_empty() {
        return Redirect::to("/admin/forgot-password?error=missing_email");
    }

    state.auth().request_password_reset(email).await;
    Redirect::to(&format!("{LOGIN_PATH}?status=reset_requested"))
}

pub async fn reset_password_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<AuthPageQuery>,
) -> Result<Html<String>, Redirect> {
    let user = require_admin(&state, &jar, AdminRoute::ResetPassword)?;

    let forced = params.forced.as_deref() == Some("1") || user.must_reset_password;
    let intro = if forced {
        "You are signed in with the default password. Choose a new one to continue."
    } else {
        "Choose a new password for your account."
    };
    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    let token_field = params
        .token
        .as_deref()
        .map(|token| {
            format!(
                r#"<input type="hidden" name="token" value="{}">"#,
                escape_html(token)
            )
        })
        .unwrap_or_default();

    let form = format!(
        r#"<p>{intro}</p>
            <form method="post" action="/admin/reset-password">
                {token_field}
                <label for="password">New password</label>
                <input id="password" name="password" type="password" minlength="{min}" required autocomplete="new-password">
                <label for="confirm_password">Confirm password</label>
                <input id="confirm_password" name="confirm_password" type="password" minlength="{min}" required autocomplete="new-password">
                <button type="submit">Update password</button>
            </form>"#,
        intro = escape_html(intro),
        token_field = token_field,
        min = MIN_PASSWORD_LEN,
    );
    Ok(Html(render_admin_auth_page("Reset password", &flash, &form)))
}

pub async fn process_reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Redirect, Redirect> {
    require_admin(&state, &jar, AdminRoute::ResetPassword)?;

    if let Some(code) = validate_new_password(&form.password, &form.confirm_password) {
        return Err(Redirect::to(&format!("{RESET_PATH}?error={code}")));
    }

    let Some(scope) = session_scope(&state, &jar) else {
        return Err(Redirect::to(LOGIN_PATH));
    };
    if !state.auth().update_password(&scope, &form.password).await {
        warn!(token = %scope.token(), "password update rejected");
        return Err(Redirect::to(&format!("{RESET_PATH}?error=reset_failed")));
    }

    Ok(Redirect::to(&format!(
        "{DASHBOARD_PATH}?status=password_updated"
    )))
}

/// Error code for a rejected new password.
fn validate_new_password(password: &str, confirmation: &str) -> Option<&'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some("password_too_short");
    }
    if password != confirmation {
        return Some("password_mismatch");
    }
    None
}

pub fn render_login_page(flash_html: &str, email: &str) -> String {
    let form = format!(
        r#"<form method="post" action="/admin/login">
                <label for="email">Email</label>
                <input id="email" name="email" type="email" value="{email}" required autocomplete="username">
                <label for="password">Password</label>
                <input id="password" name="password" type="password" required autocomplete="current-password">
                <button type="submit">Sign in</button>
            </form>
            <div class="links"><a href="/admin/forgot-password">Forgot password?</a></div>"#,
        email = escape_html(email),
    );
    render_admin_auth_page("Admin sign in", flash_html, &form)
}
