//! Admin session store.
//!
//! A session lives in three keys of a browser's [`ScopedStorage`]: the
//! authenticated flag, the user record, and the expiry timestamp. Reads
//! re-derive the session state every time and clear an expired session on
//! the spot.

pub mod gate;
pub mod monitor;

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{clock::Clock, config::AdminCredentials, storage::ScopedStorage};

pub const SESSION_KEY: &str = "admin_session";
pub const USER_KEY: &str = "admin_user";
pub const EXPIRY_KEY: &str = "admin_session_expiry";

pub const SESSION_TTL_HOURS: i64 = 12;
pub const SESSION_TTL_MILLIS: i64 = SESSION_TTL_HOURS * 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Coordinator")]
    Coordinator,
}

impl AdminRole {
    pub fn label(self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "Super Admin",
            AdminRole::Coordinator => "Coordinator",
        }
    }

    /// Super Admin passes every role requirement.
    pub fn satisfies(self, required: AdminRole) -> bool {
        self == AdminRole::SuperAdmin || self == required
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub role: AdminRole,
    pub must_reset_password: bool,
}

/// Classification of one browser's admin session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// The read found a stale session and cleared it.
    Expired,
    Valid(AdminUser),
    MustReset(AdminUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&AdminUser> {
        match self {
            SessionState::Valid(user) | SessionState::MustReset(user) => Some(user),
            SessionState::Unauthenticated | SessionState::Expired => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Expired => "expired",
            SessionState::Valid(_) => "valid",
            SessionState::MustReset(_) => "must_reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: Option<AdminUser>,
}

impl LoginOutcome {
    fn failed() -> Self {
        Self { user: None }
    }

    pub fn succeeded(&self) -> bool {
        self.user.is_some()
    }
}

enum SessionRead {
    Missing,
    Expired,
    Active,
}

#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    credentials: AdminCredentials,
    production: bool,
    clock: Arc<dyn Clock>,
    latency: Duration,
}

impl AuthService {
    pub fn new(
        credentials: AdminCredentials,
        production: bool,
        clock: Arc<dyn Clock>,
        latency: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                credentials,
                production,
                clock,
                latency,
            }),
        }
    }

    pub fn is_authenticated(&self, scope: &ScopedStorage) -> bool {
        matches!(self.read_session(scope), SessionRead::Active)
    }

    pub fn current_user(&self, scope: &ScopedStorage) -> Option<AdminUser> {
        if !self.is_authenticated(scope) {
            return None;
        }
        read_user(scope)
    }

    pub fn session_state(&self, scope: &ScopedStorage) -> SessionState {
        match self.read_session(scope) {
            SessionRead::Missing => SessionState::Unauthenticated,
            SessionRead::Expired => SessionState::Expired,
            SessionRead::Active => match read_user(scope) {
                Some(user) if user.must_reset_password => SessionState::MustReset(user),
                Some(user) => SessionState::Valid(user),
                None => SessionState::Unauthenticated,
            },
        }
    }

    /// Expiry of the current session, if it is still valid.
    pub fn expires_at(&self, scope: &ScopedStorage) -> Option<i64> {
        if !self.is_authenticated(scope) {
            return None;
        }
        scope.get(EXPIRY_KEY).and_then(|v| v.parse().ok())
    }

    pub async fn login(&self, scope: &ScopedStorage, email: &str, password: &str) -> LoginOutcome {
        self.simulate_latency().await;

        let credentials = &self.inner.credentials;
        if email != credentials.email || password != credentials.password {
            warn!(token = %scope.token(), "admin login rejected");
            return LoginOutcome::failed();
        }

        let user = AdminUser {
            id: Uuid::new_v4(),
            email: credentials.email.clone(),
            role: AdminRole::SuperAdmin,
            must_reset_password: self.inner.production && credentials.uses_default_password(),
        };
        let expires_at = self.inner.clock.now_millis() + SESSION_TTL_MILLIS;

        if let Err(err) = persist_session(scope, &user, expires_at) {
            error!(?err, token = %scope.token(), "failed to persist admin session");
            return LoginOutcome::failed();
        }

        info!(
            token = %scope.token(),
            must_reset = user.must_reset_password,
            "admin signed in"
        );
        LoginOutcome { user: Some(user) }
    }

    /// Clears the forced-reset flag on the stored user.
    ///
    /// The configured credential is not touched, so a default password keeps
    /// triggering the reset prompt on every new login.
    pub async fn update_password(&self, scope: &ScopedStorage, new_password: &str) -> bool {
        self.simulate_latency().await;

        if new_password.is_empty() {
            return false;
        }

        let Some(mut user) = self.current_user(scope) else {
            return false;
        };
        user.must_reset_password = false;

        let encoded = match serde_json::to_string(&user) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(?err, "failed to encode admin user");
                return false;
            }
        };
        if let Err(err) = scope.set(USER_KEY, encoded) {
            error!(?err, token = %scope.token(), "failed to store updated admin user");
            return false;
        }

        warn!(
            token = %scope.token(),
            "forced reset cleared; ADMIN_PASSWORD is unchanged and still governs the next login"
        );
        true
    }

    pub fn logout(&self, scope: &ScopedStorage) {
        for key in [SESSION_KEY, USER_KEY, EXPIRY_KEY] {
            if let Err(err) = scope.remove(key) {
                error!(?err, key, token = %scope.token(), "failed to clear session key");
            }
        }
    }

    /// No email is sent; the request is only recorded for an administrator.
    pub async fn request_password_reset(&self, email: &str) -> bool {
        self.simulate_latency().await;
        info!(email, "password reset requested, forward to an administrator");
        true
    }

    fn read_session(&self, scope: &ScopedStorage) -> SessionRead {
        let expiry = scope.get(EXPIRY_KEY).and_then(|v| v.trim().parse::<i64>().ok());

        if let Some(expiry) = expiry {
            if self.inner.clock.now_millis() >= expiry {
                info!(token = %scope.token(), "admin session expired");
                self.logout(scope);
                return SessionRead::Expired;
            }
        }

        match (scope.get(SESSION_KEY).as_deref(), expiry) {
            (Some("true"), Some(_)) => SessionRead::Active,
            _ => SessionRead::Missing,
        }
    }

    async fn simulate_latency(&self) {
        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }
    }
}

fn read_user(scope: &ScopedStorage) -> Option<AdminUser> {
    let raw = scope.get(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(?err, token = %scope.token(), "stored admin user is malformed");
            None
        }
    }
}

fn persist_session(scope: &ScopedStorage, user: &AdminUser, expires_at: i64) -> anyhow::Result<()> {
    scope.set(USER_KEY, serde_json::to_string(user)?)?;
    scope.set(EXPIRY_KEY, expires_at.to_string())?;
    // Flag last: a half-written session never reads as authenticated.
    scope.set(SESSION_KEY, "true")?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio::time::{Instant, timeout};

    use super::*;
    use crate::{
        clock::ManualClock,
        config::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD},
        storage::Storage,
    };

    pub(crate) const T0: i64 = 1_760_000_000_000;

    pub(crate) fn service(production: bool, clock: &ManualClock) -> AuthService {
        AuthService::new(
            AdminCredentials::resolve(None, None, production),
            production,
            Arc::new(clock.clone()),
            Duration::ZERO,
        )
    }

    fn fresh_scope() -> ScopedStorage {
        Storage::in_memory().scoped(Uuid::new_v4())
    }

    #[tokio::test]
    async fn login_with_configured_pair_sets_twelve_hour_expiry() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        let scope = fresh_scope();

        let outcome = auth
            .login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;

        let user = outcome.user.expect("login succeeds");
        assert_eq!(user.email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(user.role, AdminRole::SuperAdmin);
        assert!(!user.must_reset_password);
        assert!(auth.is_authenticated(&scope));
        assert_eq!(
            scope.get(EXPIRY_KEY).as_deref(),
            Some((T0 + SESSION_TTL_MILLIS).to_string().as_str())
        );
        assert_eq!(auth.current_user(&scope), Some(user));
    }

    #[tokio::test]
    async fn wrong_credentials_leave_existing_session_untouched() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        let scope = fresh_scope();
        auth.login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;
        let before = (
            scope.get(SESSION_KEY),
            scope.get(USER_KEY),
            scope.get(EXPIRY_KEY),
        );

        clock.advance(1_000);
        let outcome = auth.login(&scope, DEFAULT_ADMIN_EMAIL, "Password123").await;
        assert!(!outcome.succeeded());
        let outcome = auth
            .login(&scope, "ADMIN@sahli.co", DEFAULT_ADMIN_PASSWORD)
            .await;
        assert!(!outcome.succeeded());

        let after = (
            scope.get(SESSION_KEY),
            scope.get(USER_KEY),
            scope.get(EXPIRY_KEY),
        );
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn failed_login_on_fresh_scope_stays_unauthenticated() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        let scope = fresh_scope();

        assert!(!auth.login(&scope, "someone@else.com", "nope").await.succeeded());
        assert!(!auth.is_authenticated(&scope));
        assert_eq!(auth.session_state(&scope), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn session_expires_at_the_boundary_and_clears_keys() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        let scope = fresh_scope();
        auth.login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;

        clock.set(T0 + SESSION_TTL_MILLIS - 1);
        assert!(auth.is_authenticated(&scope));

        clock.set(T0 + SESSION_TTL_MILLIS + 1);
        assert!(!auth.is_authenticated(&scope));
        assert_eq!(scope.get(SESSION_KEY), None);
        assert_eq!(scope.get(USER_KEY), None);
        assert_eq!(scope.get(EXPIRY_KEY), None);
    }

    #[tokio::test]
    async fn expiry_wins_even_without_flag() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        let scope = fresh_scope();
        scope.set(EXPIRY_KEY, T0.to_string()).expect("set");
        scope.set(SESSION_KEY, "false").expect("set");

        assert_eq!(auth.session_state(&scope), SessionState::Expired);
        assert_eq!(auth.session_state(&scope), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        let scope = fresh_scope();
        auth.login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;

        auth.logout(&scope);
        assert!(!auth.is_authenticated(&scope));
        assert_eq!(auth.current_user(&scope), None);
        auth.logout(&scope);
    }

    #[test]
    fn malformed_state_degrades_to_logged_out() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        let scope = fresh_scope();

        scope.set(SESSION_KEY, "true").expect("set");
        scope.set(EXPIRY_KEY, "tomorrow").expect("set");
        assert!(!auth.is_authenticated(&scope));

        scope
            .set(EXPIRY_KEY, (T0 + 10_000).to_string())
            .expect("set");
        scope.set(USER_KEY, "{not json").expect("set");
        assert!(auth.is_authenticated(&scope));
        assert_eq!(auth.current_user(&scope), None);
        assert_eq!(auth.session_state(&scope), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn default_password_in_production_forces_reset() {
        let clock = ManualClock::new(T0);
        let auth = service(true, &clock);
        let scope = fresh_scope();

        let user = auth
            .login(&scope, "admin@sahli.co", "password123")
            .await
            .user
            .expect("login succeeds");
        assert!(user.must_reset_password);
        assert!(matches!(
            auth.session_state(&scope),
            SessionState::MustReset(_)
        ));
    }

    #[tokio::test]
    async fn configured_password_in_production_does_not_force_reset() {
        let clock = ManualClock::new(T0);
        let auth = AuthService::new(
            AdminCredentials::resolve(None, Some("long-and-unique".to_string()), true),
            true,
            Arc::new(clock.clone()),
            Duration::ZERO,
        );
        let scope = fresh_scope();

        let user = auth
            .login(&scope, DEFAULT_ADMIN_EMAIL, "long-and-unique")
            .await
            .user
            .expect("login succeeds");
        assert!(!user.must_reset_password);
    }

    #[tokio::test]
    async fn update_password_clears_flag_but_next_login_sets_it_again() {
        let clock = ManualClock::new(T0);
        let auth = service(true, &clock);
        let scope = fresh_scope();
        auth.login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;

        assert!(auth.update_password(&scope, "a-new-password").await);
        assert!(matches!(auth.session_state(&scope), SessionState::Valid(_)));

        auth.logout(&scope);
        let user = auth
            .login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await
            .user
            .expect("old credential still works");
        assert!(user.must_reset_password);
    }

    #[tokio::test]
    async fn update_password_without_session_fails() {
        let clock = ManualClock::new(T0);
        let auth = service(true, &clock);
        assert!(!auth.update_password(&fresh_scope(), "whatever123").await);
    }

    #[tokio::test]
    async fn password_reset_request_always_succeeds() {
        let clock = ManualClock::new(T0);
        let auth = service(false, &clock);
        assert!(auth.request_password_reset("nobody@example.com").await);
    }

    const AUTH_LATENCY: Duration = Duration::from_millis(1200);

    fn slow_service(clock: &ManualClock) -> AuthService {
        AuthService::new(
            AdminCredentials::resolve(None, None, false),
            false,
            Arc::new(clock.clone()),
            AUTH_LATENCY,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn login_does_not_finish_before_the_configured_latency() {
        let clock = ManualClock::new(T0);
        let auth = slow_service(&clock);
        let scope = fresh_scope();

        let early = timeout(
            AUTH_LATENCY - Duration::from_millis(1),
            auth.login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD),
        )
        .await;
        assert!(early.is_err());
        assert!(!auth.is_authenticated(&scope));

        let started = Instant::now();
        let outcome = auth
            .login(&scope, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await;
        assert!(outcome.succeeded());
        assert!(started.elapsed() >= AUTH_LATENCY);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_calls_still_wait_the_full_latency() {
        let clock = ManualClock::new(T0);
        let auth = slow_service(&clock);
        let scope = fresh_scope();

        let started = Instant::now();
        assert!(!auth.login(&scope, DEFAULT_ADMIN_EMAIL, "wrong").await.succeeded());
        assert!(started.elapsed() >= AUTH_LATENCY);

        let started = Instant::now();
        assert!(!auth.update_password(&scope, "a-new-password").await);
        assert!(started.elapsed() >= AUTH_LATENCY);

        let started = Instant::now();
        assert!(auth.request_password_reset("nobody@example.com").await);
        assert!(started.elapsed() >= AUTH_LATENCY);
    }

    #[test]
    fn super_admin_satisfies_every_role() {
        assert!(AdminRole::SuperAdmin.satisfies(AdminRole::Coordinator));
        assert!(AdminRole::Coordinator.satisfies(AdminRole::Coordinator));
        assert!(!AdminRole::Coordinator.satisfies(AdminRole::SuperAdmin));
    }

    #[test]
    fn user_record_uses_camel_case_json() {
        let user = AdminUser {
            id: Uuid::nil(),
            email: "admin@sahli.co".to_string(),
            role: AdminRole::SuperAdmin,
            must_reset_password: true,
        };
        let json = serde_json::to_value(&user).expect("encode");
        assert_eq!(json["role"], "Super Admin");
        assert_eq!(json["mustResetPassword"], true);
    }
}
