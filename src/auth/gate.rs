use super::{AdminRole, AdminUser, SessionState};

pub const LOGIN_PATH: &str = "/admin/login";
pub const RESET_PATH: &str = "/admin/reset-password";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Admin console views the gate knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminRoute {
    Login,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Areas,
    Services,
    Templates,
    Communications,
}

impl AdminRoute {
    /// Views reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(self, AdminRoute::Login | AdminRoute::ForgotPassword)
    }

    /// Role a signed-in user needs for this view, if any.
    pub fn required_role(self) -> Option<AdminRole> {
        match self {
            AdminRoute::Areas | AdminRoute::Services | AdminRoute::Templates => {
                Some(AdminRole::SuperAdmin)
            }
            AdminRoute::Communications => Some(AdminRole::Coordinator),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow(AdminUser),
    AllowAnonymous,
    Redirect(String),
}

pub fn decide(state: &SessionState, route: AdminRoute) -> GateDecision {
    match state {
        SessionState::Unauthenticated if route.is_public() => GateDecision::AllowAnonymous,
        SessionState::Unauthenticated => GateDecision::Redirect(LOGIN_PATH.to_string()),
        SessionState::Expired if route.is_public() => GateDecision::AllowAnonymous,
        SessionState::Expired => GateDecision::Redirect(format!("{LOGIN_PATH}?status=expired")),
        SessionState::MustReset(user) if route == AdminRoute::ResetPassword => {
            GateDecision::Allow(user.clone())
        }
        SessionState::MustReset(_) => GateDecision::Redirect(format!("{RESET_PATH}?forced=1")),
        SessionState::Valid(_) if route.is_public() => {
            GateDecision::Redirect(DASHBOARD_PATH.to_string())
        }
        SessionState::Valid(user) => match route.required_role() {
            Some(required) if !user.role.satisfies(required) => {
                GateDecision::Redirect(format!("{DASHBOARD_PATH}?error=not_authorized"))
            }
            _ => GateDecision::Allow(user.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn user(role: AdminRole, must_reset_password: bool) -> AdminUser {
        AdminUser {
            id: Uuid::new_v4(),
            email: "admin@sahli.co".to_string(),
            role,
            must_reset_password,
        }
    }

    #[test]
    fn anonymous_visitors_only_reach_public_views() {
        let state = SessionState::Unauthenticated;
        assert_eq!(decide(&state, AdminRoute::Login), GateDecision::AllowAnonymous);
        assert_eq!(
            decide(&state, AdminRoute::ForgotPassword),
            GateDecision::AllowAnonymous
        );
        assert_eq!(
            decide(&state, AdminRoute::Dashboard),
            GateDecision::Redirect(LOGIN_PATH.to_string())
        );
        assert_eq!(
            decide(&state, AdminRoute::ResetPassword),
            GateDecision::Redirect(LOGIN_PATH.to_string())
        );
    }

    #[test]
    fn expired_sessions_land_on_login_with_notice() {
        assert_eq!(
            decide(&SessionState::Expired, AdminRoute::Areas),
            GateDecision::Redirect("/admin/login?status=expired".to_string())
        );
        assert_eq!(
            decide(&SessionState::Expired, AdminRoute::Login),
            GateDecision::AllowAnonymous
        );
    }

    #[test]
    fn forced_reset_pins_user_to_reset_view() {
        let pending = user(AdminRole::SuperAdmin, true);
        let state = SessionState::MustReset(pending.clone());

        for route in [
            AdminRoute::Dashboard,
            AdminRoute::Login,
            AdminRoute::Templates,
            AdminRoute::Communications,
        ] {
            assert_eq!(
                decide(&state, route),
                GateDecision::Redirect("/admin/reset-password?forced=1".to_string())
            );
        }
        assert_eq!(
            decide(&state, AdminRoute::ResetPassword),
            GateDecision::Allow(pending)
        );
    }

    #[test]
    fn signed_in_users_skip_login() {
        let state = SessionState::Valid(user(AdminRole::SuperAdmin, false));
        assert_eq!(
            decide(&state, AdminRoute::Login),
            GateDecision::Redirect(DASHBOARD_PATH.to_string())
        );
    }

    #[test]
    fn role_mismatch_returns_to_dashboard() {
        let coordinator = user(AdminRole::Coordinator, false);
        let state = SessionState::Valid(coordinator.clone());

        assert_eq!(
            decide(&state, AdminRoute::Areas),
            GateDecision::Redirect("/admin/dashboard?error=not_authorized".to_string())
        );
        assert_eq!(
            decide(&state, AdminRoute::Communications),
            GateDecision::Allow(coordinator.clone())
        );
        assert_eq!(
            decide(&state, AdminRoute::Dashboard),
            GateDecision::Allow(coordinator)
        );
    }

    #[test]
    fn super_admin_passes_every_role_check() {
        let admin = user(AdminRole::SuperAdmin, false);
        let state = SessionState::Valid(admin.clone());
        for route in [
            AdminRoute::Areas,
            AdminRoute::Services,
            AdminRoute::Templates,
            AdminRoute::Communications,
            AdminRoute::Dashboard,
        ] {
            assert_eq!(decide(&state, route), GateDecision::Allow(admin.clone()));
        }
    }
}
