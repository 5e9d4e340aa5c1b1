use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, admin, auth, contact, landing, pages};

const ROBOTS_TXT_BODY: &str = include_str!("../../robots.txt");

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing::landing_page))
        .route("/services", get(pages::services_page))
        .route(
            "/contact",
            get(contact::contact_page).post(contact::submit_lead),
        )
        .route("/privacy", get(pages::privacy_page))
        .route("/terms", get(pages::terms_page))
        .route("/healthz", get(healthz))
        .route("/robots.txt", get(robots_txt))
        .route(
            "/admin/login",
            get(auth::login_page).post(auth::process_login),
        )
        .route("/admin/logout", post(auth::logout))
        .route(
            "/admin/forgot-password",
            get(auth::forgot_password_page).post(auth::process_forgot_password),
        )
        .route(
            "/admin/reset-password",
            get(auth::reset_password_page).post(auth::process_reset_password),
        )
        .route("/admin", get(admin::dashboard))
        .route("/admin/dashboard", get(admin::dashboard))
        .route(
            "/admin/areas",
            get(admin::areas_page).post(admin::save_area),
        )
        .route("/admin/areas/delete", post(admin::delete_area))
        .route(
            "/admin/services",
            get(admin::services_page).post(admin::save_service),
        )
        .route("/admin/services/delete", post(admin::delete_service))
        .route(
            "/admin/templates",
            get(admin::templates_page).post(admin::save_template),
        )
        .route("/admin/templates/delete", post(admin::delete_template))
        .route("/admin/communications", get(admin::communications))
        .route("/admin/api/session", get(admin::session_snapshot))
        .route("/admin/session/events", get(admin::session_events))
        .with_state(state)
}

async fn robots_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ROBOTS_TXT_BODY,
    )
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
