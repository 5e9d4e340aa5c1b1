use std::borrow::Cow;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};

use crate::{
    auth::{AdminRole, gate::AdminRoute},
    web::{
        AppState,
        admin_utils::compose_flash_message,
        auth::session_scope,
        escape_html,
        templates::{AdminPage, render_admin_page},
    },
};

use super::{auth::require_admin, communications::render_log_rows, types::FlashQuery};

const RECENT_LOG_LIMIT: usize = 5;

pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    let user = require_admin(&state, &jar, AdminRoute::Dashboard)?;
    let catalog = state.catalog();

    let expires_at = session_scope(&state, &jar)
        .and_then(|scope| state.auth().expires_at(&scope))
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut stats = vec![
        ("Message logs", catalog.message_logs().len()),
        ("Providers", catalog.providers().len()),
    ];
    if user.role.satisfies(AdminRole::SuperAdmin) {
        stats.insert(0, ("Templates", catalog.templates().len()));
        stats.insert(0, ("Services", catalog.services().len()));
        stats.insert(0, ("Areas", catalog.areas().len()));
    }
    let stats_html = stats
        .iter()
        .map(|(label, count)| {
            format!(r#"<div class="stat"><span class="muted">{label}</span><strong>{count}</strong></div>"#)
        })
        .collect::<String>();

    let mut logs = catalog.message_logs();
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    logs.truncate(RECENT_LOG_LIMIT);
    let log_rows = render_log_rows(&state, &logs);

    let body = format!(
        r#"        <section class="panel">
            <p>Signed in as <strong>{email}</strong> ({role}). Session valid until {expires_at}.</p>
            <div class="stats">{stats_html}</div>
        </section>
        <section class="panel">
            <h2>Latest messages</h2>
            <table>
                <thead><tr><th>When</th><th>Phone</th><th>Provider</th><th>Message</th><th>Tags</th></tr></thead>
                <tbody>{log_rows}</tbody>
            </table>
            <p><a href="/admin/communications">All communications</a></p>
        </section>"#,
        email = escape_html(&user.email),
        role = escape_html(user.role.label()),
        expires_at = escape_html(&expires_at),
    );

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    Ok(Html(render_admin_page(AdminPage {
        title: "Dashboard",
        user: &user,
        active: AdminRoute::Dashboard,
        flash_html: Cow::Owned(flash),
        body_html: Cow::Owned(body),
    })))
}
