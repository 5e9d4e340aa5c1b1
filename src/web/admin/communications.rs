use std::borrow::Cow;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::gate::AdminRoute,
    catalog::MessageLog,
    config::normalize_phone,
    web::{
        AppState, escape_html,
        templates::{AdminPage, render_admin_page},
    },
};

use super::{auth::require_admin, types::CommunicationsQuery};

pub async fn communications(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CommunicationsQuery>,
) -> Result<Html<String>, Redirect> {
    let user = require_admin(&state, &jar, AdminRoute::Communications)?;

    let phone = params.phone.as_deref().map(str::trim).unwrap_or_default();
    let tag = params.tag.as_deref().map(str::trim).unwrap_or_default();
    let logs = filter_logs(state.catalog().message_logs(), phone, tag);
    let rows = render_log_rows(&state, &logs);

    let clear_link = if phone.is_empty() && tag.is_empty() {
        String::new()
    } else {
        r#"<a href="/admin/communications">Clear filters</a>"#.to_string()
    };

    let body = format!(
        r#"        <section class="panel">
            <form class="row-form" method="get" action="/admin/communications">
                <div class="field">
                    <label for="phone">Phone</label>
                    <input id="phone" name="phone" value="{phone}" placeholder="+974 ...">
                </div>
                <div class="field">
                    <label for="tag">Tag</label>
                    <input id="tag" name="tag" value="{tag}">
                </div>
                <button type="submit">Filter</button>
                {clear_link}
            </form>
            <p class="muted">{count} message(s), newest first.</p>
            <table>
                <thead><tr><th>When</th><th>Phone</th><th>Provider</th><th>Message</th><th>Tags</th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        phone = escape_html(phone),
        tag = escape_html(tag),
        count = logs.len(),
    );

    Ok(Html(render_admin_page(AdminPage {
        title: "Communications",
        user: &user,
        active: AdminRoute::Communications,
        flash_html: Cow::Borrowed(""),
        body_html: Cow::Owned(body),
    })))
}

/// Newest first; `phone` matches on digits, `tag` ignores case.
fn filter_logs(mut logs: Vec<MessageLog>, phone: &str, tag: &str) -> Vec<MessageLog> {
    let phone = normalize_phone(phone);
    logs.retain(|log| {
        let phone_matches = phone.is_empty() || normalize_phone(&log.phone).contains(&phone);
        let tag_matches = tag.is_empty() || log.tags.iter().any(|t| t.eq_ignore_ascii_case(tag));
        phone_matches && tag_matches
    });
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    logs
}

pub(super) fn render_log_rows(state: &AppState, logs: &[MessageLog]) -> String {
    if logs.is_empty() {
        return r#"<tr><td colspan="5" class="muted">No messages yet.</td></tr>"#.to_string();
    }

    logs.iter()
        .map(|log| {
            let provider = state
                .catalog()
                .provider_by_phone(&log.phone)
                .map(|p| escape_html(&p.name))
                .unwrap_or_else(|| r#"<span class="muted">-</span>"#.to_string());
            let tags = log
                .tags
                .iter()
                .map(|tag| {
                    format!(
                        r#"<a class="tag" href="/admin/communications?tag={query}">{label}</a>"#,
                        query = urlencoding::encode(tag),
                        label = escape_html(tag),
                    )
                })
                .collect::<String>();
            let meta = [log.kind.as_deref(), log.status.as_deref()]
                .into_iter()
                .flatten()
                .map(escape_html)
                .collect::<Vec<_>>()
                .join(" · ");

            format!(
                r#"<tr><td>{when}<br><span class="muted">{meta}</span></td><td>{phone}</td><td>{provider}</td><td>{message}</td><td>{tags}</td></tr>"#,
                when = log.timestamp.format("%Y-%m-%d %H:%M"),
                phone = escape_html(&log.phone),
                message = escape_html(&log.message),
            )
        })
        .collect()
}
