use std::borrow::Cow;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::CookieJar;

use crate::web::{
    AppState,
    contact::greeting_link,
    escape_html,
    i18n::{self, Lang, LangQuery},
    templates::{SiteNav, SitePage, render_site_page},
};

pub async fn services_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LangQuery>,
) -> impl IntoResponse {
    let (lang, jar) = i18n::negotiate(jar, params.lang.as_deref());
    let text = lang.text();
    let catalog = state.catalog();

    let services = catalog.services();
    let services_html = if services.is_empty() {
        format!(r#"<p class="note">{}</p>"#, escape_html(text.services_empty))
    } else {
        let cards = services
            .iter()
            .map(|service| {
                format!(
                    r#"<div class="card"><h3>{label}</h3><p><a href="/contact?service={query}">{cta} →</a></p></div>"#,
                    label = escape_html(service),
                    query = urlencoding::encode(service),
                    cta = escape_html(text.cta_request),
                )
            })
            .collect::<String>();
        format!(r#"<div class="grid">{cards}</div>"#)
    };

    let areas = catalog.areas();
    let areas_html = if areas.is_empty() {
        format!(r#"<p class="note">{}</p>"#, escape_html(text.areas_empty))
    } else {
        let chips = areas
            .iter()
            .map(|area| format!("<li>{}</li>", escape_html(area)))
            .collect::<String>();
        format!(r#"<ul class="chips">{chips}</ul>"#)
    };

    let body = format!(
        r#"        <section>
            <h1>{title}</h1>
            <p class="note">{intro}</p>
            {services_html}
        </section>
        <section>
            <h2>{areas_title}</h2>
            {areas_html}
        </section>"#,
        title = escape_html(text.services_title),
        intro = escape_html(text.services_intro),
        areas_title = escape_html(text.areas_title),
    );

    let greeting = greeting_link(&state, lang);
    let html = render_site_page(SitePage {
        lang,
        path: "/services",
        title: text.services_title,
        active: SiteNav::Services,
        body_html: Cow::Owned(body),
        whatsapp_href: &greeting,
    });
    (jar, Html(html))
}

pub async fn privacy_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LangQuery>,
) -> impl IntoResponse {
    let (lang, jar) = i18n::negotiate(jar, params.lang.as_deref());
    let text = lang.text();
    let html = render_legal_page(&state, lang, "/privacy", text.privacy_title, &text.privacy_body);
    (jar, Html(html))
}

pub async fn terms_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LangQuery>,
) -> impl IntoResponse {
    let (lang, jar) = i18n::negotiate(jar, params.lang.as_deref());
    let text = lang.text();
    let html = render_legal_page(&state, lang, "/terms", text.terms_title, &text.terms_body);
    (jar, Html(html))
}

fn render_legal_page(
    state: &AppState,
    lang: Lang,
    path: &str,
    title: &str,
    paragraphs: &[&str],
) -> String {
    let paragraphs = paragraphs
        .iter()
        .map(|p| format!(r#"<p class="note">{}</p>"#, escape_html(p)))
        .collect::<String>();
    let body = format!(
        r#"        <section class="card">
            <h1>{title}</h1>
            {paragraphs}
        </section>"#,
        title = escape_html(title),
    );

    let greeting = greeting_link(state, lang);
    render_site_page(SitePage {
        lang,
        path,
        title,
        active: SiteNav::Legal,
        body_html: Cow::Owned(body),
        whatsapp_href: &greeting,
    })
}
