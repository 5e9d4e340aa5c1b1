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
    i18n::{self, LangQuery},
    templates::{SiteNav, SitePage, render_site_page},
};

const PREVIEW_LIMIT: usize = 6;

pub async fn landing_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LangQuery>,
) -> impl IntoResponse {
    let (lang, jar) = i18n::negotiate(jar, params.lang.as_deref());
    let text = lang.text();
    let catalog = state.catalog();
    let greeting = greeting_link(&state, lang);

    let steps = text
        .how_steps
        .iter()
        .enumerate()
        .map(|(idx, (title, body))| {
            format!(
                r#"<div class="card"><h3>{step}. {title}</h3><p>{body}</p></div>"#,
                step = idx + 1,
                title = escape_html(title),
                body = escape_html(body),
            )
        })
        .collect::<String>();

    let services = catalog.services();
    let service_cards = if services.is_empty() {
        format!(r#"<p class="note">{}</p>"#, escape_html(text.services_empty))
    } else {
        let cards = services
            .iter()
            .take(PREVIEW_LIMIT)
            .map(|service| {
                format!(
                    r#"<a class="card" href="/contact?service={query}"><h3>{label}</h3><p>{cta} →</p></a>"#,
                    query = urlencoding::encode(service),
                    label = escape_html(service),
                    cta = escape_html(text.cta_request),
                )
            })
            .collect::<String>();
        format!(r#"<div class="grid">{cards}</div>"#)
    };

    let areas = catalog.areas();
    let area_chips = if areas.is_empty() {
        format!(r#"<p class="note">{}</p>"#, escape_html(text.areas_empty))
    } else {
        let chips = areas
            .iter()
            .map(|area| format!("<li>{}</li>", escape_html(area)))
            .collect::<String>();
        format!(r#"<ul class="chips">{chips}</ul>"#)
    };

    let body = format!(
        r#"        <section class="hero">
            <h1>{hero_title}</h1>
            <p>{hero_body}</p>
            <div class="actions">
                <a class="btn btn-primary" href="{greeting}" target="_blank" rel="noopener">{cta_whatsapp}</a>
                <a class="btn btn-outline" href="/contact">{cta_request}</a>
            </div>
        </section>
        <section>
            <h2>{how_title}</h2>
            <div class="grid">{steps}</div>
        </section>
        <section>
            <h2>{services_title}</h2>
            {service_cards}
            <p><a href="/services">{services_title} →</a></p>
        </section>
        <section>
            <h2>{areas_title}</h2>
            {area_chips}
        </section>"#,
        hero_title = escape_html(text.hero_title),
        hero_body = escape_html(text.hero_body),
        greeting = escape_html(&greeting),
        cta_whatsapp = escape_html(text.cta_whatsapp),
        cta_request = escape_html(text.cta_request),
        how_title = escape_html(text.how_title),
        services_title = escape_html(text.services_title),
        areas_title = escape_html(text.areas_title),
    );

    let html = render_site_page(SitePage {
        lang,
        path: "/",
        title: text.tagline,
        active: SiteNav::Home,
        body_html: Cow::Owned(body),
        whatsapp_href: &greeting,
    });
    (jar, Html(html))
}
