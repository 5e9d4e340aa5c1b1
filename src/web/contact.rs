use std::borrow::Cow;

use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;

use crate::web::{
    AppState, escape_html,
    i18n::{self, Lang},
    templates::{SiteNav, SitePage, render_site_page},
};

#[derive(Default, Deserialize)]
pub struct ContactQuery {
    pub lang: Option<String>,
    pub error: Option<String>,
    pub service: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct LeadForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub details: String,
}

/// `wa.me` deep link, with the message pre-filled when one is given.
pub fn whatsapp_link(number: &str, message: Option<&str>) -> String {
    match message {
        Some(text) => format!("https://wa.me/{number}?text={}", urlencoding::encode(text)),
        None => format!("https://wa.me/{number}"),
    }
}

/// Floating-button link: opens a chat with the generic greeting.
pub fn greeting_link(state: &AppState, lang: Lang) -> String {
    whatsapp_link(
        &state.config().whatsapp_number,
        Some(lang.text().whatsapp_greeting),
    )
}

pub async fn contact_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<ContactQuery>,
) -> impl IntoResponse {
    let (lang, jar) = i18n::negotiate(jar, params.lang.as_deref());
    let text = lang.text();
    let catalog = state.catalog();

    let flash = if params.error.as_deref() == Some("missing_fields") {
        format!(
            r#"<div class="flash error">{}</div>"#,
            escape_html(text.error_missing_fields)
        )
    } else {
        String::new()
    };

    let preselected = params.service.as_deref().unwrap_or_default();
    let service_options = catalog
        .services()
        .iter()
        .map(|service| {
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = escape_html(service),
                label = escape_html(service),
                selected = if service == preselected { " selected" } else { "" },
            )
        })
        .collect::<String>();
    let area_options = catalog
        .areas()
        .iter()
        .map(|area| {
            format!(
                r#"<option value="{value}">{label}</option>"#,
                value = escape_html(area),
                label = escape_html(area),
            )
        })
        .collect::<String>();

    let greeting = greeting_link(&state, lang);
    let body = format!(
        r#"        <section>
            <h1>{title}</h1>
            <p class="note">{intro}</p>
            {flash}
            <form class="lead-form" method="post" action="/contact">
                <div>
                    <label for="name">{field_name}</label>
                    <input id="name" name="name" required autocomplete="name">
                </div>
                <div>
                    <label for="phone">{field_phone}</label>
                    <input id="phone" name="phone" type="tel" autocomplete="tel">
                </div>
                <div>
                    <label for="service">{field_service}</label>
                    <select id="service" name="service" required>
                        <option value="">{choose_option}</option>
                        {service_options}
                    </select>
                </div>
                <div>
                    <label for="area">{field_area}</label>
                    <select id="area" name="area">
                        <option value="">{any_area}</option>
                        {area_options}
                    </select>
                </div>
                <div>
                    <label for="details">{field_details}</label>
                    <textarea id="details" name="details"></textarea>
                </div>
                <button class="btn btn-primary" type="submit">{submit}</button>
            </form>
            <p class="note">{direct} <a href="{greeting}" target="_blank" rel="noopener">{cta}</a></p>
        </section>"#,
        title = escape_html(text.contact_title),
        intro = escape_html(text.contact_intro),
        field_name = escape_html(text.field_name),
        field_phone = escape_html(text.field_phone),
        field_service = escape_html(text.field_service),
        choose_option = escape_html(text.choose_option),
        field_area = escape_html(text.field_area),
        any_area = escape_html(text.any_area),
        field_details = escape_html(text.field_details),
        submit = escape_html(text.submit_whatsapp),
        direct = escape_html(text.contact_direct),
        greeting = escape_html(&greeting),
        cta = escape_html(text.cta_whatsapp),
    );

    let html = render_site_page(SitePage {
        lang,
        path: "/contact",
        title: text.contact_title,
        active: SiteNav::Contact,
        body_html: Cow::Owned(body),
        whatsapp_href: &greeting,
    });
    (jar, Html(html))
}

/// Validate the lead and hand the visitor over to WhatsApp with the message ready.
pub async fn submit_lead(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LeadForm>,
) -> Redirect {
    let (lang, _) = i18n::negotiate(jar, None);

    let Some(message) = compose_lead_message(lang, &form) else {
        return Redirect::to("/contact?error=missing_fields");
    };

    info!(
        service = form.service.trim(),
        area = form.area.trim(),
        lang = lang.code(),
        "lead handed off to WhatsApp"
    );
    Redirect::to(&whatsapp_link(
        &state.config().whatsapp_number,
        Some(&message),
    ))
}

/// The WhatsApp message for a lead, or `None` when name or service is missing.
pub fn compose_lead_message(lang: Lang, form: &LeadForm) -> Option<String> {
    let name = form.name.trim();
    let service = form.service.trim();
    if name.is_empty() || service.is_empty() {
        return None;
    }

    let text = lang.text();
    let mut lines = vec![
        text.whatsapp_greeting.to_string(),
        format!("{}: {name}", text.lead_name),
        format!("{}: {service}", text.lead_service),
    ];
    let optional = [
        (text.lead_area, form.area.trim()),
        (text.lead_phone, form.phone.trim()),
        (text.lead_details, form.details.trim()),
    ];
    for (label, value) in optional {
        if !value.is_empty() {
            lines.push(format!("{label}: {value}"));
        }
    }
    Some(lines.join("\n"))
}
