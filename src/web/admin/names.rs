use std::borrow::Cow;

use axum::{
    extract::{Form, Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info};

use crate::{
    auth::gate::AdminRoute,
    catalog::{CatalogError, NameCollection},
    web::{
        AppState,
        admin_utils::compose_flash_message,
        escape_html,
        templates::{AdminPage, render_admin_page},
    },
};

use super::{
    auth::require_admin,
    types::{FlashQuery, NameForm},
};

/// Everything that differs between the areas and services screens.
struct NameView {
    collection: NameCollection,
    route: AdminRoute,
    path: &'static str,
    title: &'static str,
    singular: &'static str,
    saved: &'static str,
    deleted: &'static str,
}

const AREAS: NameView = NameView {
    collection: NameCollection::Areas,
    route: AdminRoute::Areas,
    path: "/admin/areas",
    title: "Service areas",
    singular: "area",
    saved: "area_saved",
    deleted: "area_deleted",
};

const SERVICES: NameView = NameView {
    collection: NameCollection::Services,
    route: AdminRoute::Services,
    path: "/admin/services",
    title: "Services",
    singular: "service",
    saved: "service_saved",
    deleted: "service_deleted",
};

pub async fn areas_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    render_names(&state, &jar, &params, &AREAS)
}

pub async fn save_area(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> Redirect {
    save_name(&state, &jar, &form, &AREAS)
}

pub async fn delete_area(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> Redirect {
    delete_name(&state, &jar, &form, &AREAS)
}

pub async fn services_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    render_names(&state, &jar, &params, &SERVICES)
}

pub async fn save_service(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> Redirect {
    save_name(&state, &jar, &form, &SERVICES)
}

pub async fn delete_service(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<NameForm>,
) -> Redirect {
    delete_name(&state, &jar, &form, &SERVICES)
}

fn render_names(
    state: &AppState,
    jar: &CookieJar,
    params: &FlashQuery,
    view: &NameView,
) -> Result<Html<String>, Redirect> {
    let user = require_admin(state, jar, view.route)?;

    let mut names = state.catalog().names(view.collection);
    names.sort_by_key(|name| name.to_lowercase());

    let rows = if names.is_empty() {
        format!(
            r#"<tr><td colspan="2" class="muted">No {singular} yet.</td></tr>"#,
            singular = view.singular
        )
    } else {
        names
            .iter()
            .map(|name| {
                format!(
                    r#"<tr><td>{label}</td><td><form class="inline-form" method="post" action="{path}/delete"><input type="hidden" name="name" value="{value}"><button class="danger" type="submit">Delete</button></form></td></tr>"#,
                    label = escape_html(name),
                    value = escape_html(name),
                    path = view.path,
                )
            })
            .collect()
    };

    let body = format!(
        r#"        <section class="panel">
            <form class="row-form" method="post" action="{path}">
                <div class="field">
                    <label for="name">New {singular}</label>
                    <input id="name" name="name" required>
                </div>
                <button type="submit">Add</button>
            </form>
            <table>
                <thead><tr><th>Name</th><th></th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        path = view.path,
        singular = view.singular,
    );

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    Ok(Html(render_admin_page(AdminPage {
        title: view.title,
        user: &user,
        active: view.route,
        flash_html: Cow::Owned(flash),
        body_html: Cow::Owned(body),
    })))
}

fn save_name(state: &AppState, jar: &CookieJar, form: &NameForm, view: &NameView) -> Redirect {
    if let Err(redirect) = require_admin(state, jar, view.route) {
        return redirect;
    }

    match state.catalog().save_name(view.collection, &form.name) {
        Ok(name) => {
            info!(collection = ?view.collection, name = %name, "catalog entry added");
            Redirect::to(&format!("{}?status={}", view.path, view.saved))
        }
        Err(err) => Redirect::to(&format!("{}?error={}", view.path, error_code(&err))),
    }
}

fn delete_name(state: &AppState, jar: &CookieJar, form: &NameForm, view: &NameView) -> Redirect {
    if let Err(redirect) = require_admin(state, jar, view.route) {
        return redirect;
    }

    match state.catalog().delete_name(view.collection, &form.name) {
        Ok(removed) => {
            if removed {
                info!(collection = ?view.collection, name = %form.name, "catalog entry removed");
            }
            Redirect::to(&format!("{}?status={}", view.path, view.deleted))
        }
        Err(err) => Redirect::to(&format!("{}?error={}", view.path, error_code(&err))),
    }
}

fn error_code(err: &CatalogError) -> &'static str {
    match err {
        CatalogError::EmptyName | CatalogError::MissingField(_) => "missing_name",
        CatalogError::Duplicate(_) => "duplicate",
        CatalogError::TemplateNotFound(_) => "template_not_found",
        CatalogError::Storage(_) | CatalogError::Encode(_) => {
            error!(?err, "failed to write catalog collection");
            "storage_failed"
        }
    }
}
