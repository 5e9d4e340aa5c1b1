use std::borrow::Cow;

use axum::{
    extract::{Form, Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info};

use crate::{
    auth::gate::AdminRoute,
    catalog::{CatalogError, MessageTemplate, TemplateCategory, TemplateDraft, render_template},
    web::{
        AppState,
        admin_utils::compose_flash_message,
        escape_html,
        templates::{AdminPage, render_admin_page},
    },
};

use super::{
    auth::require_admin,
    types::{DeleteTemplateForm, TemplateForm, TemplatesQuery},
};

const TEMPLATES_PATH: &str = "/admin/templates";
const PREVIEW_NAME: &str = "Customer";
const PREVIEW_PHONE: &str = "+974 5500 0000";

pub async fn templates_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TemplatesQuery>,
) -> Result<Html<String>, Redirect> {
    let user = require_admin(&state, &jar, AdminRoute::Templates)?;
    let catalog = state.catalog();

    let mut error = params.error.clone();
    let editing = match params.edit.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let found = catalog.template(id);
            if found.is_none() && error.is_none() {
                error = Some("template_not_found".to_string());
            }
            found
        }
        None => None,
    };

    let services = catalog.services();
    let areas = catalog.areas();
    let preview_values = [
        ("name", PREVIEW_NAME),
        ("service", services.first().map_or("Home Cleaning", String::as_str)),
        ("area", areas.first().map_or("Doha", String::as_str)),
        ("phone", PREVIEW_PHONE),
    ];

    let templates = catalog.templates();
    let rows = if templates.is_empty() {
        r#"<tr><td colspan="4" class="muted">No templates yet.</td></tr>"#.to_string()
    } else {
        templates
            .iter()
            .map(|template| render_template_row(template, &preview_values))
            .collect()
    };

    let body = format!(
        r#"{editor}
        <section class="panel">
            <h2>Saved templates</h2>
            <p class="muted">Previews fill <code>{{{{name}}}}</code>, <code>{{{{service}}}}</code>, <code>{{{{area}}}}</code> and <code>{{{{phone}}}}</code> with sample values.</p>
            <table>
                <thead><tr><th>Name</th><th>Category</th><th>Preview</th><th></th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        editor = render_editor(editing.as_ref()),
    );

    let flash = compose_flash_message(params.status.as_deref(), error.as_deref());
    Ok(Html(render_admin_page(AdminPage {
        title: "Message templates",
        user: &user,
        active: AdminRoute::Templates,
        flash_html: Cow::Owned(flash),
        body_html: Cow::Owned(body),
    })))
}

pub async fn save_template(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<TemplateForm>,
) -> Redirect {
    if let Err(redirect) = require_admin(&state, &jar, AdminRoute::Templates) {
        return redirect;
    }

    let draft = TemplateDraft {
        id: form.id,
        name: form.name,
        category: form.category.as_deref().and_then(TemplateCategory::parse),
        content: form.content,
    };

    match state.catalog().save_template(draft) {
        Ok(template) => {
            info!(id = %template.id, name = %template.name, "message template saved");
            Redirect::to(&format!("{TEMPLATES_PATH}?status=template_saved"))
        }
        Err(CatalogError::MissingField(_) | CatalogError::EmptyName) => {
            Redirect::to(&format!("{TEMPLATES_PATH}?error=template_missing_fields"))
        }
        Err(CatalogError::TemplateNotFound(_)) => {
            Redirect::to(&format!("{TEMPLATES_PATH}?error=template_not_found"))
        }
        Err(err) => {
            error!(?err, "failed to save message template");
            Redirect::to(&format!("{TEMPLATES_PATH}?error=storage_failed"))
        }
    }
}

pub async fn delete_template(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<DeleteTemplateForm>,
) -> Redirect {
    if let Err(redirect) = require_admin(&state, &jar, AdminRoute::Templates) {
        return redirect;
    }

    match state.catalog().delete_template(form.id.trim()) {
        Ok(true) => {
            info!(id = %form.id, "message template deleted");
            Redirect::to(&format!("{TEMPLATES_PATH}?status=template_deleted"))
        }
        Ok(false) => Redirect::to(&format!("{TEMPLATES_PATH}?status=template_deleted")),
        Err(err) => {
            error!(?err, "failed to delete message template");
            Redirect::to(&format!("{TEMPLATES_PATH}?error=storage_failed"))
        }
    }
}

fn render_editor(editing: Option<&MessageTemplate>) -> String {
    let selected = editing.map_or(TemplateCategory::General, |t| t.category);
    let options = TemplateCategory::ALL
        .iter()
        .map(|category| {
            format!(
                r#"<option value="{label}"{selected}>{label}</option>"#,
                label = category.label(),
                selected = if *category == selected { " selected" } else { "" },
            )
        })
        .collect::<String>();

    let (heading, id_field, cancel) = match editing {
        Some(template) => (
            "Edit template",
            format!(
                r#"<input type="hidden" name="id" value="{}">"#,
                escape_html(&template.id)
            ),
            format!(r#" <a href="{TEMPLATES_PATH}">Cancel</a>"#),
        ),
        None => ("New template", String::new(), String::new()),
    };

    format!(
        r#"        <section class="panel">
            <h2>{heading}</h2>
            <form method="post" action="{TEMPLATES_PATH}">
                {id_field}
                <div class="field">
                    <label for="name">Name</label>
                    <input id="name" name="name" value="{name}" required>
                </div>
                <div class="field">
                    <label for="category">Category</label>
                    <select id="category" name="category">{options}</select>
                </div>
                <div class="field">
                    <label for="content">Content</label>
                    <textarea id="content" name="content" required>{content}</textarea>
                </div>
                <button type="submit">Save template</button>{cancel}
            </form>
        </section>"#,
        name = editing.map(|t| escape_html(&t.name)).unwrap_or_default(),
        content = editing.map(|t| escape_html(&t.content)).unwrap_or_default(),
    )
}

fn render_template_row(template: &MessageTemplate, preview_values: &[(&str, &str)]) -> String {
    let preview = render_template(&template.content, preview_values);
    format!(
        r#"<tr><td>{name}</td><td><span class="tag">{category}</span></td><td><div class="preview">{preview}</div></td><td><a href="{TEMPLATES_PATH}?edit={id_query}">Edit</a> <form class="inline-form" method="post" action="{TEMPLATES_PATH}/delete"><input type="hidden" name="id" value="{id}"><button class="danger" type="submit">Delete</button></form></td></tr>"#,
        name = escape_html(&template.name),
        category = template.category.label(),
        preview = escape_html(&preview),
        id_query = urlencoding::encode(&template.id),
        id = escape_html(&template.id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> MessageTemplate {
        MessageTemplate {
            id: "t-1".to_string(),
            name: "Visit <confirmed>".to_string(),
            category: TemplateCategory::FollowUp,
            content: "Hi {{name}}, see you in {{area}} at {{time}}.".to_string(),
        }
    }

    #[test]
    fn row_preview_fills_known_placeholders_and_escapes() {
        let row = render_template_row(&template(), &[("name", "Mona"), ("area", "Lusail")]);
        assert!(row.contains("Hi Mona, see you in Lusail at {{time}}."));
        assert!(row.contains("Visit &lt;confirmed&gt;"));
        assert!(row.contains("/admin/templates?edit=t-1"));
    }

    #[test]
    fn editor_prefills_the_template_being_edited() {
        let html = render_editor(Some(&template()));
        assert!(html.contains(r#"<input type="hidden" name="id" value="t-1">"#));
        assert!(html.contains(r#"<option value="Follow-up" selected>"#));

        let blank = render_editor(None);
        assert!(blank.contains("New template"));
        assert!(blank.contains(r#"<option value="General" selected>"#));
    }
}
