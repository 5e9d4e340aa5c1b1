//! Admin-managed lists: service areas, the service catalog, message templates,
//! and the read-only communication log.
//!
//! Each collection is one JSON array under a fixed key. Writes replace the
//! whole array, so two concurrent edits of the same collection resolve to
//! whichever write lands last.

mod models;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::normalize_phone,
    storage::{Storage, StorageError},
};

pub use models::{MessageLog, MessageTemplate, Provider, TemplateCategory, TemplateDraft};

pub const AREAS_KEY: &str = "areas";
pub const SERVICES_KEY: &str = "services";
pub const TEMPLATES_KEY: &str = "message_templates";
pub const MESSAGE_LOGS_KEY: &str = "message_logs";
pub const PROVIDERS_KEY: &str = "providers";

const DEFAULT_AREAS: &[&str] = &["Doha", "Al Rayyan", "Al Wakrah", "Lusail", "Al Khor"];
const DEFAULT_SERVICES: &[&str] = &[
    "Home Cleaning",
    "Plumbing",
    "Electrical",
    "AC Maintenance",
    "Pest Control",
];
const DEFAULT_WELCOME_TEMPLATE: &str =
    "Hello {{name}}, thank you for contacting Sahli. A coordinator will confirm your {{service}} request in {{area}} shortly.";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("\"{0}\" already exists")]
    Duplicate(String),
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("template {0} not found")]
    TemplateNotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode collection: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The two plain-name collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameCollection {
    Areas,
    Services,
}

impl NameCollection {
    fn key(self) -> &'static str {
        match self {
            NameCollection::Areas => AREAS_KEY,
            NameCollection::Services => SERVICES_KEY,
        }
    }
}

#[derive(Clone)]
pub struct CatalogStore {
    storage: Storage,
}

impl CatalogStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Seed the collections that have never been written.
    pub fn ensure_defaults(&self) -> Result<(), CatalogError> {
        if self.storage.get(AREAS_KEY).is_none() {
            self.write_list(AREAS_KEY, DEFAULT_AREAS)?;
            info!(count = DEFAULT_AREAS.len(), "seeded default service areas");
        }
        if self.storage.get(SERVICES_KEY).is_none() {
            self.write_list(SERVICES_KEY, DEFAULT_SERVICES)?;
            info!(count = DEFAULT_SERVICES.len(), "seeded default services");
        }
        if self.storage.get(TEMPLATES_KEY).is_none() {
            let welcome = MessageTemplate {
                id: Uuid::new_v4().to_string(),
                name: "Welcome".to_string(),
                category: TemplateCategory::General,
                content: DEFAULT_WELCOME_TEMPLATE.to_string(),
            };
            self.write_list(TEMPLATES_KEY, &[welcome])?;
        }
        Ok(())
    }

    pub fn areas(&self) -> Vec<String> {
        self.names(NameCollection::Areas)
    }

    pub fn services(&self) -> Vec<String> {
        self.names(NameCollection::Services)
    }

    pub fn save_area(&self, name: &str) -> Result<String, CatalogError> {
        self.save_name(NameCollection::Areas, name)
    }

    pub fn save_service(&self, name: &str) -> Result<String, CatalogError> {
        self.save_name(NameCollection::Services, name)
    }

    pub fn delete_area(&self, name: &str) -> Result<bool, CatalogError> {
        self.delete_name(NameCollection::Areas, name)
    }

    pub fn delete_service(&self, name: &str) -> Result<bool, CatalogError> {
        self.delete_name(NameCollection::Services, name)
    }

    pub fn names(&self, collection: NameCollection) -> Vec<String> {
        self.read_list(collection.key())
    }

    /// Insert a trimmed name, rejecting blanks and exact duplicates.
    pub fn save_name(&self, collection: NameCollection, name: &str) -> Result<String, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let mut names = self.names(collection);
        if names.iter().any(|existing| existing == name) {
            return Err(CatalogError::Duplicate(name.to_string()));
        }

        names.push(name.to_string());
        self.write_list(collection.key(), &names)?;
        Ok(name.to_string())
    }

    /// Returns whether anything was removed.
    pub fn delete_name(&self, collection: NameCollection, name: &str) -> Result<bool, CatalogError> {
        let mut names = self.names(collection);
        let before = names.len();
        names.retain(|existing| existing != name);
        if names.len() == before {
            return Ok(false);
        }

        self.write_list(collection.key(), &names)?;
        Ok(true)
    }

    pub fn templates(&self) -> Vec<MessageTemplate> {
        self.read_list(TEMPLATES_KEY)
    }

    pub fn template(&self, id: &str) -> Option<MessageTemplate> {
        self.templates().into_iter().find(|t| t.id == id)
    }

    /// Append a new template, or replace the one whose id the draft carries.
    pub fn save_template(&self, draft: TemplateDraft) -> Result<MessageTemplate, CatalogError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(CatalogError::MissingField("content"));
        }

        let mut templates = self.templates();
        let id = draft
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let record = MessageTemplate {
            id: id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string),
            name: name.to_string(),
            category: draft.category.unwrap_or(TemplateCategory::General),
            content: content.to_string(),
        };

        match id {
            Some(id) => {
                let slot = templates
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| CatalogError::TemplateNotFound(id.to_string()))?;
                *slot = record.clone();
            }
            None => templates.push(record.clone()),
        }

        self.write_list(TEMPLATES_KEY, &templates)?;
        Ok(record)
    }

    pub fn delete_template(&self, id: &str) -> Result<bool, CatalogError> {
        let mut templates = self.templates();
        let before = templates.len();
        templates.retain(|t| t.id != id);
        if templates.len() == before {
            return Ok(false);
        }

        self.write_list(TEMPLATES_KEY, &templates)?;
        Ok(true)
    }

    pub fn message_logs(&self) -> Vec<MessageLog> {
        self.read_list(MESSAGE_LOGS_KEY)
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.read_list(PROVIDERS_KEY)
    }

    /// Match on digits only, so `+974 5512 3456` finds `97455123456`.
    pub fn provider_by_phone(&self, phone: &str) -> Option<Provider> {
        let wanted = normalize_phone(phone);
        if wanted.is_empty() {
            return None;
        }
        self.providers()
            .into_iter()
            .find(|provider| normalize_phone(&provider.phone) == wanted)
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.storage.get(key) else {
            return Vec::new();
        };
        let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!(?err, key, "stored collection is malformed, treating as empty");
                return Vec::new();
            }
        };

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(?err, key, index, "skipping malformed record");
                    None
                }
            })
            .collect()
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), CatalogError> {
        let encoded = serde_json::to_string(items)?;
        self.storage.set(key, encoded)?;
        Ok(())
    }
}

/// Replace `{{key}}` tokens with the matching value; unknown tokens stay as written.
pub fn render_template(content: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            output.push_str(&rest[start..]);
            return output;
        };

        let token = after_open[..end].trim();
        match values.iter().find(|(key, _)| *key == token) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CatalogStore {
        CatalogStore::new(Storage::in_memory())
    }

    #[test]
    fn saving_an_area_twice_keeps_one_copy() {
        let catalog = store();
        catalog.save_area("Al Khor").expect("first save");
        let err = catalog.save_area("Al Khor").expect_err("duplicate");
        assert!(matches!(err, CatalogError::Duplicate(name) if name == "Al Khor"));

        let areas = catalog.areas();
        assert_eq!(areas.iter().filter(|a| *a == "Al Khor").count(), 1);
    }

    #[test]
    fn names_are_trimmed_and_case_sensitive() {
        let catalog = store();
        assert_eq!(catalog.save_service("  Plumbing ").expect("save"), "Plumbing");
        assert!(matches!(
            catalog.save_service("Plumbing"),
            Err(CatalogError::Duplicate(_))
        ));
        catalog.save_service("plumbing").expect("different case is a new name");
        assert_eq!(catalog.services(), vec!["Plumbing", "plumbing"]);
    }

    #[test]
    fn blank_names_are_rejected() {
        let catalog = store();
        assert!(matches!(catalog.save_area("   "), Err(CatalogError::EmptyName)));
        assert!(catalog.areas().is_empty());
    }

    #[test]
    fn delete_area_round_trip() {
        let catalog = store();
        catalog.save_area("Al Khor").expect("save");
        catalog.save_area("Lusail").expect("save");

        assert!(catalog.delete_area("Al Khor").expect("delete"));
        assert_eq!(catalog.areas(), vec!["Lusail"]);
    }

    #[test]
    fn deleting_missing_names_is_a_no_op() {
        let catalog = store();
        catalog.save_service("Plumbing").expect("save");

        assert!(!catalog.delete_service("Painting").expect("delete"));
        assert!(!catalog.delete_area("Nowhere").expect("delete"));
        assert_eq!(catalog.services(), vec!["Plumbing"]);
        assert!(catalog.areas().is_empty());
    }

    #[test]
    fn areas_and_services_are_separate_namespaces() {
        let catalog = store();
        catalog.save_area("Doha").expect("save");
        catalog.save_service("Doha").expect("same label in another collection");
        assert_eq!(catalog.areas(), vec!["Doha"]);
        assert_eq!(catalog.services(), vec!["Doha"]);
    }

    #[test]
    fn templates_append_then_replace_in_place() {
        let catalog = store();
        let first = catalog
            .save_template(TemplateDraft {
                id: None,
                name: "Welcome".to_string(),
                category: Some(TemplateCategory::General),
                content: "Hi {{name}}".to_string(),
            })
            .expect("create");
        let second = catalog
            .save_template(TemplateDraft {
                name: "Verify".to_string(),
                category: Some(TemplateCategory::Verification),
                content: "Code {{code}}".to_string(),
                ..TemplateDraft::default()
            })
            .expect("create");
        assert_ne!(first.id, second.id);

        let edited = catalog
            .save_template(TemplateDraft {
                id: Some(first.id.clone()),
                name: "Welcome back".to_string(),
                category: Some(TemplateCategory::FollowUp),
                content: "Hello again {{name}}".to_string(),
            })
            .expect("edit");

        let templates = catalog.templates();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0], edited);
        assert_eq!(templates[0].category, TemplateCategory::FollowUp);
        assert_eq!(catalog.template(&second.id), Some(second));
    }

    #[test]
    fn template_validation_and_missing_ids() {
        let catalog = store();
        assert!(matches!(
            catalog.save_template(TemplateDraft {
                name: " ".to_string(),
                content: "x".to_string(),
                ..TemplateDraft::default()
            }),
            Err(CatalogError::MissingField("name"))
        ));
        assert!(matches!(
            catalog.save_template(TemplateDraft {
                id: Some("gone".to_string()),
                name: "Old".to_string(),
                content: "x".to_string(),
                ..TemplateDraft::default()
            }),
            Err(CatalogError::TemplateNotFound(id)) if id == "gone"
        ));
        assert!(!catalog.delete_template("gone").expect("delete"));
    }

    #[test]
    fn delete_template_removes_only_that_record() {
        let catalog = store();
        let keep = catalog
            .save_template(TemplateDraft {
                name: "Keep".to_string(),
                content: "a".to_string(),
                ..TemplateDraft::default()
            })
            .expect("create");
        let removed = catalog
            .save_template(TemplateDraft {
                name: "Drop".to_string(),
                content: "b".to_string(),
                ..TemplateDraft::default()
            })
            .expect("create");

        assert!(catalog.delete_template(&removed.id).expect("delete"));
        assert_eq!(catalog.templates(), vec![keep]);
    }

    #[test]
    fn malformed_collections_read_as_empty() {
        let storage = Storage::in_memory();
        storage.set(AREAS_KEY, "{oops").expect("set");
        storage.set(MESSAGE_LOGS_KEY, "42").expect("set");
        let catalog = CatalogStore::new(storage);

        assert!(catalog.areas().is_empty());
        assert!(catalog.message_logs().is_empty());
    }

    #[test]
    fn one_bad_log_record_does_not_hide_the_others() {
        let storage = Storage::in_memory();
        storage
            .set(
                MESSAGE_LOGS_KEY,
                r#"[
                    {"id":"m1","phone":"97455123456","message":"Booked","timestamp":"yesterday"},
                    {"id":"m2","phone":"97455123456","message":"On the way","timestamp":"2026-10-01T09:30:00Z"},
                    {"id":"m3"}
                ]"#,
            )
            .expect("set");
        let catalog = CatalogStore::new(storage);

        let logs = catalog.message_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, "m2");
    }

    #[test]
    fn message_logs_and_providers_are_read_from_storage() {
        let storage = Storage::in_memory();
        storage
            .set(
                MESSAGE_LOGS_KEY,
                r#"[{"id":"m1","phone":"+974 5512 3456","message":"Booked","timestamp":"2026-10-01T09:30:00Z","tags":["booking"],"type":"outbound"}]"#,
            )
            .expect("set");
        storage
            .set(
                PROVIDERS_KEY,
                r#"[{"id":"p1","name":"Khalid AC","phone":"97455123456","services":["AC Maintenance"]}]"#,
            )
            .expect("set");
        let catalog = CatalogStore::new(storage);

        let logs = catalog.message_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].kind.as_deref(), Some("outbound"));
        assert_eq!(logs[0].linked_request_id, None);

        let provider = catalog
            .provider_by_phone(&logs[0].phone)
            .expect("provider by phone");
        assert_eq!(provider.name, "Khalid AC");
        assert_eq!(catalog.provider_by_phone("12345"), None);
        assert_eq!(catalog.provider_by_phone(""), None);
    }

    #[test]
    fn ensure_defaults_only_fills_missing_collections() {
        let catalog = store();
        catalog.save_area("Mesaieed").expect("save");
        catalog.ensure_defaults().expect("seed");

        assert_eq!(catalog.areas(), vec!["Mesaieed"]);
        assert_eq!(catalog.services().len(), DEFAULT_SERVICES.len());
        assert_eq!(catalog.templates().len(), 1);

        catalog.delete_service("Plumbing").expect("delete");
        catalog.ensure_defaults().expect("seed again");
        assert_eq!(catalog.services().len(), DEFAULT_SERVICES.len() - 1);
    }

    #[test]
    fn render_template_fills_known_tokens() {
        let rendered = render_template(
            "Hi {{name}}, your {{ service }} visit is {{when}}.",
            &[("name", "Mona"), ("service", "Plumbing")],
        );
        assert_eq!(rendered, "Hi Mona, your Plumbing visit is {{when}}.");
    }

    #[test]
    fn render_template_keeps_unterminated_braces() {
        assert_eq!(render_template("Total {{amount", &[("amount", "5")]), "Total {{amount");
        assert_eq!(render_template("no tokens", &[]), "no tokens");
    }

    #[test]
    fn category_parse_accepts_labels() {
        assert_eq!(
            TemplateCategory::parse("follow-up"),
            Some(TemplateCategory::FollowUp)
        );
        assert_eq!(TemplateCategory::parse("Unknown"), None);
    }
}
