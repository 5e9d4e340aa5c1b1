use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateCategory {
    General,
    Broadcast,
    Verification,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 4] = [
        TemplateCategory::General,
        TemplateCategory::Broadcast,
        TemplateCategory::Verification,
        TemplateCategory::FollowUp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TemplateCategory::General => "General",
            TemplateCategory::Broadcast => "Broadcast",
            TemplateCategory::Verification => "Verification",
            TemplateCategory::FollowUp => "Follow-up",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    pub content: String,
}

/// Template as submitted from the editor; `id` is set when editing.
#[derive(Clone, Debug, Default)]
pub struct TemplateDraft {
    pub id: Option<String>,
    pub name: String,
    pub category: Option<TemplateCategory>,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    pub id: String,
    pub phone: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub linked_request_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub areas: Vec<String>,
}
