use serde::Deserialize;

#[derive(Default, Deserialize)]
pub struct FlashQuery {
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct TemplatesQuery {
    pub status: Option<String>,
    pub error: Option<String>,
    pub edit: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct CommunicationsQuery {
    pub phone: Option<String>,
    pub tag: Option<String>,
}

#[derive(Deserialize)]
pub struct NameForm {
    pub name: String,
}

#[derive(Deserialize)]
pub struct TemplateForm {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub content: String,
}

#[derive(Deserialize)]
pub struct DeleteTemplateForm {
    pub id: String,
}
