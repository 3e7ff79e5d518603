use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::Question;

/// Doctor card shown on the checkup landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Doctor {
    pub role: String,
    pub name: String,
    pub instagram: String,
}

/// Editable body of a checkup template; also the create/update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateForm {
    #[serde(default)]
    pub test_key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub carousel_title: String,
    #[serde(default)]
    pub carousel_subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_template: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn default_active() -> bool {
    true
}

impl Default for TemplateForm {
    /// Defaults of the "create" screen: one empty benefit line, active, no questions.
    fn default() -> Self {
        Self {
            test_key: String::new(),
            title: String::new(),
            carousel_title: String::new(),
            carousel_subtitle: String::new(),
            description: String::new(),
            image: None,
            benefits: vec![String::new()],
            doctors: Vec::new(),
            free: false,
            price: None,
            pdf_template: None,
            is_active: true,
            questions: Vec::new(),
        }
    }
}

impl TemplateForm {
    /// True when the form holds something worth restoring.
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
            || !self.test_key.trim().is_empty()
            || !self.questions.is_empty()
    }
}

/// Template record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckupTemplate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub form: TemplateForm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}
