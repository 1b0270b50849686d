use serde::{Deserialize, Serialize};

/// Input control a template field is rendered with. Choice types
/// (`Select`, `Radio`, `CheckboxGroup`) draw their values from
/// `FieldDefinition::options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Textarea,
    Select,
    Radio,
    CheckboxGroup,
}

impl FieldType {
    /// `true` for field types whose value is a list of selected options.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, FieldType::CheckboxGroup)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Stable key used in `FormData`.
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// A dynamic form definition as served by `GET /api/forms/templates/{id}`.
///
/// The client treats it as read-only for the whole submission session; field
/// order is the render order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FormTemplate {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }
}
