//! The declarative form schema: ordered sections of typed field specs.
//!
//! The JSON shape matches the application-form documents the platform
//! ships (`type` tags, `mode` arrays, `rows_default`, ...), so existing
//! form definitions deserialize unchanged. Unknown `type` tags are
//! rejected at load time rather than surfacing later as rendering holes.

use crate::value::Value;
use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The static description of a complete application form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub module: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub sections: Vec<Section>,
}

impl FormSchema {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: FormSchema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Rejects duplicate section ids and duplicate field labels within a
    /// section. The label doubles as the storage key, so duplicates would
    /// make answers ambiguous.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut section_ids = HashSet::new();
        for section in &self.sections {
            if !section_ids.insert(section.id.as_str()) {
                return Err(SchemaError::DuplicateSection(section.id.clone()));
            }
            let mut labels = HashSet::new();
            for field in &section.fields {
                if !labels.insert(field.label.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        section: section.id.clone(),
                        label: field.label.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn field(&self, section_id: &str, label: &str) -> Option<&FieldSpec> {
        self.section(section_id)?.fields.iter().find(|f| f.label == label)
    }
}

/// One titled group of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), fields: Vec::new() }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// A section whose every field is operational (export/send buttons,
    /// recipient selection) carries no document content; the exporter
    /// skips it wholesale.
    pub fn is_action_section(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(|f| f.field_type.is_operational())
    }
}

/// The closed vocabulary of field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "tel")]
    Tel,
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "textarea")]
    TextArea,
    #[serde(rename = "select")]
    Select,
    /// Recipient-municipality selector; options come from the
    /// municipality directory, not the schema.
    #[serde(rename = "select_mairie")]
    MunicipalitySelect,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "checkbox")]
    CheckboxGroup,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "file_list")]
    FileList,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "image_list")]
    ImageList,
    #[serde(rename = "duration_slider")]
    DurationSlider,
    #[serde(rename = "action_button")]
    ActionButton,
}

impl FieldType {
    pub const ALL: [FieldType; 18] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Email,
        FieldType::Tel,
        FieldType::Url,
        FieldType::TextArea,
        FieldType::Select,
        FieldType::MunicipalitySelect,
        FieldType::Date,
        FieldType::CheckboxGroup,
        FieldType::List,
        FieldType::Table,
        FieldType::File,
        FieldType::FileList,
        FieldType::Image,
        FieldType::ImageList,
        FieldType::DurationSlider,
        FieldType::ActionButton,
    ];

    /// Operational fields trigger behaviour instead of carrying content.
    pub fn is_operational(self) -> bool {
        matches!(self, FieldType::ActionButton | FieldType::MunicipalitySelect)
    }

    pub fn is_attachment(self) -> bool {
        matches!(
            self,
            FieldType::File | FieldType::FileList | FieldType::Image | FieldType::ImageList
        )
    }

    pub fn tag(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::TextArea => "textarea",
            FieldType::Select => "select",
            FieldType::MunicipalitySelect => "select_mairie",
            FieldType::Date => "date",
            FieldType::CheckboxGroup => "checkbox",
            FieldType::List => "list",
            FieldType::Table => "table",
            FieldType::File => "file",
            FieldType::FileList => "file_list",
            FieldType::Image => "image",
            FieldType::ImageList => "image_list",
            FieldType::DurationSlider => "duration_slider",
            FieldType::ActionButton => "action_button",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How a file or image field may acquire its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMode {
    #[serde(rename = "upload")]
    Upload,
    #[serde(rename = "ia_generate")]
    AiGenerate,
    #[serde(rename = "draw")]
    Draw,
    #[serde(rename = "url")]
    Url,
}

/// The description of one input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub ai_generate: bool,
    /// Choices for select and checkbox-group fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// A select storing several choices instead of one.
    #[serde(default)]
    pub multiple: bool,
    /// Column names for table fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Blank rows a table shows before any input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_default: Option<usize>,
    /// Slider bounds and initial position, in months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
    /// Allowed acquisition methods for file and image fields.
    #[serde(rename = "mode", default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<AcquisitionMode>>,
    /// Visual emphasis hint for action buttons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Which routine an action button invokes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Date fields prefilled with today's date.
    #[serde(default)]
    pub auto_today: bool,
}

impl FieldSpec {
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            field_type,
            required: false,
            placeholder: None,
            ai_generate: false,
            options: None,
            multiple: false,
            columns: None,
            rows_default: None,
            min: None,
            max: None,
            default: None,
            modes: None,
            style: None,
            action: None,
            auto_today: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn ai_generate(mut self) -> Self {
        self.ai_generate = true;
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn rows_default(mut self, rows: usize) -> Self {
        self.rows_default = Some(rows);
        self
    }

    pub fn slider_range(mut self, min: i64, max: i64, default: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.default = Some(default);
        self
    }

    pub fn modes(mut self, modes: impl IntoIterator<Item = AcquisitionMode>) -> Self {
        self.modes = Some(modes.into_iter().collect());
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn auto_today(mut self) -> Self {
        self.auto_today = true;
        self
    }

    /// Shape check for a candidate value. `Empty` is always accepted so a
    /// field can be cleared.
    pub fn accepts(&self, value: &Value) -> bool {
        if matches!(value, Value::Empty) {
            return true;
        }
        match self.field_type {
            FieldType::Text
            | FieldType::Email
            | FieldType::Tel
            | FieldType::Url
            | FieldType::TextArea
            | FieldType::Date
            | FieldType::MunicipalitySelect => matches!(value, Value::Text(_)),
            FieldType::Number | FieldType::DurationSlider => matches!(value, Value::Number(_)),
            FieldType::Select => {
                if self.multiple {
                    matches!(value, Value::Items(_))
                } else {
                    matches!(value, Value::Text(_))
                }
            }
            FieldType::CheckboxGroup | FieldType::List => matches!(value, Value::Items(_)),
            FieldType::Table => matches!(value, Value::Rows(_)),
            FieldType::File | FieldType::Image => matches!(value, Value::Attachment(_)),
            FieldType::FileList | FieldType::ImageList => matches!(value, Value::Attachments(_)),
            FieldType::ActionButton => false,
        }
    }
}
