//! Toolkit-independent widget descriptors.
//!
//! A [`Widget`] says which interactive control to render for a field and
//! with what state; it never references a concrete UI framework. The
//! mapping from field type to widget is exhaustive over the closed type
//! vocabulary, so adding a type tag without a widget arm fails to
//! compile.

use dossier_schema::{AcquisitionMode, FileRef, RowRecord};

/// Lightweight attachment info for display, without the payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl From<&FileRef> for FileSummary {
    fn from(file: &FileRef) -> Self {
        Self {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
        }
    }
}

/// Which single-line text flavour an input uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Email,
    Tel,
    Url,
}

/// The description of one interactive control.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    TextInput {
        kind: TextKind,
        value: String,
        placeholder: Option<String>,
        required: bool,
    },
    NumberInput {
        value: Option<f64>,
        placeholder: Option<String>,
        required: bool,
    },
    TextArea {
        value: String,
        placeholder: Option<String>,
        required: bool,
        /// Offer an AI-fill action next to the control.
        ai_assist: bool,
        busy: bool,
    },
    Select {
        options: Vec<String>,
        selected: Vec<String>,
        multiple: bool,
        placeholder: Option<String>,
        required: bool,
    },
    /// Recipient selector; the municipality directory supplies options.
    MunicipalitySelect {
        selected: Option<String>,
        placeholder: Option<String>,
        required: bool,
    },
    DatePicker {
        /// ISO date, prefilled with today when the spec says so.
        value: Option<String>,
    },
    CheckboxGroup {
        options: Vec<String>,
        checked: Vec<String>,
    },
    /// Always shows at least one editable slot.
    ListEditor {
        items: Vec<String>,
        placeholder: Option<String>,
    },
    TableEditor {
        columns: Vec<String>,
        rows: Vec<RowRecord>,
    },
    FilePicker {
        current: Option<FileSummary>,
        modes: Vec<AcquisitionMode>,
        placeholder: Option<String>,
    },
    ImagePicker {
        current: Option<FileSummary>,
        modes: Vec<AcquisitionMode>,
        busy: bool,
    },
    /// Multi-file gallery; zero entries is a valid state.
    AttachmentGallery {
        files: Vec<FileSummary>,
        images_only: bool,
        modes: Vec<AcquisitionMode>,
    },
    Slider {
        min: i64,
        max: i64,
        value: i64,
    },
    ActionButton {
        label: String,
        action: Option<String>,
        primary: bool,
        busy: bool,
    },
    /// The spec for this one field is inconsistent; the rest of the form
    /// stays interactive.
    Broken { message: String },
}
