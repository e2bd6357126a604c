//! The form engine proper: rendering, mutation, AI fill.

use crate::error::FormError;
use crate::notice::{Notice, NoticeKind};
use crate::widget::{FileSummary, TextKind, Widget};
use dossier_genai::{ContentGenerator, GenerateError, GeneratedImage, ModelSelector, prompt};
use dossier_schema::{
    AcquisitionMode, AnswerRecord, FieldSpec, FieldType, FileRef, FormSchema, RowRecord, Value,
};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// In-field placeholder written when a text generation call fails; the
/// user must never be left with a silently unchanged field.
const GENERATION_ERROR_TEXT: &str =
    "Une erreur est survenue lors de la génération du contenu. Veuillez réessayer.";
const IMAGE_GENERATION_ERROR: &str =
    "Une erreur est survenue lors de la génération de l'image.";
const IMAGE_PROMPT_MISSING: &str = "Veuillez entrer une description pour l'image.";

/// Tunables for a [`FormEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model used for text fill. Paid plans may select the pro model.
    pub text_model: ModelSelector,
    /// How long a notice stays visible.
    pub notice_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text_model: ModelSelector::TextStandard,
            notice_ttl: Duration::from_secs(4),
        }
    }
}

/// Interprets a [`FormSchema`] and keeps one [`AnswerRecord`] in sync
/// with user edits and generation results.
///
/// The generation session is constructed by the caller and passed in
/// explicitly; the engine owns it for its own lifetime and nothing is
/// shared through globals.
pub struct FormEngine {
    schema: Arc<FormSchema>,
    record: AnswerRecord,
    generator: Arc<dyn ContentGenerator>,
    config: EngineConfig,
    busy: HashSet<(String, String)>,
    notices: Vec<Notice>,
    dirty: BTreeSet<String>,
    generated_images: u64,
}

impl FormEngine {
    pub fn new(schema: Arc<FormSchema>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self::with_record(schema, generator, AnswerRecord::new())
    }

    /// Resumes from a previously persisted record.
    pub fn with_record(
        schema: Arc<FormSchema>,
        generator: Arc<dyn ContentGenerator>,
        record: AnswerRecord,
    ) -> Self {
        Self {
            schema,
            record,
            generator,
            config: EngineConfig::default(),
            busy: HashSet::new(),
            notices: Vec::new(),
            dirty: BTreeSet::new(),
            generated_images: 0,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn record(&self) -> &AnswerRecord {
        &self.record
    }

    pub fn into_record(self) -> AnswerRecord {
        self.record
    }

    fn spec(&self, section_id: &str, label: &str) -> Result<&FieldSpec, FormError> {
        let section = self
            .schema
            .section(section_id)
            .ok_or_else(|| FormError::UnknownSection(section_id.to_string()))?;
        section
            .fields
            .iter()
            .find(|f| f.label == label)
            .ok_or_else(|| FormError::UnknownField {
                section: section_id.to_string(),
                label: label.to_string(),
            })
    }

    // --- Rendering ---

    /// Maps one field to its widget descriptor. Pure; total over the
    /// closed type vocabulary. Inconsistent specs degrade to
    /// [`Widget::Broken`] for that field alone.
    pub fn render_field(&self, section_id: &str, label: &str) -> Result<Widget, FormError> {
        let spec = self.spec(section_id, label)?;
        let value = self.record.get(section_id, label);
        Ok(self.widget_for(section_id, spec, value))
    }

    /// Widgets for a whole section, in schema order.
    pub fn render_section(&self, section_id: &str) -> Result<Vec<(String, Widget)>, FormError> {
        let section = self
            .schema
            .section(section_id)
            .ok_or_else(|| FormError::UnknownSection(section_id.to_string()))?;
        Ok(section
            .fields
            .iter()
            .map(|spec| {
                let value = self.record.get(section_id, &spec.label);
                (spec.label.clone(), self.widget_for(section_id, spec, value))
            })
            .collect())
    }

    fn widget_for(&self, section_id: &str, spec: &FieldSpec, value: Option<&Value>) -> Widget {
        let busy = self.is_busy(section_id, &spec.label);
        let text_value = || {
            value
                .and_then(Value::as_text)
                .map(str::to_string)
                .unwrap_or_default()
        };
        match spec.field_type {
            FieldType::Text => Widget::TextInput {
                kind: TextKind::Plain,
                value: text_value(),
                placeholder: spec.placeholder.clone(),
                required: spec.required,
            },
            FieldType::Email => Widget::TextInput {
                kind: TextKind::Email,
                value: text_value(),
                placeholder: spec.placeholder.clone(),
                required: spec.required,
            },
            FieldType::Tel => Widget::TextInput {
                kind: TextKind::Tel,
                value: text_value(),
                placeholder: spec.placeholder.clone(),
                required: spec.required,
            },
            FieldType::Url => Widget::TextInput {
                kind: TextKind::Url,
                value: text_value(),
                placeholder: spec.placeholder.clone(),
                required: spec.required,
            },
            FieldType::Number => Widget::NumberInput {
                value: value.and_then(|v| match v {
                    Value::Number(n) => Some(*n),
                    _ => None,
                }),
                placeholder: spec.placeholder.clone(),
                required: spec.required,
            },
            FieldType::TextArea => Widget::TextArea {
                value: text_value(),
                placeholder: spec.placeholder.clone(),
                required: spec.required,
                ai_assist: spec.ai_generate,
                busy,
            },
            FieldType::Select => {
                let Some(options) = spec.options.clone().filter(|o| !o.is_empty()) else {
                    return Widget::Broken {
                        message: format!("le champ select '{}' n'a pas d'options", spec.label),
                    };
                };
                let selected = match value {
                    Some(Value::Items(items)) => items.clone(),
                    Some(Value::Text(s)) if !s.is_empty() => vec![s.clone()],
                    _ => Vec::new(),
                };
                Widget::Select {
                    options,
                    selected,
                    multiple: spec.multiple,
                    placeholder: spec.placeholder.clone(),
                    required: spec.required,
                }
            }
            FieldType::MunicipalitySelect => Widget::MunicipalitySelect {
                selected: value.and_then(Value::as_text).map(str::to_string),
                placeholder: spec.placeholder.clone(),
                required: spec.required,
            },
            FieldType::Date => {
                let stored = value.and_then(Value::as_text).map(str::to_string);
                let value = stored.or_else(|| {
                    spec.auto_today
                        .then(|| chrono::Local::now().date_naive().format("%Y-%m-%d").to_string())
                });
                Widget::DatePicker { value }
            }
            FieldType::CheckboxGroup => {
                let Some(options) = spec.options.clone().filter(|o| !o.is_empty()) else {
                    return Widget::Broken {
                        message: format!("le champ checkbox '{}' n'a pas d'options", spec.label),
                    };
                };
                Widget::CheckboxGroup {
                    options,
                    checked: value.and_then(Value::as_items).map(<[String]>::to_vec).unwrap_or_default(),
                }
            }
            FieldType::List => Widget::ListEditor {
                items: self.items_or_default(value),
                placeholder: spec.placeholder.clone(),
            },
            FieldType::Table => {
                let Some(columns) = spec.columns.clone().filter(|c| !c.is_empty()) else {
                    return Widget::Broken {
                        message: format!("le tableau '{}' n'a pas de colonnes", spec.label),
                    };
                };
                Widget::TableEditor {
                    columns,
                    rows: self.rows_or_default(spec, value),
                }
            }
            FieldType::File => Widget::FilePicker {
                current: value.and_then(Value::as_attachment).map(FileSummary::from),
                modes: spec.modes.clone().unwrap_or(vec![AcquisitionMode::Upload]),
                placeholder: spec.placeholder.clone(),
            },
            FieldType::Image => Widget::ImagePicker {
                current: value.and_then(Value::as_attachment).map(FileSummary::from),
                modes: spec.modes.clone().unwrap_or(vec![AcquisitionMode::Upload]),
                busy,
            },
            FieldType::FileList | FieldType::ImageList => Widget::AttachmentGallery {
                files: value
                    .and_then(Value::as_attachments)
                    .map(|files| files.iter().map(FileSummary::from).collect())
                    .unwrap_or_default(),
                images_only: spec.field_type == FieldType::ImageList,
                modes: spec.modes.clone().unwrap_or(vec![AcquisitionMode::Upload]),
            },
            FieldType::DurationSlider => {
                let min = spec.min.unwrap_or(1);
                let max = spec.max.unwrap_or(36);
                if min > max {
                    return Widget::Broken {
                        message: format!("bornes invalides pour '{}'", spec.label),
                    };
                }
                let value = value
                    .and_then(|v| match v {
                        Value::Number(n) => Some(*n as i64),
                        _ => None,
                    })
                    .or(spec.default)
                    .unwrap_or(min)
                    .clamp(min, max);
                Widget::Slider { min, max, value }
            }
            FieldType::ActionButton => Widget::ActionButton {
                label: spec.label.clone(),
                action: spec.action.clone(),
                primary: spec.style.as_deref() == Some("primary"),
                busy: false,
            },
        }
    }

    fn items_or_default(&self, value: Option<&Value>) -> Vec<String> {
        match value.and_then(Value::as_items) {
            Some(items) if !items.is_empty() => items.to_vec(),
            _ => vec![String::new()],
        }
    }

    fn rows_or_default(&self, spec: &FieldSpec, value: Option<&Value>) -> Vec<RowRecord> {
        match value.and_then(Value::as_rows) {
            Some(rows) if !rows.is_empty() => rows.to_vec(),
            _ => vec![RowRecord::new(); spec.rows_default.unwrap_or(1).max(1)],
        }
    }

    // --- Mutation ---

    /// Replaces the value at a path. Only shape matching is checked
    /// here; `required` stays advisory until submit time.
    pub fn set_value(
        &mut self,
        section_id: &str,
        label: &str,
        value: Value,
    ) -> Result<(), FormError> {
        let spec = self.spec(section_id, label)?;
        if !spec.accepts(&value) {
            return Err(FormError::ShapeMismatch {
                label: label.to_string(),
                field_type: spec.field_type,
            });
        }
        self.record.set(section_id, label, value);
        self.dirty.insert(section_id.to_string());
        Ok(())
    }

    /// Sections whose widgets need re-rendering since the last call.
    pub fn take_dirty_sections(&mut self) -> Vec<String> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    fn current_items(&self, section_id: &str, label: &str) -> Result<Vec<String>, FormError> {
        let spec = self.spec(section_id, label)?;
        if spec.field_type != FieldType::List {
            return Err(FormError::WrongFieldType { label: label.to_string(), expected: "list" });
        }
        Ok(self.items_or_default(self.record.get(section_id, label)))
    }

    pub fn append_item(&mut self, section_id: &str, label: &str) -> Result<(), FormError> {
        let mut items = self.current_items(section_id, label)?;
        items.push(String::new());
        self.set_value(section_id, label, Value::Items(items))
    }

    pub fn update_item(
        &mut self,
        section_id: &str,
        label: &str,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), FormError> {
        let mut items = self.current_items(section_id, label)?;
        let slot = items.get_mut(index).ok_or(FormError::IndexOutOfRange {
            label: label.to_string(),
            index,
        })?;
        *slot = text.into();
        self.set_value(section_id, label, Value::Items(items))
    }

    /// Removes one item; a fresh blank slot reappears when the last one
    /// goes, so the editor never renders empty.
    pub fn remove_item(
        &mut self,
        section_id: &str,
        label: &str,
        index: usize,
    ) -> Result<(), FormError> {
        let mut items = self.current_items(section_id, label)?;
        if index >= items.len() {
            return Err(FormError::IndexOutOfRange { label: label.to_string(), index });
        }
        items.remove(index);
        if items.is_empty() {
            items.push(String::new());
        }
        self.set_value(section_id, label, Value::Items(items))
    }

    fn current_rows(&self, section_id: &str, label: &str) -> Result<Vec<RowRecord>, FormError> {
        let spec = self.spec(section_id, label)?;
        if spec.field_type != FieldType::Table {
            return Err(FormError::WrongFieldType { label: label.to_string(), expected: "table" });
        }
        Ok(self.rows_or_default(spec, self.record.get(section_id, label)))
    }

    pub fn append_row(&mut self, section_id: &str, label: &str) -> Result<(), FormError> {
        let mut rows = self.current_rows(section_id, label)?;
        rows.push(RowRecord::new());
        self.set_value(section_id, label, Value::Rows(rows))
    }

    pub fn update_cell(
        &mut self,
        section_id: &str,
        label: &str,
        row: usize,
        column: &str,
        text: impl Into<String>,
    ) -> Result<(), FormError> {
        let spec = self.spec(section_id, label)?;
        if let Some(columns) = &spec.columns
            && !columns.iter().any(|c| c == column)
        {
            return Err(FormError::UnknownColumn {
                label: label.to_string(),
                column: column.to_string(),
            });
        }
        let mut rows = self.current_rows(section_id, label)?;
        let slot = rows.get_mut(row).ok_or(FormError::IndexOutOfRange {
            label: label.to_string(),
            index: row,
        })?;
        slot.set(column, text);
        self.set_value(section_id, label, Value::Rows(rows))
    }

    /// Removes one row; like lists, the table keeps one editable row.
    pub fn remove_row(
        &mut self,
        section_id: &str,
        label: &str,
        index: usize,
    ) -> Result<(), FormError> {
        let mut rows = self.current_rows(section_id, label)?;
        if index >= rows.len() {
            return Err(FormError::IndexOutOfRange { label: label.to_string(), index });
        }
        rows.remove(index);
        if rows.is_empty() {
            rows.push(RowRecord::new());
        }
        self.set_value(section_id, label, Value::Rows(rows))
    }

    fn current_attachments(
        &self,
        section_id: &str,
        label: &str,
    ) -> Result<Vec<FileRef>, FormError> {
        let spec = self.spec(section_id, label)?;
        if !matches!(spec.field_type, FieldType::FileList | FieldType::ImageList) {
            return Err(FormError::WrongFieldType {
                label: label.to_string(),
                expected: "multi-file",
            });
        }
        Ok(self
            .record
            .get(section_id, label)
            .and_then(Value::as_attachments)
            .map(<[FileRef]>::to_vec)
            .unwrap_or_default())
    }

    pub fn push_attachment(
        &mut self,
        section_id: &str,
        label: &str,
        file: FileRef,
    ) -> Result<(), FormError> {
        let mut files = self.current_attachments(section_id, label)?;
        files.push(file);
        self.set_value(section_id, label, Value::Attachments(files))
    }

    /// Multi-file lists may legitimately drop to zero entries.
    pub fn remove_attachment(
        &mut self,
        section_id: &str,
        label: &str,
        index: usize,
    ) -> Result<(), FormError> {
        let mut files = self.current_attachments(section_id, label)?;
        if index >= files.len() {
            return Err(FormError::IndexOutOfRange { label: label.to_string(), index });
        }
        files.remove(index);
        self.set_value(section_id, label, Value::Attachments(files))
    }

    // --- AI-assisted fill ---

    pub fn is_busy(&self, section_id: &str, label: &str) -> bool {
        self.busy.contains(&(section_id.to_string(), label.to_string()))
    }

    /// Starts a text fill for a field and marks the field busy.
    ///
    /// The returned [`PendingFill`] does not borrow the engine, so the
    /// form stays editable while the call runs and fills for other
    /// fields may start concurrently. A second start for the same field
    /// is refused with `FieldBusy` until the outcome comes back through
    /// [`apply_fill`](Self::apply_fill). A pending fill that is dropped
    /// instead leaves the field busy; release it with
    /// [`cancel_fill`](Self::cancel_fill).
    pub fn begin_ai_fill(
        &mut self,
        section_id: &str,
        label: &str,
    ) -> Result<PendingFill, FormError> {
        let spec = self.spec(section_id, label)?;
        if !spec.ai_generate {
            return Err(FormError::AiFillNotOffered { label: label.to_string() });
        }
        let field_type = spec.field_type;
        if !matches!(field_type, FieldType::Text | FieldType::TextArea | FieldType::List) {
            return Err(FormError::AiFillNotOffered { label: label.to_string() });
        }
        let key = (section_id.to_string(), label.to_string());
        if self.busy.contains(&key) {
            return Err(FormError::FieldBusy { label: label.to_string() });
        }
        self.busy.insert(key);

        let context = prompt::PromptContext::from_record(&self.record, &self.schema);
        Ok(PendingFill {
            section_id: section_id.to_string(),
            label: label.to_string(),
            generator: Arc::clone(&self.generator),
            job: FillJob::Text {
                field_type,
                instruction: prompt::field_prompt(label, &context),
                model: self.config.text_model,
            },
        })
    }

    /// Starts an image generation for an image field and marks it busy.
    ///
    /// An empty description fails fast with a validation notice and
    /// `Ok(None)`; no call is started.
    pub fn begin_ai_image_fill(
        &mut self,
        section_id: &str,
        label: &str,
        description: &str,
    ) -> Result<Option<PendingFill>, FormError> {
        let spec = self.spec(section_id, label)?;
        if spec.field_type != FieldType::Image
            || !spec
                .modes
                .as_deref()
                .is_some_and(|m| m.contains(&AcquisitionMode::AiGenerate))
        {
            return Err(FormError::AiFillNotOffered { label: label.to_string() });
        }
        if description.trim().is_empty() {
            self.push_notice(Notice::error(IMAGE_PROMPT_MISSING));
            return Ok(None);
        }
        let key = (section_id.to_string(), label.to_string());
        if self.busy.contains(&key) {
            return Err(FormError::FieldBusy { label: label.to_string() });
        }
        self.busy.insert(key);

        Ok(Some(PendingFill {
            section_id: section_id.to_string(),
            label: label.to_string(),
            generator: Arc::clone(&self.generator),
            job: FillJob::Image { instruction: prompt::image_prompt(description) },
        }))
    }

    /// Writes a finished generation call back to the record and clears
    /// the busy flag.
    ///
    /// Failures are absorbed here: a failed text fill stores a
    /// human-readable error string in the field and queues an error
    /// notice; a failed image fill queues a notice and leaves the field
    /// untouched (error text is never stored in image fields).
    pub fn apply_fill(&mut self, outcome: FillOutcome) -> Result<(), FormError> {
        let FillOutcome { section_id, label, result } = outcome;
        self.busy.remove(&(section_id.clone(), label.clone()));
        match result {
            FillResult::Text { field_type, result: Ok(text) } => {
                let value = match field_type {
                    FieldType::List => Value::Items(split_generated_items(&text)),
                    _ => Value::Text(text),
                };
                self.set_value(&section_id, &label, value)
            }
            FillResult::Text { field_type, result: Err(err) } => {
                log::warn!("AI fill failed for '{label}': {err}");
                let value = match field_type {
                    FieldType::List => Value::Items(vec![GENERATION_ERROR_TEXT.to_string()]),
                    _ => Value::Text(GENERATION_ERROR_TEXT.to_string()),
                };
                self.set_value(&section_id, &label, value)?;
                self.push_notice(Notice::error(GENERATION_ERROR_TEXT));
                Ok(())
            }
            FillResult::Image { result: Ok(image) } => {
                self.generated_images += 1;
                let file = FileRef {
                    name: format!("image-ia-{}.png", self.generated_images),
                    mime_type: image.mime_type,
                    size: image.data.len() as u64,
                    data: image.data,
                };
                self.set_value(&section_id, &label, Value::Attachment(file))
            }
            FillResult::Image { result: Err(err) } => {
                log::warn!("AI image fill failed for '{label}': {err}");
                self.push_notice(Notice::error(IMAGE_GENERATION_ERROR));
                Ok(())
            }
        }
    }

    /// Releases the busy flag of a fill that will never be applied.
    pub fn cancel_fill(&mut self, section_id: &str, label: &str) {
        self.busy.remove(&(section_id.to_string(), label.to_string()));
    }

    /// Runs a text fill to completion in place. The returned error only
    /// covers misuse (unknown path, field busy, fill not offered).
    pub async fn request_ai_fill(
        &mut self,
        section_id: &str,
        label: &str,
    ) -> Result<(), FormError> {
        let pending = self.begin_ai_fill(section_id, label)?;
        let outcome = pending.run().await;
        self.apply_fill(outcome)
    }

    /// Runs an image generation to completion in place.
    pub async fn request_ai_image_fill(
        &mut self,
        section_id: &str,
        label: &str,
        description: &str,
    ) -> Result<(), FormError> {
        let Some(pending) = self.begin_ai_image_fill(section_id, label, description)? else {
            return Ok(());
        };
        let outcome = pending.run().await;
        self.apply_fill(outcome)
    }

    // --- Notices and validation ---

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Currently visible notices; expired ones are dropped.
    pub fn notices(&mut self) -> Vec<&Notice> {
        let ttl = self.config.notice_ttl;
        self.notices.retain(|n| !n.expired(ttl));
        self.notices.iter().collect()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Required fields without a usable answer. Advisory only: nothing
    /// in the engine blocks on this, so partial drafts keep working.
    pub fn missing_required(&self) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        for section in &self.schema.sections {
            for field in &section.fields {
                if !field.required || field.field_type.is_operational() {
                    continue;
                }
                let blank = self
                    .record
                    .get(&section.id, &field.label)
                    .map(Value::is_blank)
                    .unwrap_or(true);
                if blank {
                    missing.push((section.id.clone(), field.label.clone()));
                }
            }
        }
        missing
    }
}

/// One in-flight generation call, detached from the engine.
///
/// Holds everything the service call needs, so the engine is free for
/// edits and further fills while it runs. Consumed by
/// [`PendingFill::run`]; the outcome goes back through
/// [`FormEngine::apply_fill`].
pub struct PendingFill {
    section_id: String,
    label: String,
    generator: Arc<dyn ContentGenerator>,
    job: FillJob,
}

impl std::fmt::Debug for PendingFill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFill")
            .field("section_id", &self.section_id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

enum FillJob {
    Text {
        field_type: FieldType,
        instruction: String,
        model: ModelSelector,
    },
    Image {
        instruction: String,
    },
}

impl PendingFill {
    pub fn section_id(&self) -> &str {
        &self.section_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Performs the service call.
    pub async fn run(self) -> FillOutcome {
        let PendingFill { section_id, label, generator, job } = self;
        let result = match job {
            FillJob::Text { field_type, instruction, model } => FillResult::Text {
                field_type,
                result: generator.generate_text(&instruction, model).await,
            },
            FillJob::Image { instruction } => FillResult::Image {
                result: generator.generate_image(&instruction).await,
            },
        };
        FillOutcome { section_id, label, result }
    }
}

/// The finished result of a [`PendingFill`], ready to be written back.
pub struct FillOutcome {
    section_id: String,
    label: String,
    result: FillResult,
}

enum FillResult {
    Text {
        field_type: FieldType,
        result: Result<String, GenerateError>,
    },
    Image {
        result: Result<GeneratedImage, GenerateError>,
    },
}

/// Generated list content arrives as one blob; split it into items,
/// shedding any bullet markers the model insisted on.
fn split_generated_items(text: &str) -> Vec<String> {
    let items: Vec<String> = text
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '•', '*'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();
    if items.is_empty() {
        vec![text.trim().to_string()]
    } else {
        items
    }
}
