//! Prompt builders for AI-assisted field fill.
//!
//! The instruction is assembled from the field's label plus whatever
//! project context is already filled in, so the model writes content
//! that fits the dossier instead of a generic paragraph.

use dossier_schema::{AnswerRecord, FieldType, FormSchema, Value};

/// Section and labels that carry the project context in the builtin
/// schema. `from_record` falls back to a label scan for custom schemas.
const CONTEXT_SECTION: &str = "presentation_projet";
const TITLE_LABEL: &str = "Titre du projet";
const SUMMARY_LABEL: &str = "Résumé du projet";

/// Already-filled answers worth citing in a generation instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptContext {
    pub project_title: Option<String>,
    pub project_summary: Option<String>,
}

impl PromptContext {
    /// Pulls the project title and summary out of the record. Looks in
    /// the conventional presentation section first, then anywhere a
    /// field carries the conventional label.
    pub fn from_record(record: &AnswerRecord, schema: &FormSchema) -> Self {
        Self {
            project_title: find_text(record, schema, TITLE_LABEL),
            project_summary: find_text(record, schema, SUMMARY_LABEL),
        }
    }

    fn sentences(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.project_title {
            out.push_str(&format!("Le projet s'intitule \"{title}\". "));
        }
        if let Some(summary) = &self.project_summary {
            out.push_str(&format!("Résumé du projet : {summary}. "));
        }
        out
    }
}

fn find_text(record: &AnswerRecord, schema: &FormSchema, label: &str) -> Option<String> {
    let mut section_ids: Vec<&str> = Vec::new();
    if schema.section(CONTEXT_SECTION).is_some() {
        section_ids.push(CONTEXT_SECTION);
    }
    section_ids.extend(
        schema
            .sections
            .iter()
            .filter(|s| s.id != CONTEXT_SECTION)
            .map(|s| s.id.as_str()),
    );

    for section_id in section_ids {
        let Some(spec) = schema.field(section_id, label) else { continue };
        if !matches!(spec.field_type, FieldType::Text | FieldType::TextArea) {
            continue;
        }
        if let Some(Value::Text(text)) = record.get(section_id, label)
            && !text.trim().is_empty()
        {
            return Some(text.clone());
        }
    }
    None
}

/// The instruction for filling one text field.
pub fn field_prompt(label: &str, context: &PromptContext) -> String {
    format!(
        "Tu es un expert en rédaction de dossiers de subvention. Rédige un contenu concis \
         et professionnel pour le champ suivant : \"{label}\". {}Ne fournis que le texte \
         demandé, sans introduction ni conclusion.",
        context.sentences()
    )
}

/// The instruction for generating an image from a user description.
pub fn image_prompt(description: &str) -> String {
    description.trim().to_string()
}
