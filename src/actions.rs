//! The export/send actions wired behind the form's action buttons.

use dossier_export::dispatch::{self, Municipality};
use dossier_export::{DEFAULT_TITLE, ExportOptions, export, project_title, suggested_filename};
use dossier_form::{FormEngine, Notice};
use dossier_schema::{FieldType, Value};

use crate::DossierError;

const NO_RECIPIENT: &str = "Veuillez d'abord sélectionner une mairie destinataire.";
const PDF_SUCCESS: &str = "PDF généré et téléchargé avec succès !";
const PDF_FAILURE: &str = "Une erreur est survenue lors de la génération du PDF.";
const SEND_SUCCESS: &str =
    "PDF généré ! Votre client de messagerie devrait s'ouvrir pour finaliser l'envoi.";

/// Fallbacks when the record does not name the project or structure.
const UNTITLED_PROJECT: &str = "Sans Titre";
const UNNAMED_STRUCTURE: &str = "Notre structure";

const STRUCTURE_SECTION: &str = "infos_generales";
const STRUCTURE_LABEL: &str = "Nom de la structure";

/// The closed set of routines an action button may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GeneratePdf,
    GeneratePdfAndSend,
}

impl Action {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "generate_pdf" => Some(Action::GeneratePdf),
            "generate_pdf_and_send" => Some(Action::GeneratePdfAndSend),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Action::GeneratePdf => "generate_pdf",
            Action::GeneratePdfAndSend => "generate_pdf_and_send",
        }
    }
}

/// What an action produced: the document bytes, the download name, and
/// the mailto link for the send variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub pdf: Vec<u8>,
    pub filename: String,
    pub mailto: Option<String>,
}

/// Runs one action end to end. Outcome notices land on the engine
/// either way; the returned error carries the cause for the caller.
pub async fn run_action(
    engine: &mut FormEngine,
    action: Action,
    options: &ExportOptions,
) -> Result<ActionOutcome, DossierError> {
    match action {
        Action::GeneratePdf => {
            let outcome = generate(engine, options).await?;
            engine.push_notice(Notice::success(PDF_SUCCESS));
            Ok(outcome)
        }
        Action::GeneratePdfAndSend => {
            let Some(commune) = selected_municipality(engine) else {
                engine.push_notice(Notice::error(NO_RECIPIENT));
                return Err(DossierError::NoRecipient);
            };
            let mut outcome = generate(engine, options).await?;

            let directory = dispatch::builtin_directory();
            let municipality = match resolve_recipient(&directory, &commune) {
                Ok(m) => m,
                Err(err) => {
                    engine.push_notice(Notice::error(format!(
                        "Email non trouvé pour la mairie de {commune}."
                    )));
                    return Err(err);
                }
            };

            let project = project_title(engine.record())
                .unwrap_or(UNTITLED_PROJECT)
                .to_string();
            let structure = structure_name(engine).unwrap_or_else(|| UNNAMED_STRUCTURE.to_string());
            outcome.mailto =
                Some(dispatch::mailto_link(&municipality, &project, &structure, &outcome.filename)?);
            engine.push_notice(Notice::success(SEND_SUCCESS));
            Ok(outcome)
        }
    }
}

async fn generate(
    engine: &mut FormEngine,
    options: &ExportOptions,
) -> Result<ActionOutcome, DossierError> {
    let title = project_title(engine.record()).unwrap_or(DEFAULT_TITLE).to_string();
    match export(engine.schema(), engine.record(), options).await {
        Ok(pdf) => Ok(ActionOutcome {
            pdf,
            filename: suggested_filename(&title),
            mailto: None,
        }),
        Err(err) => {
            log::error!("PDF export failed: {err}");
            engine.push_notice(Notice::error(PDF_FAILURE));
            Err(err.into())
        }
    }
}

fn resolve_recipient(
    directory: &[Municipality],
    commune: &str,
) -> Result<Municipality, DossierError> {
    let municipality = dispatch::find_municipality(directory, commune).ok_or_else(|| {
        dossier_export::DispatchError::UnknownMunicipality(commune.to_string())
    })?;
    if municipality.email.trim().is_empty() {
        return Err(dossier_export::DispatchError::MissingEmail {
            commune: commune.to_string(),
        }
        .into());
    }
    Ok(municipality)
}

/// The commune chosen in the first recipient selector of the schema.
fn selected_municipality(engine: &FormEngine) -> Option<String> {
    for section in &engine.schema().sections {
        for field in &section.fields {
            if field.field_type == FieldType::MunicipalitySelect {
                return engine
                    .record()
                    .get(&section.id, &field.label)
                    .and_then(Value::as_text)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
            }
        }
    }
    None
}

fn structure_name(engine: &FormEngine) -> Option<String> {
    engine
        .record()
        .get(STRUCTURE_SECTION, STRUCTURE_LABEL)
        .and_then(Value::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tags_round_trip() {
        for action in [Action::GeneratePdf, Action::GeneratePdfAndSend] {
            assert_eq!(Action::parse(action.tag()), Some(action));
        }
        assert_eq!(Action::parse("teleport"), None);
    }
}
