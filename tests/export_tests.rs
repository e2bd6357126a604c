mod common;

use common::{TestResult, export_record, export_with_schema, sample_record};
use dossier::{AnswerRecord, FieldSpec, FieldType, FormSchema, RowRecord, Section, Value};

fn schema_with(sections: Vec<Section>) -> FormSchema {
    FormSchema {
        module: "Test".into(),
        version: "1.0".into(),
        description: String::new(),
        sections,
    }
}

#[test]
fn filled_record_exports_title_sections_and_values() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf = export_record(&sample_record())?;
    assert_pdf_page_count!(pdf, 1);
    assert_pdf_contains_text!(pdf, "Atelier");
    assert_pdf_contains_text!(pdf, "1500");
    assert_pdf_contains_text!(pdf, "Jeunes");
    assert_pdf_contains_text!(pdf, "Page 1 sur 1");
    Ok(())
}

#[test]
fn key_values_land_on_the_first_page_in_form_order() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf = export_record(&sample_record())?;
    let first = common::pdf_assertions::extract_page_text(&pdf.doc, 1);
    let position = |marker: &str| {
        first
            .find(marker)
            .ok_or_else(|| format!("'{marker}' missing from page 1:\n{first}"))
    };
    let title = position("Atelier")?;
    let summary = position("hebdomadaires")?;
    let audience = position("Jeunes")?;
    let amount = position("1500")?;
    assert!(title < summary, "title after summary in:\n{first}");
    assert!(summary < audience, "summary after audience in:\n{first}");
    assert!(audience < amount, "audience after amount in:\n{first}");
    Ok(())
}

#[test]
fn untitled_record_falls_back_to_default_title() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut record = AnswerRecord::new();
    record.set("budget_financement", "Montant sollicité (€)", Value::Number(2000.0));
    let pdf = export_record(&record)?;
    assert_pdf_contains_text!(pdf, "Dossier de Candidature");
    Ok(())
}

#[test]
fn pages_are_a4_portrait() -> TestResult {
    let pdf = export_record(&sample_record())?;
    let (w, h) = common::pdf_assertions::get_page_dimensions(&pdf.doc, 1)
        .ok_or("no MediaBox on page 1")?;
    assert!((w - 595.28).abs() < 1.0, "width {w}");
    assert!((h - 841.89).abs() < 1.0, "height {h}");
    Ok(())
}

#[test]
fn export_is_deterministic() -> TestResult {
    let record = sample_record();
    let first = export_record(&record)?;
    let second = export_record(&record)?;
    assert_eq!(first.bytes, second.bytes);
    Ok(())
}

#[test]
fn blank_values_and_empty_sections_are_omitted() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut record = sample_record();
    record.set("impact_evaluation", "Objectifs mesurables", Value::Items(vec!["".into(), "  ".into()]));
    let pdf = export_record(&record)?;
    // All-blank list: neither the field nor its section heading appears.
    assert_pdf_not_contains_text!(pdf, "Objectifs mesurables");
    assert_pdf_not_contains_text!(pdf, "Impact");
    // Sections with no answers at all are skipped too.
    assert_pdf_not_contains_text!(pdf, "Partenaires et Soutiens");
    Ok(())
}

#[test]
fn action_section_and_file_fields_are_omitted() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut record = sample_record();
    record.set(
        "export_envoi",
        "Choisir la mairie destinataire",
        Value::Text("Parempuyre".into()),
    );
    record.set(
        "documents_joins",
        "Statuts ou Kbis",
        Value::Attachment(dossier::FileRef::new("statuts.pdf", "application/pdf", vec![1, 2, 3])),
    );
    let pdf = export_record(&record)?;
    assert_pdf_not_contains_text!(pdf, "Export & Envoi");
    assert_pdf_not_contains_text!(pdf, "Parempuyre");
    assert_pdf_not_contains_text!(pdf, "Statuts ou Kbis");
    Ok(())
}

#[test]
fn tables_render_numbered_rows_with_named_cells() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut record = sample_record();
    let rows = vec![
        [("Poste de dépense", "Location de salle"), ("Montant (€)", "400")]
            .into_iter()
            .collect::<RowRecord>(),
        RowRecord::new(),
        [("Poste de dépense", "Intervenants"), ("Montant (€)", "900")]
            .into_iter()
            .collect::<RowRecord>(),
    ];
    record.set("budget_financement", "Détail des dépenses principales", Value::Rows(rows));

    let pdf = export_record(&record)?;
    assert_pdf_contains_text!(pdf, "Ligne 1:");
    assert_pdf_contains_text!(pdf, "Location de salle");
    assert_pdf_contains_text!(pdf, "Intervenants");
    // The blank middle row keeps its index but produces no output.
    assert_pdf_contains_text!(pdf, "Ligne 3:");
    assert_pdf_not_contains_text!(pdf, "Ligne 2:");
    Ok(())
}

#[test]
fn lists_render_one_item_per_line() -> TestResult {
    let mut record = sample_record();
    record.set(
        "presentation_projet",
        "Objectifs du projet",
        Value::Items(vec![
            "Initier 100 jeunes".into(),
            "".into(),
            "Produire un podcast".into(),
        ]),
    );
    let pdf = export_record(&record)?;
    assert_pdf_contains_text!(pdf, "Initier 100 jeunes");
    assert_pdf_contains_text!(pdf, "Produire un podcast");
    Ok(())
}

#[test]
fn multi_selects_join_and_slider_prints_months() -> TestResult {
    let mut record = sample_record();
    record.set(
        "presentation_projet",
        "Public ciblé",
        Value::Items(vec!["Jeunes".into(), "Familles".into()]),
    );
    record.set(
        "presentation_projet",
        "Durée du projet (en mois)",
        Value::Number(12.0),
    );
    let pdf = export_record(&record)?;
    assert_pdf_contains_text!(pdf, "Jeunes, Familles");
    assert_pdf_contains_text!(pdf, "12 mois");
    Ok(())
}

#[test]
fn whole_numbers_print_without_decimal_point() -> TestResult {
    let pdf = export_record(&sample_record())?;
    assert_pdf_contains_text!(pdf, "1500");
    assert_pdf_not_contains_text!(pdf, "1500.0");
    Ok(())
}

#[test]
fn custom_schema_exports_without_the_builtin_sections() -> TestResult {
    let schema = schema_with(vec![
        Section::new("faits", "Les Faits")
            .field(FieldSpec::new("Constat", FieldType::TextArea)),
    ]);
    let mut record = AnswerRecord::new();
    record.set("faits", "Constat", Value::Text("Un constat sans fard".into()));
    let pdf = export_with_schema(&schema, &record)?;
    assert_pdf_contains_text!(pdf, "Les Faits");
    assert_pdf_contains_text!(pdf, "Un constat sans fard");
    assert_pdf_not_contains_text!(pdf, "Informations G");
    Ok(())
}

#[test]
fn suggested_filename_matches_title() {
    assert_eq!(
        dossier::suggested_filename("Atelier Numérique 2024"),
        "Dossier_Atelier_Num_rique_2024.pdf"
    );
    assert_eq!(
        dossier::suggested_filename("Dossier de Candidature"),
        "Dossier_Dossier_de_Candidature.pdf"
    );
}
