mod common;

use common::{TestResult, engine_with_text, failing_engine};
use dossier::{AnswerRecord, FormError, Value, Widget};

const GENERATION_ERROR_TEXT: &str =
    "Une erreur est survenue lors de la génération du contenu. Veuillez réessayer.";

#[tokio::test]
async fn every_builtin_field_renders_a_widget() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let engine = engine_with_text("ok");
    for section in &engine.schema().sections.clone() {
        for (label, widget) in engine.render_section(&section.id)? {
            assert!(
                !matches!(widget, Widget::Broken { .. }),
                "field '{label}' in '{}' rendered Broken",
                section.id
            );
        }
    }
    Ok(())
}

#[tokio::test]
async fn shape_mismatch_is_rejected() {
    let mut engine = engine_with_text("ok");
    let err = engine
        .set_value("presentation_projet", "Titre du projet", Value::Number(3.0))
        .unwrap_err();
    assert!(matches!(err, FormError::ShapeMismatch { .. }));
    assert!(engine.record().is_empty());
}

#[tokio::test]
async fn removing_the_last_list_item_leaves_one_blank_slot() -> TestResult {
    let mut engine = engine_with_text("ok");
    engine.set_value(
        "presentation_projet",
        "Objectifs du projet",
        Value::Items(vec!["Seul objectif".into()]),
    )?;
    engine.remove_item("presentation_projet", "Objectifs du projet", 0)?;

    let widget = engine.render_field("presentation_projet", "Objectifs du projet")?;
    let Widget::ListEditor { items, .. } = widget else {
        panic!("expected a list editor, got {widget:?}");
    };
    assert_eq!(items, vec![String::new()]);
    Ok(())
}

#[tokio::test]
async fn removing_the_last_table_row_leaves_one_blank_row() -> TestResult {
    let mut engine = engine_with_text("ok");
    engine.update_cell(
        "budget_financement",
        "Détail des dépenses principales",
        0,
        "Poste de dépense",
        "Location",
    )?;
    for _ in 0..3 {
        engine.remove_row("budget_financement", "Détail des dépenses principales", 0)?;
    }
    let widget = engine.render_field("budget_financement", "Détail des dépenses principales")?;
    let Widget::TableEditor { rows, .. } = widget else {
        panic!("expected a table editor, got {widget:?}");
    };
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_blank());
    Ok(())
}

#[tokio::test]
async fn a_file_list_may_drop_to_zero_entries() -> TestResult {
    let mut engine = engine_with_text("ok");
    engine.push_attachment(
        "documents_joins",
        "Autres documents",
        dossier::FileRef::new("devis.pdf", "application/pdf", vec![1, 2, 3]),
    )?;
    engine.remove_attachment("documents_joins", "Autres documents", 0)?;

    let widget = engine.render_field("documents_joins", "Autres documents")?;
    let Widget::AttachmentGallery { files, .. } = widget else {
        panic!("expected an attachment gallery, got {widget:?}");
    };
    assert!(files.is_empty());
    Ok(())
}

#[tokio::test]
async fn record_survives_persistence_round_trip() -> TestResult {
    let mut engine = engine_with_text("ok");
    engine.set_value("presentation_projet", "Titre du projet", Value::Text("Atelier".into()))?;
    engine.set_value("budget_financement", "Coût total estimé (€)", Value::Number(1500.0))?;

    let json = engine.record().to_json()?;
    let restored = AnswerRecord::from_json(&json)?;
    assert_eq!(&restored, engine.record());
    Ok(())
}

#[tokio::test]
async fn successful_ai_fill_replaces_the_field_value() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut engine = engine_with_text("Un résumé convaincant du projet.");
    engine.request_ai_fill("presentation_projet", "Résumé du projet").await?;
    assert_eq!(
        engine.record().get("presentation_projet", "Résumé du projet"),
        Some(&Value::Text("Un résumé convaincant du projet.".into()))
    );
    Ok(())
}

#[tokio::test]
async fn ai_fill_on_a_list_field_splits_items() -> TestResult {
    let mut engine = engine_with_text("- Initier 100 jeunes\n- Produire un podcast");
    engine.request_ai_fill("presentation_projet", "Objectifs du projet").await?;
    assert_eq!(
        engine.record().get("presentation_projet", "Objectifs du projet"),
        Some(&Value::Items(vec![
            "Initier 100 jeunes".into(),
            "Produire un podcast".into()
        ]))
    );
    Ok(())
}

#[tokio::test]
async fn failed_ai_fill_leaves_a_readable_error_in_the_field() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut engine = failing_engine();
    engine.request_ai_fill("presentation_projet", "Résumé du projet").await?;
    assert_eq!(
        engine.record().get("presentation_projet", "Résumé du projet"),
        Some(&Value::Text(GENERATION_ERROR_TEXT.into()))
    );
    let notices = engine.drain_notices();
    assert!(notices.iter().any(|n| n.message == GENERATION_ERROR_TEXT));
    Ok(())
}

#[tokio::test]
async fn an_in_flight_fill_only_blocks_its_own_field() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut engine = engine_with_text("Un texte généré.");
    let summary = engine.begin_ai_fill("presentation_projet", "Résumé du projet")?;
    assert!(engine.is_busy("presentation_projet", "Résumé du projet"));

    let err = engine
        .begin_ai_fill("presentation_projet", "Résumé du projet")
        .unwrap_err();
    assert!(matches!(err, FormError::FieldBusy { .. }));

    let widget = engine.render_field("presentation_projet", "Résumé du projet")?;
    let Widget::TextArea { busy, .. } = widget else {
        panic!("expected a text area, got {widget:?}");
    };
    assert!(busy);

    let objectives = engine.begin_ai_fill("presentation_projet", "Objectifs du projet")?;
    let (first, second) = tokio::join!(summary.run(), objectives.run());
    engine.apply_fill(first)?;
    engine.apply_fill(second)?;

    assert!(!engine.is_busy("presentation_projet", "Résumé du projet"));
    assert_eq!(
        engine.record().get("presentation_projet", "Résumé du projet"),
        Some(&Value::Text("Un texte généré.".into()))
    );
    Ok(())
}

#[tokio::test]
async fn ai_fill_is_refused_where_not_offered() {
    let mut engine = engine_with_text("ok");
    let err = engine
        .request_ai_fill("presentation_projet", "Titre du projet")
        .await
        .unwrap_err();
    assert!(matches!(err, FormError::AiFillNotOffered { .. }));
}

#[tokio::test]
async fn empty_image_description_fails_fast_without_a_call() -> TestResult {
    let engine_schema = dossier::spontaneous_application_form();
    let mock = std::sync::Arc::new(dossier::MockGenerator::succeeding("unused"));
    let mut engine =
        dossier::FormEngine::new(std::sync::Arc::new(engine_schema), mock.clone());

    engine.request_ai_image_fill("infos_generales", "Photo", "   ").await?;
    assert_eq!(mock.call_count(), 0);
    assert!(engine.record().get("infos_generales", "Photo").is_none());
    assert!(!engine.drain_notices().is_empty());
    Ok(())
}

#[tokio::test]
async fn generated_image_lands_in_the_field() -> TestResult {
    let mock = std::sync::Arc::new(
        dossier::MockGenerator::succeeding("unused").with_image(common::tiny_png(), "image/png"),
    );
    let mut engine = dossier::FormEngine::new(
        std::sync::Arc::new(dossier::spontaneous_application_form()),
        mock,
    );
    engine
        .request_ai_image_fill("infos_generales", "Photo", "Un logo bleu et blanc")
        .await?;
    let value = engine.record().get("infos_generales", "Photo");
    let Some(Value::Attachment(file)) = value else {
        panic!("expected an attachment, got {value:?}");
    };
    assert_eq!(file.name, "image-ia-1.png");
    assert_eq!(file.mime_type, "image/png");
    Ok(())
}

#[tokio::test]
async fn missing_required_lists_untouched_mandatory_fields() -> TestResult {
    let mut engine = engine_with_text("ok");
    let before = engine.missing_required();
    assert!(before.iter().any(|(s, l)| s == "presentation_projet" && l == "Titre du projet"));

    engine.set_value("presentation_projet", "Titre du projet", Value::Text("Atelier".into()))?;
    let after = engine.missing_required();
    assert!(!after.iter().any(|(_, l)| l == "Titre du projet"));
    Ok(())
}
