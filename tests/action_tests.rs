mod common;

use common::{TestResult, engine_with_text};
use dossier::{
    Action, DossierError, ExportOptions, FileStore, NoticeKind, Store, Value, run_action,
};

#[tokio::test]
async fn generate_pdf_returns_bytes_and_a_sanitized_filename() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut engine = engine_with_text("ok");
    engine.set_value(
        "presentation_projet",
        "Titre du projet",
        Value::Text("Atelier Numérique".into()),
    )?;

    let outcome = run_action(&mut engine, Action::GeneratePdf, &ExportOptions::default()).await?;
    assert!(outcome.pdf.starts_with(b"%PDF"));
    assert_eq!(outcome.filename, "Dossier_Atelier_Num_rique.pdf");
    assert!(outcome.mailto.is_none());
    assert!(engine
        .drain_notices()
        .iter()
        .any(|n| n.kind == NoticeKind::Success));
    Ok(())
}

#[tokio::test]
async fn send_without_a_recipient_is_refused_with_a_notice() -> TestResult {
    let mut engine = engine_with_text("ok");
    engine.set_value("presentation_projet", "Titre du projet", Value::Text("Atelier".into()))?;

    let err = run_action(&mut engine, Action::GeneratePdfAndSend, &ExportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DossierError::NoRecipient));
    assert!(engine
        .drain_notices()
        .iter()
        .any(|n| n.kind == NoticeKind::Error && n.message.contains("mairie destinataire")));
    Ok(())
}

#[tokio::test]
async fn send_builds_an_encoded_mailto_for_the_selected_mairie() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut engine = engine_with_text("ok");
    engine.set_value(
        "presentation_projet",
        "Titre du projet",
        Value::Text("Atelier Numérique".into()),
    )?;
    engine.set_value(
        "infos_generales",
        "Nom de la structure",
        Value::Text("Les Amis du Code".into()),
    )?;
    engine.set_value(
        "export_envoi",
        "Choisir la mairie destinataire",
        Value::Text("Parempuyre".into()),
    )?;

    let outcome =
        run_action(&mut engine, Action::GeneratePdfAndSend, &ExportOptions::default()).await?;
    let mailto = outcome.mailto.ok_or("missing mailto link")?;
    assert!(mailto.starts_with("mailto:ville@parempuyre.fr?subject="));
    assert!(mailto.contains("Candidature%20Spontan%C3%A9e"));
    assert!(mailto.contains("Dossier_Atelier_Num_rique.pdf"));
    assert!(mailto.contains("Les%20Amis%20du%20Code"));
    assert!(!mailto.contains(' '));
    Ok(())
}

#[tokio::test]
async fn send_to_an_unknown_mairie_fails_after_export() -> TestResult {
    let mut engine = engine_with_text("ok");
    engine.set_value(
        "export_envoi",
        "Choisir la mairie destinataire",
        Value::Text("Atlantide".into()),
    )?;

    let err = run_action(&mut engine, Action::GeneratePdfAndSend, &ExportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DossierError::Dispatch(_)));
    assert!(engine
        .drain_notices()
        .iter()
        .any(|n| n.message.contains("Atlantide")));
    Ok(())
}

#[tokio::test]
async fn record_persists_through_a_file_store() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path().join("dossier.json"));

    let mut engine = engine_with_text("ok");
    engine.set_value("presentation_projet", "Titre du projet", Value::Text("Atelier".into()))?;
    store.save(engine.record())?;

    let restored = store.load()?.ok_or("nothing persisted")?;
    assert_eq!(&restored, engine.record());
    Ok(())
}
