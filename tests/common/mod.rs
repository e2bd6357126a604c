pub mod pdf_assertions;

use std::sync::Arc;

use dossier::{
    AnswerRecord, ExportOptions, FormEngine, FormSchema, MockGenerator, Value,
    spontaneous_application_form,
};
use lopdf::Document as LopdfDocument;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around an exported PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Export a record against the built-in schema with default options
#[allow(dead_code)]
pub fn export_record(record: &AnswerRecord) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    export_with_schema(&spontaneous_application_form(), record)
}

#[allow(dead_code)]
pub fn export_with_schema(
    schema: &FormSchema,
    record: &AnswerRecord,
) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    let options = ExportOptions::default();
    let bytes = tokio::runtime::Runtime::new()?
        .block_on(async { dossier::export(schema, record, &options).await })?;
    GeneratedPdf::from_bytes(bytes)
}

/// Engine over the built-in schema with a canned-success generator
#[allow(dead_code)]
pub fn engine_with_text(text: &str) -> FormEngine {
    FormEngine::new(
        Arc::new(spontaneous_application_form()),
        Arc::new(MockGenerator::succeeding(text)),
    )
}

/// Engine over the built-in schema whose generator always fails
#[allow(dead_code)]
pub fn failing_engine() -> FormEngine {
    FormEngine::new(
        Arc::new(spontaneous_application_form()),
        Arc::new(MockGenerator::failing()),
    )
}

/// A small but representative filled record
#[allow(dead_code)]
pub fn sample_record() -> AnswerRecord {
    let mut record = AnswerRecord::new();
    record.set(
        "presentation_projet",
        "Titre du projet",
        Value::Text("Atelier Numérique".into()),
    );
    record.set(
        "presentation_projet",
        "Résumé du projet",
        Value::Text("Des ateliers hebdomadaires pour initier les jeunes au numérique.".into()),
    );
    record.set(
        "presentation_projet",
        "Public ciblé",
        Value::Items(vec!["Jeunes".into()]),
    );
    record.set(
        "budget_financement",
        "Coût total estimé (€)",
        Value::Number(1500.0),
    );
    record
}

/// A 1x1 PNG, enough for image embedding tests
#[allow(dead_code)]
pub fn tiny_png() -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    let img = image::RgbImage::from_pixel(1, 1, image::Rgb([0, 102, 255]));
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("in-memory PNG encoding");
    buffer.into_inner()
}
