//! Greedy forward-fill document layout.
//!
//! Content flows top to bottom with a running cursor; when a block
//! would cross the bottom margin the cursor jumps to a fresh page. A
//! block is never split across a page boundary and nothing is ever
//! moved back up. The original layout measured in millimetres, so the
//! constants here are millimetre values scaled to points.

use dossier_schema::{AnswerRecord, FieldSpec, FieldType, FileRef, FormSchema, RowRecord, Value};
use lopdf::content::Operation;

use crate::error::ExportError;
use crate::image::{self, DecodedImage};
use crate::metrics::{self, Font};
use crate::writer::{DocumentBuilder, PageMetrics, Rgb};

/// Document title when the record names no project.
pub const DEFAULT_TITLE: &str = "Dossier de Candidature";

const IMAGE_LOAD_ERROR: &str = "[Erreur de chargement de l'image]";

/// Section and label the project title conventionally lives under.
const TITLE_SECTION: &str = "presentation_projet";
const TITLE_LABEL: &str = "Titre du projet";

const MM: f32 = 72.0 / 25.4;

const TITLE_SIZE: f32 = 18.0;
const SECTION_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

/// Body line advance.
const LINE: f32 = 5.0 * MM;
/// Indent from the margin to the value column.
const VALUE_OFFSET: f32 = 45.0 * MM;
/// Wrap width for the bold label column.
const LABEL_WIDTH: f32 = 40.0 * MM;
/// Image box: target width, height cap.
const IMAGE_WIDTH: f32 = 60.0 * MM;
const IMAGE_MAX_HEIGHT: f32 = 80.0 * MM;

const TITLE_COLOR: Rgb = Rgb(40, 40, 40);
const SECTION_COLOR: Rgb = Rgb(0, 102, 255);
const LABEL_COLOR: Rgb = Rgb(55, 65, 81);
const VALUE_COLOR: Rgb = Rgb(80, 80, 80);
const RULE_COLOR: Rgb = Rgb(220, 220, 220);
const FOOTER_COLOR: Rgb = Rgb(150, 150, 150);

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub page: PageMetrics,
    /// Left half of the page footer, before the page counter.
    pub footer_app_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page: PageMetrics::default(),
            footer_app_name: "Généré par AssoCall AI".to_string(),
        }
    }
}

/// Renders the record as a paginated document and returns the PDF
/// bytes. Blank values, non-image attachments, operational fields and
/// pure action sections produce no output. The same schema, record and
/// options always produce the same bytes.
pub async fn export(
    schema: &FormSchema,
    record: &AnswerRecord,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let mut layout = Layout::new(options.page);
    let title = project_title(record)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    layout.write_title(&title);

    for section in &schema.sections {
        if section.is_action_section() {
            continue;
        }
        let fields: Vec<&FieldSpec> = section
            .fields
            .iter()
            .filter(|f| has_output(f, record.get(&section.id, &f.label)))
            .collect();
        if fields.is_empty() {
            continue;
        }
        layout.write_section_title(&section.title);
        for field in fields {
            // has_output already checked presence.
            let Some(value) = record.get(&section.id, &field.label) else {
                continue;
            };
            layout.write_field(field, value).await?;
        }
        layout.advance(5.0 * MM);
    }

    let footer_left = options.footer_app_name.clone();
    let page = options.page;
    layout.builder.finish(move |index, total| {
        footer_ops(&footer_left, index, total, page)
    })
}

/// "Dossier_<title>.pdf" with every non-ASCII-alphanumeric character
/// mapped to an underscore.
pub fn suggested_filename(project_title: &str) -> String {
    let sanitized: String = project_title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("Dossier_{sanitized}.pdf")
}

/// The conventional project-title answer, if entered.
pub fn project_title(record: &AnswerRecord) -> Option<&str> {
    record
        .get(TITLE_SECTION, TITLE_LABEL)
        .and_then(Value::as_text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn has_output(field: &FieldSpec, value: Option<&Value>) -> bool {
    if field.field_type.is_operational() {
        return false;
    }
    match field.field_type {
        FieldType::File | FieldType::FileList => false,
        _ => value.is_some_and(|v| !v.is_blank()),
    }
}

fn footer_ops(app_name: &str, index: usize, total: usize, page: PageMetrics) -> Vec<Operation> {
    let text = format!("{} | Page {} sur {}", app_name, index + 1, total);
    crate::writer::text_ops(
        page,
        page.margin,
        page.height - 10.0 * MM,
        Font::Regular,
        FOOTER_SIZE,
        FOOTER_COLOR,
        &text,
    )
}

struct Layout {
    builder: DocumentBuilder,
    page: PageMetrics,
    y: f32,
}

impl Layout {
    fn new(page: PageMetrics) -> Self {
        let mut builder = DocumentBuilder::new(page);
        builder.start_page();
        Self { builder, page, y: page.margin }
    }

    /// Starts a new page when `needed` points would cross the bottom
    /// margin.
    fn ensure_room(&mut self, needed: f32) {
        if self.y + needed > self.page.height - self.page.margin {
            self.builder.start_page();
            self.y = self.page.margin;
        }
    }

    fn advance(&mut self, amount: f32) {
        self.y += amount;
    }

    /// Baseline offset: the cursor tracks the top of the current line.
    fn baseline(&self, size: f32) -> f32 {
        self.y + size * 0.8
    }

    fn write_title(&mut self, text: &str) {
        self.ensure_room(15.0 * MM);
        let x = (self.page.width - metrics::text_width(text, Font::Bold, TITLE_SIZE)) / 2.0;
        let baseline = self.baseline(TITLE_SIZE);
        self.builder
            .draw_text(x.max(self.page.margin), baseline, Font::Bold, TITLE_SIZE, TITLE_COLOR, text);
        self.y += 10.0 * MM;
        self.builder.draw_rule(
            self.page.margin,
            self.page.width - self.page.margin,
            self.y,
            0.7,
            RULE_COLOR,
        );
        self.y += 10.0 * MM;
    }

    fn write_section_title(&mut self, text: &str) {
        self.ensure_room(12.0 * MM);
        let baseline = self.baseline(SECTION_SIZE);
        self.builder
            .draw_text(self.page.margin, baseline, Font::Bold, SECTION_SIZE, SECTION_COLOR, text);
        self.y += 8.0 * MM;
    }

    async fn write_field(&mut self, field: &FieldSpec, value: &Value) -> Result<(), ExportError> {
        match (field.field_type, value) {
            (FieldType::List, Value::Items(items)) => self.write_list(&field.label, items),
            (FieldType::Table, Value::Rows(rows)) => {
                self.write_table(&field.label, field.columns.as_deref().unwrap_or(&[]), rows)
            }
            (FieldType::DurationSlider, Value::Number(months)) => {
                self.write_label_value(&field.label, &format!("{} mois", format_number(*months)))
            }
            (_, Value::Text(text)) => self.write_label_value(&field.label, text),
            (_, Value::Number(n)) => self.write_label_value(&field.label, &format_number(*n)),
            (_, Value::Items(items)) => {
                // Multi-selects and checkbox groups print as one joined line.
                self.write_label_value(&field.label, &items.join(", "))
            }
            (_, Value::Attachment(file)) => self.write_image(&field.label, file).await?,
            (_, Value::Attachments(files)) => {
                for file in files {
                    self.write_image(&field.label, file).await?;
                }
            }
            (_, Value::Empty) | (_, Value::Rows(_)) => {}
        }
        Ok(())
    }

    fn write_label(&mut self, label: &str) -> usize {
        let text = format!("{label}:");
        let lines = metrics::wrap(&text, Font::Bold, BODY_SIZE, LABEL_WIDTH);
        for (i, line) in lines.iter().enumerate() {
            let baseline = self.y + i as f32 * LINE + BODY_SIZE * 0.8;
            self.builder
                .draw_text(self.page.margin, baseline, Font::Bold, BODY_SIZE, LABEL_COLOR, line);
        }
        lines.len()
    }

    fn write_label_value(&mut self, label: &str, value: &str) {
        let value_x = self.page.margin + VALUE_OFFSET;
        let value_width = self.page.usable_width() - VALUE_OFFSET;
        let value_lines = metrics::wrap(value, Font::Regular, BODY_SIZE, value_width);
        let label_lines = metrics::wrap(&format!("{label}:"), Font::Bold, BODY_SIZE, LABEL_WIDTH);
        let height = label_lines.len().max(value_lines.len()) as f32 * LINE;
        self.ensure_room(height + 3.0 * MM);

        self.write_label(label);
        for (i, line) in value_lines.iter().enumerate() {
            let baseline = self.y + i as f32 * LINE + BODY_SIZE * 0.8;
            self.builder
                .draw_text(value_x, baseline, Font::Regular, BODY_SIZE, VALUE_COLOR, line);
        }
        self.y += height + 3.0 * MM;
    }

    fn write_list(&mut self, label: &str, items: &[String]) {
        self.ensure_room(8.0 * MM);
        let baseline = self.baseline(BODY_SIZE);
        self.builder.draw_text(
            self.page.margin,
            baseline,
            Font::Bold,
            BODY_SIZE,
            LABEL_COLOR,
            &format!("{label}:"),
        );
        self.y += 6.0 * MM;

        let item_x = self.page.margin + 5.0 * MM;
        let item_width = self.page.usable_width() - 5.0 * MM;
        for item in items {
            if item.trim().is_empty() {
                continue;
            }
            let lines = metrics::wrap(&format!("\u{2022} {item}"), Font::Regular, BODY_SIZE, item_width);
            self.ensure_room(lines.len() as f32 * LINE);
            for line in &lines {
                let baseline = self.baseline(BODY_SIZE);
                self.builder
                    .draw_text(item_x, baseline, Font::Regular, BODY_SIZE, VALUE_COLOR, line);
                self.y += LINE;
            }
        }
        self.y += 4.0 * MM;
    }

    fn write_table(&mut self, label: &str, columns: &[String], rows: &[RowRecord]) {
        self.ensure_room(10.0 * MM);
        let baseline = self.baseline(BODY_SIZE);
        self.builder
            .draw_text(self.page.margin, baseline, Font::Bold, BODY_SIZE, LABEL_COLOR, label);
        self.y += 6.0 * MM;

        let row_x = self.page.margin + 5.0 * MM;
        let cell_x = self.page.margin + 10.0 * MM;
        let cell_width = self.page.usable_width() - 10.0 * MM;
        for (index, row) in rows.iter().enumerate() {
            if row.is_blank() {
                continue;
            }
            self.ensure_room(10.0 * MM);
            let baseline = self.baseline(BODY_SIZE);
            self.builder.draw_text(
                row_x,
                baseline,
                Font::Bold,
                BODY_SIZE,
                VALUE_COLOR,
                &format!("Ligne {}:", index + 1),
            );
            self.y += LINE;
            for column in columns {
                let Some(cell) = row.get(column) else { continue };
                if cell.trim().is_empty() {
                    continue;
                }
                let lines =
                    metrics::wrap(&format!("{column}: {cell}"), Font::Regular, BODY_SIZE, cell_width);
                self.ensure_room(lines.len() as f32 * LINE);
                for line in &lines {
                    let baseline = self.baseline(BODY_SIZE);
                    self.builder
                        .draw_text(cell_x, baseline, Font::Regular, BODY_SIZE, VALUE_COLOR, line);
                    self.y += LINE;
                }
            }
            self.y += 2.0 * MM;
        }
        self.y += 4.0 * MM;
    }

    /// Decodes off the runtime thread, then sizes and places the image.
    /// The page-break check runs after decoding, once the real height
    /// is known. Undecodable bytes degrade to a placeholder line; a
    /// decode task that dies aborts the export.
    async fn write_image(&mut self, label: &str, file: &FileRef) -> Result<(), ExportError> {
        if !file.is_image() {
            return Ok(());
        }
        self.ensure_room(8.0 * MM);
        self.write_label(label);
        self.y += 2.0 * MM;
        let value_x = self.page.margin + VALUE_OFFSET;

        let data = file.data.clone();
        let decoded: Result<DecodedImage, _> =
            tokio::task::spawn_blocking(move || image::decode(&data))
                .await
                .map_err(|e| ExportError::Task(e.to_string()))?;

        match decoded {
            Ok(img) => {
                let (w, h) = img.fit(IMAGE_WIDTH, IMAGE_MAX_HEIGHT);
                self.ensure_room(h + 5.0 * MM);
                self.builder.draw_image(&img, value_x, self.y, w, h);
                self.y += h + 5.0 * MM;
            }
            Err(reason) => {
                log::warn!("image '{}' could not be embedded: {reason}", file.name);
                let baseline = self.baseline(BODY_SIZE);
                self.builder.draw_text(
                    value_x,
                    baseline,
                    Font::Regular,
                    BODY_SIZE,
                    VALUE_COLOR,
                    IMAGE_LOAD_ERROR,
                );
                self.y += LINE;
            }
        }
        self.y += 3.0 * MM;
        Ok(())
    }
}

/// Prints whole numbers without a decimal point, as entered.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_sanitizes_non_alphanumerics() {
        assert_eq!(
            suggested_filename("Atelier Numérique 2024"),
            "Dossier_Atelier_Num_rique_2024.pdf"
        );
        assert_eq!(suggested_filename(""), "Dossier_.pdf");
    }

    #[test]
    fn whole_numbers_print_without_decimals() {
        assert_eq!(format_number(1500.0), "1500");
        assert_eq!(format_number(12.5), "12.5");
    }

    #[test]
    fn operational_and_file_fields_have_no_output() {
        let button = FieldSpec::new("Exporter", FieldType::ActionButton);
        assert!(!has_output(&button, None));

        let file = FieldSpec::new("Statuts", FieldType::File);
        let value = Value::Attachment(FileRef::new("statuts.pdf", "application/pdf", vec![1]));
        assert!(!has_output(&file, Some(&value)));

        let image = FieldSpec::new("Logo", FieldType::Image);
        let logo = Value::Attachment(FileRef::new("logo.png", "image/png", vec![1]));
        assert!(has_output(&image, Some(&logo)));
    }

    #[test]
    fn blank_values_have_no_output() {
        let field = FieldSpec::new("Titre", FieldType::Text);
        assert!(!has_output(&field, Some(&Value::Text("   ".into()))));
        assert!(!has_output(&field, None));
        assert!(has_output(&field, Some(&Value::Text("Atelier".into()))));
    }
}
