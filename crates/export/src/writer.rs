//! Low-level PDF assembly on top of `lopdf`.
//!
//! The builder buffers one operation list per page, collects image
//! XObjects as they are embedded, and assembles the document in one
//! pass at the end. Assembling last lets the footer closure see the
//! final page count. No creation date goes into the file, so the same
//! schema and record always produce the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::error::ExportError;
use crate::image::DecodedImage;
use crate::metrics::Font;

/// Page geometry in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageMetrics {
    /// A4 portrait with the margin the web app used.
    fn default() -> Self {
        Self { width: 595.28, height: 841.89, margin: 42.0 }
    }
}

impl PageMetrics {
    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn usable_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn components(self) -> [Object; 3] {
        [
            (f32::from(self.0) / 255.0).into(),
            (f32::from(self.1) / 255.0).into(),
            (f32::from(self.2) / 255.0).into(),
        ]
    }
}

pub(crate) struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_regular: ObjectId,
    font_bold: ObjectId,
    images: Vec<(String, ObjectId)>,
    pages: Vec<Vec<Operation>>,
    metrics: PageMetrics,
}

impl DocumentBuilder {
    pub(crate) fn new(metrics: PageMetrics) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_regular,
            font_bold,
            images: Vec::new(),
            pages: Vec::new(),
            metrics,
        }
    }

    pub(crate) fn start_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// One line of text with its baseline at `y` points from the page
    /// top.
    pub(crate) fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: &str,
    ) {
        let metrics = self.metrics;
        self.ops().extend(text_ops(metrics, x, y, font, size, color, text));
    }

    /// Horizontal rule at `y` points from the page top.
    pub(crate) fn draw_rule(&mut self, x1: f32, x2: f32, y: f32, width: f32, color: Rgb) {
        let pdf_y = self.metrics.height - y;
        let ops = self.ops();
        ops.push(Operation::new("w", vec![width.into()]));
        ops.push(Operation::new("RG", color.components().to_vec()));
        ops.push(Operation::new("m", vec![x1.into(), pdf_y.into()]));
        ops.push(Operation::new("l", vec![x2.into(), pdf_y.into()]));
        ops.push(Operation::new("S", vec![]));
    }

    /// Places a decoded image with its top-left corner at (`x`, `y`)
    /// points from the page top, scaled to `w` by `h` points.
    pub(crate) fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, w: f32, h: f32) {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if image.jpeg_passthrough {
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        }
        let mut stream = Stream::new(dict, image.data.clone());
        if image.jpeg_passthrough {
            stream.allows_compression = false;
        }
        let stream_id = self.doc.add_object(stream);
        let name = format!("Im{}", self.images.len() + 1);
        self.images.push((name.clone(), stream_id));

        let pdf_y = self.metrics.height - y - h;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), pdf_y.into()],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Assembles the document. `footer` receives the zero-based page
    /// index and the total page count, and returns the operations
    /// stamped onto that page.
    pub(crate) fn finish(
        mut self,
        footer: impl Fn(usize, usize) -> Vec<Operation>,
    ) -> Result<Vec<u8>, ExportError> {
        let total = self.pages.len();

        let mut xobjects = lopdf::Dictionary::new();
        for (name, id) in &self.images {
            xobjects.set(name.as_bytes(), Object::Reference(*id));
        }
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => self.font_regular,
                "F2" => self.font_bold,
            },
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(total);
        for (index, mut ops) in std::mem::take(&mut self.pages).into_iter().enumerate() {
            ops.extend(footer(index, total));
            let content = Content { operations: ops };
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    self.metrics.width.into(),
                    self.metrics.height.into(),
                ],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        self.doc.set_object(
            self.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Count" => total as i32,
                "Kids" => kids,
            },
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// The operation sequence for one line of text, baseline `y` points
/// from the page top. Shared with the footer post-pass, which builds
/// operations without a builder at hand.
pub(crate) fn text_ops(
    metrics: PageMetrics,
    x: f32,
    y: f32,
    font: Font,
    size: f32,
    color: Rgb,
    text: &str,
) -> Vec<Operation> {
    let pdf_y = metrics.height - y;
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font.resource_name().to_vec()), size.into()],
        ),
        Operation::new("rg", color.components().to_vec()),
        Operation::new("Td", vec![x.into(), pdf_y.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Maps text onto the WinAnsi code page. Latin-1 passes through, the
/// common typographic characters land on their WinAnsi slots, anything
/// else becomes '?'.
fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{0152}' => 0x8C,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{0153}' => 0x9C,
            c if (c as u32) <= 255 => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_keeps_latin1_and_maps_typographic_marks() {
        assert_eq!(to_win_ansi("é"), vec![0xE9]);
        assert_eq!(to_win_ansi("\u{2019}"), vec![0x92]);
        assert_eq!(to_win_ansi("\u{4E00}"), vec![b'?']);
    }

    #[test]
    fn empty_builder_still_produces_a_document() {
        let mut builder = DocumentBuilder::new(PageMetrics::default());
        builder.start_page();
        let bytes = builder.finish(|_, _| vec![]).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn same_input_same_bytes() {
        let render = || {
            let mut builder = DocumentBuilder::new(PageMetrics::default());
            builder.start_page();
            builder.draw_text(42.0, 60.0, Font::Bold, 18.0, Rgb(40, 40, 40), "Atelier");
            builder.finish(|_, _| vec![]).unwrap()
        };
        assert_eq!(render(), render());
    }
}
