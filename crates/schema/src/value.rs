//! The closed value variant stored in an [`AnswerRecord`](crate::AnswerRecord).
//!
//! Every field's value is one of the shapes below; the form engine rejects
//! any write whose shape does not match the field's declared type, so
//! shape mismatches cannot accumulate in a record.

use crate::SchemaError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A reference-counted container for shared, immutable data like images.
pub type SharedData = Arc<Vec<u8>>;

/// One user-entered (or AI-generated) value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// No answer yet; also used to clear a field.
    Empty,
    Text(String),
    Number(f64),
    /// Ordered string items for list, multi-select and checkbox fields.
    Items(Vec<String>),
    /// Ordered table rows.
    Rows(Vec<RowRecord>),
    /// A single uploaded, drawn or generated file.
    Attachment(FileRef),
    /// An ordered multi-file collection.
    Attachments(Vec<FileRef>),
}

impl Value {
    /// True when the value would produce no output in an exported
    /// document: `Empty`, a blank string, a zero-length sequence, or a
    /// table whose rows are all blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::Number(_) => false,
            Value::Items(items) => items.iter().all(|i| i.trim().is_empty()),
            Value::Rows(rows) => rows.iter().all(RowRecord::is_blank),
            Value::Attachment(_) => false,
            Value::Attachments(files) => files.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[String]> {
        match self {
            Value::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[RowRecord]> {
        match self {
            Value::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&FileRef> {
        match self {
            Value::Attachment(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_attachments(&self) -> Option<&[FileRef]> {
        match self {
            Value::Attachments(files) => Some(files),
            _ => None,
        }
    }
}

/// One table row: an ordered mapping from column name to cell text.
///
/// Insertion order is significant and survives serialization, so rows
/// round-trip in the column order the schema declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    cells: Vec<(String, String)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the cell for `column`, or appends it if absent.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for RowRecord {
    fn from_iter<T: IntoIterator<Item = (C, V)>>(iter: T) -> Self {
        let mut row = RowRecord::new();
        for (c, v) in iter {
            row.set(c, v);
        }
        row
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (c, v) in &self.cells {
            map.serialize_entry(c, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RowRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = RowRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to cell text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut row = RowRecord::new();
                while let Some((column, value)) = access.next_entry::<String, String>()? {
                    row.cells.push((column, value));
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// A stored file: uploaded, drawn, or returned by the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub mime_type: String,
    /// Byte length of the decoded payload.
    pub size: u64,
    #[serde(with = "base64_data")]
    pub data: SharedData,
}

impl FileRef {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            data: Arc::new(data),
        }
    }

    /// Parses a `data:<mime>;base64,<payload>` URL, the shape browsers
    /// hand back from file readers and canvases.
    pub fn from_data_url(name: impl Into<String>, url: &str) -> Result<Self, SchemaError> {
        use base64::Engine as _;
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| SchemaError::InvalidDataUrl("missing data: prefix".into()))?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| SchemaError::InvalidDataUrl("missing base64 marker".into()))?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| SchemaError::InvalidDataUrl(e.to_string()))?;
        Ok(Self::new(name, mime_type, data))
    }

    pub fn to_data_url(&self) -> String {
        use base64::Engine as _;
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(self.data.as_slice())
        )
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

mod base64_data {
    use super::SharedData;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::sync::Arc;

    pub fn serialize<S: Serializer>(data: &SharedData, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data.as_slice()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SharedData, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Arc::new)
            .map_err(serde::de::Error::custom)
    }
}
