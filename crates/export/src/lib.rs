//! PDF export of a filled application dossier.
//!
//! [`export`] lays the record out as a paginated A4 document and
//! returns the bytes; [`suggested_filename`] and the [`dispatch`]
//! module cover the surrounding workflow (download name, send-by-mail
//! link). Output is deterministic so an unchanged record always
//! exports to identical bytes.

mod error;
mod image;
mod layout;
mod metrics;
mod writer;

pub mod dispatch;

pub use error::{DispatchError, ExportError};
pub use layout::{DEFAULT_TITLE, ExportOptions, export, project_title, suggested_filename};
pub use writer::PageMetrics;
