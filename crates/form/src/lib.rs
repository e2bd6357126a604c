//! The interactive form engine.
//!
//! [`FormEngine`] walks an immutable [`FormSchema`], keeps the
//! [`AnswerRecord`] synchronized with edits, maps every field type to a
//! toolkit-independent [`Widget`] descriptor, and drives AI-assisted
//! fill through an explicitly owned [`ContentGenerator`] session.
//!
//! All failures are terminal at this boundary: generation errors become
//! in-field placeholders or transient [`Notice`]s, never panics or
//! bubbled errors.

mod engine;
mod error;
mod notice;
mod widget;

pub use engine::{EngineConfig, FillOutcome, FormEngine, PendingFill};
pub use error::FormError;
pub use notice::{Notice, NoticeKind};
pub use widget::{FileSummary, TextKind, Widget};

pub use dossier_genai::ContentGenerator;
