//! Diagnostic infrastructure for the rehook class-to-hooks converter.
//!
//! This crate provides:
//! - Source location tracking (file, line, column)
//! - The fatal error taxonomy of the conversion pipeline
//! - Structured migration notes ([`ChangeRecord`]) with three certainty tiers
//! - Multiple output formats (terminal, JSON, plain text)
//!
//! # Example
//!
//! ```
//! use rehook_diagnostics::{
//!     ChangeCategory, ChangeLog, ChangeRecord, ReportEmitter, SimpleEmitter,
//! };
//!
//! let mut notes = ChangeLog::new();
//! notes.push(ChangeRecord::definite(
//!     ChangeCategory::StructuralConversion,
//!     "converted class `Counter` to a function component",
//! ));
//!
//! let stderr = std::io::stderr();
//! let mut emitter = SimpleEmitter::new(stderr.lock());
//! emitter.emit_notes(&notes).unwrap();
//! ```

pub mod emitter;
pub mod error;
pub mod notes;
pub mod source_cache;
pub mod span;

// Re-export commonly used types
pub use emitter::{JsonEmitter, ReportEmitter, SimpleEmitter, TerminalEmitter};
pub use error::ConvertError;
pub use notes::{Certainty, ChangeCategory, ChangeLog, ChangeRecord};
pub use source_cache::{SourceCache, SourceFile};
pub use span::{FileId, Location, Span};
