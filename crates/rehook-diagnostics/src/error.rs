//! The fatal error taxonomy of the conversion pipeline.
//!
//! Only the parser and the normalizer raise these: a fatal error means the
//! input is outside the supported class-component dialect, not that a rewrite
//! heuristic fell short. Rewrite-rule shortfalls are reported as
//! [`crate::ChangeRecord`]s instead and never abort a conversion.

use crate::span::Span;
use thiserror::Error;

/// A fatal conversion error. No output is produced when one is raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConvertError {
    /// The input is not a single supported class component (zero or multiple
    /// top-level component classes, undecomposable class body, or ambiguous
    /// state references).
    #[error("unsupported input: {reason}")]
    UnsupportedInput { reason: String, span: Span },

    /// `this.state` is missing, assigned more than once, or not initialized
    /// with a single flat object literal.
    #[error("unsupported state shape: {reason}")]
    UnsupportedStateShape { reason: String, span: Span },

    /// A constructor `bind` statement references a method the class never
    /// declares.
    #[error("dangling handler binding: `{handler}` is bound in the constructor but never declared")]
    DanglingHandlerBinding { handler: String, span: Span },
}

impl ConvertError {
    /// Stable error code, usable for lookup in docs and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::UnsupportedInput { .. } => "R001",
            ConvertError::UnsupportedStateShape { .. } => "R002",
            ConvertError::DanglingHandlerBinding { .. } => "R003",
        }
    }

    /// The dialect assumption the input violated, phrased so the caller can
    /// fix the input or fall back to another conversion path.
    pub fn dialect_assumption(&self) -> &'static str {
        match self {
            ConvertError::UnsupportedInput { .. } => {
                "input contains exactly one top-level class extending the component base, \
                 decomposable into constructor/render/lifecycle/methods, with each state \
                 field referenced in a single consistent style"
            }
            ConvertError::UnsupportedStateShape { .. } => {
                "the constructor assigns `this.state` exactly once, to a flat object literal"
            }
            ConvertError::DanglingHandlerBinding { .. } => {
                "every `this.x = this.x.bind(this)` statement names a declared method"
            }
        }
    }

    /// The byte range the error points at.
    pub fn span(&self) -> Span {
        match self {
            ConvertError::UnsupportedInput { span, .. }
            | ConvertError::UnsupportedStateShape { span, .. }
            | ConvertError::DanglingHandlerBinding { span, .. } => *span,
        }
    }

    /// Rebind the error's span to a cached file id.
    pub fn in_file(self, file_id: crate::FileId) -> Self {
        match self {
            ConvertError::UnsupportedInput { reason, span } => ConvertError::UnsupportedInput {
                reason,
                span: span.in_file(file_id),
            },
            ConvertError::UnsupportedStateShape { reason, span } => {
                ConvertError::UnsupportedStateShape {
                    reason,
                    span: span.in_file(file_id),
                }
            }
            ConvertError::DanglingHandlerBinding { handler, span } => {
                ConvertError::DanglingHandlerBinding {
                    handler,
                    span: span.in_file(file_id),
                }
            }
        }
    }
}
