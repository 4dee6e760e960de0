//! Normalized intermediate representation for the rehook converter.
//!
//! The normalizer sits between the structural parser and the rewrite-rule
//! engine: it resolves state-reference aliases to one canonical form, verifies
//! the component is inside the supported dialect, and classifies lifecycle
//! methods. After this stage the component representation is immutable.

pub mod ir;
pub mod lower;

pub use ir::{classify_lifecycle, Handler, LifecycleKind, LifecycleMethod, NormalizedComponent};
pub use lower::normalize;
