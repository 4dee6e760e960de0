//! Rewrite rules for the rehook converter.
//!
//! This crate turns a [`rehook_hir::NormalizedComponent`] into the
//! target-dialect [`FnComponent`] by applying a fixed, ordered rule set:
//! structure, state, lifecycle, handlers, imports. Rules degrade to notes
//! instead of failing; the output is always complete.

pub mod rules;
pub mod target;

pub use rules::apply_rules;
pub use target::{Effect, EffectDeps, FnComponent, HookState, LocalFn};
