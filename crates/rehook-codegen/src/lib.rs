//! Deterministic emitter for the rehook converter.
//!
//! Serializes a converted [`rehook_transform::FnComponent`] back into source
//! text and bundles it with the change records as a [`TransformResult`].

pub mod emit;

pub use emit::{emit, EmitOptions, OutputFile, TransformResult};
