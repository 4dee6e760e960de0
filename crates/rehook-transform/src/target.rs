//! The target-dialect representation: a function component built from hook
//! bindings, local functions, and effects. The emitter serializes this.

use rehook_parser::{ExportKind, StateField};

/// Dependency list of an effect binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectDeps {
    /// `[]`: run once after mount
    RunOnce,
    /// Explicit canonical tokens, e.g. `state.count`
    Fields(Vec<String>),
    /// `[state]`: dependencies could not be determined, so the effect
    /// re-runs on any state change
    WholeState,
    /// No dependency array, runs after every render
    EveryRender,
}

/// One hook-effect binding.
#[derive(Debug, Clone)]
pub struct Effect {
    /// Opaque body text; empty when the effect only exists for its cleanup
    pub body: String,
    /// Cleanup function body, returned from the effect
    pub cleanup: Option<String>,
    pub deps: EffectDeps,
}

/// One hook-state binding. Fields that originated from a single object
/// literal stay grouped in one hook call.
#[derive(Debug, Clone)]
pub struct HookState {
    pub fields: Vec<StateField>,
}

/// A local function inside the component (former method or preserved
/// lifecycle).
#[derive(Debug, Clone)]
pub struct LocalFn {
    pub name: String,
    pub params: String,
    pub body: String,
}

/// The converted component, ready for emission.
#[derive(Debug, Clone)]
pub struct FnComponent {
    pub name: String,
    pub export: ExportKind,
    /// Whether the function takes a `props` parameter
    pub takes_props: bool,
    /// Hook-state bindings, one per state-init site
    pub hook_states: Vec<HookState>,
    /// Constructor statements preserved verbatim at the top of the body
    pub prelude: Vec<String>,
    /// Former methods, source order
    pub functions: Vec<LocalFn>,
    /// Hook-effect bindings, fixed rule order
    pub effects: Vec<Effect>,
    /// Unrecognized lifecycle methods preserved as local functions
    pub preserved: Vec<LocalFn>,
    /// Render body text (the statements of the former render method)
    pub render_body: String,
    /// Hook names to import, deduplicated, fixed order
    pub hook_imports: Vec<String>,
}
