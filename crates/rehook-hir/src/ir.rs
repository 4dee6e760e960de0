//! The normalized component representation.
//!
//! After normalization every state reference uses the canonical `state.<key>`
//! form, every handler binding is verified, and lifecycle methods are
//! classified. The structure is immutable from here on; the rule engine
//! consumes it to build the output representation.

use rehook_parser::{ExportKind, StateField};

/// Recognized lifecycle roles, plus a bucket for preserved unknown names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    /// `componentDidMount`
    Mount,
    /// `componentDidUpdate`
    Update,
    /// `componentWillUnmount`
    Unmount,
    /// Any other lifecycle-family method; preserved, never dropped
    Unknown,
}

/// A lifecycle method with canonicalized body text.
#[derive(Debug, Clone)]
pub struct LifecycleMethod {
    pub kind: LifecycleKind,
    pub name: String,
    pub params: String,
    pub body: String,
}

/// A plain method with canonicalized body text.
#[derive(Debug, Clone)]
pub struct Handler {
    pub name: String,
    pub params: String,
    pub body: String,
    /// Whether the constructor carried a `bind(this)` statement for it
    pub was_bound: bool,
}

/// The immutable output of normalization.
#[derive(Debug, Clone)]
pub struct NormalizedComponent {
    pub name: String,
    pub export: ExportKind,
    /// Whether any body referenced `this.props`
    pub uses_props: bool,
    /// State fields from the single `this.state = {...}` site, source order
    pub state_fields: Vec<StateField>,
    /// Opaque constructor statements, canonicalized, preserved verbatim
    pub constructor_extra: Vec<String>,
    /// All plain methods, source order
    pub handlers: Vec<Handler>,
    /// All lifecycle-family methods, source order
    pub lifecycle: Vec<LifecycleMethod>,
    /// Canonicalized render body
    pub render_body: String,
}

impl NormalizedComponent {
    /// The lifecycle method of a recognized kind, if present.
    pub fn lifecycle_of(&self, kind: LifecycleKind) -> Option<&LifecycleMethod> {
        self.lifecycle.iter().find(|l| l.kind == kind)
    }

    /// Lifecycle methods with unrecognized names, in source order.
    pub fn unknown_lifecycles(&self) -> impl Iterator<Item = &LifecycleMethod> {
        self.lifecycle
            .iter()
            .filter(|l| l.kind == LifecycleKind::Unknown)
    }

    pub fn has_state(&self) -> bool {
        !self.state_fields.is_empty()
    }
}

/// Classify a lifecycle-family method name.
pub fn classify_lifecycle(name: &str) -> LifecycleKind {
    match name {
        "componentDidMount" => LifecycleKind::Mount,
        "componentDidUpdate" => LifecycleKind::Update,
        "componentWillUnmount" => LifecycleKind::Unmount,
        _ => LifecycleKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_covers_the_recognized_set() {
        assert_eq!(classify_lifecycle("componentDidMount"), LifecycleKind::Mount);
        assert_eq!(classify_lifecycle("componentDidUpdate"), LifecycleKind::Update);
        assert_eq!(
            classify_lifecycle("componentWillUnmount"),
            LifecycleKind::Unmount
        );
        assert_eq!(
            classify_lifecycle("componentWillReceiveProps"),
            LifecycleKind::Unknown
        );
    }
}
