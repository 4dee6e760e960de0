//! Structural parser for the supported class-component dialect.
//!
//! The parser locates exactly one top-level class extending a component base
//! type and decomposes it into a [`ComponentDescriptor`]: state shape,
//! constructor leftovers, bound handlers, lifecycle methods, plain methods,
//! and the render body. Matching is structural (brace-depth aware, string and
//! comment aware), never textual regex over nested braces.
//!
//! Bodies stay opaque text at this stage; reference canonicalization is the
//! normalizer's job in `rehook-hir`.

use log::debug;
use rehook_diagnostics::{ConvertError, Span};

pub mod class_body;
pub mod scanner;

pub use scanner::Scanner;

use class_body::{parse_constructor, split_members};

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Base types that mark a class as a component, e.g. `React.Component`.
    pub component_bases: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            component_bases: vec![
                "React.Component".to_string(),
                "Component".to_string(),
                "React.PureComponent".to_string(),
                "PureComponent".to_string(),
            ],
        }
    }
}

/// How the class declaration was exported, mirrored onto the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportKind {
    #[default]
    None,
    Named,
    Default,
}

/// One `key: initializer` pair from the state object literal, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateField {
    pub key: String,
    /// Initial value expression, verbatim
    pub init: String,
    pub span: Span,
}

/// A class method: parameter list text and opaque body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub params: String,
    pub body: String,
    /// Span of the whole member, from its name through its closing brace
    pub span: Span,
    /// Span of the body text (between, not including, the body braces)
    pub body_span: Span,
}

/// The parsed input unit: one class component, decomposed.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// Component class name (a valid identifier)
    pub name: String,
    /// The base type it extended, e.g. `React.Component`
    pub base: String,
    pub export: ExportKind,
    /// State fields in source order; keys are unique
    pub state_fields: Vec<StateField>,
    /// Span of the `this.state = {...}` statement, if any
    pub state_span: Option<Span>,
    /// Constructor statements other than `super(...)`, state init, and binds
    pub constructor_extra: Vec<String>,
    /// Methods bound with `this.x = this.x.bind(this)`, in binding order
    pub bound_handlers: Vec<String>,
    /// Plain methods (excludes constructor, render, lifecycle), in source order
    pub methods: Vec<(String, Method)>,
    /// Lifecycle-family methods, recognized or not, in source order
    pub lifecycle: Vec<(String, Method)>,
    /// The render method body, opaque text
    pub render_body: String,
    /// Span of the whole class declaration
    pub span: Span,
}

/// A top-level `class Name extends Base { ... }` found during scanning.
#[derive(Debug)]
struct ClassMatch {
    name: String,
    base: String,
    export: ExportKind,
    /// Inner body (between the class braces)
    body: Span,
    span: Span,
}

/// Parse source text into a [`ComponentDescriptor`].
///
/// Fails with [`ConvertError::UnsupportedInput`] when the source does not
/// contain exactly one top-level supported component class, or its body does
/// not decompose; with [`ConvertError::UnsupportedStateShape`] when the state
/// initializer is not a single flat object literal.
pub fn parse(source: &str, options: &ParseOptions) -> Result<ComponentDescriptor, ConvertError> {
    let mut classes = scan_classes(source, options)?;

    match classes.len() {
        1 => {}
        0 => {
            return Err(ConvertError::UnsupportedInput {
                reason: format!(
                    "no top-level class extending {} found",
                    options.component_bases.join(" / ")
                ),
                span: Span::detached(0, source.len().min(1)),
            });
        }
        n => {
            let second = classes[1].span;
            return Err(ConvertError::UnsupportedInput {
                reason: format!("found {n} component classes, expected exactly 1"),
                span: second,
            });
        }
    }
    let class = classes.remove(0);
    debug!(
        "found component class `{}` extending {} at {}..{}",
        class.name, class.base, class.span.start, class.span.end
    );

    let body = &source[class.body.start as usize..class.body.end as usize];
    let members = split_members(body, class.body.start as usize)?;

    let render = members.render.ok_or_else(|| ConvertError::UnsupportedInput {
        reason: format!("component `{}` has no render method", class.name),
        span: class.span,
    })?;

    let ctor_parts = match &members.constructor {
        Some(ctor) => parse_constructor(ctor)?,
        None => Default::default(),
    };

    Ok(ComponentDescriptor {
        name: class.name,
        base: class.base,
        export: class.export,
        state_fields: ctor_parts.state_fields,
        state_span: ctor_parts.state_span,
        constructor_extra: ctor_parts.extra,
        bound_handlers: ctor_parts.bound_handlers,
        methods: members.methods,
        lifecycle: members.lifecycle,
        render_body: render.body,
        span: class.span,
    })
}

/// Heuristic for input that is already in the functional dialect: no component
/// class, but hook calls or an arrow component returning markup. Used by the
/// conversion facade to pass such input through unchanged instead of failing.
pub fn looks_already_modern(source: &str, options: &ParseOptions) -> bool {
    match scan_classes(source, options) {
        Ok(classes) if !classes.is_empty() => return false,
        Err(_) => return false,
        Ok(_) => {}
    }
    if source.contains("useState(") || source.contains("useEffect(") {
        return true;
    }
    // Hook-free function components (stateless, lifecycle-free) have no hook
    // calls to spot; an arrow binding returning markup is enough.
    source.contains("=>") && (source.contains("</") || source.contains("/>"))
}

/// Scan the top level of the source for component class declarations.
/// Classes nested inside other braces (function bodies, object literals) are
/// intentionally not visited; classes extending unrelated bases are skipped.
fn scan_classes(source: &str, options: &ParseOptions) -> Result<Vec<ClassMatch>, ConvertError> {
    let mut scanner = Scanner::new(source);
    let mut classes = Vec::new();
    let mut export = ExportKind::None;

    loop {
        scanner.skip_trivia();
        let Some(c) = scanner.peek() else { break };
        match c {
            '\'' | '"' | '`' => scanner.skip_string(),
            '{' | '(' | '[' => {
                scanner.bump();
                let close = match c {
                    '{' => '}',
                    '(' => ')',
                    _ => ']',
                };
                scanner.skip_balanced(c, close);
                export = ExportKind::None;
            }
            ';' => {
                scanner.bump();
                export = ExportKind::None;
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = scanner.pos();
                let ident = scanner.eat_ident().unwrap_or_default();
                match ident {
                    "export" => export = ExportKind::Named,
                    "default" if export == ExportKind::Named => export = ExportKind::Default,
                    "class" => {
                        if let Some(found) =
                            scan_class_head(source, &mut scanner, start, export, options)?
                        {
                            classes.push(found);
                        }
                        export = ExportKind::None;
                    }
                    _ => export = ExportKind::None,
                }
            }
            _ => {
                scanner.bump();
            }
        }
    }

    Ok(classes)
}

/// With `class` consumed, parse the head and skip (or capture) the body.
fn scan_class_head(
    source: &str,
    scanner: &mut Scanner<'_>,
    start: usize,
    export: ExportKind,
    options: &ParseOptions,
) -> Result<Option<ClassMatch>, ConvertError> {
    scanner.skip_trivia();
    let name = scanner.eat_ident().map(str::to_string);
    scanner.skip_trivia();

    let base = if scanner.eat_ident() == Some("extends") {
        scanner.skip_trivia();
        scanner.eat_dotted_path()
    } else {
        // Plain class, not a component
        None
    };

    // Skip to and over the class body even for non-component classes, so a
    // helper class never desynchronizes the top-level scan.
    loop {
        scanner.skip_trivia();
        match scanner.peek() {
            Some('{') => break,
            Some(_) => {
                scanner.bump();
            }
            None => {
                return Err(ConvertError::UnsupportedInput {
                    reason: "class declaration has no body".to_string(),
                    span: Span::detached(start, scanner.pos()),
                });
            }
        }
    }
    scanner.bump();
    let body = scanner
        .skip_balanced('{', '}')
        .ok_or_else(|| ConvertError::UnsupportedInput {
            reason: "class body braces are unbalanced".to_string(),
            span: Span::detached(start, source.len()),
        })?;

    let Some(base) = base else { return Ok(None) };
    if !options.component_bases.iter().any(|b| b == &base) {
        return Ok(None);
    }

    let name = name.ok_or_else(|| ConvertError::UnsupportedInput {
        reason: "component class has no name".to_string(),
        span: Span::detached(start, start + 5),
    })?;

    Ok(Some(ClassMatch {
        name,
        base,
        export,
        body,
        span: Span::detached(start, scanner.pos()),
    }))
}
