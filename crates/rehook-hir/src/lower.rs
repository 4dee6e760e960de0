//! Descriptor to normalized-component lowering.
//!
//! Canonicalizes state references (`this.state.x` and destructured `x` both
//! become `state.x`), rewrites `this.props` / `this.setState` / `this.method`
//! to their unqualified forms, verifies handler bindings, and classifies
//! lifecycle methods.

use std::collections::BTreeSet;

use log::debug;
use rehook_diagnostics::{ConvertError, Span};
use rehook_parser::{ComponentDescriptor, Scanner, StateField};

use crate::ir::{classify_lifecycle, Handler, LifecycleMethod, NormalizedComponent};

/// Lower a parsed descriptor into its normalized form.
///
/// Fails with [`ConvertError::DanglingHandlerBinding`] when a constructor
/// `bind` names an undeclared method, and with
/// [`ConvertError::UnsupportedInput`] when a state field is referenced both
/// through `this.state` and through destructuring (ambiguity is an error,
/// never silently resolved).
pub fn normalize(descriptor: ComponentDescriptor) -> Result<NormalizedComponent, ConvertError> {
    for bound in &descriptor.bound_handlers {
        if !descriptor.methods.iter().any(|(name, _)| name == bound) {
            return Err(ConvertError::DanglingHandlerBinding {
                handler: bound.clone(),
                span: descriptor.span,
            });
        }
    }

    let state_keys: Vec<String> = descriptor.state_fields.iter().map(|f| f.key.clone()).collect();
    let method_names: Vec<String> = descriptor.methods.iter().map(|(n, _)| n.clone()).collect();
    let mut ctx = Canonicalizer::new(state_keys, method_names);

    let mut handlers = Vec::with_capacity(descriptor.methods.len());
    for (name, method) in &descriptor.methods {
        handlers.push(Handler {
            name: name.clone(),
            params: method.params.clone(),
            body: ctx.canonicalize_body(&method.body, descriptor.span)?,
            was_bound: descriptor.bound_handlers.contains(name),
        });
    }

    let mut lifecycle = Vec::with_capacity(descriptor.lifecycle.len());
    for (name, method) in &descriptor.lifecycle {
        lifecycle.push(LifecycleMethod {
            kind: classify_lifecycle(name),
            name: name.clone(),
            params: method.params.clone(),
            body: ctx.canonicalize_body(&method.body, descriptor.span)?,
        });
    }

    let render_body = ctx.canonicalize_body(&descriptor.render_body, descriptor.span)?;

    let mut constructor_extra = Vec::with_capacity(descriptor.constructor_extra.len());
    for stmt in &descriptor.constructor_extra {
        constructor_extra.push(ctx.canonicalize_body(stmt, descriptor.span)?);
    }

    let mut state_fields = Vec::with_capacity(descriptor.state_fields.len());
    for field in &descriptor.state_fields {
        state_fields.push(StateField {
            key: field.key.clone(),
            init: ctx.canonicalize_body(&field.init, descriptor.span)?,
            span: field.span,
        });
    }

    ctx.check_consistency(descriptor.span)?;

    debug!(
        "normalized `{}`: {} state fields, {} handlers, {} lifecycle methods",
        descriptor.name,
        state_fields.len(),
        handlers.len(),
        lifecycle.len()
    );

    Ok(NormalizedComponent {
        name: descriptor.name,
        export: descriptor.export,
        uses_props: ctx.uses_props,
        state_fields,
        constructor_extra,
        handlers,
        lifecycle,
        render_body,
    })
}

/// Component-wide canonicalization state.
struct Canonicalizer {
    state_keys: Vec<String>,
    method_names: Vec<String>,
    /// Keys referenced as `this.state.<key>` anywhere in the component
    qualified_refs: BTreeSet<String>,
    /// Keys referenced bare through destructuring anywhere in the component
    bare_refs: BTreeSet<String>,
    uses_props: bool,
}

impl Canonicalizer {
    fn new(state_keys: Vec<String>, method_names: Vec<String>) -> Self {
        Self {
            state_keys,
            method_names,
            qualified_refs: BTreeSet::new(),
            bare_refs: BTreeSet::new(),
            uses_props: false,
        }
    }

    /// Strip `const {..} = this.state` statements, then rewrite references.
    fn canonicalize_body(&mut self, body: &str, span: Span) -> Result<String, ConvertError> {
        let (stripped, destructured) = self.strip_destructures(body, span)?;
        Ok(self.rewrite(&stripped, &destructured))
    }

    /// Every state key that was referenced in both styles is ambiguous.
    fn check_consistency(&self, span: Span) -> Result<(), ConvertError> {
        if let Some(key) = self.qualified_refs.intersection(&self.bare_refs).next() {
            return Err(ConvertError::UnsupportedInput {
                reason: format!(
                    "state field `{key}` is referenced both via `this.state.{key}` and via \
                     destructuring; pick one style"
                ),
                span,
            });
        }
        Ok(())
    }

    /// Remove `const|let|var { a, b } = this.state;` statements and collect
    /// the destructured keys. Anything that does not match that exact shape
    /// is copied through untouched.
    fn strip_destructures(
        &self,
        body: &str,
        span: Span,
    ) -> Result<(String, BTreeSet<String>), ConvertError> {
        let mut scanner = Scanner::new(body);
        let mut out = String::new();
        let mut keys = BTreeSet::new();
        let mut copied = 0usize;

        loop {
            match scanner.peek() {
                None => break,
                Some('\'') | Some('"') | Some('`') => scanner.skip_string(),
                Some('/') => {
                    let before = scanner.pos();
                    scanner.skip_trivia();
                    if scanner.pos() == before {
                        scanner.bump();
                    }
                }
                Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    let start = scanner.pos();
                    let ident = scanner.eat_ident().unwrap_or_default();
                    if matches!(ident, "const" | "let" | "var") {
                        if let Some(pattern) = try_state_destructure(&mut scanner) {
                            // Copy everything before the statement, drop the
                            // statement itself (plus one trailing newline).
                            out.push_str(&body[copied..start]);
                            for key in parse_pattern(&pattern, span)? {
                                if !self.state_keys.contains(&key) {
                                    return Err(ConvertError::UnsupportedInput {
                                        reason: format!(
                                            "destructured `{key}` is not a state field"
                                        ),
                                        span,
                                    });
                                }
                                keys.insert(key);
                            }
                            while scanner.peek() == Some(' ') || scanner.peek() == Some('\t') {
                                scanner.bump();
                            }
                            if scanner.peek() == Some('\n') {
                                scanner.bump();
                            }
                            copied = scanner.pos();
                        }
                    }
                }
                Some(_) => {
                    scanner.bump();
                }
            }
        }
        out.push_str(&body[copied..]);
        Ok((out, keys))
    }

    /// Token-level reference rewriting. Strings and comments pass through
    /// verbatim; identifiers are rewritten with one token of lookahead.
    fn rewrite(&mut self, body: &str, destructured: &BTreeSet<String>) -> String {
        let mut scanner = Scanner::new(body);
        let mut out = String::with_capacity(body.len());
        let mut last_sig = '\0';

        while let Some(c) = scanner.peek() {
            match c {
                '\'' | '"' | '`' => {
                    let start = scanner.pos();
                    scanner.skip_string();
                    out.push_str(&body[start..scanner.pos()]);
                    last_sig = c;
                }
                '/' => {
                    let start = scanner.pos();
                    scanner.skip_trivia();
                    if scanner.pos() == start {
                        scanner.bump();
                        out.push('/');
                        last_sig = '/';
                    } else {
                        out.push_str(&body[start..scanner.pos()]);
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    let ident = scanner.eat_ident().unwrap_or_default();
                    if ident == "this" && last_sig != '.' && scanner.peek() == Some('.') {
                        scanner.bump();
                        self.rewrite_this_member(&mut scanner, &mut out);
                    } else if last_sig != '.'
                        && destructured.contains(ident)
                        && !is_property_key(&scanner)
                    {
                        self.bare_refs.insert(ident.to_string());
                        out.push_str("state.");
                        out.push_str(ident);
                    } else {
                        out.push_str(ident);
                    }
                    last_sig = 'a';
                }
                c => {
                    scanner.bump();
                    out.push(c);
                    if !c.is_whitespace() {
                        last_sig = c;
                    }
                }
            }
        }
        out
    }

    /// Rewrite the member access following `this.`.
    fn rewrite_this_member(&mut self, scanner: &mut Scanner<'_>, out: &mut String) {
        let Some(member) = scanner.eat_ident() else {
            out.push_str("this.");
            return;
        };
        match member {
            "state" => {
                out.push_str("state");
                if scanner.peek() == Some('.') {
                    scanner.bump();
                    out.push('.');
                    if let Some(key) = scanner.eat_ident() {
                        out.push_str(key);
                        if self.state_keys.iter().any(|k| k == key) {
                            self.qualified_refs.insert(key.to_string());
                        }
                    }
                }
            }
            "props" => {
                self.uses_props = true;
                out.push_str("props");
            }
            "setState" => out.push_str("setState"),
            m if self.method_names.iter().any(|n| n == m) => out.push_str(m),
            other => {
                // Unknown instance member: preserved, never dropped
                out.push_str("this.");
                out.push_str(other);
            }
        }
    }
}

/// After `const`/`let`/`var`, try to consume `{ pattern } = this.state [;]`.
/// On a miss the scanner is left wherever it stopped; the caller copies the
/// skipped text verbatim, so a miss is harmless.
fn try_state_destructure(scanner: &mut Scanner<'_>) -> Option<String> {
    scanner.skip_trivia();
    if scanner.peek() != Some('{') {
        return None;
    }
    let (pattern, _) = scanner.eat_delimited('{', '}')?;
    scanner.skip_trivia();
    if !scanner.eat_char('=') {
        return None;
    }
    scanner.skip_trivia();
    if scanner.eat_ident() != Some("this") {
        return None;
    }
    if !scanner.eat_char('.') {
        return None;
    }
    if scanner.eat_ident() != Some("state") {
        return None;
    }
    scanner.skip_trivia();
    scanner.eat_char(';');
    Some(pattern.to_string())
}

/// Destructuring patterns must be plain comma-separated identifiers.
fn parse_pattern(pattern: &str, span: Span) -> Result<Vec<String>, ConvertError> {
    let mut keys = Vec::new();
    for piece in pattern.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let mut scanner = Scanner::new(piece);
        let ident = scanner.eat_ident();
        scanner.skip_trivia();
        match ident {
            Some(key) if scanner.is_eof() => keys.push(key.to_string()),
            _ => {
                return Err(ConvertError::UnsupportedInput {
                    reason: format!(
                        "state destructuring pattern `{{ {piece} }}` is too complex; \
                         only plain identifiers are supported"
                    ),
                    span,
                });
            }
        }
    }
    Ok(keys)
}

/// True when the identifier just consumed is an object-literal key
/// (`{ count: ... }`), which is a name, not a state reference.
fn is_property_key(scanner: &Scanner<'_>) -> bool {
    let mut look = scanner.fork();
    look.skip_trivia();
    look.peek() == Some(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LifecycleKind;
    use rehook_parser::{parse, ParseOptions};

    fn normalized(source: &str) -> NormalizedComponent {
        normalize(parse(source, &ParseOptions::default()).unwrap()).unwrap()
    }

    #[test]
    fn qualified_state_refs_are_canonicalized() {
        let component = normalized(
            "class C extends React.Component {\n  constructor(p) { super(p); this.state = { n: 0 }; }\n  render() { return <p>{this.state.n}</p>; }\n}",
        );
        assert!(component.render_body.contains("{state.n}"));
        assert!(!component.render_body.contains("this.state"));
    }

    #[test]
    fn destructured_refs_are_canonicalized() {
        let component = normalized(
            "class C extends React.Component {\n  constructor(p) { super(p); this.state = { n: 0 }; }\n  render() {\n    const { n } = this.state;\n    return <p>{n}</p>;\n  }\n}",
        );
        assert!(!component.render_body.contains("const { n }"));
        assert!(component.render_body.contains("{state.n}"));
    }

    #[test]
    fn mixed_reference_styles_are_ambiguous() {
        let source = "class C extends React.Component {\n  constructor(p) { super(p); this.state = { n: 0 }; }\n  label() { const { n } = this.state; return n; }\n  render() { return <p>{this.state.n}</p>; }\n}";
        let err = normalize(parse(source, &ParseOptions::default()).unwrap()).unwrap_err();
        assert!(err.to_string().contains("both via"));
    }

    #[test]
    fn dangling_binding_is_fatal() {
        let source = "class C extends React.Component {\n  constructor(p) { super(p); this.missing = this.missing.bind(this); }\n  render() { return null; }\n}";
        let err = normalize(parse(source, &ParseOptions::default()).unwrap()).unwrap_err();
        assert!(matches!(err, ConvertError::DanglingHandlerBinding { .. }));
    }

    #[test]
    fn set_state_and_method_refs_lose_this() {
        let component = normalized(
            "class C extends React.Component {\n  constructor(p) { super(p); this.state = { n: 0 }; this.inc = this.inc.bind(this); }\n  inc() { this.setState(s => ({ n: s.n + 1 })); }\n  render() { return <button onClick={this.inc}>{this.state.n}</button>; }\n}",
        );
        assert_eq!(component.handlers[0].body.trim(), "setState(s => ({ n: s.n + 1 }));");
        assert!(component.handlers[0].was_bound);
        assert!(component.render_body.contains("onClick={inc}"));
    }

    #[test]
    fn props_usage_is_detected_and_rewritten() {
        let component = normalized(
            "class C extends React.Component {\n  render() { return <p>{this.props.label}</p>; }\n}",
        );
        assert!(component.uses_props);
        assert!(component.render_body.contains("{props.label}"));
    }

    #[test]
    fn unknown_lifecycles_are_preserved() {
        let component = normalized(
            "class C extends React.Component {\n  componentWillReceiveProps(next) { this.sync(next); }\n  sync(next) {}\n  render() { return null; }\n}",
        );
        assert_eq!(component.lifecycle[0].kind, LifecycleKind::Unknown);
        assert_eq!(component.lifecycle[0].name, "componentWillReceiveProps");
        assert_eq!(component.unknown_lifecycles().count(), 1);
    }

    #[test]
    fn unknown_instance_members_are_left_qualified() {
        let component = normalized(
            "class C extends React.Component {\n  constructor(p) { super(p); this.timer = null; }\n  render() { return null; }\n}",
        );
        assert_eq!(component.constructor_extra, vec!["this.timer = null".to_string()]);
    }

    #[test]
    fn object_keys_are_not_state_refs() {
        let component = normalized(
            "class C extends React.Component {\n  constructor(p) { super(p); this.state = { n: 0 }; }\n  bump() {\n    const { n } = this.state;\n    setTimeout(() => log({ n: n + 1 }), 0);\n  }\n  render() { return <p>{n}</p>; }\n}",
        );
        // The literal key stays `n:`, the value reference becomes `state.n`.
        assert!(component.handlers[0].body.contains("{ n: state.n + 1 }"));
    }
}
