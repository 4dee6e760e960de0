//! Decomposition of a class body into constructor, render, lifecycle methods,
//! and plain methods, plus structural parsing of the constructor itself.

use crate::scanner::{split_top_level, Scanner};
use crate::{Method, StateField};
use rehook_diagnostics::{ConvertError, Span};

/// Class members sorted into the roles the dialect recognizes.
#[derive(Debug, Default)]
pub(crate) struct RawMembers {
    pub constructor: Option<Method>,
    pub render: Option<Method>,
    pub lifecycle: Vec<(String, Method)>,
    pub methods: Vec<(String, Method)>,
}

/// Method names the dialect treats as lifecycle hooks, recognized or not.
/// Unrecognized names in this family are preserved and flagged downstream
/// rather than silently treated as event handlers.
pub(crate) fn is_lifecycle_name(name: &str) -> bool {
    name.starts_with("component")
        || name.starts_with("UNSAFE_component")
        || matches!(name, "shouldComponentUpdate" | "getSnapshotBeforeUpdate")
}

fn unsupported(reason: impl Into<String>, span: Span) -> ConvertError {
    ConvertError::UnsupportedInput {
        reason: reason.into(),
        span,
    }
}

fn bad_state(reason: impl Into<String>, span: Span) -> ConvertError {
    ConvertError::UnsupportedStateShape {
        reason: reason.into(),
        span,
    }
}

/// Split a class body (the text between the class braces) into its members.
///
/// Every member must have the shape `name(params) { body }`; class fields,
/// getters, static members, and private names are outside the dialect.
pub(crate) fn split_members(body: &str, base: usize) -> Result<RawMembers, ConvertError> {
    let mut scanner = Scanner::new(body);
    let mut members = RawMembers::default();

    loop {
        scanner.skip_trivia();
        while scanner.eat_char(';') {
            scanner.skip_trivia();
        }
        if scanner.is_eof() {
            break;
        }

        let member_start = scanner.pos();
        let name = match scanner.eat_ident() {
            Some(name) => name,
            None => {
                return Err(unsupported(
                    "class body could not be decomposed: expected a method name",
                    Span::detached(base + member_start, base + member_start + 1),
                ));
            }
        };

        scanner.skip_trivia();
        if scanner.peek() == Some('=') {
            return Err(unsupported(
                format!("class field `{name} = ...` is outside the supported dialect"),
                Span::detached(base + member_start, base + scanner.pos()),
            ));
        }
        if matches!(name, "static" | "get" | "set" | "async") {
            return Err(unsupported(
                format!("`{name}` class members are outside the supported dialect"),
                Span::detached(base + member_start, base + scanner.pos()),
            ));
        }

        let (params, _) = scanner.eat_delimited('(', ')').ok_or_else(|| {
            unsupported(
                format!("method `{name}` has no parameter list"),
                Span::detached(base + member_start, base + scanner.pos()),
            )
        })?;
        let (body_text, body_span) = scanner.eat_delimited('{', '}').ok_or_else(|| {
            unsupported(
                format!("method `{name}` has no balanced body"),
                Span::detached(base + member_start, base + scanner.pos()),
            )
        })?;

        let method = Method {
            params: params.trim().to_string(),
            body: body_text.to_string(),
            span: Span::detached(base + member_start, base + body_span.end as usize + 1),
            body_span: Span::detached(
                base + body_span.start as usize,
                base + body_span.end as usize,
            ),
        };

        let duplicate = match name {
            "constructor" => members.constructor.replace(method).is_some(),
            "render" => members.render.replace(method).is_some(),
            _ if is_lifecycle_name(name) => {
                let dup = members.lifecycle.iter().any(|(n, _)| n == name);
                members.lifecycle.push((name.to_string(), method));
                dup
            }
            _ => {
                let dup = members.methods.iter().any(|(n, _)| n == name);
                members.methods.push((name.to_string(), method));
                dup
            }
        };
        if duplicate {
            return Err(unsupported(
                format!("method `{name}` is declared more than once"),
                Span::detached(base + member_start, base + scanner.pos()),
            ));
        }
    }

    Ok(members)
}

/// Structural pieces of the constructor body.
#[derive(Debug, Default)]
pub(crate) struct ConstructorParts {
    pub state_fields: Vec<StateField>,
    pub state_span: Option<Span>,
    pub bound_handlers: Vec<String>,
    pub extra: Vec<String>,
}

/// Parse the constructor body into state initialization, handler bindings,
/// and opaque leftover statements.
pub(crate) fn parse_constructor(ctor: &Method) -> Result<ConstructorParts, ConvertError> {
    let mut parts = ConstructorParts::default();

    for (start, end) in split_statements(&ctor.body) {
        let raw = &ctor.body[start..end];
        let stmt = raw.trim();
        if stmt.is_empty() {
            continue;
        }
        // Trim the span along with the text so carets land on the statement.
        let lead = raw.len() - raw.trim_start().len();
        let trail = raw.len() - raw.trim_end().len();
        let stmt_span = Span::detached(
            ctor.body_span.start as usize + start + lead,
            ctor.body_span.start as usize + end - trail,
        );

        if is_super_call(stmt) {
            continue;
        }
        if let Some((fields, literal_span)) = parse_state_assignment(stmt, stmt_span)? {
            if parts.state_span.is_some() {
                return Err(bad_state("`this.state` is assigned more than once", stmt_span));
            }
            parts.state_fields = fields;
            parts.state_span = Some(literal_span);
            continue;
        }
        if let Some(handler) = parse_handler_binding(stmt) {
            if !parts.bound_handlers.contains(&handler) {
                parts.bound_handlers.push(handler);
            }
            continue;
        }
        parts.extra.push(stmt.to_string());
    }

    Ok(parts)
}

fn is_super_call(stmt: &str) -> bool {
    let mut scanner = Scanner::new(stmt);
    scanner.skip_trivia();
    scanner.eat_ident() == Some("super") && {
        scanner.skip_trivia();
        scanner.peek() == Some('(')
    }
}

/// Recognize `this.state = { ... }` and extract its flat key/initializer
/// pairs. Returns `Ok(None)` when the statement is not a state assignment.
fn parse_state_assignment(
    stmt: &str,
    stmt_span: Span,
) -> Result<Option<(Vec<StateField>, Span)>, ConvertError> {
    let mut scanner = Scanner::new(stmt);
    scanner.skip_trivia();
    if scanner.eat_ident() != Some("this") {
        return Ok(None);
    }
    scanner.skip_trivia();
    if !scanner.eat_char('.') {
        return Ok(None);
    }
    scanner.skip_trivia();
    if scanner.eat_ident() != Some("state") {
        return Ok(None);
    }
    scanner.skip_trivia();
    if !scanner.eat_char('=') || scanner.peek() == Some('=') {
        return Ok(None);
    }

    scanner.skip_trivia();
    if scanner.peek() != Some('{') {
        return Err(bad_state(
            "`this.state` must be initialized with an object literal",
            stmt_span,
        ));
    }
    let (literal, _) = scanner
        .eat_delimited('{', '}')
        .ok_or_else(|| bad_state("unbalanced state object literal", stmt_span))?;
    scanner.skip_trivia();
    if !scanner.is_eof() && scanner.peek() != Some(';') {
        return Err(bad_state(
            "state initializer is a computed expression, not a plain object literal",
            stmt_span,
        ));
    }

    let fields = parse_state_literal(literal, stmt_span)?;
    Ok(Some((fields, stmt_span)))
}

/// Parse the inside of the state object literal into ordered key/value pairs.
fn parse_state_literal(literal: &str, span: Span) -> Result<Vec<StateField>, ConvertError> {
    let mut fields: Vec<StateField> = Vec::new();

    for (start, end) in split_top_level(literal, ',') {
        let entry = literal[start..end].trim();
        if entry.is_empty() {
            continue;
        }
        if entry.starts_with("...") {
            return Err(bad_state("state literal uses spread syntax", span));
        }

        let mut scanner = Scanner::new(entry);
        scanner.skip_trivia();
        if matches!(scanner.peek(), Some('[') | Some('\'') | Some('"')) {
            return Err(bad_state(
                "state keys must be plain identifiers, not computed or quoted",
                span,
            ));
        }
        let key = scanner
            .eat_ident()
            .ok_or_else(|| bad_state("state keys must be plain identifiers", span))?
            .to_string();
        scanner.skip_trivia();

        let init = if scanner.is_eof() {
            // Shorthand property: `{ count }`
            key.clone()
        } else if scanner.eat_char(':') {
            entry[scanner.pos()..].trim().to_string()
        } else {
            return Err(bad_state(
                format!("state entry `{key}` is not a plain `key: value` pair"),
                span,
            ));
        };

        if fields.iter().any(|f| f.key == key) {
            return Err(bad_state(format!("duplicate state key `{key}`"), span));
        }
        fields.push(StateField { key, init, span });
    }

    Ok(fields)
}

/// Recognize `this.x = this.x.bind(this)` and return the handler name.
fn parse_handler_binding(stmt: &str) -> Option<String> {
    let mut scanner = Scanner::new(stmt);
    scanner.skip_trivia();
    if scanner.eat_ident() != Some("this") {
        return None;
    }
    scanner.skip_trivia();
    if !scanner.eat_char('.') {
        return None;
    }
    scanner.skip_trivia();
    let lhs = scanner.eat_ident()?.to_string();
    scanner.skip_trivia();
    if !scanner.eat_char('=') || scanner.peek() == Some('=') {
        return None;
    }
    scanner.skip_trivia();
    if scanner.eat_ident() != Some("this") {
        return None;
    }
    scanner.skip_trivia();
    if !scanner.eat_char('.') {
        return None;
    }
    scanner.skip_trivia();
    let rhs = scanner.eat_ident()?;
    if rhs != lhs {
        return None;
    }
    scanner.skip_trivia();
    if !scanner.eat_char('.') {
        return None;
    }
    scanner.skip_trivia();
    if scanner.eat_ident() != Some("bind") {
        return None;
    }
    scanner.skip_trivia();
    if !scanner.eat_char('(') {
        return None;
    }
    scanner.skip_trivia();
    if scanner.eat_ident() != Some("this") {
        return None;
    }
    scanner.skip_trivia();
    if !scanner.eat_char(')') {
        return None;
    }
    Some(lhs)
}

/// Split a method body into statement ranges at top-level `;` boundaries.
/// A top-level block whose statement starts with a block keyword (or a bare
/// `{`) also ends a statement, so `if (x) { ... }` stays in one piece.
fn split_statements(body: &str) -> Vec<(usize, usize)> {
    let mut scanner = Scanner::new(body);
    let mut ranges = Vec::new();
    let mut start = 0usize;

    while let Some(c) = scanner.peek() {
        match c {
            '\'' | '"' | '`' => scanner.skip_string(),
            '/' => {
                let before = scanner.pos();
                scanner.skip_trivia();
                if scanner.pos() == before {
                    scanner.bump();
                }
            }
            '(' | '[' => {
                scanner.bump();
                scanner.skip_balanced(c, if c == '(' { ')' } else { ']' });
            }
            '{' => {
                scanner.bump();
                scanner.skip_balanced('{', '}');
                if starts_block(&body[start..]) {
                    ranges.push((start, scanner.pos()));
                    start = scanner.pos();
                }
            }
            ';' => {
                ranges.push((start, scanner.pos()));
                scanner.bump();
                start = scanner.pos();
            }
            _ => {
                scanner.bump();
            }
        }
    }
    if start < body.len() {
        ranges.push((start, body.len()));
    }
    ranges
}

fn starts_block(fragment: &str) -> bool {
    let mut scanner = Scanner::new(fragment);
    scanner.skip_trivia();
    if scanner.peek() == Some('{') {
        return true;
    }
    matches!(
        scanner.eat_ident(),
        Some("if" | "for" | "while" | "switch" | "try" | "do")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(body: &str) -> Method {
        Method {
            params: "props".to_string(),
            body: body.to_string(),
            span: Span::detached(0, body.len()),
            body_span: Span::detached(0, body.len()),
        }
    }

    #[test]
    fn constructor_pieces_are_sorted() {
        let ctor = method(
            "\n    super(props);\n    this.state = { count: 0, name: 'John' };\n    \
             this.handleClick = this.handleClick.bind(this);\n    this.timer = null;\n  ",
        );
        let parts = parse_constructor(&ctor).unwrap();
        assert_eq!(parts.state_fields.len(), 2);
        assert_eq!(parts.state_fields[0].key, "count");
        assert_eq!(parts.state_fields[0].init, "0");
        assert_eq!(parts.state_fields[1].init, "'John'");
        assert_eq!(parts.bound_handlers, vec!["handleClick".to_string()]);
        assert_eq!(parts.extra, vec!["this.timer = null".to_string()]);
    }

    #[test]
    fn shorthand_state_entries_use_the_key() {
        let ctor = method("super(props); this.state = { count };");
        let parts = parse_constructor(&ctor).unwrap();
        assert_eq!(parts.state_fields[0].init, "count");
    }

    #[test]
    fn computed_state_initializer_is_rejected() {
        let ctor = method("super(props); this.state = makeState();");
        let err = parse_constructor(&ctor).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedStateShape { .. }));
    }

    #[test]
    fn double_state_assignment_is_rejected() {
        let ctor = method("this.state = { a: 1 }; this.state = { b: 2 };");
        let err = parse_constructor(&ctor).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedStateShape { .. }));
    }

    #[test]
    fn spread_in_state_is_rejected() {
        let ctor = method("this.state = { ...defaults, a: 1 };");
        assert!(parse_constructor(&ctor).is_err());
    }

    #[test]
    fn cross_name_bind_is_kept_as_extra() {
        let ctor = method("this.onClick = this.handleClick.bind(this);");
        let parts = parse_constructor(&ctor).unwrap();
        assert!(parts.bound_handlers.is_empty());
        assert_eq!(parts.extra.len(), 1);
    }

    #[test]
    fn members_are_classified() {
        let body = "\n  constructor(props) { super(props); }\n  componentDidMount() { go(); }\n  \
                    handleClick() { this.setState({ n: 1 }); }\n  render() { return null; }\n";
        let members = split_members(body, 0).unwrap();
        assert!(members.constructor.is_some());
        assert!(members.render.is_some());
        assert_eq!(members.lifecycle[0].0, "componentDidMount");
        assert_eq!(members.methods[0].0, "handleClick");
    }

    #[test]
    fn class_fields_are_rejected() {
        let err = split_members("  handleClick = () => {};\n", 0).unwrap_err();
        assert!(err.to_string().contains("class field"));
    }

    #[test]
    fn statement_splitting_keeps_blocks_whole() {
        let stmts: Vec<(usize, usize)> =
            split_statements("if (a) { b(); c(); } d();");
        assert_eq!(stmts.len(), 2);
    }
}
