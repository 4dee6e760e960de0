//! A brace-depth-aware cursor over JavaScript-ish source text.
//!
//! The scanner is not a full lexer. It knows just enough about strings,
//! template literals, and comments to match delimiters structurally, which is
//! what the dialect parser needs to isolate class bodies, parameter lists, and
//! object literals without tripping over nested braces.

use rehook_diagnostics::Span;

/// Cursor over source bytes with structural skipping primitives.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Start scanning from a byte offset.
    pub fn at(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// An independent cursor at the same position, for lookahead.
    pub fn fork(&self) -> Scanner<'a> {
        Scanner {
            src: self.src,
            pos: self.pos,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace and `//` / `/* */` comments.
    pub fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek2() == Some('/') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek2() == Some('*') => {
                    self.bump();
                    self.bump();
                    while !self.is_eof() {
                        if self.peek() == Some('*') && self.peek2() == Some('/') {
                            self.bump();
                            self.bump();
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn is_ident_start(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_' || c == '$'
    }

    fn is_ident_continue(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '$'
    }

    /// Consume an identifier if one starts here.
    pub fn eat_ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if Self::is_ident_start(c) => {
                self.bump();
            }
            _ => return None,
        }
        while let Some(c) = self.peek() {
            if Self::is_ident_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        Some(&self.src[start..self.pos])
    }

    /// Consume a dotted path such as `React.Component`.
    pub fn eat_dotted_path(&mut self) -> Option<String> {
        let mut path = self.eat_ident()?.to_string();
        loop {
            let mark = self.pos;
            self.skip_trivia();
            if self.peek() == Some('.') {
                self.bump();
                self.skip_trivia();
                match self.eat_ident() {
                    Some(segment) => {
                        path.push('.');
                        path.push_str(segment);
                    }
                    None => {
                        self.pos = mark;
                        break;
                    }
                }
            } else {
                self.pos = mark;
                break;
            }
        }
        Some(path)
    }

    /// Consume `c` if it is the next character.
    pub fn eat_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Skip a `'`, `"` or `` ` `` delimited literal, including `${}` holes in
    /// template literals. The cursor must sit on the opening quote.
    pub fn skip_string(&mut self) {
        let quote = match self.bump() {
            Some(q) => q,
            None => return,
        };
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '$' if quote == '`' && self.peek2() == Some('{') => {
                    self.bump();
                    self.bump();
                    self.skip_balanced('{', '}');
                }
                c if c == quote => {
                    self.bump();
                    return;
                }
                '\n' if quote != '`' => {
                    // Unterminated single-line string; stop at the line end
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Skip a `/pattern/flags` regex literal. The cursor must sit on the
    /// opening slash.
    fn skip_regex(&mut self) {
        self.bump();
        let mut in_class = false;
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '[' => {
                    in_class = true;
                    self.bump();
                }
                ']' => {
                    in_class = false;
                    self.bump();
                }
                '/' if !in_class => {
                    self.bump();
                    break;
                }
                '\n' => return,
                _ => {
                    self.bump();
                }
            }
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// With the opening delimiter already consumed, advance past the matching
    /// closing delimiter, honoring nested delimiters, strings, comments, and
    /// regex literals. Returns the span of the inner content (between, not
    /// including, the delimiters), or `None` if the input ends first.
    pub fn skip_balanced(&mut self, open: char, close: char) -> Option<Span> {
        let inner_start = self.pos;
        let mut depth = 1usize;
        let mut last_sig = '\0';
        while let Some(c) = self.peek() {
            if c == '\'' || c == '"' || c == '`' {
                self.skip_string();
                last_sig = c;
                continue;
            }
            if c == '/' && (self.peek2() == Some('/') || self.peek2() == Some('*')) {
                self.skip_trivia();
                continue;
            }
            if c == '/' && regex_can_follow(last_sig) {
                self.skip_regex();
                last_sig = 'a';
                continue;
            }
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    let span = Span::detached(inner_start, self.pos);
                    self.bump();
                    return Some(span);
                }
            }
            self.bump();
            if !c.is_whitespace() {
                last_sig = c;
            }
        }
        None
    }

    /// Consume an opening delimiter and everything up to its match, returning
    /// the inner text.
    pub fn eat_delimited(&mut self, open: char, close: char) -> Option<(&'a str, Span)> {
        self.skip_trivia();
        if !self.eat_char(open) {
            return None;
        }
        let span = self.skip_balanced(open, close)?;
        Some((&self.src[span.start as usize..span.end as usize], span))
    }

    /// Span from `start` to the current position.
    pub fn span_from(&self, start: usize) -> Span {
        Span::detached(start, self.pos)
    }
}

/// Split `text` into fragments at top-level `,` characters, ignoring commas
/// nested inside delimiters, strings, and comments. Returns byte ranges.
pub fn split_top_level(text: &str, separator: char) -> Vec<(usize, usize)> {
    let mut scanner = Scanner::new(text);
    let mut pieces = Vec::new();
    let mut start = 0usize;
    while let Some(c) = scanner.peek() {
        match c {
            '\'' | '"' | '`' => scanner.skip_string(),
            '/' if scanner.peek2() == Some('/') || scanner.peek2() == Some('*') => {
                scanner.skip_trivia()
            }
            '(' | '[' | '{' => {
                scanner.bump();
                scanner.skip_balanced(c, matching_close(c));
            }
            c if c == separator => {
                pieces.push((start, scanner.pos()));
                scanner.bump();
                start = scanner.pos();
            }
            _ => {
                scanner.bump();
            }
        }
    }
    pieces.push((start, text.len()));
    pieces
}

/// A `/` after one of these characters (or at the start of the scanned text)
/// opens a regex literal rather than a division. `<` and `>` are deliberately
/// absent: a `/` after either is a closing or self-closing JSX tag.
fn regex_can_follow(last_sig: char) -> bool {
    matches!(
        last_sig,
        '\0' | '=' | '(' | '[' | '{' | ',' | ';' | ':' | '!' | '&' | '|' | '?' | '+' | '-'
            | '*' | '%' | '^' | '~'
    )
}

fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_braces_skip_nested_strings() {
        let src = "{ a: '}', b: { c: 1 } } tail";
        let mut scanner = Scanner::new(src);
        assert!(scanner.eat_char('{'));
        let span = scanner.skip_balanced('{', '}').unwrap();
        assert_eq!(&src[span.start as usize..span.end as usize], " a: '}', b: { c: 1 } ");
    }

    #[test]
    fn template_holes_do_not_confuse_depth() {
        let src = "{ msg: `a ${ {x: 1}.x } b` } rest";
        let mut scanner = Scanner::new(src);
        scanner.eat_char('{');
        let span = scanner.skip_balanced('{', '}').unwrap();
        assert!(src[span.start as usize..span.end as usize].contains("msg"));
        assert_eq!(&src[scanner.pos()..], " rest");
    }

    #[test]
    fn regex_literals_do_not_confuse_depth() {
        let src = "{ return s.replace(/}/g, '').split(/['\"]/); } tail";
        let mut scanner = Scanner::new(src);
        scanner.eat_char('{');
        let span = scanner.skip_balanced('{', '}').unwrap();
        assert!(src[span.start as usize..span.end as usize].contains("split"));
        assert_eq!(&src[scanner.pos()..], " tail");
    }

    #[test]
    fn closing_jsx_tags_are_not_regexes() {
        let src = "{ return <p>{v}</p>; } tail";
        let mut scanner = Scanner::new(src);
        scanner.eat_char('{');
        scanner.skip_balanced('{', '}').unwrap();
        assert_eq!(&src[scanner.pos()..], " tail");
    }

    #[test]
    fn division_is_not_a_regex_opener() {
        let src = "{ const half = total / 2; } tail";
        let mut scanner = Scanner::new(src);
        scanner.eat_char('{');
        scanner.skip_balanced('{', '}').unwrap();
        assert_eq!(&src[scanner.pos()..], " tail");
    }

    #[test]
    fn comments_are_trivia() {
        let mut scanner = Scanner::new("  // line\n  /* block */ class");
        scanner.skip_trivia();
        assert_eq!(scanner.eat_ident(), Some("class"));
    }

    #[test]
    fn dotted_paths() {
        let mut scanner = Scanner::new("React.PureComponent {");
        assert_eq!(
            scanner.eat_dotted_path().as_deref(),
            Some("React.PureComponent")
        );
    }

    #[test]
    fn top_level_splitting_ignores_nested_commas() {
        let pieces: Vec<&str> = split_top_level("a: f(1, 2), b: [3, 4], c: 'x,y'", ',')
            .into_iter()
            .map(|(s, e)| &"a: f(1, 2), b: [3, 4], c: 'x,y'"[s..e])
            .collect();
        assert_eq!(pieces, vec!["a: f(1, 2)", " b: [3, 4]", " c: 'x,y'"]);
    }
}
