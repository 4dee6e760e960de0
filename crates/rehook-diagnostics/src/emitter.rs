//! Emitters for fatal errors and migration-note lists.

use crate::error::ConvertError;
use crate::notes::ChangeLog;
use crate::source_cache::SourceCache;
use std::io::Write;

/// Trait for rendering conversion output in various formats.
pub trait ReportEmitter {
    /// Render a fatal conversion error.
    fn emit_error(&mut self, error: &ConvertError, cache: &SourceCache) -> std::io::Result<()>;

    /// Render a migration-notes list.
    fn emit_notes(&mut self, notes: &ChangeLog) -> std::io::Result<()>;
}

/// Rich terminal output with colors, a source snippet, and a caret underline.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colored: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colored: bool) -> Self {
        Self { writer, colored }
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.colored {
            code
        } else {
            ""
        }
    }
}

impl<W: Write> ReportEmitter for TerminalEmitter<W> {
    fn emit_error(&mut self, error: &ConvertError, cache: &SourceCache) -> std::io::Result<()> {
        let red = self.paint("\x1b[31m");
        let bold = self.paint("\x1b[1m");
        let cyan = self.paint("\x1b[36m");
        let reset = self.paint("\x1b[0m");

        writeln!(
            self.writer,
            "{}{}error[{}]{}: {}",
            bold,
            red,
            error.code(),
            reset,
            error
        )?;

        let span = error.span();
        if let Some(loc) = cache.location(span) {
            writeln!(self.writer, "  {}-->{} {}", cyan, reset, loc)?;

            if let Some(file) = cache.get_file(span.file_id) {
                let (line_num, start_col) = file.line_column(span.start);
                if let Some(line_text) = file.line_text(line_num) {
                    let gutter = format!("{}", line_num);
                    let pad = " ".repeat(gutter.len());

                    writeln!(self.writer, "{} {}|{}", pad, cyan, reset)?;
                    writeln!(self.writer, "{}{} |{} {}", cyan, gutter, reset, line_text)?;

                    let caret_pad = " ".repeat((start_col - 1) as usize);
                    let max_len = line_text.len().saturating_sub((start_col - 1) as usize);
                    let carets = "^".repeat((span.len() as usize).min(max_len).max(1));
                    writeln!(
                        self.writer,
                        "{} {}|{} {}{}{}{}",
                        pad, cyan, reset, caret_pad, red, carets, reset
                    )?;
                }
            }
        }

        writeln!(
            self.writer,
            "  {}note{}: supported dialect assumes {}",
            cyan,
            reset,
            error.dialect_assumption()
        )
    }

    fn emit_notes(&mut self, notes: &ChangeLog) -> std::io::Result<()> {
        let bold = self.paint("\x1b[1m");
        let reset = self.paint("\x1b[0m");

        if notes.is_empty() {
            writeln!(self.writer, "No conversion needed or no changes detected.")?;
            return Ok(());
        }

        writeln!(self.writer, "{}Migration notes ({}):{}", bold, notes.len(), reset)?;
        for record in notes {
            let color = match record.certainty {
                crate::Certainty::Definite => self.paint("\x1b[32m"),
                crate::Certainty::Partial => self.paint("\x1b[33m"),
                crate::Certainty::Advisory => self.paint("\x1b[34m"),
            };
            writeln!(
                self.writer,
                "  {}{}{} {}",
                color,
                record.certainty.tier_label(),
                reset,
                record.description
            )?;
        }
        Ok(())
    }
}

/// Machine-readable JSON lines, one object per call.
pub struct JsonEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportEmitter for JsonEmitter<W> {
    fn emit_error(&mut self, error: &ConvertError, cache: &SourceCache) -> std::io::Result<()> {
        let value = serde_json::json!({
            "success": false,
            "code": error.code(),
            "message": error.to_string(),
            "assumption": error.dialect_assumption(),
            "location": cache.location(error.span()),
        });
        writeln!(self.writer, "{}", value)
    }

    fn emit_notes(&mut self, notes: &ChangeLog) -> std::io::Result<()> {
        let value = serde_json::json!({
            "success": true,
            "changes": notes,
        });
        writeln!(self.writer, "{}", value)
    }
}

/// Plain one-line-per-item output for logs and scripting.
pub struct SimpleEmitter<W: Write> {
    writer: W,
}

impl<W: Write> SimpleEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportEmitter for SimpleEmitter<W> {
    fn emit_error(&mut self, error: &ConvertError, cache: &SourceCache) -> std::io::Result<()> {
        match cache.location(error.span()) {
            Some(loc) => writeln!(self.writer, "{}: error[{}]: {}", loc, error.code(), error),
            None => writeln!(self.writer, "error[{}]: {}", error.code(), error),
        }
    }

    fn emit_notes(&mut self, notes: &ChangeLog) -> std::io::Result<()> {
        for record in notes {
            writeln!(self.writer, "{}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChangeCategory, ChangeRecord, Span};

    fn sample_error(cache: &mut SourceCache) -> ConvertError {
        let source = "class A extends React.Component {}\nclass B extends React.Component {}\n";
        let file_id = cache.add_file("two.js", source.to_string());
        ConvertError::UnsupportedInput {
            reason: "found 2 component classes, expected exactly 1".to_string(),
            span: Span::new(file_id, 35, 40),
        }
    }

    #[test]
    fn terminal_emitter_points_at_the_line() {
        let mut cache = SourceCache::new();
        let error = sample_error(&mut cache);
        let mut out = Vec::new();
        TerminalEmitter::new(&mut out, false)
            .emit_error(&error, &cache)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("error[R001]"));
        assert!(text.contains("two.js:2:1"));
        assert!(text.contains("^^^^^"));
        assert!(text.contains("supported dialect assumes"));
    }

    #[test]
    fn json_emitter_is_parseable() {
        let mut cache = SourceCache::new();
        let error = sample_error(&mut cache);
        let mut out = Vec::new();
        JsonEmitter::new(&mut out).emit_error(&error, &cache).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["code"], "R001");
        assert_eq!(value["location"]["line"], 2);
    }

    #[test]
    fn simple_emitter_renders_tiered_notes() {
        let mut notes = ChangeLog::new();
        notes.push(ChangeRecord::definite(
            ChangeCategory::StateConversion,
            "state object moved into a useState hook",
        ));
        let mut out = Vec::new();
        SimpleEmitter::new(&mut out).emit_notes(&notes).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[Improvement made] state object moved into a useState hook\n"
        );
    }
}
