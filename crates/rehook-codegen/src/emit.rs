//! Serialization of the target representation back into source text.
//!
//! The printer is deterministic and whitespace-stable: the same
//! [`FnComponent`] always serializes to byte-identical output, so converted
//! components can be golden-file tested.

use log::debug;
use rehook_diagnostics::ChangeLog;
use rehook_parser::ExportKind;
use rehook_transform::{Effect, EffectDeps, FnComponent, HookState, LocalFn};
use serde::Serialize;

/// Emitter configuration.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// The output bundle of one conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Converted source text
    pub emitted_source: String,
    /// Change records in detection order, exact duplicates suppressed
    pub changes: ChangeLog,
}

/// A `{filename, content}` pair for packaging layers.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    pub filename: String,
    pub content: String,
}

impl TransformResult {
    /// Expose the emitted source under `<stem>.jsx` for archive packaging.
    pub fn output_file(&self, stem: &str) -> OutputFile {
        OutputFile {
            filename: format!("{stem}.jsx"),
            content: self.emitted_source.clone(),
        }
    }
}

/// Serialize a converted component, bundling the change records produced by
/// the rule engine.
pub fn emit(target: &FnComponent, changes: ChangeLog, options: &EmitOptions) -> TransformResult {
    let mut printer = Printer::new(options.indent);

    if !target.hook_imports.is_empty() {
        printer.line(&format!(
            "import React, {{ {} }} from 'react';",
            target.hook_imports.join(", ")
        ));
        printer.blank();
    }

    let head = match target.export {
        ExportKind::Named => "export const",
        _ => "const",
    };
    let params = if target.takes_props { "(props)" } else { "()" };
    printer.line(&format!("{} {} = {} => {{", head, target.name, params));
    printer.indent();

    let mut first_section = true;
    let mut section = |printer: &mut Printer, first: &mut bool| {
        if !*first {
            printer.blank();
        }
        *first = false;
    };

    if !target.hook_states.is_empty() {
        section(&mut printer, &mut first_section);
        for state in &target.hook_states {
            emit_hook_state(&mut printer, state);
        }
    }

    if !target.prelude.is_empty() {
        section(&mut printer, &mut first_section);
        for stmt in &target.prelude {
            printer.body(stmt);
        }
    }

    for function in &target.functions {
        section(&mut printer, &mut first_section);
        emit_local_fn(&mut printer, function);
    }

    for effect in &target.effects {
        section(&mut printer, &mut first_section);
        emit_effect(&mut printer, effect);
    }

    for preserved in &target.preserved {
        section(&mut printer, &mut first_section);
        emit_local_fn(&mut printer, preserved);
    }

    section(&mut printer, &mut first_section);
    printer.body(&target.render_body);

    printer.dedent();
    printer.line("};");

    if target.export == ExportKind::Default {
        printer.blank();
        printer.line(&format!("export default {};", target.name));
    }

    debug!("emitted `{}` ({} bytes)", target.name, printer.out.len());
    TransformResult {
        emitted_source: printer.finish(),
        changes,
    }
}

fn emit_hook_state(printer: &mut Printer, state: &HookState) {
    if let [field] = state.fields.as_slice() {
        printer.line(&format!(
            "const [state, setState] = useState({{ {}: {} }});",
            field.key, field.init
        ));
        return;
    }
    printer.line("const [state, setState] = useState({");
    printer.indent();
    for (i, field) in state.fields.iter().enumerate() {
        let comma = if i + 1 < state.fields.len() { "," } else { "" };
        printer.line(&format!("{}: {}{}", field.key, field.init, comma));
    }
    printer.dedent();
    printer.line("});");
}

fn emit_local_fn(printer: &mut Printer, function: &LocalFn) {
    printer.line(&format!(
        "const {} = ({}) => {{",
        function.name, function.params
    ));
    printer.indent();
    printer.body(&function.body);
    printer.dedent();
    printer.line("};");
}

fn emit_effect(printer: &mut Printer, effect: &Effect) {
    printer.line("useEffect(() => {");
    printer.indent();
    if !effect.body.trim().is_empty() {
        printer.body(&effect.body);
    }
    if let Some(cleanup) = &effect.cleanup {
        printer.line("return () => {");
        printer.indent();
        printer.body(cleanup);
        printer.dedent();
        printer.line("};");
    }
    printer.dedent();
    printer.line(&format!("}}{});", render_deps(&effect.deps)));
}

fn render_deps(deps: &EffectDeps) -> String {
    match deps {
        EffectDeps::RunOnce => ", []".to_string(),
        EffectDeps::Fields(fields) => format!(", [{}]", fields.join(", ")),
        EffectDeps::WholeState => ", [state]".to_string(),
        EffectDeps::EveryRender => String::new(),
    }
}

/// Line-oriented writer with indentation tracking and body re-indentation.
struct Printer {
    out: String,
    unit: String,
    depth: usize,
}

impl Printer {
    fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            unit: " ".repeat(indent),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(&self.unit);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Splice opaque body text at the current depth: leading/trailing blank
    /// lines dropped, the common leading whitespace stripped, relative
    /// indentation preserved.
    fn body(&mut self, text: &str) {
        let lines: Vec<&str> = text.lines().collect();
        let first = lines.iter().position(|l| !l.trim().is_empty());
        let last = lines.iter().rposition(|l| !l.trim().is_empty());
        let (Some(first), Some(last)) = (first, last) else {
            return;
        };
        let lines = &lines[first..=last];

        let margin = lines
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);

        for line in lines {
            if line.trim().is_empty() {
                self.blank();
            } else {
                self.line(&line[margin.min(line.len() - line.trim_start().len())..]);
            }
        }
    }

    fn finish(self) -> String {
        self.out
    }
}
