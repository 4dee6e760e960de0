//! Convert command - rewrites class components to the hooks dialect.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rehook::{Converter, JsonEmitter, ReportEmitter, SourceCache, TerminalEmitter};
use similar::TextDiff;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file, directory, or `-` for stdin
    pub input: PathBuf,

    /// Output file (single input) or output directory (batch)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a unified diff instead of the converted source
    #[arg(long)]
    pub diff: bool,
}

/// Collect convertible files under a path.
fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.components().any(|c| c.as_os_str() == "node_modules") {
            continue;
        }
        if path.is_file()
            && path
                .extension()
                .map_or(false, |ext| ext == "js" || ext == "jsx")
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn read_stdin() -> Result<String> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("failed to read stdin")?;
    Ok(source)
}

pub fn run(args: ConvertArgs, format: OutputFormat, use_color: bool, quiet: bool) -> Result<()> {
    let stdin_mode = args.input.as_os_str() == "-";
    let options = if stdin_mode {
        config::options_for(Path::new("."))?
    } else {
        config::options_for(&args.input)?
    };

    let converted = Arc::new(AtomicUsize::new(0));
    let counter = converted.clone();
    let converter = Converter::new(options).with_observer(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let inputs: Vec<(String, String)> = if stdin_mode {
        vec![("<stdin>".to_string(), read_stdin()?)]
    } else {
        let files = collect_inputs(&args.input)?;
        if files.is_empty() {
            bail!("no .js/.jsx files found under {}", args.input.display());
        }
        let mut pairs = Vec::with_capacity(files.len());
        for file in files {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            pairs.push((file.display().to_string(), source));
        }
        pairs
    };

    let progress = if inputs.len() > 1 && !quiet && matches!(format, OutputFormat::Text) {
        let bar = ProgressBar::new(inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut cache = SourceCache::new();
    let mut failures = 0usize;

    for (name, source) in &inputs {
        if let Some(bar) = &progress {
            bar.set_message(name.clone());
        }
        let file_id = cache.add_file(name, source.clone());

        match converter.convert(source) {
            Ok(result) => match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({ "file": name, "result": result })
                    );
                }
                OutputFormat::Text if args.diff => {
                    let diff = TextDiff::from_lines(source.as_str(), &result.emitted_source);
                    print!(
                        "{}",
                        diff.unified_diff()
                            .context_radius(3)
                            .header(name, &format!("{name} (hooks)"))
                    );
                }
                OutputFormat::Text => {
                    if let Some(output) = &args.output {
                        write_output(output, name, &result, inputs.len() > 1)?;
                    } else {
                        if !quiet {
                            println!("{}", style(format!("=== {name}")).bold().dim());
                        }
                        println!("{}", result.emitted_source);
                        let stdout = std::io::stdout();
                        let mut emitter = TerminalEmitter::new(stdout.lock(), use_color);
                        emitter.emit_notes(&result.changes)?;
                    }
                }
            },
            Err(err) => {
                failures += 1;
                let err = err.in_file(file_id);
                match format {
                    OutputFormat::Json => {
                        let stdout = std::io::stdout();
                        JsonEmitter::new(stdout.lock()).emit_error(&err, &cache)?;
                    }
                    OutputFormat::Text => {
                        let stderr = std::io::stderr();
                        TerminalEmitter::new(stderr.lock(), use_color)
                            .emit_error(&err, &cache)?;
                    }
                }
            }
        }
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if !quiet && matches!(format, OutputFormat::Text) {
        let done = converted.load(Ordering::Relaxed);
        eprintln!("Converted {done} component(s), {failures} failure(s).");
    }
    if failures > 0 {
        bail!("{failures} file(s) could not be converted");
    }
    Ok(())
}

/// Write one result to `-o`: a file path for single input, a directory for
/// batches (named `<stem>.jsx` via the packaging pair).
fn write_output(output: &Path, name: &str, result: &rehook::TransformResult, batch: bool) -> Result<()> {
    if batch {
        std::fs::create_dir_all(output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "component".to_string());
        let file = result.output_file(&stem);
        let path = output.join(&file.filename);
        std::fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(output, &result.emitted_source)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }
    Ok(())
}
