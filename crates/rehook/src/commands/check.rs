//! Check command - validates dialect support without converting.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use rehook::{Converter, JsonEmitter, ReportEmitter, SourceCache, TerminalEmitter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Input file or directory
    #[arg(default_value = ".")]
    pub input: PathBuf,
}

fn collect_inputs(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.is_file()
                && !p.components().any(|c| c.as_os_str() == "node_modules")
                && p.extension().map_or(false, |ext| ext == "js" || ext == "jsx")
        })
        .collect()
}

pub fn run(args: CheckArgs, format: OutputFormat, use_color: bool) -> Result<()> {
    let files = collect_inputs(&args.input);
    if files.is_empty() {
        match format {
            OutputFormat::Text => println!("No .js/.jsx files found."),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({ "success": true, "files": 0, "errors": 0 })
            ),
        }
        return Ok(());
    }

    let converter = Converter::new(config::options_for(&args.input)?);
    let mut cache = SourceCache::new();
    let mut errors = 0usize;

    for file in &files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let file_id = cache.add_file(file, source.clone());

        match converter.check(&source) {
            Ok(()) => {
                if matches!(format, OutputFormat::Text) {
                    println!(
                        "{} {}",
                        style("ok").green(),
                        file.display()
                    );
                }
            }
            Err(err) => {
                errors += 1;
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
    }

    match format {
        OutputFormat::Text => {
            println!(
                "Checked {} file(s): {} supported, {} outside the dialect.",
                files.len(),
                files.len() - errors,
                errors
            );
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "success": errors == 0,
                    "files": files.len(),
                    "errors": errors,
                })
            );
        }
    }

    if errors > 0 {
        bail!("{errors} file(s) are outside the supported dialect");
    }
    Ok(())
}
