//! Optional `rehook.toml` project configuration.
//!
//! ```toml
//! [dialect]
//! component_bases = ["React.Component", "Component"]
//!
//! [emit]
//! indent = 4
//! ```

use anyhow::{Context, Result};
use rehook::{ConvertOptions, EmitOptions, ParseOptions};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "rehook.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub dialect: DialectConfig,
    pub emit: EmitConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialectConfig {
    /// Base types that mark a class as a component
    pub component_bases: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitConfig {
    /// Spaces per indentation level
    pub indent: Option<usize>,
}

impl ConfigFile {
    /// Load `rehook.toml` from `dir`, if present.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(config))
    }

    /// Fold the file values over the defaults.
    pub fn into_options(self) -> ConvertOptions {
        let mut parse = ParseOptions::default();
        if let Some(bases) = self.dialect.component_bases {
            parse.component_bases = bases;
        }
        let mut emit = EmitOptions::default();
        if let Some(indent) = self.emit.indent {
            emit.indent = indent;
        }
        ConvertOptions { parse, emit }
    }
}

/// Options for an input path: the config file next to it, or defaults.
pub fn options_for(input: &Path) -> Result<ConvertOptions> {
    let dir = if input.is_dir() {
        input
    } else {
        input.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."))
    };
    Ok(match ConfigFile::load(dir)? {
        Some(config) => config.into_options(),
        None => ConvertOptions::default(),
    })
}
