//! Source file cache for rendering errors with line/column context.

use crate::span::{FileId, Location, Span};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A cached source file with a precomputed line-start table.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Unique identifier
    pub id: FileId,
    /// File path (or a pseudo-path such as `<stdin>`)
    pub path: PathBuf,
    /// Source code content
    pub source: String,
    /// Byte offsets where each line starts
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(id: FileId, path: PathBuf, source: String) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            id,
            path,
            source,
            line_starts,
        }
    }

    /// Get the 1-indexed line and column for a byte offset.
    pub fn line_column(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        ((line_idx + 1) as u32, offset - line_start + 1)
    }

    /// Get the text of a 1-indexed line, without its trailing newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }
        let idx = (line - 1) as usize;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e as usize)
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches(['\n', '\r']))
    }

    /// Number of lines in this file.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Cache of source files keyed by [`FileId`].
#[derive(Debug, Default)]
pub struct SourceCache {
    files: Vec<SourceFile>,
    path_to_id: HashMap<PathBuf, FileId>,
}

impl SourceCache {
    /// Create a new empty source cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the cache, returning its FileId.
    ///
    /// Adding the same path twice replaces the cached content and keeps the
    /// original id, so stale batch entries never accumulate.
    pub fn add_file(&mut self, path: impl AsRef<Path>, source: String) -> FileId {
        let path = path.as_ref().to_path_buf();
        if let Some(&id) = self.path_to_id.get(&path) {
            self.files[id.0 as usize] = SourceFile::new(id, path, source);
            return id;
        }
        let id = FileId(self.files.len() as u32);
        self.path_to_id.insert(path.clone(), id);
        self.files.push(SourceFile::new(id, path, source));
        id
    }

    /// Look up a cached file.
    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        if id == FileId::DUMMY {
            return None;
        }
        self.files.get(id.0 as usize)
    }

    /// Resolve a span to a human-readable location.
    pub fn location(&self, span: Span) -> Option<Location> {
        let file = self.get_file(span.file_id)?;
        let (line, column) = file.line_column(span.start);
        Some(Location {
            file: file.path.display().to_string(),
            line,
            column,
        })
    }
}
