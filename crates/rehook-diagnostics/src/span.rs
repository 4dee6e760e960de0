//! Source span types for tracking locations in input components.

use serde::{Deserialize, Serialize};

/// Unique identifier for a source file in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    /// A dummy file ID for spans without a known file.
    pub const DUMMY: FileId = FileId(u32::MAX);
}

/// A half-open byte range in a cached source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// File ID (index into source cache)
    pub file_id: FileId,
    /// Byte offset of start (inclusive)
    pub start: u32,
    /// Byte offset of end (exclusive)
    pub end: u32,
}

impl Span {
    /// A dummy span for cases where no location is available.
    pub const DUMMY: Span = Span {
        file_id: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Create a new span.
    pub fn new(file_id: FileId, start: u32, end: u32) -> Self {
        Self {
            file_id,
            start,
            end,
        }
    }

    /// Span covering byte offsets in a file that has not been cached yet.
    ///
    /// The parser works on a bare `&str`; the caller attaches the real
    /// `FileId` once the source lands in a [`crate::SourceCache`].
    pub fn detached(start: usize, end: usize) -> Self {
        Self::new(FileId::DUMMY, start as u32, end as u32)
    }

    /// Rebind a detached span to a cached file.
    pub fn in_file(self, file_id: FileId) -> Self {
        Span { file_id, ..self }
    }

    /// Check if this is a dummy/unknown span.
    pub fn is_dummy(&self) -> bool {
        self.file_id == FileId::DUMMY
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        if self.is_dummy() && other.is_dummy() && self.start == self.end {
            return other;
        }
        Span {
            file_id: self.file_id,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::DUMMY
    }
}

/// A resolved human-readable location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path as given to the cache
    pub file: String,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
