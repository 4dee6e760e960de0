//! Migration notes: structured records of every rewrite the engine performed.

use serde::{Deserialize, Serialize};

/// What kind of rewrite a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeCategory {
    /// Class wrapper replaced with a function component
    StructuralConversion,
    /// Instance state replaced with a hook-state binding
    StateConversion,
    /// Lifecycle method replaced with (or preserved next to) an effect
    LifecycleConversion,
    /// Constructor handler binding removed
    HandlerSimplification,
    /// Hook import line inserted or rewritten
    ImportAdjustment,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::StructuralConversion => "structural-conversion",
            ChangeCategory::StateConversion => "state-conversion",
            ChangeCategory::LifecycleConversion => "lifecycle-conversion",
            ChangeCategory::HandlerSimplification => "handler-simplification",
            ChangeCategory::ImportAdjustment => "import-adjustment",
        }
    }
}

/// How mechanical (and therefore how safe) a rewrite was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Certainty {
    /// Mechanical and behavior-preserving
    Definite,
    /// Behaviorally risky, manual review advised
    Partial,
    /// Informational only, nothing was rewritten
    Advisory,
}

impl Certainty {
    /// The three-tier bullet label used in rendered notes lists.
    pub fn tier_label(&self) -> &'static str {
        match self {
            Certainty::Definite => "[Improvement made]",
            Certainty::Partial => "[Partial or optional change]",
            Certainty::Advisory => "[Helpful observation or tip]",
        }
    }
}

/// One detected transformation, in the order it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub category: ChangeCategory,
    pub description: String,
    pub certainty: Certainty,
}

impl ChangeRecord {
    pub fn new(
        category: ChangeCategory,
        certainty: Certainty,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            description: description.into(),
            certainty,
        }
    }

    /// A mechanical, behavior-preserving rewrite.
    pub fn definite(category: ChangeCategory, description: impl Into<String>) -> Self {
        Self::new(category, Certainty::Definite, description)
    }

    /// A rewrite with a known behavioral risk.
    pub fn partial(category: ChangeCategory, description: impl Into<String>) -> Self {
        Self::new(category, Certainty::Partial, description)
    }

    /// A note about something that was preserved rather than rewritten.
    pub fn advisory(category: ChangeCategory, description: impl Into<String>) -> Self {
        Self::new(category, Certainty::Advisory, description)
    }
}

impl std::fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.certainty.tier_label(), self.description)
    }
}

/// Ordered collection of change records.
///
/// Insertion order is detection order and is never re-sorted. `push`
/// suppresses exact duplicates (same category, certainty, and description);
/// everything else is kept, including near-duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    items: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record unless an identical one is already present.
    pub fn push(&mut self, record: ChangeRecord) {
        if !self.items.contains(&record) {
            self.items.push(record);
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ChangeRecord>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.items.iter()
    }

    /// Count records of a given certainty.
    pub fn count_of(&self, certainty: Certainty) -> usize {
        self.items.iter().filter(|r| r.certainty == certainty).count()
    }

    /// Count records of a given category.
    pub fn count_in(&self, category: ChangeCategory) -> usize {
        self.items.iter().filter(|r| r.category == category).count()
    }
}

impl IntoIterator for ChangeLog {
    type Item = ChangeRecord;
    type IntoIter = std::vec::IntoIter<ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
