//! Diagnostics returned to the collaborator's turn log.
//!
//! Diagnostics are data, not control flow: stages push them and move on. The
//! collaborator buckets them by category, deduplicates and caps them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DiagnosticCategory;

/// One advisory message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Diagnostic {
    /// The bucket this message belongs to.
    pub category: DiagnosticCategory,
    /// Plain-text message.
    pub message: String,
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// An ordered buffer of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a message.
    pub fn push(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            category,
            message: message.into(),
        });
    }

    /// Append every diagnostic of another buffer, keeping order.
    pub fn append(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Iterate in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics in a category.
    pub fn count(&self, category: DiagnosticCategory) -> usize {
        self.entries
            .iter()
            .filter(|diagnostic| diagnostic.category == category)
            .count()
    }

    /// Diagnostics in a category, in emission order.
    pub fn in_category(&self, category: DiagnosticCategory) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(move |diagnostic| diagnostic.category == category)
    }

    /// Render as `[category] message` lines for the turn log.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Consume into the underlying list.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_render_with_category_prefix() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticCategory::UnreachableProvince, "P3 has no path to P1 for goods");
        diagnostics.push(DiagnosticCategory::System, "siting took 2 ms");
        assert_eq!(
            diagnostics.to_lines(),
            vec![
                "[unreachable province] P3 has no path to P1 for goods".to_owned(),
                "[system] siting took 2 ms".to_owned(),
            ]
        );
        assert_eq!(diagnostics.count(DiagnosticCategory::System), 1);
    }

    #[test]
    fn append_keeps_order() {
        let mut first = Diagnostics::new();
        first.push(DiagnosticCategory::Siting, "a");
        let mut second = Diagnostics::new();
        second.push(DiagnosticCategory::Siting, "b");
        first.append(second);
        let messages: Vec<_> = first.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["a", "b"]);
    }
}
