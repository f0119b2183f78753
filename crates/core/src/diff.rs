//! Line-level summary of a document edit, stored with the review log row
//! that records the edit.

use serde::{Deserialize, Serialize};

/// Overall effect of an edit.
///
/// - `Added`     -- the document was empty before.
/// - `Removed`   -- the document is empty after.
/// - `Changed`   -- both sides have content and differ.
/// - `Unchanged` -- both sides are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compact diff reference persisted as JSON on `document_review_logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDiff {
    pub status: DiffStatus,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub before_len: usize,
    pub after_len: usize,
}

impl ContentDiff {
    /// Summarise the change from `before` to `after`.
    ///
    /// Line counts come from the longest common subsequence of lines, so a
    /// line edited in place counts as one removal plus one addition.
    pub fn summarize(before: &str, after: &str) -> Self {
        let old: Vec<&str> = before.lines().collect();
        let new: Vec<&str> = after.lines().collect();
        let common = lcs_len(&old, &new);

        let status = if before == after {
            DiffStatus::Unchanged
        } else if before.is_empty() {
            DiffStatus::Added
        } else if after.is_empty() {
            DiffStatus::Removed
        } else {
            DiffStatus::Changed
        };

        Self {
            status,
            lines_added: new.len() - common,
            lines_removed: old.len() - common,
            before_len: before.chars().count(),
            after_len: after.chars().count(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status,
            "lines_added": self.lines_added,
            "lines_removed": self.lines_removed,
            "before_len": self.before_len,
            "after_len": self.after_len,
        })
    }
}

/// Length of the longest common subsequence, two-row dynamic programming.
fn lcs_len(a: &[&str], b: &[&str]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
