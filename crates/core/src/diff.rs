//! Diff state of one keyed item when two snapshots are compared.

use serde::{Deserialize, Serialize};

/// - `Added`     -- present only in the newer snapshot.
/// - `Removed`   -- present only in the older snapshot.
/// - `Changed`   -- present in both with different values.
/// - `Unchanged` -- present in both with identical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

    /// Classify a keyed pair of optional values.
    pub fn classify<T: PartialEq>(old: Option<&T>, new: Option<&T>) -> Option<Self> {
        match (old, new) {
            (None, None) => None,
            (None, Some(_)) => Some(Self::Added),
            (Some(_), None) => Some(Self::Removed),
            (Some(a), Some(b)) if a == b => Some(Self::Unchanged),
            (Some(_), Some(_)) => Some(Self::Changed),
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_all_cases() {
        assert_eq!(DiffStatus::classify::<i32>(None, None), None);
        assert_eq!(DiffStatus::classify(None, Some(&1)), Some(DiffStatus::Added));
        assert_eq!(DiffStatus::classify(Some(&1), None), Some(DiffStatus::Removed));
        assert_eq!(DiffStatus::classify(Some(&1), Some(&1)), Some(DiffStatus::Unchanged));
        assert_eq!(DiffStatus::classify(Some(&1), Some(&2)), Some(DiffStatus::Changed));
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(DiffStatus::Changed.to_string(), "changed");
        assert_eq!(
            serde_json::to_string(&DiffStatus::Removed).unwrap(),
            "\"removed\""
        );
    }
}
