//! # CLA Roster
//!
//! Computes which contributors were added to or removed from a company
//! roster file between two revisions. A roster is a newline-delimited list
//! of platform logins; blank lines and surrounding whitespace are ignored
//! and duplicates collapse.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Difference between two roster revisions, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDiff {
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

impl RosterDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Diff `before` against `after`. A missing `before` adds everyone.
pub fn diff(before: Option<&str>, after: Option<&str>) -> RosterDiff {
    let after_users = after.map(parse_roster).unwrap_or_default();
    let before_users = before.map(parse_roster).unwrap_or_default();

    let before_set: HashSet<&str> = before_users.iter().map(String::as_str).collect();
    let after_set: HashSet<&str> = after_users.iter().map(String::as_str).collect();

    let removed = before_users
        .iter()
        .filter(|u| !after_set.contains(u.as_str()))
        .cloned()
        .collect();
    let added = after_users
        .iter()
        .filter(|u| !before_set.contains(u.as_str()))
        .cloned()
        .collect();

    RosterDiff { removed, added }
}

/// Logins listed in a roster file, deduplicated in order.
pub fn parse_roster(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_added_and_removed() {
        let result = diff(Some("alice\nbob"), Some("bob\ncarol"));
        assert_eq!(result.removed, vec!["alice"]);
        assert_eq!(result.added, vec!["carol"]);
    }

    #[test]
    fn test_missing_before_adds_everyone() {
        let result = diff(None, Some("alice\n\nbob\n"));
        assert!(result.removed.is_empty());
        assert_eq!(result.added, vec!["alice", "bob"]);
    }

    #[test]
    fn test_missing_after_removes_everyone() {
        let result = diff(Some("alice\nbob"), None);
        assert_eq!(result.removed, vec!["alice", "bob"]);
        assert!(result.added.is_empty());
    }

    #[test]
    fn test_windows_line_endings_and_duplicates() {
        let result = diff(Some("alice\r\nbob\r\n"), Some("bob\nalice\nalice\ncarol\r\n"));
        assert!(result.removed.is_empty());
        assert_eq!(result.added, vec!["carol"]);
    }

    #[test]
    fn test_parse_roster() {
        assert_eq!(parse_roster("  a \n\nb\na\n"), vec!["a", "b"]);
        assert!(parse_roster("").is_empty());
    }

    proptest! {
        #[test]
        fn prop_diff_with_itself_is_empty(content in "([a-z0-9\\-]{0,8}\n){0,10}") {
            prop_assert!(diff(Some(&content), Some(&content)).is_empty());
        }

        #[test]
        fn prop_added_and_removed_are_disjoint(
            before in proptest::collection::vec("[a-d]{1,2}", 0..8),
            after in proptest::collection::vec("[a-d]{1,2}", 0..8),
        ) {
            let before = before.join("\n");
            let after = after.join("\n");
            let result = diff(Some(&before), Some(&after));
            for user in &result.added {
                prop_assert!(!result.removed.contains(user));
                prop_assert!(!parse_roster(&before).contains(user));
            }
            for user in &result.removed {
                prop_assert!(!parse_roster(&after).contains(user));
            }
        }
    }
}
