use serde::{Deserialize, Serialize};

/// A commit awaiting (or holding) a CLA decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub sha: String,
    pub repo_id: i64,
    pub installation_id: i64,

    /// Check-run created for this commit, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_run_id: Option<i64>,
}

impl Check {
    pub fn new(sha: impl Into<String>, repo_id: i64, installation_id: i64) -> Self {
        Self {
            sha: sha.into(),
            repo_id,
            installation_id,
            check_run_id: None,
        }
    }

    pub fn with_check_run(mut self, check_run_id: i64) -> Self {
        self.check_run_id = Some(check_run_id);
        self
    }

    /// Same commit in the same repository.
    pub fn same_commit(&self, other: &Check) -> bool {
        self.repo_id == other.repo_id && self.sha == other.sha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_layout() {
        let check = Check::new("abc", 1223, 7);
        let value = serde_json::to_value(&check).unwrap();
        assert_eq!(value["sha"], "abc");
        assert_eq!(value["repoId"], 1223);
        assert_eq!(value["installationId"], 7);
        assert!(value.get("checkRunId").is_none());

        let parsed: Check =
            serde_json::from_str(r#"{"sha":"abc","repoId":1223,"installationId":7}"#).unwrap();
        assert_eq!(parsed, check);
    }

    #[test]
    fn test_same_commit_ignores_check_run() {
        let a = Check::new("abc", 1, 1);
        let b = Check::new("abc", 1, 2).with_check_run(9);
        assert!(a.same_commit(&b));
        assert!(!a.same_commit(&Check::new("abc", 2, 1)));
    }
}
