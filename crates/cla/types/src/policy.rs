//! Per-repository/org CLA policy.
//!
//! The policy is checked in by repository owners as a YAML document and
//! handed to the engine by the hosting process. It is immutable for the
//! duration of one event.

use crate::constants::DEFAULT_CHECK_SUMMARY;
use crate::error::PolicyParseError;
use serde::{Deserialize, Serialize};

/// CLA rules for a repository or organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaPolicy {
    /// Link to the agreement document.
    #[serde(alias = "claContent")]
    pub content: String,

    #[serde(default)]
    pub minimal_change_required: MinimalChangeRequired,

    #[serde(default)]
    pub bypass_users: Vec<String>,

    #[serde(default)]
    pub bypass_orgs: Vec<String>,

    #[serde(default)]
    pub prohibited_companies: Vec<String>,

    /// Roster files that sign on behalf of a company.
    #[serde(default)]
    pub sign_repos: Vec<CompanyRepo>,

    #[serde(default)]
    pub auto_sign_msft_employee: bool,

    #[serde(default = "default_check_summary")]
    pub check_summary: String,
}

/// Thresholds above which a contribution needs a CLA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalChangeRequired {
    #[serde(default)]
    pub files: u32,

    #[serde(default)]
    pub code_lines: u64,
}

/// Roster mapping: pushes of `file_name` to `repo_name` sign for `company_name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRepo {
    pub repo_name: String,
    pub company_name: String,
    pub file_name: String,
}

fn default_check_summary() -> String {
    DEFAULT_CHECK_SUMMARY.to_string()
}

impl ClaPolicy {
    /// Create a policy with defaults for everything but the agreement link.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            minimal_change_required: MinimalChangeRequired::default(),
            bypass_users: Vec::new(),
            bypass_orgs: Vec::new(),
            prohibited_companies: Vec::new(),
            sign_repos: Vec::new(),
            auto_sign_msft_employee: false,
            check_summary: default_check_summary(),
        }
    }

    /// Parse a policy document.
    pub fn from_yaml_str(document: &str) -> Result<Self, PolicyParseError> {
        let policy: ClaPolicy = serde_yaml::from_str(document)?;
        if policy.content.trim().is_empty() {
            return Err(PolicyParseError::MissingContent);
        }
        Ok(policy)
    }

    pub fn with_minimal_change(mut self, files: u32, code_lines: u64) -> Self {
        self.minimal_change_required = MinimalChangeRequired { files, code_lines };
        self
    }

    pub fn with_bypass_user(mut self, user: impl Into<String>) -> Self {
        self.bypass_users.push(user.into());
        self
    }

    pub fn with_bypass_org(mut self, org: impl Into<String>) -> Self {
        self.bypass_orgs.push(org.into());
        self
    }

    pub fn with_prohibited_company(mut self, company: impl Into<String>) -> Self {
        self.prohibited_companies.push(company.into());
        self
    }

    pub fn with_sign_repo(mut self, repo: CompanyRepo) -> Self {
        self.sign_repos.push(repo);
        self
    }

    pub fn with_auto_sign(mut self, enabled: bool) -> Self {
        self.auto_sign_msft_employee = enabled;
        self
    }

    pub fn is_prohibited_company(&self, company: &str) -> bool {
        self.prohibited_companies.iter().any(|c| c == company)
    }

    /// Roster mapping configured for `repo_name`, if any.
    pub fn roster_for(&self, repo_name: &str) -> Option<&CompanyRepo> {
        self.sign_repos.iter().find(|r| r.repo_name == repo_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy_document() {
        let document = r#"
content: https://test3.yml
minimalChangeRequired:
  files: 2
  codeLines: 10
bypassUsers:
  - dependabot[bot]
bypassOrgs:
  - microsoft
prohibitedCompanies:
  - Acme Corp
signRepos:
  - repoName: cla-test
    companyName: Contoso
    fileName: approvedUsers.csv
autoSignMsftEmployee: true
"#;
        let policy = ClaPolicy::from_yaml_str(document).unwrap();
        assert_eq!(policy.content, "https://test3.yml");
        assert_eq!(policy.minimal_change_required.files, 2);
        assert_eq!(policy.minimal_change_required.code_lines, 10);
        assert!(policy.is_prohibited_company("Acme Corp"));
        assert!(policy.auto_sign_msft_employee);
        assert_eq!(policy.check_summary, DEFAULT_CHECK_SUMMARY);
        assert_eq!(
            policy.roster_for("cla-test").map(|r| r.company_name.as_str()),
            Some("Contoso")
        );
        assert!(policy.roster_for("other").is_none());
    }

    #[test]
    fn test_legacy_content_alias() {
        let policy = ClaPolicy::from_yaml_str("claContent: https://cla.example/v1.yml\n").unwrap();
        assert_eq!(policy.content, "https://cla.example/v1.yml");
        assert_eq!(policy.minimal_change_required, MinimalChangeRequired::default());
    }

    #[test]
    fn test_missing_content_is_rejected() {
        assert!(matches!(
            ClaPolicy::from_yaml_str("content: ''\n"),
            Err(PolicyParseError::MissingContent)
        ));
        assert!(matches!(
            ClaPolicy::from_yaml_str("bypassUsers: [a]\n"),
            Err(PolicyParseError::Yaml(_))
        ));
    }
}
