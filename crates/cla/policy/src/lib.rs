//! # CLA Policy
//!
//! Decides whether a contribution needs a signed Contributor License
//! Agreement under a [`ClaPolicy`].
//!
//! A contribution is exempt when its author is a bypassed user or it
//! originates from a bypassed organization. Otherwise it needs a CLA as soon
//! as either the changed-line threshold or the file-count threshold is met.

#![deny(unsafe_code)]

use cla_types::ClaPolicy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A file touched by a contribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Added plus deleted lines.
    pub changes: u64,
}

/// The parts of a contribution the policy looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub user: String,
    pub files: Vec<ChangedFile>,
    pub file_count: u32,
}

impl Contribution {
    /// Contribution by `user` with one entry per changed file.
    pub fn new(user: impl Into<String>, changes: impl IntoIterator<Item = u64>) -> Self {
        let files: Vec<ChangedFile> = changes
            .into_iter()
            .map(|changes| ChangedFile { changes })
            .collect();
        Self {
            user: user.into(),
            file_count: u32::try_from(files.len()).unwrap_or(u32::MAX),
            files,
        }
    }

    pub fn total_changes(&self) -> u64 {
        self.files.iter().map(|f| f.changes).sum()
    }
}

/// Which threshold made a CLA necessary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Threshold {
    CodeLines { changes: u64, minimum: u64 },
    Files { count: u32, minimum: u32 },
}

/// Outcome of evaluating a policy against a contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseDecision {
    /// Author is listed in `bypassUsers`.
    BypassedUser,
    /// Source organization is listed in `bypassOrgs`.
    BypassedOrg,
    /// A threshold was met.
    Required(Threshold),
    /// Neither threshold was met.
    BelowThreshold,
}

impl LicenseDecision {
    pub fn is_required(&self) -> bool {
        matches!(self, LicenseDecision::Required(_))
    }
}

impl std::fmt::Display for LicenseDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseDecision::BypassedUser => write!(f, "bypassed user"),
            LicenseDecision::BypassedOrg => write!(f, "bypassed organization"),
            LicenseDecision::Required(Threshold::CodeLines { changes, minimum }) => {
                write!(f, "{} changed lines (minimum {})", changes, minimum)
            }
            LicenseDecision::Required(Threshold::Files { count, minimum }) => {
                write!(f, "{} changed files (minimum {})", count, minimum)
            }
            LicenseDecision::BelowThreshold => write!(f, "below change thresholds"),
        }
    }
}

/// Evaluate `policy` for `contribution` coming from `origin_org`.
pub fn evaluate(
    policy: &ClaPolicy,
    contribution: &Contribution,
    origin_org: Option<&str>,
) -> LicenseDecision {
    let decision = decide(policy, contribution, origin_org);
    debug!(
        user = %contribution.user,
        origin_org = origin_org.unwrap_or(""),
        decision = %decision,
        "Evaluated CLA requirement"
    );
    decision
}

fn decide(
    policy: &ClaPolicy,
    contribution: &Contribution,
    origin_org: Option<&str>,
) -> LicenseDecision {
    if policy.bypass_users.iter().any(|u| *u == contribution.user) {
        return LicenseDecision::BypassedUser;
    }

    if let Some(org) = origin_org {
        if policy.bypass_orgs.iter().any(|o| o == org) {
            return LicenseDecision::BypassedOrg;
        }
    }

    let minimum = policy.minimal_change_required;
    let changes = contribution.total_changes();
    if changes >= minimum.code_lines {
        return LicenseDecision::Required(Threshold::CodeLines {
            changes,
            minimum: minimum.code_lines,
        });
    }

    if contribution.file_count >= minimum.files {
        return LicenseDecision::Required(Threshold::Files {
            count: contribution.file_count,
            minimum: minimum.files,
        });
    }

    LicenseDecision::BelowThreshold
}

/// Whether `contribution` needs a signed CLA.
pub fn needs_license(
    policy: &ClaPolicy,
    contribution: &Contribution,
    origin_org: Option<&str>,
) -> bool {
    evaluate(policy, contribution, origin_org).is_required()
}
