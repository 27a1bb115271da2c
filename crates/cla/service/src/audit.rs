//! Audit trail of signature changes.
//!
//! One `info` event per signed or terminated record on the `cla::audit`
//! target, so subscribers can route them separately.

use cla_types::SignedCla;
use tracing::info;

pub const AUDIT_TARGET: &str = "cla::audit";

/// Where a signature change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignLocation<'a> {
    PullRequest {
        organization: &'a str,
        repository: &'a str,
        number: u64,
    },
    /// Roster-driven changes
    PreSigned,
}

impl std::fmt::Display for SignLocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignLocation::PullRequest {
                organization,
                repository,
                number,
            } => write!(f, "{}/{}:{}", organization, repository, number),
            SignLocation::PreSigned => write!(f, "pre-signed"),
        }
    }
}

pub fn log_cla_signed(cla: &SignedCla, signer: &str, location: SignLocation<'_>) {
    log_cla_action("cla_signed", cla, signer, location);
}

pub fn log_cla_terminated(cla: &SignedCla, signer: &str, location: SignLocation<'_>) {
    log_cla_action("cla_terminated", cla, signer, location);
}

fn log_cla_action(action: &str, cla: &SignedCla, signer: &str, location: SignLocation<'_>) {
    info!(
        target: AUDIT_TARGET,
        action,
        record = %cla.parsable_log(),
        signer,
        sign_location = %location,
        "{};{};{};{}",
        action,
        cla.parsable_log(),
        signer,
        location
    );
}
