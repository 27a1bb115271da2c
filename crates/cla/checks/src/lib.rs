//! # CLA Checks
//!
//! Keeps `license/cla` check-runs on the code host in sync with the
//! signature state of each contributor.
//!
//! ## Key Components
//!
//! - [`CodeHostClient`]: contract for the code-hosting REST client
//! - [`CheckReconciler`]: creates or updates check-runs for pending commits
//! - [`MockCodeHost`]: recording client for tests

#![deny(unsafe_code)]

pub mod client;
pub mod mock;
pub mod reconciler;

pub use client::{
    CheckRunSpec, CheckRunStatus, CodeHostClient, CodeHostError, CommitStatus, IssueComment,
    PullRequest, PullRequestState, Result,
};
pub use mock::{MockCodeHost, RecordedCheckRun};
pub use reconciler::{check_request, CheckOutcome, CheckReconciler};
