//! Platform-facing names and texts shared by every handler.

/// Name of the check-run attached to each commit.
pub const CHECK_NAME: &str = "license/cla";

/// Check title once the CLA requirement is satisfied.
pub const CHECK_SUCCESS_TITLE: &str = "All CLA requirements met.";

/// Check title while the contributor still has to agree.
pub const CHECK_IN_PROGRESS_TITLE: &str = "Contributor License Agreement is not agreed yet.";

/// Summary used when a policy does not override `checkSummary`.
pub const DEFAULT_CHECK_SUMMARY: &str =
    "This check verifies that the author has agreed to a CLA with Microsoft.";

/// Details link attached to every check-run.
pub const CHECK_DETAILS_URL: &str = "https://github.com/microsoft/contributorlicenseagreement";

/// Prefix of the state key holding a contributor's pending checks.
pub const CHECK_KEY_PREFIX: &str = "Check";
