//! Service-level errors.
//!
//! Only infrastructure failures surface here. Decision outcomes (missing
//! policy, author mismatch, blocked company, malformed command) are handled
//! in place and never become errors.

use cla_checks::CodeHostError;
use cla_ledger::{LedgerError, StorageError};
use cla_workflow::WorkflowError;
use thiserror::Error;

use crate::comments::RenderError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("code host error: {0}")]
    CodeHost(#[from] CodeHostError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
