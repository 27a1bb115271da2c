//! # CLA Ledger
//!
//! Owns the signature record lifecycle on top of a [`StateStore`]:
//! create (manual, employee auto-sign, roster bulk), read, and expire.
//!
//! Records are keyed by [`cla_types::ClaKey`]; reads use the retrieval key
//! and writes the plain key.

#![deny(unsafe_code)]

pub mod error;
pub mod ledger;
pub mod memory;
pub mod store;

pub use error::{LedgerError, Result, StorageError, StorageResult};
pub use ledger::{ClaLedger, Termination};
pub use memory::InMemoryStateStore;
pub use store::{read_state, StateStore};
