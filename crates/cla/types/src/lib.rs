//! # CLA Types
//!
//! Shared data model for the Contributor License Agreement engine.
//!
//! ## Key Components
//!
//! - [`SignedCla`]: a signature record held in the ledger
//! - [`Check`]: a commit awaiting (or holding) a CLA check-run
//! - [`ClaKey`]: compound `user ⊕ agreement` key used for ledger and check lists
//! - [`ClaPolicy`]: per-repository/org rules evaluated for every event
//! - [`AppOutput`]: per-event output with conclusion, comment and state mutations
//!
//! Records are owned by the ledger and the check reconciler; everything in this
//! crate is plain data.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod check;
pub mod constants;
pub mod error;
pub mod identity;
pub mod key;
pub mod output;
pub mod policy;
pub mod record;

pub use check::Check;
pub use error::PolicyParseError;
pub use identity::{CorporateIdentity, EmploymentResolution, IdentityLink, PlatformIdentity};
pub use key::ClaKey;
pub use output::{AppOutput, CheckRequest, Conclusion, RenderedComment, StateMutations, StateValue};
pub use policy::{ClaPolicy, CompanyRepo, MinimalChangeRequired};
pub use record::SignedCla;
