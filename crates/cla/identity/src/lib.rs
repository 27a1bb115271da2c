//! # CLA Identity
//!
//! Identity linking and employment verification.
//!
//! The identity-linking service maps a platform login to a corporate
//! identity; the employment directory confirms that a corporate mail still
//! belongs to a current employee. Both are eventually consistent, so every
//! lookup goes through a bounded [`RetryPolicy`] and a spent budget is read
//! as "not resolved".

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod retry;
pub mod verifier;

pub use client::{EmploymentDirectory, IdentityResolver, MockEmploymentDirectory, MockIdentityResolver};
pub use error::{IdentityError, Result};
pub use retry::{Attempt, RetryPolicy};
pub use verifier::{EmploymentVerifier, LinkResolver};
