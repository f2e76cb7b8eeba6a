//! Error and violation types.
//!
//! Violations are data: expected failures of a rule against a value, recorded
//! with their path. Faults are the unexpected failures that abort a
//! validation.

mod fault;
mod violation;

pub use fault::{BoxError, Fault, ValidationError};
pub use violation::{Violation, Violations};
