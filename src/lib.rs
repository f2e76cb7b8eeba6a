//! # Inquest
//!
//! A composable validation engine that accumulates ALL violations of a value,
//! each located by the path of the field, element or map entry it was found at.
//!
//! ## Overview
//!
//! Validation logic is written as plain closures over a [`ValidationContext`].
//! Rules are applied to the current value with [`ValidationContext::apply`];
//! nested values are validated in named or indexed child scopes with
//! [`ValidationContext::field`], [`ValidationContext::each_element`] and
//! friends. Violations are data and never stop the validation. Errors
//! returned by a block (with `?`) are faults and abort it, unless recovered
//! with [`ValidationContext::recover_from`].
//!
//! ## Core Types
//!
//! - [`Path`]: Location of a value inside the validated structure (e.g. `users[0].email`)
//! - [`Rule`]: A [`Check`] bound to an error-message builder; see [`checks`] for built-ins
//! - [`Violation`]: A single failed rule with its path, value and message
//! - [`Status`]: Valid, or invalid with non-empty [`Violations`]
//! - [`Outcome`]: A completed [`Status`] or the [`Fault`] that aborted the validation
//! - [`Validator`]: Runs validation blocks with a [`ValidatorConfig`]
//!
//! ## Example
//!
//! ```rust
//! use inquest::{checks, validate, OutcomeExt};
//!
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! fn validate_user(user: &User) -> inquest::Outcome {
//!     validate(user, |v| {
//!         v.field("name", &v.subject().name, |name| {
//!             name.apply(&checks::not_blank())?;
//!             Ok(())
//!         })?;
//!         v.field("age", &v.subject().age, |age| {
//!             age.apply(&checks::at_least(18))?;
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })
//! }
//!
//! assert!(validate_user(&User { name: "Ann".into(), age: 21 }).unwrap().is_valid());
//!
//! let err = validate_user(&User { name: "".into(), age: 12 })
//!     .into_result()
//!     .unwrap_err();
//! let violations = err.violations().unwrap();
//! assert_eq!(violations.len(), 2);
//! assert_eq!(violations.first().to_string(), "name: must not be blank (got: \"\")");
//! ```

pub mod error;
pub mod path;
pub mod rule;
pub mod scope;
pub mod status;
pub mod validation;
pub mod validator;

pub use error::{BoxError, Fault, ValidationError, Violation, Violations};
pub use path::{Index, Path, PathError, PathFormat, Segment};
pub use rule::{checks, Check, CheckKey, MessageContext, Params, Rule};
pub use scope::{Scope, ScopeError};
pub use status::{fold_outcomes, Outcome, OutcomeExt, Status};
pub use validation::ValidationContext;
pub use validator::{validate, validate_named, PanicPolicy, Validator, ValidatorConfig};

/// Type alias for a completed validation as stillwater's accumulating `Validation`.
pub type ValidationResult = stillwater::Validation<(), Violations>;
