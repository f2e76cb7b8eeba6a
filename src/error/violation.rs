//! Violation records.
//!
//! This module provides [`Violation`] for a single failed rule and
//! [`Violations`] for the ordered, non-empty list a failed validation holds.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::{Path, PathFormat};
use crate::rule::{CheckKey, Params};

/// A single rule failure with full context.
///
/// `Violation` captures all relevant information about a failed check:
/// - **path**: Where in the validated value the failure occurred
/// - **key**: Identity of the check that failed
/// - **params**: Parameters of the check that failed
/// - **value**: The offending value, rendered with `Debug`
/// - **message**: Human-readable description of the failure
///
/// # Example
///
/// ```rust
/// use inquest::{CheckKey, Params, Path, Violation};
///
/// let violation = Violation::new(
///     Path::of(["age"]).unwrap(),
///     CheckKey::new("at_least"),
///     Params::none().with("min", 18),
///     "12",
///     "must not be less than 18",
/// );
///
/// assert_eq!(violation.to_string(), "age: must not be less than 18 (got: 12)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The path to the value that failed.
    pub path: Path,
    /// The key of the failed check.
    pub key: CheckKey,
    /// The params of the failed check.
    pub params: Params,
    /// The offending value, rendered with `Debug`.
    ///
    /// Violations compare this rendering, not the original value: two values
    /// with the same `Debug` output are equal here.
    pub value: String,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(
        path: Path,
        key: CheckKey,
        params: Params,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            key,
            params,
            value: value.into(),
            message: message.into(),
        }
    }

    /// Renders the path with the given format.
    pub fn display_path(&self, format: &PathFormat) -> String {
        self.path.display_with(format)
    }

    /// Renders the violation as `path: message` with the given format.
    pub fn describe(&self, format: &PathFormat) -> String {
        format!("{}: {}", self.display_path(format), self.message)
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (got: {})",
            self.describe(&PathFormat::default()),
            self.value
        )
    }
}

impl std::error::Error for Violation {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Violation>();
    assert_sync::<Violation>();
};

/// A non-empty, ordered collection of violations.
///
/// `Violations` wraps a `NonEmptyVec<Violation>` so an invalid status always
/// carries at least one violation.
///
/// # Combining
///
/// `Violations` implements `Semigroup`; combining keeps left-then-right order:
///
/// ```rust
/// use inquest::{CheckKey, Params, Path, Violation, Violations};
/// use stillwater::prelude::*;
///
/// let at = |name: &str| Path::of([name]).unwrap();
/// let v = |name: &str| {
///     Violation::new(at(name), CheckKey::new("not_blank"), Params::none(), "\"\"", "must not be blank")
/// };
///
/// let combined = Violations::single(v("name")).combine(Violations::single(v("email")));
/// assert_eq!(combined.len(), 2);
/// assert_eq!(combined.first().path.to_string(), "name");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(NonEmptyVec<Violation>);

impl Violations {
    /// Creates a collection holding one violation.
    pub fn single(violation: Violation) -> Self {
        Self(NonEmptyVec::singleton(violation))
    }

    /// Creates a collection from a `NonEmptyVec`.
    pub fn from_non_empty(violations: NonEmptyVec<Violation>) -> Self {
        Self(violations)
    }

    /// Creates a collection from a `Vec`, or `None` if it is empty.
    pub fn from_vec(violations: Vec<Violation>) -> Option<Self> {
        let mut violations = violations.into_iter();
        let first = Self::single(violations.next()?);
        Some(violations.fold(first, |acc, v| acc.combine(Self::single(v))))
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API consistency.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the violations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Returns all violations recorded at `path`.
    pub fn at_path(&self, path: &Path) -> Vec<&Violation> {
        self.0.iter().filter(|v| &v.path == path).collect()
    }

    /// Returns all violations produced by checks with `key`.
    pub fn with_key(&self, key: CheckKey) -> Vec<&Violation> {
        self.0.iter().filter(|v| v.key == key).collect()
    }

    /// Returns the first violation.
    pub fn first(&self) -> &Violation {
        self.0.head()
    }

    /// Returns the rendered paths, in order.
    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(|v| v.path.to_string()).collect()
    }

    /// Returns the messages, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.message.as_str()).collect()
    }

    /// Converts this collection into a `Vec<Violation>`.
    pub fn into_vec(self) -> Vec<Violation> {
        self.0.into_vec()
    }

    /// Returns a reference to the underlying `NonEmptyVec`.
    pub fn as_non_empty_vec(&self) -> &NonEmptyVec<Violation> {
        &self.0
    }
}

impl Semigroup for Violations {
    fn combine(self, other: Self) -> Self {
        Violations(self.0.combine(other.0))
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} violation(s):", self.len())?;
        for (i, violation) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<Violation> for Violations {
    fn from(violation: Violation) -> Self {
        Self::single(violation)
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = Box<dyn Iterator<Item = &'a Violation> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Violations>();
    assert_sync::<Violations>();
};
