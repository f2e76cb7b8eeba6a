//! The check contract.
//!
//! This module provides the [`Check`] trait consumed by [`Rule`](super::Rule)
//! and the [`CheckKey`] identity every check carries.

use std::fmt::{self, Display};

use super::params::Params;

/// A stable, programmer-assigned identity for a kind of check.
///
/// Two checks of the same kind share a key regardless of their params, so
/// violations can be grouped or looked up by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckKey(&'static str);

impl CheckKey {
    /// Creates a key from a static name such as `"not_blank"`.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the key's name.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A pure predicate over values of type `T`.
///
/// A check reports its kind through [`Check::key`] and exposes the immutable
/// parameters it was built with through [`Check::params`], so message builders
/// can render texts like "must not be less than 18".
///
/// The `Send + Sync` bounds allow rules to be shared across threads.
///
/// # Example
///
/// ```rust
/// use inquest::{Check, CheckKey, Params};
///
/// struct Even;
///
/// impl Check<i64> for Even {
///     fn key(&self) -> CheckKey {
///         CheckKey::new("even")
///     }
///
///     fn check(&self, value: &i64) -> bool {
///         value % 2 == 0
///     }
/// }
///
/// assert!(Even.check(&4));
/// assert_eq!(Even.params(), Params::none());
/// ```
pub trait Check<T: ?Sized>: Send + Sync {
    /// Returns the identity of this kind of check.
    fn key(&self) -> CheckKey;

    /// Returns the parameters this check was built with.
    fn params(&self) -> Params {
        Params::none()
    }

    /// Returns true if `value` passes.
    fn check(&self, value: &T) -> bool;
}

/// A check built from a closure.
pub(crate) struct FnCheck<F> {
    pub(crate) key: CheckKey,
    pub(crate) params: Params,
    pub(crate) predicate: F,
}

impl<T, F> Check<T> for FnCheck<F>
where
    T: ?Sized,
    F: Fn(&T) -> bool + Send + Sync,
{
    fn key(&self) -> CheckKey {
        self.key
    }

    fn params(&self) -> Params {
        self.params.clone()
    }

    fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
}
