//! Rules: checks bound to error-message builders.
//!
//! A [`Rule`] pairs one [`Check`] with a message builder. Applying a rule to
//! a value either passes silently or produces a [`Violation`] carrying the
//! value, the path, the check's key and params, and the rendered message.
//!
//! # Example
//!
//! ```rust
//! use inquest::{checks, Path};
//!
//! let rule = checks::at_least(18);
//! let path = Path::root().push_name("age").unwrap();
//!
//! assert!(rule.verify(&21, &path).is_none());
//!
//! let violation = rule.verify(&12, &path).unwrap();
//! assert_eq!(violation.message, "must not be less than 18");
//! assert_eq!(violation.path.to_string(), "age");
//! ```

pub mod checks;
mod params;
mod traits;

use std::fmt::{self, Debug};
use std::sync::Arc;

use serde_json::Value;

use crate::error::Violation;
use crate::path::Path;

pub use params::Params;
pub use traits::{Check, CheckKey};

use traits::FnCheck;

/// Type alias for the message builder stored in a rule.
pub(crate) type MessageFn<T> = Arc<dyn Fn(&MessageContext<'_, T>) -> String + Send + Sync>;

/// Everything a message builder can see about a failed check.
pub struct MessageContext<'a, T: ?Sized> {
    /// The value that failed.
    pub value: &'a T,
    /// Where the value sits inside the validated structure.
    pub path: &'a Path,
    /// The identity of the failed check.
    pub key: CheckKey,
    /// The params of the failed check.
    pub params: &'a Params,
}

impl<T: ?Sized> MessageContext<'_, T> {
    /// Returns a named parameter of the failed check.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// A check bound to an error-message builder.
///
/// Rules are cheap to clone and can be shared between validation functions
/// and threads.
pub struct Rule<T: ?Sized> {
    check: Arc<dyn Check<T>>,
    message: MessageFn<T>,
}

impl<T: ?Sized> Rule<T> {
    /// Creates a rule from a check and a message builder.
    pub fn new<C, M>(check: C, message: M) -> Self
    where
        C: Check<T> + 'static,
        M: Fn(&MessageContext<'_, T>) -> String + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            message: Arc::new(message),
        }
    }

    /// Creates a rule from a predicate closure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Params, Path, Rule};
    ///
    /// let even = Rule::from_fn(
    ///     "even",
    ///     Params::none(),
    ///     |n: &i64| n % 2 == 0,
    ///     |_| "must be even".to_string(),
    /// );
    ///
    /// let path = Path::of(["count"]).unwrap();
    /// assert!(even.verify(&4, &path).is_none());
    /// assert_eq!(even.verify(&3, &path).unwrap().message, "must be even");
    /// ```
    pub fn from_fn<P, M>(key: &'static str, params: Params, predicate: P, message: M) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        M: Fn(&MessageContext<'_, T>) -> String + Send + Sync + 'static,
    {
        Self::new(
            FnCheck {
                key: CheckKey::new(key),
                params,
                predicate,
            },
            message,
        )
    }

    /// Replaces the message builder and returns self for chaining.
    pub fn with_message<M>(mut self, message: M) -> Self
    where
        M: Fn(&MessageContext<'_, T>) -> String + Send + Sync + 'static,
    {
        self.message = Arc::new(message);
        self
    }

    /// Returns the key of the underlying check.
    pub fn key(&self) -> CheckKey {
        self.check.key()
    }

    /// Returns the params of the underlying check.
    pub fn params(&self) -> Params {
        self.check.params()
    }

    /// Evaluates the check without building a violation.
    pub fn check(&self, value: &T) -> bool {
        self.check.check(value)
    }

    /// Evaluates the check against `value` located at `path`.
    ///
    /// Returns `None` when the check passes, otherwise the violation built
    /// with this rule's message builder.
    pub fn verify(&self, value: &T, path: &Path) -> Option<Violation>
    where
        T: Debug,
    {
        if self.check.check(value) {
            return None;
        }

        let key = self.check.key();
        let params = self.check.params();
        let message = (self.message)(&MessageContext {
            value,
            path,
            key,
            params: &params,
        });

        Some(Violation::new(
            path.clone(),
            key,
            params,
            format!("{:?}", value),
            message,
        ))
    }
}

impl<T: ?Sized> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
            message: Arc::clone(&self.message),
        }
    }
}

impl<T: ?Sized> Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("key", &self.key())
            .field("params", &self.params())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LessThan(i64);

    impl Check<i64> for LessThan {
        fn key(&self) -> CheckKey {
            CheckKey::new("less_than")
        }

        fn params(&self) -> Params {
            Params::none().with("max", self.0)
        }

        fn check(&self, value: &i64) -> bool {
            *value < self.0
        }
    }

    fn less_than(max: i64) -> Rule<i64> {
        Rule::new(LessThan(max), |ctx| {
            format!("must be less than {}", ctx.param("max").unwrap_or(&Value::Null))
        })
    }

    #[test]
    fn test_passing_check_produces_nothing() {
        let path = Path::of(["n"]).unwrap();
        assert!(less_than(10).verify(&3, &path).is_none());
    }

    #[test]
    fn test_failing_check_builds_violation() {
        let path = Path::of(["limits", "n"]).unwrap();
        let violation = less_than(10).verify(&42, &path).unwrap();

        assert_eq!(violation.path, path);
        assert_eq!(violation.value, "42");
        assert_eq!(violation.key, CheckKey::new("less_than"));
        assert_eq!(violation.params.get("max"), Some(&json!(10)));
        assert_eq!(violation.message, "must be less than 10");
    }

    #[test]
    fn test_message_builder_is_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rule = less_than(10).with_message(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            "too big".to_string()
        });
        let path = Path::of(["n"]).unwrap();

        assert!(rule.verify(&1, &path).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(rule.verify(&11, &path).unwrap().message, "too big");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_message_sees_value_and_path() {
        let rule = Rule::from_fn(
            "short",
            Params::none(),
            |s: &str| s.len() < 4,
            |ctx| format!("{} is too long at {}", ctx.value, ctx.path.last_sub_path()),
        );
        let path = Path::of(["user", "nick"]).unwrap();
        let violation = rule.verify("abcdef", &path).unwrap();
        assert_eq!(violation.message, "abcdef is too long at nick");
        assert_eq!(violation.value, "\"abcdef\"");
        assert!(violation.params.is_none());
    }

    #[test]
    fn test_clone_shares_check() {
        let rule = less_than(5);
        let cloned = rule.clone();
        assert_eq!(rule.key(), cloned.key());
        assert_eq!(rule.params(), cloned.params());
        assert!(!cloned.check(&7));
    }
}
