//! Top-level validation entry points and their configuration.
//!
//! This module provides the [`Validator`] type that runs validation blocks
//! against fresh scope trees, and [`ValidatorConfig`] for the fault policy.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::BoxError;
use crate::path::PathFormat;
use crate::scope::Scope;
use crate::status::{Outcome, Status};
use crate::validation::ValidationContext;

/// What happens when user code panics inside a validation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicPolicy {
    /// Let the panic unwind past `validate`.
    #[default]
    Propagate,
    /// Catch the panic at the operation boundary and turn it into
    /// [`Fault::Panicked`](crate::Fault::Panicked).
    Capture,
}

/// Type alias for the matchers registered with [`ValidatorConfig::fatal`].
type FatalMatcher = Arc<dyn Fn(&(dyn Error + Send + Sync + 'static)) -> bool + Send + Sync>;

/// Configuration of a [`Validator`].
///
/// # Example
///
/// ```rust
/// use inquest::{PanicPolicy, PathFormat, ValidatorConfig};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("database unavailable")]
/// struct DatabaseDown;
///
/// let config = ValidatorConfig::new()
///     .with_panic_policy(PanicPolicy::Capture)
///     .fatal::<DatabaseDown>()
///     .with_path_format(PathFormat::default().with_separator("/"));
///
/// assert_eq!(config.panic_policy(), PanicPolicy::Capture);
/// assert!(config.is_fatal(&DatabaseDown));
/// ```
#[derive(Clone, Default)]
pub struct ValidatorConfig {
    panic_policy: PanicPolicy,
    fatal: Vec<FatalMatcher>,
    path_format: PathFormat,
}

impl ValidatorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the panic policy.
    pub fn with_panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.panic_policy = policy;
        self
    }

    /// Marks error type `E` as never recoverable.
    ///
    /// Faults raised with an `E` ignore `recover_from` and always abort the
    /// validation.
    pub fn fatal<E: Error + 'static>(mut self) -> Self {
        self.fatal
            .push(Arc::new(|error: &(dyn Error + Send + Sync + 'static)| {
                error.is::<E>()
            }));
        self
    }

    /// Sets how paths are rendered by [`Validator::describe`].
    pub fn with_path_format(mut self, format: PathFormat) -> Self {
        self.path_format = format;
        self
    }

    /// Returns the panic policy.
    pub fn panic_policy(&self) -> PanicPolicy {
        self.panic_policy
    }

    /// Returns the path format.
    pub fn path_format(&self) -> &PathFormat {
        &self.path_format
    }

    /// Returns true if `error` has a type registered with [`fatal`](Self::fatal).
    pub fn is_fatal(&self, error: &(dyn Error + Send + Sync + 'static)) -> bool {
        self.fatal.iter().any(|matches| matches(error))
    }
}

impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("panic_policy", &self.panic_policy)
            .field("fatal", &self.fatal.len())
            .field("path_format", &self.path_format)
            .finish()
    }
}

/// Runs validation blocks against fresh scope trees.
///
/// Every call builds a new root scope, so one validator can be shared across
/// threads and reused for any number of values.
///
/// # Example
///
/// ```rust
/// use inquest::{checks, Validator};
///
/// let validator = Validator::new();
///
/// let outcome = validator.validate_named("", "name", |name| {
///     name.apply(&checks::not_blank())?;
///     Ok(())
/// });
///
/// let status = outcome.unwrap();
/// assert_eq!(validator.describe(&status), vec!["name: must not be blank"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: Arc<ValidatorConfig>,
}

impl Validator {
    /// Creates a validator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator with the given configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates `value` in an unnamed root scope.
    pub fn validate<T, F>(&self, value: &T, block: F) -> Outcome
    where
        T: ?Sized,
        F: FnOnce(&ValidationContext<'_, T>) -> Result<(), BoxError>,
    {
        self.run(Scope::root(), value, block)
    }

    /// Validates `value` in a root scope named `name`.
    ///
    /// A blank name aborts with a scope fault.
    pub fn validate_named<T, F>(&self, value: &T, name: &str, block: F) -> Outcome
    where
        T: ?Sized,
        F: FnOnce(&ValidationContext<'_, T>) -> Result<(), BoxError>,
    {
        self.run(Scope::named(name)?, value, block)
    }

    /// Renders each violation of `status` as `path: message`.
    pub fn describe(&self, status: &Status) -> Vec<String> {
        status
            .violations()
            .map(|violations| {
                violations
                    .iter()
                    .map(|v| v.describe(self.config.path_format()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn run<T, F>(&self, scope: Scope, value: &T, block: F) -> Outcome
    where
        T: ?Sized,
        F: FnOnce(&ValidationContext<'_, T>) -> Result<(), BoxError>,
    {
        let context = ValidationContext::new(value, &scope, &self.config);
        let outcome = context.guard(|| {
            context.run(block)?;
            Ok(scope.status())
        });

        if let Err(fault) = &outcome {
            debug!(path = %scope.path(), fault = %fault, "validation aborted");
        }
        outcome
    }
}

/// Validates `value` in an unnamed root scope with the default configuration.
///
/// # Example
///
/// ```rust
/// use inquest::{checks, validate};
///
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let user = User { name: String::new(), age: 12 };
///
/// let status = validate(&user, |v| {
///     v.field("name", &v.subject().name, |name| {
///         name.apply(&checks::not_blank())?;
///         Ok(())
///     })?;
///     v.field("age", &v.subject().age, |age| {
///         age.apply(&checks::at_least(18))?;
///         Ok(())
///     })?;
///     Ok(())
/// })
/// .unwrap();
///
/// let violations = status.violations().unwrap();
/// assert_eq!(violations.paths(), vec!["name", "age"]);
/// assert_eq!(violations.messages(), vec!["must not be blank", "must not be less than 18"]);
/// ```
pub fn validate<T, F>(value: &T, block: F) -> Outcome
where
    T: ?Sized,
    F: FnOnce(&ValidationContext<'_, T>) -> Result<(), BoxError>,
{
    Validator::new().validate(value, block)
}

/// Validates `value` in a root scope named `name` with the default
/// configuration.
pub fn validate_named<T, F>(value: &T, name: &str, block: F) -> Outcome
where
    T: ?Sized,
    F: FnOnce(&ValidationContext<'_, T>) -> Result<(), BoxError>,
{
    Validator::new().validate_named(value, name, block)
}
