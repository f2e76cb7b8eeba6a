//! The validation DSL.
//!
//! A [`ValidationContext`] is what a validation block receives: the value
//! being validated, the scope it is validated in, and the validator
//! configuration. Every operation on the context returns an [`Outcome`];
//! blocks propagate faults with `?` and ignore statuses they don't need,
//! since violations are recorded in the scope tree as they are found.

use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{BoxError, Fault};
use crate::path::{Path, Segment};
use crate::rule::Rule;
use crate::scope::{Scope, ScopeError};
use crate::status::{self, fold_outcomes, Outcome, Status};
use crate::validator::{PanicPolicy, ValidatorConfig};

/// Name of the sub-scope a map key is validated in.
const KEY_SCOPE: &str = "key";

/// Name of the sub-scope a map value is validated in when its key is too.
const VALUE_SCOPE: &str = "value";

/// Validation context handed to every validation block.
///
/// The context borrows the subject, its scope and the configuration for the
/// duration of one block; nested operations build child contexts.
///
/// # Example
///
/// ```rust
/// use inquest::{checks, validate_named};
///
/// let tags = vec!["db".to_string(), "  ".to_string()];
///
/// let status = validate_named(&tags, "tags", |tags| {
///     tags.apply(&checks::max_len(8))?;
///     tags.each_element(|tag| {
///         tag.apply(&checks::not_blank())?;
///         Ok(())
///     })?;
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(status.violations().unwrap().paths(), vec!["tags[1]"]);
/// ```
pub struct ValidationContext<'a, T: ?Sized> {
    subject: &'a T,
    scope: &'a Scope,
    config: &'a ValidatorConfig,
}

impl<'a, T: ?Sized> ValidationContext<'a, T> {
    pub(crate) fn new(subject: &'a T, scope: &'a Scope, config: &'a ValidatorConfig) -> Self {
        Self {
            subject,
            scope,
            config,
        }
    }

    /// Returns the value being validated.
    pub fn subject(&self) -> &'a T {
        self.subject
    }

    /// Returns the path of the current scope.
    pub fn path(&self) -> &'a Path {
        self.scope.path()
    }

    /// Returns the current scope.
    pub fn scope(&self) -> &'a Scope {
        self.scope
    }

    /// Returns the validator configuration.
    pub fn config(&self) -> &'a ValidatorConfig {
        self.config
    }

    /// Runs `op`, turning a panic into a fault when panics are captured.
    pub(crate) fn guard<R, F>(&self, op: F) -> Result<R, Fault>
    where
        F: FnOnce() -> Result<R, Fault>,
    {
        match self.config.panic_policy() {
            PanicPolicy::Propagate => op(),
            PanicPolicy::Capture => catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(|payload| {
                let fault = Fault::from_panic(payload);
                debug!(path = %self.path(), fault = %fault, "captured panic");
                Err(fault)
            }),
        }
    }

    /// Runs a block against this context; an error it returns is a fault.
    pub(crate) fn run<F>(&self, block: F) -> Result<(), Fault>
    where
        F: FnOnce(&Self) -> Result<(), BoxError>,
    {
        block(self).map_err(|source| {
            let fault = Fault::raised(source, self.config);
            debug!(path = %self.path(), fault = %fault, "block raised");
            fault
        })
    }

    /// Applies `rule` to the subject.
    ///
    /// A failing rule records its violation in the current scope. The
    /// returned status covers this rule only.
    pub fn apply(&self, rule: &Rule<T>) -> Outcome
    where
        T: fmt::Debug,
    {
        self.guard(|| {
            Ok(self
                .scope
                .check_value_against_rule(self.subject, rule)
                .map_or(Status::Valid, Status::from))
        })
    }

    /// Applies every rule in order; a failing rule doesn't stop the rest.
    pub fn apply_all(&self, rules: &[Rule<T>]) -> Outcome
    where
        T: fmt::Debug,
    {
        fold_outcomes(rules.iter().map(|rule| self.apply(rule)))
    }

    /// Runs `next` only if `outcome` is valid.
    ///
    /// An invalid status or a fault is returned unchanged. The status `next`
    /// produces is recorded in the current scope, so violations it built
    /// without applying rules still reach the result of the validation.
    pub fn when_valid<F>(&self, outcome: Outcome, next: F) -> Outcome
    where
        F: FnOnce() -> Outcome,
    {
        match outcome? {
            Status::Valid => self.record(self.guard(next)),
            invalid => Ok(invalid),
        }
    }

    /// Replaces a recoverable fault whose error has concrete type `E` with
    /// the outcome of `recover`. Any other outcome is returned unchanged.
    ///
    /// The replacement status is recorded in the current scope and takes the
    /// place of the failed operation in the result of the validation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{validate_named, CheckKey, Params, Status, Violation};
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// #[error("user service unavailable")]
    /// struct Unavailable;
    ///
    /// let status = validate_named("u1", "owner", |owner| {
    ///     let checked = owner.field("exists", owner.subject(), |_| Err(Unavailable.into()));
    ///     owner.recover_from::<Unavailable, _>(checked, |err| {
    ///         let unknown = Violation::new(
    ///             owner.path().clone(),
    ///             CheckKey::new("exists"),
    ///             Params::none(),
    ///             "\"u1\"",
    ///             err.to_string(),
    ///         );
    ///         Ok(Status::from(unknown))
    ///     })?;
    ///     Ok(())
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(status.violations().unwrap().messages(), vec!["user service unavailable"]);
    /// ```
    pub fn recover_from<E, F>(&self, outcome: Outcome, recover: F) -> Outcome
    where
        E: Error + 'static,
        F: FnOnce(&E) -> Outcome,
    {
        match outcome {
            Err(fault) => self.record(self.guard(|| status::recover::<E, _>(Err(fault), recover))),
            completed => completed,
        }
    }

    fn record(&self, outcome: Outcome) -> Outcome {
        if let Ok(status) = &outcome {
            self.scope.absorb(status);
        }
        outcome
    }

    /// Validates `value` in a child scope under `segment`.
    ///
    /// Returns the status of the child subtree.
    ///
    /// # Errors
    ///
    /// Aborts with a scope fault if `segment` was already enclosed here or
    /// cannot follow the current path, and with the block's fault if the
    /// block fails.
    pub fn at<U, F>(&self, segment: Segment, value: &U, block: F) -> Outcome
    where
        U: ?Sized,
        F: FnOnce(&ValidationContext<'_, U>) -> Result<(), BoxError>,
    {
        self.guard(|| {
            let child = self.scope.enclose(segment)?;
            ValidationContext::new(value, &child, self.config).run(block)?;
            Ok(child.status())
        })
    }

    /// Validates `value` in a child scope named `name`.
    pub fn field<U, F>(&self, name: &str, value: &U, block: F) -> Outcome
    where
        U: ?Sized,
        F: FnOnce(&ValidationContext<'_, U>) -> Result<(), BoxError>,
    {
        let segment = Segment::name(name).map_err(ScopeError::from)?;
        self.at(segment, value, block)
    }

    /// Validates an optional field.
    ///
    /// An absent value is valid and encloses no scope.
    pub fn optional<U, F>(&self, name: &str, value: Option<&U>, block: F) -> Outcome
    where
        U: ?Sized,
        F: FnOnce(&ValidationContext<'_, U>) -> Result<(), BoxError>,
    {
        let segment = Segment::name(name).map_err(ScopeError::from)?;
        match value {
            Some(value) => self.at(segment, value, block),
            None => Ok(Status::Valid),
        }
    }

    /// Validates every element of the subject in its own indexed scope.
    ///
    /// Elements are visited in iteration order; the first faulting element
    /// aborts the rest. Indexes cannot follow an unnamed root, so the subject
    /// must sit under a named scope.
    pub fn each_element<U, F>(&self, block: F) -> Outcome
    where
        &'a T: IntoIterator<Item = &'a U>,
        U: 'a,
        F: Fn(&ValidationContext<'_, U>) -> Result<(), BoxError>,
    {
        let elements = IntoIterator::into_iter(self.subject)
            .enumerate()
            .map(|(idx, element)| self.at(Segment::index(idx), element, &block));
        fold_outcomes(elements)
    }

    /// Like [`each_element`](Self::each_element), with the element blocks run
    /// on the rayon thread pool.
    ///
    /// Child scopes are enclosed up front in element order, so the resulting
    /// status is ordered exactly as the sequential version. Every element is
    /// validated; the fault of the lowest index wins.
    pub fn par_each_element<U, F>(&self, block: F) -> Outcome
    where
        T: Sync,
        &'a T: IntoIterator<Item = &'a U>,
        U: Sync + 'a,
        F: Fn(&ValidationContext<'_, U>) -> Result<(), BoxError> + Sync,
    {
        let elements: Vec<&'a U> = IntoIterator::into_iter(self.subject).collect();
        let children = (0..elements.len())
            .map(|idx| self.scope.enclose(Segment::index(idx)))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(path = %self.path(), elements = elements.len(), "parallel elements");

        let outcomes: Vec<Outcome> = elements
            .par_iter()
            .zip(children.par_iter())
            .map(|(element, child)| {
                let context = ValidationContext::new(*element, child, self.config);
                context.guard(|| {
                    context.run(&block)?;
                    Ok(child.status())
                })
            })
            .collect();
        fold_outcomes(outcomes)
    }

    /// Validates the values of a map-like subject, one keyed scope per entry.
    ///
    /// `key_segment` renders each key as the entry's path segment; a blank
    /// rendering aborts with a scope fault. The value block runs in the entry
    /// scope itself.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use inquest::{checks, validate_named};
    ///
    /// let limits = BTreeMap::from([("cpu".to_string(), 4), ("mem".to_string(), 0)]);
    ///
    /// let status = validate_named(&limits, "limits", |limits| {
    ///     limits.each_entry(|key: &String| key.clone(), |limit| {
    ///         limit.apply(&checks::positive())?;
    ///         Ok(())
    ///     })?;
    ///     Ok(())
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(status.violations().unwrap().paths(), vec!["limits[mem]"]);
    /// ```
    pub fn each_entry<K, V, S, F>(&self, key_segment: S, value_block: F) -> Outcome
    where
        &'a T: IntoIterator<Item = (&'a K, &'a V)>,
        K: 'a,
        V: 'a,
        S: Fn(&K) -> String,
        F: Fn(&ValidationContext<'_, V>) -> Result<(), BoxError>,
    {
        self.entries(key_segment, None, value_block)
    }

    /// Like [`each_entry`](Self::each_entry), also validating each key.
    ///
    /// The key block runs in a `key` sub-scope of the entry, then the value
    /// block runs in a `value` sub-scope, so violations follow execution
    /// order and the value block may enclose any field name.
    pub fn each_entry_keyed<K, V, S, KF, VF>(
        &self,
        key_segment: S,
        key_block: KF,
        value_block: VF,
    ) -> Outcome
    where
        &'a T: IntoIterator<Item = (&'a K, &'a V)>,
        K: 'a,
        V: 'a,
        S: Fn(&K) -> String,
        KF: Fn(&ValidationContext<'_, K>) -> Result<(), BoxError>,
        VF: Fn(&ValidationContext<'_, V>) -> Result<(), BoxError>,
    {
        let key_block: &dyn Fn(&ValidationContext<'_, K>) -> Result<(), BoxError> = &key_block;
        self.entries(key_segment, Some(key_block), value_block)
    }

    fn entries<K, V, S, F>(
        &self,
        key_segment: S,
        key_block: Option<&dyn Fn(&ValidationContext<'_, K>) -> Result<(), BoxError>>,
        value_block: F,
    ) -> Outcome
    where
        &'a T: IntoIterator<Item = (&'a K, &'a V)>,
        K: 'a,
        V: 'a,
        S: Fn(&K) -> String,
        F: Fn(&ValidationContext<'_, V>) -> Result<(), BoxError>,
    {
        let entries = IntoIterator::into_iter(self.subject).map(|(key, value)| {
            self.guard(|| {
                let segment = Segment::key(key_segment(key)).map_err(ScopeError::from)?;
                let entry = self.scope.enclose(segment)?;
                let context = ValidationContext::new(value, &entry, self.config);
                match key_block {
                    Some(key_block) => {
                        context.at(Segment::Name(KEY_SCOPE.to_string()), key, key_block)?;
                        context.at(Segment::Name(VALUE_SCOPE.to_string()), value, &value_block)?;
                    }
                    None => context.run(&value_block)?,
                }
                Ok(entry.status())
            })
        });
        fold_outcomes(entries)
    }
}

impl<T: ?Sized> fmt::Debug for ValidationContext<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("path", self.path())
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
