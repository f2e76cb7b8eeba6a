//! Outcome aggregation.
//!
//! [`Status`] is the two-state result of a scope subtree: valid, or invalid
//! with the ordered violations found. Merging statuses is associative with
//! `Valid` as identity, and keeps violations in left-then-right order.
//!
//! [`Outcome`] adds the exceptional arm: an operation either completes with a
//! status or is aborted by a [`Fault`]. Merging outcomes keeps the first fault.
//!
//! # Example
//!
//! ```rust
//! use inquest::{fold_outcomes, Outcome, Status};
//!
//! let outcomes: Vec<Outcome> = vec![Ok(Status::Valid), Ok(Status::Valid)];
//! assert!(fold_outcomes(outcomes).unwrap().is_valid());
//! ```

use std::error::Error;

use stillwater::prelude::*;
use stillwater::Validation;
use tracing::debug;

use crate::error::{Fault, ValidationError, Violation, Violations};

/// Aggregated result of a scope subtree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    /// No violations.
    #[default]
    Valid,
    /// At least one violation, in the order found.
    Invalid(Violations),
}

impl Status {
    /// Builds a status from a possibly empty list of violations.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        match Violations::from_vec(violations) {
            Some(violations) => Status::Invalid(violations),
            None => Status::Valid,
        }
    }

    /// Returns true if there are no violations.
    pub fn is_valid(&self) -> bool {
        matches!(self, Status::Valid)
    }

    /// Returns true if there is at least one violation.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Returns the violations, if any.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Status::Valid => None,
            Status::Invalid(violations) => Some(violations),
        }
    }

    /// Returns the number of violations.
    pub fn violation_count(&self) -> usize {
        self.violations().map_or(0, Violations::len)
    }

    /// Merges two statuses, keeping `self`'s violations first.
    pub fn merge(self, other: Status) -> Status {
        match (self, other) {
            (Status::Valid, other) => other,
            (this, Status::Valid) => this,
            (Status::Invalid(left), Status::Invalid(right)) => Status::Invalid(left.combine(right)),
        }
    }

    /// Converts into stillwater's accumulating `Validation`.
    pub fn into_validation(self) -> Validation<(), Violations> {
        match self {
            Status::Valid => Validation::Success(()),
            Status::Invalid(violations) => Validation::Failure(violations),
        }
    }
}

impl Semigroup for Status {
    fn combine(self, other: Self) -> Self {
        self.merge(other)
    }
}

impl From<Violation> for Status {
    fn from(violation: Violation) -> Self {
        Status::Invalid(Violations::single(violation))
    }
}

impl From<Validation<(), Violations>> for Status {
    fn from(validation: Validation<(), Violations>) -> Self {
        match validation {
            Validation::Success(()) => Status::Valid,
            Validation::Failure(violations) => Status::Invalid(violations),
        }
    }
}

impl FromIterator<Status> for Status {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        iter.into_iter().fold(Status::Valid, Status::merge)
    }
}

/// A completed status, or the fault that aborted the computation.
pub type Outcome = Result<Status, Fault>;

/// Folds outcomes left to right.
///
/// Stops at the first fault without pulling further items from the
/// iterator, otherwise merges every status.
pub fn fold_outcomes<I>(outcomes: I) -> Outcome
where
    I: IntoIterator<Item = Outcome>,
{
    outcomes
        .into_iter()
        .try_fold(Status::Valid, |acc, outcome| Ok(acc.merge(outcome?)))
}

/// Combinators over [`Outcome`].
///
/// Combinators that replace an outcome record the replacement in the scope
/// tree and live on [`ValidationContext`](crate::ValidationContext):
/// [`when_valid`](crate::ValidationContext::when_valid) and
/// [`recover_from`](crate::ValidationContext::recover_from).
pub trait OutcomeExt {
    /// Merges two outcomes; the first fault wins.
    fn merge(self, other: Outcome) -> Outcome;

    /// Converts into a plain result: valid is `Ok(())`, violations and faults
    /// become a [`ValidationError`].
    fn into_result(self) -> Result<(), ValidationError>;
}

impl OutcomeExt for Outcome {
    fn merge(self, other: Outcome) -> Outcome {
        Ok(self?.merge(other?))
    }

    fn into_result(self) -> Result<(), ValidationError> {
        match self? {
            Status::Valid => Ok(()),
            Status::Invalid(violations) => Err(ValidationError::Invalid(violations)),
        }
    }
}

/// Replaces a recoverable fault whose error has concrete type `E` with the
/// outcome of `replace`. Any other outcome is returned unchanged.
pub(crate) fn recover<E, F>(outcome: Outcome, replace: F) -> Outcome
where
    E: Error + 'static,
    F: FnOnce(&E) -> Outcome,
{
    let fault = match outcome {
        Err(fault) => fault,
        completed => return completed,
    };

    let recovered = fault
        .is_recoverable()
        .then(|| fault.downcast_ref::<E>())
        .flatten()
        .map(replace);

    match recovered {
        Some(outcome) => {
            debug!(fault = %fault, "recovered from fault");
            outcome
        }
        None => Err(fault),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use crate::rule::{CheckKey, Params};
    use crate::validator::ValidatorConfig;

    #[derive(Debug, thiserror::Error)]
    #[error("lookup failed")]
    struct LookupFailed;

    #[derive(Debug, thiserror::Error)]
    #[error("other")]
    struct Other;

    fn violation(name: &str) -> Violation {
        Violation::new(
            Path::of([name]).unwrap(),
            CheckKey::new("test"),
            Params::none(),
            "0",
            format!("{} failed", name),
        )
    }

    fn invalid(names: &[&str]) -> Status {
        Status::from_violations(names.iter().map(|n| violation(n)).collect())
    }

    fn fault<E: Error + Send + Sync + 'static>(error: E) -> Fault {
        Fault::raised(Box::new(error), &ValidatorConfig::default())
    }

    fn ok(status: Status) -> Outcome {
        Ok(status)
    }

    fn err<E: Error + Send + Sync + 'static>(error: E) -> Outcome {
        Err(fault(error))
    }

    #[test]
    fn test_merge_table() {
        assert_eq!(Status::Valid.merge(Status::Valid), Status::Valid);
        assert_eq!(Status::Valid.merge(invalid(&["a"])), invalid(&["a"]));
        assert_eq!(invalid(&["a"]).merge(Status::Valid), invalid(&["a"]));
        assert_eq!(invalid(&["a"]).merge(invalid(&["b", "c"])), invalid(&["a", "b", "c"]));
    }

    #[test]
    fn test_from_iterator_and_counts() {
        let status: Status = vec![invalid(&["a"]), Status::Valid, invalid(&["b"])]
            .into_iter()
            .collect();
        assert_eq!(status.violation_count(), 2);
        assert_eq!(status.violations().unwrap().paths(), vec!["a", "b"]);
        assert!(status.is_invalid());
        assert_eq!(Status::Valid.violation_count(), 0);
    }

    #[test]
    fn test_validation_round_trip() {
        let status = invalid(&["a"]);
        let validation = status.clone().into_validation();
        assert!(validation.is_failure());
        assert_eq!(Status::from(validation), status);
        assert!(Status::Valid.into_validation().is_success());
    }

    #[test]
    fn test_outcome_merge_first_fault_wins() {
        let merged = err(LookupFailed).merge(err(Other));
        assert!(merged.unwrap_err().is::<LookupFailed>());

        let merged = ok(invalid(&["a"])).merge(err(Other));
        assert!(merged.unwrap_err().is::<Other>());

        let merged = ok(invalid(&["a"])).merge(Ok(invalid(&["b"])));
        assert_eq!(merged.unwrap().violation_count(), 2);
    }

    #[test]
    fn test_fold_short_circuits() {
        let mut pulled = 0;
        let outcomes = (0..5).map(|i| {
            pulled += 1;
            if i == 2 {
                err(LookupFailed)
            } else {
                Ok(invalid(&["x"]))
            }
        });
        assert!(fold_outcomes(outcomes).is_err());
        assert_eq!(pulled, 3);
    }

    #[test]
    fn test_recover_matching_type() {
        let outcome = recover::<LookupFailed, _>(err(LookupFailed), |_| Ok(invalid(&["r"])));
        assert_eq!(outcome.unwrap(), invalid(&["r"]));
    }

    #[test]
    fn test_recover_other_type_keeps_fault() {
        let outcome = recover::<LookupFailed, _>(err(Other), |_| Ok(Status::Valid));
        assert!(outcome.unwrap_err().is::<Other>());

        let outcome = recover::<LookupFailed, _>(ok(invalid(&["a"])), |_| Ok(Status::Valid));
        assert_eq!(outcome.unwrap(), invalid(&["a"]));
    }

    #[test]
    fn test_recover_skips_fatal() {
        let config = ValidatorConfig::default().fatal::<LookupFailed>();
        let aborted: Outcome = Err(Fault::raised(Box::new(LookupFailed), &config));
        let outcome = recover::<LookupFailed, _>(aborted, |_| Ok(Status::Valid));
        assert!(outcome.is_err());
    }

    #[test]
    fn test_into_result() {
        assert!(ok(Status::Valid).into_result().is_ok());

        let invalid_err = ok(invalid(&["a"])).into_result().unwrap_err();
        assert_eq!(invalid_err.violations().map(Violations::len), Some(1));

        let aborted_err = err(Other).into_result().unwrap_err();
        assert!(matches!(aborted_err, ValidationError::Aborted(_)));
    }
}
