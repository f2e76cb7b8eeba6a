//! Faults: failures that abort a validation instead of being recorded.
//!
//! A [`Fault`] is the exceptional arm of an [`Outcome`](crate::Outcome). It
//! is raised when a validation block returns an error, when a scope is
//! enclosed twice under the same segment, or (with
//! [`PanicPolicy::Capture`](crate::PanicPolicy)) when user code panics.

use std::any::Any;
use std::error::Error;

use crate::error::Violations;
use crate::scope::ScopeError;
use crate::validator::ValidatorConfig;

/// Boxed error type returned by validation blocks.
///
/// Any error converts into it with `?`, including a nested [`Fault`], which
/// is unwrapped again at the block boundary.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An unrecovered failure of a validation operation.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// A validation block returned an error.
    #[error("validation block raised an error: {source}")]
    Raised {
        /// The error the block returned.
        #[source]
        source: BoxError,
        /// Whether the error type was configured as never recoverable.
        fatal: bool,
    },

    /// User code panicked while panics were being captured.
    #[error("validation block panicked: {0}")]
    Panicked(String),

    /// The validation logic misused the scope tree.
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl Fault {
    /// Converts an error returned by a block into a fault.
    ///
    /// A fault raised by a nested operation passes through unchanged.
    pub(crate) fn raised(source: BoxError, config: &ValidatorConfig) -> Self {
        match source.downcast::<Fault>() {
            Ok(fault) => *fault,
            Err(source) => {
                let fatal = config.is_fatal(&*source);
                Fault::Raised { source, fatal }
            }
        }
    }

    /// Converts a panic payload into a fault.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Fault::Panicked(message)
    }

    /// Returns the raised error as `E`, if that is its concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            Fault::Raised { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns true if the raised error has concrete type `E`.
    pub fn is<E: Error + 'static>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }

    /// Returns true if typed recovery may replace this fault.
    ///
    /// Scope misuse, captured panics and fatal error types are never
    /// recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Fault::Raised { fatal: false, .. })
    }

    /// Returns true for scope misuse such as a duplicate child segment.
    pub fn is_scope_error(&self) -> bool {
        matches!(self, Fault::Scope(_))
    }

    /// Consumes the fault and returns the raised error, if any.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            Fault::Raised { source, .. } => Some(source),
            _ => None,
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Fault>();
    assert_sync::<Fault>();
};

/// The structured error of a validation that did not complete as valid.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Validation completed and found violations.
    #[error(transparent)]
    Invalid(Violations),

    /// Validation was aborted by a fault.
    #[error(transparent)]
    Aborted(#[from] Fault),
}

impl ValidationError {
    /// Returns the violations of a completed, invalid validation.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            ValidationError::Invalid(violations) => Some(violations),
            ValidationError::Aborted(_) => None,
        }
    }
}
