//! Scopes: the nodes of the validation tree.
//!
//! A [`Scope`] owns its [`Path`], the violations recorded directly against
//! it, and its uniquely named child scopes. The root scope of a validation
//! owns every descendant; the aggregated [`Status`] is computed on demand by
//! walking the subtree.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::Violation;
use crate::path::{Path, PathError, Segment};
use crate::rule::Rule;
use crate::status::Status;

/// Errors raised by misuse of the scope tree.
///
/// These signal bugs in validation logic, not invalid data, and are never
/// recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// A child with an equal segment was already enclosed.
    #[error("scope '{parent}' already has a child '{segment}'")]
    DuplicateSegment {
        /// Path of the scope that was asked to enclose the child.
        parent: Path,
        /// The duplicated segment.
        segment: Segment,
    },

    /// A child was enclosed under the root marker.
    #[error("child scopes of '{0}' must be named or indexed")]
    UnnamedChild(Path),

    /// The child's path could not be built.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// A node of the validation tree.
///
/// Violation and child lists are guarded by one lock each, so a scope can be
/// driven from several threads; see [`ValidationContext::par_each_element`](crate::ValidationContext::par_each_element).
///
/// # Example
///
/// ```rust
/// use inquest::{checks, Scope, Segment};
///
/// let root = Scope::named("user").unwrap();
/// let age = root.enclose(Segment::name("age").unwrap()).unwrap();
///
/// age.check_value_against_rule(&12, &checks::at_least(18));
///
/// let status = root.status();
/// assert_eq!(status.violation_count(), 1);
/// assert_eq!(status.violations().unwrap().first().path.to_string(), "user.age");
///
/// // Enclosing the same segment twice is a programming error.
/// assert!(root.enclose(Segment::name("age").unwrap()).is_err());
/// ```
#[derive(Debug, Default)]
pub struct Scope {
    path: Path,
    violations: Mutex<Vec<Violation>>,
    children: Mutex<IndexMap<Segment, Arc<Scope>>>,
}

impl Scope {
    /// Creates an unnamed root scope.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a root scope named `name`.
    pub fn named(name: impl Into<String>) -> Result<Self, ScopeError> {
        Ok(Self::with_path(Path::root().push_name(name)?))
    }

    /// Creates a scope located at `path`.
    pub fn with_path(path: Path) -> Self {
        Self {
            path,
            violations: Mutex::new(Vec::new()),
            children: Mutex::new(IndexMap::new()),
        }
    }

    /// Returns the path of this scope.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates and registers a child scope under `segment`.
    ///
    /// # Errors
    ///
    /// Returns `ScopeError::DuplicateSegment` if a child with an equal segment
    /// already exists, `ScopeError::UnnamedChild` for [`Segment::Empty`], and
    /// `ScopeError::Path` if the child path is malformed (for example an index
    /// directly under an unnamed root).
    pub fn enclose(&self, segment: Segment) -> Result<Arc<Scope>, ScopeError> {
        if segment.is_empty() {
            return Err(ScopeError::UnnamedChild(self.path.clone()));
        }
        let path = self.path.append(segment.clone())?;

        let mut children = self.children.lock();
        if children.contains_key(&segment) {
            return Err(ScopeError::DuplicateSegment {
                parent: self.path.clone(),
                segment,
            });
        }

        let child = Arc::new(Scope::with_path(path));
        children.insert(segment, Arc::clone(&child));
        trace!(path = %child.path, "enclosed scope");
        Ok(child)
    }

    /// Records a violation directly against this scope.
    pub fn attach_violation(&self, violation: Violation) {
        self.violations.lock().push(violation);
    }

    /// Applies `rule` to `value` at this scope's path.
    ///
    /// A failing check attaches the violation and returns a copy of it; a
    /// passing check leaves the scope untouched.
    pub fn check_value_against_rule<T>(&self, value: &T, rule: &Rule<T>) -> Option<Violation>
    where
        T: Debug + ?Sized,
    {
        let violation = rule.verify(value, &self.path)?;
        trace!(path = %self.path, key = %violation.key, "rule failed");
        self.attach_violation(violation.clone());
        Some(violation)
    }

    /// Records the violations of `status` that this subtree doesn't hold yet.
    ///
    /// Statuses computed from the tree are absorbed without effect; violations
    /// built outside of it (for example by a recovery) are attached here, each
    /// keeping its own path. Matching counts multiplicity.
    pub fn absorb(&self, status: &Status) {
        let Some(incoming) = status.violations() else {
            return;
        };

        let mut held = self.status().violations().map_or_else(Vec::new, |held| {
            held.iter().cloned().collect()
        });
        for violation in incoming.iter() {
            match held.iter().position(|v| v == violation) {
                Some(pos) => {
                    held.swap_remove(pos);
                }
                None => {
                    trace!(path = %self.path, key = %violation.key, "absorbed violation");
                    self.attach_violation(violation.clone());
                }
            }
        }
    }

    /// Returns the violations recorded directly against this scope.
    pub fn violations(&self) -> Vec<Violation> {
        self.violations.lock().clone()
    }

    /// Returns the segments of the enclosed children, in enclosure order.
    pub fn child_segments(&self) -> Vec<Segment> {
        self.children.lock().keys().cloned().collect()
    }

    /// Returns the child enclosed under `segment`, if any.
    pub fn child(&self, segment: &Segment) -> Option<Arc<Scope>> {
        self.children.lock().get(segment).cloned()
    }

    /// Computes the aggregated status of this scope and its descendants.
    ///
    /// Own violations come first, then each child's status in enclosure
    /// order.
    pub fn status(&self) -> Status {
        let own = Status::from_violations(self.violations());
        let children: Vec<Arc<Scope>> = self.children.lock().values().cloned().collect();
        children
            .iter()
            .map(|child| child.status())
            .fold(own, Status::merge)
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Scope>();
    assert_sync::<Scope>();
};
