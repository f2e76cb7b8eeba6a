//! Path representation for locating violations inside a validated value.
//!
//! This module provides [`Path`], [`Segment`] and [`Index`]. A path is an
//! immutable chain of segments linked newest-first, so extending a path never
//! copies its prefix: sibling scopes share their parent's tail.

use std::fmt::{self, Display};
use std::sync::Arc;

/// An index step inside a collection or map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Index {
    /// Position of an element in an iterated collection (e.g. `[0]`).
    Numeric(usize),
    /// Rendered key of a map entry (e.g. `[alice]`).
    Key(String),
}

impl Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Numeric(idx) => write!(f, "[{}]", idx),
            Index::Key(key) => write!(f, "[{}]", key),
        }
    }
}

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The root marker. Appending it to a path is a no-op.
    Empty,
    /// A named field or block (e.g. `user`, `email`).
    Name(String),
    /// A numeric or keyed index (e.g. `[0]`, `[alice]`).
    Index(Index),
}

impl Segment {
    /// Creates a name segment, rejecting blank names.
    pub fn name(name: impl Into<String>) -> Result<Self, PathError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PathError::BlankName);
        }
        Ok(Segment::Name(name))
    }

    /// Creates a numeric index segment.
    pub fn index(idx: usize) -> Self {
        Segment::Index(Index::Numeric(idx))
    }

    /// Creates a keyed index segment, rejecting blank keys.
    pub fn key(key: impl Into<String>) -> Result<Self, PathError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(PathError::BlankKey);
        }
        Ok(Segment::Index(Index::Key(key)))
    }

    /// Returns true for numeric and keyed index segments.
    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// Returns true for the root marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Segment::Empty)
    }

    fn check(&self) -> Result<(), PathError> {
        match self {
            Segment::Name(name) if name.trim().is_empty() => Err(PathError::BlankName),
            Segment::Index(Index::Key(key)) if key.trim().is_empty() => Err(PathError::BlankKey),
            _ => Ok(()),
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Empty => Ok(()),
            Segment::Name(name) => write!(f, "{}", name),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Errors raised while building a path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A name segment was empty or whitespace only.
    #[error("path segment names must not be blank")]
    BlankName,

    /// A key index was empty or whitespace only.
    #[error("index keys must not be blank")]
    BlankKey,

    /// An index was appended to a path that has no named segment yet.
    #[error("index {0} cannot start a path, it must follow a named segment")]
    IndexAtRoot(Index),
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Node {
    segment: Segment,
    tail: Option<Arc<Node>>,
}

/// A location inside a validated value.
///
/// `Path` represents locations like `users[0].email`. It is persistent:
/// [`Path::append`] returns a new path and leaves the receiver untouched.
/// Equality and hashing are structural.
///
/// # Example
///
/// ```rust
/// use inquest::Path;
///
/// let path = Path::root()
///     .push_name("users").unwrap()
///     .push_index(0).unwrap()
///     .push_name("email").unwrap();
///
/// assert_eq!(path.to_string(), "users[0].email");
/// assert_eq!(path.last_sub_path(), "email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    head: Option<Arc<Node>>,
    len: usize,
}

impl Path {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path made of name segments, in order.
    pub fn of<I, S>(names: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .try_fold(Self::root(), |path, name| path.push_name(name))
    }

    /// Returns a new path with `segment` appended.
    ///
    /// Appending [`Segment::Empty`] returns an equal path. Appending an index
    /// to the root path fails, as does appending a blank name or key.
    pub fn append(&self, segment: Segment) -> Result<Self, PathError> {
        segment.check()?;
        match segment {
            Segment::Empty => Ok(self.clone()),
            Segment::Index(index) if self.is_root() => Err(PathError::IndexAtRoot(index)),
            segment => Ok(Self {
                head: Some(Arc::new(Node {
                    segment,
                    tail: self.head.clone(),
                })),
                len: self.len + 1,
            }),
        }
    }

    /// Returns a new path with a name segment appended.
    pub fn push_name(&self, name: impl Into<String>) -> Result<Self, PathError> {
        self.append(Segment::name(name)?)
    }

    /// Returns a new path with a numeric index appended.
    pub fn push_index(&self, idx: usize) -> Result<Self, PathError> {
        self.append(Segment::index(idx))
    }

    /// Returns a new path with a keyed index appended.
    pub fn push_key(&self, key: impl Into<String>) -> Result<Self, PathError> {
        self.append(Segment::key(key)?)
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&Segment> {
        self.head.as_deref().map(|node| &node.segment)
    }

    /// Returns the parent path, or None if this is root.
    pub fn parent(&self) -> Option<Self> {
        self.head.as_deref().map(|node| Self {
            head: node.tail.clone(),
            len: self.len - 1,
        })
    }

    /// Returns the segments from root to leaf.
    pub fn segments(&self) -> Vec<Segment> {
        self.root_first().into_iter().cloned().collect()
    }

    /// Renders the path, joining names with `separator`.
    ///
    /// Index segments attach directly to the preceding token, so
    /// `a[0][1]` never contains a separator between brackets.
    pub fn join(&self, separator: &str) -> String {
        self.join_with(separator, |segment| segment.to_string())
    }

    /// Renders the path with a custom token renderer.
    pub fn join_with<F>(&self, separator: &str, render: F) -> String
    where
        F: Fn(&Segment) -> String,
    {
        let mut out = String::new();
        for (i, segment) in self.root_first().into_iter().enumerate() {
            if i > 0 && !segment.is_index() {
                out.push_str(separator);
            }
            out.push_str(&render(segment));
        }
        out
    }

    /// Renders the path according to `format`.
    pub fn display_with(&self, format: &PathFormat) -> String {
        match (&format.root_token, self.is_root()) {
            (Some(token), true) => token.clone(),
            _ => self.join(&format.separator),
        }
    }

    /// Renders only the innermost container: the trailing index run plus the
    /// name that precedes it (`users[0].tags[1][2]` gives `tags[1][2]`).
    pub fn last_sub_path(&self) -> String {
        let mut run = Vec::new();
        for segment in self.leaf_first() {
            run.push(segment);
            if !segment.is_index() {
                break;
            }
        }
        run.iter().rev().map(|segment| segment.to_string()).collect()
    }

    fn leaf_first(&self) -> impl Iterator<Item = &Segment> + '_ {
        std::iter::successors(self.head.as_deref(), |node| node.tail.as_deref())
            .map(|node| &node.segment)
    }

    fn root_first(&self) -> Vec<&Segment> {
        let mut segments: Vec<_> = self.leaf_first().collect();
        segments.reverse();
        segments
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join("."))
    }
}

/// Rendering options for paths in messages and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFormat {
    /// Separator placed between name segments.
    pub separator: String,
    /// Token shown for the root path; `None` renders it as an empty string.
    pub root_token: Option<String>,
}

impl PathFormat {
    /// Sets the separator and returns self for chaining.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the root token and returns self for chaining.
    pub fn with_root_token(mut self, token: impl Into<String>) -> Self {
        self.root_token = Some(token.into());
        self
    }
}

impl Default for PathFormat {
    fn default() -> Self {
        Self {
            separator: ".".to_string(),
            root_token: Some("(root)".to_string()),
        }
    }
}
