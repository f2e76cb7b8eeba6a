//! Immutable check parameters.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::Value;

/// The parameters a check was built with.
///
/// Parameterless checks share [`Params::None`], so "no parameters" always
/// compares equal. Named parameters keep their insertion order.
///
/// # Example
///
/// ```rust
/// use inquest::Params;
/// use serde_json::json;
///
/// let params = Params::none().with("min", 1).with("max", 10);
/// assert_eq!(params.get("max"), Some(&json!(10)));
/// assert_eq!(params.to_string(), "{min: 1, max: 10}");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// The check takes no parameters.
    #[default]
    None,
    /// Named parameter values.
    Values(IndexMap<String, Value>),
}

impl Params {
    /// Returns the shared "no parameters" value.
    pub fn none() -> Self {
        Params::None
    }

    /// Adds a named parameter and returns self for chaining.
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut values = match self {
            Params::None => IndexMap::new(),
            Params::Values(values) => values,
        };
        values.insert(name.into(), value.into());
        Params::Values(values)
    }

    /// Returns the named parameter, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Params::None => None,
            Params::Values(values) => values.get(name),
        }
    }

    /// Returns true if no parameters are set.
    pub fn is_none(&self) -> bool {
        match self {
            Params::None => true,
            Params::Values(values) => values.is_empty(),
        }
    }

    /// Returns an iterator over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let values = match self {
            Params::None => None,
            Params::Values(values) => Some(values),
        };
        values
            .into_iter()
            .flat_map(|values| values.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return Ok(());
        }
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_none_is_stable() {
        assert_eq!(Params::none(), Params::default());
        assert!(Params::none().is_none());
        assert_eq!(Params::none().get("anything"), None);
        assert_eq!(Params::none().to_string(), "");
    }

    #[test]
    fn test_with_keeps_insertion_order() {
        let params = Params::none().with("b", 2).with("a", "x");
        let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(params.get("a"), Some(&json!("x")));
        assert!(!params.is_none());
    }

    #[test]
    fn test_with_overwrites() {
        let params = Params::none().with("max", 1).with("max", 5);
        assert_eq!(params.get("max"), Some(&json!(5)));
        assert_eq!(params.iter().count(), 1);
    }
}
