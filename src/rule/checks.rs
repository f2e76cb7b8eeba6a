//! Built-in checks.
//!
//! Each function returns a ready-to-apply [`Rule`] with a default message.
//! Use [`Rule::with_message`] to replace it.
//!
//! # Example
//!
//! ```rust
//! use inquest::{checks, Path};
//!
//! let path = Path::of(["name"]).unwrap();
//! let violation = checks::not_blank::<str>().verify("   ", &path).unwrap();
//! assert_eq!(violation.message, "must not be blank");
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Debug;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::{Params, Rule};

/// Values with a measurable length.
///
/// Strings are measured in Unicode scalar values, collections in items.
pub trait Length {
    /// Returns the length of the value.
    fn length(&self) -> usize;
}

impl Length for str {
    fn length(&self) -> usize {
        self.chars().count()
    }
}

impl Length for String {
    fn length(&self) -> usize {
        self.as_str().length()
    }
}

impl<T> Length for [T] {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T> Length for Vec<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> Length for HashMap<K, V, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V> Length for BTreeMap<K, V> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T, S> Length for HashSet<T, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T> Length for BTreeSet<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> Length for IndexMap<K, V, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

/// Renders a param for a message, without quotes around strings.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn param(params: &Params, name: &str) -> String {
    params.get(name).map(render).unwrap_or_default()
}

/// Stores a bound as a param.
///
/// Numbers, strings and booleans keep their JSON type; anything else (a
/// timestamp, a user type) is kept as its `Debug` text.
fn param_value<T: Debug + ?Sized>(value: &T) -> Value {
    let rendered = format!("{:?}", value);
    match serde_json::from_str::<Value>(&rendered) {
        Ok(Value::Number(n)) if n.to_string() == rendered => Value::Number(n),
        Ok(value @ (Value::String(_) | Value::Bool(_))) => value,
        _ => Value::String(rendered),
    }
}

/// The string must contain at least one non-whitespace character.
pub fn not_blank<T>() -> Rule<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    Rule::from_fn(
        "not_blank",
        Params::none(),
        |value: &T| !value.as_ref().trim().is_empty(),
        |_| "must not be blank".to_string(),
    )
}

/// The value must have at least one character or item.
pub fn not_empty<T>() -> Rule<T>
where
    T: Length + ?Sized + 'static,
{
    Rule::from_fn(
        "not_empty",
        Params::none(),
        |value: &T| value.length() > 0,
        |_| "must not be empty".to_string(),
    )
}

/// The value must have at least `min` characters or items.
pub fn min_len<T>(min: usize) -> Rule<T>
where
    T: Length + ?Sized + 'static,
{
    Rule::from_fn(
        "min_len",
        Params::none().with("min", min),
        move |value: &T| value.length() >= min,
        |ctx| format!("length must be at least {}", param(ctx.params, "min")),
    )
}

/// The value must have at most `max` characters or items.
pub fn max_len<T>(max: usize) -> Rule<T>
where
    T: Length + ?Sized + 'static,
{
    Rule::from_fn(
        "max_len",
        Params::none().with("max", max),
        move |value: &T| value.length() <= max,
        |ctx| format!("length must be at most {}", param(ctx.params, "max")),
    )
}

/// The value must equal `expected`.
pub fn equal_to<T>(expected: T) -> Rule<T>
where
    T: PartialEq + Debug + Send + Sync + 'static,
{
    let params = Params::none().with("expected", param_value(&expected));
    Rule::from_fn(
        "equal_to",
        params,
        move |value: &T| *value == expected,
        |ctx| format!("must be equal to {}", param(ctx.params, "expected")),
    )
}

/// The value must differ from `rejected`.
pub fn not_equal_to<T>(rejected: T) -> Rule<T>
where
    T: PartialEq + Debug + Send + Sync + 'static,
{
    let params = Params::none().with("rejected", param_value(&rejected));
    Rule::from_fn(
        "not_equal_to",
        params,
        move |value: &T| *value != rejected,
        |ctx| format!("must not be equal to {}", param(ctx.params, "rejected")),
    )
}

/// The value must be greater than or equal to `min`.
pub fn at_least<T>(min: T) -> Rule<T>
where
    T: PartialOrd + Debug + Send + Sync + 'static,
{
    let params = Params::none().with("min", param_value(&min));
    Rule::from_fn(
        "at_least",
        params,
        move |value: &T| *value >= min,
        |ctx| format!("must not be less than {}", param(ctx.params, "min")),
    )
}

/// The value must be less than or equal to `max`.
pub fn at_most<T>(max: T) -> Rule<T>
where
    T: PartialOrd + Debug + Send + Sync + 'static,
{
    let params = Params::none().with("max", param_value(&max));
    Rule::from_fn(
        "at_most",
        params,
        move |value: &T| *value <= max,
        |ctx| format!("must not be greater than {}", param(ctx.params, "max")),
    )
}

/// The value must be strictly less than `max`.
pub fn less_than<T>(max: T) -> Rule<T>
where
    T: PartialOrd + Debug + Send + Sync + 'static,
{
    let params = Params::none().with("max", param_value(&max));
    Rule::from_fn(
        "less_than",
        params,
        move |value: &T| *value < max,
        |ctx| format!("must be less than {}", param(ctx.params, "max")),
    )
}

/// The value must be strictly greater than `min`.
pub fn greater_than<T>(min: T) -> Rule<T>
where
    T: PartialOrd + Debug + Send + Sync + 'static,
{
    let params = Params::none().with("min", param_value(&min));
    Rule::from_fn(
        "greater_than",
        params,
        move |value: &T| *value > min,
        |ctx| format!("must be greater than {}", param(ctx.params, "min")),
    )
}

/// The value must lie in `min..=max`.
pub fn in_range<T>(min: T, max: T) -> Rule<T>
where
    T: PartialOrd + Debug + Send + Sync + 'static,
{
    let params = Params::none()
        .with("min", param_value(&min))
        .with("max", param_value(&max));
    Rule::from_fn(
        "in_range",
        params,
        move |value: &T| *value >= min && *value <= max,
        |ctx| {
            format!(
                "must be between {} and {}",
                param(ctx.params, "min"),
                param(ctx.params, "max")
            )
        },
    )
}

/// The value must be greater than zero.
pub fn positive<T>() -> Rule<T>
where
    T: PartialOrd + Default + Send + Sync + 'static,
{
    Rule::from_fn(
        "positive",
        Params::none(),
        |value: &T| *value > T::default(),
        |_| "must be positive".to_string(),
    )
}

/// The value must be zero or greater.
pub fn non_negative<T>() -> Rule<T>
where
    T: PartialOrd + Default + Send + Sync + 'static,
{
    Rule::from_fn(
        "non_negative",
        Params::none(),
        |value: &T| *value >= T::default(),
        |_| "must not be negative".to_string(),
    )
}

/// The value must be less than zero.
pub fn negative<T>() -> Rule<T>
where
    T: PartialOrd + Default + Send + Sync + 'static,
{
    Rule::from_fn(
        "negative",
        Params::none(),
        |value: &T| *value < T::default(),
        |_| "must be negative".to_string(),
    )
}

/// The string must match the regex `pattern`.
///
/// Returns an error if the pattern is invalid.
///
/// # Example
///
/// ```rust
/// use inquest::{checks, Path};
///
/// let digits = checks::matches::<str>(r"^\d+$").unwrap();
/// let path = Path::of(["zip"]).unwrap();
///
/// assert!(digits.verify("12345", &path).is_none());
/// assert!(digits.verify("12a45", &path).is_some());
/// ```
pub fn matches<T>(pattern: &str) -> Result<Rule<T>, regex::Error>
where
    T: AsRef<str> + ?Sized + 'static,
{
    let regex = Regex::new(pattern)?;
    Ok(Rule::from_fn(
        "matches",
        Params::none().with("pattern", pattern),
        move |value: &T| regex.is_match(value.as_ref()),
        |ctx| format!("must match pattern {}", param(ctx.params, "pattern")),
    ))
}

/// The value must be one of `allowed`.
pub fn one_of<T>(allowed: Vec<T>) -> Rule<T>
where
    T: PartialEq + Debug + Send + Sync + 'static,
{
    let listed: Vec<Value> = allowed.iter().map(param_value).collect();
    Rule::from_fn(
        "one_of",
        Params::none().with("allowed", listed),
        move |value: &T| allowed.contains(value),
        |ctx| format!("must be one of {}", param(ctx.params, "allowed")),
    )
}
