//! Script-level values carried by promises and task results.
//!
//! The simulator does not model the object model of a real engine; it only
//! needs enough structure to show what promise combinators produce, so values
//! are plain data: primitives, lists and string-keyed records.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A script value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let list = Value::List(vec![Value::from("a"), Value::Smi(1)]);
/// assert_eq!(list.to_string(), "[ 'a', 1 ]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// undefined
    Undefined,
    /// Small integer
    Smi(i32),
    /// String value
    String(String),
    /// Array of values
    List(Vec<Value>),
    /// Plain object with string keys, kept in key order
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Builds an object value from key/value pairs.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let obj = Value::object([("status", Value::from("fulfilled"))]);
    /// assert_eq!(obj.get("status"), Some(&Value::from("fulfilled")));
    /// ```
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Looks up a property on an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n)
    }
}

/// Console-style rendering: top-level strings print raw, strings nested in
/// lists or objects are quoted.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Smi(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) if items.is_empty() => write!(f, "[]"),
            Value::List(items) => {
                write!(f, "[ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, " ]")
            }
            Value::Object(map) if map.is_empty() => write!(f, "{{}}"),
            Value::Object(map) => {
                write!(f, "{{ ")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    value.fmt_nested(f)?;
                }
                write!(f, " }}")
            }
        }
    }
}
