//! Value types for SQL parameters and entity attributes

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A tagged value held by an attribute bag or bound as a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// String value
    Text(String),
    /// List of values
    List(Vec<Value>),
}

/// The driver bind type chosen for a value at bind time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    Int,
    Bool,
    Null,
    Str,
}

impl BindType {
    /// Infer the bind type for a value. Anything that is not an integer,
    /// boolean or null is bound as a string.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Int(_) => BindType::Int,
            Value::Bool(_) => BindType::Bool,
            Value::Null => BindType::Null,
            _ => BindType::Str,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose emptiness: null, `false`, zero, `""`, `"0"` and the empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty() || s == "0",
            Value::List(items) => items.is_empty(),
        }
    }

    /// True for integers, floats and text that reads as a decimal number.
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Int(_) | Value::Float(_) => true,
            Value::Text(s) => is_numeric_text(s),
            _ => false,
        }
    }

    /// True only for the explicit empty string.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// Get the bind type for this value
    pub fn bind_type(&self) -> BindType {
        BindType::of(self)
    }

    /// Text form used when the value is bound as a string
    pub fn to_bind_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::List(_) => serde_json::to_string(self).unwrap_or_default(),
            other => other.to_string(),
        }
    }

    /// Extract list values if this is a List variant
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

fn is_numeric_text(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return false;
    }
    digits
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && s.parse::<f64>().is_ok()
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => write!(f, "1"),
            Value::Bool(false) => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(_) => write!(f, "{}", serde_json::to_string(self).map_err(|_| fmt::Error)?),
        }
    }
}

/// Conversion out of a [`Value`], used by typed attribute getters
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Text(s) if is_numeric_text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// SQLite has no boolean storage class; 0/1 integers read back as booleans.
impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            Value::Null | Value::List(_) => None,
            other => Some(other.to_string()),
        }
    }
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Int(i64::from(val))
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int(val)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::Int(i64::from(val))
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Text(val)
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::Text(val.clone())
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Text(val.to_string())
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(vals: Vec<T>) -> Self {
        Value::List(vals.into_iter().map(|v| v.into()).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_creation() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("hello"), Value::Text("hello".to_string()));
        assert_eq!(Value::from(()), Value::Null);
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_bind_types() {
        assert_eq!(BindType::of(&Value::Int(1)), BindType::Int);
        assert_eq!(BindType::of(&Value::Bool(false)), BindType::Bool);
        assert_eq!(BindType::of(&Value::Null), BindType::Null);
        assert_eq!(BindType::of(&Value::from("x")), BindType::Str);
        assert_eq!(BindType::of(&Value::Float(1.5)), BindType::Str);
        assert_eq!(BindType::of(&Value::from(vec!["a"])), BindType::Str);
    }

    #[test]
    fn test_emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::Bool(false).is_empty());
        assert!(Value::Int(0).is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::from("0").is_empty());
        assert!(Value::List(vec![]).is_empty());

        assert!(!Value::Int(5).is_empty());
        assert!(!Value::from("abc").is_empty());
        assert!(!Value::Bool(true).is_empty());
    }

    #[test]
    fn test_numeric() {
        assert!(Value::Int(0).is_numeric());
        assert!(Value::Float(0.0).is_numeric());
        assert!(Value::from("0").is_numeric());
        assert!(Value::from(" -12.5e3 ").is_numeric());

        assert!(!Value::from("").is_numeric());
        assert!(!Value::from("abc").is_numeric());
        assert!(!Value::from("inf").is_numeric());
        assert!(!Value::from("NaN").is_numeric());
        assert!(!Value::Null.is_numeric());
    }

    #[test]
    fn test_bind_string() {
        assert_eq!(Value::Float(2.5).to_bind_string(), "2.5");
        assert_eq!(Value::from("a b").to_bind_string(), "a b");
        assert_eq!(Value::from(vec![1, 2]).to_bind_string(), "[1,2]");
    }

    #[test]
    fn test_untagged_serde() {
        let value: Value = serde_json::from_str(r#"[1, "two", null, true, 2.5]"#).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Int(1),
                Value::from("two"),
                Value::Null,
                Value::Bool(true),
                Value::Float(2.5),
            ])
        );
    }

    #[test]
    fn test_from_value() {
        assert_eq!(i64::from_value(&Value::Int(7)), Some(7));
        assert_eq!(i64::from_value(&Value::from("8")), Some(8));
        assert_eq!(bool::from_value(&Value::Int(1)), Some(true));
        assert_eq!(String::from_value(&Value::Int(3)), Some("3".to_string()));
        assert_eq!(String::from_value(&Value::Null), None);
        assert_eq!(f64::from_value(&Value::Int(2)), Some(2.0));
    }
}
