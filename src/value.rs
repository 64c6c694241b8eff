use std::{borrow::Cow, collections::HashMap};

/// A JSON-like value traversed and written by compiled queries.
///
/// Integers and floats are kept apart; comparisons and equality inside
/// filters treat both as one "number" kind.
///
/// # Examples
///
/// ```
/// use pathquery::Value;
/// use std::collections::HashMap;
///
/// let mut obj = HashMap::new();
/// obj.insert("age".to_string(), Value::Integer(23));
/// let person = Value::Object(obj);
///
/// assert_eq!(person.get("age"), Some(&Value::Integer(23)));
/// assert_eq!(person.get("name"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// JSON null
    #[default]
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Ordered list of values
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),
}

impl Value {
    /// Truthiness as used by filters.
    ///
    /// `null`, `false`, `0`, `NaN`, `""` and `[]` are falsy.
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0 && !n.is_nan(),
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(_) => true,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements of an array. Only arrays are enumerated by wildcards.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Look up a single accessor key.
    ///
    /// Objects resolve members and arrays resolve numeric indices.
    /// Everything else is missing.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            Value::Array(arr) => match key.parse::<usize>() {
                Ok(index) => arr.get(index),
                Err(_) => None,
            },
            _ => None,
        }
    }

    /// Like [`Value::get`], but also answers the computed `length` of arrays
    /// and strings, which has no slot of its own.
    pub fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        if let Some(found) = self.get(key) {
            return Some(Cow::Borrowed(found));
        }
        if key != "length" {
            return None;
        }
        match self {
            Value::Array(arr) => Some(Cow::Owned(Value::Integer(arr.len() as i64))),
            Value::String(s) => Some(Cow::Owned(Value::Integer(s.chars().count() as i64))),
            _ => None,
        }
    }

    /// Mutable member or element access; never creates anything.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Object(map) => map.get_mut(key),
            Value::Array(arr) => match key.parse::<usize>() {
                Ok(index) => arr.get_mut(index),
                Err(_) => None,
            },
            _ => None,
        }
    }

    /// Get as string (concatenation)
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            other => serde_json::Value::from(other.clone()).to_string(),
        }
    }
}

/// Returns a human-readable type name for a Value
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(Into::into).collect()),
            Value::Object(obj) => {
                serde_json::Value::Object(obj.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
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

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

#[test]
fn test_truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Integer(0).is_truthy());
    assert!(Value::Integer(-3).is_truthy());
    assert!(!Value::Float(f64::NAN).is_truthy());
    assert!(!Value::Array(vec![]).is_truthy());
    assert!(Value::Object(HashMap::new()).is_truthy());
}

#[test]
fn test_length_lookup() {
    let arr = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
    assert_eq!(arr.lookup("length").as_deref(), Some(&Value::Integer(2)));
    assert!(matches!(arr.lookup("1"), Some(Cow::Borrowed(Value::Integer(2)))));
    assert_eq!(Value::from("héllo").lookup("length").as_deref(), Some(&Value::Integer(5)));
    assert_eq!(Value::Null.lookup("length"), None);
}
