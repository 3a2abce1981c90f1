//! JavaScript value representation.
//!
//! This module provides the `Value` enum carried by promises and deferreds,
//! and the [`Thenable`] capability that lets a value stand for a result that
//! has not arrived yet.

use crate::JsError;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Outcome of a settled thenable: `Ok` carries the fulfillment value, `Err`
/// the rejection reason.
pub type Settlement = Result<Value, Value>;

/// Something that settles exactly once and can be asked to report the
/// outcome.
///
/// This is the capability `is_promise` checks for. Promises and deferreds
/// implement it; so can any foreign future-like type that wants to be
/// adopted when returned from a handler.
pub trait Thenable {
    /// Registers `callback` to run once, after this thenable settles.
    fn on_settled(&self, callback: Box<dyn FnOnce(Settlement)>);

    /// Address of the state that settles this thenable.
    ///
    /// Two handles sharing one underlying promise report the same address.
    /// Used to refuse resolving a promise with itself.
    fn identity(&self) -> *const () {
        (self as *const Self).cast()
    }
}

/// Represents any JavaScript value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Smi(42);
/// let float = Value::Double(3.14);
///
/// assert!(!undefined.is_truthy());
/// assert!(number.is_truthy());
/// assert_eq!(float.type_of(), "number");
/// ```
#[derive(Clone)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// Small integer
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// JavaScript string value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Plain object with ordered keys
    Object(BTreeMap<String, Value>),
    /// An `Error` instance, typically a rejection reason
    Error(JsError),
    /// A pending or settled future-like value
    Thenable(Rc<dyn Thenable>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Smi(n) => f.debug_tuple("Smi").field(n).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(map) => f.debug_tuple("Object").field(map).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Value::Thenable(_) => write!(f, "Thenable(...)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Smi(a), Value::Smi(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Thenable(a), Value::Thenable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Returns whether this value is truthy in JavaScript semantics.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::Null.is_truthy());
    /// assert!(!Value::Smi(0).is_truthy());
    /// assert!(!Value::String(String::new()).is_truthy());
    /// assert!(Value::Array(vec![]).is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Smi(n) => *n != 0,
            Value::Double(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Error(_) | Value::Thenable(_) => true,
        }
    }

    /// Returns the JavaScript `typeof` result for this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Smi(_) | Value::Double(_) => "number",
            Value::String(_) => "string",
            // null is "object" too
            Value::Null
            | Value::Array(_)
            | Value::Object(_)
            | Value::Error(_)
            | Value::Thenable(_) => "object",
        }
    }

    /// Returns the error carried by an `Error` value.
    pub fn as_error(&self) -> Option<&JsError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the string slice carried by a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a parsed JSON document into a value.
    ///
    /// Integral numbers that fit in 32 bits become `Smi`, every other number
    /// becomes `Double`.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let json = serde_json::json!({ "id": 7, "ratio": 0.5, "tags": ["a"] });
    /// let value = Value::from_json(json);
    /// let Value::Object(map) = value else { panic!("expected object") };
    /// assert_eq!(map["id"], Value::Smi(7));
    /// assert_eq!(map["ratio"], Value::Double(0.5));
    /// ```
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                Some(smi) => Value::Smi(smi),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
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

impl From<JsError> for Value {
    fn from(e: JsError) -> Self {
        Value::Error(e)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// JavaScript `String()` conversion.
///
/// ```
/// use core_types::{JsError, Value};
///
/// assert_eq!(Value::Undefined.to_string(), "undefined");
/// assert_eq!(Value::Double(2.0).to_string(), "2");
/// assert_eq!(Value::Array(vec![Value::Smi(1), Value::Smi(2)]).to_string(), "1,2");
/// assert_eq!(Value::from(JsError::error("bad")).to_string(), "Error: bad");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    // null and undefined print as empty slots
                    if !matches!(item, Value::Null | Value::Undefined) {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Error(e) => write!(f, "{}", e),
            Value::Thenable(_) => write!(f, "[object Promise]"),
        }
    }
}
