//! The loosely-typed notation value.
//!
//! `Value` is the input type of the notation converter: an arbitrary nested
//! structure of maps, sequences, and scalars. Maps are backed by `IndexMap`
//! because the literal's own iteration order determines output markup order,
//! a hard requirement of the conversion grammar.
//!
//! `Value` distinguishes [`Null`](Value::Null) (an intentional "no value")
//! from [`Absent`](Value::Absent) ("no value was ever provided"). The
//! converter tolerates the former and rejects the latter, since an absent
//! value where an attribute or text value is expected usually means an
//! upstream lookup produced nothing.

use indexmap::IndexMap;

/// A loosely-typed nested value accepted by the notation converter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value was provided at all. Invalid wherever a concrete attribute
    /// or text value is expected.
    Absent,
    /// An intentional null. Subject to the document's null policies.
    Null,
    /// A boolean scalar, stringified as `true` / `false`.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered sequence of values.
    Sequence(Vec<Value>),
    /// An ordered map of keys to values.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Builds a map value from an ordered list of entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlforge::Value;
    ///
    /// let v = Value::map([("@id", Value::from("a")), ("name", Value::from("b"))]);
    /// assert!(matches!(v, Value::Map(_)));
    /// ```
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a sequence value from an ordered list of items.
    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Returns the scalar rendered as a string, or `None` for null, absent,
    /// and container values.
    #[must_use]
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Returns a short noun describing the value's kind, for error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent value",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    /// `None` maps to [`Value::Null`], not [`Value::Absent`]: an explicit
    /// `Option` in hand is an intentional "no value".
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    /// Converts a JSON value, preserving object key order (`serde_json` is
    /// built with `preserve_order`).
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::String(n.to_string())
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
