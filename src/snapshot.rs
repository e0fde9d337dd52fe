//! Positional access into the command outputs captured for one check.
//!
//! A [Snapshot] is the ordered list of payloads, one per command issued by a
//! check, so the i-th payload answers the i-th command. Lookups never fail:
//! anything that isn't there comes back as [Lookup::Missing], which stays
//! distinct from a value that is present but null or empty.

use serde_json::{Map, Value};

/// The ordered payloads collected for a single check invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    payloads: Vec<Value>,
}

impl Snapshot {
    pub fn new(payloads: Vec<Value>) -> Self {
        Snapshot { payloads }
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Returns the payload of the `index`-th command
    pub fn payload(&self, index: usize) -> Lookup<'_> {
        self.payloads.get(index).into()
    }

    /// Walks `path` down from the `index`-th payload. Path elements index
    /// into objects by key, and into arrays when they parse as a position.
    pub fn get(&self, index: usize, path: &[&str]) -> Lookup<'_> {
        path.iter().fold(self.payload(index), |acc, key| acc.get(key))
    }
}

impl From<Vec<Value>> for Snapshot {
    fn from(payloads: Vec<Value>) -> Self {
        Snapshot::new(payloads)
    }
}

/// Result of looking something up in a payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The key (or any key on the way there) isn't present
    Missing,
    /// The key is present, with whatever value it holds, null included
    Found(&'a Value),
}

impl<'a> Lookup<'a> {
    /// Descends one level. Looking into a scalar, or into something missing,
    /// gives [Lookup::Missing].
    pub fn get(self, key: &str) -> Lookup<'a> {
        match self {
            Lookup::Found(Value::Object(map)) => map.get(key).into(),
            Lookup::Found(Value::Array(items)) => match key.parse::<usize>() {
                Ok(idx) => items.get(idx).into(),
                Err(_) => Lookup::Missing,
            },
            _ => Lookup::Missing,
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }

    #[inline]
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Missing => None,
        }
    }

    pub fn as_object(self) -> Option<&'a Map<String, Value>> {
        self.value().and_then(Value::as_object)
    }

    pub fn as_array(self) -> Option<&'a Vec<Value>> {
        self.value().and_then(Value::as_array)
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }

    pub fn as_bool(self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }

    pub fn as_u64(self) -> Option<u64> {
        self.value().and_then(Value::as_u64)
    }

    /// Present and carrying something: not null, not false, not zero, and
    /// not an empty string, array or object.
    pub fn is_populated(&self) -> bool {
        match self {
            Lookup::Missing => false,
            Lookup::Found(v) => match v {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().map(|x| x != 0.0).unwrap_or(true),
                Value::String(s) => !s.is_empty(),
                Value::Array(a) => !a.is_empty(),
                Value::Object(o) => !o.is_empty(),
            },
        }
    }
}

impl<'a> From<Option<&'a Value>> for Lookup<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::Missing,
        }
    }
}

impl<'a> From<&'a Value> for Lookup<'a> {
    fn from(value: &'a Value) -> Self {
        Lookup::Found(value)
    }
}
