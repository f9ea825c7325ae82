//! The tagged value model.
//!
//! Every input, literal argument and result is a [`Value`]. The kind of a
//! value never changes once built; numeric promotion only happens inside the
//! comparison and arithmetic helpers in [`crate::numeric`].

use crate::cancel::Cancellation;
use crate::error::Error;
use crate::stringify;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{btree_map, BTreeMap, HashMap};
use std::fmt;
use std::iter::Enumerate;
use std::slice;

/// The tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Invalid,
    Uint,
    Int,
    Float,
    String,
    Bool,
    Array,
    Map,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Invalid => "invalid",
            Kind::Uint => "uint",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Array => "array",
            Kind::Map => "map",
        };
        f.write_str(name)
    }
}

/// A dynamically typed value.
///
/// `Invalid` doubles as "nil": it is what a failed conversion produces and
/// what `when`/`select` return when nothing matched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Invalid,
    Uint(u64),
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Invalid => Kind::Invalid,
            Value::Uint(_) => Kind::Uint,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Bool(_) => Kind::Bool,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Invalid)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Uint(_) | Value::Int(_) | Value::Float(_))
    }

    /// Wraps the text form of any `Display` type, the way text-marshaling
    /// host types are carried.
    pub fn from_display<T: fmt::Display + ?Sized>(raw: &T) -> Value {
        Value::String(raw.to_string())
    }

    /// Converts any serializable type through its JSON form.
    ///
    /// Types serde cannot represent as JSON become `Invalid`.
    pub fn from_serialize<T: Serialize + ?Sized>(raw: &T) -> Value {
        serde_json::to_value(raw)
            .map(Value::from)
            .unwrap_or(Value::Invalid)
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Invalid => Json::Null,
            Value::Uint(n) => Json::from(*n),
            Value::Int(n) => Json::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Bool(b) => Json::Bool(*b),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    // -------------------------------------------------------------- Projections

    pub fn to_float(&self) -> f64 {
        match self {
            Value::Uint(n) => *n as f64,
            Value::Int(n) => *n as f64,
            Value::Float(n) => *n,
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Invalid | Value::Array(_) | Value::Map(_) => 0.0,
        }
    }

    pub fn to_int(&self) -> i64 {
        match self {
            Value::Uint(n) => *n as i64,
            Value::Int(n) => *n,
            Value::Float(n) => *n as i64,
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                    .unwrap_or(0)
            }
            Value::Bool(b) => i64::from(*b),
            Value::Invalid | Value::Array(_) | Value::Map(_) => 0,
        }
    }

    pub fn to_uint(&self) -> u64 {
        match self {
            Value::Uint(n) => *n,
            Value::Int(n) => *n as u64,
            Value::Float(n) => *n as u64,
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as u64))
                    .unwrap_or(0)
            }
            Value::Bool(b) => u64::from(*b),
            Value::Invalid | Value::Array(_) | Value::Map(_) => 0,
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Uint(n) => *n != 0,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::String(s) => s.trim().parse().unwrap_or(false),
            Value::Invalid | Value::Array(_) | Value::Map(_) => false,
        }
    }

    /// Structural length: bytes of a string, items of an array, keys of a map.
    pub fn len(&self) -> usize {
        match self {
            Value::String(s) => s.len(),
            Value::Array(items) => items.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates an `Array` or `Map` as `(key, value)` entities.
    ///
    /// Returns `None` for every other kind. The iterator checks `cancel`
    /// before each item and yields `Error::Cancelled` once it fires.
    pub fn entries(&self, cancel: &Cancellation) -> Option<Entries<'_>> {
        let source = match self {
            Value::Array(items) => Source::Array(items.iter().enumerate()),
            Value::Map(map) => Source::Map(map.iter()),
            _ => return None,
        };
        Some(Entries {
            source,
            cancel: cancel.clone(),
            done: false,
        })
    }
}

/// An item produced by collection iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub key: Value,
    pub value: Value,
}

enum Source<'a> {
    Array(Enumerate<slice::Iter<'a, Value>>),
    Map(btree_map::Iter<'a, String, Value>),
}

/// Cancellable iteration over an array or map.
///
/// The iterator only borrows the collection, so whatever exit path the
/// consumer takes, dropping it releases everything it held.
pub struct Entries<'a> {
    source: Source<'a>,
    cancel: Cancellation,
    done: bool,
}

impl Iterator for Entries<'_> {
    type Item = Result<Entity, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.done = true;
            return Some(Err(Error::Cancelled));
        }
        let entity = match &mut self.source {
            Source::Array(iter) => iter.next().map(|(i, v)| Entity {
                key: Value::Int(i as i64),
                value: v.clone(),
            }),
            Source::Map(iter) => iter.next().map(|(k, v)| Entity {
                key: Value::String(k.clone()),
                value: v.clone(),
            }),
        };
        if entity.is_none() {
            self.done = true;
        }
        entity.map(Ok)
    }
}

/// The `ToString` projection: strings unquoted, containers in canonical form,
/// `Invalid` as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Invalid => Ok(()),
            Value::Uint(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => f.write_str(&stringify::float(*n)),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Array(_) | Value::Map(_) => f.write_str(&stringify::value(self)),
        }
    }
}

// ------------------------------------------------------------------ ValueOf

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(n as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Uint(n as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Invalid)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Value::Invalid,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    n.as_f64().map(Value::Float).unwrap_or(Value::Invalid)
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from(v.clone())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_of_host_types() {
        assert_eq!(Value::from(-3i8), Value::Int(-3));
        assert_eq!(Value::from(7u16), Value::Uint(7));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
        assert_eq!(Value::from("x"), Value::String("x".into()));
        assert_eq!(Value::from(vec![1i32, 2]), Value::Array(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(Value::from(None::<i32>), Value::Invalid);
        assert_eq!(Value::from_display(&std::net::Ipv4Addr::LOCALHOST), Value::from("127.0.0.1"));
    }

    #[test]
    fn value_of_json() {
        let v = Value::from(json!({"a": [1, 2.5, "s", true, null], "b": 18446744073709551615u64}));
        let Value::Map(map) = v else { panic!("expected map") };
        assert_eq!(
            map["a"],
            Value::Array(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("s"),
                Value::Bool(true),
                Value::Invalid,
            ])
        );
        assert_eq!(map["b"], Value::Uint(u64::MAX));
    }

    #[test]
    fn projections() {
        assert_eq!(Value::from("12").to_int(), 12);
        assert_eq!(Value::from("2.9").to_int(), 2);
        assert_eq!(Value::Float(-1.5).to_uint(), 0);
        assert_eq!(Value::Bool(true).to_float(), 1.0);
        assert!(Value::Float(0.1).to_bool());
        assert!(!Value::Uint(0).to_bool());
        assert!(Value::from("true").to_bool());
        assert!(!Value::from("yes").to_bool());
        assert!(!Value::Array(vec![Value::Int(1)]).to_bool());
        assert_eq!(Value::from("héllo").len(), 6);
        assert_eq!(Value::Int(5).len(), 0);
        assert_eq!(Value::Float(2.0).to_string(), "2");
        assert_eq!(Value::Invalid.to_string(), "");
    }

    #[test]
    fn entries_of_array_and_map() {
        let cancel = Cancellation::new();
        let arr = Value::from(vec!["a", "b"]);
        let keys: Vec<Value> = arr
            .entries(&cancel)
            .unwrap()
            .map(|e| e.unwrap().key)
            .collect();
        assert_eq!(keys, vec![Value::Int(0), Value::Int(1)]);

        let map = Value::from(json!({"y": 2, "x": 1}));
        let keys: Vec<Value> = map
            .entries(&cancel)
            .unwrap()
            .map(|e| e.unwrap().key)
            .collect();
        assert_eq!(keys, vec![Value::from("x"), Value::from("y")]);

        assert!(Value::Int(1).entries(&cancel).is_none());
    }

    #[test]
    fn entries_stop_after_cancel() {
        let cancel = Cancellation::new();
        let arr = Value::from(vec![1, 2, 3]);
        let mut entries = arr.entries(&cancel).unwrap();
        assert!(entries.next().unwrap().is_ok());
        cancel.cancel();
        assert_eq!(entries.next(), Some(Err(Error::Cancelled)));
        assert!(entries.next().is_none());
    }
}
