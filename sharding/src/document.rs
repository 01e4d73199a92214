//! Semi-structured documents and their structural hash.
//!
//! A [Value] is routed by hashing some of its top-level attributes with [Value::hash]. The hash
//! covers the full content of a value and is stable across processes and platforms:
//!
//! - Numbers are normalized, so `Int(1)` and `Double(1.0)` (and `-0.0` and `0.0`) hash the same.
//! - Arrays chain the running hash through each element, so element order matters.
//! - Objects combine member hashes with XOR, so member order does not matter.

use crate::fnv::Fnv;
use std::hash::Hasher;

const NULL: u8 = 0x00;
const BOOL: u8 = 0x01;
const NUMBER: u8 = 0x02;
const STRING: u8 = 0x03;
const ARRAY: u8 = 0x04;
const OBJECT: u8 = 0x05;

/// A node in a semi-structured document.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    /// Attributes in insertion order.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Create a [Value::String].
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create a [Value::Object] from `(name, value)` pairs.
    pub fn object<K: Into<String>>(members: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Object(
            members
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Returns the top-level attribute `name` if this is an object that contains it.
    ///
    /// If an attribute appears more than once, the first occurrence wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Object(members) => members
                .iter()
                .find(|(member, _)| member == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Returns the string if this is a [Value::String].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Hash the value, continuing from `seed`.
    ///
    /// The result depends on `seed`, so folding several values through this function in sequence
    /// is order-sensitive.
    pub fn hash(&self, seed: u64) -> u64 {
        let mut hasher = Fnv::with_seed(seed);
        match self {
            Self::Null => hasher.write_u8(NULL),
            Self::Bool(value) => {
                hasher.write_u8(BOOL);
                hasher.write_u8(*value as u8);
            }
            Self::Int(value) => Self::write_number(&mut hasher, *value as f64),
            Self::Double(value) => Self::write_number(&mut hasher, *value),
            Self::String(value) => Self::write_string(&mut hasher, value),
            Self::Array(items) => {
                hasher.write_u8(ARRAY);
                hasher.write_be_u64(items.len() as u64);
                return items
                    .iter()
                    .fold(hasher.finish(), |running, item| item.hash(running));
            }
            Self::Object(members) => {
                hasher.write_u8(OBJECT);
                hasher.write_be_u64(members.len() as u64);
                let base = hasher.finish();
                return members.iter().fold(base, |acc, (name, value)| {
                    let mut key = Fnv::with_seed(base);
                    Self::write_string(&mut key, name);
                    acc ^ value.hash(key.finish())
                });
            }
        }
        hasher.finish()
    }

    fn write_number(hasher: &mut Fnv, value: f64) {
        // Collapse -0.0 into 0.0
        let value = if value == 0.0 { 0.0 } else { value };
        hasher.write_u8(NUMBER);
        hasher.write_be_u64(value.to_bits());
    }

    fn write_string(hasher: &mut Fnv, value: &str) {
        hasher.write_u8(STRING);
        hasher.write_be_u64(value.len() as u64);
        hasher.write(value.as_bytes());
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Int(value),
                None => Self::Double(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(members) => Self::Object(
                members
                    .into_iter()
                    .map(|(name, value)| (name, Self::from(value)))
                    .collect(),
            ),
        }
    }
}
