//! The runtime value model.
//!
//! [`Value`] is richer than JSON: besides the JSON-native shapes it carries
//! constructed enum members and nested [`Config`] records. Conversion down to
//! `serde_json::Value` is lossy only in type, never in data; the type-directed
//! decode path in [`crate::check`] reconstructs the richer shapes.

use std::fmt;

use indexmap::IndexMap;

use crate::config::Config;
use crate::types::{EnumType, FieldType, MapKeyKind};

/// A runtime configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Insertion-ordered mapping. Keys carry their runtime kind and are
    /// never coerced.
    Map(IndexMap<MapKey, Value>),
    /// An already-constructed member of a declared enumeration.
    Enum(EnumValue),
    /// A nested record instance.
    Record(Config),
}

impl Value {
    /// Short name of this value's runtime kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Enum(_) => "enum",
            Value::Record(_) => "record",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Config> {
        match self {
            Value::Record(cfg) => Some(cfg),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Shallow type inference for values admitted without a declaration
    /// (ad hoc fields from `update(.., allow_new)` and merges). Containers
    /// infer as unchecked rather than guessing an element type.
    pub fn infer_type(&self) -> FieldType {
        match self {
            Value::Null => FieldType::Null,
            Value::Bool(_) => FieldType::Bool,
            Value::Int(_) => FieldType::Int,
            Value::Float(_) => FieldType::Float,
            Value::Str(_) => FieldType::Str,
            Value::Enum(e) => FieldType::Enum(e.ty),
            Value::Record(cfg) => FieldType::Record(cfg.schema().clone()),
            Value::List(_) | Value::Map(_) => FieldType::Any,
        }
    }

    /// Convert down to a plain JSON value. Enum members collapse to their
    /// label, records to objects, map keys to their string form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.to_string(), value.to_json());
                }
                serde_json::Value::Object(out)
            }
            Value::Enum(e) => serde_json::Value::String(e.member.to_string()),
            Value::Record(cfg) => crate::serialize::to_json_value(cfg),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl From<Config> for Value {
    fn from(v: Config) -> Self {
        Value::Record(v)
    }
}

/// A mapping key with its exact runtime kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl MapKey {
    pub fn kind(&self) -> MapKeyKind {
        match self {
            MapKey::Str(_) => MapKeyKind::Str,
            MapKey::Int(_) => MapKeyKind::Int,
            MapKey::Bool(_) => MapKeyKind::Bool,
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Str(s) => write!(f, "{s}"),
            MapKey::Int(i) => write!(f, "{i}"),
            MapKey::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        MapKey::Str(v.to_string())
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        MapKey::Int(v)
    }
}

/// A constructed member of a declared enumeration. Only values of this shape
/// pass the checker for enum-typed fields; a bare label string does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub ty: &'static EnumType,
    pub member: &'static str,
}
