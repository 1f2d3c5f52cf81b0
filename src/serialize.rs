//! JSON serialization for config instances.
//!
//! Serialization walks the instance in declaration order and emits a JSON
//! object per record; MISSING slots are omitted entirely, so a round trip
//! through JSON preserves the tri-state distinction between "unset" and
//! "set to null". Deserialization is strict (unknown keys and type
//! mismatches fail), sparse (a partial document only touches the fields it
//! names), and atomic: on any failure the target instance is left exactly
//! as it was.

use std::fmt;

use serde::ser::{Serialize, Serializer};

use crate::check;
use crate::config::Config;
use crate::error::{CheckError, CoqpitError, ErrorKind, Segment};

/// Render an instance as a JSON object, field by field in declaration
/// order. Enum members become their labels, nested records become nested
/// objects, mapping keys are stringified.
pub fn to_json_value(config: &Config) -> serde_json::Value {
    let mut object = serde_json::Map::with_capacity(config.len());
    for (name, value) in config.iter() {
        if let Some(value) = value {
            object.insert(name.to_string(), value.to_json());
        }
    }
    serde_json::Value::Object(object)
}

/// Apply a JSON document to an existing instance. Fields the document does
/// not name keep their current values.
pub fn deserialize(config: &mut Config, document: &serde_json::Value) -> Result<(), CoqpitError> {
    let object = document.as_object().ok_or_else(|| {
        CheckError::new(
            ErrorKind::TypeMismatch,
            format!("expected a JSON object, got {}", json_kind(document)),
        )
    })?;

    // Stage every assignment on a copy and commit in one move at the end,
    // so a failure halfway through cannot leave a half-updated instance.
    let mut staged = config.clone();
    for (key, item) in object {
        let ty = match staged.descriptor(key) {
            Some(desc) => desc.ty.clone(),
            None => return Err(CoqpitError::UnknownField(key.clone())),
        };
        let decoded =
            check::decode(item, &ty).map_err(|e| e.nested(Segment::Field(key.clone())))?;
        staged.set(key, decoded)?;
    }
    staged.check_values()?;
    *config = staged;
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Config {
    /// Compact JSON text for this instance.
    pub fn to_json(&self) -> Result<String, CoqpitError> {
        Ok(serde_json::to_string(&to_json_value(self))?)
    }

    /// Indented JSON text, as written to config files.
    pub fn to_json_pretty(&self) -> Result<String, CoqpitError> {
        Ok(serde_json::to_string_pretty(&to_json_value(self))?)
    }

    /// Parse JSON text and apply it to this instance. Strict and atomic,
    /// see [`deserialize`].
    pub fn from_json(&mut self, text: &str) -> Result<(), CoqpitError> {
        let document: serde_json::Value = serde_json::from_str(text)?;
        deserialize(self, &document)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json_value(self).serialize(serializer)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(&to_json_value(self)).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
