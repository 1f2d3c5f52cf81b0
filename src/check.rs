//! The type-directed recursive checker and converter.
//!
//! Two entry points share one traversal shape:
//!
//! - [`check`] validates an already-constructed runtime [`Value`] against a
//!   declared [`FieldType`], with no coercion at all. Bool and int exclude
//!   each other in both directions, and an enum field only accepts a
//!   constructed member, never its bare label.
//! - [`decode`] converts a raw JSON value (which only has JSON's native
//!   shapes) into the richer declared type: enum members from their labels,
//!   tuples from arrays, nested records from objects, mapping keys parsed
//!   back through the declared key kind.
//!
//! Both report the first failure they hit, with a [`Path`](crate::error::Path)
//! into arbitrarily deep nesting. Record and structured-mapping fields, list
//! elements, and mapping entries all short-circuit at the first failing
//! child; union alternatives recover locally by trying the next alternative
//! in declaration order.

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::{CheckError, ErrorKind, Segment};
use crate::types::{FieldType, MapKeyKind, StructuredSchema};
use crate::value::{MapKey, Value};

fn mismatch(expected: &FieldType, actual: &Value) -> CheckError {
    CheckError::new(
        ErrorKind::TypeMismatch,
        format!("expected {expected}, got {}", actual.kind_name()),
    )
}

/// Validate `value` against `ty`, returning the (converted) value or the
/// first failure. Collections are rebuilt from their checked elements.
pub fn check(value: &Value, ty: &FieldType) -> Result<Value, CheckError> {
    match ty {
        FieldType::Any => Ok(value.clone()),
        FieldType::Null => match value {
            Value::Null => Ok(Value::Null),
            other => Err(mismatch(ty, other)),
        },
        // The int/bool exclusion is bidirectional: a bool is not an int and
        // an int is not a bool, whatever the host language thinks.
        FieldType::Int => match value {
            Value::Int(i) => Ok(Value::Int(*i)),
            other => Err(mismatch(ty, other)),
        },
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(mismatch(ty, other)),
        },
        FieldType::Float => match value {
            Value::Float(f) => Ok(Value::Float(*f)),
            other => Err(mismatch(ty, other)),
        },
        FieldType::Str => match value {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            other => Err(mismatch(ty, other)),
        },
        FieldType::Enum(declared) => match value {
            Value::Enum(member) if member.ty == *declared => Ok(value.clone()),
            // A bare label string is rejected: stringly-typed configs must
            // construct the member explicitly.
            other => Err(mismatch(ty, other)),
        },
        FieldType::List(element) => match value {
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(check(item, element).map_err(|e| e.nested(Segment::Index(i)))?);
                }
                Ok(Value::List(out))
            }
            other => Err(mismatch(ty, other)),
        },
        FieldType::Tuple(elements) => match value {
            Value::List(items) => {
                if items.len() != elements.len() {
                    return Err(CheckError::new(
                        ErrorKind::TypeMismatch,
                        format!(
                            "expected {ty} of arity {}, got {} elements",
                            elements.len(),
                            items.len()
                        ),
                    ));
                }
                let mut out = Vec::with_capacity(items.len());
                for (i, (item, element_ty)) in items.iter().zip(elements).enumerate() {
                    out.push(check(item, element_ty).map_err(|e| e.nested(Segment::Index(i)))?);
                }
                Ok(Value::List(out))
            }
            other => Err(mismatch(ty, other)),
        },
        FieldType::VarTuple(element) => match value {
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(check(item, element).map_err(|e| e.nested(Segment::Index(i)))?);
                }
                Ok(Value::List(out))
            }
            other => Err(mismatch(ty, other)),
        },
        FieldType::Map(key_kind, value_ty) => match value {
            Value::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, item) in map {
                    // Keys are never coerced; the runtime kind must already
                    // be exact.
                    if key.kind() != *key_kind {
                        return Err(CheckError::new(
                            ErrorKind::TypeMismatch,
                            format!("expected {key_kind} key, got {} key", key.kind()),
                        )
                        .nested(Segment::Key(key.to_string())));
                    }
                    let checked = check(item, value_ty)
                        .map_err(|e| e.nested(Segment::Entry(key.to_string())))?;
                    out.insert(key.clone(), checked);
                }
                Ok(Value::Map(out))
            }
            other => Err(mismatch(ty, other)),
        },
        FieldType::Optional(inner) => {
            check_union(value, std::slice::from_ref(inner.as_ref()), true, ty)
        }
        FieldType::Union(alternatives) => check_union(value, alternatives, false, ty),
        FieldType::Record(schema) => match value {
            Value::Record(config) => {
                check_record_against(config, schema.fields().iter().map(|d| (&d.name, &d.ty)))?;
                Ok(value.clone())
            }
            other => Err(mismatch(ty, other)),
        },
        FieldType::Structured(thunk) => match value {
            Value::Map(map) => {
                // Resolved only now, at recursion time, so self-referential
                // schemas cost nothing at declaration and recursion depth is
                // bounded by the value's own nesting.
                let schema = thunk.resolve();
                check_structured(map, &schema)?;
                Ok(value.clone())
            }
            other => Err(mismatch(ty, other)),
        },
        FieldType::Unsupported(name) => Err(CheckError::new(
            ErrorKind::Unsupported,
            format!("cannot check value against unsupported type {name}"),
        )),
    }
}

/// Alternatives are tried strictly in declaration order; the first that
/// checks wins. Null is acceptable only when the union explicitly allows it.
fn check_union(
    value: &Value,
    alternatives: &[FieldType],
    null_allowed: bool,
    declared: &FieldType,
) -> Result<Value, CheckError> {
    if value.is_null() && (null_allowed || alternatives.iter().any(|t| matches!(t, FieldType::Null)))
    {
        return Ok(Value::Null);
    }
    for alternative in alternatives {
        if let Ok(converted) = check(value, alternative) {
            return Ok(converted);
        }
    }
    Err(CheckError::new(
        ErrorKind::UnionMismatch,
        format!(
            "no alternative of {declared} matched value of kind {}",
            value.kind_name()
        ),
    ))
}

fn check_structured(
    map: &IndexMap<MapKey, Value>,
    schema: &StructuredSchema,
) -> Result<(), CheckError> {
    for key in map.keys() {
        let known = match key {
            MapKey::Str(name) => schema.field_type(name).is_some(),
            _ => false,
        };
        if !known {
            return Err(CheckError::new(
                ErrorKind::UnknownField,
                format!("'{key}' is not a field of {}", schema.name),
            )
            .nested(Segment::Field(key.to_string())));
        }
    }
    for (name, field_ty) in &schema.fields {
        match map.get(&MapKey::Str((*name).to_string())) {
            Some(value) => {
                check(value, field_ty).map_err(|e| e.nested(Segment::Field((*name).to_string())))?;
            }
            None if schema.total => {
                return Err(CheckError::new(
                    ErrorKind::MissingField,
                    format!("Missing required field '{name}'"),
                )
                .nested(Segment::Field((*name).to_string())));
            }
            None => {}
        }
    }
    Ok(())
}

fn check_record_against<'a>(
    config: &Config,
    declared_fields: impl Iterator<Item = (&'a String, &'a FieldType)>,
) -> Result<(), CheckError> {
    for (name, field_ty) in declared_fields {
        match config.value(name) {
            Some(value) => {
                check(value, field_ty).map_err(|e| e.nested(Segment::Field(name.clone())))?;
            }
            None if config.has(name) => {
                // A MISSING slot is not yet part of the value set; it is
                // checked when it is first assigned.
            }
            None => {
                return Err(CheckError::new(
                    ErrorKind::MissingField,
                    format!("Missing required field '{name}'"),
                )
                .nested(Segment::Field(name.clone())));
            }
        }
    }
    Ok(())
}

/// Validate a whole instance against its own field descriptors. Stops at the
/// first failing field, reporting the full path to the failure.
pub fn check_record(config: &Config) -> Result<(), CheckError> {
    for descriptor in config.descriptors() {
        if let Some(value) = config.value(&descriptor.name) {
            check(value, &descriptor.ty)
                .map_err(|e| e.nested(Segment::Field(descriptor.name.clone())))?;
        }
    }
    Ok(())
}

fn decode_mismatch(expected: &FieldType, actual: &serde_json::Value) -> CheckError {
    let kind = match actual {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    };
    CheckError::new(
        ErrorKind::TypeMismatch,
        format!("expected {expected}, got {kind}"),
    )
}

/// Convert a raw JSON value into the declared type. This is the
/// deserialization workhorse: same traversal and path reporting as [`check`],
/// plus the coercions JSON makes necessary.
pub fn decode(raw: &serde_json::Value, ty: &FieldType) -> Result<Value, CheckError> {
    match ty {
        FieldType::Any => Ok(json_to_value(raw)),
        FieldType::Null => match raw {
            serde_json::Value::Null => Ok(Value::Null),
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Int => match raw {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| CheckError::new(ErrorKind::TypeMismatch, "number is not an integer")),
            other => Err(decode_mismatch(ty, other)),
        },
        // A whole JSON number is acceptable for a float field; JSON does not
        // distinguish 1 from 1.0.
        FieldType::Float => match raw {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| CheckError::new(ErrorKind::TypeMismatch, "number out of range")),
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Bool => match raw {
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Str => match raw {
            serde_json::Value::String(s) => Ok(Value::Str(s.clone())),
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Enum(declared) => match raw {
            serde_json::Value::String(label) => declared.member(label).map(Value::Enum).ok_or_else(
                || {
                    CheckError::new(
                        ErrorKind::TypeMismatch,
                        format!("'{label}' is not a member of enum {}", declared.name),
                    )
                },
            ),
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::List(element) => match raw {
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(decode(item, element).map_err(|e| e.nested(Segment::Index(i)))?);
                }
                Ok(Value::List(out))
            }
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Tuple(elements) => match raw {
            serde_json::Value::Array(items) => {
                if items.len() != elements.len() {
                    return Err(CheckError::new(
                        ErrorKind::TypeMismatch,
                        format!(
                            "expected {ty} of arity {}, got {} elements",
                            elements.len(),
                            items.len()
                        ),
                    ));
                }
                let mut out = Vec::with_capacity(items.len());
                for (i, (item, element_ty)) in items.iter().zip(elements).enumerate() {
                    out.push(decode(item, element_ty).map_err(|e| e.nested(Segment::Index(i)))?);
                }
                Ok(Value::List(out))
            }
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::VarTuple(element) => match raw {
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(decode(item, element).map_err(|e| e.nested(Segment::Index(i)))?);
                }
                Ok(Value::List(out))
            }
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Map(key_kind, value_ty) => match raw {
            serde_json::Value::Object(object) => {
                let mut out = IndexMap::with_capacity(object.len());
                for (raw_key, item) in object {
                    let key = decode_map_key(raw_key, *key_kind)?;
                    let decoded = decode(item, value_ty)
                        .map_err(|e| e.nested(Segment::Entry(raw_key.clone())))?;
                    out.insert(key, decoded);
                }
                Ok(Value::Map(out))
            }
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Optional(inner) => {
            decode_union(raw, std::slice::from_ref(inner.as_ref()), true, ty)
        }
        FieldType::Union(alternatives) => decode_union(raw, alternatives, false, ty),
        FieldType::Record(schema) => match raw {
            serde_json::Value::Object(object) => {
                let mut provided = IndexMap::with_capacity(object.len());
                for (key, item) in object {
                    let field_ty = schema
                        .field(key)
                        .map(|d| d.ty.clone())
                        .unwrap_or(FieldType::Any);
                    // Unknown keys are caught by the constructor below with
                    // the record's own name in the message.
                    let decoded = decode(item, &field_ty)
                        .map_err(|e| e.nested(Segment::Field(key.clone())))?;
                    provided.insert(key.clone(), decoded);
                }
                Config::from_decoded(schema, provided).map(Value::Record)
            }
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Structured(thunk) => match raw {
            serde_json::Value::Object(object) => {
                let schema = thunk.resolve();
                let mut out = IndexMap::with_capacity(object.len());
                for (key, item) in object {
                    let field_ty = schema.field_type(key).ok_or_else(|| {
                        CheckError::new(
                            ErrorKind::UnknownField,
                            format!("'{key}' is not a field of {}", schema.name),
                        )
                        .nested(Segment::Field(key.clone()))
                    })?;
                    let decoded = decode(item, field_ty)
                        .map_err(|e| e.nested(Segment::Field(key.clone())))?;
                    out.insert(MapKey::Str(key.clone()), decoded);
                }
                if schema.total {
                    for (name, _) in &schema.fields {
                        if !object.contains_key(*name) {
                            return Err(CheckError::new(
                                ErrorKind::MissingField,
                                format!("Missing required field '{name}'"),
                            )
                            .nested(Segment::Field((*name).to_string())));
                        }
                    }
                }
                Ok(Value::Map(out))
            }
            other => Err(decode_mismatch(ty, other)),
        },
        FieldType::Unsupported(name) => Err(CheckError::new(
            ErrorKind::Unsupported,
            format!("cannot decode into unsupported type {name}"),
        )),
    }
}

fn decode_union(
    raw: &serde_json::Value,
    alternatives: &[FieldType],
    null_allowed: bool,
    declared: &FieldType,
) -> Result<Value, CheckError> {
    if raw.is_null()
        && (null_allowed || alternatives.iter().any(|t| matches!(t, FieldType::Null)))
    {
        return Ok(Value::Null);
    }
    for alternative in alternatives {
        if let Ok(decoded) = decode(raw, alternative) {
            return Ok(decoded);
        }
    }
    Err(CheckError::new(
        ErrorKind::UnionMismatch,
        format!("no alternative of {declared} matched the document value"),
    ))
}

/// JSON object keys are strings; the declared key kind decides how they read
/// back. This is the inverse of the key stringification done on serialize.
fn decode_map_key(raw: &str, kind: MapKeyKind) -> Result<MapKey, CheckError> {
    let parsed = match kind {
        MapKeyKind::Str => Some(MapKey::Str(raw.to_string())),
        MapKeyKind::Int => raw.parse::<i64>().ok().map(MapKey::Int),
        MapKeyKind::Bool => match raw {
            "true" => Some(MapKey::Bool(true)),
            "false" => Some(MapKey::Bool(false)),
            _ => None,
        },
    };
    parsed.ok_or_else(|| {
        CheckError::new(
            ErrorKind::TypeMismatch,
            format!("key '{raw}' does not parse as {kind}"),
        )
        .nested(Segment::Key(raw.to_string()))
    })
}

/// Structural conversion for unchecked (`Any`) positions.
pub(crate) fn json_to_value(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(0.0)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(object) => {
            let mut out = IndexMap::with_capacity(object.len());
            for (key, item) in object {
                out.insert(MapKey::Str(key.clone()), json_to_value(item));
            }
            Value::Map(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Schema};
    use crate::types::{EnumType, StructuredThunk};

    static MODE: EnumType = EnumType {
        name: "Mode",
        members: &["fast", "slow"],
    };

    #[test]
    fn bool_and_int_exclude_each_other() {
        assert!(check(&Value::Int(1), &FieldType::Bool).is_err());
        assert!(check(&Value::Int(1), &FieldType::Int).is_ok());
        assert!(check(&Value::Bool(false), &FieldType::Bool).is_ok());
        assert!(check(&Value::Bool(false), &FieldType::Int).is_err());
        assert!(check(&Value::Bool(true), &FieldType::Float).is_err());
    }

    #[test]
    fn float_requires_float_in_strict_mode() {
        assert!(check(&Value::Float(1.5), &FieldType::Float).is_ok());
        assert!(check(&Value::Int(1), &FieldType::Float).is_err());
    }

    #[test]
    fn enum_accepts_member_not_label() {
        let member = MODE.member("fast").unwrap();
        assert!(check(&Value::Enum(member), &FieldType::Enum(&MODE)).is_ok());
        assert!(check(&Value::Str("fast".into()), &FieldType::Enum(&MODE)).is_err());
    }

    #[test]
    fn list_failure_reports_element_index() {
        let ty = FieldType::list(FieldType::Int);
        let value = Value::List(vec![Value::Int(1), Value::Str("b".into())]);
        let err = check(&value, &ty).unwrap_err();
        assert_eq!(err.path.segments(), &[Segment::Index(1)]);
    }

    #[test]
    fn string_is_not_a_list_of_str() {
        let err = check(&Value::Str("foo".into()), &FieldType::list(FieldType::Str)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn var_tuple_accepts_any_length_uniform_elements() {
        let ty = FieldType::var_tuple(FieldType::Int);
        let ok = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(check(&ok, &ty).is_ok());
        let bad = Value::List(vec![Value::Int(1), Value::Str("b".into())]);
        assert!(check(&bad, &ty).is_err());
    }

    #[test]
    fn fixed_tuple_enforces_arity_and_positions() {
        let ty = FieldType::Tuple(vec![FieldType::Int, FieldType::Str]);
        let ok = Value::List(vec![Value::Int(1), Value::Str("x".into())]);
        assert!(check(&ok, &ty).is_ok());
        let short = Value::List(vec![Value::Int(1)]);
        assert!(check(&short, &ty).is_err());
        let swapped = Value::List(vec![Value::Str("x".into()), Value::Int(1)]);
        let err = check(&swapped, &ty).unwrap_err();
        assert_eq!(err.path.segments(), &[Segment::Index(0)]);
    }

    fn str_int_map(entries: &[(&str, Value)]) -> Value {
        let mut map = IndexMap::new();
        for (k, v) in entries {
            map.insert(MapKey::Str((*k).to_string()), v.clone());
        }
        Value::Map(map)
    }

    #[test]
    fn map_value_failure_names_the_entry() {
        let ty = FieldType::map(MapKeyKind::Str, FieldType::Int);
        let value = str_int_map(&[("foo", Value::Str("bar".into()))]);
        let err = check(&value, &ty).unwrap_err();
        assert!(err.path.contains_entry("foo"));
    }

    #[test]
    fn map_key_failure_marks_the_key_side() {
        let ty = FieldType::map(MapKeyKind::Str, FieldType::Int);
        let mut map = IndexMap::new();
        map.insert(MapKey::Int(1), Value::Int(1));
        let err = check(&Value::Map(map), &ty).unwrap_err();
        assert_eq!(err.path.segments(), &[Segment::Key("1".into())]);
        assert!(!err.path.contains_entry("1"));
    }

    #[test]
    fn union_tries_alternatives_in_declaration_order() {
        let ty = FieldType::Union(vec![FieldType::Int, FieldType::Str]);
        assert_eq!(check(&Value::Int(3), &ty).unwrap(), Value::Int(3));
        assert_eq!(
            check(&Value::Str("hi".into()), &ty).unwrap(),
            Value::Str("hi".into())
        );
        let err = check(&Value::Float(1.0), &ty).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnionMismatch);
    }

    #[test]
    fn null_needs_explicit_permission() {
        assert!(check(&Value::Null, &FieldType::Int).is_err());
        assert!(check(&Value::Null, &FieldType::optional(FieldType::Int)).is_ok());
        assert!(
            check(
                &Value::Null,
                &FieldType::Union(vec![FieldType::Int, FieldType::Null])
            )
            .is_ok()
        );
        assert!(
            check(
                &Value::Null,
                &FieldType::Union(vec![FieldType::Int, FieldType::Str])
            )
            .is_err()
        );
    }

    #[test]
    fn unsupported_type_fails_instead_of_passing() {
        let err = check(&Value::Int(1), &FieldType::Unsupported("callable")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unsupported);
    }

    fn inner_schema() -> std::sync::Arc<Schema> {
        Schema::builder("Inner")
            .field(Field::new("a", FieldType::Int).default(0_i64))
            .field(
                Field::new("b", FieldType::map(MapKeyKind::Str, FieldType::Int))
                    .default_factory(|| Value::Map(IndexMap::new())),
            )
            .build()
    }

    fn outer_schema() -> std::sync::Arc<Schema> {
        Schema::builder("Outer")
            .field(Field::new("a", FieldType::Int).default(0_i64))
            .field(Field::new("b", FieldType::Str).default(""))
            .field(Field::new("c", FieldType::Record(inner_schema())).default_factory(|| {
                Value::Record(Config::new(&inner_schema()).expect("fixture schema"))
            }))
            .build()
    }

    #[test]
    fn ad_hoc_fields_pass_whole_record_check() {
        let mut config = Config::new(&outer_schema()).unwrap();
        config.update([("zz", Value::Str("foo".into()))], true).unwrap();
        assert!(check_record(&config).is_ok());
    }

    #[test]
    fn nested_record_failure_path_spans_levels() {
        let inner = Config::new(&inner_schema()).unwrap();
        let mut map = IndexMap::new();
        map.insert(MapKey::Str("foo".into()), Value::Str("bar".into()));
        let mut inner_bad = inner.clone();
        // Plant an invalid nested value through the unchecked update path.
        let mut donor = Config::new(&inner_schema()).unwrap();
        donor.update([("planted", Value::Map(map))], true).unwrap();
        let planted = donor.get("planted").unwrap().clone();
        inner_bad.update([("hack", planted)], true).unwrap();

        // Check the planted map directly against the declared map type.
        let err = check(
            inner_bad.get("hack").unwrap(),
            &FieldType::map(MapKeyKind::Str, FieldType::Int),
        )
        .unwrap_err();
        assert!(err.path.contains_entry("foo"));
    }

    // -- Structured mappings -------------------------------------------------

    fn td() -> StructuredSchema {
        StructuredSchema::new("TD", true)
            .field("a", FieldType::Str)
            .field("b", FieldType::Int)
            .field(
                "c",
                FieldType::optional(FieldType::Structured(StructuredThunk(td))),
            )
    }

    fn td_partial() -> StructuredSchema {
        StructuredSchema::new("TDPartial", false)
            .field("a", FieldType::Str)
            .field("b", FieldType::Int)
            .field(
                "c",
                FieldType::optional(FieldType::Structured(StructuredThunk(td_partial))),
            )
    }

    fn structured(entries: &[(&str, Value)]) -> Value {
        let mut map = IndexMap::new();
        for (k, v) in entries {
            map.insert(MapKey::Str((*k).to_string()), v.clone());
        }
        Value::Map(map)
    }

    #[test]
    fn total_structured_requires_every_field() {
        let ty = FieldType::Structured(StructuredThunk(td));
        let ok = structured(&[
            ("a", Value::Str("foo".into())),
            ("b", Value::Int(1)),
            ("c", Value::Null),
        ]);
        assert!(check(&ok, &ty).is_ok());
        let missing = structured(&[("a", Value::Str("foo".into())), ("b", Value::Int(1))]);
        let err = check(&missing, &ty).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingField);
    }

    #[test]
    fn partial_structured_accepts_any_subset() {
        let ty = FieldType::Structured(StructuredThunk(td_partial));
        assert!(check(&structured(&[]), &ty).is_ok());
        assert!(check(&structured(&[("a", Value::Str("foo".into()))]), &ty).is_ok());
        let wrong = structured(&[("a", Value::Int(1))]);
        assert!(check(&wrong, &ty).is_err());
    }

    #[test]
    fn self_referential_structured_checks_deep_finite_nesting() {
        let ty = FieldType::Structured(StructuredThunk(td_partial));
        // c: {c: {c: {c: {c: {}}}}}
        let mut value = structured(&[]);
        for _ in 0..5 {
            value = structured(&[("c", value)]);
        }
        assert!(check(&value, &ty).is_ok());

        // Same shape but with a type error at the deepest level.
        let mut bad = structured(&[("a", Value::Int(10))]);
        for _ in 0..5 {
            bad = structured(&[("c", bad)]);
        }
        assert!(check(&bad, &ty).is_err());
    }

    #[test]
    fn structured_rejects_unknown_keys() {
        let ty = FieldType::Structured(StructuredThunk(td_partial));
        let err = check(&structured(&[("zz", Value::Int(1))]), &ty).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownField);
    }

    // -- Decode --------------------------------------------------------------

    #[test]
    fn decode_enum_from_label() {
        let decoded = decode(&serde_json::json!("fast"), &FieldType::Enum(&MODE)).unwrap();
        assert_eq!(decoded, Value::Enum(MODE.member("fast").unwrap()));
        assert!(decode(&serde_json::json!("medium"), &FieldType::Enum(&MODE)).is_err());
    }

    #[test]
    fn decode_widens_whole_number_to_float() {
        assert_eq!(
            decode(&serde_json::json!(10), &FieldType::Float).unwrap(),
            Value::Float(10.0)
        );
        assert!(decode(&serde_json::json!(true), &FieldType::Float).is_err());
    }

    #[test]
    fn decode_bool_rejects_numbers() {
        assert!(decode(&serde_json::json!(1), &FieldType::Bool).is_err());
        assert!(decode(&serde_json::json!(0), &FieldType::Int).is_ok());
    }

    #[test]
    fn decode_record_applies_defaults_and_catches_unknown_keys() {
        let schema = inner_schema();
        let decoded = decode(&serde_json::json!({"a": 5}), &FieldType::Record(schema.clone()))
            .unwrap();
        let config = decoded.as_record().unwrap();
        assert_eq!(config.get("a").unwrap(), &Value::Int(5));

        let err = decode(
            &serde_json::json!({"nope": 1}),
            &FieldType::Record(schema),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownField);
    }

    #[test]
    fn decode_required_field_missing_is_reported_by_name() {
        let schema = Schema::builder("W")
            .field(Field::new("val_req", FieldType::Str))
            .build();
        let err = decode(&serde_json::json!({}), &FieldType::Record(schema)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingField);
        assert!(err.message.contains("Missing required field"));
        assert!(err.path.contains_field("val_req"));
    }

    #[test]
    fn decode_map_parses_keys_through_declared_kind() {
        let ty = FieldType::map(MapKeyKind::Int, FieldType::Str);
        let decoded = decode(&serde_json::json!({"2": "b", "1": "a"}), &ty).unwrap();
        match decoded {
            Value::Map(map) => {
                assert_eq!(map.get(&MapKey::Int(2)), Some(&Value::Str("b".into())));
                assert_eq!(map.get(&MapKey::Int(1)), Some(&Value::Str("a".into())));
            }
            other => panic!("expected map, got {other:?}"),
        }
        let err = decode(&serde_json::json!({"x": "a"}), &ty).unwrap_err();
        assert!(matches!(err.path.segments(), [Segment::Key(k)] if k == "x"));
    }

    #[test]
    fn decode_nested_list_failure_path() {
        let ty = FieldType::list(FieldType::list(FieldType::Int));
        let err = decode(&serde_json::json!([[1, 2], [3, "x"]]), &ty).unwrap_err();
        assert_eq!(
            err.path.segments(),
            &[Segment::Index(1), Segment::Index(1)]
        );
    }

    #[test]
    fn decode_union_first_match_wins() {
        let ty = FieldType::Union(vec![FieldType::Int, FieldType::Str]);
        assert_eq!(decode(&serde_json::json!(1), &ty).unwrap(), Value::Int(1));
        assert_eq!(
            decode(&serde_json::json!("x"), &ty).unwrap(),
            Value::Str("x".into())
        );
        assert!(decode(&serde_json::json!([1]), &ty).is_err());
    }

    #[test]
    fn decode_structured_total_and_partial() {
        let total = FieldType::Structured(StructuredThunk(td));
        let ok = serde_json::json!({"a": "foo", "b": 1, "c": null});
        assert!(decode(&ok, &total).is_ok());
        let missing = serde_json::json!({"a": "foo"});
        assert!(decode(&missing, &total).is_err());

        let partial = FieldType::Structured(StructuredThunk(td_partial));
        assert!(decode(&serde_json::json!({}), &partial).is_ok());
        assert!(decode(&serde_json::json!({"c": {"c": {"c": {}}}}), &partial).is_ok());
        assert!(decode(&serde_json::json!({"c": {"c": {"a": 10}}}), &partial).is_err());
    }
}
