//! The config object: a record instance combining a schema with current
//! field values.
//!
//! Every write goes through an explicit validating setter and every read
//! checks the tri-state slot (unknown / MISSING / set), instead of relying on
//! implicit attribute interception. MISSING is the "declare mandatory, fail
//! late" mechanism: the instance constructs fine but the field cannot be read
//! until it is assigned.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::check;
use crate::error::CoqpitError;
use crate::schema::{FieldDefault, FieldDescriptor, Schema};
use crate::types::FieldType;
use crate::value::Value;

/// Tri-state storage for one field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    /// The MISSING sentinel: the field exists but has no readable value.
    Missing,
    Set(Value),
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) desc: FieldDescriptor,
    pub(crate) slot: Slot,
}

/// One dotted-path step: a field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
}

/// Split a dotted path into tokens; purely numeric segments become indices.
pub fn parse_path(path: &str) -> Vec<PathToken> {
    path.split('.')
        .map(|segment| match segment.parse::<usize>() {
            Ok(i) => PathToken::Index(i),
            Err(_) => PathToken::Field(segment.to_string()),
        })
        .collect()
}

/// A record instance: ordered field entries backed by a [`Schema`].
///
/// Cloning is deep; nested records, lists, and mappings are never aliased
/// between a clone and its source.
#[derive(Debug, Clone)]
pub struct Config {
    schema: Arc<Schema>,
    entries: Vec<Entry>,
}

impl Config {
    /// Construct from declared defaults alone. Required fields make this
    /// fail with `MissingRequiredField`.
    pub fn new(schema: &Arc<Schema>) -> Result<Config, CoqpitError> {
        Config::with_values(schema, [])
    }

    /// Construct with keyword-style field values; unspecified fields fall
    /// back to declared defaults, factories invoked fresh for this instance.
    /// Provided values are validated against their declared types, then
    /// per-field contracts and the record's `check_values` hook run.
    pub fn with_values<'a>(
        schema: &Arc<Schema>,
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Config, CoqpitError> {
        let mut provided: IndexMap<&str, Value> = values.into_iter().collect();
        for name in provided.keys() {
            if !schema.has_field(name) {
                return Err(CoqpitError::UnknownField((*name).to_string()));
            }
        }

        let mut entries = Vec::with_capacity(schema.fields().len());
        for desc in schema.fields() {
            let slot = match provided.shift_remove(desc.name.as_str()) {
                Some(value) => Slot::Set(check::check(&value, &desc.ty)?),
                None => match &desc.default {
                    FieldDefault::Required => {
                        return Err(CoqpitError::MissingRequiredField(desc.name.clone()));
                    }
                    FieldDefault::Missing => Slot::Missing,
                    FieldDefault::Value(v) => Slot::Set(v.clone()),
                    FieldDefault::Factory(factory) => Slot::Set(factory()),
                },
            };
            entries.push(Entry {
                desc: desc.clone(),
                slot,
            });
        }

        let config = Config {
            schema: schema.clone(),
            entries,
        };
        config.check_values()?;
        Ok(config)
    }

    /// Strict constructor from an external JSON payload: required fields must
    /// be present or defaulted, unknown keys fail, values are decoded by the
    /// declared field types.
    pub fn new_from_dict(
        schema: &Arc<Schema>,
        doc: &serde_json::Value,
    ) -> Result<Config, CoqpitError> {
        let decoded = check::decode(doc, &FieldType::Record(schema.clone()))?;
        match decoded {
            Value::Record(config) => {
                config.check_values()?;
                Ok(config)
            }
            // decode of a Record type only produces Record values.
            other => Err(CoqpitError::Check(crate::error::CheckError::new(
                crate::error::ErrorKind::TypeMismatch,
                format!("expected record, decoded {}", other.kind_name()),
            ))),
        }
    }

    /// Used by the decoder to assemble an instance from already-decoded
    /// field values. No contracts or hooks run here; the caller decides the
    /// boundary.
    pub(crate) fn from_decoded(
        schema: &Arc<Schema>,
        mut provided: IndexMap<String, Value>,
    ) -> Result<Config, crate::error::CheckError> {
        use crate::error::{CheckError, ErrorKind, Segment};

        for key in provided.keys() {
            if !schema.has_field(key) {
                return Err(CheckError::new(
                    ErrorKind::UnknownField,
                    format!("'{key}' is not a field of {}", schema.name()),
                )
                .nested(Segment::Field(key.clone())));
            }
        }

        let mut entries = Vec::with_capacity(schema.fields().len());
        for desc in schema.fields() {
            let slot = match provided.shift_remove(desc.name.as_str()) {
                Some(value) => Slot::Set(value),
                None => match &desc.default {
                    FieldDefault::Required => {
                        return Err(CheckError::new(
                            ErrorKind::MissingField,
                            format!("Missing required field '{}'", desc.name),
                        )
                        .nested(Segment::Field(desc.name.clone())));
                    }
                    FieldDefault::Missing => Slot::Missing,
                    FieldDefault::Value(v) => Slot::Set(v.clone()),
                    FieldDefault::Factory(factory) => Slot::Set(factory()),
                },
            };
            entries.push(Entry {
                desc: desc.clone(),
                slot,
            });
        }

        Ok(Config {
            schema: schema.clone(),
            entries,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of fields currently carried by this instance, ad hoc fields
    /// included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.desc.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.desc.name.as_str())
    }

    /// Iterate fields in order; `None` marks a MISSING slot.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|e| {
            let value = match &e.slot {
                Slot::Set(v) => Some(v),
                Slot::Missing => None,
            };
            (e.desc.name.as_str(), value)
        })
    }

    /// The per-instance descriptor for a field. Ad hoc fields admitted after
    /// construction have descriptors too.
    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.entries
            .iter()
            .find(|e| e.desc.name == name)
            .map(|e| &e.desc)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.entries.iter().map(|e| &e.desc)
    }

    /// Strict read: unknown fields and MISSING slots fail.
    pub fn get(&self, name: &str) -> Result<&Value, CoqpitError> {
        match self.entries.iter().find(|e| e.desc.name == name) {
            Some(entry) => match &entry.slot {
                Slot::Set(value) => Ok(value),
                Slot::Missing => Err(CoqpitError::UnsetField(name.to_string())),
            },
            None => Err(CoqpitError::UnknownField(name.to_string())),
        }
    }

    /// Lenient read: `None` for unknown fields and MISSING slots alike.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.desc.name == name)
            .and_then(|e| match &e.slot {
                Slot::Set(value) => Some(value),
                Slot::Missing => None,
            })
    }

    /// Validating assignment: the value is checked against the declared
    /// field type and the field's contract before it is stored.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), CoqpitError> {
        let value = value.into();
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.desc.name == name)
            .ok_or_else(|| CoqpitError::UnknownField(name.to_string()))?;
        let validated = check::check(&value, &entry.desc.ty)?;
        if let Some(contract) = &entry.desc.contract {
            contract(&validated).map_err(|reason| CoqpitError::ContractViolation {
                field: name.to_string(),
                reason,
            })?;
        }
        entry.slot = Slot::Set(validated);
        Ok(())
    }

    /// Mapping-style delete: removes the entry entirely, returning its value.
    /// Removing a declared field leaves a partial instance; this is the
    /// escape hatch for ad hoc fields, not a validated operation.
    pub fn remove(&mut self, name: &str) -> Result<Value, CoqpitError> {
        let position = self
            .entries
            .iter()
            .position(|e| e.desc.name == name)
            .ok_or_else(|| CoqpitError::UnknownField(name.to_string()))?;
        match self.entries.remove(position).slot {
            Slot::Set(value) => Ok(value),
            Slot::Missing => Err(CoqpitError::UnsetField(name.to_string())),
        }
    }

    /// Apply a plain mapping of field values. Unknown keys fail unless
    /// `allow_new` admits them as ad hoc extra fields, typed by shallow
    /// inference from the provided value. The record's `check_values` hook
    /// runs once after the batch; on any failure the instance keeps its
    /// prior state.
    pub fn update<'a>(
        &mut self,
        new: impl IntoIterator<Item = (&'a str, Value)>,
        allow_new: bool,
    ) -> Result<(), CoqpitError> {
        let mut staged = self.clone();
        for (name, value) in new {
            if staged.has(name) {
                staged.set(name, value)?;
            } else if allow_new {
                staged.entries.push(Entry {
                    desc: FieldDescriptor {
                        name: name.to_string(),
                        ty: value.infer_type(),
                        default: FieldDefault::Missing,
                        help: None,
                        contract: None,
                    },
                    slot: Slot::Set(value),
                });
            } else {
                return Err(CoqpitError::UnknownField(name.to_string()));
            }
        }
        staged.check_values()?;
        *self = staged;
        Ok(())
    }

    /// Copy another record's current field values and field metadata onto
    /// self. Fields unknown to self are added. No deep re-validation happens
    /// after a merge; the sources are trusted as already-validated records.
    pub fn merge(&mut self, other: &Config) {
        for entry in &other.entries {
            match self
                .entries
                .iter_mut()
                .find(|e| e.desc.name == entry.desc.name)
            {
                Some(mine) => *mine = entry.clone(),
                None => self.entries.push(entry.clone()),
            }
        }
    }

    /// Merge several sources in order; the last writer wins per field.
    pub fn merge_all<'a>(&mut self, sources: impl IntoIterator<Item = &'a Config>) {
        for source in sources {
            self.merge(source);
        }
    }

    /// Run per-field contracts and the schema's `check_values` hook.
    pub fn check_values(&self) -> Result<(), CoqpitError> {
        for entry in &self.entries {
            if let (Some(contract), Slot::Set(value)) = (&entry.desc.contract, &entry.slot) {
                contract(value).map_err(|reason| CoqpitError::ContractViolation {
                    field: entry.desc.name.clone(),
                    reason,
                })?;
            }
        }
        if let Some(hook) = self.schema.values_hook() {
            hook(self)?;
        }
        Ok(())
    }

    /// Set a value at a dotted/indexed path, walking nested records and list
    /// elements through the instance's own accessors. Every leaf assignment
    /// is validated: record fields through [`Config::set`], bare list
    /// elements against the declared element type carried down the walk.
    pub fn set_path(&mut self, tokens: &[PathToken], value: Value) -> Result<(), CoqpitError> {
        let (first, rest) = match tokens.split_first() {
            Some(split) => split,
            None => return Err(CoqpitError::UnknownField("<empty path>".to_string())),
        };
        let name = match first {
            PathToken::Field(name) => name,
            PathToken::Index(i) => {
                return Err(CoqpitError::UnknownField(format!(
                    "path may not start with index {i}"
                )));
            }
        };
        if rest.is_empty() {
            return self.set(name, value);
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.desc.name == *name)
            .ok_or_else(|| CoqpitError::UnknownField(name.clone()))?;
        match &mut entry.slot {
            Slot::Set(container) => set_in_value(container, &entry.desc.ty, rest, value),
            Slot::Missing => Err(CoqpitError::UnsetField(name.clone())),
        }
    }
}

static ANY_TYPE: FieldType = FieldType::Any;

/// The declared type of the element at `index` inside `ty`, unchecked when
/// the container's type does not constrain its elements.
fn element_type(ty: &FieldType, index: usize) -> &FieldType {
    match ty {
        FieldType::Optional(inner) => element_type(inner, index),
        FieldType::List(element) | FieldType::VarTuple(element) => element,
        FieldType::Tuple(elements) => elements.get(index).unwrap_or(&ANY_TYPE),
        _ => &ANY_TYPE,
    }
}

fn set_in_value(
    container: &mut Value,
    ty: &FieldType,
    tokens: &[PathToken],
    value: Value,
) -> Result<(), CoqpitError> {
    let (first, rest) = match tokens.split_first() {
        Some(split) => split,
        None => {
            *container = check::check(&value, ty)?;
            return Ok(());
        }
    };
    match (first, container) {
        (PathToken::Index(i), Value::List(items)) => {
            let len = items.len();
            let element = items.get_mut(*i).ok_or_else(|| {
                CoqpitError::UnknownField(format!("index {i} out of range (list has {len} items)"))
            })?;
            set_in_value(element, element_type(ty, *i), rest, value)
        }
        (PathToken::Field(name), Value::Record(config)) => {
            let mut nested = vec![PathToken::Field(name.clone())];
            nested.extend_from_slice(rest);
            config.set_path(&nested, value)
        }
        (token, other) => Err(CoqpitError::UnknownField(format!(
            "cannot descend into {} with {token:?}",
            other.kind_name()
        ))),
    }
}

/// Instances compare by field names and current values, in order. Schemas of
/// the same shape built independently compare equal.
impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.desc.name == b.desc.name && a.slot == b.slot)
    }
}
