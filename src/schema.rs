//! Record types: explicit schema registration instead of runtime reflection.
//!
//! A [`Schema`] is built once per record type through [`SchemaBuilder`] and
//! yields a flattened, order-stable list of [`FieldDescriptor`]s. Inheritance
//! is explicit: [`SchemaBuilder::extend`] copies a base schema's fields in
//! front of the derived ones, and a derived field with the same name replaces
//! the base descriptor in place, so every ancestor's fields are present
//! exactly once with fully resolved types.

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::CoqpitError;
use crate::types::FieldType;
use crate::value::Value;

/// Per-field validation predicate attached as metadata. Returns a reason on
/// rejection.
pub type Contract = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Record-level validation hook, the `check_values` of a config type. Runs
/// at construction, after `update`, after a load, and after argument
/// parsing.
pub type ValuesHook = Arc<dyn Fn(&Config) -> Result<(), CoqpitError> + Send + Sync>;

/// How a field obtains its value when the constructor is not given one.
#[derive(Clone)]
pub enum FieldDefault {
    /// No default: omitting the field at construction is an error.
    Required,
    /// Starts as the MISSING sentinel: constructible, but reading the field
    /// fails until a value is assigned.
    Missing,
    /// A literal default, cloned fresh for every instance.
    Value(Value),
    /// A factory invoked fresh per instance, so mutable defaults are never
    /// shared across instances.
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Required => write!(f, "Required"),
            FieldDefault::Missing => write!(f, "Missing"),
            FieldDefault::Value(v) => write!(f, "Value({v:?})"),
            FieldDefault::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

/// Everything a record type knows about one field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: FieldType,
    pub default: FieldDefault,
    pub help: Option<String>,
    pub contract: Option<Contract>,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("default", &self.default)
            .field("help", &self.help)
            .field("contract", &self.contract.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

/// Builder for a single field descriptor.
pub struct Field {
    desc: FieldDescriptor,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Field {
            desc: FieldDescriptor {
                name: name.into(),
                ty,
                default: FieldDefault::Required,
                help: None,
                contract: None,
            },
        }
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.desc.default = FieldDefault::Value(value.into());
        self
    }

    pub fn default_factory(
        mut self,
        factory: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.desc.default = FieldDefault::Factory(Arc::new(factory));
        self
    }

    /// Declare mandatory, fail late: the field starts MISSING and reads fail
    /// until it is assigned.
    pub fn missing(mut self) -> Self {
        self.desc.default = FieldDefault::Missing;
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.desc.help = Some(text.into());
        self
    }

    pub fn contract(
        mut self,
        predicate: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.desc.contract = Some(Arc::new(predicate));
        self
    }

    fn build(self) -> FieldDescriptor {
        self.desc
    }
}

/// A named record type: a fixed, ordered set of field descriptors plus an
/// optional record-level validation hook.
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    check_values: Option<ValuesHook>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            check_values: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flattened, order-stable field list: base fields first, each name
    /// exactly once.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub(crate) fn values_hook(&self) -> Option<&ValuesHook> {
        self.check_values.as_ref()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field(
                "fields",
                &self.fields.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    check_values: Option<ValuesHook>,
}

impl SchemaBuilder {
    /// Include every field of `base` ahead of fields declared later. A later
    /// declaration of the same name overrides the base descriptor while
    /// keeping its position, mirroring how a derived record type refines an
    /// ancestor field.
    pub fn extend(mut self, base: &Schema) -> Self {
        for desc in base.fields() {
            self.insert(desc.clone());
        }
        if self.check_values.is_none() {
            self.check_values = base.check_values.clone();
        }
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.insert(field.build());
        self
    }

    pub fn check_values(
        mut self,
        hook: impl Fn(&Config) -> Result<(), CoqpitError> + Send + Sync + 'static,
    ) -> Self {
        self.check_values = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            name: self.name,
            fields: self.fields,
            check_values: self.check_values,
        })
    }

    fn insert(&mut self, desc: FieldDescriptor) {
        match self.fields.iter_mut().find(|f| f.name == desc.name) {
            Some(existing) => *existing = desc,
            None => self.fields.push(desc),
        }
    }
}
