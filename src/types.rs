//! Declared field types and the predicate layer that classifies them.
//!
//! A [`FieldType`] is a tagged description of what shape of value a field
//! accepts. The checker walks these descriptions recursively; this module only
//! classifies and never recurses into values, so self-referential structured
//! schemas are safe to build and inspect here.

use std::fmt;
use std::sync::Arc;

use crate::schema::Schema;
use crate::value::EnumValue;

/// Declared type of a record field.
#[derive(Debug, Clone)]
pub enum FieldType {
    Int,
    Float,
    Str,
    Bool,
    /// Exactly the null value. Mostly used as a union alternative.
    Null,
    /// Accepts any value unchecked. The admission type for ad hoc fields
    /// added through `update(.., allow_new)`.
    Any,
    List(Box<FieldType>),
    /// Fixed arity, per-position element types.
    Tuple(Vec<FieldType>),
    /// Any arity, uniform element type (the `(T, ...)` form).
    VarTuple(Box<FieldType>),
    /// Open-ended mapping with a key kind and a value type.
    Map(MapKeyKind, Box<FieldType>),
    /// Sugar for `Union[inner, Null]`, alternatives tried inner first.
    Optional(Box<FieldType>),
    /// Alternatives tried strictly in declaration order; first match wins.
    Union(Vec<FieldType>),
    Enum(&'static EnumType),
    /// A nested record with its own schema.
    Record(Arc<Schema>),
    /// A fixed-key, possibly-partial dictionary-shaped type, resolved lazily
    /// so it may refer to itself.
    Structured(StructuredThunk),
    /// A declared type the checker cannot validate. Checking always fails.
    Unsupported(&'static str),
}

impl FieldType {
    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    pub fn var_tuple(element: FieldType) -> Self {
        FieldType::VarTuple(Box::new(element))
    }

    pub fn map(key: MapKeyKind, value: FieldType) -> Self {
        FieldType::Map(key, Box::new(value))
    }

    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            FieldType::Int | FieldType::Float | FieldType::Str | FieldType::Bool
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            FieldType::List(_) | FieldType::Tuple(_) | FieldType::VarTuple(_)
        )
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, FieldType::Map(..))
    }

    /// Union in the wide sense: declared alternatives, including `Optional`.
    pub fn is_union(&self) -> bool {
        matches!(self, FieldType::Union(_) | FieldType::Optional(_))
    }

    /// True if null is an acceptable value: `Optional`, or a union listing
    /// `Null` among its alternatives.
    pub fn is_optional(&self) -> bool {
        match self {
            FieldType::Optional(_) | FieldType::Null => true,
            FieldType::Union(alts) => alts.iter().any(|t| matches!(t, FieldType::Null)),
            _ => false,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, FieldType::Enum(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, FieldType::Record(_))
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, FieldType::Structured(_))
    }

    /// A type the checker can do nothing with. The checker fails these with
    /// an unsupported-type error rather than passing them silently.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, FieldType::Unsupported(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Str => write!(f, "str"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Null => write!(f, "null"),
            FieldType::Any => write!(f, "any"),
            FieldType::List(t) => write!(f, "list<{t}>"),
            FieldType::Tuple(ts) => {
                write!(f, "tuple<")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ">")
            }
            FieldType::VarTuple(t) => write!(f, "tuple<{t}, ..>"),
            FieldType::Map(k, v) => write!(f, "map<{k}, {v}>"),
            FieldType::Optional(t) => write!(f, "optional<{t}>"),
            FieldType::Union(ts) => {
                write!(f, "union<")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ">")
            }
            FieldType::Enum(e) => write!(f, "enum {}", e.name),
            FieldType::Record(s) => write!(f, "record {}", s.name()),
            // Resolving the thunk here only reads the name; it does not
            // recurse into field types, so self-reference cannot loop.
            FieldType::Structured(t) => write!(f, "structured {}", t.resolve().name),
            FieldType::Unsupported(name) => write!(f, "unsupported {name}"),
        }
    }
}

/// Runtime kind a mapping key must have, exactly. Keys are never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKeyKind {
    Str,
    Int,
    Bool,
}

impl fmt::Display for MapKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKeyKind::Str => write!(f, "str"),
            MapKeyKind::Int => write!(f, "int"),
            MapKeyKind::Bool => write!(f, "bool"),
        }
    }
}

/// A closed set of named members. Declared as a `static` so member values can
/// borrow it for the lifetime of the program.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumType {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

impl EnumType {
    /// Construct a member value by label. `None` if the label is not a member.
    pub fn member(&'static self, label: &str) -> Option<EnumValue> {
        self.members
            .iter()
            .copied()
            .find(|m| *m == label)
            .map(|member| EnumValue { ty: self, member })
    }
}

/// Deferred reference to a structured schema.
///
/// The function is only called when the checker actually recurses into a
/// value of this type, so a schema may mention itself (optionally nested to
/// any depth) without expanding at declaration time. Recursion depth is
/// bounded by the nesting of the checked value, not by the type definition.
#[derive(Clone, Copy)]
pub struct StructuredThunk(pub fn() -> StructuredSchema);

impl StructuredThunk {
    pub fn resolve(&self) -> StructuredSchema {
        (self.0)()
    }
}

impl fmt::Debug for StructuredThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructuredThunk(..)")
    }
}

/// A record-like type over a fixed field set. `total` decides whether every
/// declared key is required or every declared key is optional.
#[derive(Debug, Clone)]
pub struct StructuredSchema {
    pub name: &'static str,
    pub total: bool,
    pub fields: Vec<(&'static str, FieldType)>,
}

impl StructuredSchema {
    pub fn new(name: &'static str, total: bool) -> Self {
        StructuredSchema {
            name,
            total,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, ty: FieldType) -> Self {
        self.fields.push((name, ty));
        self
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, t)| t)
    }
}
