//! Typed, validated, serializable configuration for Rust applications.
//! Declare a schema, get defaults, JSON round trips, and `--flag.dotted.path`
//! command-line overrides from that one definition.
//!
//! ```ignore
//! let schema = Schema::builder("TrainConfig")
//!     .field(Field::new("lr", FieldType::Float).default(1e-3))
//!     .field(Field::new("epochs", FieldType::Int).default(100_i64))
//!     .build();
//!
//! let mut config = Config::init_from_argparse(&schema, &argv, &ArgOptions::default())?;
//! config.save_json("run/config.json")?;
//! ```
//!
//! # Design: schema as source of truth
//!
//! Every config type is described once, by an explicit [`Schema`] built at
//! definition time. The schema is a flattened, order-stable list of field
//! descriptors: name, declared [`FieldType`], default (a value, a factory,
//! MISSING, or required), optional help text, and an optional per-field
//! contract. Inheritance is explicit too: [`SchemaBuilder::extend`] starts
//! from an ancestor's descriptors, and a same-name field overrides in place
//! without changing its position. Everything else derives from the schema:
//!
//! - **Construction** fills unset fields from defaults, with factories
//!   invoked fresh per instance, and fails on missing required fields.
//! - **Assignment re-validates.** [`Config::set`] runs the type checker and
//!   the field's contract on every write; there is no way to sneak an
//!   ill-typed value into a declared field.
//! - **MISSING is not null.** A field can be declared without a value; it is
//!   omitted from serialization, and a strict read fails with `UnsetField`
//!   until it is assigned. Null is an ordinary value that a field's type
//!   must explicitly admit.
//! - **Serialization** walks the descriptors in declaration order, and the
//!   strict deserializer decodes against the declared types, atomically:
//!   on any failure the previous instance state is untouched.
//! - **The flag surface** flattens reachable leaf fields into
//!   `--coqpit.path.to.field` flags, list elements addressed by index, with
//!   the schema's help text on each flag.
//!
//! # Type checking
//!
//! The checker in [`check`] is a recursive interpreter over [`FieldType`]:
//! primitives, lists, tuples, typed-key mappings, optionals, unions, enums,
//! nested records, and self-referential structured mappings. It is strict
//! where dynamic languages are sloppy: bool and int reject each other in
//! both directions, enum fields take a constructed member rather than its
//! label string, and union alternatives resolve in declaration order with
//! the first match winning. Failures carry a [`Path`](error::Path) into
//! arbitrarily deep nesting, `people[0].name` style.
//!
//! The JSON decoder is the same traversal with the coercions JSON forces:
//! enum members decode from their labels, whole numbers widen into float
//! fields, and mapping keys parse back through their declared kind.
//!
//! # Value constraints
//!
//! Beyond types, schemas can attach semantic checks. A per-field contract
//! runs on every assignment; a record-level `check_values` hook runs after
//! construction, updates, loads, and argument parsing. The
//! [`check_argument`] helper covers the common rules declaratively:
//! existence, numeric bounds, allowed labels, prerequisites, alternatives.
//!
//! # Command-line overrides
//!
//! [`Config::parse_args`] applies `--coqpit.field value` overrides strictly;
//! [`Config::parse_known_args`] applies what it recognizes and returns the
//! leftover tokens in their original order, for composing with an outer
//! parser. Parsing is a plain token scanner over the flattened flag specs;
//! values are applied through the instance's own validating accessors, and
//! nothing is ever evaluated as code. The optional `cli` module (behind the
//! `clap` Cargo feature, on by default) renders a matching `--help` screen
//! via [clap](https://docs.rs/clap). To use coqpit without clap:
//!
//! ```toml
//! coqpit = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`CoqpitError`]. Type failures carry the
//! error kind and the full path to the failing element; file errors carry
//! the offending path. The library performs no logging and never prints:
//! it is a validation boundary, and reporting belongs to the caller. With
//! the `rich-errors` feature, errors implement `miette::Diagnostic` for
//! pretty terminal rendering.

pub mod error;
pub mod types;
pub mod value;

mod args;
mod check;
#[cfg(feature = "clap")]
mod cli;
mod config;
mod file;
mod schema;
mod serialize;
mod validate;

#[cfg(test)]
mod fixtures;

pub use args::{ArgOptions, ArgSpec, arg_specs, parse_args, parse_known_args};
pub use check::{check, check_record, decode};
#[cfg(feature = "clap")]
pub use cli::{command, render_help};
pub use config::{Config, PathToken, parse_path};
pub use error::{CheckError, CoqpitError, ErrorKind, Path, Segment};
pub use file::{load_json, load_json_reader, save_json, save_json_writer};
pub use schema::{Field, FieldDefault, FieldDescriptor, Schema, SchemaBuilder};
pub use serialize::{deserialize, to_json_value};
pub use types::{EnumType, FieldType, MapKeyKind, StructuredSchema, StructuredThunk};
pub use validate::{ArgRules, check_argument};
pub use value::{EnumValue, MapKey, Value};
