//! Shared schemas used across the test suite.

use std::sync::Arc;

use crate::config::Config;
use crate::schema::{Field, Schema};
use crate::types::{EnumType, FieldType};
use crate::validate::{ArgRules, check_argument};
use crate::value::Value;

pub static MODE: EnumType = EnumType {
    name: "Mode",
    members: &["fast", "slow"],
};

/// name unset by default, so serialization drops it until assigned.
pub fn person_schema() -> Arc<Schema> {
    Schema::builder("Person")
        .field(Field::new("name", FieldType::optional(FieldType::Str)).missing())
        .field(Field::new("age", FieldType::Int).default(24_i64))
        .build()
}

pub fn group_schema() -> Arc<Schema> {
    Schema::builder("Group")
        .field(Field::new("name", FieldType::optional(FieldType::Str)).missing())
        .field(Field::new("size", FieldType::Int).default(0_i64))
        .field(
            Field::new(
                "people",
                FieldType::optional(FieldType::list(FieldType::Record(person_schema()))),
            )
            .missing(),
        )
        .build()
}

/// Same field shape as [`group_schema`], a distinct type on purpose.
pub fn reference_schema() -> Arc<Schema> {
    Schema::builder("Reference")
        .field(Field::new("name", FieldType::optional(FieldType::Str)).missing())
        .field(Field::new("size", FieldType::Int).default(0_i64))
        .field(
            Field::new(
                "people",
                FieldType::optional(FieldType::list(FieldType::Record(person_schema()))),
            )
            .missing(),
        )
        .build()
}

pub fn simple_schema() -> Arc<Schema> {
    Schema::builder("SimpleConfig")
        .field(Field::new("val_a", FieldType::Int).default(10_i64))
        .field(Field::new("val_b", FieldType::optional(FieldType::Int)).default(Value::Null))
        .field(Field::new("val_c", FieldType::Str).default("Coqpit is great!"))
        .field(
            Field::new("int_list", FieldType::list(FieldType::Int)).default_factory(|| {
                Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
            }),
        )
        .field(Field::new("flag", FieldType::Bool).default(false))
        .field(
            Field::new("mode", FieldType::Enum(&MODE))
                .default(MODE.member("fast").expect("declared member")),
        )
        .build()
}

pub fn simpler_schema() -> Arc<Schema> {
    Schema::builder("SimplerConfig")
        .field(
            Field::new("val_a", FieldType::optional(FieldType::Int))
                .default(Value::Null)
                .help("this is val_a"),
        )
        .build()
}

/// The argparse exercise type: scalars under a `check_values` hook plus a
/// defaulted list of nested records and two empty primitive lists.
pub fn nested_list_schema() -> Arc<Schema> {
    Schema::builder("SimpleConfig")
        .field(
            Field::new("val_a", FieldType::Int)
                .default(10_i64)
                .help("this is val_a of SimpleConfig"),
        )
        .field(
            Field::new("val_b", FieldType::optional(FieldType::Int))
                .default(Value::Null)
                .help("this is val_b"),
        )
        .field(Field::new("val_c", FieldType::Str).default("Coqpit is great!"))
        .field(
            Field::new(
                "mylist_with_default",
                FieldType::list(FieldType::Record(simpler_schema())),
            )
            .default_factory(|| {
                Value::List(vec![simpler_with(100), simpler_with(999)])
            })
            .help("list of SimplerConfig"),
        )
        .field(
            Field::new(
                "empty_int_list",
                FieldType::optional(FieldType::list(FieldType::Int)),
            )
            .default(Value::Null)
            .help("int list without default value"),
        )
        .field(
            Field::new(
                "empty_str_list",
                FieldType::optional(FieldType::list(FieldType::Str)),
            )
            .default(Value::Null)
            .help("str list without default value"),
        )
        .check_values(|config| {
            check_argument(
                "val_a",
                config,
                &ArgRules::new().restricted().min_val(10.0).max_val(2056.0),
            )?;
            check_argument(
                "val_b",
                config,
                &ArgRules::new().restricted().min_val(128.0).max_val(4058.0),
            )?;
            check_argument("val_c", config, &ArgRules::new().restricted())
        })
        .build()
}

fn simpler_with(val_a: i64) -> Value {
    let mut config = Config::new(&simpler_schema()).expect("fixture defaults");
    config.set("val_a", val_a).expect("declared int field");
    Value::Record(config)
}

pub fn person(name: &str, age: i64) -> Value {
    let mut config = Config::new(&person_schema()).expect("fixture defaults");
    config.set("name", name).expect("declared str field");
    config.set("age", age).expect("declared int field");
    Value::Record(config)
}
