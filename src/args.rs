//! Command-line overrides with dotted flags.
//!
//! Every reachable leaf field of an instance becomes a flag named
//! `--<prefix>.<dotted.path>`, list elements addressed by index
//! (`--coqpit.layers.0.size 32`). A list of primitives with no current
//! elements is exposed as one flag that consumes every following value
//! token instead. Parsing never evaluates strings as code: flags are
//! matched against the flattened specs and applied through the instance's
//! own validating path walker.
//!
//! [`parse_args`] is strict and fails on any token it does not recognize;
//! [`parse_known_args`] applies what it knows and hands the rest back in
//! their original order, argparse-style.

use std::sync::Arc;

use crate::config::{Config, PathToken};
use crate::error::{CheckError, CoqpitError, ErrorKind};
use crate::schema::Schema;
use crate::types::FieldType;
use crate::value::Value;

/// How the flag surface is built and parsed.
#[derive(Debug, Clone)]
pub struct ArgOptions {
    /// Leading path segment of every flag.
    pub prefix: String,
    /// Skip fields whose types have no flag representation instead of
    /// failing on them.
    pub relaxed: bool,
}

impl Default for ArgOptions {
    fn default() -> Self {
        ArgOptions {
            prefix: "coqpit".to_string(),
            relaxed: false,
        }
    }
}

impl ArgOptions {
    pub fn relaxed() -> Self {
        ArgOptions {
            relaxed: true,
            ..ArgOptions::default()
        }
    }
}

/// One flattened flag: where it writes and how its value tokens parse.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    /// Full flag text, `--` included.
    pub flag: String,
    /// Tokens to walk from the instance root to the target slot.
    pub path: Vec<PathToken>,
    /// Leaf type the value tokens are parsed against.
    pub ty: FieldType,
    pub help: Option<String>,
    /// Consumes every following value token as one list.
    pub multi: bool,
}

fn flag_type(ty: &FieldType) -> &FieldType {
    match ty {
        FieldType::Optional(inner) => inner,
        other => other,
    }
}

fn is_flag_primitive(ty: &FieldType) -> bool {
    matches!(
        ty,
        FieldType::Int | FieldType::Float | FieldType::Str | FieldType::Bool | FieldType::Enum(_)
    )
}

/// Flatten the reachable leaf fields of `config` into flag specs. The
/// current values matter: list elements get per-index flags only for the
/// elements that exist right now.
pub fn arg_specs(config: &Config, options: &ArgOptions) -> Result<Vec<ArgSpec>, CoqpitError> {
    let mut specs = Vec::new();
    flatten_record(config, &options.prefix, &[], options.relaxed, &mut specs)?;
    Ok(specs)
}

fn unsupported(dotted: &str, ty: &FieldType) -> CoqpitError {
    CheckError::new(
        ErrorKind::Unsupported,
        format!("field '{dotted}' of type {ty} has no flag representation"),
    )
    .into()
}

fn flatten_record(
    config: &Config,
    dotted: &str,
    path: &[PathToken],
    relaxed: bool,
    specs: &mut Vec<ArgSpec>,
) -> Result<(), CoqpitError> {
    for desc in config.descriptors() {
        let field_dotted = format!("{dotted}.{}", desc.name);
        let mut field_path = path.to_vec();
        field_path.push(PathToken::Field(desc.name.clone()));
        let leaf = flag_type(&desc.ty);

        if is_flag_primitive(leaf) {
            specs.push(ArgSpec {
                flag: format!("--{field_dotted}"),
                path: field_path,
                ty: leaf.clone(),
                help: desc.help.clone(),
                multi: false,
            });
            continue;
        }

        match leaf {
            FieldType::Record(_) => {
                if let Some(Value::Record(nested)) = config.value(&desc.name) {
                    flatten_record(nested, &field_dotted, &field_path, relaxed, specs)?;
                }
            }
            FieldType::List(element) if is_flag_primitive(flag_type(element)) => {
                let current = match config.value(&desc.name) {
                    Some(Value::List(items)) => items.len(),
                    _ => 0,
                };
                if current == 0 {
                    // No elements to address by index; take the whole list
                    // in one flag.
                    specs.push(ArgSpec {
                        flag: format!("--{field_dotted}"),
                        path: field_path,
                        ty: flag_type(element).clone(),
                        help: desc.help.clone(),
                        multi: true,
                    });
                } else {
                    for i in 0..current {
                        let mut element_path = field_path.clone();
                        element_path.push(PathToken::Index(i));
                        specs.push(ArgSpec {
                            flag: format!("--{field_dotted}.{i}"),
                            path: element_path,
                            ty: flag_type(element).clone(),
                            help: desc.help.clone(),
                            multi: false,
                        });
                    }
                }
            }
            FieldType::List(element) if matches!(flag_type(element), FieldType::Record(_)) => {
                if let Some(Value::List(items)) = config.value(&desc.name) {
                    for (i, item) in items.iter().enumerate() {
                        if let Value::Record(nested) = item {
                            let mut element_path = field_path.clone();
                            element_path.push(PathToken::Index(i));
                            flatten_record(
                                nested,
                                &format!("{field_dotted}.{i}"),
                                &element_path,
                                relaxed,
                                specs,
                            )?;
                        }
                    }
                }
            }
            _ if relaxed => {}
            other => return Err(unsupported(&field_dotted, other)),
        }
    }
    Ok(())
}

fn parse_token(token: &str, ty: &FieldType, flag: &str) -> Result<Value, CoqpitError> {
    let parsed = match ty {
        FieldType::Int => token.parse::<i64>().ok().map(Value::Int),
        FieldType::Float => token.parse::<f64>().ok().map(Value::Float),
        FieldType::Bool => match token {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        FieldType::Str => Some(Value::Str(token.to_string())),
        FieldType::Enum(declared) => declared.member(token).map(Value::Enum),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CoqpitError::ArgumentParseError(format!("invalid value '{token}' for {flag}: expected {ty}"))
    })
}

enum Matched<'a> {
    Inline(&'a ArgSpec, String),
    Bare(&'a ArgSpec),
}

fn match_flag<'a>(token: &str, specs: &'a [ArgSpec]) -> Option<Matched<'a>> {
    if let Some((flag, inline)) = token.split_once('=') {
        let spec = specs.iter().find(|s| s.flag == flag)?;
        return Some(Matched::Inline(spec, inline.to_string()));
    }
    specs.iter().find(|s| s.flag == token).map(Matched::Bare)
}

fn apply(
    config: &mut Config,
    spec: &ArgSpec,
    tokens: &[String],
) -> Result<(), CoqpitError> {
    let value = if spec.multi {
        let mut items = Vec::with_capacity(tokens.len());
        for token in tokens {
            items.push(parse_token(token, &spec.ty, &spec.flag)?);
        }
        Value::List(items)
    } else {
        parse_token(&tokens[0], &spec.ty, &spec.flag)?
    };
    config.set_path(&spec.path, value)
}

fn parse_into(
    config: &mut Config,
    args: &[String],
    options: &ArgOptions,
) -> Result<Vec<String>, CoqpitError> {
    let specs = arg_specs(config, options)?;
    let mut unknown = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let token = &args[i];
        let Some(matched) = match_flag(token, &specs) else {
            unknown.push(token.clone());
            i += 1;
            continue;
        };
        match matched {
            Matched::Inline(spec, inline) => {
                if spec.multi {
                    return Err(CoqpitError::ArgumentParseError(format!(
                        "{} takes multiple values and cannot use '='",
                        spec.flag
                    )));
                }
                apply(config, spec, &[inline])?;
                i += 1;
            }
            Matched::Bare(spec) => {
                let start = i + 1;
                let mut end = start;
                if spec.multi {
                    while end < args.len() && !args[end].starts_with("--") {
                        end += 1;
                    }
                } else if end < args.len() {
                    end += 1;
                }
                if end == start {
                    return Err(CoqpitError::ArgumentParseError(format!(
                        "{} expects a value",
                        spec.flag
                    )));
                }
                apply(config, spec, &args[start..end])?;
                i = end;
            }
        }
    }
    config.check_values()?;
    Ok(unknown)
}

/// Apply command-line overrides. Any token that is not a recognized flag
/// or one of its values is an error.
pub fn parse_args(
    config: &mut Config,
    args: &[String],
    options: &ArgOptions,
) -> Result<(), CoqpitError> {
    let unknown = parse_into(config, args, options)?;
    if let Some(first) = unknown.first() {
        return Err(CoqpitError::ArgumentParseError(format!(
            "unrecognized argument '{first}'"
        )));
    }
    Ok(())
}

/// Apply the overrides this instance understands and return the rest,
/// flags and their value tokens, in their original order.
pub fn parse_known_args(
    config: &mut Config,
    args: &[String],
    options: &ArgOptions,
) -> Result<Vec<String>, CoqpitError> {
    parse_into(config, args, options)
}

impl Config {
    pub fn parse_args(&mut self, args: &[String], options: &ArgOptions) -> Result<(), CoqpitError> {
        parse_args(self, args, options)
    }

    pub fn parse_known_args(
        &mut self,
        args: &[String],
        options: &ArgOptions,
    ) -> Result<Vec<String>, CoqpitError> {
        parse_known_args(self, args, options)
    }

    /// Build a fresh instance from defaults, then apply `args` strictly.
    pub fn init_from_argparse(
        schema: &Arc<Schema>,
        args: &[String],
        options: &ArgOptions,
    ) -> Result<Config, CoqpitError> {
        let mut config = Config::new(schema)?;
        parse_args(&mut config, args, options)?;
        Ok(config)
    }
}
