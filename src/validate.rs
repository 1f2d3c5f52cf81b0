//! Declarative value constraints for `check_values` hooks.
//!
//! [`check_argument`] is the building block for per-field sanity checks:
//! existence, numeric bounds, allowed labels, cross-field prerequisites.
//! Rules are evaluated in a fixed, documented order:
//!
//! 1. `restricted`: the field must be defined (present with a value).
//! 2. `prerequisites`: every named field must also be defined.
//! 3. `is_path`: the value must name an existing filesystem path.
//! 4. `alternative`: if the named field is defined and non-null, the
//!    remaining checks are skipped entirely.
//! 5. none-check: a null value passes when `allow_none` (the default) and
//!    fails otherwise; a passing null also skips the value constraints.
//! 6. `min_val` / `max_val` on numeric values.
//! 7. `enum_list`: the lowercased string value must be one of the labels.

use crate::config::Config;
use crate::error::CoqpitError;
use crate::value::Value;

/// Constraint set for a single field, assembled builder-style.
#[derive(Debug, Default, Clone)]
pub struct ArgRules {
    restricted: bool,
    prerequisites: Vec<String>,
    is_path: bool,
    enum_list: Option<Vec<String>>,
    max_val: Option<f64>,
    min_val: Option<f64>,
    alternative: Option<String>,
    disallow_none: bool,
}

impl ArgRules {
    pub fn new() -> Self {
        ArgRules::default()
    }

    /// The field must be defined in the instance.
    pub fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    /// Another field that must be defined whenever this one is checked.
    pub fn prerequisite(mut self, name: impl Into<String>) -> Self {
        self.prerequisites.push(name.into());
        self
    }

    /// The value must be a string naming an existing path.
    pub fn is_path(mut self) -> Self {
        self.is_path = true;
        self
    }

    /// Allowed labels; matched case-insensitively against the value.
    pub fn enum_list(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.enum_list = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_val(mut self, max: f64) -> Self {
        self.max_val = Some(max);
        self
    }

    pub fn min_val(mut self, min: f64) -> Self {
        self.min_val = Some(min);
        self
    }

    /// A field that supersedes this one: when it is defined and non-null,
    /// this field's value constraints are not applied.
    pub fn alternative(mut self, name: impl Into<String>) -> Self {
        self.alternative = Some(name.into());
        self
    }

    /// Reject null values. Null is allowed by default.
    pub fn disallow_none(mut self) -> Self {
        self.disallow_none = true;
        self
    }
}

fn violation(field: &str, reason: impl Into<String>) -> CoqpitError {
    CoqpitError::ContractViolation {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Check one field of `config` against `rules`. Intended to be called from
/// a schema's `check_values` hook.
pub fn check_argument(name: &str, config: &Config, rules: &ArgRules) -> Result<(), CoqpitError> {
    let value = config.value(name);

    if rules.restricted && value.is_none() {
        return Err(violation(name, "field is required but not defined"));
    }
    for prerequisite in &rules.prerequisites {
        if config.value(prerequisite).is_none() {
            return Err(violation(
                name,
                format!("prerequisite field '{prerequisite}' is not defined"),
            ));
        }
    }
    let Some(value) = value else {
        return Ok(());
    };

    if rules.is_path {
        match value {
            Value::Str(path) if std::path::Path::new(path).exists() => {}
            Value::Str(path) => {
                return Err(violation(name, format!("path '{path}' does not exist")));
            }
            other => {
                return Err(violation(
                    name,
                    format!("expected a path string, got {}", other.kind_name()),
                ));
            }
        }
    }

    // A defined, non-null alternative supersedes the value constraints.
    if let Some(alternative) = &rules.alternative
        && let Some(alt_value) = config.value(alternative)
        && !alt_value.is_null()
    {
        return Ok(());
    }

    if value.is_null() {
        if rules.disallow_none {
            return Err(violation(name, "null value is not allowed"));
        }
        return Ok(());
    }

    if rules.max_val.is_some() || rules.min_val.is_some() {
        let n = numeric(value).ok_or_else(|| {
            violation(
                name,
                format!("numeric bounds on non-numeric value ({})", value.kind_name()),
            )
        })?;
        if let Some(max) = rules.max_val
            && n > max
        {
            return Err(violation(name, format!("{n} is larger than max value {max}")));
        }
        if let Some(min) = rules.min_val
            && n < min
        {
            return Err(violation(name, format!("{n} is smaller than min value {min}")));
        }
    }

    if let Some(labels) = &rules.enum_list {
        let label = match value {
            Value::Str(s) => s.to_lowercase(),
            Value::Enum(member) => member.member.to_lowercase(),
            other => {
                return Err(violation(
                    name,
                    format!("label constraint on non-string value ({})", other.kind_name()),
                ));
            }
        };
        if !labels.iter().any(|allowed| *allowed == label) {
            return Err(violation(name, format!("'{label}' is not a valid value")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Schema};
    use crate::types::FieldType;

    fn config_with(values: &[(&str, Value)]) -> Config {
        let mut builder = Schema::builder("T");
        for (name, _) in values {
            builder = builder.field(Field::new(*name, FieldType::Any).missing());
        }
        let schema = builder.build();
        let mut config = Config::new(&schema).unwrap();
        for (name, value) in values {
            config.set(*name, value.clone()).unwrap();
        }
        config
    }

    #[test]
    fn out_of_bounds_value_is_rejected() {
        let config = config_with(&[("val_a", Value::Int(5))]);
        let rules = ArgRules::new().restricted().min_val(10.0).max_val(2056.0);
        let err = check_argument("val_a", &config, &rules).unwrap_err();
        assert!(matches!(err, CoqpitError::ContractViolation { .. }));

        let config = config_with(&[("val_a", Value::Int(100))]);
        assert!(check_argument("val_a", &config, &rules).is_ok());
    }

    #[test]
    fn max_bound_applies_to_floats_too() {
        let config = config_with(&[("rate", Value::Float(1.5))]);
        let rules = ArgRules::new().max_val(1.0);
        assert!(check_argument("rate", &config, &rules).is_err());
    }

    #[test]
    fn restricted_requires_definition() {
        let config = config_with(&[]);
        assert!(check_argument("ghost", &config, &ArgRules::new().restricted()).is_err());
        assert!(check_argument("ghost", &config, &ArgRules::new()).is_ok());
    }

    #[test]
    fn existence_is_checked_before_none_allowance() {
        // Absent and restricted fails even though null would be allowed.
        let config = config_with(&[]);
        let rules = ArgRules::new().restricted();
        assert!(check_argument("val", &config, &rules).is_err());

        // Present-but-null passes the same rules.
        let config = config_with(&[("val", Value::Null)]);
        assert!(check_argument("val", &config, &rules).is_ok());
    }

    #[test]
    fn null_rejected_when_disallowed() {
        let config = config_with(&[("val", Value::Null)]);
        let rules = ArgRules::new().disallow_none();
        assert!(check_argument("val", &config, &rules).is_err());
    }

    #[test]
    fn null_skips_value_constraints() {
        let config = config_with(&[("val", Value::Null)]);
        let rules = ArgRules::new().min_val(128.0).max_val(4058.0);
        assert!(check_argument("val", &config, &rules).is_ok());
    }

    #[test]
    fn prerequisites_must_be_defined() {
        let config = config_with(&[("child", Value::Int(1))]);
        let rules = ArgRules::new().prerequisite("parent");
        assert!(check_argument("child", &config, &rules).is_err());

        let config = config_with(&[("child", Value::Int(1)), ("parent", Value::Int(2))]);
        assert!(check_argument("child", &config, &rules).is_ok());
    }

    #[test]
    fn alternative_supersedes_value_constraints() {
        let config = config_with(&[("val", Value::Int(1)), ("other", Value::Int(99))]);
        let rules = ArgRules::new().min_val(100.0).alternative("other");
        assert!(check_argument("val", &config, &rules).is_ok());

        // A null alternative does not supersede.
        let config = config_with(&[("val", Value::Int(1)), ("other", Value::Null)]);
        assert!(check_argument("val", &config, &rules).is_err());
    }

    #[test]
    fn enum_list_matches_case_insensitively() {
        let config = config_with(&[("mode", Value::Str("Fast".into()))]);
        let rules = ArgRules::new().enum_list(["fast", "slow"]);
        assert!(check_argument("mode", &config, &rules).is_ok());

        let config = config_with(&[("mode", Value::Str("medium".into()))]);
        assert!(check_argument("mode", &config, &rules).is_err());
    }

    #[test]
    fn is_path_requires_existing_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let existing = dir.path().to_string_lossy().to_string();
        let config = config_with(&[("out", Value::Str(existing))]);
        assert!(check_argument("out", &config, &ArgRules::new().is_path()).is_ok());

        let config = config_with(&[("out", Value::Str("/no/such/path/anywhere".into()))]);
        assert!(check_argument("out", &config, &ArgRules::new().is_path()).is_err());
    }
}
