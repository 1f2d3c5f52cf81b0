use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One step into a nested structure, used to anchor a validation failure.
///
/// `Key` and `Entry` both point into a mapping but distinguish which side
/// failed: `Key` means the key itself did not match the declared key type,
/// `Entry` means the value stored under that key failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A record or structured-mapping field, by name.
    Field(String),
    /// A list or tuple element, by position.
    Index(usize),
    /// A mapping key that itself failed the key-type check.
    Key(String),
    /// The value stored under a mapping key.
    Entry(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, ".{name}"),
            Segment::Index(i) => write!(f, "[{i}]"),
            Segment::Key(k) => write!(f, "[key {k}]"),
            Segment::Entry(k) => write!(f, "[\"{k}\"]"),
        }
    }
}

/// Ordered path from the checked root down to the failing node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any segment names this record/structured field.
    pub fn contains_field(&self, name: &str) -> bool {
        self.0
            .iter()
            .any(|s| matches!(s, Segment::Field(f) if f == name))
    }

    /// True if any segment is a mapping entry (value side) under this key.
    pub fn contains_entry(&self, key: &str) -> bool {
        self.0
            .iter()
            .any(|s| matches!(s, Segment::Entry(k) if k == key))
    }

    pub(crate) fn prepend(&mut self, segment: Segment) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                // No leading dot on the first field segment: "people[0].name".
                Segment::Field(name) if i == 0 => write!(f, "{name}")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}

/// Classification of a checker failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeMismatch,
    UnionMismatch,
    MissingField,
    UnknownField,
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::UnionMismatch => "union mismatch",
            ErrorKind::MissingField => "missing field",
            ErrorKind::UnknownField => "unknown field",
            ErrorKind::Unsupported => "unsupported type",
        };
        write!(f, "{name}")
    }
}

/// A validation failure anchored to a location within a nested structure.
///
/// This is the checker's result value, not an exception: `check` and `decode`
/// return `Result<Value, CheckError>` and callers branch on `is_err()`. The
/// record-level boundary converts it into [`CoqpitError`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {path}: {message}")]
pub struct CheckError {
    pub kind: ErrorKind,
    pub path: Path,
    pub message: String,
}

impl CheckError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CheckError {
            kind,
            path: Path::root(),
            message: message.into(),
        }
    }

    /// Bubble this error up one level, recording the segment just entered.
    pub(crate) fn nested(mut self, segment: Segment) -> Self {
        self.path.prepend(segment);
        self
    }
}

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum CoqpitError {
    #[error("Missing required field '{0}'")]
    MissingRequiredField(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' has no value yet; assign one before reading it")]
    UnsetField(String),

    #[error("Invalid value: {0}")]
    Check(CheckError),

    #[error("Contract violation for '{field}': {reason}")]
    ContractViolation { field: String, reason: String },

    #[error("Argument parse error: {0}")]
    ArgumentParseError(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Boundary conversion: checker failures whose kind maps onto a dedicated
/// taxonomy entry surface as that entry, the rest stay path-annotated.
impl From<CheckError> for CoqpitError {
    fn from(err: CheckError) -> Self {
        match err.kind {
            ErrorKind::MissingField => CoqpitError::MissingRequiredField(err.path.to_string()),
            ErrorKind::UnknownField => CoqpitError::UnknownField(err.path.to_string()),
            _ => CoqpitError::Check(err),
        }
    }
}
