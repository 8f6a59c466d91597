//! Field-level validation errors.
//!
//! Structural validators report problems against a dotted path into the
//! document they checked (`spec.names.plural`, `spec.versions[1].name`).
//! A `FieldErrorList` collects every problem found in one pass and renders
//! them as a single aggregate message.

use std::fmt;

/// A path into a validated document, rendered as `a.b[0].c`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(String);

impl FieldPath {
    /// Start a path at the named root field.
    pub fn new(root: &str) -> Self {
        Self(root.to_string())
    }

    /// Descend into a named child field.
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Descend into a list element.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Descend into a map entry.
    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}[{}]", self.0, key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The class of problem a `FieldError` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorType {
    Required,
    Invalid,
    Forbidden,
    NotSupported,
    Duplicate,
}

impl FieldErrorType {
    fn label(self) -> &'static str {
        match self {
            FieldErrorType::Required => "Required value",
            FieldErrorType::Invalid => "Invalid value",
            FieldErrorType::Forbidden => "Forbidden",
            FieldErrorType::NotSupported => "Unsupported value",
            FieldErrorType::Duplicate => "Duplicate value",
        }
    }
}

/// A single problem found at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub error_type: FieldErrorType,
    /// The offending value, rendered for display. Absent for missing fields.
    pub bad_value: Option<String>,
    pub detail: String,
}

impl FieldError {
    pub fn required(path: &FieldPath, detail: impl Into<String>) -> Self {
        Self::build(path, FieldErrorType::Required, None, detail.into())
    }

    pub fn invalid(path: &FieldPath, value: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self::build(path, FieldErrorType::Invalid, Some(value.to_string()), detail.into())
    }

    pub fn forbidden(path: &FieldPath, detail: impl Into<String>) -> Self {
        Self::build(path, FieldErrorType::Forbidden, None, detail.into())
    }

    pub fn not_supported(path: &FieldPath, value: impl fmt::Display, valid: &[&str]) -> Self {
        let quoted: Vec<String> = valid.iter().map(|v| format!("\"{v}\"")).collect();
        Self::build(
            path,
            FieldErrorType::NotSupported,
            Some(value.to_string()),
            format!("supported values: {}", quoted.join(", ")),
        )
    }

    pub fn duplicate(path: &FieldPath, value: impl fmt::Display) -> Self {
        Self::build(path, FieldErrorType::Duplicate, Some(value.to_string()), String::new())
    }

    fn build(
        path: &FieldPath,
        error_type: FieldErrorType,
        bad_value: Option<String>,
        detail: String,
    ) -> Self {
        Self {
            path: path.to_string(),
            error_type,
            bad_value,
            detail,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error_type.label())?;
        if let Some(value) = &self.bad_value {
            write!(f, ": \"{value}\"")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// An ordered collection of `FieldError`s from one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrorList(Vec<FieldError>);

impl FieldErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: FieldErrorList) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl From<Vec<FieldError>> for FieldErrorList {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for FieldErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A single error renders as itself; several render as `[e1, e2, ...]`.
impl fmt::Display for FieldErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => Ok(()),
            [only] => write!(f, "{only}"),
            many => {
                let rendered: Vec<String> = many.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}
