//! Failure records and the crate error type
//!
//! A [`ValidationError`] is one data-dependent failure: it is collected, not
//! raised. [`Error`] is what the crate raises, either at the `validate` entry
//! point (wrapping the first failure) or for builder-time misconfiguration.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A single validation failure.
///
/// `members` is empty for a failure on the root value; otherwise it holds
/// member paths relative to the validated root, such as `"Sub.Id"` or
/// `"Hobbies[1]"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Stable machine-readable code (`"min_length"`, `"required"`, ...).
    pub code: Cow<'static, str>,
    /// Human-readable message, already formatted.
    pub message: Cow<'static, str>,
    /// Member paths this failure targets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Template parameters (`min`, `max`, ...).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    /// Debug rendering of the offending value, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted_value: Option<String>,
}

impl ValidationError {
    /// Creates a root-level failure.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            members: Vec::new(),
            params: Vec::new(),
            attempted_value: None,
        }
    }

    /// Adds a member path.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Adds a template parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Records the offending value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_attempted_value(mut self, value: impl Into<String>) -> Self {
        self.attempted_value = Some(value.into());
        self
    }

    /// Replaces the message.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Looks up a parameter by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
    }

    /// The first member path, if any.
    pub fn member(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }

    /// Whether this failure applies to the root value.
    pub fn is_root(&self) -> bool {
        self.members.is_empty()
    }

    // ------------------------------------------------------------------------
    // Convenience constructors
    // ------------------------------------------------------------------------

    /// The value is missing.
    pub fn required() -> Self {
        Self::new("required", "The {name} field is required.")
    }

    /// String shorter than `min`.
    pub fn min_length(min: usize, actual: usize) -> Self {
        Self::new(
            "min_length",
            "The field {name} must be a string with a minimum length of '{min}'.",
        )
        .with_param("min", min.to_string())
        .with_param("actual", actual.to_string())
    }

    /// String longer than `max`.
    pub fn max_length(max: usize, actual: usize) -> Self {
        Self::new(
            "max_length",
            "The field {name} must be a string with a maximum length of '{max}'.",
        )
        .with_param("max", max.to_string())
        .with_param("actual", actual.to_string())
    }

    /// String length outside `[min, max]`.
    pub fn length_range(min: usize, max: usize, actual: usize) -> Self {
        Self::new(
            "length",
            "The field {name} must be a string with a minimum length '{min}' and maximum length '{max}'.",
        )
        .with_param("min", min.to_string())
        .with_param("max", max.to_string())
        .with_param("actual", actual.to_string())
    }

    /// Value outside `[min, max]`.
    pub fn out_of_range(min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new("range", "The field {name} must be between {min} and {max}.")
            .with_param("min", min.to_string())
            .with_param("max", max.to_string())
    }

    /// Value not in the expected format.
    pub fn invalid_format(code: impl Into<Cow<'static, str>>, format: &'static str) -> Self {
        Self::new(code, "The {name} field is not a valid {format}.").with_param("format", format)
    }

    /// The value could not be viewed as the type a rule expects.
    pub fn type_mismatch(expected: &'static str) -> Self {
        Self::new("type_mismatch", "The {name} field must be a {expected}.")
            .with_param("expected", expected)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.members.as_slice() {
            [] => write!(f, "{}", self.message),
            members => write!(f, "[{}] {}", members.join(", "), self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// An ordered collection of failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failure.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All failures in report order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Failures targeting `member` exactly.
    pub fn for_member<'a>(&'a self, member: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors
            .iter()
            .filter(move |e| e.members.iter().any(|m| m == member))
    }

    /// Messages in report order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_ref()).collect()
    }

    /// Re-prefixes every member path with `prefix`, see [`crate::engine::path::repair`].
    pub fn repair(&mut self, prefix: Option<&str>) {
        crate::engine::path::repair(&mut self.errors, prefix);
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }

    /// `Ok(())` when empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// CRATE ERROR
// ============================================================================

/// Errors raised by the engine.
///
/// [`Error::Validation`] is recoverable and carries the first failure of a
/// `validate` call. Every other variant is a configuration error raised at
/// builder time, or a type mismatch at an erased boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{0}")]
    Validation(Box<ValidationError>),

    #[error(
        "a nested validator is already attached to {site}; use `{alternative}` to define the nested rules within a single validator"
    )]
    NestedValidatorAlreadySet {
        site: Cow<'static, str>,
        alternative: &'static str,
    },

    #[error("argument `{0}` must not be empty")]
    EmptyArgument(&'static str),

    #[error("value is not a `{expected}`")]
    TypeMismatch { expected: &'static str },
}

impl Error {
    /// The failure behind [`Error::Validation`].
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            _ => None,
        }
    }

    /// Whether this is a data-dependent failure rather than a misconfiguration.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Self::Validation(Box::new(error))
    }
}

/// Reports an engine fault as a failure record so it lands in the same report.
impl From<Error> for ValidationError {
    fn from(error: Error) -> Self {
        match error {
            Error::Validation(inner) => *inner,
            Error::TypeMismatch { expected } => Self::type_mismatch(expected),
            other => Self::new("engine_fault", other.to_string()),
        }
    }
}
