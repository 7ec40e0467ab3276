//! Validation outcome types: one error per failed check, aggregated into a result.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One field-level or request-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    property_name: String,
    error_message: String,
}

impl ValidationError {
    pub fn new(property_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            error_message: error_message.into(),
        }
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property_name, self.error_message)
    }
}

/// Outcome of validating one request. Valid iff there are no errors.
///
/// Errors keep insertion order: validator order first, then each validator's own order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ValidationResultRepr", into = "ValidationResultRepr")]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// The shared "no errors" value. Any empty result is equivalent to it.
    pub const SUCCESS: ValidationResult = ValidationResult { errors: Vec::new() };

    pub const fn success() -> Self {
        Self::SUCCESS
    }

    pub fn failure(errors: impl IntoIterator<Item = ValidationError>) -> Self {
        Self {
            errors: errors.into_iter().collect(),
        }
    }

    /// Result reported when a request is absent.
    pub fn null_request() -> Self {
        Self::failure([ValidationError::new("Request", "Request cannot be null")])
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<Option<Vec<ValidationError>>> for ValidationResult {
    fn from(errors: Option<Vec<ValidationError>>) -> Self {
        errors.map(Self::from).unwrap_or_default()
    }
}

impl From<Vec<ValidationError>> for ValidationResult {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl From<ValidationError> for ValidationResult {
    fn from(error: ValidationError) -> Self {
        Self::failure([error])
    }
}

/// Concatenates results in iteration order.
impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().flat_map(|r| r.errors).collect(),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("valid");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Wire shape: `{ "isValid": bool, "errors": [...] }`. `isValid` is derived on read.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationResultRepr {
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    errors: Vec<ValidationError>,
}

impl From<ValidationResultRepr> for ValidationResult {
    fn from(repr: ValidationResultRepr) -> Self {
        Self {
            errors: repr.errors,
        }
    }
}

impl From<ValidationResult> for ValidationResultRepr {
    fn from(result: ValidationResult) -> Self {
        Self {
            is_valid: result.is_valid(),
            errors: result.errors,
        }
    }
}
