//! Field-level validation shared by the telemetry entities.

use thiserror::Error;

/// Errors raised when a params object fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent, `null`, or blank.
    #[error("missing required field `{field}`")]
    Missing {
        /// Wire name of the field.
        field: &'static str,
    },
    /// A field was present but its value is not acceptable.
    #[error("invalid field `{field}`: {reason}")]
    Invalid {
        /// Wire name of the field.
        field: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The params value did not match the expected schema.
    #[error("malformed params: {message}")]
    Malformed {
        /// Deserializer message.
        message: String,
    },
}

impl ValidationError {
    /// Creates a missing field error.
    #[must_use]
    pub const fn missing(field: &'static str) -> Self {
        Self::Missing { field }
    }

    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a malformed params error from a deserializer failure.
    #[must_use]
    pub fn malformed(source: &serde_json::Error) -> Self {
        Self::Malformed {
            message: source.to_string(),
        }
    }

    /// Returns the offending field, when one is known.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Missing { field } | Self::Invalid { field, .. } => Some(field),
            Self::Malformed { .. } => None,
        }
    }
}

/// Ensures an identifying string is present and not blank.
pub(crate) fn require_text(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or(ValidationError::missing(field))
}

/// Rejects blank strings in fields that were already deserialized.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}

/// Rejects NaN and infinities.
pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::invalid(field, "value must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None)]
    #[case(Some(String::new()))]
    #[case(Some("   ".to_owned()))]
    fn require_text_rejects_absent_or_blank(#[case] value: Option<String>) {
        assert_eq!(
            require_text("key", value),
            Err(ValidationError::missing("key"))
        );
    }

    #[rstest]
    fn require_finite_rejects_nan() {
        let error = require_finite("value", f64::NAN).expect_err("NaN should fail");
        assert_eq!(error.field(), Some("value"));
    }
}
