//! errors.rs - Custom error types for the formcheck-core library.
//!
//! Only configuration mistakes are errors here. A field that fails one of its
//! rules is not an error: it is recorded in the session's error map.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `formcheck-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FormcheckError {
    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),

    #[error("Rule '{rule}' on field '{field}' expects {expected}")]
    InvalidArgument {
        rule: String,
        field: String,
        expected: &'static str,
    },

    #[error("Rule name '{0}' is reserved by a built-in rule")]
    ReservedRuleName(String),

    #[error("Invalid label template: {0}")]
    InvalidTemplate(String),

    #[error("Failed to load validation options from '{path}': {reason}")]
    OptionsLoad { path: String, reason: String },
}

impl FormcheckError {
    /// True for errors raised while a form's rules are being resolved or run,
    /// as opposed to errors from registering rules or loading option files.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FormcheckError::UnknownRule(_) | FormcheckError::InvalidArgument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rule_message() {
        let err = FormcheckError::UnknownRule("zipcode".to_string());
        assert_eq!(err.to_string(), "Unknown validation rule: zipcode");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_setup_errors_are_not_configuration() {
        assert!(!FormcheckError::ReservedRuleName("email".to_string()).is_configuration());
        let err = FormcheckError::OptionsLoad {
            path: "forms/signup.yaml".to_string(),
            reason: "a field has an empty name".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load validation options from 'forms/signup.yaml': a field has an empty name"
        );
        assert!(!err.is_configuration());
    }
}
