// formcheck-core/src/session.rs
//! The per-request validation session.
//!
//! A session is created once per incoming request from the submission flag
//! and the raw payload. If a submission occurred, the payload is sanitized
//! immediately into a clean view and an escaped view. `validate` then runs a
//! form's rules, recording errors and committing the raw values of passing
//! fields into the clean view, and the query methods answer what a template
//! needs to re-render the form.
//!
//! License: MIT OR APACHE 2.0

use indexmap::IndexMap;
use log::{debug, warn};

use crate::config::ValidationOptions;
use crate::engine::{RuleEngine, ValidationReport};
use crate::errors::FormcheckError;
use crate::payload::{FieldValue, Payload};
use crate::registry::RuleRegistry;
use crate::render::{class_list, LabelTemplate};
use crate::sanitizers::{build_views, SanitizeMode};

/// Whether a request made with `method` carries a form submission.
pub fn is_submission_method(method: &str) -> bool {
    method.trim().eq_ignore_ascii_case("POST")
}

#[derive(Debug, Clone)]
pub struct ValidationSession {
    submitted: bool,
    raw: Payload,
    clean: Payload,
    escaped: Payload,
    errors: IndexMap<String, String>,
    registry: RuleRegistry,
    label_template: LabelTemplate,
}

impl ValidationSession {
    /// Creates a session with passthrough sanitization.
    pub fn new(submitted: bool, raw: Payload) -> Self {
        Self::with_sanitize_mode(submitted, raw, SanitizeMode::default())
    }

    pub fn with_sanitize_mode(submitted: bool, raw: Payload, mode: SanitizeMode) -> Self {
        let (clean, escaped) = if submitted {
            build_views(&raw, mode)
        } else {
            debug!("No submission; skipping sanitization.");
            (Payload::new(), Payload::new())
        };

        Self {
            submitted,
            raw,
            clean,
            escaped,
            errors: IndexMap::new(),
            registry: RuleRegistry::new(),
            label_template: LabelTemplate::default(),
        }
    }

    /// Creates a session from a request method; only `POST` counts as a submission.
    pub fn from_request(method: &str, raw: Payload) -> Self {
        Self::from_request_with_mode(method, raw, SanitizeMode::default())
    }

    pub fn from_request_with_mode(method: &str, raw: Payload, mode: SanitizeMode) -> Self {
        Self::with_sanitize_mode(is_submission_method(method), raw, mode)
    }

    /// Replaces the rule registry, e.g. with one prepared once at startup.
    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn set_label_template(&mut self, template: &str) -> Result<(), FormcheckError> {
        self.label_template = LabelTemplate::new(template)?;
        Ok(())
    }

    /// Runs the rules of `options` against the submitted payload.
    ///
    /// Without a submission nothing runs and no rule name is resolved. Each
    /// call replaces the previous errors. On a configuration error the session
    /// is left unchanged.
    pub fn validate(&mut self, options: &ValidationOptions) -> Result<(), FormcheckError> {
        if !self.submitted {
            debug!("Validation skipped: no submission.");
            return Ok(());
        }

        let report = RuleEngine::new(&self.registry).run(options, &self.raw)?;
        self.apply_report(report);
        Ok(())
    }

    fn apply_report(&mut self, report: ValidationReport) {
        let ValidationReport { errors, passed } = report;
        for (field, value) in passed {
            self.clean.insert(field, value);
        }
        if !errors.is_empty() {
            warn!("Form has {} invalid field(s).", errors.len());
        }
        self.errors = errors;
    }

    /// True when a submission occurred and no field has an error.
    pub fn is_valid(&self) -> bool {
        self.submitted && !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// HTML-escaped value for re-display; empty when absent or a group.
    pub fn escaped_value(&self, name: &str) -> &str {
        self.escaped.text(name).unwrap_or("")
    }

    /// Whether the clean value of `name` loosely equals `value`.
    pub fn is_checked(&self, name: &str, value: &str) -> bool {
        self.clean
            .get(name)
            .is_some_and(|current| current.loosely_equals(value))
    }

    /// `checked="checked"` for a checked checkbox or radio, otherwise empty.
    pub fn checked_attr(&self, name: &str, value: &str) -> &'static str {
        if self.is_checked(name, value) {
            r#"checked="checked""#
        } else {
            ""
        }
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// The rendered error label for `name`, or an empty string.
    pub fn error_label(&self, name: &str) -> String {
        self.error_label_for(name, "")
    }

    /// Like [`error_label`](Self::error_label) with an explicit element id;
    /// an empty id falls back to the field name.
    pub fn error_label_for(&self, name: &str, element_id: &str) -> String {
        let Some(message) = self.error(name) else {
            return String::new();
        };
        let id = if element_id.is_empty() { name } else { element_id };
        self.label_template.render(id, message).unwrap_or_else(|e| {
            warn!("Failed to render error label for '{}': {}", name, e);
            String::new()
        })
    }

    /// Space-separated class tokens for `name`: `error` when it has an error.
    pub fn error_class(&self, name: &str) -> String {
        self.error_class_with(name, &[])
    }

    /// Like [`error_class`](Self::error_class), after the caller's own tokens.
    pub fn error_class_with(&self, name: &str, base: &[&str]) -> String {
        class_list(base, self.errors.contains_key(name))
    }

    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    pub fn clean(&self) -> &Payload {
        &self.clean
    }

    pub fn clean_value(&self, name: &str) -> Option<&FieldValue> {
        self.clean.get(name)
    }

    pub fn escaped(&self) -> &Payload {
        &self.escaped
    }

    /// The payload as submitted, before sanitization.
    pub fn raw(&self) -> &Payload {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> ValidationOptions {
        ValidationOptions::new()
            .rule("email", "required", true)
            .rule("email", "email", ())
            .rule("password", "required", true)
            .rule("password", "minlength", 6)
            .rule("confirm", "equalto", "password")
            .message("email", "required", "Email is required")
            .message("email", "email", "Email looks wrong")
            .message("confirm", "equalto", "Passwords differ")
    }

    #[test]
    fn test_valid_submission() {
        let payload = Payload::new()
            .with("email", "user@example.com")
            .with("password", "secret1")
            .with("confirm", "secret1");
        let mut session = ValidationSession::new(true, payload);
        session.validate(&signup()).unwrap();

        assert!(session.is_valid());
        assert!(!session.has_errors());
        assert_eq!(session.error_label("email"), "");
        assert_eq!(session.error_class("email"), "");
    }

    #[test]
    fn test_invalid_submission_renders_errors() {
        let payload = Payload::new()
            .with("email", "nope")
            .with("password", "secret1")
            .with("confirm", "Secret1");
        let mut session = ValidationSession::new(true, payload);
        session.validate(&signup()).unwrap();

        assert!(!session.is_valid());
        assert_eq!(session.error("email"), Some("Email looks wrong"));
        assert_eq!(session.error("confirm"), Some("Passwords differ"));
        assert_eq!(session.error("password"), None);
        assert_eq!(
            session.error_label_for("confirm", "confirm-input"),
            r#"<label for="confirm-input" class="error">Passwords differ</label>"#
        );
        assert_eq!(session.error_class_with("email", &["field"]), "field error");
    }

    #[test]
    fn test_not_submitted_is_never_valid() {
        let mut session = ValidationSession::new(false, Payload::new().with("email", "x"));
        session.validate(&signup()).unwrap();
        assert!(!session.is_valid());
        assert!(!session.has_errors());
        assert!(session.clean().is_empty());
        assert_eq!(session.escaped_value("email"), "");
    }

    #[test]
    fn test_from_request_method() {
        assert!(ValidationSession::from_request("post", Payload::new()).is_submitted());
        assert!(!ValidationSession::from_request("GET", Payload::new()).is_submitted());
        assert!(is_submission_method(" POST "));
        assert!(!is_submission_method("PUT"));
    }

    #[test]
    fn test_from_request_with_mode_sanitizes() {
        let raw = Payload::new().with("name", r"O\'Brien");
        let session = ValidationSession::from_request_with_mode("POST", raw, SanitizeMode::StripSlashes);
        assert_eq!(session.clean().text("name"), Some("O'Brien"));

        let raw = Payload::new().with("name", r"O\'Brien");
        let session = ValidationSession::from_request_with_mode("GET", raw, SanitizeMode::StripSlashes);
        assert!(!session.is_submitted());
        assert!(session.clean().is_empty());
    }

    #[test]
    fn test_checked_state() {
        let payload = Payload::new().with("newsletter", "1").with("plan", "pro");
        let session = ValidationSession::new(true, payload);
        assert!(session.is_checked("newsletter", "1"));
        assert_eq!(session.checked_attr("plan", "pro"), r#"checked="checked""#);
        assert_eq!(session.checked_attr("plan", "basic"), "");
        assert!(!session.is_checked("missing", ""));
    }

    #[test]
    fn test_custom_label_template() {
        let mut session = ValidationSession::new(true, Payload::new());
        session.set_label_template(r#"<em id="{id}-error">{message}</em>"#).unwrap();
        session
            .validate(&ValidationOptions::new().rule("name", "required", true))
            .unwrap();
        assert_eq!(
            session.error_label("name"),
            r#"<em id="name-error">This field is required.</em>"#
        );
        assert!(session.set_label_template("{oops}").is_err());
    }
}
