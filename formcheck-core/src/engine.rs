// formcheck-core/src/engine.rs
//! The rule engine: evaluates compiled rules against a raw payload.
//!
//! For each field, rules run in declaration order and stop at the first
//! failure, whose message becomes the field's error. A field that passes
//! every rule has its raw value committed to the clean view. Nothing is
//! written anywhere until the whole pass has succeeded; the engine produces a
//! [`ValidationReport`] that the session applies.
//!
//! License: MIT OR APACHE 2.0

use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::compiler::{compile_field, compile_options, CompiledField};
use crate::config::{RuleSpec, ValidationOptions};
use crate::errors::FormcheckError;
use crate::payload::{FieldValue, Payload};
use crate::registry::{RuleContext, RuleRegistry};

/// Set `FORMCHECK_ALLOW_DEBUG_PII=true` to see submitted values in debug logs.
static PII_DEBUG_ALLOWED: Lazy<bool> = Lazy::new(|| {
    std::env::var("FORMCHECK_ALLOW_DEBUG_PII")
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

pub fn redact_value(s: &str) -> String {
    const MAX_LEN: usize = 8;
    let len = s.chars().count();
    if len <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", len)
    }
}

fn loggable(value: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        value.to_string()
    } else {
        redact_value(value)
    }
}

/// The result of running one field's rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldOutcome {
    Valid,
    Invalid { rule: String, message: String },
}

impl FieldOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldOutcome::Valid)
    }
}

/// Everything one validation pass decided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Field name to the message of its first failing rule.
    pub errors: IndexMap<String, String>,
    /// Raw values of fields that passed every rule, to be committed to the clean view.
    pub passed: IndexMap<String, FieldValue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Evaluates rules resolved through a [`RuleRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> RuleEngine<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Runs every field of `options` against `payload`.
    ///
    /// Unknown rule names fail the pass before any field is evaluated.
    pub fn run(&self, options: &ValidationOptions, payload: &Payload) -> Result<ValidationReport, FormcheckError> {
        let form = compile_options(options, self.registry)?;
        let mut report = ValidationReport::default();

        for field in &form.fields {
            match self.evaluate(field, options, payload)? {
                FieldOutcome::Valid => {
                    let raw = payload
                        .get(field.name)
                        .cloned()
                        .unwrap_or_else(|| FieldValue::Text(String::new()));
                    report.passed.insert(field.name.to_string(), raw);
                }
                FieldOutcome::Invalid { message, .. } => {
                    report.errors.insert(field.name.to_string(), message);
                }
            }
        }

        debug!(
            "Validation pass finished: {} passed, {} failed.",
            report.passed.len(),
            report.errors.len()
        );
        Ok(report)
    }

    /// Runs one field's rules. Messages are looked up in `options`.
    pub fn apply(
        &self,
        field: &str,
        spec: &RuleSpec,
        options: &ValidationOptions,
        payload: &Payload,
    ) -> Result<FieldOutcome, FormcheckError> {
        let compiled = compile_field(field, spec, self.registry)?;
        self.evaluate(&compiled, options, payload)
    }

    fn evaluate(
        &self,
        field: &CompiledField<'_>,
        options: &ValidationOptions,
        payload: &Payload,
    ) -> Result<FieldOutcome, FormcheckError> {
        let value = match payload.get(field.name) {
            Some(FieldValue::Text(text)) => text.as_str(),
            Some(FieldValue::Group(_)) => {
                warn!(
                    "Field '{}' was submitted as a group; its rules see an empty value.",
                    field.name
                );
                ""
            }
            None => "",
        };
        let ctx = RuleContext::new(field.name, payload);

        for compiled in &field.rules {
            let arg = compiled.arg.resolve();
            let rule_name = compiled.rule.name();

            if compiled.rule.check(&arg, value, &ctx)? {
                debug!("Field '{}' passed rule '{}'.", field.name, rule_name);
                continue;
            }

            let message = match options.message_for(field.name, rule_name) {
                Some(spec) => spec.resolve(&arg, value, field.name),
                None => {
                    debug!(
                        "No message configured for '{}' on field '{}'; using the default.",
                        rule_name, field.name
                    );
                    compiled.rule.default_message(&arg)
                }
            };
            debug!(
                "Field '{}' failed rule '{}' with value {}.",
                field.name,
                rule_name,
                loggable(value)
            );
            return Ok(FieldOutcome::Invalid {
                rule: rule_name.to_string(),
                message,
            });
        }

        Ok(FieldOutcome::Valid)
    }
}
