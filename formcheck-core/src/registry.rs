// formcheck-core/src/registry.rs
//! Rule name resolution.
//!
//! A rule name resolves first against the closed set of built-in rules and
//! then against functions registered by the caller. Built-in names cannot be
//! shadowed. A name that matches neither is a configuration error.
//!
//! License: MIT OR APACHE 2.0

use indexmap::IndexMap;
use log::debug;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::RuleArg;
use crate::errors::FormcheckError;
use crate::payload::Payload;
use crate::validators;

/// What a rule can see besides its argument and the value under test.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The field being validated.
    pub field: &'a str,
    /// The raw submitted payload, before sanitization.
    pub payload: &'a Payload,
}

impl<'a> RuleContext<'a> {
    pub fn new(field: &'a str, payload: &'a Payload) -> Self {
        Self { field, payload }
    }

    /// Raw text of another submitted field; empty when absent or a group.
    pub fn value_of(&self, name: &str) -> &'a str {
        self.payload.text(name).unwrap_or("")
    }
}

/// Signature of a caller-supplied rule.
pub type CustomRuleFn = Arc<dyn Fn(&RuleArg, &str, &RuleContext<'_>) -> bool + Send + Sync>;

/// The closed set of rules every registry knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinRule {
    Required,
    MinLength,
    MaxLength,
    RangeLength,
    Length,
    EqualTo,
    Email,
    Number,
    Digits,
    MinDigits,
}

impl BuiltinRule {
    pub const ALL: [BuiltinRule; 10] = [
        BuiltinRule::Required,
        BuiltinRule::MinLength,
        BuiltinRule::MaxLength,
        BuiltinRule::RangeLength,
        BuiltinRule::Length,
        BuiltinRule::EqualTo,
        BuiltinRule::Email,
        BuiltinRule::Number,
        BuiltinRule::Digits,
        BuiltinRule::MinDigits,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinRule::Required => "required",
            BuiltinRule::MinLength => "minlength",
            BuiltinRule::MaxLength => "maxlength",
            BuiltinRule::RangeLength => "rangelength",
            BuiltinRule::Length => "length",
            BuiltinRule::EqualTo => "equalto",
            BuiltinRule::Email => "email",
            BuiltinRule::Number => "number",
            BuiltinRule::Digits => "digits",
            BuiltinRule::MinDigits => "mindigits",
        }
    }

    /// One-line description, used by the CLI rule listing.
    pub fn description(self) -> &'static str {
        match self {
            BuiltinRule::Required => "with `true`, the value must not be empty",
            BuiltinRule::MinLength => "at least N characters",
            BuiltinRule::MaxLength => "at most N characters",
            BuiltinRule::RangeLength => "between [MIN, MAX] characters, inclusive",
            BuiltinRule::Length => "exactly N characters",
            BuiltinRule::EqualTo => "equal to the submitted value of another field",
            BuiltinRule::Email => "a plausible email address",
            BuiltinRule::Number => "a decimal number, optionally signed and comma-grouped",
            BuiltinRule::Digits => "ASCII digits only",
            BuiltinRule::MinDigits => "at least N digits, ignoring other characters",
        }
    }

    /// Evaluates the rule. Fails only when the argument has the wrong shape.
    pub fn check(self, arg: &RuleArg, value: &str, ctx: &RuleContext<'_>) -> Result<bool, FormcheckError> {
        let passed = match self {
            BuiltinRule::Required => arg.as_flag() != Some(true) || validators::is_present(value),
            BuiltinRule::MinLength => validators::meets_min_length(value, self.count_arg(arg, ctx)?),
            BuiltinRule::MaxLength => validators::meets_max_length(value, self.count_arg(arg, ctx)?),
            BuiltinRule::RangeLength => {
                let (min, max) = arg
                    .as_range()
                    .ok_or_else(|| self.invalid_arg(ctx, "a [min, max] pair of non-negative integers"))?;
                validators::within_length_range(value, min, max)
            }
            BuiltinRule::Length => validators::has_exact_length(value, self.count_arg(arg, ctx)?),
            BuiltinRule::EqualTo => {
                let other = arg
                    .as_text()
                    .ok_or_else(|| self.invalid_arg(ctx, "the name of another field"))?;
                ctx.value_of(other) == value
            }
            BuiltinRule::Email => validators::is_valid_email(value),
            BuiltinRule::Number => validators::is_valid_number(value),
            BuiltinRule::Digits => validators::is_all_digits(value),
            BuiltinRule::MinDigits => validators::has_min_digits(value, self.count_arg(arg, ctx)?),
        };
        Ok(passed)
    }

    /// Message used when a form declares none for this rule.
    pub fn default_message(self, arg: &RuleArg) -> String {
        match self {
            BuiltinRule::Required => "This field is required.".to_string(),
            BuiltinRule::MinLength => format!("Please enter at least {} characters.", arg),
            BuiltinRule::MaxLength => format!("Please enter no more than {} characters.", arg),
            BuiltinRule::RangeLength => match arg.as_range() {
                Some((min, max)) => {
                    format!("Please enter a value between {} and {} characters long.", min, max)
                }
                None => "Please enter a value of the allowed length.".to_string(),
            },
            BuiltinRule::Length => format!("Please enter exactly {} characters.", arg),
            BuiltinRule::EqualTo => "Please enter the same value again.".to_string(),
            BuiltinRule::Email => "Please enter a valid email address.".to_string(),
            BuiltinRule::Number => "Please enter a valid number.".to_string(),
            BuiltinRule::Digits => "Please enter only digits.".to_string(),
            BuiltinRule::MinDigits => format!("Please enter at least {} digits.", arg),
        }
    }

    fn count_arg(self, arg: &RuleArg, ctx: &RuleContext<'_>) -> Result<usize, FormcheckError> {
        arg.as_count()
            .ok_or_else(|| self.invalid_arg(ctx, "a non-negative integer"))
    }

    fn invalid_arg(self, ctx: &RuleContext<'_>, expected: &'static str) -> FormcheckError {
        FormcheckError::InvalidArgument {
            rule: self.name().to_string(),
            field: ctx.field.to_string(),
            expected,
        }
    }
}

impl FromStr for BuiltinRule {
    type Err = FormcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinRule::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| FormcheckError::UnknownRule(s.to_string()))
    }
}

impl fmt::Display for BuiltinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved rule, ready to be invoked.
#[derive(Clone)]
pub enum Rule {
    BuiltIn(BuiltinRule),
    Custom { name: String, check: CustomRuleFn },
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Rule::BuiltIn(rule) => rule.name(),
            Rule::Custom { name, .. } => name,
        }
    }

    pub fn check(&self, arg: &RuleArg, value: &str, ctx: &RuleContext<'_>) -> Result<bool, FormcheckError> {
        match self {
            Rule::BuiltIn(rule) => rule.check(arg, value, ctx),
            Rule::Custom { check, .. } => Ok(check(arg, value, ctx)),
        }
    }

    pub fn default_message(&self, arg: &RuleArg) -> String {
        match self {
            Rule::BuiltIn(rule) => rule.default_message(arg),
            Rule::Custom { .. } => "This field is invalid.".to_string(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::BuiltIn(rule) => f.debug_tuple("BuiltIn").field(rule).finish(),
            Rule::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish_non_exhaustive(),
        }
    }
}

/// Maps rule names to callables.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    custom: IndexMap<String, CustomRuleFn>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a caller-supplied rule. Registering a name twice replaces the
    /// earlier function; built-in names are rejected.
    pub fn register<F>(&mut self, name: &str, rule: F) -> Result<(), FormcheckError>
    where
        F: Fn(&RuleArg, &str, &RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        if BuiltinRule::from_str(name).is_ok() {
            return Err(FormcheckError::ReservedRuleName(name.to_string()));
        }
        if self.custom.insert(name.to_string(), Arc::new(rule)).is_some() {
            debug!("Replaced custom rule '{}'.", name);
        } else {
            debug!("Registered custom rule '{}'.", name);
        }
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.custom.shift_remove(name).is_some()
    }

    pub fn resolve(&self, name: &str) -> Result<Rule, FormcheckError> {
        if let Ok(builtin) = BuiltinRule::from_str(name) {
            return Ok(Rule::BuiltIn(builtin));
        }
        self.custom
            .get(name)
            .map(|check| Rule::Custom {
                name: name.to_string(),
                check: Arc::clone(check),
            })
            .ok_or_else(|| FormcheckError::UnknownRule(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        BuiltinRule::from_str(name).is_ok() || self.custom.contains_key(name)
    }

    /// Built-in names followed by custom names in registration order.
    pub fn names(&self) -> Vec<&str> {
        BuiltinRule::ALL
            .iter()
            .map(|rule| rule.name())
            .chain(self.custom.keys().map(String::as_str))
            .collect()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rule: &str, arg: RuleArg, value: &str) -> Result<bool, FormcheckError> {
        let payload = Payload::new().with("password", "secret").with("field", value);
        let ctx = RuleContext::new("field", &payload);
        RuleRegistry::new().resolve(rule)?.check(&arg, value, &ctx)
    }

    #[test]
    fn test_required() {
        assert!(!check("required", RuleArg::Flag(true), "").unwrap());
        assert!(check("required", RuleArg::Flag(true), "x").unwrap());
        assert!(check("required", RuleArg::Flag(false), "").unwrap());
        assert!(check("required", RuleArg::Text("true".into()), "").unwrap());
    }

    #[test]
    fn test_length_rules() {
        assert!(!check("minlength", RuleArg::Number(3), "ab").unwrap());
        assert!(check("minlength", RuleArg::Number(3), "abc").unwrap());
        assert!(check("maxlength", RuleArg::Number(3), "abc").unwrap());
        assert!(!check("maxlength", RuleArg::Number(3), "abcd").unwrap());
        assert!(check("length", RuleArg::from("4"), "abcd").unwrap());
        assert!(check("rangelength", RuleArg::from((2, 4)), "abc").unwrap());
        assert!(!check("rangelength", RuleArg::from((2, 4)), "abcde").unwrap());
    }

    #[test]
    fn test_equalto_reads_raw_payload() {
        assert!(check("equalto", RuleArg::from("password"), "secret").unwrap());
        assert!(!check("equalto", RuleArg::from("password"), "Secret").unwrap());
        assert!(check("equalto", RuleArg::from("missing"), "").unwrap());
    }

    #[test]
    fn test_wrong_argument_shape_is_configuration_error() {
        let err = check("minlength", RuleArg::Flag(true), "abc").unwrap_err();
        assert!(matches!(
            err,
            FormcheckError::InvalidArgument { ref rule, ref field, .. } if rule == "minlength" && field == "field"
        ));
        assert!(check("rangelength", RuleArg::Number(3), "abc").is_err());
        assert!(check("equalto", RuleArg::Number(3), "abc").is_err());
    }

    #[test]
    fn test_unknown_rule() {
        let err = RuleRegistry::new().resolve("zipcode").unwrap_err();
        assert!(matches!(err, FormcheckError::UnknownRule(name) if name == "zipcode"));
    }

    #[test]
    fn test_custom_rule_registration() {
        let mut registry = RuleRegistry::new();
        registry
            .register("starts_with", |arg, value, _ctx| {
                arg.as_text().is_some_and(|prefix| value.starts_with(prefix))
            })
            .unwrap();

        let payload = Payload::new();
        let ctx = RuleContext::new("code", &payload);
        let rule = registry.resolve("starts_with").unwrap();
        assert_eq!(rule.name(), "starts_with");
        assert!(rule.check(&RuleArg::from("AB"), "AB12", &ctx).unwrap());
        assert!(!rule.check(&RuleArg::from("AB"), "XY12", &ctx).unwrap());
        assert_eq!(rule.default_message(&RuleArg::None), "This field is invalid.");

        assert!(registry.names().ends_with(&["starts_with"]));
        assert!(registry.unregister("starts_with"));
        assert!(!registry.contains("starts_with"));
    }

    #[test]
    fn test_builtin_names_are_reserved() {
        let mut registry = RuleRegistry::new();
        let err = registry.register("required", |_, _, _| true).unwrap_err();
        assert!(matches!(err, FormcheckError::ReservedRuleName(name) if name == "required"));
    }

    #[test]
    fn test_default_messages_mention_arguments() {
        assert_eq!(
            BuiltinRule::MinLength.default_message(&RuleArg::Number(5)),
            "Please enter at least 5 characters."
        );
        assert_eq!(
            BuiltinRule::RangeLength.default_message(&RuleArg::from((2, 8))),
            "Please enter a value between 2 and 8 characters long."
        );
    }
}
