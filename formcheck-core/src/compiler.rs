//! compiler.rs - Resolves every rule name of a form before any field runs.
//!
//! Compiling first means a misnamed rule is reported before a single field is
//! marked invalid, no matter where in the form it appears.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};

use crate::config::{ArgSpec, RuleSpec, ValidationOptions};
use crate::errors::FormcheckError;
use crate::registry::{Rule, RuleRegistry};

/// A rule resolved against a registry, paired with its declared argument.
#[derive(Debug)]
pub struct CompiledRule<'o> {
    pub rule: Rule,
    pub arg: &'o ArgSpec,
}

/// The resolved rules of one field, in declaration order.
#[derive(Debug)]
pub struct CompiledField<'o> {
    pub name: &'o str,
    pub rules: Vec<CompiledRule<'o>>,
}

/// A whole form, resolved and ready to evaluate.
#[derive(Debug)]
pub struct CompiledForm<'o> {
    pub fields: Vec<CompiledField<'o>>,
    pub options: &'o ValidationOptions,
}

/// Resolves the rules of a single field.
pub fn compile_field<'o>(
    name: &'o str,
    spec: &'o RuleSpec,
    registry: &RuleRegistry,
) -> Result<CompiledField<'o>, FormcheckError> {
    let rules = spec
        .iter()
        .map(|(rule_name, arg)| {
            registry
                .resolve(rule_name)
                .map(|rule| CompiledRule { rule, arg })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompiledField { name, rules })
}

/// Resolves every rule of every field.
///
/// All unknown names are logged together; the first one in declaration order
/// is returned as the error.
pub fn compile_options<'o>(
    options: &'o ValidationOptions,
    registry: &RuleRegistry,
) -> Result<CompiledForm<'o>, FormcheckError> {
    debug!("Starting compilation of rules for {} field(s).", options.field_count());

    let mut fields = Vec::with_capacity(options.field_count());
    let mut unknown: Vec<(&str, &str)> = Vec::new();

    for (name, spec) in options.fields() {
        let mut rules = Vec::with_capacity(spec.len());
        for (rule_name, arg) in spec.iter() {
            match registry.resolve(rule_name) {
                Ok(rule) => rules.push(CompiledRule { rule, arg }),
                Err(FormcheckError::UnknownRule(_)) => {
                    unknown.push((name, rule_name));
                }
                Err(other) => return Err(other),
            }
        }
        fields.push(CompiledField { name, rules });
    }

    if let Some((_, first_rule)) = unknown.first() {
        let listed = unknown
            .iter()
            .map(|(field, rule)| format!("'{}' on field '{}'", rule, field))
            .collect::<Vec<String>>()
            .join(", ");
        warn!("Failed to compile {} rule(s): {}", unknown.len(), listed);
        return Err(FormcheckError::UnknownRule(first_rule.to_string()));
    }

    debug!("Finished compiling rules for {} field(s).", fields.len());
    Ok(CompiledForm { fields, options })
}
