//! Configuration management for `formcheck-core`.
//!
//! This module defines the declarative contract for one form: which rules run
//! on which field, in what order, with what arguments, and which message is
//! shown when a rule fails. Options are built in code with the builder methods
//! on [`ValidationOptions`] or loaded from YAML:
//!
//! ```yaml
//! rules:
//!   email:
//!     required: true
//!     email: ~
//! messages:
//!   email:
//!     required: "Please enter your email address."
//! ```
//!
//! Arguments and messages can also be deferred: computed when the rule runs
//! rather than when the options are built.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::FormcheckError;

/// A concrete rule argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleArg {
    #[default]
    None,
    Flag(bool),
    Number(i64),
    Text(String),
    List(Vec<RuleArg>),
}

impl RuleArg {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            RuleArg::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RuleArg::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// A non-negative count, given as a number or as numeric text.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            RuleArg::Number(n) => usize::try_from(*n).ok(),
            RuleArg::Text(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        }
    }

    /// A `[min, max]` pair of counts.
    pub fn as_range(&self) -> Option<(usize, usize)> {
        match self {
            RuleArg::List(items) if items.len() == 2 => {
                Some((items[0].as_count()?, items[1].as_count()?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for RuleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleArg::None => Ok(()),
            RuleArg::Flag(b) => write!(f, "{}", b),
            RuleArg::Number(n) => write!(f, "{}", n),
            RuleArg::Text(s) => write!(f, "{}", s),
            RuleArg::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<bool> for RuleArg {
    fn from(value: bool) -> Self {
        RuleArg::Flag(value)
    }
}

impl From<i64> for RuleArg {
    fn from(value: i64) -> Self {
        RuleArg::Number(value)
    }
}

impl From<i32> for RuleArg {
    fn from(value: i32) -> Self {
        RuleArg::Number(i64::from(value))
    }
}

impl From<usize> for RuleArg {
    fn from(value: usize) -> Self {
        RuleArg::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for RuleArg {
    fn from(value: &str) -> Self {
        RuleArg::Text(value.to_string())
    }
}

impl From<String> for RuleArg {
    fn from(value: String) -> Self {
        RuleArg::Text(value)
    }
}

impl From<()> for RuleArg {
    fn from(_: ()) -> Self {
        RuleArg::None
    }
}

impl<T: Into<RuleArg>> From<(T, T)> for RuleArg {
    fn from((a, b): (T, T)) -> Self {
        RuleArg::List(vec![a.into(), b.into()])
    }
}

/// A value that is either fixed up front or produced when it is needed.
pub enum Deferred<T> {
    Literal(T),
    Computed(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Deferred<T> {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Deferred::Computed(Arc::new(f))
    }

    /// Produces the concrete value. Computed values are re-evaluated on every call.
    pub fn resolve(&self) -> T {
        match self {
            Deferred::Literal(v) => v.clone(),
            Deferred::Computed(f) => f(),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Deferred::Computed(_))
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        match self {
            Deferred::Literal(v) => Deferred::Literal(v.clone()),
            Deferred::Computed(f) => Deferred::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Deferred::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// The argument of one rule in a [`RuleSpec`].
pub type ArgSpec = Deferred<RuleArg>;

/// Produces a message from `(argument, value, field_name)`.
pub type MessageFn = Arc<dyn Fn(&RuleArg, &str, &str) -> String + Send + Sync>;

/// The message shown when a rule fails.
#[derive(Clone)]
pub enum MessageSpec {
    Literal(String),
    Deferred(MessageFn),
}

impl MessageSpec {
    pub fn resolve(&self, arg: &RuleArg, value: &str, field: &str) -> String {
        match self {
            MessageSpec::Literal(s) => s.clone(),
            MessageSpec::Deferred(f) => f(arg, value, field),
        }
    }
}

impl fmt::Debug for MessageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSpec::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            MessageSpec::Deferred(_) => f.write_str("Deferred(<fn>)"),
        }
    }
}

impl From<&str> for MessageSpec {
    fn from(value: &str) -> Self {
        MessageSpec::Literal(value.to_string())
    }
}

impl From<String> for MessageSpec {
    fn from(value: String) -> Self {
        MessageSpec::Literal(value)
    }
}

/// The ordered rules of one field. Order is both execution order and
/// short-circuit priority.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    rules: IndexMap<String, ArgSpec>,
}

impl RuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule, or replaces the argument of an already declared rule in place.
    pub fn push(&mut self, rule: impl Into<String>, arg: ArgSpec) {
        self.rules.insert(rule.into(), arg);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgSpec)> {
        self.rules.iter().map(|(name, arg)| (name.as_str(), arg))
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The full declarative contract for one form.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    rules: IndexMap<String, RuleSpec>,
    messages: IndexMap<String, IndexMap<String, MessageSpec>>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rule` with a fixed argument to `field`.
    pub fn rule(mut self, field: &str, rule: &str, arg: impl Into<RuleArg>) -> Self {
        self.add_rule(field, rule, Deferred::Literal(arg.into()));
        self
    }

    /// Adds `rule` to `field` with an argument computed at validation time.
    pub fn computed_rule<F>(mut self, field: &str, rule: &str, arg: F) -> Self
    where
        F: Fn() -> RuleArg + Send + Sync + 'static,
    {
        self.add_rule(field, rule, Deferred::computed(arg));
        self
    }

    pub fn message(mut self, field: &str, rule: &str, message: impl Into<MessageSpec>) -> Self {
        self.set_message(field, rule, message.into());
        self
    }

    /// Sets a message produced from `(argument, value, field_name)` when the rule fails.
    pub fn deferred_message<F>(mut self, field: &str, rule: &str, message: F) -> Self
    where
        F: Fn(&RuleArg, &str, &str) -> String + Send + Sync + 'static,
    {
        self.set_message(field, rule, MessageSpec::Deferred(Arc::new(message)));
        self
    }

    pub fn add_rule(&mut self, field: &str, rule: &str, arg: ArgSpec) {
        self.rules.entry(field.to_string()).or_default().push(rule, arg);
    }

    pub fn set_message(&mut self, field: &str, rule: &str, message: MessageSpec) {
        self.messages
            .entry(field.to_string())
            .or_default()
            .insert(rule.to_string(), message);
    }

    /// Fields and their rule specs, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.rules.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn rules_for(&self, field: &str) -> Option<&RuleSpec> {
        self.rules.get(field)
    }

    pub fn message_for(&self, field: &str, rule: &str) -> Option<&MessageSpec> {
        self.messages.get(field).and_then(|m| m.get(rule))
    }

    pub fn field_count(&self) -> usize {
        self.rules.len()
    }

    /// Parses options from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: OptionsFile = serde_yml::from_str(yaml).context("Failed to parse validation options")?;
        file.check_names()?;
        Ok(file.into())
    }

    /// Loads options from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading validation options from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let file: OptionsFile = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse options file {}", path.display()))?;

        file.check_names().map_err(|e| match e {
            FormcheckError::OptionsLoad { reason, .. } => FormcheckError::OptionsLoad {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        let options: ValidationOptions = file.into();
        info!("Loaded rules for {} field(s) from {}.", options.field_count(), path.display());
        Ok(options)
    }
}

/// The serialized form of [`ValidationOptions`]. Only literal arguments and
/// messages can be expressed here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsFile {
    pub rules: IndexMap<String, IndexMap<String, RuleArg>>,
    pub messages: IndexMap<String, IndexMap<String, String>>,
}

impl OptionsFile {
    fn check_names(&self) -> Result<(), FormcheckError> {
        let mut problems = Vec::new();
        for (field, rules) in &self.rules {
            if field.trim().is_empty() {
                problems.push("a field has an empty name".to_string());
            }
            if rules.is_empty() {
                warn!("Field '{}' declares no rules; it will always pass.", field);
            }
            for rule in rules.keys() {
                if rule.trim().is_empty() {
                    problems.push(format!("field '{}' has a rule with an empty name", field));
                }
            }
        }
        for (field, messages) in &self.messages {
            if !self.rules.contains_key(field) {
                warn!("Messages declared for field '{}' which has no rules.", field);
            }
            for rule in messages.keys() {
                if !self.rules.get(field).is_some_and(|r| r.contains_key(rule)) {
                    debug!("Message for '{}.{}' has no matching rule.", field, rule);
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(FormcheckError::OptionsLoad {
                path: "<inline>".to_string(),
                reason: problems.join("; "),
            })
        }
    }
}

impl From<OptionsFile> for ValidationOptions {
    fn from(file: OptionsFile) -> Self {
        let mut options = ValidationOptions::new();
        for (field, rules) in file.rules {
            for (rule, arg) in rules {
                options.add_rule(&field, &rule, Deferred::Literal(arg));
            }
        }
        for (field, messages) in file.messages {
            for (rule, message) in messages {
                options.set_message(&field, &rule, MessageSpec::Literal(message));
            }
        }
        options
    }
}

/// Merges two option sets. Overlay rule specs replace base specs per field;
/// overlay messages replace base messages per (field, rule).
pub fn merge_options(base: ValidationOptions, overlay: ValidationOptions) -> ValidationOptions {
    debug!(
        "merge_options called. Base fields: {}, overlay fields: {}",
        base.rules.len(),
        overlay.rules.len()
    );
    let mut merged = base;
    for (field, spec) in overlay.rules {
        merged.rules.insert(field, spec);
    }
    for (field, messages) in overlay.messages {
        let entry = merged.messages.entry(field).or_default();
        for (rule, message) in messages {
            entry.insert(rule, message);
        }
    }
    debug!("Final field count after merge: {}", merged.rules.len());
    merged
}

/// Directories searched for a named form definition, most specific first.
pub fn form_candidate_paths(name: &str) -> Vec<PathBuf> {
    let base_dirs = vec![
        dirs::home_dir().map(|p| p.join(".formcheck").join("forms")),
        dirs::config_dir().map(|p| p.join("formcheck").join("forms")),
        Some(PathBuf::from("./forms")),
    ];

    base_dirs
        .into_iter()
        .flatten()
        .map(|dir| dir.join(format!("{}.yaml", name)))
        .collect()
}

/// Loads options from a file path, or by form name from the candidate directories.
pub fn load_form_by_name(name_or_path: &str) -> Result<ValidationOptions> {
    debug!("Attempting to load form options from: '{}'", name_or_path);

    let path_to_load = {
        let path = Path::new(name_or_path);
        if path.is_file() {
            Some(path.to_path_buf())
        } else {
            form_candidate_paths(name_or_path).into_iter().find(|p| p.is_file())
        }
    }
    .with_context(|| {
        format!(
            "Form '{}' not found. It is not a file path, and was not found in expected locations.",
            name_or_path
        )
    })?;

    ValidationOptions::load_from_file(&path_to_load)
}
