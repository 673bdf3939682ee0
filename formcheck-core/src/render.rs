//! Small rendering helpers for re-displaying a form with inline errors.
//!
//! The error label is a TinyTemplate with two placeholders, `{id}` and
//! `{message}`. Values are inserted unescaped: messages are authored by the
//! form, not submitted by the user, and may carry markup.

use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::errors::FormcheckError;

pub const DEFAULT_LABEL_TEMPLATE: &str = r#"<label for="{id}" class="error">{message}</label>"#;

/// CSS class added to fields that failed validation.
pub const ERROR_CLASS: &str = "error";

#[derive(Serialize)]
struct LabelContext<'a> {
    id: &'a str,
    message: &'a str,
}

/// A validated label template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTemplate {
    source: String,
}

impl LabelTemplate {
    /// Parses `source` and checks that it renders with the label placeholders.
    pub fn new(source: impl Into<String>) -> Result<Self, FormcheckError> {
        let template = Self { source: source.into() };
        template.render("id", "message")?;
        Ok(template)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, id: &str, message: &str) -> Result<String, FormcheckError> {
        let mut tt = TinyTemplate::new();
        tt.set_default_formatter(&tinytemplate::format_unescaped);
        tt.add_template("label", &self.source)
            .map_err(|e| FormcheckError::InvalidTemplate(e.to_string()))?;
        tt.render("label", &LabelContext { id, message })
            .map_err(|e| FormcheckError::InvalidTemplate(e.to_string()))
    }
}

impl Default for LabelTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_LABEL_TEMPLATE.to_string(),
        }
    }
}

/// Joins `base` tokens with the error token when `has_error` is set.
pub fn class_list(base: &[&str], has_error: bool) -> String {
    let mut tokens: Vec<&str> = base.iter().copied().filter(|t| !t.trim().is_empty()).collect();
    if has_error {
        tokens.push(ERROR_CLASS);
    }
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label() {
        let label = LabelTemplate::default().render("email", "Bad <b>email</b>").unwrap();
        assert_eq!(label, r#"<label for="email" class="error">Bad <b>email</b></label>"#);
    }

    #[test]
    fn test_custom_template() {
        let template = LabelTemplate::new(r#"<span class="help" data-for="{id}">{message}</span>"#).unwrap();
        assert_eq!(
            template.render("name", "Required").unwrap(),
            r#"<span class="help" data-for="name">Required</span>"#
        );
    }

    #[test]
    fn test_template_with_unknown_placeholder_is_rejected() {
        let err = LabelTemplate::new("{field}").unwrap_err();
        assert!(matches!(err, FormcheckError::InvalidTemplate(_)));
    }

    #[test]
    fn test_class_list() {
        assert_eq!(class_list(&[], false), "");
        assert_eq!(class_list(&[], true), "error");
        assert_eq!(class_list(&["input", "wide"], true), "input wide error");
        assert_eq!(class_list(&["input", " "], false), "input");
    }
}
