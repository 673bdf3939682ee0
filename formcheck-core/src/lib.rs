// formcheck-core/src/lib.rs
//! # formcheck Core Library
//!
//! `formcheck-core` validates a submitted form payload against a declarative
//! rule set and keeps what a template needs to re-render the form: the
//! submitted values escaped for display, the validated values for storage,
//! and one error message per invalid field.
//!
//! The library performs no I/O on the request path. The caller, typically a
//! web framework handler, supplies the submission flag and the raw payload.
//!
//! ## Modules
//!
//! * `payload`: The ordered, nested payload model and its JSON boundary.
//! * `sanitizers`: The pipeline that derives the clean and escaped views.
//! * `validators`: Predicates behind the built-in rules.
//! * `registry`: Rule name resolution, built-in and caller-supplied.
//! * `config`: `ValidationOptions`, deferred arguments and messages, YAML loading.
//! * `compiler`: Resolves every rule of a form before evaluation starts.
//! * `engine`: Runs compiled rules with per-field short-circuiting.
//! * `session`: The per-request aggregate and its query API.
//! * `render`: The error label template and CSS class list.
//!
//! ## Usage Example
//!
//! ```rust
//! use formcheck_core::{Payload, ValidationOptions, ValidationSession};
//!
//! let payload = Payload::new()
//!     .with("email", "user@example.com")
//!     .with("password", "hunter22")
//!     .with("confirm", "hunter2");
//!
//! let options = ValidationOptions::new()
//!     .rule("email", "required", true)
//!     .rule("email", "email", ())
//!     .rule("password", "minlength", 8)
//!     .rule("confirm", "equalto", "password")
//!     .message("confirm", "equalto", "Passwords do not match.");
//!
//! let mut session = ValidationSession::new(true, payload);
//! session.validate(&options).expect("rule names are valid");
//!
//! assert!(!session.is_valid());
//! assert_eq!(session.error_class("confirm"), "error");
//! assert_eq!(
//!     session.error_label("confirm"),
//!     r#"<label for="confirm" class="error">Passwords do not match.</label>"#
//! );
//! ```
//!
//! ## Error Handling
//!
//! A field failing a rule is not an error; it is recorded in the session.
//! [`FormcheckError`] is reserved for broken configuration, such as an
//! unknown rule name, and aborts the validation pass.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod compiler;
pub mod config;
pub mod engine;
pub mod errors;
pub mod payload;
pub mod registry;
pub mod render;
pub mod sanitizers;
pub mod session;
pub mod validators;

/// Re-exports the option types used to declare a form.
pub use config::{
    form_candidate_paths,
    load_form_by_name,
    merge_options,
    ArgSpec,
    Deferred,
    MessageSpec,
    OptionsFile,
    RuleArg,
    RuleSpec,
    ValidationOptions,
};

/// Re-exports the custom error type for clear error reporting.
pub use errors::FormcheckError;

pub use engine::{FieldOutcome, RuleEngine, ValidationReport};
pub use payload::{FieldValue, Payload, Shape};
pub use registry::{BuiltinRule, Rule, RuleContext, RuleRegistry};
pub use render::{LabelTemplate, DEFAULT_LABEL_TEMPLATE};
pub use sanitizers::SanitizeMode;
pub use session::{is_submission_method, ValidationSession};
