//! Sanitization pipeline for submitted payloads.
//!
//! A payload is never sanitized in place. [`transform`] rebuilds it leaf by
//! leaf, which is how a session derives its clean view and its escaped view
//! from the same raw input while keeping both structurally identical to it.
//!
//! License: MIT OR APACHE 2.0

pub mod transforms;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::payload::{FieldValue, Payload};

pub use transforms::{html_escape, passthrough, strip_slashes};

/// How the clean view is derived from the raw payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeMode {
    /// The clean view is a copy of the raw payload.
    #[default]
    Passthrough,
    /// Backslash escapes added by a legacy transport are removed.
    StripSlashes,
}

impl SanitizeMode {
    pub fn apply(self, raw: &Payload) -> Payload {
        match self {
            SanitizeMode::Passthrough => transform(raw, passthrough),
            SanitizeMode::StripSlashes => transform(raw, strip_slashes),
        }
    }
}

/// Applies `f` to every text leaf of `payload`, recursing into groups.
///
/// Keys and their order are preserved at every level.
pub fn transform<F>(payload: &Payload, f: F) -> Payload
where
    F: Fn(&str) -> String,
{
    transform_with(payload, &f)
}

fn transform_with<F>(payload: &Payload, f: &F) -> Payload
where
    F: Fn(&str) -> String,
{
    payload
        .iter()
        .map(|(name, value)| {
            let mapped = match value {
                FieldValue::Text(text) => FieldValue::Text(f(text)),
                FieldValue::Group(group) => FieldValue::Group(transform_with(group, f)),
            };
            (name.clone(), mapped)
        })
        .collect()
}

/// Builds the clean and escaped views of a raw payload.
///
/// The escaped view is derived from the clean one, so escaping always sees
/// already-unescaped text.
pub fn build_views(raw: &Payload, mode: SanitizeMode) -> (Payload, Payload) {
    debug!("Sanitizing payload with {} top-level field(s) using {:?}.", raw.len(), mode);
    let clean = mode.apply(raw);
    let escaped = transform(&clean, html_escape);
    (clean, escaped)
}
