//! Leaf transforms used by the sanitization pipeline.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;

/// Identity transform for the clean view.
pub fn passthrough(value: &str) -> String {
    value.to_string()
}

/// Removes backslash escapes: `\x` becomes `x` and `\\` becomes `\`.
///
/// A trailing lone backslash is dropped.
pub fn strip_slashes(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Encodes a value for safe display inside HTML text and quoted attributes.
///
/// Replaces:
/// - `&` -> `&amp;`
/// - `<` -> `&lt;`
/// - `>` -> `&gt;`
/// - `"` -> `&quot;`
/// - `'` -> `&#039;`
///
/// Everything else is left as UTF-8.
pub fn html_escape(value: &str) -> String {
    escape_cow(value).into_owned()
}

fn escape_cow(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
