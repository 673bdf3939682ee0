// File: formcheck-core/src/validators.rs
//! Predicates behind the built-in validation rules.
//!
//! These are plain functions of the submitted text and an already-extracted
//! argument. Argument extraction and error reporting live in the registry;
//! nothing here can fail.
//!
//! Lengths are counted in UTF-8 bytes, so a multibyte character counts once
//! per byte.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;

// Local part atoms may use a fixed set of punctuation. The host is either a
// dotted name that neither starts nor ends with '-' or '.', followed by a
// 2-6 letter TLD, or a dotted quad. An optional port may follow.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\A[-_a-z0-9'+*$^&%=~!?{}]+(?:\.[-_a-z0-9'+*$^&%=~!?{}]+)*@(?:[a-z0-9](?:[-a-z0-9.]*[a-z0-9])?\.[a-z]{2,6}|[0-9]{1,3}(?:\.[0-9]{1,3}){3})(?::[0-9]+)?\z",
    )
    .expect("email pattern is valid")
});

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A-?(?:[0-9]+|[0-9]{1,3}(?:,[0-9]{3})+)(?:\.[0-9]+)?\z")
        .expect("number pattern is valid")
});

static DIGITS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[0-9]+\z").expect("digits pattern is valid"));

/// Length of `value` in UTF-8 bytes.
pub fn byte_length(value: &str) -> usize {
    value.len()
}

pub fn is_present(value: &str) -> bool {
    !value.is_empty()
}

pub fn meets_min_length(value: &str, min: usize) -> bool {
    byte_length(value) >= min
}

pub fn meets_max_length(value: &str, max: usize) -> bool {
    byte_length(value) <= max
}

/// Both bounds are inclusive.
pub fn within_length_range(value: &str, min: usize, max: usize) -> bool {
    meets_min_length(value, min) && meets_max_length(value, max)
}

pub fn has_exact_length(value: &str, length: usize) -> bool {
    byte_length(value) == length
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// An optionally negative integer, plain or comma-grouped by thousands, with
/// an optional decimal part.
pub fn is_valid_number(value: &str) -> bool {
    NUMBER_REGEX.is_match(value)
}

pub fn is_all_digits(value: &str) -> bool {
    DIGITS_REGEX.is_match(value)
}

/// Counts ASCII digits, ignoring every other character.
pub fn count_digits(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}

pub fn has_min_digits(value: &str, min: usize) -> bool {
    count_digits(value) >= min
}
