// formcheck/src/lib.rs
//! # formcheck CLI Application
//!
//! The terminal front end for `formcheck-core`: validates JSON payloads
//! against YAML rule sets and lists the built-in rules.

pub mod cli;
pub mod commands;
pub mod logger;

/// Process exit codes.
pub mod exit_code {
    pub const VALID: i32 = 0;
    pub const INVALID: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}
