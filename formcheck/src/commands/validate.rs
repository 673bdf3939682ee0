//! `formcheck validate`: run a rule set against a JSON payload.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use is_terminal::IsTerminal;
use log::{debug, info};
use owo_colors::OwoColorize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use formcheck_core::{load_form_by_name, Payload, SanitizeMode, ValidationSession};

use crate::cli::{OutputFormat, ValidateCommand};

/// Runs the command and returns whether the form is valid.
pub fn run(cmd: &ValidateCommand) -> Result<bool> {
    let options = load_form_by_name(&cmd.rules)?;
    let input = read_input(cmd.input.as_deref())?;
    let payload = parse_payload(&input)?;
    debug!("Payload has {} top-level field(s).", payload.len());

    let mode = if cmd.strip_slashes {
        SanitizeMode::StripSlashes
    } else {
        SanitizeMode::Passthrough
    };
    let mut session = ValidationSession::from_request_with_mode(&cmd.method, payload, mode);
    session
        .validate(&options)
        .with_context(|| format!("Rule set '{}' is invalid", cmd.rules))?;
    info!(
        "Validated {} field(s): {} error(s).",
        options.field_count(),
        session.errors().len()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cmd.format {
        OutputFormat::Text => write_text_report(&session, &mut out, stdout.is_terminal())?,
        OutputFormat::Json => write_json_report(&session, &mut out)?,
    }
    Ok(session.is_valid())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            Ok(buffer)
        }
    }
}

/// Parses a JSON object payload. Blank input is an empty payload.
pub fn parse_payload(input: &str) -> Result<Payload> {
    if input.trim().is_empty() {
        return Ok(Payload::new());
    }
    serde_json::from_str(input).context("Failed to parse JSON payload")
}

/// Writes a summary line and, for an invalid form, a table of field errors
/// with the values as submitted.
pub fn write_text_report<W: Write>(
    session: &ValidationSession,
    out: &mut W,
    use_color: bool,
) -> Result<()> {
    if !session.is_submitted() {
        writeln!(out, "No submission; nothing was validated.")?;
        return Ok(());
    }
    if session.is_valid() {
        if use_color {
            writeln!(out, "{}", "Form is valid.".green())?;
        } else {
            writeln!(out, "Form is valid.")?;
        }
        return Ok(());
    }

    let summary = format!("Form has {} invalid field(s).", session.errors().len());
    if use_color {
        writeln!(out, "{}", summary.red().bold())?;
    } else {
        writeln!(out, "{}", summary)?;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Field", "Error", "Submitted"]);
    for (field, message) in session.errors() {
        table.add_row(vec![
            field.as_str(),
            message.as_str(),
            session.raw().text(field).unwrap_or(""),
        ]);
    }
    writeln!(out, "{}", table)?;
    Ok(())
}

/// Writes `{ submitted, valid, errors, clean }` as pretty JSON.
pub fn write_json_report<W: Write>(session: &ValidationSession, out: &mut W) -> Result<()> {
    let report = serde_json::json!({
        "submitted": session.is_submitted(),
        "valid": session.is_valid(),
        "errors": session.errors(),
        "clean": session.clean(),
    });
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
