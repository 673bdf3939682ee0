//! `formcheck rules`: list the built-in rules.

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use std::io::{self, Write};

use formcheck_core::BuiltinRule;

pub fn run() -> Result<()> {
    let stdout = io::stdout();
    write_rules(&mut stdout.lock())
}

pub fn write_rules<W: Write>(out: &mut W) -> Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Rule", "Description"]);
    for rule in BuiltinRule::ALL {
        table.add_row(vec![rule.name(), rule.description()]);
    }
    writeln!(out, "{}", table)?;
    Ok(())
}
