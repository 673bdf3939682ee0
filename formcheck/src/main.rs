// formcheck/src/main.rs
//! formcheck entry point.

use clap::Parser;
use is_terminal::IsTerminal;
use log::LevelFilter;
use owo_colors::OwoColorize;
use std::io;
use std::process;

use formcheck::cli::{Cli, Commands};
use formcheck::commands::{rules, validate};
use formcheck::{exit_code, logger};

fn main() {
    let args = Cli::parse();

    if args.quiet {
        logger::init_logger(Some(LevelFilter::Off));
    } else if args.debug {
        logger::init_logger(Some(LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    let outcome = match &args.command {
        Commands::Validate(cmd) => validate::run(cmd).map(|valid| {
            if valid {
                exit_code::VALID
            } else {
                exit_code::INVALID
            }
        }),
        Commands::Rules => rules::run().map(|()| exit_code::VALID),
    };

    match outcome {
        Ok(code) => process::exit(code),
        Err(e) => {
            if io::stderr().is_terminal() {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                eprintln!("Error: {:#}", e);
            }
            process::exit(exit_code::CONFIG_ERROR);
        }
    }
}
