// formcheck/src/logger.rs
//! Logger setup for the CLI. Logs go to stderr so stdout stays parseable.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger` from `RUST_LOG` (default `warn`). A level passed
/// in `level_override` wins over the environment.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    builder.target(Target::Stderr).format_timestamp(None);
    // A second call (e.g. from tests) keeps the first logger.
    let _ = builder.try_init();
}
