//! Subcommand implementations.

pub mod board;
pub mod calendar;
pub mod config;
pub mod serve;

use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Prints `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> ClientResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Config(format!("failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// First eight characters of an id, enough to address it from the CLI.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
