pub mod chart;
pub mod config;
pub mod generate;
pub mod ideas;
pub mod serve;
pub mod tasks;

use serde::Serialize;

use crate::types::Result;

/// Print `value` as pretty JSON
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
