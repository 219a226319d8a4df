use serde::Serialize;

use crate::commands::CliError;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}
