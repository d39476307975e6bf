pub mod deploy;
pub mod margin;
pub mod payoff;
pub mod rates;

use serde::Serialize;
use serde_json::Value;

/// Serialize a command result and attach the command line that reproduces it.
pub fn with_reproduce<T: Serialize>(
    output: &T,
    command: String,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut value = serde_json::to_value(output)?;
    if let Value::Object(map) = &mut value {
        map.insert("reproduce".to_string(), Value::String(command));
    }
    Ok(value)
}
