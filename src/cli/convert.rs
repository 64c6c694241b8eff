//! JSON text <-> Value conversion for the command line

use super::CliError;
use crate::Value;

/// Parse JSON text into a Value
pub fn parse_json(text: &str) -> Result<Value, CliError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from(json))
}

/// Parse optional JSON text; absent means `null`
pub(crate) fn parse_optional(text: Option<&str>) -> Result<Value, CliError> {
    text.map(parse_json).transpose().map(Option::unwrap_or_default)
}

/// Render a Value as JSON text
pub fn render_json(value: Value, pretty: bool) -> Result<String, CliError> {
    let json = serde_json::Value::from(value);
    let text = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }?;
    Ok(text)
}
