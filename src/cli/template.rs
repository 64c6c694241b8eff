//! Build an object template against JSON input

use super::{CliError, convert::parse_optional};
use crate::{ObjectTemplate, Value};

/// Options for the template command
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    /// Template JSON whose string leaves are paths
    pub template: String,
    /// JSON input string
    pub input: Option<String>,
    /// JSON context string
    pub context: Option<String>,
}

/// Compile the template and build it once
pub fn execute_template(options: &TemplateOptions) -> Result<Value, CliError> {
    let template = ObjectTemplate::compile(&super::parse_json(&options.template)?)?;

    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let data = super::parse_json(input)?;
    let context = parse_optional(options.context.as_deref())?;

    Ok(template.build(&data, &context))
}
