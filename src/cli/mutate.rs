//! Apply a compiled mutation to JSON input

use super::{CliError, convert::parse_optional};
use crate::{Mutation, Value};

/// Options for the mutate command
#[derive(Debug, Clone, Default)]
pub struct MutateOptions {
    /// The path to write through
    pub path: String,
    /// JSON value assigned to every addressed slot
    pub value: String,
    /// JSON input string
    pub input: Option<String>,
    /// JSON context string
    pub context: Option<String>,
}

/// Execute a mutation and return the mutated document
pub fn execute_mutate(options: &MutateOptions) -> Result<Value, CliError> {
    let mutation = Mutation::compile(&options.path)?;
    let replacement = super::parse_json(&options.value)?;

    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let data = super::parse_json(input)?;
    let context = parse_optional(options.context.as_deref())?;

    Ok(mutation.mutate(data, replacement, &context)?)
}
