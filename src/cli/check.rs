//! Compile a path without running it

use super::CliError;
use crate::Query;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The path to compile
    pub path: String,
}

/// Compile the path and describe its plan
pub fn execute_check(options: &CheckOptions) -> Result<String, CliError> {
    let query = Query::compile(&options.path)?;
    Ok(format!(
        "path: {}\nplan: {}\nwildcards: {}\nlazy: {}",
        query.path(),
        query,
        query.wildcards(),
        if query.is_iterating() { "yes" } else { "no" }
    ))
}
