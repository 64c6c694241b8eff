//! Run a compiled query against JSON input

use std::collections::HashMap;

use super::{CliError, convert::parse_optional};
use crate::{LazyQuery, ParentMatch, Query, Value};

/// Options for the query command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The path to run
    pub path: String,
    /// JSON input string
    pub input: Option<String>,
    /// JSON context string
    pub context: Option<String>,
    /// Report each match with its index in the owning array
    pub parents: bool,
    /// Pull matches one at a time
    pub lazy: bool,
    /// Stop after this many matches (lazy mode)
    pub limit: Option<usize>,
}

/// Execute a query and return its result
pub fn execute_query(options: &QueryOptions) -> Result<Value, CliError> {
    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let data = super::parse_json(input)?;
    let context = parse_optional(options.context.as_deref())?;

    if options.lazy {
        let query = LazyQuery::compile(&options.path)?;
        let limit = options.limit.unwrap_or(usize::MAX);
        let found: Vec<Value> = if options.parents {
            query.parents(&data, &context).take(limit).map(describe).collect()
        } else {
            query
                .iter(&data, &context)
                .take(limit)
                .map(|value| value.into_owned())
                .collect()
        };
        return Ok(Value::Array(found));
    }

    let query = Query::compile(&options.path)?;
    if options.parents {
        return Ok(Value::Array(
            query.parents(&data, &context).into_iter().map(describe).collect(),
        ));
    }
    Ok(query.run(&data, &context))
}

fn describe(found: ParentMatch<'_>) -> Value {
    let mut entry = HashMap::new();
    entry.insert("value".to_string(), found.value.into_owned());
    entry.insert("index".to_string(), Value::Integer(found.index as i64));
    entry.insert("owner_length".to_string(), Value::Integer(found.owner.len() as i64));
    Value::Object(entry)
}
