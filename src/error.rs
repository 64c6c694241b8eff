use thiserror::Error;

/// Errors raised while compiling a path, filter or template, plus the one
/// invocation-time failure of mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The path does not start with `$`, or a filter wrapper, logic literal
    /// or template leaf is outside the supported grammar.
    #[error("Query is not valid: {0}")]
    InvalidQuery(String),

    /// The path cannot be written through.
    #[error("Cannot mutate {0}")]
    InvalidMutationTarget(String),

    /// A lazy query or removal was requested for a path without a wildcard.
    #[error("Query does not iterate over an array: {0}")]
    NonIteratingQuery(String),

    /// A filter expression could not be resolved into the operand grammar.
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// A mutation could not reach its slot in the supplied data.
    #[error("Cannot address `{path}`: {reason}")]
    Unaddressable { path: String, reason: String },
}

impl QueryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QueryError::InvalidQuery(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        QueryError::MalformedExpression(msg.into())
    }
}
