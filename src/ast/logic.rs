use std::fmt;

use crate::{ast::Operator, error::QueryError, value::Value};

/// Engine-agnostic operator tree built from a filter.
///
/// Produced by the expression parser for `[?( ... )]` filters and by
/// [`Logic::from_json_logic`] for `*{ ... }` filters; consumed by a
/// [`LogicEngine`](crate::evaluator::LogicEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum Logic {
    /// Constant operand
    ///
    /// # Example
    /// ```text
    /// 20      "Bob"      true
    /// ```
    Literal(Value),

    /// Path relative to the current element; empty means the element itself
    ///
    /// # Example
    /// ```text
    /// @.age   -> VariableRef("age")
    /// @       -> VariableRef("")
    /// ```
    VariableRef(String),

    /// Path relative to the invocation context; empty means the whole context
    ///
    /// # Example
    /// ```text
    /// $.min   -> ContextRef("min")
    /// $       -> ContextRef("")
    /// ```
    ContextRef(String),

    /// Operator applied to operands
    Call {
        op: Operator,
        operands: Vec<Logic>,
    },
}

impl Logic {
    pub fn call(op: Operator, operands: Vec<Logic>) -> Self {
        Logic::Call { op, operands }
    }

    /// Whether the tree reads the external context anywhere.
    pub fn uses_context(&self) -> bool {
        match self {
            Logic::ContextRef(_) => true,
            Logic::Call { operands, .. } => operands.iter().any(Logic::uses_context),
            Logic::Literal(_) | Logic::VariableRef(_) => false,
        }
    }

    /// Read a structured logic literal such as
    /// `{ ">": [{ "var": "age" }, { "context": "" }] }`.
    ///
    /// `var` references the current element, `context` the invocation
    /// context; every other single-key object must name an [`Operator`]
    /// by its symbol.
    pub fn from_json_logic(json: &serde_json::Value) -> Result<Self, QueryError> {
        let serde_json::Value::Object(map) = json else {
            return Ok(Logic::Literal(Value::from(json.clone())));
        };

        if map.len() != 1 {
            return Err(QueryError::invalid(format!(
                "logic object must have exactly one key, got {}",
                map.len()
            )));
        }
        let Some((key, args)) = map.iter().next() else {
            return Err(QueryError::invalid("empty logic object"));
        };

        match key.as_str() {
            "var" => Ok(Logic::VariableRef(reference_path(args)?)),
            "context" => Ok(Logic::ContextRef(reference_path(args)?)),
            symbol => {
                let op = Operator::from_symbol(symbol).ok_or_else(|| {
                    QueryError::invalid(format!("unknown logic operator '{}'", symbol))
                })?;

                let operands = match args {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(Logic::from_json_logic)
                        .collect::<Result<Vec<_>, _>>()?,
                    single => vec![Logic::from_json_logic(single)?],
                };

                check_arity(op, operands.len())?;
                Ok(Logic::Call { op, operands })
            }
        }
    }
}

/// Renders the call form the parser rewrites expressions into, e.g.
/// `and(gt(@.age,20),ne(@.name,"Bob"))`.
impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Literal(value) => write!(f, "{}", serde_json::Value::from(value.clone())),
            Logic::VariableRef(path) if path.is_empty() => write!(f, "@"),
            Logic::VariableRef(path) => write!(f, "@.{}", path),
            Logic::ContextRef(path) if path.is_empty() => write!(f, "$"),
            Logic::ContextRef(path) => write!(f, "$.{}", path),
            Logic::Call { op, operands } => {
                write!(f, "{}(", op.call_name())?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", operand)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Reject operand counts the engine has no meaning for.
pub(crate) fn check_arity(op: Operator, count: usize) -> Result<(), QueryError> {
    let ok = match op {
        _ if op.is_unary() => count == 1,
        _ if op.is_variadic() => count >= 1,
        Operator::Less | Operator::LessEqual => count == 2 || count == 3,
        _ => count == 2,
    };
    if ok {
        Ok(())
    } else {
        Err(QueryError::malformed(format!(
            "operator '{}' cannot take {} operand(s)",
            op, count
        )))
    }
}

fn reference_path(args: &serde_json::Value) -> Result<String, QueryError> {
    match args {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Array(items) if items.len() == 1 => reference_path(&items[0]),
        other => Err(QueryError::invalid(format!(
            "reference path must be a string, got {}",
            other
        ))),
    }
}
