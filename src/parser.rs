//! Filter-expression parser.
//!
//! Parsing works by rewriting text rather than by consuming tokens: each
//! parenthesized group is resolved first, then every precedence tier (highest
//! first) rewrites `left OP right` into the call form `name(left,right)`
//! until the whole expression is one nested call, which is finally read
//! top-down into a [`Logic`] tree.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    ast::{Logic, Operator, logic::check_arity},
    error::QueryError,
    lexer::{self, Extracted},
    value::Value,
};

/// Operator tokens per precedence tier, highest first.
const TIERS: [&[&str]; 9] = [
    &["!"],
    &["**"],
    &["*", "/"],
    &["%"],
    &["+", "-"],
    &["<=", "<", ">", ">=", "~"],
    &["!==", "!=", "===", "=="],
    &["&&"],
    &["||"],
];

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("valid regex"));

static FILTER_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_\s$@.!*<=>|&+\-/%#,()]+$").expect("valid regex")
});

/// Parse an infix filter expression such as `@.age > 20 && @.name != "Bob"`.
///
/// # Examples
///
/// ```
/// use pathquery::parser::parse_expression;
/// use pathquery::ast::{Logic, Operator};
/// use pathquery::Value;
///
/// let tree = parse_expression("@.age > 20").unwrap();
/// assert_eq!(
///     tree,
///     Logic::call(
///         Operator::Greater,
///         vec![Logic::VariableRef("age".into()), Logic::Literal(Value::Integer(20))],
///     )
/// );
/// ```
pub fn parse_expression(input: &str) -> Result<Logic, QueryError> {
    let Extracted { text, mut literals } = lexer::extract_literals(input)?;
    let chars = lexer::normalize(&text, &mut literals)?;
    let rewritten: String = rewrite(&chars)?.into_iter().collect();
    tracing::trace!(input, rewritten = %rewritten, "rewrote filter expression");
    resolve(&rewritten, &literals)
}

/// Parse a JSONPath filter step: `[?( expr )]`, or `[*]` for no filter.
pub fn parse_filter(step: &str) -> Result<Option<Logic>, QueryError> {
    let step = step.trim();
    if step == "[*]" {
        return Ok(None);
    }

    let body = step
        .strip_prefix("[?(")
        .and_then(|rest| rest.strip_suffix(")]"))
        .ok_or_else(|| QueryError::invalid(format!("'{}' is not a [?( ... )] filter", step)))?;

    let Extracted { text, .. } = lexer::extract_literals(body)?;
    if !FILTER_BODY.is_match(&text) {
        return Err(QueryError::invalid(format!(
            "unsupported characters in filter '{}'",
            step
        )));
    }

    parse_expression(body).map(Some)
}

/// Resolve parenthesized groups, then apply every tier.
fn rewrite(chars: &[char]) -> Result<Vec<char>, QueryError> {
    let mut out = Vec::with_capacity(chars.len());
    let mut group = Vec::new();
    let mut depth = 0usize;

    for &ch in chars {
        match ch {
            '(' => {
                if depth > 0 {
                    group.push(ch);
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(QueryError::malformed("unbalanced ')'"));
                }
                depth -= 1;
                if depth == 0 {
                    out.extend(rewrite(&group)?);
                    group.clear();
                } else {
                    group.push(ch);
                }
            }
            _ if depth > 0 => group.push(ch),
            _ => out.push(ch),
        }
    }

    if depth != 0 {
        return Err(QueryError::malformed("unbalanced '('"));
    }

    for tier in TIERS {
        apply_tier(&mut out, tier)?;
    }
    Ok(out)
}

/// Rewrite every operator of one tier into call form, left to right
/// (right to left for unary `!`, so that `!!a` nests).
fn apply_tier(text: &mut Vec<char>, tier: &[&str]) -> Result<(), QueryError> {
    let unary = matches!(tier, ["!"]);

    loop {
        let found = lexer::scan_operators(text);
        let in_tier = |(_, token): &&(usize, &str)| tier.contains(token);
        let candidate = if unary {
            found.iter().rev().find(in_tier)
        } else {
            found.iter().find(in_tier)
        };
        let Some(&(index, token)) = candidate else {
            return Ok(());
        };

        let op = lexer::infix_operator(token)
            .ok_or_else(|| QueryError::malformed(format!("unknown operator '{}'", token)))?;

        let after = index + token.chars().count();
        let mut right_end = after;
        while right_end < text.len() && lexer::is_operand_char(text[right_end]) {
            right_end += 1;
        }
        let right: String = text[after..right_end].iter().collect();
        if right.is_empty() {
            return Err(missing_operand(op));
        }

        let (start, replacement) = if unary {
            (index, format!("{}({})", op.call_name(), right))
        } else {
            let mut left_start = index;
            while left_start > 0 && lexer::is_operand_char(text[left_start - 1]) {
                left_start -= 1;
            }
            let left: String = text[left_start..index].iter().collect();
            if left.is_empty() {
                return Err(missing_operand(op));
            }
            (left_start, format!("{}({},{})", op.call_name(), left, right))
        };

        text.splice(start..right_end, replacement.chars());
    }
}

fn missing_operand(op: Operator) -> QueryError {
    QueryError::malformed(format!("operator '{}' is missing an operand", op))
}

/// Split call arguments at commas outside nested parentheses.
fn split_outside_parentheses(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                result.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    result.push(&text[start..]);
    result
}

/// Read the fully rewritten call form into a tree.
fn resolve(text: &str, literals: &[Value]) -> Result<Logic, QueryError> {
    if NUMBER.is_match(text) {
        return parse_number(text).map(Logic::Literal);
    }

    if let Some(open) = text.find('(') {
        let head = &text[..open];
        let args = text[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| QueryError::malformed(format!("not a valid query: '{}'", text)))?;
        let op = Operator::from_call_name(head)
            .ok_or_else(|| QueryError::malformed(format!("unknown operator '{}'", head)))?;

        let operands = split_outside_parentheses(args)
            .into_iter()
            .map(|arg| resolve(arg, literals))
            .collect::<Result<Vec<_>, _>>()?;
        check_arity(op, operands.len())?;
        return Ok(Logic::call(op, operands));
    }

    match text {
        "@" => Ok(Logic::VariableRef(String::new())),
        "$" => Ok(Logic::ContextRef(String::new())),
        "true" => Ok(Logic::Literal(Value::Boolean(true))),
        "false" => Ok(Logic::Literal(Value::Boolean(false))),
        "null" => Ok(Logic::Literal(Value::Null)),
        _ => {
            if let Some(path) = text.strip_prefix("@.") {
                Ok(Logic::VariableRef(path.to_string()))
            } else if let Some(path) = text.strip_prefix("$.") {
                Ok(Logic::ContextRef(path.to_string()))
            } else if let Some(literal) = text
                .strip_prefix('#')
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| literals.get(n))
            {
                Ok(Logic::Literal(literal.clone()))
            } else {
                Err(QueryError::malformed(format!("not a valid query: '{}'", text)))
            }
        }
    }
}

fn parse_number(text: &str) -> Result<Value, QueryError> {
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Value::Integer(n));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| QueryError::malformed(format!("invalid number '{}'", text)))
}
