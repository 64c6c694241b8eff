use std::{cmp::Ordering, sync::Arc};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    ast::{Logic, Operator, Segment},
    error::QueryError,
    value::Value,
};

/// What a compiled predicate is invoked with.
///
/// Filters that never reference the context receive the element alone; the
/// choice is fixed when the filter is compiled.
#[derive(Debug, Clone, Copy)]
pub enum Args<'a> {
    Item(&'a Value),
    WithContext { item: &'a Value, context: &'a Value },
}

impl<'a> Args<'a> {
    pub fn item(&self) -> &'a Value {
        match *self {
            Args::Item(item) | Args::WithContext { item, .. } => item,
        }
    }

    pub fn context(&self) -> Option<&'a Value> {
        match *self {
            Args::Item(_) => None,
            Args::WithContext { context, .. } => Some(context),
        }
    }
}

/// A compiled operator tree. Calling it never fails; the result is judged by
/// truthiness when used as a filter.
pub type Predicate = Arc<dyn Fn(Args<'_>) -> Value + Send + Sync>;

/// Compiles operator trees into callable predicates.
///
/// The crate ships [`Engine`]; other implementations can be installed on a
/// [`Compiler`](crate::Compiler).
pub trait LogicEngine: Send + Sync {
    fn build(&self, tree: &Logic) -> Result<Predicate, QueryError>;
}

/// Default engine: composes one closure per tree node.
#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

impl LogicEngine for Engine {
    fn build(&self, tree: &Logic) -> Result<Predicate, QueryError> {
        Ok(compile_node(tree))
    }
}

fn predicate<F>(f: F) -> Predicate
where
    F: Fn(Args<'_>) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

fn compile_node(tree: &Logic) -> Predicate {
    match tree {
        Logic::Literal(value) => {
            let value = value.clone();
            predicate(move |_| value.clone())
        }
        Logic::VariableRef(path) => {
            let path = Segment::from_dotted(path);
            predicate(move |args| lookup(&path, Some(args.item())))
        }
        Logic::ContextRef(path) => {
            let path = Segment::from_dotted(path);
            predicate(move |args| lookup(&path, args.context()))
        }
        Logic::Call { op, operands } => {
            let op = *op;
            let operands: Vec<Predicate> = operands.iter().map(compile_node).collect();
            match op {
                Operator::And => predicate(move |args| {
                    let mut last = Value::Null;
                    for operand in &operands {
                        last = operand(args);
                        if !last.is_truthy() {
                            break;
                        }
                    }
                    last
                }),
                Operator::Or => predicate(move |args| {
                    let mut last = Value::Null;
                    for operand in &operands {
                        last = operand(args);
                        if last.is_truthy() {
                            break;
                        }
                    }
                    last
                }),
                _ => predicate(move |args| {
                    let values: Vec<Value> = operands.iter().map(|operand| operand(args)).collect();
                    apply(op, &values)
                }),
            }
        }
    }
}

fn lookup(path: &Segment, origin: Option<&Value>) -> Value {
    origin
        .and_then(|origin| path.resolve(origin))
        .map(|found| found.into_owned())
        .unwrap_or(Value::Null)
}

/// Apply a non-short-circuiting operator to evaluated operands.
pub fn apply(op: Operator, values: &[Value]) -> Value {
    match (op, values) {
        (Operator::Not, [value]) => Value::Boolean(!value.is_truthy()),
        (Operator::Truthy, [value]) => Value::Boolean(value.is_truthy()),
        (Operator::Equal, [a, b]) => Value::Boolean(loose_equals(a, b)),
        (Operator::NotEqual, [a, b]) => Value::Boolean(!loose_equals(a, b)),
        (Operator::StrictEqual, [a, b]) => Value::Boolean(strict_equals(a, b)),
        (Operator::StrictNotEqual, [a, b]) => Value::Boolean(!strict_equals(a, b)),
        (Operator::Less, [a, b]) => ordered(a, b, Ordering::is_lt),
        (Operator::LessEqual, [a, b]) => ordered(a, b, Ordering::is_le),
        (Operator::Greater, [a, b]) => ordered(a, b, Ordering::is_gt),
        (Operator::GreaterEqual, [a, b]) => ordered(a, b, Ordering::is_ge),
        // between: low < x < high
        (Operator::Less, [low, x, high]) => Value::Boolean(
            ordered(low, x, Ordering::is_lt).is_truthy() && ordered(x, high, Ordering::is_lt).is_truthy(),
        ),
        (Operator::LessEqual, [low, x, high]) => Value::Boolean(
            ordered(low, x, Ordering::is_le).is_truthy() && ordered(x, high, Ordering::is_le).is_truthy(),
        ),
        (Operator::In, [needle, haystack]) => Value::Boolean(contains(haystack, needle)),
        (Operator::Add, [a, b]) => arithmetic(Operator::Add, a, b),
        (Operator::Subtract, [a, b]) => arithmetic(Operator::Subtract, a, b),
        (Operator::Multiply, [a, b]) => arithmetic(Operator::Multiply, a, b),
        (Operator::Divide, [a, b]) => arithmetic(Operator::Divide, a, b),
        (Operator::Modulo, [a, b]) => arithmetic(Operator::Modulo, a, b),
        (Operator::Power, [a, b]) => arithmetic(Operator::Power, a, b),
        (Operator::And, values) => values
            .iter()
            .find(|v| !v.is_truthy())
            .or(values.last())
            .cloned()
            .unwrap_or(Value::Null),
        (Operator::Or, values) => values
            .iter()
            .find(|v| v.is_truthy())
            .or(values.last())
            .cloned()
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Strict equality: same kind and same value; integers and floats are one
/// kind.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (x, y) if x.is_number() && y.is_number() => x.as_float() == y.as_float(),
        _ => a == b,
    }
}

/// Loose equality: numbers, numeric strings and booleans meet as numbers.
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    if strict_equals(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        (Value::String(x), Value::String(y)) => x == y,
        _ => match (to_number(a), to_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn to_number(v: &Value) -> Option<f64> {
    match v {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Numbers compare numerically, strings lexicographically; anything else is
/// unordered and compares false.
fn ordered(a: &Value, b: &Value, test: fn(Ordering) -> bool) -> Value {
    let ordering = match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (x, y) if x.is_number() && y.is_number() => match (x.as_float(), y.as_float()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
        _ => None,
    };
    Value::Boolean(ordering.is_some_and(test))
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::String(h), Value::String(n)) => h.contains(n.as_str()),
        (Value::Array(items), needle) => items.iter().any(|item| strict_equals(item, needle)),
        _ => false,
    }
}

/// Integer-preserving arithmetic. Mixed integer/float operands go through
/// `Decimal` so that whole results come back as integers. Invalid operands
/// and division by zero give `null`.
fn arithmetic(op: Operator, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::String(a), Value::String(b)) if op == Operator::Add => Value::String(format!("{}{}", a, b)),
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => float_arithmetic(op, Some(*a), Some(*b)),
        (a, b) if a.is_number() && b.is_number() => {
            let (Some(x), Some(y)) = (to_decimal(a), to_decimal(b)) else {
                return float_arithmetic(op, a.as_float(), b.as_float());
            };
            match decimal_arithmetic(op, x, y) {
                Some(rd) if rd.is_integer() => rd
                    .to_i64()
                    .map(Value::Integer)
                    .unwrap_or_else(|| float_arithmetic(op, a.as_float(), b.as_float())),
                Some(rd) => rd
                    .to_f64()
                    .map(Value::Float)
                    .unwrap_or_else(|| float_arithmetic(op, a.as_float(), b.as_float())),
                None => float_arithmetic(op, a.as_float(), b.as_float()),
            }
        }
        _ => Value::Null,
    }
}

fn to_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

fn integer_arithmetic(op: Operator, a: i64, b: i64) -> Value {
    let result = match op {
        Operator::Add => a.checked_add(b),
        Operator::Subtract => a.checked_sub(b),
        Operator::Multiply => a.checked_mul(b),
        Operator::Modulo => a.checked_rem(b),
        Operator::Divide => {
            if b == 0 {
                return Value::Null;
            }
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                Some(_) => return Value::Float(a as f64 / b as f64),
                None => None,
            }
        }
        Operator::Power => u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)),
        _ => return Value::Null,
    };
    match result {
        Some(n) => Value::Integer(n),
        None => float_arithmetic(op, Some(a as f64), Some(b as f64)),
    }
}

fn decimal_arithmetic(op: Operator, a: Decimal, b: Decimal) -> Option<Decimal> {
    match op {
        Operator::Add => a.checked_add(b),
        Operator::Subtract => a.checked_sub(b),
        Operator::Multiply => a.checked_mul(b),
        Operator::Divide => a.checked_div(b),
        Operator::Modulo => a.checked_rem(b),
        _ => None,
    }
}

fn float_arithmetic(op: Operator, a: Option<f64>, b: Option<f64>) -> Value {
    let (Some(a), Some(b)) = (a, b) else {
        return Value::Null;
    };
    let result = match op {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide | Operator::Modulo if b == 0.0 => return Value::Null,
        Operator::Divide => a / b,
        Operator::Modulo => a % b,
        Operator::Power => a.powf(b),
        _ => return Value::Null,
    };
    if result.is_finite() {
        Value::Float(result)
    } else {
        Value::Null
    }
}
