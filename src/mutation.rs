//! Mutation compiler: writes through a compiled path into caller-owned data.

use crate::{
    ast::Step,
    compiler::Compiler,
    error::QueryError,
    query::{Level, Plan},
    value::{Value, type_name},
};

/// What to write into each addressed slot.
///
/// A [`Value`] is assigned as is. A closure receives the slot's current
/// value (`Null` when the slot does not exist yet) and returns the new one.
pub trait Mutator {
    fn mutate(&mut self, current: &Value) -> Value;
}

impl Mutator for Value {
    fn mutate(&mut self, _current: &Value) -> Value {
        self.clone()
    }
}

impl<F> Mutator for F
where
    F: FnMut(&Value) -> Value,
{
    fn mutate(&mut self, current: &Value) -> Value {
        self(current)
    }
}

/// A compiled mutation.
///
/// # Examples
///
/// ```
/// use pathquery::{Mutation, Value};
/// use serde_json::json;
///
/// let mut person = Value::from(json!({ "age": 23 }));
/// let birthday = Mutation::compile("$.age").unwrap();
///
/// birthday
///     .apply(&mut person, |age: &Value| Value::Integer(age.as_int().unwrap_or(0) + 1), &Value::Null)
///     .unwrap();
/// assert_eq!(person, Value::from(json!({ "age": 24 })));
/// ```
#[derive(Debug, Clone)]
pub struct Mutation {
    plan: Plan,
}

impl Mutation {
    pub fn compile(path: &str) -> Result<Self, QueryError> {
        Compiler::default().mutation(path)
    }

    pub(crate) fn from_plan(plan: Plan) -> Result<Self, QueryError> {
        if !plan.is_iterating() && plan.start.is_empty() {
            return Err(QueryError::InvalidMutationTarget(format!(
                "'{}': the root has no owning container",
                plan.path
            )));
        }
        Ok(Mutation { plan })
    }

    pub fn path(&self) -> &str {
        &self.plan.path
    }

    /// Write `mutator` into every addressed slot of `data`.
    ///
    /// Without wildcards the slot must be reachable through existing
    /// containers; its last step is inserted into an object or must be in
    /// range for an array. With wildcards a missing start path writes
    /// nothing, and inner levels skip elements whose continuation is not an
    /// array. Slots already written stay written when a later one fails.
    pub fn apply<M: Mutator>(
        &self,
        data: &mut Value,
        mut mutator: M,
        context: &Value,
    ) -> Result<(), QueryError> {
        let path = self.plan.path.as_str();

        if !self.plan.is_iterating() {
            return assign_at(data, &self.plan.start.steps, &mut mutator, path);
        }

        let Some(items) = self.plan.start.resolve_mut(data).and_then(Value::as_array_mut) else {
            tracing::trace!(path, "nothing to iterate");
            return Ok(());
        };
        mutate_level(&self.plan.levels, items, &mut mutator, context, path)
    }

    /// Like [`Mutation::apply`], taking and returning the data.
    pub fn mutate<M: Mutator>(
        &self,
        mut data: Value,
        mutator: M,
        context: &Value,
    ) -> Result<Value, QueryError> {
        self.apply(&mut data, mutator, context)?;
        Ok(data)
    }
}

fn mutate_level<M: Mutator>(
    levels: &[Level],
    items: &mut [Value],
    mutator: &mut M,
    context: &Value,
    path: &str,
) -> Result<(), QueryError> {
    let Some((level, rest)) = levels.split_first() else {
        return Ok(());
    };

    for item in items.iter_mut() {
        if !level.accepts(item, context) {
            continue;
        }

        if rest.is_empty() {
            if level.continuation.is_empty() {
                *item = mutator.mutate(item);
            } else {
                assign_at(item, &level.continuation.steps, mutator, path)?;
            }
            continue;
        }

        if let Some(next) = level.continuation.resolve_mut(item).and_then(Value::as_array_mut) {
            mutate_level(rest, next, mutator, context, path)?;
        }
    }

    Ok(())
}

/// Walk all but the last step through existing containers, then assign the
/// last step in its parent.
fn assign_at<M: Mutator>(
    origin: &mut Value,
    steps: &[Step],
    mutator: &mut M,
    path: &str,
) -> Result<(), QueryError> {
    let Some((last, parents)) = steps.split_last() else {
        *origin = mutator.mutate(origin);
        return Ok(());
    };

    let mut parent = origin;
    for step in parents {
        let kind = type_name(parent);
        parent = parent.get_mut(&step.key).ok_or_else(|| {
            unaddressable(path, format!("no member '{}' in {}", step.key, kind))
        })?;
    }

    match parent {
        Value::Object(map) => {
            let slot = map.entry(last.key.clone()).or_default();
            *slot = mutator.mutate(slot);
            Ok(())
        }
        Value::Array(arr) => {
            let len = arr.len();
            let slot = last
                .key
                .parse::<usize>()
                .ok()
                .and_then(|index| arr.get_mut(index))
                .ok_or_else(|| {
                    unaddressable(
                        path,
                        format!("index '{}' out of bounds (length: {})", last.key, len),
                    )
                })?;
            *slot = mutator.mutate(slot);
            Ok(())
        }
        other => Err(unaddressable(
            path,
            format!("cannot assign '{}' inside {}", last.key, type_name(other)),
        )),
    }
}

fn unaddressable(path: &str, reason: String) -> QueryError {
    QueryError::Unaddressable {
        path: path.to_string(),
        reason,
    }
}

#[test]
fn test_root_is_rejected() {
    assert!(matches!(
        Mutation::compile("$"),
        Err(QueryError::InvalidMutationTarget(_))
    ));
}
