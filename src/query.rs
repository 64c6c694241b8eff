//! Query compiler: reads values out of data through a compiled path.
//!
//! A path without wildcards resolves to a single value. A path with
//! wildcards walks one array per level, filters its elements, follows the
//! level's continuation and collects the final values in traversal order.

use std::{borrow::Cow, fmt, iter::Enumerate, slice};

use crate::{
    ast::{Logic, RawLevel, Segment, Segmented},
    compiler::Compiler,
    error::QueryError,
    evaluator::{Args, LogicEngine, Predicate},
    segment::split_path,
    value::Value,
};

/// A level filter: its tree, whether the tree reads the context, and the
/// predicate the engine built from it.
#[derive(Clone)]
pub(crate) struct Filter {
    logic: Logic,
    uses_context: bool,
    predicate: Predicate,
}

impl Filter {
    fn new(logic: Logic, engine: &dyn LogicEngine) -> Result<Self, QueryError> {
        let predicate = engine.build(&logic)?;
        Ok(Filter {
            uses_context: logic.uses_context(),
            logic,
            predicate,
        })
    }

    fn accepts(&self, item: &Value, context: &Value) -> bool {
        let args = if self.uses_context {
            Args::WithContext { item, context }
        } else {
            Args::Item(item)
        };
        (self.predicate)(args).is_truthy()
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("logic", &self.logic)
            .field("uses_context", &self.uses_context)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Level {
    pub(crate) filter: Option<Filter>,
    pub(crate) continuation: Segment,
}

impl Level {
    /// Unfiltered levels accept everything.
    pub(crate) fn accepts(&self, item: &Value, context: &Value) -> bool {
        self.filter
            .as_ref()
            .is_none_or(|filter| filter.accepts(item, context))
    }
}

/// Compiled traversal plan shared by queries and mutations.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    pub(crate) path: String,
    pub(crate) start: Segment,
    pub(crate) levels: Vec<Level>,
}

impl Plan {
    pub(crate) fn build(path: &str, engine: &dyn LogicEngine) -> Result<Self, QueryError> {
        let Segmented { start, levels } = split_path(path)?;
        let levels = levels
            .into_iter()
            .map(|RawLevel { filter, continuation }| {
                Ok(Level {
                    filter: filter.map(|logic| Filter::new(logic, engine)).transpose()?,
                    continuation,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        Ok(Plan {
            path: path.to_string(),
            start,
            levels,
        })
    }

    pub(crate) fn is_iterating(&self) -> bool {
        !self.levels.is_empty()
    }

    fn walk<'a>(&'a self, data: &'a Value, context: &'a Value) -> Matches<'a> {
        let mut stack = Vec::with_capacity(self.levels.len());
        if self.is_iterating() {
            if let Some(Cow::Borrowed(first)) = self.start.resolve(data) {
                if let Some(items) = first.as_array() {
                    stack.push(Frame::new(items));
                }
            }
        }
        Matches {
            plan: self,
            context,
            stack,
        }
    }
}

/// Renders the plan as `start` followed by one `*[filter]continuation` per
/// level, e.g. `.friends*[gt(@.age,20)].name`.
impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        for level in &self.levels {
            match &level.filter {
                Some(filter) => write!(f, "*[{}]", filter.logic)?,
                None => write!(f, "*")?,
            }
            write!(f, "{}", level.continuation)?;
        }
        Ok(())
    }
}

/// One final-level match together with the array that owns its element.
///
/// `owner[index]` is the element the last wildcard accepted; `value` is what
/// the final continuation resolved to from it (the element itself when the
/// path ends at the wildcard).
#[derive(Debug, Clone, PartialEq)]
pub struct ParentMatch<'a> {
    pub value: Cow<'a, Value>,
    pub owner: &'a [Value],
    pub index: usize,
}

struct Frame<'a> {
    owner: &'a [Value],
    iter: Enumerate<slice::Iter<'a, Value>>,
}

impl<'a> Frame<'a> {
    fn new(owner: &'a [Value]) -> Self {
        Frame {
            owner,
            iter: owner.iter().enumerate(),
        }
    }
}

/// Forward-only traversal over the final-level matches of a plan.
///
/// Holds one slice iterator per active level and never buffers results, so
/// dropping it early stops the traversal.
pub struct Matches<'a> {
    plan: &'a Plan,
    context: &'a Value,
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = ParentMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let plan = self.plan;
        loop {
            let depth = self.stack.len();
            let frame = self.stack.last_mut()?;
            let owner = frame.owner;
            let Some((index, element)) = frame.iter.next() else {
                self.stack.pop();
                continue;
            };

            let level = &plan.levels[depth - 1];
            if !level.accepts(element, self.context) {
                continue;
            }

            if depth == plan.levels.len() {
                let value = level
                    .continuation
                    .resolve(element)
                    .unwrap_or(Cow::Owned(Value::Null));
                return Some(ParentMatch {
                    value,
                    owner,
                    index,
                });
            }

            // Inner levels only descend into arrays; anything else yields
            // nothing for this branch.
            if let Some(Cow::Borrowed(next)) = level.continuation.resolve(element) {
                if let Some(items) = next.as_array() {
                    self.stack.push(Frame::new(items));
                }
            }
        }
    }
}

impl fmt::Debug for Matches<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matches")
            .field("path", &self.plan.path)
            .field("depth", &self.stack.len())
            .finish()
    }
}

/// A compiled path query.
///
/// # Examples
///
/// ```
/// use pathquery::{Query, Value};
/// use serde_json::json;
///
/// let data = Value::from(json!({
///     "friends": [{ "name": "Bob", "age": 25 }, { "name": "Aaron", "age": 17 }]
/// }));
///
/// let query = Query::compile("$.friends.[?(@.age > 20)].name").unwrap();
/// assert_eq!(
///     query.run(&data, &Value::Null),
///     Value::Array(vec![Value::from("Bob")])
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    plan: Plan,
}

impl Query {
    /// Compile with the default engine.
    pub fn compile(path: &str) -> Result<Self, QueryError> {
        Compiler::default().query(path)
    }

    pub(crate) fn from_plan(plan: Plan) -> Self {
        Query { plan }
    }

    /// The path this query was compiled from.
    pub fn path(&self) -> &str {
        &self.plan.path
    }

    pub fn is_iterating(&self) -> bool {
        self.plan.is_iterating()
    }

    /// Number of wildcard levels.
    pub fn wildcards(&self) -> usize {
        self.plan.levels.len()
    }

    /// Run the query.
    ///
    /// Without wildcards this is the value at the path, `Null` when any step
    /// is missing. With wildcards it is an array of every final-level value;
    /// an empty array when the path is missing or nothing matched.
    pub fn run(&self, data: &Value, context: &Value) -> Value {
        if !self.plan.is_iterating() {
            return self
                .plan
                .start
                .resolve(data)
                .map(Cow::into_owned)
                .unwrap_or(Value::Null);
        }
        Value::Array(
            self.plan
                .walk(data, context)
                .map(|found| found.value.into_owned())
                .collect(),
        )
    }

    /// Parent mode: every final-level match with its owning array and index.
    ///
    /// A path without wildcards has no owning array and reports nothing.
    pub fn parents<'a>(&'a self, data: &'a Value, context: &'a Value) -> Vec<ParentMatch<'a>> {
        self.plan.walk(data, context).collect()
    }

    /// Remove every element parent mode would report from its owning array
    /// and return the removed elements in traversal order.
    ///
    /// The path must end at a wildcard so that each match is an element of
    /// the array it is removed from.
    pub fn remove(&self, data: &mut Value, context: &Value) -> Result<Vec<Value>, QueryError> {
        let Some(last) = self.plan.levels.last() else {
            return Err(QueryError::NonIteratingQuery(self.plan.path.clone()));
        };
        if !last.continuation.is_empty() {
            return Err(QueryError::InvalidMutationTarget(format!(
                "'{}': removal must end at a wildcard",
                self.plan.path
            )));
        }

        let mut removed = Vec::new();
        if let Some(items) = self.plan.start.resolve_mut(data).and_then(Value::as_array_mut) {
            remove_from(&self.plan.levels, items, context, &mut removed);
        }
        tracing::debug!(path = %self.plan.path, removed = removed.len(), "removed matches");
        Ok(removed)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plan)
    }
}

fn remove_from(levels: &[Level], items: &mut Vec<Value>, context: &Value, removed: &mut Vec<Value>) {
    let Some((level, rest)) = levels.split_first() else {
        return;
    };

    if rest.is_empty() {
        let (taken, kept): (Vec<Value>, Vec<Value>) = std::mem::take(items)
            .into_iter()
            .partition(|item| level.accepts(item, context));
        *items = kept;
        removed.extend(taken);
        return;
    }

    for item in items.iter_mut() {
        if !level.accepts(item, context) {
            continue;
        }
        if let Some(next) = level.continuation.resolve_mut(item).and_then(Value::as_array_mut) {
            remove_from(rest, next, context, removed);
        }
    }
}

/// A compiled query that yields its matches one at a time.
///
/// Only paths with at least one wildcard compile. Every call to
/// [`LazyQuery::iter`] starts a fresh traversal.
///
/// # Examples
///
/// ```
/// use pathquery::{LazyQuery, Value};
/// use serde_json::json;
///
/// let data = Value::from(json!({ "interests": ["programming", "business"] }));
/// let query = LazyQuery::compile("$.interests.*").unwrap();
///
/// let first = query.iter(&data, &Value::Null).next().unwrap();
/// assert_eq!(first.as_ref(), &Value::from("programming"));
/// ```
#[derive(Debug, Clone)]
pub struct LazyQuery {
    plan: Plan,
}

impl LazyQuery {
    pub fn compile(path: &str) -> Result<Self, QueryError> {
        Compiler::default().lazy_query(path)
    }

    pub(crate) fn from_plan(plan: Plan) -> Result<Self, QueryError> {
        if !plan.is_iterating() {
            return Err(QueryError::NonIteratingQuery(plan.path));
        }
        Ok(LazyQuery { plan })
    }

    pub fn path(&self) -> &str {
        &self.plan.path
    }

    /// Values are borrowed from `data` except computed ones such as `length`.
    pub fn iter<'a>(
        &'a self,
        data: &'a Value,
        context: &'a Value,
    ) -> impl Iterator<Item = Cow<'a, Value>> + 'a {
        self.plan.walk(data, context).map(|found| found.value)
    }

    /// Lazy parent mode.
    pub fn parents<'a>(&'a self, data: &'a Value, context: &'a Value) -> Matches<'a> {
        self.plan.walk(data, context)
    }
}

impl fmt::Display for LazyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plan)
    }
}
