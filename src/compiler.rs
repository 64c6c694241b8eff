use std::{fmt, sync::Arc};

use crate::{
    error::QueryError,
    evaluator::{Engine, LogicEngine},
    mutation::Mutation,
    query::{LazyQuery, Plan, Query},
    template::ObjectTemplate,
    value::Value,
};

/// Entry point for compiling paths and templates with a chosen logic engine.
///
/// `Query::compile` and friends use `Compiler::default()`, which installs
/// [`Engine`].
///
/// # Examples
///
/// ```
/// use pathquery::{Compiler, Engine, Value};
///
/// let compiler = Compiler::with_engine(Engine);
/// let query = compiler.query("$.name").unwrap();
/// assert_eq!(query.run(&Value::Null, &Value::Null), Value::Null);
/// ```
#[derive(Clone)]
pub struct Compiler {
    engine: Arc<dyn LogicEngine>,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler {
            engine: Arc::new(Engine),
        }
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler").finish_non_exhaustive()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: impl LogicEngine + 'static) -> Self {
        Compiler {
            engine: Arc::new(engine),
        }
    }

    pub fn query(&self, path: &str) -> Result<Query, QueryError> {
        self.plan(path).map(Query::from_plan)
    }

    pub fn lazy_query(&self, path: &str) -> Result<LazyQuery, QueryError> {
        self.plan(path).and_then(LazyQuery::from_plan)
    }

    pub fn mutation(&self, path: &str) -> Result<Mutation, QueryError> {
        self.plan(path).and_then(Mutation::from_plan)
    }

    pub fn template(&self, template: &Value) -> Result<ObjectTemplate, QueryError> {
        ObjectTemplate::compile_with(self, template)
    }

    fn plan(&self, path: &str) -> Result<Plan, QueryError> {
        let plan = Plan::build(path, self.engine.as_ref())?;
        tracing::debug!(path, levels = plan.levels.len(), "compiled path");
        Ok(plan)
    }
}
