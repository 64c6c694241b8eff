use std::collections::HashMap;

use crate::{
    compiler::Compiler,
    error::QueryError,
    query::Query,
    value::{Value, type_name},
};

#[derive(Debug, Clone)]
enum Builder {
    Query(Query),
    Array(Vec<Builder>),
    Object(Vec<(String, Builder)>),
}

impl Builder {
    fn compile(compiler: &Compiler, template: &Value) -> Result<Self, QueryError> {
        match template {
            Value::String(path) => compiler.query(path).map(Builder::Query),
            Value::Array(items) => items
                .iter()
                .map(|item| Builder::compile(compiler, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Builder::Array),
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| Ok((key.clone(), Builder::compile(compiler, item)?)))
                .collect::<Result<Vec<_>, QueryError>>()
                .map(Builder::Object),
            other => Err(QueryError::invalid(format!(
                "template leaves must be path strings, got {}",
                type_name(other)
            ))),
        }
    }

    fn build(&self, data: &Value, context: &Value) -> Value {
        match self {
            Builder::Query(query) => query.run(data, context),
            Builder::Array(items) => {
                Value::Array(items.iter().map(|item| item.build(data, context)).collect())
            }
            Builder::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, item)| (key.clone(), item.build(data, context)))
                    .collect::<HashMap<_, _>>(),
            ),
        }
    }
}

/// A template whose string leaves are paths, compiled once and built into a
/// fresh value of the same shape on every call.
///
/// # Examples
///
/// ```
/// use pathquery::{ObjectTemplate, Value};
/// use serde_json::json;
///
/// let template = ObjectTemplate::compile(&Value::from(json!({
///     "age": "$.age",
///     "nested": { "name": "$.name" }
/// })))
/// .unwrap();
///
/// let data = Value::from(json!({ "age": 23, "name": "Jesse" }));
/// assert_eq!(
///     template.build(&data, &Value::Null),
///     Value::from(json!({ "age": 23, "nested": { "name": "Jesse" } }))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ObjectTemplate {
    root: Builder,
}

impl ObjectTemplate {
    pub fn compile(template: &Value) -> Result<Self, QueryError> {
        Compiler::default().template(template)
    }

    pub(crate) fn compile_with(compiler: &Compiler, template: &Value) -> Result<Self, QueryError> {
        Ok(ObjectTemplate {
            root: Builder::compile(compiler, template)?,
        })
    }

    pub fn build(&self, data: &Value, context: &Value) -> Value {
        self.root.build(data, context)
    }
}
