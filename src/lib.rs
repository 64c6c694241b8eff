pub mod ast;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod mutation;
pub mod parser;
pub mod query;
pub mod segment;
pub mod template;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Logic, Operator};
pub use compiler::Compiler;
pub use error::QueryError;
pub use evaluator::{Args, Engine, LogicEngine, Predicate};
pub use lexer::{Extracted, Lexer, extract_literals};
pub use mutation::{Mutation, Mutator};
pub use parser::{parse_expression, parse_filter};
pub use query::{LazyQuery, Matches, ParentMatch, Query};
pub use segment::split_path;
pub use template::ObjectTemplate;
pub use value::Value;
