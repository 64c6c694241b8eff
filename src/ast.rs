//! # Path Query Language - Abstract Syntax Tree
//!
//! Types produced by the path segmenter and the filter-expression parser.
//!
//! - **[operators]** - Operators usable inside filters
//! - **[logic]** - The operator tree a filter compiles to
//! - **[path]** - Accessor steps, segments and the segmented path
//!
//! ## Quick Start
//!
//! ```text
//! $.friends.[?(@.age > 20)].name
//! ```
//!
//! Segments into a start segment `.friends` and one wildcard level whose
//! filter is `gt(@.age,20)` and whose continuation is `.name`.
//!
//! ## Filter Syntaxes
//!
//! - **JSONPath** `[?( expr )]` - infix expression over `@` (element) and `$` (context)
//! - **Logic literal** `*{ ... }` - structured logic object, e.g.
//!   `*{ ">": [{ "var": "age" }, 20] }`
//! - **Bare wildcard** `*` or `[*]` - every element
pub mod logic;
pub mod operators;
pub mod path;

pub use logic::Logic;
pub use operators::Operator;
pub use path::{RawLevel, Segment, Segmented, Step};
