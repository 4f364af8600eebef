//! plume parser
//!
//! Parses template source into a [`Template`] AST. Each `{{ }}` block
//! becomes an [`Expression`]: a subject followed by a left-associated chain
//! of filter calls. Filter arity is validated at parse time against a
//! [`FilterSet`], so a bad call is a [`SyntaxError`] before any context
//! exists.
//!
//! # Example
//!
//! ```
//! use plume_parser::{parse, ArgType, FilterSpec};
//!
//! let filters = vec![FilterSpec::unary("center", ArgType::Integer)];
//! let template = parse("{{ name|center:9 }}", filters.as_slice()).unwrap();
//! assert_eq!(template.expression_count(), 1);
//!
//! let err = parse("{{ name|center }}", filters.as_slice()).unwrap_err();
//! assert_eq!(err.to_string(), "center requires 2 arguments, 1 provided");
//! ```

pub mod ast;
pub mod error;
pub mod filters;
pub mod parser;

pub use ast::{Expression, FilterCall, Literal, Node, PathSegment, Template, Variable};
pub use error::SyntaxError;
pub use filters::{ArgType, FilterSet, FilterSpec};
pub use parser::Parser;

/// Parse a template against the given filters.
pub fn parse<F: FilterSet + ?Sized>(source: &str, filters: &F) -> Result<Template, SyntaxError> {
    Parser::parse(source, filters)
}
