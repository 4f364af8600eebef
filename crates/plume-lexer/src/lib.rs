//! plume lexer
//!
//! Splits template source into text and `{{ }}` / `{# #}` / `{% %}` blocks,
//! and tokenizes the expression inside a variable block.
//!
//! # Example
//!
//! ```
//! use plume_lexer::{Scanner, TemplateTokenKind};
//!
//! let tokens = Scanner::tokenize("Hi {{ name|upper }}!");
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].kind, TemplateTokenKind::Variable);
//! ```

pub mod expr;
pub mod scanner;
pub mod token;

pub use expr::{is_identifier, number_kind, ExprLexer};
pub use plume_diagnostics::Span;
pub use scanner::Scanner;
pub use token::{TemplateToken, TemplateTokenKind, Token, TokenKind};
