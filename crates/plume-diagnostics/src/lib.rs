//! plume diagnostics
//!
//! Source spans, the line/column tracker, structured diagnostics and the
//! renderer that turns them into annotated source snippets.
//!
//! # Example
//!
//! ```
//! use plume_diagnostics::{render, Diagnostic, Span};
//!
//! let source = "{{ foo|center }}";
//! let diagnostic = Diagnostic::error("Expected an argument", Span::new(7, 13), "here");
//! assert!(render(&diagnostic, source).contains("───┬──"));
//! ```

pub mod diagnostic;
pub mod report;
pub mod span;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use report::{render, render_with, Report, ReportOptions};
pub use span::{LineIndex, Location, Span};
