//! Error types for compiling and rendering.
//!
//! [`RenderError`] is produced while rendering and carries the span of the
//! expression that failed. [`Error`] is what the public API returns: a
//! syntax or render diagnostic bundled with the template source, whose
//! `Display` output is the rendered report.

use plume_diagnostics::{Diagnostic, Report, Span};
use plume_parser::SyntaxError;

/// Why a value could not be produced for a filter argument.
///
/// A missing variable and a value of the wrong shape are the same class of
/// failure: either way the filter has nothing it can use.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionFailure {
    #[error("Failed lookup for key [{key}] in {object}")]
    Missing {
        key: String,
        /// Display of the context, or of the value the key was looked up in.
        object: String,
        /// Span of the partial path the key was looked up in, if any.
        object_span: Option<Span>,
    },

    #[error("Couldn't convert argument {value} to {target}")]
    Unconvertible { value: String, target: &'static str },
}

/// A failure while rendering an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("{reason}")]
    ResolutionFailure {
        reason: ResolutionFailure,
        span: Span,
    },

    #[error("{message}")]
    FilterFailure {
        filter: String,
        message: String,
        span: Span,
    },
}

impl RenderError {
    pub fn span(&self) -> Span {
        match self {
            RenderError::ResolutionFailure { span, .. } | RenderError::FilterFailure { span, .. } => {
                *span
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RenderError::ResolutionFailure { reason, span } => match reason {
                ResolutionFailure::Missing {
                    object,
                    object_span,
                    ..
                } => {
                    let diagnostic = Diagnostic::error(self.to_string(), *span, "key");
                    match object_span {
                        Some(object_span) => diagnostic.with_secondary(*object_span, object.as_str()),
                        None => diagnostic,
                    }
                }
                ResolutionFailure::Unconvertible { .. } => {
                    Diagnostic::error(self.to_string(), *span, "argument")
                }
            },
            RenderError::FilterFailure { span, .. } => {
                Diagnostic::error(self.to_string(), *span, "here")
            }
        }
    }
}

/// Error returned by [`Engine::compile`](crate::Engine::compile) and
/// [`Template::render`](crate::Template::render).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The template did not compile. Terminal for the template.
    #[error(transparent)]
    Syntax(Report),

    /// One render call failed. The compiled template stays usable.
    #[error(transparent)]
    Render(Report),
}

impl Error {
    pub(crate) fn syntax(error: &SyntaxError, source: impl Into<std::sync::Arc<str>>) -> Self {
        Error::Syntax(Report::new(error.to_diagnostic(), source))
    }

    pub(crate) fn render(error: &RenderError, source: impl Into<std::sync::Arc<str>>) -> Self {
        Error::Render(Report::new(error.to_diagnostic(), source))
    }

    pub fn report(&self) -> &Report {
        match self {
            Error::Syntax(report) | Error::Render(report) => report,
        }
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.report().diagnostic
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_key_labels() {
        let error = RenderError::ResolutionFailure {
            reason: ResolutionFailure::Missing {
                key: "bar".to_string(),
                object: "{\"foo\": 1}".to_string(),
                object_span: None,
            },
            span: Span::new(11, 14),
        };
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.message, "Failed lookup for key [bar] in {\"foo\": 1}");
        assert_eq!(diagnostic.primary.text, "key");
        assert!(diagnostic.secondary.is_none());
    }

    #[test]
    fn test_nested_missing_key_labels_object() {
        let error = RenderError::ResolutionFailure {
            reason: ResolutionFailure::Missing {
                key: "baz".to_string(),
                object: "1".to_string(),
                object_span: Some(Span::new(3, 10)),
            },
            span: Span::new(11, 14),
        };
        let diagnostic = error.to_diagnostic();
        let secondary = diagnostic.secondary.unwrap();
        assert_eq!(secondary.text, "1");
        assert_eq!(secondary.span, Span::new(3, 10));
    }

    #[test]
    fn test_unconvertible_label() {
        let error = RenderError::ResolutionFailure {
            reason: ResolutionFailure::Unconvertible {
                value: "inf".to_string(),
                target: "integer",
            },
            span: Span::new(14, 17),
        };
        assert_eq!(error.to_string(), "Couldn't convert argument inf to integer");
        assert_eq!(error.to_diagnostic().primary.text, "argument");
        assert_eq!(error.span(), Span::new(14, 17));
    }

    #[test]
    fn test_error_display_is_report() {
        let source = "{{ foo|first }}";
        let error = RenderError::FilterFailure {
            filter: "first".to_string(),
            message: "'int' object is not subscriptable".to_string(),
            span: Span::new(7, 12),
        };
        let error = Error::render(&error, source);
        assert!(!error.is_syntax());
        assert_eq!(
            error.to_string(),
            "  × 'int' object is not subscriptable
   ╭────
 1 │ {{ foo|first }}
   ·        ──┬──
   ·          ╰── here
   ╰────
"
        );
    }
}
