use plume_diagnostics::{Diagnostic, Span};

/// A terminal compile-time error. Every variant carries the span it is
/// reported at; [`SyntaxError::to_diagnostic`] turns it into a renderable
/// [`Diagnostic`].
///
/// Arity counts in the messages include the filtered value, so a filter
/// that takes one argument "requires 2 arguments".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Invalid filter: '{name}'")]
    UnknownFilter { name: String, span: Span },

    /// A filter that needs an argument was called without one. The header
    /// names the counts; "Expected an argument" is reserved for a colon
    /// with nothing after it, see [`SyntaxError::ExpectedArgument`].
    #[error("{name} requires {}, {provided} provided", arguments(.required))]
    MissingArgument {
        name: String,
        required: usize,
        provided: usize,
        span: Span,
    },

    #[error("{name} requires {}, {provided} provided", arguments(.required))]
    UnexpectedArgument {
        name: String,
        required: usize,
        provided: usize,
        span: Span,
        argument: Span,
    },

    #[error("Expected a valid variable name")]
    InvalidVariable { span: Span },

    #[error("Variables and attributes may not begin with underscores: '{name}'")]
    UnderscoreVariable { name: String, span: Span },

    #[error("Could not parse the remainder")]
    UnexpectedToken { span: Span },

    #[error("Expected a valid filter name")]
    ExpectedFilterName { span: Span },

    #[error("Expected an argument")]
    ExpectedArgument { span: Span },

    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("Empty variable tag")]
    EmptyVariable { span: Span },

    #[error("Unsupported tag: '{name}'")]
    UnsupportedTag { name: String, span: Span },

    #[error("Integer literal out of range")]
    IntegerOverflow { span: Span },
}

fn arguments(count: &usize) -> String {
    match count {
        1 => "1 argument".to_string(),
        n => format!("{n} arguments"),
    }
}

impl SyntaxError {
    /// Primary span of the error.
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::UnknownFilter { span, .. }
            | SyntaxError::MissingArgument { span, .. }
            | SyntaxError::UnexpectedArgument { span, .. }
            | SyntaxError::InvalidVariable { span }
            | SyntaxError::UnderscoreVariable { span, .. }
            | SyntaxError::UnexpectedToken { span }
            | SyntaxError::ExpectedFilterName { span }
            | SyntaxError::ExpectedArgument { span }
            | SyntaxError::UnterminatedString { span }
            | SyntaxError::EmptyVariable { span }
            | SyntaxError::UnsupportedTag { span, .. }
            | SyntaxError::IntegerOverflow { span } => *span,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyntaxError::UnexpectedArgument { .. } => "unexpected argument",
            _ => "here",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string(), self.span(), self.label());
        match self {
            SyntaxError::UnexpectedArgument { argument, .. } => {
                diagnostic.with_secondary(*argument, "argument")
            }
            _ => diagnostic,
        }
    }
}

impl From<SyntaxError> for Diagnostic {
    fn from(error: SyntaxError) -> Self {
        error.to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arity_messages() {
        let missing = SyntaxError::MissingArgument {
            name: "center".to_string(),
            required: 2,
            provided: 1,
            span: Span::new(7, 13),
        };
        assert_eq!(missing.to_string(), "center requires 2 arguments, 1 provided");

        let unexpected = SyntaxError::UnexpectedArgument {
            name: "safe".to_string(),
            required: 1,
            provided: 2,
            span: Span::new(8, 12),
            argument: Span::new(13, 20),
        };
        assert_eq!(unexpected.to_string(), "safe requires 1 argument, 2 provided");
    }

    #[test]
    fn test_labels_distinguish_missing_from_unexpected() {
        let missing = SyntaxError::MissingArgument {
            name: "add".to_string(),
            required: 2,
            provided: 1,
            span: Span::new(7, 10),
        };
        let diagnostic = missing.to_diagnostic();
        assert_eq!(diagnostic.primary.text, "here");
        assert!(diagnostic.secondary.is_none());

        let unexpected = SyntaxError::UnexpectedArgument {
            name: "lower".to_string(),
            required: 1,
            provided: 2,
            span: Span::new(7, 12),
            argument: Span::new(13, 14),
        };
        let diagnostic = Diagnostic::from(unexpected);
        assert_eq!(diagnostic.primary.text, "unexpected argument");
        assert_eq!(diagnostic.primary.span, Span::new(7, 12));
        assert_eq!(
            diagnostic.secondary.map(|label| label.span),
            Some(Span::new(13, 14))
        );
    }

    #[test]
    fn test_unknown_filter_message() {
        let error = SyntaxError::UnknownFilter {
            name: "bar".to_string(),
            span: Span::new(7, 10),
        };
        assert_eq!(error.to_string(), "Invalid filter: 'bar'");
        assert_eq!(error.span(), Span::new(7, 10));
    }
}
