use std::fmt;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl From<Severity> for miette::Severity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        }
    }
}

/// A span paired with the short text printed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub text: String,
}

impl Label {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// A structured, span-located error report.
///
/// Diagnostics hold spans only; turning one into text needs the original
/// source, see [`render`](crate::render) and [`Report`](crate::Report).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub primary: Label,
    pub secondary: Option<Label>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span, label: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            primary: Label::new(span, label),
            secondary: None,
        }
    }

    pub fn warning(message: impl Into<String>, span: Span, label: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message, span, label)
        }
    }

    pub fn with_secondary(mut self, span: Span, label: impl Into<String>) -> Self {
        self.secondary = Some(Label::new(span, label));
        self
    }

    pub fn primary_span(&self) -> Span {
        self.primary.span
    }

    /// All labels, primary first.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        std::iter::once(&self.primary).chain(self.secondary.as_ref())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructor() {
        let diagnostic = Diagnostic::error("Expected an argument", Span::new(7, 13), "here");
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.primary_span(), Span::new(7, 13));
        assert_eq!(diagnostic.primary.text, "here");
        assert!(diagnostic.secondary.is_none());
        assert_eq!(diagnostic.to_string(), "Expected an argument");
    }

    #[test]
    fn test_labels_primary_first() {
        let diagnostic = Diagnostic::warning("msg", Span::new(5, 8), "key")
            .with_secondary(Span::new(0, 3), "object");
        let texts: Vec<_> = diagnostic.labels().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["key", "object"]);
        assert_eq!(
            miette::Severity::from(diagnostic.severity),
            miette::Severity::Warning
        );
    }
}
