use plume_diagnostics::Span;

/// Token classification for the expression syntax inside `{{ ... }}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Pipe,
    Colon,
    Dot,

    // Literals
    IntLiteral,
    FloatLiteral,
    /// Quoted text. The token text keeps its quotes and escapes.
    StringLiteral,

    /// A malformed character sequence. The parser reports it.
    Other,

    // End of input
    Eof,
}

/// A token produced by the expression lexer.
///
/// `text` borrows from the template source and always equals
/// `&source[span.start..span.end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub span: Span,
}

impl<'s> Token<'s> {
    pub fn new(kind: TokenKind, text: &'s str, span: Span) -> Self {
        Self { kind, text, span }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Classification of the top-level pieces of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateTokenKind {
    /// Literal text copied to the output.
    Text,
    /// `{{ ... }}`
    Variable,
    /// `{# ... #}`
    Comment,
    /// `{% ... %}`
    Tag,
}

/// A top-level piece of a template.
///
/// `span` covers the whole piece including delimiters; `content` covers the
/// text between the delimiters (equal to `span` for [`TemplateTokenKind::Text`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateToken {
    pub kind: TemplateTokenKind,
    pub span: Span,
    pub content: Span,
}

impl TemplateToken {
    pub fn new(kind: TemplateTokenKind, span: Span, content: Span) -> Self {
        Self {
            kind,
            span,
            content,
        }
    }

    pub fn text(span: Span) -> Self {
        Self::new(TemplateTokenKind::Text, span, span)
    }
}

pub const START_VARIABLE: &str = "{{";
pub const END_VARIABLE: &str = "}}";
pub const START_COMMENT: &str = "{#";
pub const END_COMMENT: &str = "#}";
pub const START_TAG: &str = "{%";
pub const END_TAG: &str = "%}";

/// Delimiter length shared by all three block kinds.
pub const DELIMITER_LEN: usize = 2;
