use plume_diagnostics::Span;

use crate::token::{
    TemplateToken, TemplateTokenKind, DELIMITER_LEN, END_COMMENT, END_TAG, END_VARIABLE,
    START_COMMENT, START_TAG, START_VARIABLE,
};

/// Template source scanner.
///
/// Splits a template into literal text and `{{ }}` / `{# #}` / `{% %}`
/// blocks. A block must close on the line it opens; an opener without a
/// closer is literal text. Closers match lazily, so `{{ a }} }}` ends at the
/// first `}}`.
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    text_start: usize,
    tokens: Vec<TemplateToken>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            text_start: 0,
            tokens: Vec::new(),
        }
    }

    /// Split the entire source into template tokens.
    pub fn tokenize(source: &str) -> Vec<TemplateToken> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens();
        scanner.tokens
    }

    fn scan_tokens(&mut self) {
        while let Some(offset) = self.source[self.pos..].find('{') {
            let start = self.pos + offset;
            match self.block_at(start) {
                Some(token) => {
                    self.flush_text(start);
                    self.pos = token.span.end;
                    self.text_start = self.pos;
                    self.tokens.push(token);
                }
                None => self.pos = start + 1,
            }
        }
        self.flush_text(self.source.len());
    }

    /// Recognise a block opening at `start`, if it closes on the same line.
    fn block_at(&self, start: usize) -> Option<TemplateToken> {
        let rest = &self.source[start..];
        let (kind, closer) = if rest.starts_with(START_VARIABLE) {
            (TemplateTokenKind::Variable, END_VARIABLE)
        } else if rest.starts_with(START_COMMENT) {
            (TemplateTokenKind::Comment, END_COMMENT)
        } else if rest.starts_with(START_TAG) {
            (TemplateTokenKind::Tag, END_TAG)
        } else {
            return None;
        };

        let inner_start = start + DELIMITER_LEN;
        let line = &self.source[inner_start..];
        let line = match line.find('\n') {
            Some(newline) => &line[..newline],
            None => line,
        };
        let inner_end = inner_start + line.find(closer)?;

        Some(TemplateToken::new(
            kind,
            Span::new(start, inner_end + DELIMITER_LEN),
            Span::new(inner_start, inner_end),
        ))
    }

    fn flush_text(&mut self, end: usize) {
        if end > self.text_start {
            self.tokens
                .push(TemplateToken::text(Span::new(self.text_start, end)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: scan and return (kind, whole text, content text).
    fn pieces(source: &str) -> Vec<(TemplateTokenKind, &str, &str)> {
        Scanner::tokenize(source)
            .into_iter()
            .map(|t| (t.kind, t.span.slice(source), t.content.slice(source)))
            .collect()
    }

    #[test]
    fn test_empty_source() {
        assert!(Scanner::tokenize("").is_empty());
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            pieces("Hello, world!"),
            vec![(TemplateTokenKind::Text, "Hello, world!", "Hello, world!")]
        );
    }

    #[test]
    fn test_single_variable() {
        assert_eq!(
            pieces("{{ var|center:5 }}"),
            vec![(TemplateTokenKind::Variable, "{{ var|center:5 }}", " var|center:5 ")]
        );
    }

    #[test]
    fn test_variable_content_span() {
        let tokens = Scanner::tokenize("ab{{ x }}");
        assert_eq!(tokens[1].span, Span::new(2, 9));
        assert_eq!(tokens[1].content, Span::new(4, 7));
    }

    #[test]
    fn test_text_around_variable() {
        assert_eq!(
            pieces("Hi {{ name }}!"),
            vec![
                (TemplateTokenKind::Text, "Hi ", "Hi "),
                (TemplateTokenKind::Variable, "{{ name }}", " name "),
                (TemplateTokenKind::Text, "!", "!"),
            ]
        );
    }

    #[test]
    fn test_comment_and_tag() {
        assert_eq!(
            pieces("{# note #}{% load x %}"),
            vec![
                (TemplateTokenKind::Comment, "{# note #}", " note "),
                (TemplateTokenKind::Tag, "{% load x %}", " load x "),
            ]
        );
    }

    #[test]
    fn test_adjacent_variables() {
        let kinds: Vec<_> = Scanner::tokenize("{{ a }}{{ b }}")
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![TemplateTokenKind::Variable, TemplateTokenKind::Variable]
        );
    }

    #[test]
    fn test_unterminated_variable_is_text() {
        assert_eq!(
            pieces("a {{ b"),
            vec![(TemplateTokenKind::Text, "a {{ b", "a {{ b")]
        );
    }

    #[test]
    fn test_variable_cannot_span_lines() {
        assert_eq!(
            pieces("{{ a\n}}"),
            vec![(TemplateTokenKind::Text, "{{ a\n}}", "{{ a\n}}")]
        );
    }

    #[test]
    fn test_lazy_close() {
        assert_eq!(
            pieces("{{ a }} }}"),
            vec![
                (TemplateTokenKind::Variable, "{{ a }}", " a "),
                (TemplateTokenKind::Text, " }}", " }}"),
            ]
        );
    }

    #[test]
    fn test_lone_brace_is_text() {
        assert_eq!(
            pieces("{x} {{ y }}"),
            vec![
                (TemplateTokenKind::Text, "{x} ", "{x} "),
                (TemplateTokenKind::Variable, "{{ y }}", " y "),
            ]
        );
    }

    #[test]
    fn test_empty_variable() {
        assert_eq!(
            pieces("{{}}"),
            vec![(TemplateTokenKind::Variable, "{{}}", "")]
        );
    }

    #[test]
    fn test_variables_on_separate_lines() {
        let tokens = Scanner::tokenize("{{ a }}\n{{ b }}");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].content, Span::new(10, 13));
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            pieces("héllo {{ x }}"),
            vec![
                (TemplateTokenKind::Text, "héllo ", "héllo "),
                (TemplateTokenKind::Variable, "{{ x }}", " x "),
            ]
        );
    }
}
