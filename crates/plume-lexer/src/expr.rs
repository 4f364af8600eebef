//! Lexer for the expression syntax inside `{{ ... }}`.
//!
//! Tokenizes a variable path followed by `|filter:argument` applications.
//! The lexer never fails: a character sequence it cannot classify becomes a
//! single [`TokenKind::Other`] token and the parser decides how to report it.
//!
//! Input is split into *words* at whitespace, `|`, `:` and quotes. A word
//! that reads as a number becomes one numeric literal; anything else is a
//! dotted path whose segments are identifiers, integer indices or `Other`.
//!
//! ```
//! use plume_diagnostics::Span;
//! use plume_lexer::{ExprLexer, TokenKind};
//!
//! let source = "{{ var|center:5 }}";
//! let tokens = ExprLexer::tokenize(source, Span::new(2, 16));
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::Identifier,
//!         TokenKind::Pipe,
//!         TokenKind::Identifier,
//!         TokenKind::Colon,
//!         TokenKind::IntLiteral,
//!         TokenKind::Eof,
//!     ]
//! );
//! assert_eq!(tokens[2].text, "center");
//! ```

use plume_diagnostics::Span;

use crate::token::{Token, TokenKind};

/// Expression lexer over one `{{ }}` block of a template.
///
/// Token spans are absolute offsets into the full template source, so
/// diagnostics can slice the original line without re-scanning.
pub struct ExprLexer<'s> {
    source: &'s str,
    pos: usize,
    end: usize,
    tokens: Vec<Token<'s>>,
}

impl<'s> ExprLexer<'s> {
    /// Create a lexer over `content`, a span of `source`.
    pub fn new(source: &'s str, content: Span) -> Self {
        Self {
            source,
            pos: content.start,
            end: content.end.min(source.len()),
            tokens: Vec::new(),
        }
    }

    /// Tokenize `content`. The result always ends with an `Eof` token.
    pub fn tokenize(source: &'s str, content: Span) -> Vec<Token<'s>> {
        let mut lexer = ExprLexer::new(source, content);
        lexer.scan_tokens();
        lexer.tokens
    }

    fn scan_tokens(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }
            let Some(ch) = self.peek() else {
                break;
            };
            match ch {
                '|' => self.single(TokenKind::Pipe),
                ':' => self.single(TokenKind::Colon),
                '"' | '\'' => self.scan_string(ch),
                _ => self.scan_word(),
            }
        }
        self.push(TokenKind::Eof, self.end, self.end);
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.advance();
        self.push(kind, start, self.pos);
    }

    /// Scan a quoted string. Backslash escapes the next character.
    /// An unterminated string becomes `Other` up to the end of the block.
    fn scan_string(&mut self, quote: char) {
        let start = self.pos;
        self.advance(); // consume opening quote

        loop {
            match self.peek() {
                None => {
                    self.push(TokenKind::Other, start, self.end);
                    return;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(c) if c == quote => {
                    self.advance();
                    self.push(TokenKind::StringLiteral, start, self.pos);
                    return;
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        while self.peek().is_some_and(|c| !is_word_boundary(c)) {
            self.advance();
        }
        let word = &self.source[start..self.pos];

        if let Some(kind) = number_kind(word) {
            self.push(kind, start, self.pos);
            return;
        }

        let mut segment_start = start;
        for (i, segment) in word.split('.').enumerate() {
            if i > 0 {
                self.push(TokenKind::Dot, segment_start - 1, segment_start);
            }
            if !segment.is_empty() {
                let segment_end = segment_start + segment.len();
                self.push(segment_kind(segment), segment_start, segment_end);
            }
            segment_start += segment.len() + 1;
        }
    }

    // --- Helpers ---

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let span = Span::new(start, end);
        self.tokens
            .push(Token::new(kind, span.slice(self.source), span));
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..self.end].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '|' | ':' | '"' | '\'')
}

/// Classify a whole word as an integer or float literal.
///
/// Accepts an optional sign, digits with at most one decimal point, and an
/// optional exponent (`1e3`, `-2.5E-1`). Anything with an `e` or `.` is a
/// float.
pub fn number_kind(word: &str) -> Option<TokenKind> {
    let unsigned = word
        .strip_prefix('-')
        .or_else(|| word.strip_prefix('+'))
        .unwrap_or(word);

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return None;
    }
    if whole.is_empty() && fraction.map_or(true, str::is_empty) {
        return None;
    }
    if let Some(exponent) = exponent {
        let digits = exponent
            .strip_prefix('-')
            .or_else(|| exponent.strip_prefix('+'))
            .unwrap_or(exponent);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }

    if fraction.is_none() && exponent.is_none() {
        Some(TokenKind::IntLiteral)
    } else {
        Some(TokenKind::FloatLiteral)
    }
}

fn segment_kind(segment: &str) -> TokenKind {
    if is_identifier(segment) {
        TokenKind::Identifier
    } else if segment.bytes().all(|b| b.is_ascii_digit()) {
        TokenKind::IntLiteral
    } else {
        TokenKind::Other
    }
}

/// `true` for names made of word characters that do not start with a digit.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
