//! Template parser for plume.
//!
//! Splits the source with the template scanner, then parses each `{{ }}`
//! block with recursive descent over the expression lexer's tokens:
//!
//! ```text
//! expression := operand ( "|" filter )*
//! filter     := IDENT ( ":" operand )?
//! operand    := INT | FLOAT | STRING | IDENT ( "." ( IDENT | INT ) )*
//! ```
//!
//! Filter arity is checked against a [`FilterSet`] as soon as each filter
//! call is read, so a template with a missing or extra argument never
//! compiles, whatever context it would later be rendered with.

use plume_lexer::{ExprLexer, Scanner, TemplateToken, TemplateTokenKind, Token, TokenKind};
use tracing::{debug, trace};

use crate::ast::{Expression, FilterCall, Literal, Node, PathSegment, Template, Variable};
use crate::filters::FilterSet;
use crate::SyntaxError;

/// Expression parser for one `{{ }}` block.
pub struct Parser<'s, 'f, F: FilterSet + ?Sized> {
    tokens: Vec<Token<'s>>,
    pos: usize,
    filters: &'f F,
}

impl<'s, 'f, F: FilterSet + ?Sized> Parser<'s, 'f, F> {
    /// Create a new parser over expression tokens. The token list must end
    /// with `Eof`, as produced by [`ExprLexer::tokenize`].
    pub fn new(tokens: Vec<Token<'s>>, filters: &'f F) -> Self {
        Self {
            tokens,
            pos: 0,
            filters,
        }
    }

    /// Parse a whole template.
    pub fn parse(source: &'s str, filters: &'f F) -> Result<Template, SyntaxError> {
        let mut nodes = Vec::new();

        for token in Scanner::tokenize(source) {
            let node = match token.kind {
                TemplateTokenKind::Text => Node::Text(token.span),
                TemplateTokenKind::Comment => Node::Comment(token.span),
                TemplateTokenKind::Variable => {
                    Node::Expression(Self::parse_block(source, token, filters)?)
                }
                TemplateTokenKind::Tag => {
                    let name = token
                        .content
                        .slice(source)
                        .split_whitespace()
                        .next()
                        .unwrap_or_default();
                    return Err(SyntaxError::UnsupportedTag {
                        name: name.to_string(),
                        span: token.span,
                    });
                }
            };
            nodes.push(node);
        }

        debug!(nodes = nodes.len(), "parsed template");
        Ok(Template { nodes })
    }

    /// Parse the expression inside one `{{ }}` block.
    pub fn parse_block(
        source: &'s str,
        block: TemplateToken,
        filters: &'f F,
    ) -> Result<Expression, SyntaxError> {
        let tokens = ExprLexer::tokenize(source, block.content);
        let mut parser = Parser::new(tokens, filters);

        if parser.peek().is_eof() {
            return Err(SyntaxError::EmptyVariable { span: block.span });
        }
        parser.parse_expression()
    }

    /// Parse an operand and its filter chain, up to `Eof`.
    pub fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        let mut expression = self.parse_operand()?;

        loop {
            match self.peek().kind {
                TokenKind::Pipe => {
                    let pipe = self.advance();
                    expression = self.parse_filter(expression, pipe)?;
                }
                TokenKind::Eof => return Ok(expression),
                _ => return Err(self.remainder()),
            }
        }
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Parse `name[:argument]` after a `|` and check it against the filter set.
    fn parse_filter(&mut self, subject: Expression, pipe: Token<'s>) -> Result<Expression, SyntaxError> {
        let name_token = self.peek();
        if name_token.kind != TokenKind::Identifier {
            let span = if name_token.is_eof() {
                pipe.span
            } else {
                name_token.span
            };
            return Err(SyntaxError::ExpectedFilterName { span });
        }
        self.advance();

        let name = name_token.text;
        let name_span = name_token.span;
        let spec = self
            .filters
            .lookup(name)
            .ok_or_else(|| SyntaxError::UnknownFilter {
                name: name.to_string(),
                span: name_span,
            })?;

        let argument = if self.peek().kind == TokenKind::Colon {
            let colon = self.advance();
            if matches!(
                self.peek().kind,
                TokenKind::Eof | TokenKind::Pipe | TokenKind::Colon
            ) {
                return Err(SyntaxError::ExpectedArgument { span: colon.span });
            }
            Some(self.parse_operand()?)
        } else {
            None
        };

        let provided = usize::from(argument.is_some());
        if !spec.accepts(provided) {
            return Err(match argument.as_ref() {
                Some(argument) if provided > spec.max_args => SyntaxError::UnexpectedArgument {
                    name: name.to_string(),
                    required: spec.max_args + 1,
                    provided: provided + 1,
                    span: name_span,
                    argument: argument.span(),
                },
                _ => SyntaxError::MissingArgument {
                    name: name.to_string(),
                    required: spec.min_args + 1,
                    provided: provided + 1,
                    span: name_span,
                },
            });
        }

        trace!(filter = name, has_argument = argument.is_some(), "parsed filter call");
        Ok(Expression::FilterCall(Box::new(FilterCall {
            subject,
            name: name.to_string(),
            name_span,
            argument,
        })))
    }

    // =========================================================================
    // Operands
    // =========================================================================

    /// Parse a literal or a variable path.
    fn parse_operand(&mut self) -> Result<Expression, SyntaxError> {
        let token = self.advance();
        let span = token.span;

        match token.kind {
            TokenKind::IntLiteral => {
                let value = token
                    .text
                    .parse::<i64>()
                    .map_err(|_| SyntaxError::IntegerOverflow { span })?;
                Ok(Expression::Literal {
                    value: Literal::Int(value),
                    span,
                })
            }
            TokenKind::FloatLiteral => {
                let value = token
                    .text
                    .parse::<f64>()
                    .map_err(|_| SyntaxError::UnexpectedToken { span })?;
                Ok(Expression::Literal {
                    value: Literal::Float(value),
                    span,
                })
            }
            TokenKind::StringLiteral => Ok(Expression::Literal {
                value: Literal::String(unescape_string(token.text)),
                span,
            }),
            TokenKind::Identifier => self.parse_variable(token),
            TokenKind::Other if token.text.starts_with(['\'', '"']) => {
                Err(SyntaxError::UnterminatedString { span })
            }
            _ => Err(SyntaxError::InvalidVariable { span }),
        }
    }

    /// Parse `first(.segment)*` where segments are names or list indices.
    fn parse_variable(&mut self, first: Token<'s>) -> Result<Expression, SyntaxError> {
        let mut path = vec![path_segment(first)?];
        let mut span = first.span;

        while self.peek().kind == TokenKind::Dot {
            let dot = self.advance();
            let next = self.peek();
            let segment = match next.kind {
                TokenKind::Identifier | TokenKind::IntLiteral => path_segment(next)?,
                TokenKind::Other | TokenKind::StringLiteral | TokenKind::FloatLiteral => {
                    return Err(SyntaxError::InvalidVariable { span: next.span });
                }
                _ => return Err(SyntaxError::InvalidVariable { span: dot.span }),
            };
            self.advance();
            span = span.merge(segment.span);
            path.push(segment);
        }

        Ok(Expression::Variable(Variable { path, span }))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Everything from the current token to the end of the block.
    fn remainder(&self) -> SyntaxError {
        let start = self.peek().span;
        let end = self
            .tokens
            .iter()
            .rev()
            .find(|token| !token.is_eof())
            .map_or(start, |token| token.span);
        SyntaxError::UnexpectedToken {
            span: start.merge(end),
        }
    }

    fn peek(&self) -> Token<'s> {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token<'s> {
        let token = self.peek();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }
}

fn path_segment(token: Token<'_>) -> Result<PathSegment, SyntaxError> {
    if token.text.starts_with('_') {
        return Err(SyntaxError::UnderscoreVariable {
            name: token.text.to_string(),
            span: token.span,
        });
    }
    Ok(PathSegment {
        name: token.text.to_string(),
        span: token.span,
    })
}

/// Strip the quotes and undo `\<quote>` and `\\` escapes. Any other
/// backslash is kept as written. Walks the text the same way the lexer
/// scanned it, so an escaped backslash never pairs with the next quote.
fn unescape_string(text: &str) -> String {
    let mut chars = text.chars();
    let quote = chars.next();
    chars.next_back();

    let mut out = String::with_capacity(text.len());
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if next == '\\' || Some(next) == quote => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
