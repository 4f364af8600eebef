//! Abstract Syntax Tree for plume templates.
//!
//! A template is a flat list of nodes. Each `{{ }}` block holds one
//! [`Expression`]: a subject followed by a left-associated chain of filter
//! calls, so `a|f:x|g` is `FilterCall(FilterCall(Variable(a), f, x), g)`.
//!
//! Nodes keep spans into the template source rather than copies of text.

use plume_diagnostics::Span;

// ---------------------------------------------------------------------------
// Template-level AST
// ---------------------------------------------------------------------------

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub nodes: Vec<Node>,
}

impl Template {
    /// Number of `{{ }}` expressions in the template.
    pub fn expression_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Expression(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, copied to the output unescaped.
    Text(Span),

    /// A `{{ ... }}` block.
    Expression(Expression),

    /// A `{# ... #}` block. Renders nothing.
    Comment(Span),
}

// ---------------------------------------------------------------------------
// Expression-level AST
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A context lookup such as `user.items.0`.
    Variable(Variable),

    /// A literal written in the template.
    Literal { value: Literal, span: Span },

    /// A filter applied to the expression on its left.
    FilterCall(Box<FilterCall>),
}

impl Expression {
    /// Span covering the whole expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Variable(variable) => variable.span,
            Expression::Literal { span, .. } => *span,
            Expression::FilterCall(call) => {
                let end = call
                    .argument
                    .as_ref()
                    .map_or(call.name_span, Expression::span);
                call.subject.span().merge(end)
            }
        }
    }

    /// Number of filters applied in this expression.
    pub fn filter_count(&self) -> usize {
        match self {
            Expression::FilterCall(call) => 1 + call.subject.filter_count(),
            _ => 0,
        }
    }
}

/// A dotted lookup path. The first segment is a context key, later segments
/// are map keys or list indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub path: Vec<PathSegment>,
    pub span: Span,
}

impl Variable {
    /// The dotted path as written, e.g. `user.items.0`.
    pub fn dotted(&self) -> String {
        let parts: Vec<&str> = self.path.iter().map(|s| s.name.as_str()).collect();
        parts.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    /// Quote-stripped and unescaped. Template string literals are trusted
    /// and never autoescaped.
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub subject: Expression,
    pub name: String,
    pub name_span: Span,
    /// Either a literal or a variable; never another filter call.
    pub argument: Option<Expression>,
}
