//! Compiled templates and the render walk.
//!
//! A [`Template`] owns its source and AST and shares the engine's config and
//! registry. Rendering walks the nodes in order, evaluating each expression
//! from the innermost subject outwards:
//!
//! ```text
//! subject → resolve → (argument → resolve → coerce → filter)* → escape → output
//! ```

use std::sync::Arc;

use plume_parser::{ArgType, Expression, FilterCall, FilterSet, Literal, Node};
use tracing::{debug, trace};

use crate::coerce::to_integer;
use crate::context::Context;
use crate::engine::EngineConfig;
use crate::error::{Error, RenderError};
use crate::escape::render_value;
use crate::filters::Registry;
use crate::value::Value;

/// A compiled template. Immutable, cheap to clone, and safe to render from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct Template {
    source: Arc<str>,
    ast: Arc<plume_parser::Template>,
    config: Arc<EngineConfig>,
    registry: Arc<Registry>,
}

impl Template {
    pub(crate) fn new(
        source: Arc<str>,
        ast: plume_parser::Template,
        config: Arc<EngineConfig>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            source,
            ast: Arc::new(ast),
            config,
            registry,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &plume_parser::Template {
        &self.ast
    }

    /// Render against a context.
    ///
    /// A failure aborts this render only; the template can be rendered
    /// again with another context.
    pub fn render(&self, context: &Context) -> Result<String, Error> {
        self.render_to_string(context).map_err(|err| {
            debug!(error = %err, "render failed");
            Error::render(&err, Arc::clone(&self.source))
        })
    }

    fn render_to_string(&self, context: &Context) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.source.len());
        for node in &self.ast.nodes {
            self.render_node(node, context, &mut out)?;
        }
        debug!(
            expressions = self.ast.expression_count(),
            bytes = out.len(),
            "rendered template"
        );
        Ok(out)
    }

    fn render_node(
        &self,
        node: &Node,
        context: &Context,
        out: &mut String,
    ) -> Result<(), RenderError> {
        match node {
            Node::Text(span) => out.push_str(span.slice(&self.source)),
            Node::Expression(expression) => {
                let value = match self.evaluate(expression, context)? {
                    Some(value) => value,
                    None => Value::String(self.config.string_if_invalid.clone()),
                };
                out.push_str(&render_value(&value, self.config.autoescape));
            }
            Node::Comment(_) => {}
        }
        Ok(())
    }

    /// Evaluate an expression. `None` means the subject could not be
    /// resolved and `string_if_invalid` stands in for the whole expression.
    fn evaluate(
        &self,
        expression: &Expression,
        context: &Context,
    ) -> Result<Option<Value>, RenderError> {
        match expression {
            Expression::Variable(variable) => match context.resolve(variable) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    trace!(variable = %variable.dotted(), error = %err, "subject not found");
                    Ok(None)
                }
            },
            Expression::Literal { value, .. } => Ok(Some(literal(value))),
            Expression::FilterCall(call) => {
                let subject = match self.evaluate(&call.subject, context)? {
                    Some(subject) => subject,
                    None if self.config.string_if_invalid.is_empty() => {
                        Value::String(String::new())
                    }
                    None => return Ok(None),
                };
                self.apply(call, subject, context).map(Some)
            }
        }
    }

    fn apply(
        &self,
        call: &FilterCall,
        subject: Value,
        context: &Context,
    ) -> Result<Value, RenderError> {
        let (Some(spec), Some(filter)) = (
            self.registry.lookup(&call.name),
            self.registry.get(&call.name),
        ) else {
            return Err(RenderError::FilterFailure {
                filter: call.name.clone(),
                message: format!("Invalid filter: '{}'", call.name),
                span: call.name_span,
            });
        };

        let argument = match &call.argument {
            Some(argument) => Some(self.argument(argument, spec.arg_type, context)?),
            None => None,
        };

        trace!(filter = %call.name, input = %subject.type_name(), "applying filter");
        let input_safe = subject.is_safe();
        let output = filter
            .apply(subject, argument)
            .map_err(|err| RenderError::FilterFailure {
                filter: call.name.clone(),
                message: err.message,
                span: call.name_span,
            })?;

        Ok(if filter.is_safe() && input_safe {
            output.mark_safe()
        } else {
            output
        })
    }

    /// Resolve a filter argument and coerce it to the type the filter
    /// declared. Unlike a subject, a missing argument is an error.
    fn argument(
        &self,
        argument: &Expression,
        arg_type: ArgType,
        context: &Context,
    ) -> Result<Value, RenderError> {
        let value = match argument {
            Expression::Variable(variable) => context.resolve(variable)?,
            Expression::Literal { value, .. } => literal(value),
            Expression::FilterCall(_) => self
                .evaluate(argument, context)?
                .unwrap_or(Value::None),
        };

        match arg_type {
            ArgType::Integer => to_integer(&value).map(Value::Integer).map_err(|reason| {
                RenderError::ResolutionFailure {
                    reason,
                    span: argument.span(),
                }
            }),
            ArgType::Text => Ok(match value {
                Value::String(_) | Value::SafeString(_) => value,
                other => Value::String(other.to_string()),
            }),
            ArgType::None | ArgType::Any => Ok(value),
        }
    }
}

fn literal(literal: &Literal) -> Value {
    match literal {
        Literal::Int(n) => Value::Integer(*n),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::SafeString(s.clone()),
    }
}
