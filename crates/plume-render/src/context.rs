use std::collections::BTreeMap;

use plume_diagnostics::Span;
use plume_parser::Variable;

use crate::error::{RenderError, ResolutionFailure};
use crate::value::Value;

/// Error building a [`Context`] from JSON.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("invalid context JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("context must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Variables visible to a template during one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable, returning the previous value under that name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a context from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ContextError> {
        match json {
            serde_json::Value::Object(entries) => Ok(entries
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect()),
            other => Err(ContextError::NotAnObject(json_type(&other))),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ContextError> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// Render the whole context for lookup failure messages, e.g.
    /// `{"foo": 1}`.
    pub fn describe(&self) -> String {
        let entries: Vec<String> = self
            .values
            .iter()
            .map(|(key, value)| format!("{key:?}: {}", value.repr()))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }

    /// Walk a variable path.
    ///
    /// A missing first segment reports the whole path against the context; a
    /// missing later segment reports that segment against the value it was
    /// looked up in.
    pub fn resolve(&self, variable: &Variable) -> Result<Value, RenderError> {
        let mut segments = variable.path.iter();
        let Some(first) = segments.next() else {
            return Err(self.missing(variable.dotted(), variable.span));
        };
        let Some(mut current) = self.values.get(&first.name).cloned() else {
            return Err(self.missing(variable.dotted(), variable.span));
        };

        let mut object_span = first.span;
        for segment in segments {
            current = match current.get(&segment.name) {
                Some(next) => next,
                None => {
                    return Err(RenderError::ResolutionFailure {
                        reason: ResolutionFailure::Missing {
                            key: segment.name.clone(),
                            object: current.to_string(),
                            object_span: Some(object_span),
                        },
                        span: segment.span,
                    });
                }
            };
            object_span = object_span.merge(segment.span);
        }
        Ok(current)
    }

    fn missing(&self, key: String, span: Span) -> RenderError {
        RenderError::ResolutionFailure {
            reason: ResolutionFailure::Missing {
                key,
                object: self.describe(),
                object_span: None,
            },
            span,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
