//! Filter registration.
//!
//! A [`Registry`] maps filter names to their [`FilterSpec`] and
//! implementation. It is assembled once with a [`RegistryBuilder`] and is
//! immutable afterwards: the parser consults it for arity through
//! [`FilterSet`], the renderer for the implementation.
//!
//! There are two ways to provide a filter:
//!
//! - **Closure-based**: wrap a function with [`ClosureFilter`].
//! - **Trait-based**: implement [`Filter`] directly.

pub mod builtins;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use plume_parser::{FilterSet, FilterSpec};

use crate::value::Value;

/// A filter failed on the value it was given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FilterError {
    pub message: String,
}

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A named transformation applied with `value|name[:argument]`.
///
/// Filters are pure: they see only the value and the already-coerced
/// argument, never the render context.
pub trait Filter: Send + Sync {
    /// Name, arity and argument type.
    fn spec(&self) -> FilterSpec;

    /// Whether text output keeps the safety of safe input.
    fn is_safe(&self) -> bool {
        false
    }

    fn apply(&self, value: Value, argument: Option<Value>) -> Result<Value, FilterError>;
}

/// A [`Filter`] backed by a closure or function.
///
/// ```rust
/// use plume_parser::{ArgType, FilterSpec};
/// use plume_render::{ClosureFilter, Engine, Context, Value};
///
/// let repeat = ClosureFilter::new(FilterSpec::unary("repeat", ArgType::Integer), |value, n| {
///     let n = match n {
///         Some(Value::Integer(n)) => n.max(0) as usize,
///         _ => 1,
///     };
///     Ok(Value::String(value.to_string().repeat(n)))
/// });
///
/// let engine = Engine::builder().filter(repeat).build();
/// let template = engine.compile("{{ word|repeat:3 }}").unwrap();
/// let context = Context::new().with("word", "ab");
/// assert_eq!(template.render(&context).unwrap(), "ababab");
/// ```
pub struct ClosureFilter<F>
where
    F: Fn(Value, Option<Value>) -> Result<Value, FilterError> + Send + Sync,
{
    spec: FilterSpec,
    is_safe: bool,
    func: F,
}

impl<F> ClosureFilter<F>
where
    F: Fn(Value, Option<Value>) -> Result<Value, FilterError> + Send + Sync,
{
    pub fn new(spec: FilterSpec, func: F) -> Self {
        Self {
            spec,
            is_safe: false,
            func,
        }
    }

    /// Mark the filter as preserving the safety of its input.
    pub fn safe(mut self) -> Self {
        self.is_safe = true;
        self
    }
}

impl<F> Filter for ClosureFilter<F>
where
    F: Fn(Value, Option<Value>) -> Result<Value, FilterError> + Send + Sync,
{
    fn spec(&self) -> FilterSpec {
        self.spec.clone()
    }

    fn is_safe(&self) -> bool {
        self.is_safe
    }

    fn apply(&self, value: Value, argument: Option<Value>) -> Result<Value, FilterError> {
        (self.func)(value, argument)
    }
}

struct Entry {
    spec: FilterSpec,
    filter: Arc<dyn Filter>,
}

/// The immutable set of filters an engine can use.
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry holding only the builtin filters.
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.entries.get(name).map(|entry| entry.filter.as_ref())
    }

    /// Registered filter names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FilterSet for Registry {
    fn lookup(&self, name: &str) -> Option<&FilterSpec> {
        self.entries.get(name).map(|entry| &entry.spec)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("filters", &self.names())
            .finish()
    }
}

/// Collects filters before freezing them into a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every builtin filter.
    pub fn with_builtins(self) -> Self {
        builtins::register(self)
    }

    /// Register a filter. A filter with the same name is replaced.
    pub fn register(mut self, filter: impl Filter + 'static) -> Self {
        let spec = filter.spec();
        self.entries.insert(
            spec.name.clone(),
            Entry {
                spec,
                filter: Arc::new(filter),
            },
        );
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_parser::ArgType;
    use pretty_assertions::assert_eq;

    fn shout(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
        Ok(Value::String(format!("{}!", value)))
    }

    #[test]
    fn test_builtin_names() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.names(),
            vec![
                "add",
                "addslashes",
                "capfirst",
                "center",
                "default",
                "escape",
                "first",
                "length",
                "lower",
                "safe",
                "slugify",
                "upper",
                "yesno",
            ]
        );
    }

    #[test]
    fn test_registry_answers_parser_lookups() {
        let registry = Registry::builtin();
        let center = registry.lookup("center").unwrap();
        assert_eq!(center.arg_type, ArgType::Integer);
        assert_eq!((center.min_args, center.max_args), (1, 1));
        assert!(registry.lookup("title").is_none());
    }

    #[test]
    fn test_closure_filter() {
        let registry = Registry::builder()
            .register(ClosureFilter::new(FilterSpec::nullary("shout"), shout))
            .build();
        let filter = registry.get("shout").unwrap();
        assert!(!filter.is_safe());
        assert_eq!(filter.apply(Value::from("hi"), None), Ok(Value::from("hi!")));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let registry = Registry::builder()
            .with_builtins()
            .register(ClosureFilter::new(FilterSpec::nullary("upper"), shout).safe())
            .build();
        assert_eq!(registry.len(), 13);
        assert!(registry.get("upper").unwrap().is_safe());
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
