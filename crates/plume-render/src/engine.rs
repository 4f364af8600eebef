use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::filters::{Filter, Registry, RegistryBuilder};
use crate::template::Template;

/// Rendering options shared by every template an engine compiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// HTML-escape output that is not marked safe.
    pub autoescape: bool,
    /// Output for an expression whose subject cannot be resolved.
    pub string_if_invalid: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoescape: true,
            string_if_invalid: String::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Compiles templates against a fixed config and filter registry.
///
/// The registry is frozen when the engine is built. Engines and the
/// templates they produce can be shared across threads.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    registry: Arc<Registry>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with the default config and the builtin filters.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse and validate a template.
    ///
    /// Unknown filters and wrong argument counts are reported here, before
    /// any context exists.
    pub fn compile(&self, source: &str) -> Result<Template, Error> {
        let source: Arc<str> = Arc::from(source);
        match plume_parser::parse(&source, self.registry.as_ref()) {
            Ok(ast) => {
                debug!(
                    nodes = ast.nodes.len(),
                    expressions = ast.expression_count(),
                    "compiled template"
                );
                Ok(Template::new(
                    source,
                    ast,
                    Arc::clone(&self.config),
                    Arc::clone(&self.registry),
                ))
            }
            Err(err) => {
                debug!(error = %err, span = ?err.span(), "syntax error");
                Err(Error::syntax(&err, source))
            }
        }
    }
}

/// Configures an [`Engine`]. Starts from the default config and the builtin
/// filters.
pub struct EngineBuilder {
    config: EngineConfig,
    registry: RegistryBuilder,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: RegistryBuilder::new().with_builtins(),
        }
    }

    pub fn autoescape(mut self, autoescape: bool) -> Self {
        self.config.autoescape = autoescape;
        self
    }

    pub fn string_if_invalid(mut self, text: impl Into<String>) -> Self {
        self.config.string_if_invalid = text.into();
        self
    }

    /// Replace the whole config.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a filter, replacing any filter of the same name.
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.registry = self.registry.register(filter);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            config: Arc::new(self.config),
            registry: Arc::new(self.registry.build()),
        }
    }
}
