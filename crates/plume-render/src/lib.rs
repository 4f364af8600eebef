//! plume template runtime
//!
//! Compiles templates with an [`Engine`] and renders them against a
//! [`Context`]:
//!
//! ```text
//! source → Engine::compile() → Template → render(&Context) → String
//! ```
//!
//! Compilation parses the template and checks every filter call against
//! the engine's [`Registry`]. Rendering resolves variables, coerces filter
//! arguments to the declared type, applies filters and escapes the result.
//! Errors from either stage carry a rendered diagnostic pointing into the
//! source.
//!
//! # Example
//!
//! ```
//! use plume_render::{Context, Engine};
//!
//! let engine = Engine::new();
//! let template = engine.compile("[{{ name|center:9 }}]").unwrap();
//! let context = Context::new().with("name", "plume");
//! assert_eq!(template.render(&context).unwrap(), "[  plume  ]");
//!
//! let err = engine.compile("{{ name|center }}").unwrap_err();
//! assert!(err.to_string().contains("center requires 2 arguments, 1 provided"));
//! ```

pub mod coerce;
pub mod context;
pub mod engine;
pub mod error;
pub mod escape;
pub mod filters;
pub mod template;
pub mod value;

pub use context::{Context, ContextError};
pub use engine::{Engine, EngineBuilder, EngineConfig};
pub use error::{Error, RenderError, ResolutionFailure};
pub use filters::{ClosureFilter, Filter, FilterError, Registry, RegistryBuilder};
pub use template::Template;
pub use value::{OpaqueValue, Value};

/// Compile a template with the default engine.
pub fn compile(source: &str) -> Result<Template, Error> {
    Engine::new().compile(source)
}
