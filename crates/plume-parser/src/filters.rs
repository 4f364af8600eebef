//! Filter metadata consulted by the parser.
//!
//! The parser only needs each filter's arity to validate a template; the
//! implementations live with the runtime. Anything that can answer
//! [`FilterSet::lookup`] can drive parsing.

/// Type a filter declares for its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    /// The filter takes no argument.
    None,
    /// Coerced with integer rules before the filter runs.
    Integer,
    /// Passed as text.
    Text,
    /// Passed through unchanged.
    Any,
}

/// Arity and argument type of one filter.
///
/// `min_args` and `max_args` count filter arguments only (0 or 1), not the
/// value being filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: String,
    pub min_args: usize,
    pub max_args: usize,
    pub arg_type: ArgType,
}

impl FilterSpec {
    /// A filter that takes no argument.
    pub fn nullary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_args: 0,
            max_args: 0,
            arg_type: ArgType::None,
        }
    }

    /// A filter that requires exactly one argument.
    pub fn unary(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            min_args: 1,
            max_args: 1,
            arg_type,
        }
    }

    /// A filter whose single argument may be left out.
    pub fn optional(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            min_args: 0,
            max_args: 1,
            arg_type,
        }
    }

    pub fn accepts(&self, provided: usize) -> bool {
        (self.min_args..=self.max_args).contains(&provided)
    }
}

/// Name-to-spec lookup used during parsing.
pub trait FilterSet {
    fn lookup(&self, name: &str) -> Option<&FilterSpec>;
}

impl FilterSet for [FilterSpec] {
    fn lookup(&self, name: &str) -> Option<&FilterSpec> {
        self.iter().find(|spec| spec.name == name)
    }
}

impl FilterSet for Vec<FilterSpec> {
    fn lookup(&self, name: &str) -> Option<&FilterSpec> {
        self.as_slice().lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let center = FilterSpec::unary("center", ArgType::Integer);
        assert!(center.accepts(1));
        assert!(!center.accepts(0));

        let yesno = FilterSpec::optional("yesno", ArgType::Text);
        assert!(yesno.accepts(0));
        assert!(yesno.accepts(1));

        let lower = FilterSpec::nullary("lower");
        assert!(lower.accepts(0));
        assert!(!lower.accepts(1));
        assert_eq!(lower.arg_type, ArgType::None);
    }

    #[test]
    fn test_slice_lookup() {
        let specs = vec![FilterSpec::nullary("lower"), FilterSpec::nullary("upper")];
        assert_eq!(specs.lookup("upper").map(|s| s.name.as_str()), Some("upper"));
        assert!(specs.lookup("title").is_none());
    }
}
