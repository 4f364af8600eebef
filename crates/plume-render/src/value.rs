use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The set of runtime value types a template can see.
///
/// Non-string values print in the template language's conventional form:
/// `True`, `None`, `1.0`, `[1, 'a']`.
///
/// Conversion from common Rust types is provided via `From` impls:
///
/// ```rust
/// use plume_render::Value;
///
/// let s: Value = "hello".into();
/// let n: Value = 42i64.into();
/// let b: Value = true.into();
/// let l: Value = vec![1i64, 2].into();
/// assert_eq!(l.to_string(), "[1, 2]");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Text that will be HTML-escaped on output when autoescaping is on.
    String(String),
    /// Text already known to be safe for HTML output.
    SafeString(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    None,
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// A host object the engine can print but not look into.
    Opaque(Arc<dyn OpaqueValue>),
}

/// A host-provided value with no structure visible to templates.
pub trait OpaqueValue: fmt::Debug + fmt::Display + Send + Sync {
    /// Type name used in error messages.
    fn type_name(&self) -> &str;
}

impl Value {
    /// Shorthand for [`Value::SafeString`].
    pub fn safe(text: impl Into<String>) -> Self {
        Value::SafeString(text.into())
    }

    /// Type name for diagnostic messages (`str`, `int`, `NoneType`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            Value::String(_) => "str",
            Value::SafeString(_) => "SafeString",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::Boolean(_) => "bool",
            Value::None => "NoneType",
            Value::List(_) => "list",
            Value::Map(_) => "dict",
            Value::Opaque(value) => value.type_name(),
        }
    }

    /// Empty text and containers, zero, `False` and `None` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::String(s) | Value::SafeString(s) => !s.is_empty(),
            Value::Integer(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Boolean(b) => *b,
            Value::None => false,
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            Value::Opaque(_) => true,
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Value::SafeString(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Mark text as safe. Non-text values are returned unchanged.
    pub fn mark_safe(self) -> Self {
        match self {
            Value::String(s) => Value::SafeString(s),
            other => other,
        }
    }

    /// The text of a string value, safe or not.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::SafeString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up one path segment: a map key, or an index into a list or
    /// string. `None` when the segment does not apply.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(entries) => entries.get(key).cloned(),
            Value::List(items) => items.get(key.parse::<usize>().ok()?).cloned(),
            Value::String(s) | Value::SafeString(s) => {
                let index = key.parse::<usize>().ok()?;
                s.chars().nth(index).map(|c| Value::String(c.to_string()))
            }
            _ => None,
        }
    }

    /// Debug form used inside containers: strings are quoted, everything
    /// else prints as its display form.
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) | Value::SafeString(s) => quote_str(s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::SafeString(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::None => f.write_str("None"),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(Value::repr).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", quote_str(key), value.repr()))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::Opaque(value) => write!(f, "{value}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::SafeString(a), Value::SafeString(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Format a float with shortest round-trip digits, always with a `.0` or
/// exponent, scientific below `1e-4` and from `1e16`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    let plain = value.to_string();
    if plain.contains('.') {
        plain
    } else {
        plain + ".0"
    }
}

/// Quote a string with `'`, or `"` when it contains only single quotes.
pub fn quote_str(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

// --- Conversions ---

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(entries: BTreeMap<String, V>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
