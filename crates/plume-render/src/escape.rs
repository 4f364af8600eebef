use crate::value::Value;

/// HTML-escape `& < > " '`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a value unless it is already marked safe. The result is always safe.
pub fn conditional_escape(value: &Value) -> Value {
    match value {
        Value::SafeString(_) => value.clone(),
        other => Value::SafeString(escape_html(&other.to_string())),
    }
}

/// Final output text for a value.
pub fn render_value(value: &Value, autoescape: bool) -> String {
    if autoescape && !value.is_safe() {
        escape_html(&value.to_string())
    } else {
        value.to_string()
    }
}
