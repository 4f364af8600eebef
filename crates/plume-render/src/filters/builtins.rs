//! Builtin filters.
//!
//! Each filter is a plain function registered through [`ClosureFilter`].
//! Filters that operate on text convert their input with `str()` semantics
//! first, so `{{ 3|center:5 }}` centres `"3"`.

use plume_parser::{ArgType, FilterSpec};
use unicode_normalization::UnicodeNormalization;

use super::{ClosureFilter, FilterError, RegistryBuilder};
use crate::coerce::to_integer;
use crate::escape::conditional_escape;
use crate::value::Value;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(ClosureFilter::new(FilterSpec::unary("add", ArgType::Any), add))
        .register(ClosureFilter::new(FilterSpec::nullary("addslashes"), addslashes).safe())
        .register(ClosureFilter::new(FilterSpec::nullary("capfirst"), capfirst).safe())
        .register(
            ClosureFilter::new(FilterSpec::unary("center", ArgType::Integer), center_filter).safe(),
        )
        .register(ClosureFilter::new(FilterSpec::unary("default", ArgType::Any), default))
        .register(ClosureFilter::new(FilterSpec::nullary("escape"), escape).safe())
        .register(ClosureFilter::new(FilterSpec::nullary("first"), first))
        .register(ClosureFilter::new(FilterSpec::nullary("length"), length))
        .register(ClosureFilter::new(FilterSpec::nullary("lower"), lower).safe())
        .register(ClosureFilter::new(FilterSpec::nullary("safe"), safe).safe())
        .register(ClosureFilter::new(FilterSpec::nullary("slugify"), slugify_filter).safe())
        .register(ClosureFilter::new(FilterSpec::nullary("upper"), upper))
        .register(ClosureFilter::new(FilterSpec::optional("yesno", ArgType::Text), yesno))
}

// =========================================================================
// Centering
// =========================================================================

/// Widest field `center` will pad to.
pub const MAX_CENTER_WIDTH: i64 = 1 << 24;

/// Centre `text` in a field of `width` characters.
///
/// When the padding is odd, the extra space goes left only if `width` is
/// odd too. A width at or below the text length returns the text unchanged.
/// Widths above [`MAX_CENTER_WIDTH`] are an error rather than an allocation.
pub fn center(text: &str, width: i64) -> Result<String, FilterError> {
    let length = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
    let pad = width.saturating_sub(length).max(0);
    if pad == 0 {
        return Ok(text.to_string());
    }
    if width > MAX_CENTER_WIDTH {
        return Err(FilterError::new(format!(
            "center width {width} exceeds the maximum of {MAX_CENTER_WIDTH}"
        )));
    }

    let too_large = || FilterError::new(format!("center width {width} is too large"));
    let pad = usize::try_from(pad).map_err(|_| too_large())?;
    let left = pad / 2 + (pad & (width & 1) as usize);
    let right = pad - left;

    let mut out = String::new();
    out.try_reserve(text.len() + pad).map_err(|_| too_large())?;
    out.extend(std::iter::repeat(' ').take(left));
    out.push_str(text);
    out.extend(std::iter::repeat(' ').take(right));
    Ok(out)
}

fn center_filter(value: Value, argument: Option<Value>) -> Result<Value, FilterError> {
    match argument {
        Some(Value::Integer(width)) => center(&value.to_string(), width).map(Value::String),
        other => Err(FilterError::new(format!(
            "center expects an integer width, got {}",
            other.map_or_else(|| "nothing".to_string(), |v| v.repr())
        ))),
    }
}

// =========================================================================
// Arithmetic and selection
// =========================================================================

/// Integer addition when both sides convert, otherwise concatenation of
/// text or lists, otherwise an empty string.
fn add(value: Value, argument: Option<Value>) -> Result<Value, FilterError> {
    let argument = argument.unwrap_or(Value::None);
    if let (Ok(a), Ok(b)) = (to_integer(&value), to_integer(&argument)) {
        if let Some(sum) = a.checked_add(b) {
            return Ok(Value::Integer(sum));
        }
    }

    Ok(match (value, argument) {
        (Value::SafeString(a), Value::SafeString(b)) => Value::SafeString(a + &b),
        (Value::String(a) | Value::SafeString(a), Value::String(b) | Value::SafeString(b)) => {
            Value::String(a + &b)
        }
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Value::List(a)
        }
        _ => Value::String(String::new()),
    })
}

fn default(value: Value, argument: Option<Value>) -> Result<Value, FilterError> {
    if value.is_truthy() {
        Ok(value)
    } else {
        Ok(argument.unwrap_or(Value::None))
    }
}

fn first(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    match value {
        Value::List(items) => Ok(items
            .into_iter()
            .next()
            .unwrap_or_else(|| Value::String(String::new()))),
        Value::String(s) | Value::SafeString(s) => Ok(Value::String(
            s.chars().next().map(String::from).unwrap_or_default(),
        )),
        Value::Map(_) => Err(FilterError::new("KeyError: 0")),
        other => Err(FilterError::new(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

fn length(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    let length = match &value {
        Value::String(s) | Value::SafeString(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(entries) => entries.len(),
        _ => 0,
    };
    Ok(Value::Integer(i64::try_from(length).unwrap_or(i64::MAX)))
}

/// Map truthiness to one of `"yes,no,maybe"`. `None` picks the third
/// option, or the second when exactly two are given.
fn yesno(value: Value, argument: Option<Value>) -> Result<Value, FilterError> {
    let mapping = argument.map_or_else(|| "yes,no,maybe".to_string(), |arg| arg.to_string());
    let bits: Vec<&str> = mapping.split(',').collect();
    if bits.len() < 2 {
        return Ok(value);
    }

    let (yes, no) = (bits[0], bits[1]);
    let maybe = if bits.len() == 3 { bits[2] } else { no };
    let choice = if value.is_none() {
        maybe
    } else if value.is_truthy() {
        yes
    } else {
        no
    };
    Ok(Value::String(choice.to_string()))
}

// =========================================================================
// Text
// =========================================================================

fn addslashes(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    let text = value
        .to_string()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\'");
    Ok(Value::String(text))
}

fn capfirst(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    let text = value.to_string();
    let mut chars = text.chars();
    let capitalised = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(capitalised))
}

fn lower(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    Ok(Value::String(value.to_string().to_lowercase()))
}

fn upper(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    Ok(Value::String(value.to_string().to_uppercase()))
}

/// Reduce text to lowercase ASCII words joined by hyphens.
pub fn slugify(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let mut slug = String::with_capacity(ascii.len());
    let mut in_separator = false;

    for c in ascii.to_lowercase().chars() {
        if c == '-' || c.is_whitespace() {
            if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        } else if c.is_alphanumeric() || c == '_' {
            slug.push(c);
            in_separator = false;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

fn slugify_filter(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    Ok(Value::String(slugify(&value.to_string())))
}

// =========================================================================
// Safety
// =========================================================================

fn escape(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    Ok(conditional_escape(&value))
}

fn safe(value: Value, _argument: Option<Value>) -> Result<Value, FilterError> {
    Ok(match value {
        Value::SafeString(_) => value,
        other => Value::SafeString(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(result: Result<Value, FilterError>) -> String {
        result.unwrap().to_string()
    }

    // =========================================================================
    // center
    // =========================================================================

    #[test]
    fn test_center_examples() {
        assert_eq!(center("123", 5).unwrap(), " 123 ");
        assert_eq!(center("Django", 15).unwrap(), "     Django    ");
        assert_eq!(center("odd", 6).unwrap(), " odd  ");
        assert_eq!(center("even", 7).unwrap(), "  even ");
    }

    #[test]
    fn test_center_narrow_width_returns_input() {
        for width in [4, 2, 0, -5, i64::MIN] {
            assert_eq!(center("test", width).unwrap(), "test");
        }
        assert_eq!(center("", 0).unwrap(), "");
    }

    #[test]
    fn test_center_pads_to_width() {
        for width in 5..20 {
            let centred = center("abcd", width).unwrap();
            assert_eq!(centred.chars().count() as i64, width);
            assert_eq!(centred.trim(), "abcd");
        }
    }

    #[test]
    fn test_center_counts_characters() {
        assert_eq!(center("é", 3).unwrap(), " é ");
    }

    #[test]
    fn test_center_rejects_huge_width() {
        assert_eq!(
            center("test", i64::MAX),
            Err(FilterError::new(format!(
                "center width {} exceeds the maximum of {MAX_CENTER_WIDTH}",
                i64::MAX
            )))
        );
        assert!(center("test", MAX_CENTER_WIDTH + 1).is_err());
        assert_eq!(
            center("test", MAX_CENTER_WIDTH).unwrap().len() as i64,
            MAX_CENTER_WIDTH
        );
        // A huge width that needs no padding is still fine.
        assert!(center("test", -i64::MAX).is_ok());
    }

    #[test]
    fn test_center_filter_requires_integer() {
        assert_eq!(
            text(center_filter(Value::Integer(7), Some(Value::Integer(3)))),
            " 7 "
        );
        assert!(center_filter(Value::from("x"), Some(Value::from("3"))).is_err());
    }

    // =========================================================================
    // add, default, first, length, yesno
    // =========================================================================

    #[test]
    fn test_add() {
        assert_eq!(add(Value::Integer(2), Some(Value::Integer(3))), Ok(Value::Integer(5)));
        assert_eq!(add(Value::from("2"), Some(Value::safe("3"))), Ok(Value::Integer(5)));
        assert_eq!(add(Value::Float(1.2), Some(Value::Float(2.9))), Ok(Value::Integer(3)));
        assert_eq!(
            add(Value::from("abc"), Some(Value::safe("def"))),
            Ok(Value::from("abcdef"))
        );
        assert_eq!(
            add(Value::safe("<p>"), Some(Value::safe("</p>"))),
            Ok(Value::safe("<p></p>"))
        );
        assert_eq!(text(add(Value::from(vec![1i64]), Some(Value::from(vec![2i64])))), "[1, 2]");
        assert_eq!(add(Value::from(vec![1i64]), Some(Value::Integer(2))), Ok(Value::from("")));
    }

    #[test]
    fn test_default() {
        assert_eq!(default(Value::from(""), Some(Value::Integer(100))), Ok(Value::Integer(100)));
        assert_eq!(default(Value::from("x"), Some(Value::Integer(100))), Ok(Value::from("x")));
    }

    #[test]
    fn test_first() {
        assert_eq!(first(Value::from(vec![0i64, 1]), None), Ok(Value::Integer(0)));
        assert_eq!(first(Value::List(Vec::new()), None), Ok(Value::from("")));
        assert_eq!(first(Value::from("hello"), None), Ok(Value::from("h")));
        assert_eq!(first(Value::from(""), None), Ok(Value::from("")));
        assert_eq!(
            first(Value::List(vec![Value::safe("<b>")]), None),
            Ok(Value::safe("<b>"))
        );
    }

    #[test]
    fn test_first_not_subscriptable() {
        assert_eq!(
            first(Value::None, None).unwrap_err().message,
            "'NoneType' object is not subscriptable"
        );
        assert_eq!(
            first(Value::Integer(42), None).unwrap_err().message,
            "'int' object is not subscriptable"
        );
    }

    #[test]
    fn test_length() {
        assert_eq!(length(Value::from("héllo"), None), Ok(Value::Integer(5)));
        assert_eq!(length(Value::from(vec![1i64, 2]), None), Ok(Value::Integer(2)));
        assert_eq!(length(Value::Integer(12), None), Ok(Value::Integer(0)));
    }

    #[test]
    fn test_yesno() {
        assert_eq!(text(yesno(Value::Boolean(true), None)), "yes");
        assert_eq!(text(yesno(Value::Boolean(false), None)), "no");
        assert_eq!(text(yesno(Value::None, None)), "maybe");
        assert_eq!(text(yesno(Value::None, Some(Value::from("yep,nah")))), "nah");
        assert_eq!(
            text(yesno(Value::Integer(0), Some(Value::from("yeah,nope,perhaps")))),
            "nope"
        );
        assert_eq!(text(yesno(Value::None, Some(Value::from("a,b,c,d")))), "b");
        assert_eq!(yesno(Value::Integer(3), Some(Value::from("one"))), Ok(Value::Integer(3)));
    }

    // =========================================================================
    // Text
    // =========================================================================

    #[test]
    fn test_addslashes() {
        assert_eq!(
            text(addslashes(Value::from(r#""a" 'b' \"#), None)),
            r#"\"a\" \'b\' \\"#
        );
        assert_eq!(text(addslashes(Value::Integer(123), None)), "123");
    }

    #[test]
    fn test_case_filters() {
        assert_eq!(text(capfirst(Value::from("hello world"), None)), "Hello world");
        assert_eq!(text(capfirst(Value::from(""), None)), "");
        assert_eq!(text(lower(Value::from("MiXeD"), None)), "mixed");
        assert_eq!(text(upper(Value::from("MiXeD"), None)), "MIXED");
        assert_eq!(text(lower(Value::Float(3.7), None)), "3.7");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(
            slugify(" Jack & Jill like numbers 1,2,3 and 4 and silly characters ?%.$!/"),
            "jack-jill-like-numbers-123-and-4-and-silly-characters"
        );
        assert_eq!(
            slugify("Un \u{e9}l\u{e9}phant \u{e0} l'or\u{e9}e du bois"),
            "un-elephant-a-loree-du-bois"
        );
        assert_eq!(slugify("Lærke Sørensen"), "lrke-srensen");
        assert_eq!(slugify("a &amp; b"), "a-amp-b");
        assert_eq!(slugify("__-x-__"), "x");
    }

    // =========================================================================
    // Safety
    // =========================================================================

    #[test]
    fn test_escape_and_safe() {
        assert_eq!(escape(Value::from("<p>"), None), Ok(Value::safe("&lt;p&gt;")));
        assert_eq!(escape(Value::safe("<p>"), None), Ok(Value::safe("<p>")));
        assert_eq!(safe(Value::from("<p>"), None), Ok(Value::safe("<p>")));
        assert_eq!(safe(Value::Integer(1), None), Ok(Value::safe("1")));
    }
}
