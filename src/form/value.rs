//! Form field value objects

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Current values of a form, keyed by field name
pub type FormValues = BTreeMap<String, FieldValue>;

/// Dynamically typed field values
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The field has never been given a value
    #[default]
    Missing,
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Missing, null or the empty string
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Missing | FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether the value counts as present for pattern checks
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Missing | FieldValue::Null => false,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Bool(b) => *b,
            FieldValue::List(_) => true,
        }
    }

    /// Get the text value (None for other kinds)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value (None for other kinds)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean value (None for other kinds)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Structural equality. NaN equals NaN so that a form holding an
    /// unparseable number is not dirty against an identical snapshot.
    pub fn deep_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Missing, FieldValue::Missing) => true,
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
            }
            _ => false,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

/// Stringified form used when matching patterns
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Missing => write!(f, "undefined"),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(n) => write!(f, "{}", format_number(*n)),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Compare two value maps field by field.
///
/// A field absent from one map equals an explicit `Missing` in the other,
/// the same way an `undefined` property disappears from a JSON snapshot.
pub fn deep_equal(a: &FormValues, b: &FormValues) -> bool {
    let missing = FieldValue::Missing;
    a.keys()
        .chain(b.keys())
        .all(|key| {
            let left = a.get(key).unwrap_or(&missing);
            let right = b.get(key).unwrap_or(&missing);
            left.deep_eq(right)
        })
}

/// Kind of input element a change event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    #[default]
    Text,
    Number,
    Range,
    Checkbox,
    Select,
    TextArea,
}

impl InputKind {
    /// Parse an HTML-style input type name; unknown names behave like text
    pub fn from_name(name: &str) -> Self {
        match name {
            "number" => InputKind::Number,
            "range" => InputKind::Range,
            "checkbox" => InputKind::Checkbox,
            "select" => InputKind::Select,
            "textarea" => InputKind::TextArea,
            _ => InputKind::Text,
        }
    }

    /// Coerce raw input into a field value for this kind of input
    pub fn coerce(&self, raw: &str, checked: bool) -> FieldValue {
        match self {
            InputKind::Number | InputKind::Range => {
                if raw.is_empty() {
                    return FieldValue::Text(String::new());
                }
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return FieldValue::Number(0.0);
                }
                FieldValue::Number(parse_number(trimmed))
            }
            InputKind::Checkbox => FieldValue::Bool(checked),
            _ => FieldValue::Text(raw.to_string()),
        }
    }
}

/// Number to text the way a browser stringifies it: exponent notation
/// outside `1e-6..1e21`, `Infinity` and `NaN` spelled out, no `-0`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let exponential = format!("{n:e}");
    match exponential.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => exponential,
    }
}

/// Text to number with the browser's rules for number inputs.
///
/// Accepts decimal and exponent literals, unsigned `0x`/`0o`/`0b`
/// integers and a signed `Infinity`. Anything else is NaN, including the
/// `inf` and `nan` spellings Rust's own parser would take.
fn parse_number(text: &str) -> f64 {
    let unsigned = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let digits = text
            .strip_prefix(prefix)
            .or_else(|| text.strip_prefix(prefix.to_ascii_uppercase().as_str()));
        if let Some(digits) = digits {
            if digits.is_empty() {
                return f64::NAN;
            }
            return digits
                .chars()
                .try_fold(0.0, |acc, c| {
                    c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
                })
                .unwrap_or(f64::NAN);
        }
    }

    if unsigned
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
    {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// A change event delivered by the rendering layer
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub name: String,
    pub value: String,
    pub kind: InputKind,
    /// Checkbox state; ignored for other kinds
    pub checked: bool,
}

impl InputEvent {
    /// Change event from a text-like input
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind: InputKind::Text,
            checked: false,
        }
    }

    /// Change event from a number input
    pub fn number(name: &str, value: &str) -> Self {
        Self {
            kind: InputKind::Number,
            ..Self::text(name, value)
        }
    }

    /// Change event from a checkbox
    pub fn checkbox(name: &str, checked: bool) -> Self {
        Self {
            name: name.to_string(),
            value: "on".to_string(),
            kind: InputKind::Checkbox,
            checked,
        }
    }

    /// The value this event carries once coerced
    pub fn coerced(&self) -> FieldValue {
        self.kind.coerce(&self.value, self.checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod field_value {
        use super::*;

        #[test]
        fn test_empty_values() {
            assert!(FieldValue::Missing.is_empty());
            assert!(FieldValue::Null.is_empty());
            assert!(FieldValue::text("").is_empty());
            assert!(!FieldValue::text(" ").is_empty());
            assert!(!FieldValue::Number(0.0).is_empty());
            assert!(!FieldValue::Bool(false).is_empty());
        }

        #[test]
        fn test_truthiness() {
            assert!(!FieldValue::Number(0.0).is_truthy());
            assert!(!FieldValue::Number(f64::NAN).is_truthy());
            assert!(!FieldValue::Bool(false).is_truthy());
            assert!(FieldValue::Number(-1.0).is_truthy());
            assert!(FieldValue::text("a").is_truthy());
            assert!(FieldValue::List(vec![]).is_truthy());
        }

        #[test]
        fn test_display_matches_stringified_form() {
            assert_eq!(FieldValue::Number(42.0).to_string(), "42");
            assert_eq!(FieldValue::Number(1.5).to_string(), "1.5");
            assert_eq!(FieldValue::Bool(true).to_string(), "true");
            assert_eq!(FieldValue::Number(-0.0).to_string(), "0");
            assert_eq!(FieldValue::Number(1e21).to_string(), "1e+21");
            assert_eq!(FieldValue::Number(1e20).to_string(), "100000000000000000000");
            assert_eq!(FieldValue::Number(1.5e-7).to_string(), "1.5e-7");
            assert_eq!(FieldValue::Number(f64::INFINITY).to_string(), "Infinity");
            assert_eq!(FieldValue::Number(f64::NAN).to_string(), "NaN");
            assert_eq!(
                FieldValue::List(vec!["a".into(), 2.0.into()]).to_string(),
                "a,2"
            );
        }

        #[test]
        fn test_deep_eq_nested_lists() {
            let a = FieldValue::List(vec!["x".into(), FieldValue::List(vec![true.into()])]);
            let b = FieldValue::List(vec!["x".into(), FieldValue::List(vec![true.into()])]);
            let c = FieldValue::List(vec!["x".into(), FieldValue::List(vec![false.into()])]);
            assert!(a.deep_eq(&b));
            assert!(!a.deep_eq(&c));
        }

        #[test]
        fn test_deep_eq_distinguishes_kinds() {
            assert!(!FieldValue::text("1").deep_eq(&FieldValue::Number(1.0)));
            assert!(!FieldValue::Null.deep_eq(&FieldValue::Missing));
            assert!(FieldValue::Number(f64::NAN).deep_eq(&FieldValue::Number(f64::NAN)));
        }

        #[test]
        fn test_option_conversion() {
            assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
            assert_eq!(FieldValue::from(Some("a")), FieldValue::text("a"));
        }

        #[test]
        fn test_serializes_as_plain_json() {
            let json = serde_json::to_value(FieldValue::List(vec![
                "a".into(),
                3.0.into(),
                FieldValue::Null,
            ]))
            .unwrap();
            assert_eq!(json, serde_json::json!(["a", 3.0, null]));
        }
    }

    mod deep_equal_maps {
        use super::*;

        fn values(pairs: &[(&str, FieldValue)]) -> FormValues {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect()
        }

        #[test]
        fn test_equal_maps() {
            let a = values(&[("a", "x".into()), ("b", 1.0.into())]);
            let b = values(&[("b", 1.0.into()), ("a", "x".into())]);
            assert!(deep_equal(&a, &b));
        }

        #[test]
        fn test_absent_key_equals_missing() {
            let a = values(&[("a", "x".into()), ("b", FieldValue::Missing)]);
            let b = values(&[("a", "x".into())]);
            assert!(deep_equal(&a, &b));
            assert!(deep_equal(&b, &a));
        }

        #[test]
        fn test_changed_value_differs() {
            let a = values(&[("a", "x".into())]);
            let b = values(&[("a", "y".into())]);
            assert!(!deep_equal(&a, &b));
        }
    }

    mod input_kind {
        use super::*;

        #[test]
        fn test_from_name() {
            assert_eq!(InputKind::from_name("number"), InputKind::Number);
            assert_eq!(InputKind::from_name("range"), InputKind::Range);
            assert_eq!(InputKind::from_name("checkbox"), InputKind::Checkbox);
            assert_eq!(InputKind::from_name("email"), InputKind::Text);
        }

        #[test]
        fn test_number_coercion() {
            assert_eq!(InputKind::Number.coerce("", false), FieldValue::text(""));
            assert_eq!(InputKind::Number.coerce("12", false), FieldValue::Number(12.0));
            assert_eq!(InputKind::Range.coerce(" 3.5 ", false), FieldValue::Number(3.5));
            assert!(InputKind::Number
                .coerce("abc", false)
                .as_number()
                .unwrap()
                .is_nan());
        }

        #[test]
        fn test_number_literals_follow_browser_rules() {
            let number = |raw| InputKind::Number.coerce(raw, false);
            assert_eq!(number("0x10"), FieldValue::Number(16.0));
            assert_eq!(number("0B101"), FieldValue::Number(5.0));
            assert_eq!(number("0o17"), FieldValue::Number(15.0));
            assert_eq!(number("1e3"), FieldValue::Number(1000.0));
            assert_eq!(number(".5"), FieldValue::Number(0.5));
            assert_eq!(number("-Infinity"), FieldValue::Number(f64::NEG_INFINITY));
            for raw in ["inf", "infinity", "NaN", "-0x10", "0x", "0x1g", "1_000", "1e"] {
                assert!(number(raw).as_number().unwrap().is_nan(), "{raw}");
            }
        }

        #[test]
        fn test_checkbox_uses_checked_state() {
            assert_eq!(InputKind::Checkbox.coerce("on", true), FieldValue::Bool(true));
            assert_eq!(InputKind::Checkbox.coerce("on", false), FieldValue::Bool(false));
        }

        #[test]
        fn test_text_passes_through() {
            assert_eq!(InputKind::Text.coerce(" 12 ", false), FieldValue::text(" 12 "));
            assert_eq!(InputKind::Select.coerce("03", false), FieldValue::text("03"));
        }
    }

    #[test]
    fn test_input_event_constructors() {
        assert_eq!(InputEvent::number("guests", "2").coerced(), FieldValue::Number(2.0));
        assert_eq!(InputEvent::checkbox("saveCard", true).coerced(), FieldValue::Bool(true));
        assert_eq!(InputEvent::text("cvv", "123").coerced(), FieldValue::text("123"));
    }
}
