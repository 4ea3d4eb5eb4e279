use crate::model::Quantity;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref MIXED_NUMBER: Regex =
        Regex::new(r"^(\d+)\s+(\d+)\s*/\s*(\d+)").expect("Invalid mixed number pattern");
    static ref SIMPLE_FRACTION: Regex =
        Regex::new(r"^([+-]?\d+(?:\.\d+)?)\s*/\s*([+-]?\d+(?:\.\d+)?)")
            .expect("Invalid fraction pattern");
    static ref FIRST_NUMBER: Regex =
        Regex::new(r"[+-]?(?:\d+(?:\.\d+)?|\.\d+)").expect("Invalid number pattern");
}

/// Vulgar fraction characters and their ASCII spelling.
pub(crate) const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅕', "1/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Parse a JSON quantity: `null`, a number, or a string.
///
/// # Examples
/// ```
/// use recipe_normalizer::quantity::parse_quantity;
/// use serde_json::json;
///
/// assert_eq!(parse_quantity(&json!(3)), Some(3.0));
/// assert_eq!(parse_quantity(&json!("1 1/2")), Some(1.5));
/// assert_eq!(parse_quantity(&json!(null)), None);
/// ```
pub fn parse_quantity(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_quantity_str(s),
        _ => None,
    }
}

/// Parse a textual quantity.
///
/// Tried in order: mixed number, simple fraction, then the first signed
/// decimal anywhere in the text. A zero denominator yields `None`.
pub fn parse_quantity_str(text: &str) -> Option<f64> {
    let text = replace_vulgar_fractions(text.trim());
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = MIXED_NUMBER.captures(text) {
        let whole: f64 = caps[1].parse().ok()?;
        let num: f64 = caps[2].parse().ok()?;
        let den: f64 = caps[3].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return finite(whole + num / den);
    }

    if let Some(caps) = SIMPLE_FRACTION.captures(text) {
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        if den == 0.0 || !den.is_finite() {
            return None;
        }
        return finite(num / den);
    }

    first_number(text)
}

/// First signed decimal number anywhere in `text`.
pub(crate) fn first_number(text: &str) -> Option<f64> {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(finite)
}

fn replace_vulgar_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match VULGAR_FRACTIONS.iter().find(|(c, _)| *c == ch) {
            // Leading space turns "1½" into the mixed number "1 1/2".
            Some((_, ascii)) => {
                out.push(' ');
                out.push_str(ascii);
            }
            None => out.push(ch),
        }
    }
    out
}

fn finite(n: f64) -> Option<f64> {
    n.is_finite().then_some(n)
}

impl Quantity {
    /// Resolve to a number. Idempotent for [`Quantity::Number`].
    pub fn parse(&self) -> Option<f64> {
        match self {
            Quantity::Number(n) => finite(*n),
            Quantity::Text(text) => parse_quantity_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_fraction() {
        assert_eq!(parse_quantity_str("1/2"), Some(0.5));
        assert_eq!(parse_quantity_str("3/4 cup"), Some(0.75));
        assert_eq!(parse_quantity_str("-1/4"), Some(-0.25));
        assert_eq!(parse_quantity_str("1.5/3"), Some(0.5));
    }

    #[test]
    fn test_mixed_number() {
        assert_eq!(parse_quantity_str("1 1/2"), Some(1.5));
        assert_eq!(parse_quantity_str("2 3/4 cups"), Some(2.75));
        assert_eq!(parse_quantity_str("1 1/0"), None);
    }

    #[test]
    fn test_vulgar_fractions() {
        assert_eq!(parse_quantity_str("½"), Some(0.5));
        assert_eq!(parse_quantity_str("¾"), Some(0.75));
        assert_eq!(parse_quantity_str("1½"), Some(1.5));
        assert_eq!(parse_quantity_str("2 ¼ cups"), Some(2.25));
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(parse_quantity_str("1/0"), None);
        assert_eq!(parse_quantity_str("0/0"), None);
    }

    #[test]
    fn test_first_number_fallback() {
        assert_eq!(parse_quantity_str("about 3 cups"), Some(3.0));
        assert_eq!(parse_quantity_str("2.5"), Some(2.5));
        assert_eq!(parse_quantity_str("10-12"), Some(10.0));
        assert_eq!(parse_quantity_str(".5"), Some(0.5));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_quantity_str("two"), None);
        assert_eq!(parse_quantity_str(""), None);
        assert_eq!(parse_quantity_str("   "), None);
        assert_eq!(parse_quantity_str("a pinch"), None);
    }

    #[test]
    fn test_json_values() {
        assert_eq!(parse_quantity(&json!(3)), Some(3.0));
        assert_eq!(parse_quantity(&json!(0.25)), Some(0.25));
        assert_eq!(parse_quantity(&json!(null)), None);
        assert_eq!(parse_quantity(&json!(true)), None);
        assert_eq!(parse_quantity(&json!([1])), None);
        assert_eq!(parse_quantity(&json!(" 1/2 ")), Some(0.5));
    }

    #[test]
    fn test_overflowing_digits_are_not_finite() {
        let huge = "9".repeat(400);
        assert_eq!(parse_quantity_str(&huge), None);
    }

    #[test]
    fn test_quantity_parse_is_idempotent() {
        let first = Quantity::Text("1 1/2".to_string()).parse().unwrap();
        assert_eq!(Quantity::Number(first).parse(), Some(first));
        assert_eq!(Quantity::Number(f64::NAN).parse(), None);
    }
}
