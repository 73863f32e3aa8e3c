//! Canonical textual forms of scalar values.

use crate::presence::QUANTITY_EPSILON;

pub fn yes_no(value: bool) -> &'static str {
    return if value { "yes" } else { "no" };
}

/// How a decimal quantity is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Shortest text that reads back to the same value,
    /// but with 6 fixed decimals for magnitudes at or below the quantity epsilon.
    General,
    /// Exactly this many decimal places
    Fixed(usize),
    /// Rounded to a whole number
    Integer,
}
impl NumberStyle {
    pub fn render(&self, value: f64) -> String {
        return match self {
            NumberStyle::General => general(value),
            NumberStyle::Fixed(places) => fixed(value, *places),
            NumberStyle::Integer => format!("{}", value.round() as i64),
        };
    }
}

pub fn general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.abs() <= QUANTITY_EPSILON {
        return format!("{value:.6}");
    }
    return format!("{value}");
}

pub fn fixed(value: f64, places: usize) -> String {
    let text = format!("{value:.places$}");
    // `-0.0` would otherwise keep its sign
    if text.starts_with('-') && text[1..].bytes().all(|b| b == b'0' || b == b'.') {
        return text[1..].to_string();
    }
    return text;
}

/// Quotes a string for the wire. Scenario strings have no escapes, so quotes inside are dropped.
pub fn quoted(text: &str) -> String {
    return format!("\"{}\"", text.replace('"', ""));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general() {
        assert_eq!(general(0.0), "0");
        assert_eq!(general(12.0), "12");
        assert_eq!(general(12.5), "12.5");
        assert_eq!(general(-3.25), "-3.25");
        assert_eq!(general(0.0001), "0.000100");
        assert_eq!(general(0.00003), "0.000030");
        assert_eq!(general(0.00011), "0.00011");
    }

    #[test]
    fn test_fixed() {
        assert_eq!(fixed(12.5, 1), "12.5");
        assert_eq!(fixed(1.0, 3), "1.000");
        assert_eq!(fixed(-0.00001, 4), "0.0000");
        assert_eq!(fixed(-2.5, 1), "-2.5");
        assert_eq!(NumberStyle::Fixed(4).render(100.0), "100.0000");
        assert_eq!(NumberStyle::Integer.render(39.6), "40");
    }

    #[test]
    fn test_quoted() {
        assert_eq!(quoted("Fall Weiss"), "\"Fall Weiss\"");
        assert_eq!(quoted("a\"b"), "\"ab\"");
    }
}
