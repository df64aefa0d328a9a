//! Display formatting of floating-point cells.

use serde::{Deserialize, Serialize};

/// How floating-point values are turned into display text.
///
/// Integers always render in plain decimal; only float members are
/// affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumberFormat {
    /// Shortest text that reads back to the same value.
    #[default]
    Plain,
    /// Scientific notation with `precision` digits after the point.
    Scientific { precision: usize },
    /// Fixed notation with `decimals` digits after the point.
    Fixed { decimals: usize },
}

impl NumberFormat {
    /// Appends `value` to `out`.
    pub fn write_f64(&self, value: f64, out: &mut String) {
        use std::fmt::Write;

        // Writing to a String cannot fail
        let _ = match self {
            NumberFormat::Plain => write!(out, "{value}"),
            NumberFormat::Scientific { precision } => write!(out, "{value:.precision$e}"),
            NumberFormat::Fixed { decimals } => write!(out, "{value:.decimals$}"),
        };
    }

    /// Appends a single-precision `value` to `out`.
    ///
    /// Plain formatting goes through `f32` so that `0.1f32` shows as `0.1`.
    pub fn write_f32(&self, value: f32, out: &mut String) {
        use std::fmt::Write;

        match self {
            NumberFormat::Plain => {
                let _ = write!(out, "{value}");
            }
            _ => self.write_f64(f64::from(value), out),
        }
    }

    pub fn format_f64(&self, value: f64) -> String {
        let mut out = String::new();
        self.write_f64(value, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_default() {
        assert_eq!(NumberFormat::default(), NumberFormat::Plain);
        assert_eq!(NumberFormat::Plain.format_f64(2.5), "2.5");
    }

    #[test]
    fn test_scientific() {
        let format = NumberFormat::Scientific { precision: 3 };
        assert_eq!(format.format_f64(1500.0), "1.500e3");
    }

    #[test]
    fn test_fixed() {
        let format = NumberFormat::Fixed { decimals: 2 };
        assert_eq!(format.format_f64(2.25), "2.25");
        assert_eq!(format.format_f64(7.0), "7.00");
    }

    #[test]
    fn test_plain_single_precision() {
        let mut out = String::new();
        NumberFormat::Plain.write_f32(0.1, &mut out);
        assert_eq!(out, "0.1");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&NumberFormat::Fixed { decimals: 4 }).unwrap();
        assert_eq!(json, r#"{"kind":"fixed","decimals":4}"#);
        let back: NumberFormat = serde_json::from_str(r#"{"kind":"plain"}"#).unwrap();
        assert_eq!(back, NumberFormat::Plain);
    }
}
