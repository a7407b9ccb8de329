//! Percentage literals.

use crate::error::{AnalyzeError, Result};

/// Parse a ratio literal. `50%` and `0.5` both yield `0.5`.
pub fn parse_fraction(literal: &str) -> Result<f64> {
    let trimmed = literal.trim();
    let (number, is_percent) = match trimmed.strip_suffix('%') {
        Some(n) => (n, true),
        None => (trimmed, false),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| AnalyzeError::invalid_value(literal, "expected a number or percentage"))?;
    if !value.is_finite() {
        return Err(AnalyzeError::invalid_value(literal, "expected a finite number"));
    }
    Ok(if is_percent { value / 100.0 } else { value })
}

/// Parse a literal written on the 0-100 scale, with or without `%`.
pub fn parse_percentage(literal: &str) -> Result<f64> {
    let trimmed = literal.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AnalyzeError::invalid_value(literal, "expected a percentage"))
}
