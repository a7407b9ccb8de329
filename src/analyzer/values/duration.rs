//! Duration literals in Go's `time.ParseDuration` syntax.
//!
//! Collectors record latencies as integer nanoseconds; when-clauses write them
//! as `10ms`, `1.5s`, `1h30m`, `250us`.

use crate::error::{AnalyzeError, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)").unwrap());

fn unit_nanos(unit: &str) -> u128 {
    match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        _ => 3_600 * 1_000_000_000,
    }
}

/// Parse a duration literal such as `300ms` or `1h15m30.5s`.
///
/// A bare `0` is accepted; any other number needs a unit. Negative durations
/// are rejected since latencies can't be negative.
pub fn parse_duration(literal: &str) -> Result<Duration> {
    let s = literal.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() || s.starts_with('-') {
        return Err(AnalyzeError::invalid_value(literal, "not a valid duration"));
    }

    let mut rest = s;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let caps = SEGMENT_REGEX
            .captures(rest)
            .ok_or_else(|| AnalyzeError::invalid_value(literal, "not a valid duration"))?;
        let number = &caps[1];
        let unit = unit_nanos(&caps[2]);

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AnalyzeError::invalid_value(literal, "duration is out of range"))?
        };
        let mut nanos = whole
            .checked_mul(unit)
            .ok_or_else(|| AnalyzeError::invalid_value(literal, "duration is out of range"))?;

        // fractional part, truncated at nanosecond precision
        let mut scale = unit;
        for digit in frac.chars().filter_map(|c| c.to_digit(10)) {
            scale /= 10;
            if scale == 0 {
                break;
            }
            nanos = nanos
                .checked_add(digit as u128 * scale)
                .ok_or_else(|| AnalyzeError::invalid_value(literal, "duration is out of range"))?;
        }

        total = total
            .checked_add(nanos)
            .ok_or_else(|| AnalyzeError::invalid_value(literal, "duration is out of range"))?;
        rest = &rest[caps[0].len()..];
    }

    let secs = u64::try_from(total / 1_000_000_000)
        .map_err(|_| AnalyzeError::invalid_value(literal, "duration is out of range"))?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// Render a duration the way the when-clauses write it.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        "0s".to_string()
    } else if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{}µs", trim_float(nanos as f64 / 1e3))
    } else if nanos < 1_000_000_000 {
        format!("{}ms", trim_float(nanos as f64 / 1e6))
    } else {
        format!("{}s", trim_float(nanos as f64 / 1e9))
    }
}

fn trim_float(v: f64) -> String {
    let s = format!("{:.3}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
