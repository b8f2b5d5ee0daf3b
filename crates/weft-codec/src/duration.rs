//! Compact duration strings (`30s`, `1h30m`, `250ms`).
//!
//! Grammar: one or more `<digits><unit>` groups with no separators, where
//! unit is one of `ms`, `s`, `m`, `h`, `d`, `w`. Groups may repeat units and
//! appear in any order; their values are summed.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+(?:ms|s|m|h|d|w))+$").expect("valid duration regex"));
static GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(ms|s|m|h|d|w)").expect("valid duration regex"));

const UNITS: &[(&str, u64)] = &[
    ("w", 7 * 24 * 3_600_000),
    ("d", 24 * 3_600_000),
    ("h", 3_600_000),
    ("m", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

/// Errors produced while parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration '{0}': expected groups like 30s, 1h30m (units: ms, s, m, h, d, w)")]
    Syntax(String),

    #[error("duration '{0}' is too large")]
    Overflow(String),
}

fn unit_millis(unit: &str) -> u64 {
    UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, ms)| *ms)
        .unwrap_or(0)
}

/// Parses a compact duration string.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }
    if !FULL.is_match(trimmed) {
        return Err(DurationError::Syntax(trimmed.to_string()));
    }

    let mut total: u64 = 0;
    for caps in GROUP.captures_iter(trimmed) {
        let amount: u64 = caps[1]
            .parse()
            .map_err(|_| DurationError::Overflow(trimmed.to_string()))?;
        total = amount
            .checked_mul(unit_millis(&caps[2]))
            .and_then(|ms| total.checked_add(ms))
            .ok_or_else(|| DurationError::Overflow(trimmed.to_string()))?;
    }
    Ok(Duration::from_millis(total))
}

/// Formats a duration canonically, largest unit first (`90s` -> `1m30s`).
///
/// Sub-millisecond precision is dropped. A zero duration formats as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let mut remaining = duration.as_millis();
    if remaining == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    for (unit, ms) in UNITS {
        let ms = u128::from(*ms);
        let count = remaining / ms;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push_str(unit);
            remaining -= count * ms;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2w"), Ok(Duration::from_secs(14 * 86_400)));
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5_400)));
        assert_eq!(parse_duration("1m1m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration(" 5m "), Ok(Duration::from_secs(300)));
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        assert_eq!(
            parse_duration("30x"),
            Err(DurationError::Syntax("30x".to_string()))
        );
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("1h 30m").is_err());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_duration("   "), Err(DurationError::Empty));
    }

    #[test]
    fn test_parse_overflow() {
        assert!(matches!(
            parse_duration("99999999999999999999w"),
            Err(DurationError::Overflow(_))
        ));
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_millis(3_600_250)), "1h250ms");
        assert_eq!(format_duration(Duration::from_secs(8 * 86_400)), "1w1d");
    }

    proptest! {
        #[test]
        fn format_then_parse_preserves_millis(ms in 0u64..10_000_000_000) {
            let d = Duration::from_millis(ms);
            prop_assert_eq!(parse_duration(&format_duration(d)), Ok(d));
        }
    }
}
