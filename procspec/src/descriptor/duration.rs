//! Duration strings such as `10s` or `250ms`

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)(ms|s)?$").expect("duration pattern is a valid regex")
});

/// Unit applied to bare integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Seconds,
    Milliseconds,
}

impl DurationUnit {
    /// None when the result does not fit in u64 milliseconds
    pub fn to_duration(self, amount: u64) -> Option<Duration> {
        match self {
            Self::Seconds => amount.checked_mul(1000).map(Duration::from_millis),
            Self::Milliseconds => Some(Duration::from_millis(amount)),
        }
    }
}

/// Parse `<integer>[ms|s]`, falling back to `default_unit` when no unit is given
pub fn parse_duration(s: &str, default_unit: DurationUnit) -> Option<Duration> {
    let captures = DURATION_PATTERN.captures(s.trim())?;
    let amount: u64 = captures[1].parse().ok()?;
    let unit = match captures.get(2).map(|m| m.as_str()) {
        Some("ms") => DurationUnit::Milliseconds,
        Some(_) => DurationUnit::Seconds,
        None => default_unit,
    };
    unit.to_duration(amount)
}

/// Canonical string form, always in milliseconds
pub fn format_duration(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}
