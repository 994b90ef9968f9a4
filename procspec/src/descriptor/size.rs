//! Human-readable memory thresholds such as `500M`

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)([KMGkmg])$").expect("size pattern is a valid regex")
});

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// A byte count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSizeError;

impl fmt::Display for ParseSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected <positive integer><K|M|G>")
    }
}

impl std::error::Error for ParseSizeError {}

impl ByteSize {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> u64 {
        self.0
    }

    /// Largest unit that divides the value exactly, if any
    fn exact_unit(&self) -> Option<(u64, char)> {
        if self.0 == 0 {
            return None;
        }
        [(GIB, 'G'), (MIB, 'M'), (KIB, 'K')]
            .into_iter()
            .find(|(multiplier, _)| self.0 % multiplier == 0)
    }

    /// Unit string when one divides the value exactly, e.g. `500M`
    pub fn to_unit_string(&self) -> Option<String> {
        self.exact_unit()
            .map(|(multiplier, unit)| format!("{}{}", self.0 / multiplier, unit))
    }
}

impl FromStr for ByteSize {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = SIZE_PATTERN.captures(s.trim()).ok_or(ParseSizeError)?;
        let magnitude: u64 = captures[1].parse().map_err(|_| ParseSizeError)?;
        if magnitude == 0 {
            return Err(ParseSizeError);
        }
        let multiplier = match &captures[2] {
            "K" | "k" => KIB,
            "M" | "m" => MIB,
            _ => GIB,
        };
        magnitude
            .checked_mul(multiplier)
            .map(Self)
            .ok_or(ParseSizeError)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_unit_string() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "{}B", self.0),
        }
    }
}
