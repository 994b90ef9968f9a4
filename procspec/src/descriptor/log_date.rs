//! Log timestamp templates in the moment.js token style used by ecosystem files

use chrono::{DateTime, Datelike, TimeZone};
use std::fmt;

/// Token translations, longest first so `YYYY` wins over `YY`
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("DDDD", "%j"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("SSS", "%3f"),
    ("A", "%p"),
    ("a", "%P"),
    ("ZZ", "%z"),
    ("Z", "%:z"),
    ("X", "%s"),
];

/// Date format template for log line prefixes, e.g. `YYYY-MM-DD HH:mm:ss Z`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDateFormat(String);

impl LogDateFormat {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Translate the template into a chrono `strftime` format string
    ///
    /// Text inside `[...]` is copied literally and characters that are not
    /// tokens pass through unchanged. `Do` has no `strftime` equivalent and
    /// becomes the bare day of month; [`render`](Self::render) adds the suffix.
    pub fn to_chrono_format(&self) -> String {
        self.pieces()
            .into_iter()
            .map(|piece| match piece {
                Piece::Format(format) => format,
                Piece::DayOrdinal => "%-d".to_string(),
            })
            .collect()
    }

    /// Render a timestamp with this template
    pub fn render<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut out = String::new();
        for piece in self.pieces() {
            match piece {
                Piece::Format(format) => out.push_str(&datetime.format(&format).to_string()),
                Piece::DayOrdinal => out.push_str(&ordinal(datetime.day())),
            }
        }
        out
    }

    fn pieces(&self) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut current = String::with_capacity(self.0.len() * 2);
        let mut rest = self.0.as_str();

        while let Some(ch) = rest.chars().next() {
            if ch == '[' {
                if let Some(end) = rest.find(']') {
                    push_literal(&mut current, &rest[1..end]);
                    rest = &rest[end + 1..];
                    continue;
                }
            }

            if let Some(after) = rest.strip_prefix(DAY_ORDINAL) {
                if !current.is_empty() {
                    pieces.push(Piece::Format(std::mem::take(&mut current)));
                }
                pieces.push(Piece::DayOrdinal);
                rest = after;
                continue;
            }

            if let Some((token, spec)) = TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
                current.push_str(spec);
                rest = &rest[token.len()..];
                continue;
            }

            push_literal(&mut current, &rest[..ch.len_utf8()]);
            rest = &rest[ch.len_utf8()..];
        }

        if !current.is_empty() {
            pieces.push(Piece::Format(current));
        }
        pieces
    }
}

/// Day of month with its English suffix (`Do`)
const DAY_ORDINAL: &str = "Do";

enum Piece {
    Format(String),
    DayOrdinal,
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

fn push_literal(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}

impl fmt::Display for LogDateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
