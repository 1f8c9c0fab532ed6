use std::str::FromStr;

use chrono::{DateTime, Locale, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Locale used when the caller does not name one.
pub const DEFAULT_LOCALE: Locale = Locale::en_US;

// Weekday, month, day, year, "at", 12-hour time.
const FULL_PATTERN: &str = "%A %B %-d, %Y at %-I:%M%p";
// Abbreviated weekday and month, zero-padded day, year, 12-hour time.
const MEDIUM_PATTERN: &str = "%a %b %d, %Y %-I:%M%p";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    Full,
    #[default]
    Medium,
}

impl DisplayStyle {
    fn pattern(self) -> &'static str {
        match self {
            DisplayStyle::Full => FULL_PATTERN,
            DisplayStyle::Medium => MEDIUM_PATTERN,
        }
    }
}

impl FromStr for DisplayStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(DisplayStyle::Full),
            "medium" | "" => Ok(DisplayStyle::Medium),
            other => Err(Error::Config(format!("unknown display style: {other}"))),
        }
    }
}

/// Formats a raw timestamp string for display in the default locale.
pub fn format_display_time(value: &str, style: DisplayStyle) -> Result<String> {
    format_display_time_in(value, style, DEFAULT_LOCALE)
}

pub fn format_display_time_in(value: &str, style: DisplayStyle, locale: Locale) -> Result<String> {
    let parsed = parse_timestamp(value)?;
    Ok(format_naive_in(&parsed, style, locale))
}

/// Formats an already-typed timestamp. Never fails.
pub fn format_naive(value: &NaiveDateTime, style: DisplayStyle) -> String {
    format_naive_in(value, style, DEFAULT_LOCALE)
}

pub fn format_naive_in(value: &NaiveDateTime, style: DisplayStyle, locale: Locale) -> String {
    // Wall-clock fields are rendered as-is; the UTC wrapper only provides format_localized.
    let wall: DateTime<Utc> = Utc.from_utc_datetime(value);
    wall.format_localized(style.pattern(), locale).to_string()
}

/// Reads the timestamp shapes the store and form layer produce. Offsets are dropped
/// after parsing so the local wall-clock fields are what gets displayed.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Parse("empty timestamp".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    for fmt in NAIVE_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    Err(Error::Parse(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_style_uses_abbreviated_names() {
        let formatted =
            format_display_time("2024-03-05T14:30:00", DisplayStyle::Medium).expect("format");
        assert_eq!(formatted, "Tue Mar 05, 2024 2:30PM");
        assert!(formatted.contains("Mar"));
        assert!(formatted.contains("05"));
        assert!(formatted.contains("2024"));
        assert!(formatted.contains("2:30PM"));
    }

    #[test]
    fn full_style_spells_out_names() {
        let formatted =
            format_display_time("2024-03-05 14:30:00", DisplayStyle::Full).expect("format");
        assert_eq!(formatted, "Tuesday March 5, 2024 at 2:30PM");
    }

    #[test]
    fn morning_times_render_am() {
        let formatted =
            format_display_time("2019-05-21 09:05:00", DisplayStyle::Medium).expect("format");
        assert!(formatted.ends_with("9:05AM"), "got {formatted}");
    }

    #[test]
    fn accepts_offsets_and_fractional_seconds() {
        let with_offset = parse_timestamp("2024-03-05T14:30:00-07:00").expect("offset");
        let fractional = parse_timestamp("2024-03-05 14:30:00.250").expect("fraction");
        assert_eq!(with_offset.format("%H:%M").to_string(), "14:30");
        assert_eq!(fractional.format("%H:%M").to_string(), "14:30");
    }

    #[test]
    fn unparsable_input_is_an_error() {
        let err = format_display_time("next tuesday", DisplayStyle::Medium).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(matches!(
            format_display_time("   ", DisplayStyle::Full),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn style_parses_from_config_strings() {
        assert_eq!("FULL".parse::<DisplayStyle>().unwrap(), DisplayStyle::Full);
        assert_eq!("medium".parse::<DisplayStyle>().unwrap(), DisplayStyle::Medium);
        assert!("short".parse::<DisplayStyle>().is_err());
    }

    #[test]
    fn formatting_is_deterministic() {
        let ts = parse_timestamp("2035-04-01 20:00:00").expect("parse");
        assert_eq!(
            format_naive(&ts, DisplayStyle::Medium),
            format_naive(&ts, DisplayStyle::Medium)
        );
    }
}
