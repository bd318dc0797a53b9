//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale};
use chrono_tz::Tz;
use thiserror::Error;

use crate::config::SiteConfig;

/// Why a publication date could not be displayed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("no publication date")]
    Missing,

    #[error("invalid date: {0:?}")]
    Invalid(String),
}

/// Parse a content API timestamp such as `2021-03-25T19:25:28+0000`
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, FormatError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|_| FormatError::Invalid(value.to_string()))
}

/// Formats publication dates in the site's locale and time zone
#[derive(Debug, Clone)]
pub struct DateFormatter {
    date_format: String,
    time_format: String,
    locale: Locale,
    timezone: Tz,
}

impl DateFormatter {
    /// Create a formatter from Moment.js-style formats
    pub fn new(date_format: &str, time_format: &str, locale: &str, timezone: &str) -> Self {
        let locale = parse_locale(locale).unwrap_or_else(|| {
            tracing::warn!("Unknown locale {:?}, falling back to en_US", locale);
            Locale::en_US
        });
        let timezone = timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, falling back to UTC", timezone);
            Tz::UTC
        });

        Self {
            date_format: moment_to_chrono_format(date_format),
            time_format: moment_to_chrono_format(time_format),
            locale,
            timezone,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            &config.date_format,
            &config.time_format,
            &config.locale,
            &config.timezone,
        )
    }

    fn localize(&self, timestamp: Option<&str>, format: &str) -> Result<String, FormatError> {
        let date = parse_timestamp(timestamp.ok_or(FormatError::Missing)?)?;
        Ok(date
            .with_timezone(&self.timezone)
            .format_localized(format, self.locale)
            .to_string())
    }

    /// Format the date part, e.g. `25 mar 2021`
    pub fn format(&self, timestamp: Option<&str>) -> Result<String, FormatError> {
        self.localize(timestamp, &self.date_format)
    }

    /// Format the time part, e.g. `19:25`
    pub fn format_time(&self, timestamp: Option<&str>) -> Result<String, FormatError> {
        self.localize(timestamp, &self.time_format)
    }

    /// Format the date part, or return `placeholder` when it cannot be shown
    pub fn format_or_placeholder(&self, timestamp: Option<&str>, placeholder: &str) -> String {
        match self.format(timestamp) {
            Ok(date) => date,
            Err(e) => {
                tracing::debug!("Rendering date placeholder: {}", e);
                placeholder.to_string()
            }
        }
    }

    /// Machine-readable value for a `<time datetime>` attribute
    pub fn datetime_attr(&self, timestamp: Option<&str>) -> Option<String> {
        let date = parse_timestamp(timestamp?).ok()?;
        Some(
            date.with_timezone(&self.timezone)
                .format("%Y-%m-%dT%H:%M:%S%:z")
                .to_string(),
        )
    }
}

/// Accepts `pt_BR` and `pt-BR` spellings
fn parse_locale(name: &str) -> Option<Locale> {
    let locale = match name.replace('-', "_").as_str() {
        "pt_BR" => Locale::pt_BR,
        "pt_PT" => Locale::pt_PT,
        "en_US" | "en" => Locale::en_US,
        "en_GB" => Locale::en_GB,
        "es_ES" | "es" => Locale::es_ES,
        "fr_FR" | "fr" => Locale::fr_FR,
        "de_DE" | "de" => Locale::de_DE,
        "it_IT" | "it" => Locale::it_IT,
        "ja_JP" | "ja" => Locale::ja_JP,
        "zh_CN" => Locale::zh_CN,
        _ => return None,
    };
    Some(locale)
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(locale: &str) -> DateFormatter {
        DateFormatter::new("DD MMM YYYY", "HH:mm", locale, "UTC")
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let compact = parse_timestamp("2021-03-25T19:25:28+0000").unwrap();
        let rfc = parse_timestamp("2021-03-25T19:25:28+00:00").unwrap();
        assert_eq!(compact, rfc);
        assert!(parse_timestamp("2021-03-25T19:25:28.123+0000").is_ok());
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(FormatError::Invalid(_))
        ));
    }

    #[test]
    fn test_format_english() {
        let f = formatter("en_US");
        assert_eq!(
            f.format(Some("2021-03-25T19:25:28+0000")).unwrap(),
            "25 Mar 2021"
        );
        assert_eq!(
            f.format_time(Some("2021-03-25T19:25:28+0000")).unwrap(),
            "19:25"
        );
    }

    #[test]
    fn test_format_portuguese() {
        let f = formatter("pt-BR");
        assert_eq!(
            f.format(Some("2021-02-05T10:00:00+0000")).unwrap(),
            "05 fev 2021"
        );
    }

    #[test]
    fn test_timezone_shifts_date() {
        let f = DateFormatter::new("DD MMM YYYY", "HH:mm", "en_US", "America/Sao_Paulo");
        assert_eq!(
            f.format(Some("2021-03-25T01:00:00+0000")).unwrap(),
            "24 Mar 2021"
        );
    }

    #[test]
    fn test_null_date_is_an_error_not_a_panic() {
        let f = formatter("en_US");
        assert_eq!(f.format(None), Err(FormatError::Missing));
        assert_eq!(f.format_or_placeholder(None, "—"), "—");
        assert_eq!(f.format_or_placeholder(Some("garbage"), "n/a"), "n/a");
        assert_eq!(f.datetime_attr(None), None);
    }

    #[test]
    fn test_unknown_locale_and_timezone_fall_back() {
        let f = DateFormatter::new("DD MMM YYYY", "HH:mm", "xx_XX", "Mars/Olympus");
        assert_eq!(
            f.format(Some("2021-03-25T19:25:28+0000")).unwrap(),
            "25 Mar 2021"
        );
        assert_eq!(
            f.datetime_attr(Some("2021-03-25T19:25:28+0000")).as_deref(),
            Some("2021-03-25T19:25:28+00:00")
        );
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("DD MMM YYYY"), "%d %b %Y");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}
