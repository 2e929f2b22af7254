//! Date handling for forms and cards.
//!
//! Wire dates are RFC 3339 timestamps (see `model::point`). The edit form
//! shows civil times in the user's zone using a `strftime` format.

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;

use crate::error::DateError;

/// Day/month/short-year with 24h time, e.g. `18/03/19 10:30`
pub const FORM_DATE_FORMAT: &str = "%d/%m/%y %H:%M";

pub fn parse_date(input: &str, format: &'static str, tz: &TimeZone) -> Result<Timestamp, DateError> {
    let civil = DateTime::strptime(format, input.trim()).map_err(|_| DateError::Format {
        input: input.to_string(),
        format,
    })?;
    civil
        .to_zoned(tz.clone())
        .map(|zoned| zoned.timestamp())
        .map_err(|e| DateError::Zone(e.to_string()))
}

pub fn format_date(ts: Timestamp, format: &str, tz: &TimeZone) -> String {
    ts.to_zoned(tz.clone()).strftime(format).to_string()
}

/// Compact duration as shown on cards: `45M`, `02H 05M`, `3D 00H 30M`.
/// Negative spans render as `00M`.
pub fn duration_label(start: Timestamp, end: Timestamp) -> String {
    let minutes = (end.as_second() - start.as_second()).max(0) / 60;
    let days = minutes / (24 * 60);
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;

    if days > 0 {
        format!("{days}D {hours:02}H {mins:02}M")
    } else if hours > 0 {
        format!("{hours:02}H {mins:02}M")
    } else {
        format!("{mins:02}M")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_format_in_utc() {
        let parsed = parse_date("18/03/19 10:30", FORM_DATE_FORMAT, &TimeZone::UTC).unwrap();
        assert_eq!(parsed, ts("2019-03-18T10:30:00Z"));
        assert_eq!(
            format_date(parsed, FORM_DATE_FORMAT, &TimeZone::UTC),
            "18/03/19 10:30"
        );
    }

    #[test]
    fn test_parse_applies_zone_offset() {
        let tz = TimeZone::fixed(jiff::tz::offset(2));
        let parsed = parse_date("18/03/19 10:30", FORM_DATE_FORMAT, &tz).unwrap();
        assert_eq!(parsed, ts("2019-03-18T08:30:00Z"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_date("next tuesday", FORM_DATE_FORMAT, &TimeZone::UTC).unwrap_err();
        assert!(matches!(err, DateError::Format { .. }));
    }

    #[test]
    fn test_duration_labels() {
        let start = ts("2019-03-18T10:30:00Z");
        assert_eq!(duration_label(start, ts("2019-03-18T11:15:00Z")), "45M");
        assert_eq!(duration_label(start, ts("2019-03-18T12:35:00Z")), "02H 05M");
        assert_eq!(duration_label(start, ts("2019-03-21T11:00:00Z")), "3D 00H 30M");
        assert_eq!(duration_label(start, ts("2019-03-18T09:00:00Z")), "00M");
    }
}
