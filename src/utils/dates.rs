use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use tracing::warn;

/// Default timezone for profiles that never set one.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Moscow;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve an IANA timezone name, falling back to Europe/Moscow on a
/// missing or unparseable value.
pub fn resolve_tz(name: Option<&str>) -> Tz {
    match name {
        Some(raw) => raw.parse::<Tz>().unwrap_or_else(|_| {
            warn!(target: "app::dates", timezone = raw, "unknown timezone, falling back to default");
            DEFAULT_TIMEZONE
        }),
        None => DEFAULT_TIMEZONE,
    }
}

/// Calendar date "today" for the given instant, as seen in `tz`. Calendar
/// dates, not instants, so streak math cannot drift across midnight.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub fn yesterday_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    today_in(tz, now) - Duration::days(1)
}

/// Monday of the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// Bounds of the strictly previous Monday-Sunday week, in UTC day terms.
pub fn previous_week_bounds(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let this_monday = week_start(now.date_naive());
    let prev_monday = this_monday - Duration::days(7);
    (prev_monday, this_monday - Duration::days(1))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn is_monday_or_sunday(now: DateTime<Utc>) -> bool {
    matches!(now.weekday(), Weekday::Mon | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn resolve_tz_falls_back_on_garbage() {
        assert_eq!(resolve_tz(Some("Mars/Olympus")), DEFAULT_TIMEZONE);
        assert_eq!(resolve_tz(None), DEFAULT_TIMEZONE);
        assert_eq!(
            resolve_tz(Some("Asia/Yekaterinburg")),
            chrono_tz::Asia::Yekaterinburg
        );
    }

    #[test]
    fn today_respects_timezone_offset() {
        // 22:30 UTC is already the next day in Moscow (UTC+3).
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 22, 30, 0).unwrap();
        assert_eq!(
            today_in(DEFAULT_TIMEZONE, now),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
        assert_eq!(
            today_in(chrono_tz::UTC, now),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
    }

    #[test]
    fn week_start_is_monday() {
        // 2025-03-12 is a Wednesday.
        let wednesday = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        assert_eq!(
            week_start(wednesday),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        // A Monday is its own week start.
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn previous_week_is_strictly_monday_to_sunday() {
        // Wednesday 2025-03-12 -> previous week 03-03..03-09.
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap();
        let (start, end) = previous_week_bounds(now);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());

        // On a Monday the window is still the full week just ended.
        let monday = Utc.with_ymd_and_hms(2025, 3, 10, 0, 30, 0).unwrap();
        let (start, end) = previous_week_bounds(monday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
    }
}
