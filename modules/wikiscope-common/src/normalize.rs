//! Field normalization for raw documents. Scraped collections are messy:
//! counts arrive as numbers or as strings with thousands separators, and
//! revision timestamps come in several textual shapes. Everything here is
//! total: bad input becomes `None`, never an error.

use bson::Bson;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};

// --- Numeric counts ---

/// Coerce a raw count field into an integer. Accepts BSON integers and
/// doubles, plus strings with optional ASCII thousands separators
/// ("12,345"). Idempotent: re-normalizing an already-clean value is a
/// no-op. Anything unparseable is `None`.
pub fn clean_count(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(f) if f.is_finite() => Some(*f as i64),
        Bson::String(s) => {
            let stripped: String = s.trim().chars().filter(|c| *c != ',').collect();
            if stripped.is_empty() {
                return None;
            }
            if let Ok(n) = stripped.parse::<i64>() {
                return Some(n);
            }
            match stripped.parse::<f64>() {
                Ok(f) if f.is_finite() => Some(f as i64),
                _ => None,
            }
        }
        _ => None,
    }
}

// --- Revision timestamps ---

/// Parse a revision timestamp. BSON datetimes pass through; strings are
/// tried against the formats the corpus is known to contain, most specific
/// first. Unparseable values are `None` and the row is kept.
pub fn parse_rev_ts(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis()),
        Bson::String(s) => parse_ts_str(s.trim()),
        _ => None,
    }
}

fn parse_ts_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

// --- Calendar derivations ---

/// Weekday display labels, Monday first. Sunday is "CN" (chủ nhật).
pub const WEEKDAY_LABELS: [&str; 7] = [
    "Thứ 2", "Thứ 3", "Thứ 4", "Thứ 5", "Thứ 6", "Thứ 7", "CN",
];

pub fn weekday_label(day: Weekday) -> &'static str {
    WEEKDAY_LABELS[day.num_days_from_monday() as usize]
}

pub fn year_of(ts: &DateTime<Utc>) -> i32 {
    ts.year()
}

pub fn hour_of(ts: &DateTime<Utc>) -> u32 {
    ts.hour()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // --- clean_count tests ---

    #[test]
    fn integers_pass_through() {
        assert_eq!(clean_count(&Bson::Int32(42)), Some(42));
        assert_eq!(clean_count(&Bson::Int64(9_000_000_000)), Some(9_000_000_000));
    }

    #[test]
    fn doubles_truncate_toward_zero() {
        assert_eq!(clean_count(&Bson::Double(123.9)), Some(123));
        assert_eq!(clean_count(&Bson::Double(-7.5)), Some(-7));
        assert_eq!(clean_count(&Bson::Double(f64::NAN)), None);
    }

    #[test]
    fn strings_drop_thousands_separators() {
        assert_eq!(clean_count(&Bson::String("12,345".into())), Some(12_345));
        assert_eq!(clean_count(&Bson::String(" 1,234,567 ".into())), Some(1_234_567));
        assert_eq!(clean_count(&Bson::String("890".into())), Some(890));
    }

    #[test]
    fn fractional_strings_truncate() {
        assert_eq!(clean_count(&Bson::String("123.45".into())), Some(123));
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = clean_count(&Bson::String("12,345".into())).unwrap();
        let twice = clean_count(&Bson::Int64(once)).unwrap();
        assert_eq!(once, twice);
        assert_eq!(clean_count(&Bson::String(once.to_string())), Some(once));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(clean_count(&Bson::String("n/a".into())), None);
        assert_eq!(clean_count(&Bson::String("".into())), None);
        assert_eq!(clean_count(&Bson::Null), None);
        assert_eq!(clean_count(&Bson::Boolean(true)), None);
    }

    // --- parse_rev_ts tests ---

    #[test]
    fn bson_datetime_passes_through() {
        let millis = 1_577_836_800_000; // 2020-01-01T00:00:00Z
        let parsed = parse_rev_ts(&Bson::DateTime(bson::DateTime::from_millis(millis))).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rfc3339_strings_parse() {
        let parsed = parse_rev_ts(&Bson::String("2021-06-01T12:30:00Z".into())).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn naive_iso_strings_parse() {
        let parsed = parse_rev_ts(&Bson::String("2021-06-01T12:30:00.500".into())).unwrap();
        assert_eq!(parsed.timestamp_millis() % 1000, 500);
    }

    #[test]
    fn space_separated_strings_parse() {
        let parsed = parse_rev_ts(&Bson::String("2019-03-15 08:00:00".into())).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 3, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn bare_dates_parse_to_midnight() {
        let parsed = parse_rev_ts(&Bson::String("2018-12-31".into())).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2018, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn unparseable_timestamps_are_none() {
        assert_eq!(parse_rev_ts(&Bson::String("yesterday".into())), None);
        assert_eq!(parse_rev_ts(&Bson::String("31/12/2018".into())), None);
        assert_eq!(parse_rev_ts(&Bson::Null), None);
        assert_eq!(parse_rev_ts(&Bson::Int64(1_577_836_800)), None);
    }

    // --- calendar tests ---

    #[test]
    fn weekday_labels_are_monday_first() {
        assert_eq!(weekday_label(Weekday::Mon), "Thứ 2");
        assert_eq!(weekday_label(Weekday::Sat), "Thứ 7");
        assert_eq!(weekday_label(Weekday::Sun), "CN");
    }

    #[test]
    fn derivations_read_calendar_fields() {
        let ts = Utc.with_ymd_and_hms(2023, 7, 9, 22, 15, 0).unwrap();
        assert_eq!(year_of(&ts), 2023);
        assert_eq!(hour_of(&ts), 22);
        // 2023-07-09 was a Sunday
        assert_eq!(weekday_label(ts.weekday()), "CN");
    }
}
