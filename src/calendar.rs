//! Date-only calendar arithmetic.
//!
//! Every date the engine compares is a `NaiveDate`: a calendar day without a time of day or
//! an offset. Timestamps coming from storage are reduced to the calendar day they were written
//! with, never shifted through a timezone first. Nothing else in the crate parses dates.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};
use hourglass_rs::SafeTimeProvider;

use crate::errors::{LedgerError, Result};

/// parse a calendar day from `YYYY-MM-DD`, an ISO-8601 timestamp or `DD/MM/YYYY`
///
/// For timestamps the calendar date is taken exactly as written, so
/// `2024-03-05T00:00:00.000Z` is March 5th whatever the reader's offset is.
pub fn parse_date_only(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let invalid = || LedgerError::InvalidDate {
        input: input.to_string(),
    };

    if let Some(head) = trimmed.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            let rest = &trimmed[10..];
            if rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ') {
                return Ok(date);
            }
            return Err(invalid());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").map_err(|_| invalid())
}

/// calendar day of a ledger timestamp
pub fn entry_day(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

/// today's calendar day according to a time provider
pub fn today(time_provider: &SafeTimeProvider) -> NaiveDate {
    time_provider.now().date_naive()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// add `days` calendar days, or business days when `skip_weekends` is set
///
/// With `skip_weekends` only Monday to Friday are counted, so a non-zero shift always lands
/// on a weekday.
pub fn add_days(date: NaiveDate, days: i64, skip_weekends: bool) -> Result<NaiveDate> {
    let overflow = || LedgerError::InvalidDate {
        input: format!("{} {:+} days", date, days),
    };

    // no shift longer than the representable calendar can land anywhere
    if days.unsigned_abs() > NaiveDate::MAX.signed_duration_since(NaiveDate::MIN).num_days().unsigned_abs() {
        return Err(overflow());
    }

    if !skip_weekends {
        let shift = Duration::try_days(days).ok_or_else(overflow)?;
        return date.checked_add_signed(shift).ok_or_else(overflow);
    }

    let step = Duration::try_days(days.signum()).ok_or_else(overflow)?;
    let mut remaining = days.unsigned_abs();
    let mut current = date;
    while remaining > 0 {
        current = current.checked_add_signed(step).ok_or_else(overflow)?;
        if !is_weekend(current) {
            remaining -= 1;
        }
    }
    Ok(current)
}

/// add calendar months, clamping to the last valid day of the target month
pub fn add_calendar_months(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(|| LedgerError::InvalidDate {
        input: format!("{} {:+} months", date, months),
    })
}

/// whole days from `target` to `today`
///
/// Positive when `target` is in the past (overdue), zero on the same day, negative when
/// `target` is still ahead.
pub fn days_between(today: NaiveDate, target: NaiveDate) -> i64 {
    today.signed_duration_since(target).num_days()
}

/// days overdue, never negative
pub fn days_late(today: NaiveDate, due: NaiveDate) -> i64 {
    days_between(today, due).max(0)
}

/// serde adapter for stored calendar days
///
/// Writes `YYYY-MM-DD` and reads anything [`parse_date_only`] accepts, so records whose dates
/// were stored as full timestamps load as the day they were written with.
pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::parse_date_only;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_only(&raw).map_err(de::Error::custom)
    }

    /// same adapter for optional days
    pub mod option {
        use chrono::NaiveDate;
        use serde::{de, Deserialize, Deserializer, Serializer};

        use super::super::parse_date_only;

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse_date_only(&raw).map(Some).map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
