//! Age and date formatting for profile records.

use chrono::{DateTime, Utc};

const SECONDS_IN_DAY: i64 = 24 * 60 * 60;
const SECONDS_IN_MONTH: i64 = 30 * SECONDS_IN_DAY;
const SECONDS_IN_YEAR: i64 = 365 * SECONDS_IN_DAY;

/// Formats the time elapsed between `since` and `now` as years, months and days.
///
/// Months are 30 days and years are 365 days. Zero components are left out, so a
/// character created 400 days ago is `"1y1m5d"` and one created 30 days ago is `"1m"`.
/// Anything under a day, including timestamps in the future, is `"today"`.
///
/// # Arguments
/// - `since` - Start of the interval, e.g. a character's birthday
/// - `now` - End of the interval, normally `Utc::now()`
///
/// # Example
/// ```ignore
/// let birthday = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
/// let now = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
/// assert_eq!(elapsed_string(birthday, now), "1y1m5d");
/// ```
pub fn elapsed_string(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mut seconds = now.signed_duration_since(since).num_seconds().max(0);

    let years = seconds / SECONDS_IN_YEAR;
    seconds -= years * SECONDS_IN_YEAR;
    let months = seconds / SECONDS_IN_MONTH;
    seconds -= months * SECONDS_IN_MONTH;
    let days = seconds / SECONDS_IN_DAY;

    let mut elapsed = String::new();
    for (count, unit) in [(years, 'y'), (months, 'm'), (days, 'd')] {
        if count > 0 {
            elapsed.push_str(&count.to_string());
            elapsed.push(unit);
        }
    }

    if elapsed.is_empty() {
        elapsed.push_str("today");
    }

    elapsed
}

/// Time elapsed from `since` until now, see [`elapsed_string`].
pub fn age_since(since: DateTime<Utc>) -> String {
    elapsed_string(since, Utc::now())
}

/// Date part of a timestamp as `YYYY-MM-DD`.
pub fn date_part(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}
