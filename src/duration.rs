//! Mute duration tokens such as `30m`, `2h` or `1d`.

use chrono::{DateTime, TimeDelta, Utc};

/// Parse a duration token: a positive integer followed by `m`, `h` or `d`.
///
/// Anything else, including zero, negative or overflowing amounts, yields `None`; callers
/// fall back to their default duration.
#[must_use]
pub fn parse_duration(token: &str) -> Option<TimeDelta> {
    let unit = token.chars().last()?;
    let amount: i64 = token[..token.len() - unit.len_utf8()].parse().ok()?;
    if amount <= 0 {
        return None;
    }

    match unit {
        'm' => TimeDelta::try_minutes(amount),
        'h' => TimeDelta::try_hours(amount),
        'd' => TimeDelta::try_days(amount),
        _ => None,
    }
}

/// Point in time `delta` after `now`, or `None` past the last representable date
#[must_use]
pub fn deadline(now: DateTime<Utc>, delta: TimeDelta) -> Option<DateTime<Utc>> {
    now.checked_add_signed(delta)
}

/// Human-readable form of a whole duration, largest unit first
#[must_use]
pub fn describe(delta: TimeDelta) -> String {
    let (amount, unit) = if delta.num_days() > 0 && delta.num_hours() % 24 == 0 {
        (delta.num_days(), "day")
    } else if delta.num_hours() > 0 && delta.num_minutes() % 60 == 0 {
        (delta.num_hours(), "hour")
    } else {
        (delta.num_minutes(), "minute")
    };

    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_units() {
        assert_eq!(parse_duration("30m"), Some(TimeDelta::minutes(30)));
        assert_eq!(parse_duration("2h"), Some(TimeDelta::hours(2)));
        assert_eq!(parse_duration("1d"), Some(TimeDelta::days(1)));
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for token in ["abc", "", "m", "10", "10s", "1.5h", "-5m", "0d", "h2", "99999999999999999d"] {
            assert_eq!(parse_duration(token), None, "token {token:?}");
        }
    }

    #[test]
    fn test_parse_does_not_panic_on_multibyte_suffix() {
        assert_eq!(parse_duration("5ч"), None);
    }

    #[test]
    fn test_deadline_offsets_from_now() {
        let now = Utc::now();
        assert_eq!(deadline(now, TimeDelta::minutes(30)), Some(now + TimeDelta::minutes(30)));
    }

    #[test]
    fn test_deadline_past_last_date_is_none() {
        // Parses fine but lies beyond the calendar's range
        let huge = parse_duration("99999999d").unwrap();
        assert_eq!(deadline(Utc::now(), huge), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(TimeDelta::days(1)), "1 day");
        assert_eq!(describe(TimeDelta::days(3)), "3 days");
        assert_eq!(describe(TimeDelta::hours(1)), "1 hour");
        assert_eq!(describe(TimeDelta::hours(36)), "36 hours");
        assert_eq!(describe(TimeDelta::minutes(90)), "90 minutes");
        assert_eq!(describe(TimeDelta::minutes(1)), "1 minute");
    }
}
