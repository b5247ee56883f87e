//! Timestamp handling for upstream health event times.
//!
//! Upstream timestamps are carried as strings in the form
//! `YYYY-MM-DD HH:MM:SS[.ffffff]+HH:MM`. Display formatting only looks at the
//! first 16 characters, so seconds and offset are dropped on purpose.

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::{CoreError, Result};

/// Formats an upstream timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// Only the `YYYY-MM-DD HH:MM` prefix is parsed, so the seconds are always
/// rendered as `00` and any timezone suffix is ignored.
pub fn cleanup_time(value: &str) -> Result<String> {
    let prefix = value
        .get(..16)
        .ok_or_else(|| CoreError::invalid_timestamp(value))?;
    let parsed = PrimitiveDateTime::parse(
        prefix,
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    )
    .map_err(|e| CoreError::invalid_timestamp(format!("'{value}': {e}")))?;

    Ok(parsed.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))?)
}

/// Converts an upstream timestamp to Unix epoch seconds.
///
/// Fractional seconds are truncated. A trailing `+HH:MM`/`-HH:MM` offset is
/// honored; without one the time is taken as UTC.
pub fn epoch_seconds(value: &str) -> Result<i64> {
    let prefix = value
        .get(..19)
        .ok_or_else(|| CoreError::invalid_timestamp(value))?;
    let parsed = PrimitiveDateTime::parse(
        prefix,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|e| CoreError::invalid_timestamp(format!("'{value}': {e}")))?;

    let suffix = value
        .len()
        .checked_sub(6)
        .filter(|&at| at >= 19)
        .and_then(|at| value.get(at..));
    let offset = match suffix {
        Some(suffix) if suffix.starts_with(['+', '-']) => UtcOffset::parse(
            suffix,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .map_err(|e| CoreError::invalid_timestamp(format!("'{value}': {e}")))?,
        _ => UtcOffset::UTC,
    };

    Ok(parsed.assume_offset(offset).unix_timestamp())
}

/// Renders a timestamp the way upstream event payloads carry it.
pub fn upstream_timestamp(datetime: OffsetDateTime) -> Result<String> {
    let mut out = datetime.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))?;
    let micros = datetime.microsecond();
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out.push_str(&datetime.offset().format(format_description!(
        "[offset_hour sign:mandatory]:[offset_minute]"
    ))?);
    Ok(out)
}

/// Current time as Unix epoch seconds.
pub fn now_epoch() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_cleanup_time_drops_seconds() {
        assert_eq!(
            cleanup_time("2023-05-15 14:30:59.123000+00:00").unwrap(),
            "2023-05-15 14:30:00"
        );
    }

    #[test]
    fn test_cleanup_time_ignores_offset() {
        assert_eq!(
            cleanup_time("2023-05-15 14:30:00-05:00").unwrap(),
            "2023-05-15 14:30:00"
        );
    }

    #[test]
    fn test_cleanup_time_exact_prefix() {
        assert_eq!(
            cleanup_time("2023-05-15 14:30").unwrap(),
            "2023-05-15 14:30:00"
        );
    }

    #[test]
    fn test_cleanup_time_invalid() {
        assert!(cleanup_time("2023-05-15").is_err());
        assert!(cleanup_time("not a timestamp at all").is_err());
    }

    #[test]
    fn test_epoch_seconds_utc() {
        assert_eq!(
            epoch_seconds("2023-05-15 14:30:00+00:00").unwrap(),
            1684161000
        );
        assert_eq!(epoch_seconds("2023-05-15 14:30:00").unwrap(), 1684161000);
    }

    #[test]
    fn test_epoch_seconds_with_offset_and_fraction() {
        assert_eq!(
            epoch_seconds("2023-05-15 16:30:00.250000+02:00").unwrap(),
            1684161000
        );
    }

    #[test]
    fn test_epoch_seconds_fraction_without_offset_is_utc() {
        assert_eq!(
            epoch_seconds("2023-05-15 14:30:00.250000").unwrap(),
            epoch_seconds("2023-05-15 14:30:00+00:00").unwrap()
        );
        assert_eq!(
            epoch_seconds("2023-05-15 14:30:00").unwrap(),
            epoch_seconds("2023-05-15 14:30:00+00:00").unwrap()
        );
    }

    #[test]
    fn test_epoch_seconds_invalid() {
        assert!(epoch_seconds("2023-05-15 14:30").is_err());
    }

    #[test]
    fn test_upstream_timestamp_whole_seconds() {
        let dt = datetime!(2023-05-15 14:30:00 UTC);
        assert_eq!(upstream_timestamp(dt).unwrap(), "2023-05-15 14:30:00+00:00");
    }

    #[test]
    fn test_upstream_timestamp_fraction() {
        let dt = datetime!(2023-05-15 14:30:00.5 UTC);
        assert_eq!(
            upstream_timestamp(dt).unwrap(),
            "2023-05-15 14:30:00.500000+00:00"
        );
    }

    #[test]
    fn test_upstream_timestamp_parses_back() {
        let dt = datetime!(2024-01-02 03:04:05 UTC);
        let rendered = upstream_timestamp(dt).unwrap();
        assert_eq!(epoch_seconds(&rendered).unwrap(), dt.unix_timestamp());
        assert_eq!(cleanup_time(&rendered).unwrap(), "2024-01-02 03:04:00");
    }
}
