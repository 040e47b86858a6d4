//! Helpers for working with the server's configured local timezone.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if `canonical_timezone` is not a known timezone name.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current date and time in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone name.
pub fn local_now(canonical_timezone: &str) -> Result<OffsetDateTime, Error> {
    let offset = get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezone(canonical_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(offset))
}

/// `date_time` in `offset`, or unchanged if that would leave the calendar.
pub fn to_local(date_time: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    date_time.checked_to_offset(offset).unwrap_or(date_time)
}

#[cfg(test)]
mod tests {
    use time::{
        UtcOffset,
        macros::{datetime, offset},
    };

    use crate::Error;

    use super::{get_local_offset, local_now, to_local};

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(get_local_offset("Etc/UTC"), Some(UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert_eq!(
            local_now("Not/AZone"),
            Err(Error::InvalidTimezone("Not/AZone".to_owned()))
        );
    }

    #[test]
    fn converts_to_local_time_within_calendar() {
        assert_eq!(
            to_local(datetime!(2025-03-03 20:00 UTC), offset!(+13)),
            datetime!(2025-03-04 09:00 +13)
        );

        let last_moment = datetime!(9999-12-31 23:00 UTC);
        assert_eq!(to_local(last_moment, offset!(+13)), last_moment);
    }
}
