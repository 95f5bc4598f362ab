//! Calendar window resolution for execution log queries.
//!
//! Window boundaries are computed in the caller's calendar (timezone
//! supplied per request, UTC by default), mirroring how the schedule
//! evaluator treats prompt-local time.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use jiff::civil;
use jiff::tz::TimeZone;
use jiff::{Span, Timestamp};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Relative calendar window for filtering execution logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Today,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl FromStr for TimeFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "all" => Ok(Self::All),
            other => Err(AppError::BadRequest {
                message: format!(
                    "invalid time filter '{}', expected today|week|month|year|all",
                    other
                ),
            }),
        }
    }
}

/// Lower boundary of the window containing `now`, in the given timezone.
///
/// `All` has no boundary. Weeks start on Sunday, matching the weekday
/// numbering used by weekly schedules.
pub fn window_start(
    filter: TimeFilter,
    now: DateTime<Utc>,
    timezone: &str,
) -> AppResult<Option<DateTime<Utc>>> {
    if filter == TimeFilter::All {
        return Ok(None);
    }

    let tz = TimeZone::get(timezone).map_err(|_| AppError::BadRequest {
        message: format!("unknown timezone '{}'", timezone),
    })?;
    let now_ts = Timestamp::new(now.timestamp(), now.timestamp_subsec_nanos() as i32)
        .map_err(|e| AppError::BadRequest {
            message: format!("timestamp out of range: {}", e),
        })?;
    let today = now_ts.to_zoned(tz.clone()).date();

    let start_date = match filter {
        TimeFilter::Today => today,
        TimeFilter::Week => {
            let days_back = i64::from(today.weekday().to_sunday_zero_offset());
            today
                .checked_sub(Span::new().days(days_back))
                .map_err(window_error)?
        }
        TimeFilter::Month => civil::Date::new(today.year(), today.month(), 1)
            .map_err(window_error)?,
        TimeFilter::Year => civil::Date::new(today.year(), 1, 1).map_err(window_error)?,
        TimeFilter::All => unreachable!(),
    };

    let start = start_date
        .to_datetime(civil::Time::midnight())
        .to_zoned(tz)
        .map_err(window_error)?
        .timestamp();

    let nanos = start.as_nanosecond();
    let secs = nanos.div_euclid(1_000_000_000) as i64;
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    Ok(DateTime::from_timestamp(secs, subsec))
}

fn window_error(err: jiff::Error) -> AppError {
    AppError::Internal {
        source: anyhow::anyhow!("window computation failed: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn all_has_no_boundary() {
        assert_eq!(
            window_start(TimeFilter::All, utc(2025, 6, 4, 12, 0), "UTC").unwrap(),
            None
        );
    }

    #[test]
    fn today_starts_at_local_midnight() {
        // 2025-06-04 01:30 UTC is still 2025-06-03 21:30 in New York.
        let start = window_start(
            TimeFilter::Today,
            utc(2025, 6, 4, 1, 30),
            "America/New_York",
        )
        .unwrap()
        .unwrap();
        // Local midnight 2025-06-03 is 04:00 UTC.
        assert_eq!(start, utc(2025, 6, 3, 4, 0));
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-06-04 is a Wednesday; the week began Sunday 2025-06-01.
        let start = window_start(TimeFilter::Week, utc(2025, 6, 4, 12, 0), "UTC")
            .unwrap()
            .unwrap();
        assert_eq!(start, utc(2025, 6, 1, 0, 0));
    }

    #[test]
    fn month_and_year_boundaries() {
        let month = window_start(TimeFilter::Month, utc(2025, 6, 15, 12, 0), "UTC")
            .unwrap()
            .unwrap();
        assert_eq!(month, utc(2025, 6, 1, 0, 0));

        let year = window_start(TimeFilter::Year, utc(2025, 6, 15, 12, 0), "UTC")
            .unwrap()
            .unwrap();
        assert_eq!(year, utc(2025, 1, 1, 0, 0));
    }

    #[test]
    fn filter_parses_from_query_values() {
        assert_eq!("today".parse::<TimeFilter>().unwrap(), TimeFilter::Today);
        assert_eq!("ALL".parse::<TimeFilter>().unwrap(), TimeFilter::All);
        assert!("fortnight".parse::<TimeFilter>().is_err());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert!(window_start(TimeFilter::Today, utc(2025, 6, 4, 12, 0), "Nowhere/Here").is_err());
    }
}
