//! Recurrence evaluation for scheduled prompts.
//!
//! All calendar decisions happen in the prompt's own IANA timezone via
//! jiff, so daily prompts fire once per *local* day and hourly prompts
//! cannot double-fire across DST transitions (elapsed time is compared on
//! absolute timestamps). Due-ness is always recomputed live against the
//! caller-supplied instant; the stored `next_execution` is advisory only.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use jiff::civil;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};
use thiserror::Error;

use crate::scheduling::models::ScheduledPrompt;
use crate::scheduling::types::{ExecutionStatus, Frequency};

/// Upper bound for the forward projection scan, in local days.
const PROJECTION_HORIZON_DAYS: u32 = 731;

/// A malformed schedule configuration.
///
/// These are reported to the orchestrator (which flags the prompt in its
/// execution result) instead of aborting a batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("missing required field '{0}' for this frequency")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ScheduleError {
    ScheduleError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn out_of_range(err: jiff::Error) -> ScheduleError {
    ScheduleError::OutOfRange(err.to_string())
}

/// Decide whether `prompt` is due for execution at instant `now`.
///
/// Returns `Ok(false)` when the prompt is unscheduled, already running,
/// outside its `[start_date, end_date]` window, or its recurrence rule
/// does not match; `Err` when the configuration itself is malformed.
pub fn is_due(prompt: &ScheduledPrompt, now: DateTime<Utc>) -> Result<bool, ScheduleError> {
    if !prompt.is_scheduled {
        return Ok(false);
    }
    // Overlap guard; the executor additionally claims with a conditional
    // update before running.
    if prompt.execution_status == ExecutionStatus::Running {
        return Ok(false);
    }

    let tz = load_timezone(prompt)?;
    let now_ts = to_timestamp(now)?;
    let local = now_ts.to_zoned(tz.clone());
    let today = local.date();

    if !within_date_bounds(prompt, today)? {
        return Ok(false);
    }

    let exec_time = civil_time(prompt.execution_time)?;
    let last_local = last_executed_local(prompt, &tz)?;

    match prompt.frequency {
        Frequency::Hourly => {
            let interval = hourly_interval(prompt)?;
            let anchor = match (prompt.last_executed, prompt.start_date) {
                (Some(last), _) => Some(to_timestamp(last)?),
                (None, Some(start)) => Some(start_of_day(start, &tz)?),
                (None, None) => None,
            };
            Ok(match anchor {
                Some(anchor) => {
                    now_ts.as_second() - anchor.as_second() >= i64::from(interval) * 3600
                }
                // Never executed and no start date: first poll fires.
                None => true,
            })
        }
        Frequency::Daily => {
            Ok(time_reached(&local, exec_time) && !ran_on(&last_local, today))
        }
        Frequency::Weekly => {
            let weekdays = selected_weekdays(prompt)?;
            let dow = i32::from(today.weekday().to_sunday_zero_offset());
            Ok(weekdays.contains(&dow)
                && time_reached(&local, exec_time)
                && !ran_on(&last_local, today))
        }
        Frequency::Monthly => {
            let dom = day_of_month(prompt)?;
            // Day 31 in a 30-day month clamps to the last day.
            let effective = dom.min(i32::from(today.days_in_month()));
            Ok(i32::from(today.day()) == effective
                && time_reached(&local, exec_time)
                && !ran_on(&last_local, today))
        }
        Frequency::Yearly => {
            let (start_month, end_month) = month_window(prompt)?;
            if let Some(year) = prompt.year_filter {
                if i32::from(today.year()) != year {
                    return Ok(false);
                }
            }
            let ran_this_year = last_local
                .as_ref()
                .is_some_and(|last| last.date().year() == today.year());
            Ok(month_in_window(i32::from(today.month()), start_month, end_month)
                && time_reached(&local, exec_time)
                && !ran_this_year)
        }
        Frequency::Special => {
            let dates = specific_dates(prompt)?;
            let mut matches = false;
            for date in dates {
                if civil_date(*date)? == today {
                    matches = true;
                    break;
                }
            }
            Ok(matches && time_reached(&local, exec_time) && !ran_on(&last_local, today))
        }
    }
}

/// Project the next execution instant strictly after `now`.
///
/// Deterministic forward scan using the same frequency rules as [`is_due`].
/// Used for display; due-ness is never derived from the stored value.
pub fn compute_next_execution(
    prompt: &ScheduledPrompt,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ScheduleError> {
    if !prompt.is_scheduled {
        return Ok(None);
    }

    let tz = load_timezone(prompt)?;
    let now_ts = to_timestamp(now)?;
    let local = now_ts.to_zoned(tz.clone());

    if prompt.frequency == Frequency::Hourly {
        let interval = i64::from(hourly_interval(prompt)?) * 3600;
        let anchor = match prompt.last_executed {
            Some(last) => to_timestamp(last)?,
            None => now_ts,
        };
        let anchor_s = anchor.as_second();
        let now_s = now_ts.as_second();
        let steps = if anchor_s > now_s {
            1
        } else {
            (now_s - anchor_s) / interval + 1
        };
        let next = Timestamp::from_second(anchor_s + steps * interval).map_err(out_of_range)?;
        return Ok(to_chrono(next));
    }

    let exec_time = civil_time(prompt.execution_time)?;
    let last_local = last_executed_local(prompt, &tz)?;

    let mut date = local.date();
    for _ in 0..PROJECTION_HORIZON_DAYS {
        if within_date_bounds(prompt, date)? && date_matches(prompt, date, &last_local)? {
            // A civil time inside a DST gap resolves with jiff's compatible
            // strategy, shifting forward past the transition.
            let candidate = date
                .to_datetime(exec_time)
                .to_zoned(tz.clone())
                .map_err(out_of_range)?
                .timestamp();
            if candidate > now_ts {
                return Ok(to_chrono(candidate));
            }
        }
        date = date.tomorrow().map_err(out_of_range)?;
    }

    Ok(None)
}

/// Date-only recurrence predicate shared by the projection scan.
fn date_matches(
    prompt: &ScheduledPrompt,
    date: civil::Date,
    last_local: &Option<Zoned>,
) -> Result<bool, ScheduleError> {
    if ran_on(last_local, date) {
        return Ok(false);
    }
    match prompt.frequency {
        Frequency::Hourly => Ok(false),
        Frequency::Daily => Ok(true),
        Frequency::Weekly => {
            let weekdays = selected_weekdays(prompt)?;
            Ok(weekdays.contains(&i32::from(date.weekday().to_sunday_zero_offset())))
        }
        Frequency::Monthly => {
            let dom = day_of_month(prompt)?;
            Ok(i32::from(date.day()) == dom.min(i32::from(date.days_in_month())))
        }
        Frequency::Yearly => {
            let (start_month, end_month) = month_window(prompt)?;
            if let Some(year) = prompt.year_filter {
                if i32::from(date.year()) != year {
                    return Ok(false);
                }
            }
            let ran_that_year = last_local
                .as_ref()
                .is_some_and(|last| last.date().year() == date.year());
            Ok(!ran_that_year
                && month_in_window(i32::from(date.month()), start_month, end_month))
        }
        Frequency::Special => {
            let dates = specific_dates(prompt)?;
            for d in dates {
                if civil_date(*d)? == date {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

// ============================================================================
// Field extraction with validation
// ============================================================================

fn hourly_interval(prompt: &ScheduledPrompt) -> Result<i32, ScheduleError> {
    let interval = prompt
        .hourly_interval
        .ok_or(ScheduleError::MissingField("hourly_interval"))?;
    if interval < 1 {
        return Err(invalid("hourly_interval", "must be at least 1"));
    }
    Ok(interval)
}

fn selected_weekdays(prompt: &ScheduledPrompt) -> Result<&[i32], ScheduleError> {
    let weekdays = prompt
        .weekdays
        .as_deref()
        .filter(|w| !w.is_empty())
        .ok_or(ScheduleError::MissingField("weekdays"))?;
    if weekdays.iter().any(|d| !(0..=6).contains(d)) {
        return Err(invalid("weekdays", "values must be 0-6 (Sunday = 0)"));
    }
    Ok(weekdays)
}

fn day_of_month(prompt: &ScheduledPrompt) -> Result<i32, ScheduleError> {
    let dom = prompt
        .day_of_month
        .ok_or(ScheduleError::MissingField("day_of_month"))?;
    if !(1..=31).contains(&dom) {
        return Err(invalid("day_of_month", "must be 1-31"));
    }
    Ok(dom)
}

fn month_window(prompt: &ScheduledPrompt) -> Result<(i32, i32), ScheduleError> {
    let start = prompt
        .start_month
        .ok_or(ScheduleError::MissingField("start_month"))?;
    let end = prompt
        .end_month
        .ok_or(ScheduleError::MissingField("end_month"))?;
    if !(1..=12).contains(&start) || !(1..=12).contains(&end) {
        return Err(invalid("start_month", "months must be 1-12"));
    }
    Ok((start, end))
}

fn specific_dates(prompt: &ScheduledPrompt) -> Result<&[NaiveDate], ScheduleError> {
    prompt
        .specific_dates
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or(ScheduleError::MissingField("specific_dates"))
}

// ============================================================================
// Calendar helpers
// ============================================================================

fn load_timezone(prompt: &ScheduledPrompt) -> Result<TimeZone, ScheduleError> {
    TimeZone::get(&prompt.timezone)
        .map_err(|_| ScheduleError::UnknownTimezone(prompt.timezone.clone()))
}

fn to_timestamp(dt: DateTime<Utc>) -> Result<Timestamp, ScheduleError> {
    Timestamp::new(dt.timestamp(), dt.timestamp_subsec_nanos() as i32)
        .map_err(out_of_range)
}

fn to_chrono(ts: Timestamp) -> Option<DateTime<Utc>> {
    let nanos = ts.as_nanosecond();
    let secs = nanos.div_euclid(1_000_000_000) as i64;
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::from_timestamp(secs, subsec)
}

fn civil_date(date: NaiveDate) -> Result<civil::Date, ScheduleError> {
    use chrono::Datelike;
    civil::Date::new(date.year() as i16, date.month() as i8, date.day() as i8)
        .map_err(out_of_range)
}

fn civil_time(time: NaiveTime) -> Result<civil::Time, ScheduleError> {
    use chrono::Timelike;
    civil::Time::new(time.hour() as i8, time.minute() as i8, time.second() as i8, 0)
        .map_err(out_of_range)
}

fn start_of_day(date: NaiveDate, tz: &TimeZone) -> Result<Timestamp, ScheduleError> {
    Ok(civil_date(date)?
        .to_datetime(civil::Time::midnight())
        .to_zoned(tz.clone())
        .map_err(out_of_range)?
        .timestamp())
}

fn last_executed_local(
    prompt: &ScheduledPrompt,
    tz: &TimeZone,
) -> Result<Option<Zoned>, ScheduleError> {
    prompt
        .last_executed
        .map(|last| to_timestamp(last).map(|ts| ts.to_zoned(tz.clone())))
        .transpose()
}

fn within_date_bounds(prompt: &ScheduledPrompt, date: civil::Date) -> Result<bool, ScheduleError> {
    if let Some(start) = prompt.start_date {
        if date < civil_date(start)? {
            return Ok(false);
        }
    }
    if let Some(end) = prompt.end_date {
        if date > civil_date(end)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn time_reached(local: &Zoned, exec_time: civil::Time) -> bool {
    local.time() >= exec_time
}

fn ran_on(last_local: &Option<Zoned>, date: civil::Date) -> bool {
    last_local.as_ref().is_some_and(|last| last.date() == date)
}

fn month_in_window(month: i32, start: i32, end: i32) -> bool {
    if start <= end {
        (start..=end).contains(&month)
    } else {
        // Window spans the year boundary, e.g. November through February.
        month >= start || month <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::models::test_prompt;
    use chrono::TimeZone as _;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    fn time(h: u32, mi: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, mi, 0).unwrap()
    }

    // ------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------

    #[test]
    fn unscheduled_prompt_is_never_due() {
        let prompt = test_prompt(|p| {
            p.is_scheduled = false;
            p.execution_time = time(0, 0);
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 12, 0)), Ok(false));
    }

    #[test]
    fn running_prompt_is_not_due() {
        let prompt = test_prompt(|p| {
            p.execution_status = ExecutionStatus::Running;
            p.execution_time = time(0, 0);
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 12, 0)), Ok(false));
    }

    #[test]
    fn unknown_timezone_is_reported() {
        let prompt = test_prompt(|p| {
            p.timezone = "Mars/Olympus_Mons".to_string();
        });
        assert_eq!(
            is_due(&prompt, utc(2025, 6, 2, 12, 0)),
            Err(ScheduleError::UnknownTimezone("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn date_bounds_gate_due_ness() {
        let not_started = test_prompt(|p| {
            p.start_date = Some(date(2025, 7, 1));
        });
        assert_eq!(is_due(&not_started, utc(2025, 6, 2, 12, 0)), Ok(false));

        let expired = test_prompt(|p| {
            p.end_date = Some(date(2025, 5, 31));
        });
        assert_eq!(is_due(&expired, utc(2025, 6, 2, 12, 0)), Ok(false));

        let inside = test_prompt(|p| {
            p.start_date = Some(date(2025, 6, 1));
            p.end_date = Some(date(2025, 6, 30));
        });
        assert_eq!(is_due(&inside, utc(2025, 6, 2, 12, 0)), Ok(true));
    }

    // ------------------------------------------------------------------
    // Daily
    // ------------------------------------------------------------------

    #[test]
    fn daily_fires_after_execution_time_once_per_day() {
        // 09:00 America/New_York = 13:00 UTC during EDT.
        let prompt = test_prompt(|p| {
            p.timezone = "America/New_York".to_string();
            p.last_executed = Some(utc(2025, 6, 1, 13, 1));
        });

        // 08:55 local: not yet.
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 12, 55)), Ok(false));
        // 09:05 local: due.
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 13, 5)), Ok(true));
    }

    #[test]
    fn daily_does_not_refire_within_same_local_day() {
        let prompt = test_prompt(|p| {
            p.timezone = "America/New_York".to_string();
            p.last_executed = Some(utc(2025, 6, 2, 13, 2));
        });
        // 11:00 local, already ran at 09:02 local today.
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 15, 0)), Ok(false));
    }

    #[test]
    fn daily_missed_window_fires_late_same_day() {
        // Trigger service was down at 09:00; the 17:40 local poll catches up.
        let prompt = test_prompt(|p| {
            p.last_executed = Some(utc(2025, 6, 1, 9, 5));
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 17, 40)), Ok(true));
    }

    // ------------------------------------------------------------------
    // Hourly
    // ------------------------------------------------------------------

    #[test]
    fn hourly_respects_interval() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Hourly;
            p.hourly_interval = Some(2);
            p.last_executed = Some(utc(2025, 6, 2, 10, 0));
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 11, 59)), Ok(false));
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 12, 0)), Ok(true));
    }

    #[test]
    fn hourly_does_not_double_fire_across_dst() {
        // Spring forward in America/New_York: 2025-03-09 02:00 EST -> 03:00 EDT.
        // The local wall clock jumps an hour, but elapsed time is absolute.
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Hourly;
            p.hourly_interval = Some(1);
            p.timezone = "America/New_York".to_string();
            p.last_executed = Some(utc(2025, 3, 9, 6, 30)); // 01:30 EST
        });
        assert_eq!(is_due(&prompt, utc(2025, 3, 9, 7, 29)), Ok(false));
        assert_eq!(is_due(&prompt, utc(2025, 3, 9, 7, 30)), Ok(true));
    }

    #[test]
    fn hourly_never_executed_uses_start_date_anchor() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Hourly;
            p.hourly_interval = Some(6);
            p.start_date = Some(date(2025, 6, 2));
        });
        // 04:00 UTC, four hours after midnight: not yet.
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 4, 0)), Ok(false));
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 6, 0)), Ok(true));
    }

    #[test]
    fn hourly_without_interval_is_reported() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Hourly;
        });
        assert_eq!(
            is_due(&prompt, utc(2025, 6, 2, 12, 0)),
            Err(ScheduleError::MissingField("hourly_interval"))
        );
    }

    #[test]
    fn hourly_zero_interval_is_reported() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Hourly;
            p.hourly_interval = Some(0);
        });
        assert!(matches!(
            is_due(&prompt, utc(2025, 6, 2, 12, 0)),
            Err(ScheduleError::InvalidField { field: "hourly_interval", .. })
        ));
    }

    // ------------------------------------------------------------------
    // Weekly
    // ------------------------------------------------------------------

    #[test]
    fn weekly_fires_only_on_selected_weekdays() {
        // Monday (1) and Wednesday (3); 2025-06-03 is a Tuesday.
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Weekly;
            p.weekdays = Some(vec![1, 3]);
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 3, 23, 0)), Ok(false));
        // Monday 2025-06-02 at 09:05 UTC.
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 9, 5)), Ok(true));
        // Wednesday 2025-06-04.
        assert_eq!(is_due(&prompt, utc(2025, 6, 4, 9, 5)), Ok(true));
    }

    #[test]
    fn weekly_empty_weekdays_is_reported() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Weekly;
            p.weekdays = Some(vec![]);
        });
        assert_eq!(
            is_due(&prompt, utc(2025, 6, 2, 12, 0)),
            Err(ScheduleError::MissingField("weekdays"))
        );
    }

    #[test]
    fn weekly_rejects_out_of_range_weekday() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Weekly;
            p.weekdays = Some(vec![1, 7]);
        });
        assert!(matches!(
            is_due(&prompt, utc(2025, 6, 2, 12, 0)),
            Err(ScheduleError::InvalidField { field: "weekdays", .. })
        ));
    }

    #[test]
    fn weekly_does_not_refire_same_weekday_instance() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Weekly;
            p.weekdays = Some(vec![1]);
            p.last_executed = Some(utc(2025, 6, 2, 9, 1));
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 15, 0)), Ok(false));
        // Next Monday is fine again.
        assert_eq!(is_due(&prompt, utc(2025, 6, 9, 9, 5)), Ok(true));
    }

    // ------------------------------------------------------------------
    // Monthly
    // ------------------------------------------------------------------

    #[test]
    fn monthly_day_31_clamps_to_last_day_of_short_month() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Monthly;
            p.day_of_month = Some(31);
        });
        // April has 30 days: fires on the 30th.
        assert_eq!(is_due(&prompt, utc(2025, 4, 30, 9, 5)), Ok(true));
        assert_eq!(is_due(&prompt, utc(2025, 4, 29, 9, 5)), Ok(false));
        // May has 31 days: fires on the 31st, not the 30th.
        assert_eq!(is_due(&prompt, utc(2025, 5, 30, 9, 5)), Ok(false));
        assert_eq!(is_due(&prompt, utc(2025, 5, 31, 9, 5)), Ok(true));
    }

    #[test]
    fn monthly_requires_day_of_month() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Monthly;
        });
        assert_eq!(
            is_due(&prompt, utc(2025, 6, 2, 12, 0)),
            Err(ScheduleError::MissingField("day_of_month"))
        );
    }

    // ------------------------------------------------------------------
    // Yearly
    // ------------------------------------------------------------------

    #[test]
    fn yearly_fires_inside_month_window_once_per_year() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Yearly;
            p.start_month = Some(3);
            p.end_month = Some(5);
        });
        assert_eq!(is_due(&prompt, utc(2025, 4, 10, 9, 5)), Ok(true));
        assert_eq!(is_due(&prompt, utc(2025, 7, 10, 9, 5)), Ok(false));

        let already_ran = test_prompt(|p| {
            p.frequency = Frequency::Yearly;
            p.start_month = Some(3);
            p.end_month = Some(5);
            p.last_executed = Some(utc(2025, 3, 2, 9, 5));
        });
        assert_eq!(is_due(&already_ran, utc(2025, 4, 10, 9, 5)), Ok(false));
        assert_eq!(is_due(&already_ran, utc(2026, 3, 10, 9, 5)), Ok(true));
    }

    #[test]
    fn yearly_window_wraps_year_boundary() {
        // November through February.
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Yearly;
            p.start_month = Some(11);
            p.end_month = Some(2);
        });
        assert_eq!(is_due(&prompt, utc(2025, 12, 10, 9, 5)), Ok(true));
        assert_eq!(is_due(&prompt, utc(2026, 1, 10, 9, 5)), Ok(true));
        assert_eq!(is_due(&prompt, utc(2025, 6, 10, 9, 5)), Ok(false));
    }

    #[test]
    fn yearly_year_filter_restricts_years() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Yearly;
            p.start_month = Some(1);
            p.end_month = Some(12);
            p.year_filter = Some(2026);
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 9, 5)), Ok(false));
        assert_eq!(is_due(&prompt, utc(2026, 6, 2, 9, 5)), Ok(true));
    }

    // ------------------------------------------------------------------
    // Special
    // ------------------------------------------------------------------

    #[test]
    fn special_fires_on_listed_dates_only() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Special;
            p.specific_dates = Some(vec![date(2025, 6, 2), date(2025, 12, 24)]);
        });
        assert_eq!(is_due(&prompt, utc(2025, 6, 2, 9, 5)), Ok(true));
        assert_eq!(is_due(&prompt, utc(2025, 6, 3, 9, 5)), Ok(false));
        assert_eq!(is_due(&prompt, utc(2025, 12, 24, 9, 5)), Ok(true));
    }

    #[test]
    fn special_without_dates_is_reported() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Special;
        });
        assert_eq!(
            is_due(&prompt, utc(2025, 6, 2, 12, 0)),
            Err(ScheduleError::MissingField("specific_dates"))
        );
    }

    // ------------------------------------------------------------------
    // Projection
    // ------------------------------------------------------------------

    #[test]
    fn next_daily_is_today_before_time_else_tomorrow() {
        let prompt = test_prompt(|_| {});

        let before = compute_next_execution(&prompt, utc(2025, 6, 2, 8, 0))
            .unwrap()
            .unwrap();
        assert_eq!(before, utc(2025, 6, 2, 9, 0));

        let after = compute_next_execution(&prompt, utc(2025, 6, 2, 10, 0))
            .unwrap()
            .unwrap();
        assert_eq!(after, utc(2025, 6, 3, 9, 0));
    }

    #[test]
    fn next_execution_is_strictly_future() {
        let prompt = test_prompt(|_| {});
        let exactly_at = compute_next_execution(&prompt, utc(2025, 6, 2, 9, 0))
            .unwrap()
            .unwrap();
        assert_eq!(exactly_at, utc(2025, 6, 3, 9, 0));
    }

    #[test]
    fn next_weekly_lands_on_selected_weekday() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Weekly;
            p.weekdays = Some(vec![3]); // Wednesday
        });
        let next = compute_next_execution(&prompt, utc(2025, 6, 2, 12, 0))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc(2025, 6, 4, 9, 0));
    }

    #[test]
    fn next_monthly_clamps_in_february() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Monthly;
            p.day_of_month = Some(31);
        });
        let next = compute_next_execution(&prompt, utc(2025, 2, 1, 12, 0))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc(2025, 2, 28, 9, 0));
    }

    #[test]
    fn next_hourly_advances_in_interval_steps_from_last_run() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Hourly;
            p.hourly_interval = Some(4);
            p.last_executed = Some(utc(2025, 6, 2, 6, 0));
        });
        let next = compute_next_execution(&prompt, utc(2025, 6, 2, 7, 0))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc(2025, 6, 2, 10, 0));

        // Several missed intervals collapse into the next future step.
        let next = compute_next_execution(&prompt, utc(2025, 6, 2, 19, 30))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc(2025, 6, 2, 22, 0));
    }

    #[test]
    fn next_daily_in_dst_gap_still_resolves() {
        // 02:30 does not exist on 2025-03-09 in America/New_York.
        let prompt = test_prompt(|p| {
            p.timezone = "America/New_York".to_string();
            p.execution_time = time(2, 30);
        });
        let now = utc(2025, 3, 9, 1, 0);
        let next = compute_next_execution(&prompt, now).unwrap().unwrap();
        assert!(next > now);
        // Resolved into the post-transition hour: 03:30 EDT = 07:30 UTC.
        assert_eq!(next, utc(2025, 3, 9, 7, 30));
    }

    #[test]
    fn next_unscheduled_is_none() {
        let prompt = test_prompt(|p| p.is_scheduled = false);
        assert_eq!(compute_next_execution(&prompt, utc(2025, 6, 2, 9, 0)), Ok(None));
    }

    #[test]
    fn next_special_skips_already_executed_date() {
        let prompt = test_prompt(|p| {
            p.frequency = Frequency::Special;
            p.specific_dates = Some(vec![date(2025, 6, 2), date(2025, 6, 10)]);
            p.last_executed = Some(utc(2025, 6, 2, 9, 1));
        });
        let next = compute_next_execution(&prompt, utc(2025, 6, 2, 9, 30))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc(2025, 6, 10, 9, 0));
    }
}
