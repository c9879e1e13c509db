//! Date enumeration: repeatedly finding instants that match a component
//! pattern.
//!
//! The search walks one repeat period at a time. The period is the unit
//! immediately containing the pattern's coarsest set unit, so a pattern
//! naming a month repeats yearly and a pattern naming only an hour repeats
//! daily. Within each period the pattern is projected onto the period's
//! context, the projection is verified, and a mismatch is either repaired
//! (per the match policy) or the period is skipped.

use crate::{
    calendar::{abs_from_ms, Calendar},
    components::DateComponents,
    error::CalendarError,
    fields::{Field, LimitKind},
    matcher::MatchReport,
    options::{Direction, MatchPolicy, RepeatedInstant, SearchOptions},
    unit::CalendarUnit,
    utils::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND},
    AddOptions, CalendarResult,
};

/// Consecutive periods without a match before the search gives up.
const MAX_MISSED_PERIODS: usize = 100;

impl Calendar {
    /// Enumerates instants matching `comps`, starting strictly after (or,
    /// searching backward, strictly before) `start`.
    ///
    /// `body` receives each match, whether it was exact, and a stop flag.
    /// When the pattern can produce no further matches the body is invoked
    /// one final time with `None`.
    pub fn enumerate_dates<F>(
        &self,
        start: f64,
        comps: &DateComponents,
        options: SearchOptions,
        mut body: F,
    ) where
        F: FnMut(Option<f64>, bool, &mut bool),
    {
        let mut stop = false;
        let Some(highest) = comps.highest_set_unit() else {
            body(None, false, &mut stop);
            return;
        };
        if !self.components_are_plausible(comps) {
            body(None, false, &mut stop);
            return;
        }
        let period = highest.next_higher();

        let mut last: Option<f64> = None;
        let mut anchor = start;
        let mut misses = 0usize;
        loop {
            let mut emitted = None;
            if let Ok(Some((candidate, exact))) = self.candidate_in_period(anchor, comps, options)
            {
                let beyond = match options.direction {
                    Direction::Forward => {
                        candidate > start && last.is_none_or(|l| candidate > l)
                    }
                    Direction::Backward => {
                        candidate < start && last.is_none_or(|l| candidate < l)
                    }
                };
                if beyond {
                    let candidate = match options.repeated {
                        RepeatedInstant::First => candidate,
                        RepeatedInstant::Last => self.last_occurrence(candidate),
                    };
                    #[cfg(feature = "log")]
                    log::trace!("match at {candidate} (exact: {exact})");
                    body(Some(candidate), exact, &mut stop);
                    if stop {
                        return;
                    }
                    last = Some(candidate);
                    emitted = Some(candidate);
                }
            }
            match emitted {
                Some(_) => misses = 0,
                None => {
                    misses += 1;
                    if misses >= MAX_MISSED_PERIODS {
                        break;
                    }
                }
            }
            let Some(period) = period else {
                break;
            };
            let basis = emitted.unwrap_or(anchor);
            match self.advance_period(period, basis, options.direction) {
                Ok(next) => anchor = next,
                Err(_) => break,
            }
        }
        body(None, false, &mut stop);
    }

    /// The first instant matching `comps` strictly after (or before, when
    /// searching backward) `start`, or `None` when the search gives up.
    #[must_use]
    pub fn next_date_matching(
        &self,
        start: f64,
        comps: &DateComponents,
        options: SearchOptions,
    ) -> Option<f64> {
        let mut found = None;
        self.enumerate_dates(start, comps, options, |date, _exact, stop| {
            found = date;
            *stop = true;
        });
        found
    }

    /// Rejects values no calendar configuration could ever produce.
    fn components_are_plausible(&self, comps: &DateComponents) -> bool {
        let Ok(cursor) = self.backend().cursor(0) else {
            return false;
        };
        for unit in comps.set_units().iter() {
            let Some(value) = comps.value_for(unit) else {
                continue;
            };
            let ok = match unit {
                CalendarUnit::Quarter => (1..=4).contains(&value),
                CalendarUnit::Nanosecond => (0..1_000_000_000).contains(&value),
                _ => {
                    let Some(field) = Field::of_unit(unit) else {
                        continue;
                    };
                    let (Ok(min), Ok(max)) = (
                        cursor.get_limit(field, LimitKind::Minimum),
                        cursor.get_limit(field, LimitKind::Maximum),
                    ) else {
                        return false;
                    };
                    (min..=max).contains(&value)
                }
            };
            if !ok {
                return false;
            }
        }
        true
    }

    /// One attempt within the period containing `anchor`.
    fn candidate_in_period(
        &self,
        anchor: f64,
        comps: &DateComponents,
        options: SearchOptions,
    ) -> CalendarResult<Option<(f64, bool)>> {
        let (candidate, full) = self.project_pattern(anchor, comps)?;
        let report = self.match_report(candidate, comps)?;
        if report.exact {
            return Ok(Some((candidate, true)));
        }
        Ok(self
            .repair_mismatch(candidate, &full, &report, options.policy)?
            .map(|at| (at, false)))
    }

    /// Projects the pattern onto the period containing `anchor`: the
    /// pattern's fields plus the anchor's values for every coarser unit.
    fn project_pattern(
        &self,
        anchor: f64,
        comps: &DateComponents,
    ) -> CalendarResult<(f64, DateComponents)> {
        let highest = comps.highest_set_unit().ok_or_else(|| {
            CalendarError::assert().with_message("empty pattern in enumeration")
        })?;
        let cursor = self.cursor_at(anchor)?;

        // A bare weekday resolves to its slot within the week containing
        // the anchor, independent of search direction.
        if let Some(weekday) = comps.weekday {
            if comps.day.is_none()
                && comps.weekday_ordinal.is_none()
                && comps.week_of_month.is_none()
                && comps.week_of_year.is_none()
                && comps.month.is_none()
            {
                let fw = i64::from(self.first_weekday());
                let dow = cursor.get(Field::DayOfWeek)?;
                let week_start = cursor.local_days() - (dow - fw).rem_euclid(7);
                let days = week_start + (weekday - fw).rem_euclid(7);
                let candidate = self.instant_on_day(days, comps);
                return Ok((candidate, *comps));
            }
        }

        let mut full = *comps;
        let uses_week_year =
            comps.week_of_year.is_some() || comps.year_for_week_of_year.is_some();
        let chain: &[CalendarUnit] = if uses_week_year {
            &[CalendarUnit::Era, CalendarUnit::YearForWeekOfYear]
        } else {
            &[
                CalendarUnit::Era,
                CalendarUnit::Year,
                CalendarUnit::Month,
                CalendarUnit::Day,
                CalendarUnit::Hour,
                CalendarUnit::Minute,
                CalendarUnit::Second,
            ]
        };
        for unit in chain {
            if *unit >= highest || full.value_for(*unit).is_some() {
                continue;
            }
            match unit {
                CalendarUnit::Month => {
                    full.month = Some(cursor.month_number());
                    if full.leap_month.is_none() {
                        full.leap_month = Some(cursor.is_leap_month());
                    }
                }
                _ => {
                    if let Some(field) = Field::of_unit(*unit) {
                        full.set_value(*unit, Some(cursor.get(field)?));
                    }
                }
            }
        }
        let candidate = self.compose(&full)?;
        Ok((candidate, full))
    }

    /// The pattern's time fields on the local day `days`.
    fn instant_on_day(&self, days: i64, comps: &DateComponents) -> f64 {
        let ns = comps.nanosecond.unwrap_or(0);
        let ms_of_day = comps.hour.unwrap_or(0) * MS_PER_HOUR
            + comps.minute.unwrap_or(0) * MS_PER_MINUTE
            + comps.second.unwrap_or(0) * MS_PER_SECOND
            + ns.div_euclid(1_000_000);
        let utc_ms = self.backend().local_to_utc_ms(days * MS_PER_DAY + ms_of_day);
        abs_from_ms(utc_ms) + ns.rem_euclid(1_000_000) as f64 / 1e9
    }

    /// Approximates a mismatched candidate per the match policy, or reports
    /// the period unusable.
    ///
    /// A pattern naming a day (or leap month) the target month does not
    /// have substitutes the first day of the following month going forward,
    /// or the last day of the resolved month going backward.
    fn repair_mismatch(
        &self,
        candidate: f64,
        full: &DateComponents,
        report: &MatchReport,
        policy: MatchPolicy,
    ) -> CalendarResult<Option<f64>> {
        let Some(coarsest) = report.mismatched.highest() else {
            return Ok(None);
        };
        let sub_day = coarsest >= CalendarUnit::Hour;
        let day_scale = matches!(coarsest, CalendarUnit::Month | CalendarUnit::Day);
        match policy {
            MatchPolicy::Strict => Ok(None),
            MatchPolicy::NextExisting { preserve_smaller } => {
                if sub_day {
                    if preserve_smaller {
                        // Lenient resolution already landed on the next
                        // existing time with the finer fields intact.
                        return Ok(Some(candidate));
                    }
                    return Ok(self.start_of_unit(CalendarUnit::Hour, candidate));
                }
                if !day_scale {
                    return Ok(None);
                }
                // First day of the month after the one the pattern resolved
                // to, however far the overflow carried.
                let mut probe = *full;
                probe.day = Some(1);
                if !preserve_smaller {
                    probe.clear_time();
                }
                let month_first = self.compose(&probe)?;
                Ok(Some(self.add_unit(
                    CalendarUnit::Month,
                    1,
                    month_first,
                    AddOptions::new(),
                )?))
            }
            MatchPolicy::PreviousExisting { preserve_smaller } => {
                if sub_day {
                    // A skipped wall time was shifted forward; back out the
                    // shift to land just before the gap.
                    let cursor = self.cursor_at(candidate)?;
                    let wanted = full.hour.unwrap_or(0) * MS_PER_HOUR
                        + full.minute.unwrap_or(0) * MS_PER_MINUTE
                        + full.second.unwrap_or(0) * MS_PER_SECOND;
                    let shift = cursor.ms_of_day() - wanted;
                    if shift > 0 {
                        return Ok(Some(candidate - shift as f64 / 1_000.0));
                    }
                    return Ok(None);
                }
                if !day_scale {
                    return Ok(None);
                }
                let mut probe = *full;
                probe.day = Some(1);
                if !preserve_smaller {
                    probe.clear_time();
                }
                let month_instant = self.compose(&probe)?;
                let in_month = self.cursor_at(month_instant)?;
                // A leap month the year does not have resolves to its base
                // month; the closest preceding date is that month's last day.
                if full.leap_month == Some(true) && !in_month.is_leap_month() {
                    probe.day = Some(in_month.days_in_month());
                    return Ok(Some(self.compose(&probe)?));
                }
                // An overflowing day carried out of the pattern's month;
                // clamp to the month's last day instead.
                let Some(day) = full.day else {
                    return Ok(None);
                };
                let clamped = day.min(in_month.days_in_month());
                if clamped == day {
                    return Ok(None);
                }
                probe.day = Some(clamped);
                Ok(Some(self.compose(&probe)?))
            }
        }
    }

    /// The second lap of a repeated wall time, when the candidate sits in
    /// the first lap of a fall-back transition.
    fn last_occurrence(&self, candidate: f64) -> f64 {
        let Some((tran, before, after)) = self.time_zone().next_transition(candidate) else {
            return candidate;
        };
        let diff = f64::from(before - after);
        if diff <= 0.0 || candidate < tran - diff || candidate >= tran {
            return candidate;
        }
        let probe = candidate + diff;
        let same_wall = match (self.cursor_at(candidate), self.cursor_at(probe)) {
            (Ok(a), Ok(b)) => {
                a.local_days() == b.local_days() && a.ms_of_day() == b.ms_of_day()
            }
            _ => false,
        };
        if same_wall {
            probe
        } else {
            candidate
        }
    }

    fn advance_period(
        &self,
        period: CalendarUnit,
        at: f64,
        direction: Direction,
    ) -> CalendarResult<f64> {
        let base = self.start_of_unit(period, at).unwrap_or(at);
        let amount = if direction.is_backward() { -1 } else { 1 };
        self.add_unit(period, amount, base, AddOptions::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::tests::utc_secs;
    use crate::timezone::TimeZone;
    use alloc::vec::Vec;
    use icu_calendar::AnyCalendarKind;

    fn collect(
        cal: &Calendar,
        start: f64,
        comps: &DateComponents,
        options: SearchOptions,
        n: usize,
    ) -> Vec<(f64, bool)> {
        let mut out = Vec::new();
        cal.enumerate_dates(start, comps, options, |date, exact, stop| {
            match date {
                Some(at) => {
                    out.push((at, exact));
                    if out.len() == n {
                        *stop = true;
                    }
                }
                None => *stop = true,
            }
        });
        out
    }

    #[test]
    fn next_weekday_is_strictly_after_start() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        // 2024-03-19 is a Tuesday; the next Tuesday is the 26th.
        let start = utc_secs(2024, 3, 19, 12, 0, 0);
        let comps = DateComponents::new().with_weekday(3);
        let found = cal
            .next_date_matching(start, &comps, SearchOptions::new())
            .unwrap();
        assert_eq!(found, utc_secs(2024, 3, 26, 0, 0, 0));
    }

    #[test]
    fn strict_day_31_skips_short_months() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let start = utc_secs(2023, 1, 15, 0, 0, 0);
        let comps = DateComponents::new().with_day(31);
        let found = collect(&cal, start, &comps, SearchOptions::new(), 3);
        assert_eq!(
            found.iter().map(|(at, _)| *at).collect::<Vec<_>>(),
            [
                utc_secs(2023, 1, 31, 0, 0, 0),
                utc_secs(2023, 3, 31, 0, 0, 0),
                utc_secs(2023, 5, 31, 0, 0, 0),
            ]
        );
        assert!(found.iter().all(|(_, exact)| *exact));
    }

    #[test]
    fn leap_day_found_in_next_leap_year() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let start = utc_secs(2023, 1, 1, 0, 0, 0);
        let comps = DateComponents::new().with_month(2).with_day(29);
        let found = cal
            .next_date_matching(start, &comps, SearchOptions::new())
            .unwrap();
        assert_eq!(found, utc_secs(2024, 2, 29, 0, 0, 0));
    }

    #[test]
    fn next_existing_substitutes_after_short_month() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let start = utc_secs(2023, 4, 1, 0, 0, 0);
        let comps = DateComponents::new().with_day(31).with_hour(10);
        let options = SearchOptions::new().with_policy(MatchPolicy::NextExisting {
            preserve_smaller: true,
        });
        let found = collect(&cal, start, &comps, options, 1);
        // April has no 31st; the next existing time keeps the hour.
        assert_eq!(found, [(utc_secs(2023, 5, 1, 10, 0, 0), false)]);
    }

    #[test]
    fn previous_existing_clamps_to_month_end() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let start = utc_secs(2023, 4, 1, 0, 0, 0);
        let comps = DateComponents::new().with_day(31).with_hour(10);
        let options = SearchOptions::new().with_policy(MatchPolicy::PreviousExisting {
            preserve_smaller: true,
        });
        let found = collect(&cal, start, &comps, options, 1);
        assert_eq!(found, [(utc_secs(2023, 4, 30, 10, 0, 0), false)]);
    }

    #[test]
    fn next_existing_substitutes_first_of_following_month() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let start = utc_secs(2023, 1, 1, 0, 0, 0);
        // February 30th never exists; the substitute is March 1st, not the
        // lenient carry to March 2nd.
        let comps = DateComponents::new().with_month(2).with_day(30);
        let options = SearchOptions::new().with_policy(MatchPolicy::NextExisting {
            preserve_smaller: false,
        });
        let found = collect(&cal, start, &comps, options, 2);
        assert_eq!(
            found,
            [
                (utc_secs(2023, 3, 1, 0, 0, 0), false),
                (utc_secs(2024, 3, 1, 0, 0, 0), false),
            ]
        );

        let comps = DateComponents::new().with_month(2).with_day(30).with_hour(10);
        let options = SearchOptions::new().with_policy(MatchPolicy::NextExisting {
            preserve_smaller: true,
        });
        let found = collect(&cal, start, &comps, options, 1);
        assert_eq!(found, [(utc_secs(2023, 3, 1, 10, 0, 0), false)]);
    }

    #[test]
    fn absent_leap_month_substitutes_adjacent_month() {
        let cal = Calendar::new(AnyCalendarKind::Chinese);
        // The Chinese year beginning 2023-01-22 has a leap second month but
        // no leap third month.
        let start = utc_secs(2023, 1, 25, 0, 0, 0);
        let comps = DateComponents::new()
            .with_month(3)
            .with_leap_month(true)
            .with_day(1);
        let options = SearchOptions::new().with_policy(MatchPolicy::NextExisting {
            preserve_smaller: false,
        });
        let found = collect(&cal, start, &comps, options, 1);
        let (at, exact) = found[0];
        assert!(!exact);
        // First day of the month following the non-leap third month.
        let expected = DateComponents::new()
            .with_month(4)
            .with_leap_month(false)
            .with_day(1);
        assert!(cal.date_matches_components(at, &expected));

        let comps = DateComponents::new()
            .with_month(3)
            .with_leap_month(true)
            .with_day(5);
        let options = SearchOptions::new().with_policy(MatchPolicy::PreviousExisting {
            preserve_smaller: true,
        });
        let found = collect(&cal, start, &comps, options, 1);
        let (at, exact) = found[0];
        assert!(!exact);
        // Last day of the non-leap third month.
        assert_eq!(cal.component(CalendarUnit::Day, at), cal.days_in_month(at));
        let in_month = DateComponents::new().with_month(3).with_leap_month(false);
        assert!(cal.date_matches_components(at, &in_month));
    }

    #[test]
    fn strict_skips_the_skipped_hour() {
        let mut cal = Calendar::new(AnyCalendarKind::Gregorian);
        cal.set_time_zone(TimeZone::named("America/Los_Angeles").unwrap());
        // 02:30 does not exist on 2023-03-12; strict searching resumes on
        // the 13th.
        let start = utc_secs(2023, 3, 12, 0, 0, 0);
        let comps = DateComponents::new().with_hour(2).with_minute(30);
        let found = cal
            .next_date_matching(start, &comps, SearchOptions::new())
            .unwrap();
        assert_eq!(found, utc_secs(2023, 3, 13, 9, 30, 0));
    }

    #[test]
    fn next_existing_shifts_past_the_gap() {
        let mut cal = Calendar::new(AnyCalendarKind::Gregorian);
        cal.set_time_zone(TimeZone::named("America/Los_Angeles").unwrap());
        let start = utc_secs(2023, 3, 12, 0, 0, 0);
        let comps = DateComponents::new().with_hour(2).with_minute(30);
        let options = SearchOptions::new().with_policy(MatchPolicy::NextExisting {
            preserve_smaller: true,
        });
        let found = collect(&cal, start, &comps, options, 1);
        // Resolves to 03:30 PDT, inexact.
        assert_eq!(found, [(utc_secs(2023, 3, 12, 10, 30, 0), false)]);
    }

    #[test]
    fn repeated_hour_first_and_last() {
        let mut cal = Calendar::new(AnyCalendarKind::Gregorian);
        cal.set_time_zone(TimeZone::named("America/Los_Angeles").unwrap());
        // 01:30 happens twice on 2023-11-05: 08:30 UTC (PDT) and 09:30 UTC
        // (PST).
        let start = utc_secs(2023, 11, 5, 0, 0, 0);
        let comps = DateComponents::new().with_hour(1).with_minute(30);
        let first = cal
            .next_date_matching(start, &comps, SearchOptions::new())
            .unwrap();
        assert_eq!(first, utc_secs(2023, 11, 5, 8, 30, 0));
        let last = cal
            .next_date_matching(
                start,
                &comps,
                SearchOptions::new().with_repeated(RepeatedInstant::Last),
            )
            .unwrap();
        assert_eq!(last, utc_secs(2023, 11, 5, 9, 30, 0));
    }

    #[test]
    fn backward_search_finds_previous_match() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        // 2024-03-19 is a Tuesday; the previous Friday is the 15th.
        let start = utc_secs(2024, 3, 19, 12, 0, 0);
        let comps = DateComponents::new().with_weekday(6);
        let found = cal
            .next_date_matching(start, &comps, SearchOptions::new().backward())
            .unwrap();
        assert_eq!(found, utc_secs(2024, 3, 15, 0, 0, 0));
    }

    #[test]
    fn impossible_pattern_gives_up() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let comps = DateComponents::new().with_month(2).with_day(30);
        assert_eq!(
            cal.next_date_matching(0.0, &comps, SearchOptions::new()),
            None
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let comps = DateComponents::new().with_month(14);
        assert_eq!(
            cal.next_date_matching(0.0, &comps, SearchOptions::new()),
            None
        );
        let comps = DateComponents::new().with_weekday(8);
        assert_eq!(
            cal.next_date_matching(0.0, &comps, SearchOptions::new()),
            None
        );
    }

    #[test]
    fn weekday_ordinal_pattern_repeats_monthly() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let start = utc_secs(2024, 3, 1, 0, 0, 0);
        // Second Friday of each month.
        let comps = DateComponents::new().with_weekday(6).with_weekday_ordinal(2);
        let found = collect(&cal, start, &comps, SearchOptions::new(), 2);
        assert_eq!(
            found.iter().map(|(at, _)| *at).collect::<Vec<_>>(),
            [utc_secs(2024, 3, 8, 0, 0, 0), utc_secs(2024, 4, 12, 0, 0, 0)]
        );
    }

    #[test]
    fn week_of_year_pattern() {
        let mut cal = Calendar::new(AnyCalendarKind::Gregorian);
        cal.set_first_weekday(2).unwrap();
        cal.set_min_days_in_first_week(4).unwrap();
        let start = utc_secs(2024, 6, 1, 0, 0, 0);
        // Monday of ISO week 1.
        let comps = DateComponents::new().with_week_of_year(1).with_weekday(2);
        let found = cal
            .next_date_matching(start, &comps, SearchOptions::new())
            .unwrap();
        assert_eq!(found, utc_secs(2024, 12, 30, 0, 0, 0));
    }

    #[test]
    fn enumeration_stops_on_request() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let comps = DateComponents::new().with_day(1);
        let mut calls = 0;
        cal.enumerate_dates(0.0, &comps, SearchOptions::new(), |date, _, stop| {
            assert!(date.is_some());
            calls += 1;
            *stop = true;
        });
        assert_eq!(calls, 1);
    }
}
