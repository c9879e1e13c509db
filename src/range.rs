//! Time ranges of calendar units: the interval of a unit containing an
//! instant.

use icu_calendar::AnyCalendarKind;

use crate::{
    backend::Cursor,
    calendar::{abs_from_ms, ms_from_abs, Calendar},
    fields::Field,
    ordinality::{quarter_of_month, quarter_start_month},
    unit::CalendarUnit,
    utils::{MS_PER_DAY, SECONDS_PER_DAY},
    CalendarResult,
};

use core_maths::*;

/// Duration reported for an open-ended era.
pub(crate) const OPEN_ENDED: f64 = 4_398_046_511_104.0;

// Era start instants, seconds since the Unix epoch. A calendar whose era
// model does not reach an instant reports no era range there.
const GREGORIAN_ERA_START: f64 = -62_135_596_800.0;
const ROC_ERA_START: f64 = -1_830_384_000.0;
const COPTIC_ERA_START: f64 = -53_184_211_200.0;
const BUDDHIST_ERA_START: f64 = -79_271_568_000.0;
const ISLAMIC_ERA_START: f64 = -42_521_673_600.0;
const ISLAMIC_CIVIL_ERA_START: f64 = -42_521_587_200.0;
const HEBREW_ERA_START: f64 = -180_799_776_000.0;
const PERSIAN_ERA_START: f64 = -42_531_868_800.0;
const INDIAN_ERA_START: f64 = -59_667_235_200.0;
const AMETE_ALEM_ERA_START: f64 = -235_460_908_800.0;
const AMETE_MIHRET_ERA_START: f64 = -61_894_108_800.0;
const CHINESE_ERA_START: f64 = -145_347_436_800.0;

impl Calendar {
    /// The interval of `unit` containing `at`, as a start instant and a
    /// duration in seconds. `None` when the unit has no representable
    /// interval there (an era before the calendar's reach, or a bare
    /// nanosecond).
    #[must_use]
    pub fn time_range_of_unit(&self, unit: CalendarUnit, at: f64) -> Option<(f64, f64)> {
        match unit {
            CalendarUnit::Era => self.era_range(at),
            CalendarUnit::Hour | CalendarUnit::Minute | CalendarUnit::Second => {
                let len = match unit {
                    CalendarUnit::Hour => 3_600.0,
                    CalendarUnit::Minute => 60.0,
                    _ => 1.0,
                };
                // Instant arithmetic on the local clock handles a repeated
                // hour without a civil round trip.
                let offset = f64::from(self.time_zone().offset_at(at));
                let start = ((at + offset) / len).floor() * len - offset;
                Some((start, len))
            }
            CalendarUnit::Nanosecond => None,
            _ => self.civil_range(unit, at).ok().flatten(),
        }
    }

    /// Start of the interval of `unit` containing `at`.
    pub(crate) fn start_of_unit(&self, unit: CalendarUnit, at: f64) -> Option<f64> {
        self.time_range_of_unit(unit, at).map(|(start, _)| start)
    }

    fn civil_range(&self, unit: CalendarUnit, at: f64) -> CalendarResult<Option<(f64, f64)>> {
        let cursor = self.cursor_at(at)?;
        let Some(start_days) = self.unit_start_days(unit, &cursor)? else {
            return Ok(None);
        };
        let end_days = self.unit_end_days(unit, &cursor, start_days)?;
        let backend = self.backend();
        let start = abs_from_ms(backend.local_to_utc_ms(start_days * MS_PER_DAY));
        let end = abs_from_ms(backend.local_to_utc_ms(end_days * MS_PER_DAY));
        Ok(Some((start, end - start)))
    }

    /// First local day of the interval of `unit` containing the cursor.
    pub(crate) fn unit_start_days(
        &self,
        unit: CalendarUnit,
        cursor: &Cursor<'_>,
    ) -> CalendarResult<Option<i64>> {
        let days = cursor.local_days();
        let day = cursor.get(Field::DayOfMonth)?;
        let start = match unit {
            CalendarUnit::Year => self.backend().days_at(cursor.extended_year(), 1, 1)?,
            CalendarUnit::YearForWeekOfYear => {
                let year = cursor.get(Field::YearForWeekOfYear)?;
                self.backend().days_for_week_of_year(year, 1, None)?
            }
            CalendarUnit::Quarter => {
                let month = cursor.get(Field::Month)?;
                let q = quarter_of_month(self.kind(), month);
                self.backend()
                    .days_at(cursor.extended_year(), quarter_start_month(self.kind(), q), 1)?
            }
            CalendarUnit::Month => days - (day - 1),
            CalendarUnit::WeekOfYear | CalendarUnit::WeekOfMonth => {
                let dow = cursor.get(Field::DayOfWeek)?;
                days - (dow - i64::from(self.first_weekday())).rem_euclid(7)
            }
            CalendarUnit::Day | CalendarUnit::Weekday | CalendarUnit::WeekdayOrdinal => days,
            _ => return Ok(None),
        };
        Ok(Some(start))
    }

    /// First local day after the interval of `unit` starting at `start_days`.
    pub(crate) fn unit_end_days(
        &self,
        unit: CalendarUnit,
        cursor: &Cursor<'_>,
        start_days: i64,
    ) -> CalendarResult<i64> {
        let backend = self.backend();
        Ok(match unit {
            CalendarUnit::Year => backend.days_at(cursor.extended_year() + 1, 1, 1)?,
            CalendarUnit::YearForWeekOfYear => {
                let year = cursor.get(Field::YearForWeekOfYear)?;
                backend.days_for_week_of_year(year + 1, 1, None)?
            }
            CalendarUnit::Quarter => {
                let kind = self.kind();
                let month = cursor.get(Field::Month)?;
                let q = quarter_of_month(kind, month);
                let this_start = quarter_start_month(kind, q);
                let next_start = quarter_start_month(kind, q % 4 + 1);
                let year = cursor.extended_year() + i64::from(next_start <= this_start);
                backend.days_at(year, next_start, 1)?
            }
            CalendarUnit::Month => {
                let mut probe = cursor.clone();
                probe.set_millis(backend.local_to_utc_ms(start_days * MS_PER_DAY))?;
                start_days + probe.days_in_month()
            }
            CalendarUnit::WeekOfYear | CalendarUnit::WeekOfMonth => start_days + 7,
            _ => start_days + 1,
        })
    }

    fn era_range(&self, at: f64) -> Option<(f64, f64)> {
        let kind = self.kind();
        match kind {
            AnyCalendarKind::Japanese | AnyCalendarKind::JapaneseExtended => {
                let starts: [f64; 5] = core::array::from_fn(|i| {
                    (crate::backend::JAPANESE_ERAS[i].0 * SECONDS_PER_DAY) as f64
                });
                let idx = starts.iter().rposition(|s| *s <= at)?;
                let end = starts.get(idx + 1).copied();
                let start = starts[idx];
                Some((start, end.map_or(OPEN_ENDED, |e| e - start)))
            }
            AnyCalendarKind::Ethiopian => {
                if at >= AMETE_MIHRET_ERA_START {
                    Some((AMETE_MIHRET_ERA_START, OPEN_ENDED))
                } else if at >= AMETE_ALEM_ERA_START {
                    Some((
                        AMETE_ALEM_ERA_START,
                        AMETE_MIHRET_ERA_START - AMETE_ALEM_ERA_START,
                    ))
                } else {
                    None
                }
            }
            _ => {
                let start = match kind {
                    AnyCalendarKind::Gregorian | AnyCalendarKind::Iso => GREGORIAN_ERA_START,
                    AnyCalendarKind::Roc => ROC_ERA_START,
                    AnyCalendarKind::Coptic => COPTIC_ERA_START,
                    AnyCalendarKind::Buddhist => BUDDHIST_ERA_START,
                    AnyCalendarKind::IslamicObservational
                    | AnyCalendarKind::IslamicUmmAlQura => ISLAMIC_ERA_START,
                    AnyCalendarKind::IslamicCivil | AnyCalendarKind::IslamicTabular => {
                        ISLAMIC_CIVIL_ERA_START
                    }
                    AnyCalendarKind::Hebrew => HEBREW_ERA_START,
                    AnyCalendarKind::Persian => PERSIAN_ERA_START,
                    AnyCalendarKind::Indian => INDIAN_ERA_START,
                    AnyCalendarKind::EthiopianAmeteAlem => AMETE_ALEM_ERA_START,
                    AnyCalendarKind::Chinese | AnyCalendarKind::Dangi => CHINESE_ERA_START,
                    _ => return None,
                };
                (at >= start).then_some((start, OPEN_ENDED))
            }
        }
    }

    /// First local day of the era holding `at` as an epoch day number, when
    /// the era has one.
    pub(crate) fn era_start_days_at(&self, at: f64) -> Option<i64> {
        let (start, _) = self.era_range(at)?;
        Some(ms_from_abs(start).div_euclid(MS_PER_DAY))
    }
}
