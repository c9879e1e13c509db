//! The calendar backend: per-field civil arithmetic over `icu_calendar`.
//!
//! A [`Backend`] owns the calendar system, the time zone and the week
//! configuration of one `Calendar`. Every query builds a function-local
//! [`Cursor`], positions it with an instant, and reads or writes fields
//! through it; no scratch state outlives a query.

use icu_calendar::{
    cal::{
        Buddhist, Chinese, Coptic, Dangi, Ethiopian, EthiopianEraStyle, Hebrew, Indian,
        IslamicCivil, IslamicObservational, IslamicTabular, IslamicUmmAlQura, Japanese,
        JapaneseExtended, Persian, Roc,
    },
    types::MonthCode as IcuMonthCode,
    AnyCalendar, AnyCalendarKind, Calendar as IcuCalendar, Date as IcuDate, Gregorian, Iso, Ref,
};
use tinystr::tinystr;

use crate::{
    error::CalendarError,
    fields::{Field, LimitKind},
    timezone::{LocalOffset, TimeZone},
    utils::{
        epoch_days_to_day_of_week, epoch_days_to_iso_date, epoch_ms_to_day_and_ms,
        iso_date_to_epoch_days, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND,
    },
    CalendarResult,
};

/// Start days (epoch day number) and first ISO year of the modern Japanese
/// eras, Meiji through Reiwa. Era indices are 1-based into this table.
pub(crate) const JAPANESE_ERAS: [(i64, i32); 5] = [
    (-36_960, 1868), // Meiji, 1868-10-23
    (-20_973, 1912), // Taisho, 1912-07-30
    (-15_713, 1926), // Showa, 1926-12-25
    (6_947, 1989),   // Heisei, 1989-01-08
    (18_017, 2019),  // Reiwa, 2019-05-01
];

/// How a calendar system numbers its eras.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EraStyle {
    /// Era 0 counts backward before era 1 (BCE/CE and relatives).
    Inverse,
    /// One era covering all years.
    Single,
    /// The modern Japanese named eras.
    Japanese,
}

/// Calendar system, time zone and week configuration for one calendar.
#[derive(Debug, Clone)]
pub(crate) struct Backend {
    cal: Ref<'static, AnyCalendar>,
    kind: AnyCalendarKind,
    pub(crate) tz: TimeZone,
    /// 1 = Sunday through 7 = Saturday.
    pub(crate) first_weekday: u8,
    pub(crate) min_days_in_first_week: u8,
}

impl Backend {
    #[warn(clippy::wildcard_enum_match_arm)] // Warns if the calendar kind gets out of sync.
    pub(crate) const fn new(kind: AnyCalendarKind, tz: TimeZone) -> Self {
        let cal = match kind {
            AnyCalendarKind::Buddhist => &AnyCalendar::Buddhist(Buddhist),
            AnyCalendarKind::Chinese => const { &AnyCalendar::Chinese(Chinese::new()) },
            AnyCalendarKind::Coptic => &AnyCalendar::Coptic(Coptic),
            AnyCalendarKind::Dangi => const { &AnyCalendar::Dangi(Dangi::new()) },
            AnyCalendarKind::Ethiopian => {
                const {
                    &AnyCalendar::Ethiopian(Ethiopian::new_with_era_style(
                        EthiopianEraStyle::AmeteMihret,
                    ))
                }
            }
            AnyCalendarKind::EthiopianAmeteAlem => {
                const {
                    &AnyCalendar::Ethiopian(Ethiopian::new_with_era_style(
                        EthiopianEraStyle::AmeteAlem,
                    ))
                }
            }
            AnyCalendarKind::Gregorian => &AnyCalendar::Gregorian(Gregorian),
            AnyCalendarKind::Hebrew => &AnyCalendar::Hebrew(Hebrew),
            AnyCalendarKind::Indian => &AnyCalendar::Indian(Indian),
            AnyCalendarKind::IslamicCivil => &AnyCalendar::IslamicCivil(IslamicCivil),
            AnyCalendarKind::IslamicObservational => {
                const { &AnyCalendar::IslamicObservational(IslamicObservational::new()) }
            }
            AnyCalendarKind::IslamicTabular => &AnyCalendar::IslamicTabular(IslamicTabular),
            AnyCalendarKind::IslamicUmmAlQura => {
                const { &AnyCalendar::IslamicUmmAlQura(IslamicUmmAlQura::new()) }
            }
            AnyCalendarKind::Iso => &AnyCalendar::Iso(Iso),
            AnyCalendarKind::Japanese => const { &AnyCalendar::Japanese(Japanese::new()) },
            AnyCalendarKind::JapaneseExtended => {
                const { &AnyCalendar::JapaneseExtended(JapaneseExtended::new()) }
            }
            AnyCalendarKind::Persian => &AnyCalendar::Persian(Persian),
            AnyCalendarKind::Roc => &AnyCalendar::Roc(Roc),
            // `unreachable!` cannot appear in a const fn; a bare panic can.
            _ => panic!("every calendar kind must map to a calendar value"),
        };

        Self {
            cal: Ref(cal),
            kind,
            tz,
            first_weekday: 1,
            min_days_in_first_week: 1,
        }
    }

    pub(crate) fn kind(&self) -> AnyCalendarKind {
        self.kind
    }

    pub(crate) fn is_gregorian_like(&self) -> bool {
        matches!(
            self.kind,
            AnyCalendarKind::Gregorian | AnyCalendarKind::Iso | AnyCalendarKind::Buddhist
        )
    }

    pub(crate) fn is_lunisolar(&self) -> bool {
        matches!(
            self.kind,
            AnyCalendarKind::Chinese | AnyCalendarKind::Dangi | AnyCalendarKind::Hebrew
        )
    }

    fn era_style(&self) -> EraStyle {
        match self.kind {
            AnyCalendarKind::Gregorian
            | AnyCalendarKind::Iso
            | AnyCalendarKind::Roc
            | AnyCalendarKind::Coptic
            | AnyCalendarKind::Ethiopian => EraStyle::Inverse,
            AnyCalendarKind::Japanese | AnyCalendarKind::JapaneseExtended => EraStyle::Japanese,
            _ => EraStyle::Single,
        }
    }

    /// Civil description of the local day `days` (epoch day number on the
    /// local clock).
    fn civil_at(&self, days: i64) -> CalendarResult<Civil> {
        let (iso_year, iso_month, iso_day) = epoch_days_to_iso_date(days);
        let iso = IcuDate::try_new_iso(iso_year, iso_month, iso_day)
            .map_err(|_| CalendarError::range().with_message("instant outside the supported era"))?;
        let inner = self.cal.date_from_iso(iso);
        let month = self.cal.month(&inner);
        let code = month.standard_code.0.as_str();
        Ok(Civil {
            days,
            extended_year: self.cal.year(&inner).extended_year,
            month: month.ordinal,
            month_number: code
                .as_bytes()
                .get(1..3)
                .and_then(|d| core::str::from_utf8(d).ok())
                .and_then(|d| d.parse::<u8>().ok())
                .unwrap_or(month.ordinal),
            leap_month: code.ends_with('L'),
            day: self.cal.day_of_month(&inner).0,
            day_of_year: self.cal.day_of_year_info(&inner).day_of_year,
            day_of_week: epoch_days_to_day_of_week(days),
            months_in_year: self.cal.months_in_year(&inner),
            days_in_year: self.cal.days_in_year(&inner),
            days_in_month: self.cal.days_in_month(&inner),
        })
    }

    /// Era year of the local day, under this backend's era numbering.
    fn era_year_at(&self, civil: &Civil) -> i64 {
        let ext = i64::from(civil.extended_year);
        match self.era_style() {
            EraStyle::Inverse => {
                if ext >= 1 {
                    ext
                } else {
                    1 - ext
                }
            }
            EraStyle::Japanese => match self.era_index_at(civil) {
                0 => ext,
                era => ext - i64::from(JAPANESE_ERAS[era as usize - 1].1) + 1,
            },
            EraStyle::Single => ext,
        }
    }

    fn era_index_at(&self, civil: &Civil) -> i64 {
        match self.era_style() {
            EraStyle::Inverse => i64::from(civil.extended_year >= 1),
            EraStyle::Japanese => JAPANESE_ERAS
                .iter()
                .rposition(|(start, _)| *start <= civil.days)
                .map_or(0, |i| i as i64 + 1),
            EraStyle::Single => 0,
        }
    }

    /// Extended year for `(era, era_year)`.
    pub(crate) fn extended_year_for(&self, era: i64, year: i64) -> i64 {
        match self.era_style() {
            EraStyle::Inverse => {
                if era <= 0 {
                    1 - year
                } else {
                    year
                }
            }
            EraStyle::Japanese => {
                if (1..=JAPANESE_ERAS.len() as i64).contains(&era) {
                    i64::from(JAPANESE_ERAS[era as usize - 1].1) + year - 1
                } else {
                    year
                }
            }
            EraStyle::Single => year,
        }
    }

    /// First local day of `era`, if the era has a representable start.
    pub(crate) fn era_start_days(&self, era: i64) -> Option<i64> {
        match self.era_style() {
            EraStyle::Japanese if (1..=JAPANESE_ERAS.len() as i64).contains(&era) => {
                Some(JAPANESE_ERAS[era as usize - 1].0)
            }
            _ => None,
        }
    }

    /// Epoch day of the first day of calendar year `extended_year`.
    fn year_start_days(&self, extended_year: i64) -> CalendarResult<i64> {
        let year = i32::try_from(extended_year)
            .map_err(|_| CalendarError::range().with_message("year out of range"))?;
        let inner = self
            .cal
            .date_from_codes(None, year, IcuMonthCode(tinystr!(4, "M01")), 1)
            .map_err(|_| CalendarError::range().with_message("year out of range"))?;
        let iso = self.cal.date_to_iso(&inner);
        Ok(iso_date_to_epoch_days(
            iso.year().extended_year,
            iso.month().ordinal,
            iso.day_of_month().0,
        ))
    }

    fn months_in_year_of(&self, extended_year: i64) -> CalendarResult<i64> {
        let days = self.year_start_days(extended_year)?;
        Ok(i64::from(self.civil_at(days)?.months_in_year))
    }

    /// Epoch day of `(extended_year, month, day)`. Lenient: month and day
    /// values outside their legal ranges carry into neighboring periods,
    /// the way a resolving calendar engine treats overflowing fields.
    pub(crate) fn days_at(&self, extended_year: i64, month: i64, day: i64) -> CalendarResult<i64> {
        let mut year = extended_year;
        let mut month = month;
        loop {
            if month < 1 {
                year -= 1;
                month += self.months_in_year_of(year)?;
            } else {
                let in_year = self.months_in_year_of(year)?;
                if month <= in_year {
                    break;
                }
                month -= in_year;
                year += 1;
            }
        }
        let mut days = self.year_start_days(year)?;
        for _ in 1..month {
            days += i64::from(self.civil_at(days)?.days_in_month);
        }
        Ok(days + day - 1)
    }

    /// Ordinal position of the month numbered `number` within
    /// `extended_year`, preferring the leap variant when `leap` is set.
    /// Falls back to the base month when the leap variant is absent.
    pub(crate) fn month_ordinal_for(
        &self,
        extended_year: i64,
        number: i64,
        leap: bool,
    ) -> CalendarResult<Option<i64>> {
        let mut days = self.year_start_days(extended_year)?;
        let months = self.months_in_year_of(extended_year)?;
        let mut fallback = None;
        for ordinal in 1..=months {
            let civil = self.civil_at(days)?;
            if i64::from(civil.month_number) == number {
                if civil.leap_month == leap {
                    return Ok(Some(ordinal));
                }
                fallback.get_or_insert(ordinal);
            }
            days += i64::from(civil.days_in_month);
        }
        Ok(fallback)
    }

    /// Epoch day of the `week`th week of week-year `year`, on `weekday` (or
    /// the configured first weekday when unset).
    pub(crate) fn days_for_week_of_year(
        &self,
        year: i64,
        week: i64,
        weekday: Option<i64>,
    ) -> CalendarResult<i64> {
        let year_start = self.days_at(year, 1, 1)?;
        let rel = i64::from((epoch_days_to_day_of_week(year_start) + 7 - self.first_weekday) % 7);
        let mut week1 = year_start - rel;
        if 7 - rel < i64::from(self.min_days_in_first_week) {
            week1 += 7;
        }
        let dow_offset = weekday
            .map(|wd| (wd - i64::from(self.first_weekday)).rem_euclid(7))
            .unwrap_or(0);
        Ok(week1 + (week - 1) * 7 + dow_offset)
    }

    /// ICU-style week number of a day within a period (year or month).
    fn week_number(&self, day_of_period: i64, day_of_week: i64) -> i64 {
        let period_start_dow =
            (day_of_week - i64::from(self.first_weekday) - day_of_period + 1).rem_euclid(7);
        let mut week = (day_of_period + period_start_dow - 1) / 7;
        if 7 - period_start_dow >= i64::from(self.min_days_in_first_week) {
            week += 1;
        }
        week
    }

    /// Week of year plus the week-year it belongs to.
    fn week_of_year_at(&self, civil: &Civil) -> CalendarResult<(i64, i64)> {
        let doy = i64::from(civil.day_of_year);
        let dow = i64::from(civil.day_of_week);
        let year = i64::from(civil.extended_year);
        let mut woy = self.week_number(doy, dow);
        if woy == 0 {
            // Belongs to the last week of the preceding calendar year.
            let prev_start = self.year_start_days(year - 1)?;
            let prev_len = i64::from(self.civil_at(prev_start)?.days_in_year);
            return Ok((self.week_number(doy + prev_len, dow), year - 1));
        }
        let year_len = i64::from(civil.days_in_year);
        if doy >= year_len - 5 {
            let rel_dow = (dow - i64::from(self.first_weekday)).rem_euclid(7);
            let last_rel_dow = (rel_dow + year_len - doy).rem_euclid(7);
            if 6 - last_rel_dow >= i64::from(self.min_days_in_first_week)
                && doy + 7 - rel_dow > year_len
            {
                woy = 1;
                return Ok((woy, year + 1));
            }
        }
        Ok((woy, year))
    }

    /// Converts a local wall clock millisecond count to UTC milliseconds.
    /// A skipped time shifts forward by the gap; a repeated time resolves to
    /// its first occurrence.
    pub(crate) fn local_to_utc_ms(&self, local_ms: i64) -> i64 {
        let local_secs = local_ms.div_euclid(MS_PER_SECOND);
        let offset = match self.tz.offset_for_local(local_secs) {
            LocalOffset::Unique { offset } => offset,
            LocalOffset::Fold { before, .. } | LocalOffset::Gap { before, .. } => before,
        };
        local_ms - i64::from(offset) * MS_PER_SECOND
    }

    /// Opens a cursor positioned at `millis` (UTC epoch milliseconds).
    pub(crate) fn cursor(&self, millis: i64) -> CalendarResult<Cursor<'_>> {
        let mut cursor = Cursor {
            backend: self,
            millis,
            civil: Civil::default(),
            ms_of_day: 0,
        };
        cursor.recompute()?;
        Ok(cursor)
    }
}

/// Decomposed local civil description of one day.
#[derive(Debug, Default, Clone, Copy)]
struct Civil {
    days: i64,
    extended_year: i32,
    month: u8,
    /// Month number from the month code, leap months numbered like their
    /// base month.
    month_number: u8,
    leap_month: bool,
    day: u8,
    day_of_year: u16,
    day_of_week: u8,
    months_in_year: u8,
    days_in_year: u16,
    days_in_month: u8,
}

impl Civil {
    /// Weekday (1 = Sunday) falling on `day_of_month` of this day's month.
    fn day_of_week_on(&self, day_of_month: i64) -> i64 {
        (i64::from(self.day_of_week) - i64::from(self.day) + day_of_month - 1).rem_euclid(7) + 1
    }
}

/// A positioned view into the backend: one instant plus its decomposed
/// local civil fields. Function-local per query.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    backend: &'a Backend,
    millis: i64,
    civil: Civil,
    ms_of_day: i64,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub(crate) fn millis(&self) -> i64 {
        self.millis
    }

    #[inline]
    pub(crate) fn backend(&self) -> &'a Backend {
        self.backend
    }

    fn recompute(&mut self) -> CalendarResult<()> {
        let offset = self.backend.tz.offset_at(self.millis as f64 / 1_000.0);
        let local_ms = self.millis + i64::from(offset) * MS_PER_SECOND;
        let (days, ms_of_day) = epoch_ms_to_day_and_ms(local_ms);
        self.civil = self.backend.civil_at(days)?;
        self.ms_of_day = ms_of_day;
        Ok(())
    }

    pub(crate) fn set_millis(&mut self, millis: i64) -> CalendarResult<()> {
        self.millis = millis;
        self.recompute()
    }

    /// Repositions to the local civil time `(days, ms_of_day)`.
    fn set_local(&mut self, days: i64, ms_of_day: i64) -> CalendarResult<()> {
        self.set_millis(self.backend.local_to_utc_ms(days * MS_PER_DAY + ms_of_day))
    }

    /// The local civil day this cursor points into.
    pub(crate) fn local_days(&self) -> i64 {
        self.civil.days
    }

    pub(crate) fn ms_of_day(&self) -> i64 {
        self.ms_of_day
    }

    pub(crate) fn is_leap_month(&self) -> bool {
        self.civil.leap_month
    }

    pub(crate) fn month_number(&self) -> i64 {
        i64::from(self.civil.month_number)
    }

    pub(crate) fn extended_year(&self) -> i64 {
        i64::from(self.civil.extended_year)
    }

    pub(crate) fn days_in_month(&self) -> i64 {
        i64::from(self.civil.days_in_month)
    }

    pub(crate) fn days_in_year(&self) -> i64 {
        i64::from(self.civil.days_in_year)
    }

    pub(crate) fn months_in_year(&self) -> i64 {
        i64::from(self.civil.months_in_year)
    }

    /// Reads one field.
    pub(crate) fn get(&self, field: Field) -> CalendarResult<i64> {
        let civil = &self.civil;
        let value = match field {
            Field::Era => self.backend.era_index_at(civil),
            Field::Year => self.backend.era_year_at(civil),
            Field::ExtendedYear => i64::from(civil.extended_year),
            Field::Month => i64::from(civil.month),
            Field::IsLeapMonth => i64::from(civil.leap_month),
            Field::WeekOfYear => self.backend.week_of_year_at(civil)?.0,
            Field::WeekOfMonth => self
                .backend
                .week_number(i64::from(civil.day), i64::from(civil.day_of_week)),
            Field::YearForWeekOfYear => self.backend.week_of_year_at(civil)?.1,
            Field::DayOfMonth => i64::from(civil.day),
            Field::DayOfYear => i64::from(civil.day_of_year),
            Field::DayOfWeek => i64::from(civil.day_of_week),
            Field::DayOfWeekInMonth => (i64::from(civil.day) - 1) / 7 + 1,
            Field::HourOfDay => self.ms_of_day / MS_PER_HOUR,
            Field::AmPm => self.ms_of_day / (12 * MS_PER_HOUR),
            Field::Minute => self.ms_of_day % MS_PER_HOUR / MS_PER_MINUTE,
            Field::Second => self.ms_of_day % MS_PER_MINUTE / MS_PER_SECOND,
            Field::Millisecond => self.ms_of_day % MS_PER_SECOND,
        };
        Ok(value)
    }

    /// Writes one field, repositioning the cursor. Out-of-range values carry
    /// into the containing unit.
    pub(crate) fn set(&mut self, field: Field, value: i64) -> CalendarResult<()> {
        let civil = self.civil;
        match field {
            Field::Era => {
                let year = self.backend.era_year_at(&civil);
                let ext = self.backend.extended_year_for(value, year);
                let days =
                    self.backend
                        .days_at(ext, i64::from(civil.month), i64::from(civil.day))?;
                self.set_local(days, self.ms_of_day)
            }
            Field::Year => {
                let era = self.backend.era_index_at(&civil);
                let ext = self.backend.extended_year_for(era, value);
                let days =
                    self.backend
                        .days_at(ext, i64::from(civil.month), i64::from(civil.day))?;
                self.set_local(days, self.ms_of_day)
            }
            Field::ExtendedYear => {
                let days =
                    self.backend
                        .days_at(value, i64::from(civil.month), i64::from(civil.day))?;
                self.set_local(days, self.ms_of_day)
            }
            Field::Month => {
                let days = self.backend.days_at(
                    i64::from(civil.extended_year),
                    value,
                    i64::from(civil.day),
                )?;
                self.set_local(days, self.ms_of_day)
            }
            Field::YearForWeekOfYear => {
                let woy = self.get(Field::WeekOfYear)?;
                let dow = i64::from(civil.day_of_week);
                let days = self.backend.days_for_week_of_year(value, woy, Some(dow))?;
                self.set_local(days, self.ms_of_day)
            }
            Field::DayOfMonth => {
                let month_start = civil.days - i64::from(civil.day) + 1;
                self.set_local(month_start + value - 1, self.ms_of_day)
            }
            Field::DayOfYear => {
                let year_start = civil.days - i64::from(civil.day_of_year) + 1;
                self.set_local(year_start + value - 1, self.ms_of_day)
            }
            Field::DayOfWeek => {
                let fw = i64::from(self.backend.first_weekday);
                let rel_cur = (i64::from(civil.day_of_week) - fw).rem_euclid(7);
                let rel_new = (value - fw).rem_euclid(7);
                self.set_local(civil.days + rel_new - rel_cur, self.ms_of_day)
            }
            Field::HourOfDay => self.set_local(
                civil.days,
                value * MS_PER_HOUR + self.ms_of_day % MS_PER_HOUR,
            ),
            Field::AmPm => self.set_local(
                civil.days,
                value * 12 * MS_PER_HOUR + self.ms_of_day % (12 * MS_PER_HOUR),
            ),
            Field::Minute => self.set_local(
                civil.days,
                self.ms_of_day - self.get(Field::Minute)? * MS_PER_MINUTE + value * MS_PER_MINUTE,
            ),
            Field::Second => self.set_local(
                civil.days,
                self.ms_of_day - self.get(Field::Second)? * MS_PER_SECOND + value * MS_PER_SECOND,
            ),
            Field::Millisecond => self.set_local(
                civil.days,
                self.ms_of_day - self.get(Field::Millisecond)? + value,
            ),
            Field::WeekOfYear | Field::WeekOfMonth | Field::DayOfWeekInMonth
            | Field::IsLeapMonth => Err(CalendarError::r#type()
                .with_message("field is derived and cannot be set directly")),
        }
    }

    /// Adds `amount` of `field`, carrying into containing units. Sub-day
    /// fields are pure instant arithmetic; day fields and above are civil
    /// arithmetic on the local clock with the day-of-month pinned.
    pub(crate) fn add(&mut self, field: Field, amount: i64) -> CalendarResult<()> {
        match field {
            Field::Millisecond => self.set_millis(self.millis + amount),
            Field::Second => self.set_millis(self.millis + amount * MS_PER_SECOND),
            Field::Minute => self.set_millis(self.millis + amount * MS_PER_MINUTE),
            Field::HourOfDay => self.set_millis(self.millis + amount * MS_PER_HOUR),
            Field::AmPm => {
                // A half-day shift that crosses a DST transition would move
                // the wall hour; correct by the offset change so the local
                // clock reads the same hour in the other half-day.
                let before = self.backend.tz.offset_at(self.millis as f64 / 1_000.0);
                self.set_millis(self.millis + amount * 12 * MS_PER_HOUR)?;
                let after = self.backend.tz.offset_at(self.millis as f64 / 1_000.0);
                if before != after {
                    self.set_millis(self.millis - i64::from(after - before) * MS_PER_SECOND)?;
                }
                Ok(())
            }
            Field::DayOfMonth | Field::DayOfYear | Field::DayOfWeek => {
                self.set_local(self.civil.days + amount, self.ms_of_day)
            }
            Field::WeekOfYear | Field::WeekOfMonth | Field::DayOfWeekInMonth => {
                self.set_local(self.civil.days + amount * 7, self.ms_of_day)
            }
            Field::Month => {
                let civil = self.civil;
                let month_start = civil.days - i64::from(civil.day) + 1;
                let start = self.backend.civil_at(month_start)?;
                let target_start = self.backend.days_at(
                    i64::from(start.extended_year),
                    i64::from(start.month) + amount,
                    1,
                )?;
                let target = self.backend.civil_at(target_start)?;
                // Pin the day of month to the target month's length.
                let day = i64::from(civil.day.min(target.days_in_month));
                self.set_local(target_start + day - 1, self.ms_of_day)
            }
            Field::YearForWeekOfYear => {
                let year = self.get(Field::YearForWeekOfYear)? + amount;
                self.set(Field::YearForWeekOfYear, year)
            }
            Field::Year | Field::ExtendedYear => {
                let civil = self.civil;
                let target_year = i64::from(civil.extended_year) + amount;
                let months = self.backend.months_in_year_of(target_year)?;
                let month = i64::from(civil.month).min(months);
                let month_start = self.backend.days_at(target_year, month, 1)?;
                let target = self.backend.civil_at(month_start)?;
                let day = i64::from(civil.day.min(target.days_in_month));
                self.set_local(month_start + day - 1, self.ms_of_day)
            }
            Field::Era | Field::IsLeapMonth => {
                Err(CalendarError::r#type().with_message("cannot add to this field"))
            }
        }
    }

    /// Rolls `amount` of `field`, wrapping within the containing unit.
    pub(crate) fn roll(&mut self, field: Field, amount: i64) -> CalendarResult<()> {
        let min = self.get_limit(field, LimitKind::ActualMinimum)?;
        let max = self.get_limit(field, LimitKind::ActualMaximum)?;
        let gap = max - min + 1;
        let value = self.get(field)?;
        let rolled = (value - min + amount).rem_euclid(gap) + min;
        self.add(field, rolled - value)
    }

    /// Reports a field limit, static per calendar kind or actual at the
    /// cursor position.
    pub(crate) fn get_limit(&self, field: Field, kind: LimitKind) -> CalendarResult<i64> {
        use LimitKind::*;
        let civil = &self.civil;
        let backend = self.backend;
        let value = match field {
            Field::Era => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 0,
                _ => match backend.era_style() {
                    EraStyle::Inverse => 1,
                    EraStyle::Single => 0,
                    EraStyle::Japanese => JAPANESE_ERAS.len() as i64,
                },
            },
            Field::Year | Field::ExtendedYear | Field::YearForWeekOfYear => match kind {
                Minimum | GreatestMinimum => 1,
                ActualMinimum => match backend.era_style() {
                    // Era year restarts at 1 at each era boundary.
                    EraStyle::Japanese | EraStyle::Inverse => 1,
                    EraStyle::Single => 1,
                },
                _ => 1_000_000,
            },
            Field::Month => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 1,
                LeastMaximum => 12,
                ActualMaximum => i64::from(civil.months_in_year),
                Maximum => i64::from(max_months_in_year(backend.kind)),
            },
            Field::IsLeapMonth => match kind {
                Maximum | LeastMaximum | ActualMaximum => i64::from(backend.is_lunisolar()),
                _ => 0,
            },
            Field::DayOfMonth => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 1,
                LeastMaximum => i64::from(least_month_length(backend.kind)),
                ActualMaximum => i64::from(civil.days_in_month),
                Maximum => i64::from(max_month_length(backend.kind)),
            },
            Field::DayOfYear => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 1,
                ActualMaximum => i64::from(civil.days_in_year),
                _ => i64::from(max_year_length(backend.kind)),
            },
            Field::DayOfWeek => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 1,
                _ => 7,
            },
            Field::DayOfWeekInMonth => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 1,
                LeastMaximum => 4,
                ActualMaximum => {
                    let first = (i64::from(civil.day) - 1) % 7 + 1;
                    (i64::from(civil.days_in_month) - first) / 7 + 1
                }
                Maximum => 6,
            },
            Field::WeekOfMonth => match kind {
                Minimum | GreatestMinimum => 0,
                ActualMinimum => backend.week_number(1, civil.day_of_week_on(1)),
                ActualMaximum => backend.week_number(
                    i64::from(civil.days_in_month),
                    civil.day_of_week_on(i64::from(civil.days_in_month)),
                ),
                _ => 6,
            },
            Field::WeekOfYear => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 1,
                LeastMaximum => 52,
                _ => (i64::from(max_year_length(backend.kind)) + 6) / 7 + 1,
            },
            Field::HourOfDay => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 0,
                _ => 23,
            },
            Field::AmPm => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 0,
                _ => 1,
            },
            Field::Minute | Field::Second => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 0,
                _ => 59,
            },
            Field::Millisecond => match kind {
                Minimum | GreatestMinimum | ActualMinimum => 0,
                _ => 999,
            },
        };
        Ok(value)
    }

    /// The number of whole `field` units between the cursor and `target`,
    /// advancing the cursor by that amount. ICU's field-difference shape:
    /// doubling probe then binary search.
    pub(crate) fn field_difference(&mut self, target: i64, field: Field) -> CalendarResult<i64> {
        let forward = target >= self.millis;
        let sign: i64 = if forward { 1 } else { -1 };
        let fits = |cursor: &Cursor<'_>, n: i64| -> CalendarResult<bool> {
            let mut probe = cursor.clone();
            probe.add(field, n * sign)?;
            Ok(if forward {
                probe.millis() <= target
            } else {
                probe.millis() >= target
            })
        };
        if !fits(self, 1)? {
            return Ok(0);
        }
        let mut lo = 1i64;
        let mut hi = 2i64;
        while fits(self, hi)? {
            lo = hi;
            hi = hi
                .checked_mul(2)
                .ok_or_else(|| CalendarError::range().with_message("field difference overflow"))?;
        }
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if fits(self, mid)? {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        self.add(field, lo * sign)?;
        Ok(lo * sign)
    }
}

fn max_months_in_year(kind: AnyCalendarKind) -> u8 {
    match kind {
        AnyCalendarKind::Chinese
        | AnyCalendarKind::Dangi
        | AnyCalendarKind::Hebrew
        | AnyCalendarKind::Coptic
        | AnyCalendarKind::Ethiopian
        | AnyCalendarKind::EthiopianAmeteAlem => 13,
        _ => 12,
    }
}

fn least_month_length(kind: AnyCalendarKind) -> u8 {
    match kind {
        AnyCalendarKind::Coptic
        | AnyCalendarKind::Ethiopian
        | AnyCalendarKind::EthiopianAmeteAlem => 5,
        AnyCalendarKind::Chinese
        | AnyCalendarKind::Dangi
        | AnyCalendarKind::Hebrew
        | AnyCalendarKind::IslamicCivil
        | AnyCalendarKind::IslamicObservational
        | AnyCalendarKind::IslamicTabular
        | AnyCalendarKind::IslamicUmmAlQura => 29,
        _ => 28,
    }
}

fn max_month_length(kind: AnyCalendarKind) -> u8 {
    match kind {
        AnyCalendarKind::Chinese
        | AnyCalendarKind::Dangi
        | AnyCalendarKind::Hebrew
        | AnyCalendarKind::Coptic
        | AnyCalendarKind::Ethiopian
        | AnyCalendarKind::EthiopianAmeteAlem
        | AnyCalendarKind::IslamicCivil
        | AnyCalendarKind::IslamicObservational
        | AnyCalendarKind::IslamicTabular
        | AnyCalendarKind::IslamicUmmAlQura => 30,
        _ => 31,
    }
}

fn max_year_length(kind: AnyCalendarKind) -> u16 {
    match kind {
        AnyCalendarKind::Hebrew => 385,
        AnyCalendarKind::Chinese | AnyCalendarKind::Dangi => 384,
        AnyCalendarKind::IslamicCivil
        | AnyCalendarKind::IslamicObservational
        | AnyCalendarKind::IslamicTabular
        | AnyCalendarKind::IslamicUmmAlQura => 355,
        _ => 366,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SECONDS_PER_DAY;

    fn utc_ms(y: i32, m: u8, d: u8, h: i64, min: i64, s: i64) -> i64 {
        (iso_date_to_epoch_days(y, m, d) * SECONDS_PER_DAY + h * 3600 + min * 60 + s) * 1000
    }

    fn gregorian_utc() -> Backend {
        Backend::new(AnyCalendarKind::Gregorian, TimeZone::utc())
    }

    #[test]
    fn gregorian_fields() {
        let backend = gregorian_utc();
        let cursor = backend.cursor(utc_ms(2024, 3, 19, 15, 30, 45)).unwrap();
        assert_eq!(cursor.get(Field::Era).unwrap(), 1);
        assert_eq!(cursor.get(Field::Year).unwrap(), 2024);
        assert_eq!(cursor.get(Field::Month).unwrap(), 3);
        assert_eq!(cursor.get(Field::DayOfMonth).unwrap(), 19);
        // 2024-03-19 was a Tuesday.
        assert_eq!(cursor.get(Field::DayOfWeek).unwrap(), 3);
        assert_eq!(cursor.get(Field::DayOfWeekInMonth).unwrap(), 3);
        assert_eq!(cursor.get(Field::HourOfDay).unwrap(), 15);
        assert_eq!(cursor.get(Field::Minute).unwrap(), 30);
        assert_eq!(cursor.get(Field::Second).unwrap(), 45);
    }

    #[test]
    fn set_and_carry() {
        let backend = gregorian_utc();
        let mut cursor = backend.cursor(utc_ms(2023, 1, 15, 12, 0, 0)).unwrap();
        cursor.set(Field::Month, 2).unwrap();
        cursor.set(Field::DayOfMonth, 30).unwrap();
        // Feb 30 carries into March.
        assert_eq!(cursor.get(Field::Month).unwrap(), 3);
        assert_eq!(cursor.get(Field::DayOfMonth).unwrap(), 2);
    }

    #[test]
    fn month_add_pins_day() {
        let backend = gregorian_utc();
        let mut cursor = backend.cursor(utc_ms(2023, 1, 31, 0, 0, 0)).unwrap();
        cursor.add(Field::Month, 1).unwrap();
        assert_eq!(cursor.get(Field::Month).unwrap(), 2);
        assert_eq!(cursor.get(Field::DayOfMonth).unwrap(), 28);
    }

    #[test]
    fn year_add_handles_leap_day() {
        let backend = gregorian_utc();
        let mut cursor = backend.cursor(utc_ms(2024, 2, 29, 6, 0, 0)).unwrap();
        cursor.add(Field::Year, 1).unwrap();
        assert_eq!(cursor.get(Field::Year).unwrap(), 2025);
        assert_eq!(cursor.get(Field::Month).unwrap(), 2);
        assert_eq!(cursor.get(Field::DayOfMonth).unwrap(), 28);
        assert_eq!(cursor.get(Field::HourOfDay).unwrap(), 6);
    }

    #[test]
    fn week_of_year_boundaries() {
        let mut backend = gregorian_utc();
        backend.first_weekday = 2; // Monday
        backend.min_days_in_first_week = 4; // ISO week rules
        let cursor = backend.cursor(utc_ms(2021, 1, 1, 0, 0, 0)).unwrap();
        // 2021-01-01 is a Friday; ISO week 53 of 2020.
        assert_eq!(cursor.get(Field::WeekOfYear).unwrap(), 53);
        assert_eq!(cursor.get(Field::YearForWeekOfYear).unwrap(), 2020);
        let cursor = backend.cursor(utc_ms(2024, 12, 30, 0, 0, 0)).unwrap();
        // 2024-12-30 is a Monday; ISO week 1 of 2025.
        assert_eq!(cursor.get(Field::WeekOfYear).unwrap(), 1);
        assert_eq!(cursor.get(Field::YearForWeekOfYear).unwrap(), 2025);
    }

    #[test]
    fn dst_gap_shifts_forward() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        let backend = Backend::new(AnyCalendarKind::Gregorian, tz);
        // Compose local 2023-03-12 02:30, which does not exist.
        let local_ms =
            (iso_date_to_epoch_days(2023, 3, 12) * SECONDS_PER_DAY + 2 * 3600 + 30 * 60) * 1000;
        let utc = backend.local_to_utc_ms(local_ms);
        let cursor = backend.cursor(utc).unwrap();
        assert_eq!(cursor.get(Field::HourOfDay).unwrap(), 3);
        assert_eq!(cursor.get(Field::Minute).unwrap(), 30);
    }

    #[test]
    fn fold_resolves_to_first_occurrence() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        let backend = Backend::new(AnyCalendarKind::Gregorian, tz);
        // Local 2023-11-05 01:30 occurs twice; first occurrence is PDT.
        let local_ms =
            (iso_date_to_epoch_days(2023, 11, 5) * SECONDS_PER_DAY + 3600 + 30 * 60) * 1000;
        let utc = backend.local_to_utc_ms(local_ms);
        assert_eq!(
            utc / 1000,
            iso_date_to_epoch_days(2023, 11, 5) * SECONDS_PER_DAY + 8 * 3600 + 30 * 60
        );
    }

    #[test]
    fn day_add_preserves_local_time_across_dst() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        let backend = Backend::new(AnyCalendarKind::Gregorian, tz);
        // 2023-03-11 12:00 PST.
        let start = backend
            .local_to_utc_ms((iso_date_to_epoch_days(2023, 3, 11) * SECONDS_PER_DAY + 12 * 3600) * 1000);
        let mut cursor = backend.cursor(start).unwrap();
        cursor.add(Field::DayOfMonth, 1).unwrap();
        // Still noon locally, though only 23 real hours elapsed.
        assert_eq!(cursor.get(Field::HourOfDay).unwrap(), 12);
        assert_eq!(cursor.get(Field::DayOfMonth).unwrap(), 12);
        assert_eq!(cursor.millis() - start, 23 * 3_600_000);
    }

    #[test]
    fn am_pm_add_keeps_the_wall_hour_across_dst() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        let backend = Backend::new(AnyCalendarKind::Gregorian, tz);
        // 01:30 PST on the spring-forward morning; twelve hours later the
        // zone is on PDT.
        let mut cursor = backend.cursor(utc_ms(2023, 3, 12, 9, 30, 0)).unwrap();
        assert_eq!(cursor.get(Field::AmPm).unwrap(), 0);
        cursor.add(Field::AmPm, 1).unwrap();
        assert_eq!(cursor.get(Field::AmPm).unwrap(), 1);
        assert_eq!(cursor.get(Field::HourOfDay).unwrap(), 13);
        assert_eq!(cursor.get(Field::Minute).unwrap(), 30);
        // Eleven real hours elapsed, not twelve.
        assert_eq!(cursor.millis(), utc_ms(2023, 3, 12, 20, 30, 0));
    }

    #[test]
    fn hebrew_leap_month_ordinals() {
        let backend = Backend::new(AnyCalendarKind::Hebrew, TimeZone::utc());
        // 5784 is a Hebrew leap year with 13 months.
        let cursor = backend.cursor(utc_ms(2024, 3, 1, 0, 0, 0)).unwrap();
        assert_eq!(cursor.get_limit(Field::Month, LimitKind::ActualMaximum).unwrap(), 13);
    }

    #[test]
    fn field_difference_months() {
        let backend = gregorian_utc();
        let mut cursor = backend.cursor(utc_ms(2023, 1, 15, 0, 0, 0)).unwrap();
        let target = utc_ms(2023, 6, 20, 0, 0, 0);
        assert_eq!(cursor.field_difference(target, Field::Month).unwrap(), 5);
        // Cursor advanced by five months; remaining gap is days.
        assert_eq!(cursor.get(Field::Month).unwrap(), 6);
        let days = cursor.clone().field_difference(target, Field::DayOfMonth).unwrap();
        assert_eq!(days, 5);
    }

    #[test]
    fn roll_wraps_within_parent() {
        let backend = gregorian_utc();
        let mut cursor = backend.cursor(utc_ms(2023, 12, 15, 0, 0, 0)).unwrap();
        cursor.roll(Field::Month, 1).unwrap();
        // December rolls to January of the same year.
        assert_eq!(cursor.get(Field::Month).unwrap(), 1);
        assert_eq!(cursor.get(Field::Year).unwrap(), 2023);
    }
}
