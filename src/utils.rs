//! Utility date equations shared by the backend and range engines.

/// Seconds per civil day.
pub(crate) const SECONDS_PER_DAY: i64 = 86_400;
/// Milliseconds per civil day.
pub(crate) const MS_PER_DAY: i64 = 86_400_000;
pub(crate) const MS_PER_HOUR: i64 = 3_600_000;
pub(crate) const MS_PER_MINUTE: i64 = 60_000;
pub(crate) const MS_PER_SECOND: i64 = 1_000;

/// Returns whether `year` is a leap year in the proleptic Gregorian calendar.
pub(crate) fn is_iso_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// `ISODaysInMonth`
pub(crate) fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_iso_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Converts an ISO civil date to a day number relative to the epoch
/// (1970-01-01 is day 0). Days-from-civil equation over 400-year eras.
pub(crate) fn iso_date_to_epoch_days(year: i32, month: u8, day: u8) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Converts an epoch day number back to an ISO civil date.
pub(crate) fn epoch_days_to_iso_date(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    ((y + i64::from(m <= 2)) as i32, m, d)
}

/// Day of week for an epoch day number, 1 = Sunday through 7 = Saturday.
pub(crate) fn epoch_days_to_day_of_week(days: i64) -> u8 {
    ((days + 4).rem_euclid(7) + 1) as u8
}

/// Splits epoch milliseconds into whole days and the millisecond of day.
pub(crate) fn epoch_ms_to_day_and_ms(ms: i64) -> (i64, i64) {
    let days = ms.div_euclid(MS_PER_DAY);
    (days, ms - days * MS_PER_DAY)
}
