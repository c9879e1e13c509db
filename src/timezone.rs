//! Time zones: UTC, fixed offsets, and rule-based DST zones.
//!
//! A DST zone is described by programmatic transition rules (month, week,
//! weekday, local time of day), the same shape POSIX TZ strings reduce to.
//! No text parsing happens here; zones are constructed directly or through
//! the built-in named constructors.

use crate::utils::{
    epoch_days_to_day_of_week, iso_date_to_epoch_days, iso_days_in_month, SECONDS_PER_DAY,
};

/// Earliest instant at which DST rules apply. Before this, every zone is
/// treated as permanently on its standard offset.
pub(crate) const EARLIEST_DST: f64 = -2_208_992_400.0;

/// The offset resolution for a local (wall clock) time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalOffset {
    /// The local time maps to exactly one instant.
    Unique { offset: i32 },
    /// The local time occurs twice (a fall-back transition).
    Fold { before: i32, after: i32 },
    /// The local time does not exist (a spring-forward transition).
    Gap { before: i32, after: i32 },
}

/// One DST transition rule: the `week`th `weekday` of `month`, at
/// `local_seconds` on the wall clock in effect before the transition.
/// `week` 5 selects the last occurrence of the weekday in the month;
/// `weekday` runs 1 = Sunday through 7 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub month: u8,
    pub week: u8,
    pub weekday: u8,
    pub local_seconds: i32,
}

impl TransitionRule {
    /// Epoch day of this rule's date in `year`.
    fn epoch_day(&self, year: i32) -> i64 {
        let month_start = iso_date_to_epoch_days(year, self.month, 1);
        let start_dow = epoch_days_to_day_of_week(month_start);
        let mut day = month_start + i64::from((7 + self.weekday - start_dow) % 7);
        if self.week == 5 {
            // Last occurrence within the month.
            let month_len = i64::from(iso_days_in_month(year, self.month));
            while day + 7 < month_start + month_len {
                day += 7;
            }
        } else {
            day += i64::from(self.week - 1) * 7;
        }
        day
    }

    /// Local (wall clock) seconds of the transition in `year`.
    fn local_instant(&self, year: i32) -> i64 {
        self.epoch_day(year) * SECONDS_PER_DAY + i64::from(self.local_seconds)
    }
}

/// The DST rule set of a zone that observes daylight saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstRules {
    pub std_offset: i32,
    pub dst_offset: i32,
    /// Start of DST, expressed on the standard wall clock.
    pub dst_start: TransitionRule,
    /// End of DST, expressed on the DST wall clock.
    pub dst_end: TransitionRule,
}

/// The DST window of one year. `start` may exceed `end` in the southern
/// hemisphere; the window then wraps the year boundary.
#[derive(Debug, Clone, Copy)]
struct DstWindow {
    start: i64,
    end: i64,
}

impl DstWindow {
    fn contains(&self, t: i64) -> bool {
        if self.start <= self.end {
            self.start <= t && t < self.end
        } else {
            !(self.end <= t && t < self.start)
        }
    }
}

impl DstRules {
    /// DST window for `year` in UTC seconds.
    fn window_utc(&self, year: i32) -> DstWindow {
        DstWindow {
            start: self.dst_start.local_instant(year) - i64::from(self.std_offset),
            end: self.dst_end.local_instant(year) - i64::from(self.dst_offset),
        }
    }

    /// DST window for `year` in wall clock seconds, rules taken verbatim.
    fn window_wall(&self, year: i32) -> DstWindow {
        DstWindow {
            start: self.dst_start.local_instant(year),
            end: self.dst_end.local_instant(year),
        }
    }
}

/// A time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZone {
    Utc,
    /// A fixed offset east of UTC, in seconds.
    Fixed { offset: i32 },
    /// A zone observing DST per its rule set.
    Rules(DstRules),
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::Utc
    }
}

impl TimeZone {
    #[must_use]
    pub const fn utc() -> Self {
        Self::Utc
    }

    #[must_use]
    pub const fn fixed(offset: i32) -> Self {
        Self::Fixed { offset }
    }

    /// Looks up one of the built-in named zones.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        let zone = match name {
            "UTC" | "Etc/UTC" => Self::Utc,
            "America/Los_Angeles" => Self::Rules(DstRules {
                std_offset: -8 * 3600,
                dst_offset: -7 * 3600,
                dst_start: rule(3, 2, 1, 2 * 3600),
                dst_end: rule(11, 1, 1, 2 * 3600),
            }),
            "America/New_York" => Self::Rules(DstRules {
                std_offset: -5 * 3600,
                dst_offset: -4 * 3600,
                dst_start: rule(3, 2, 1, 2 * 3600),
                dst_end: rule(11, 1, 1, 2 * 3600),
            }),
            // Midnight transitions; the 00:xx hour vanishes going into DST.
            "America/Sao_Paulo" => Self::Rules(DstRules {
                std_offset: -3 * 3600,
                dst_offset: -2 * 3600,
                dst_start: rule(11, 1, 1, 0),
                dst_end: rule(2, 3, 1, 0),
            }),
            "Europe/London" => Self::Rules(DstRules {
                std_offset: 0,
                dst_offset: 3600,
                dst_start: rule(3, 5, 1, 3600),
                dst_end: rule(10, 5, 1, 2 * 3600),
            }),
            "Europe/Paris" => Self::Rules(DstRules {
                std_offset: 3600,
                dst_offset: 2 * 3600,
                dst_start: rule(3, 5, 1, 2 * 3600),
                dst_end: rule(10, 5, 1, 3 * 3600),
            }),
            _ => return None,
        };
        Some(zone)
    }

    /// Seconds east of UTC in effect at the instant `at` (seconds since the
    /// Unix epoch).
    #[must_use]
    pub fn offset_at(&self, at: f64) -> i32 {
        match self {
            Self::Utc => 0,
            Self::Fixed { offset } => *offset,
            Self::Rules(rules) => {
                if at < EARLIEST_DST {
                    return rules.std_offset;
                }
                let t = at as i64;
                let year = utc_year_of(t);
                if rules.window_utc(year).contains(t)
                    || rules.window_utc(year - 1).contains(t)
                    || rules.window_utc(year + 1).contains(t)
                {
                    rules.dst_offset
                } else {
                    rules.std_offset
                }
            }
        }
    }

    /// Resolves a local wall clock time (seconds since the epoch as read off
    /// the local clock) to the offset(s) that may apply to it.
    #[must_use]
    pub fn offset_for_local(&self, local: i64) -> LocalOffset {
        match self {
            Self::Utc => LocalOffset::Unique { offset: 0 },
            Self::Fixed { offset } => LocalOffset::Unique { offset: *offset },
            Self::Rules(rules) => {
                let diff = rules.dst_offset - rules.std_offset;
                if diff == 0 {
                    return LocalOffset::Unique {
                        offset: rules.std_offset,
                    };
                }
                let year = utc_year_of(local);
                for y in [year - 1, year, year + 1] {
                    let window = rules.window_wall(y);
                    let d = i64::from(diff);
                    if diff > 0 {
                        if window.start <= local && local < window.start + d {
                            return LocalOffset::Gap {
                                before: rules.std_offset,
                                after: rules.dst_offset,
                            };
                        }
                        if window.end - d <= local && local < window.end {
                            return LocalOffset::Fold {
                                before: rules.dst_offset,
                                after: rules.std_offset,
                            };
                        }
                    } else {
                        if window.end <= local && local < window.end - d {
                            return LocalOffset::Gap {
                                before: rules.dst_offset,
                                after: rules.std_offset,
                            };
                        }
                        if window.start + d <= local && local < window.start {
                            return LocalOffset::Fold {
                                before: rules.std_offset,
                                after: rules.dst_offset,
                            };
                        }
                    }
                }
                let in_dst = rules.window_wall(year).contains(local)
                    || rules.window_wall(year - 1).contains(local)
                    || rules.window_wall(year + 1).contains(local);
                LocalOffset::Unique {
                    offset: if in_dst {
                        rules.dst_offset
                    } else {
                        rules.std_offset
                    },
                }
            }
        }
    }

    /// The next offset transition strictly after `at`, as
    /// `(instant, offset_before, offset_after)`.
    #[must_use]
    pub fn next_transition(&self, at: f64) -> Option<(f64, i32, i32)> {
        let rules = match self {
            Self::Utc | Self::Fixed { .. } => return None,
            Self::Rules(rules) => rules,
        };
        let t = if at < EARLIEST_DST { EARLIEST_DST } else { at } as i64;
        let year = utc_year_of(t);
        let mut best: Option<(i64, i32, i32)> = None;
        for y in [year - 1, year, year + 1] {
            let window = rules.window_utc(y);
            for (instant, before, after) in [
                (window.start, rules.std_offset, rules.dst_offset),
                (window.end, rules.dst_offset, rules.std_offset),
            ] {
                if instant > t && best.is_none_or(|(b, _, _)| instant < b) {
                    best = Some((instant, before, after));
                }
            }
        }
        best.map(|(instant, before, after)| (instant as f64, before, after))
    }

    /// If `at` falls inside the second lap of a repeated interval (the hour
    /// replayed after a fall-back transition), returns the interval as
    /// `(transition_instant, length)`.
    #[must_use]
    pub fn repeated_interval_containing(&self, at: f64) -> Option<(f64, f64)> {
        if at < EARLIEST_DST {
            return None;
        }
        // Search for a transition in the four days leading up to `at`.
        let mut probe = at - 2.0 * 86_400.0;
        for _ in 0..8 {
            let (tran, before, after) = self.next_transition(probe)?;
            if tran > at + 2.0 * 86_400.0 {
                return None;
            }
            let diff = f64::from(before - after);
            if diff > 0.0 && tran <= at && at < tran + diff {
                return Some((tran, diff));
            }
            if tran > at {
                return None;
            }
            probe = tran;
        }
        None
    }
}

const fn rule(month: u8, week: u8, weekday: u8, local_seconds: i32) -> TransitionRule {
    TransitionRule {
        month,
        week,
        weekday,
        local_seconds,
    }
}

/// The UTC calendar year containing epoch second `t`. Zone offsets are small
/// against a year, so this is a good enough year guess for rule evaluation
/// on either clock.
fn utc_year_of(t: i64) -> i32 {
    crate::utils::epoch_days_to_iso_date(t.div_euclid(SECONDS_PER_DAY)).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::iso_date_to_epoch_days;

    fn utc_secs(y: i32, m: u8, d: u8, h: i64, min: i64, s: i64) -> i64 {
        iso_date_to_epoch_days(y, m, d) * SECONDS_PER_DAY + h * 3600 + min * 60 + s
    }

    #[test]
    fn los_angeles_offsets() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        // 2023-03-12 01:59:59 PST (09:59:59 UTC).
        assert_eq!(tz.offset_at(utc_secs(2023, 3, 12, 9, 59, 59) as f64), -8 * 3600);
        // 2023-03-12 03:00:00 PDT (10:00:00 UTC).
        assert_eq!(tz.offset_at(utc_secs(2023, 3, 12, 10, 0, 0) as f64), -7 * 3600);
        // Midsummer.
        assert_eq!(tz.offset_at(utc_secs(2023, 7, 1, 0, 0, 0) as f64), -7 * 3600);
        // Midwinter.
        assert_eq!(tz.offset_at(utc_secs(2023, 1, 1, 0, 0, 0) as f64), -8 * 3600);
    }

    #[test]
    fn spring_forward_gap() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        // Local 2023-03-12 02:30 does not exist.
        let local = utc_secs(2023, 3, 12, 2, 30, 0);
        assert_eq!(
            tz.offset_for_local(local),
            LocalOffset::Gap {
                before: -8 * 3600,
                after: -7 * 3600
            }
        );
        // Local 01:30 and 03:30 both exist uniquely.
        assert_eq!(
            tz.offset_for_local(utc_secs(2023, 3, 12, 1, 30, 0)),
            LocalOffset::Unique { offset: -8 * 3600 }
        );
        assert_eq!(
            tz.offset_for_local(utc_secs(2023, 3, 12, 3, 30, 0)),
            LocalOffset::Unique { offset: -7 * 3600 }
        );
    }

    #[test]
    fn fall_back_fold() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        // Local 2023-11-05 01:30 occurs twice.
        let local = utc_secs(2023, 11, 5, 1, 30, 0);
        assert_eq!(
            tz.offset_for_local(local),
            LocalOffset::Fold {
                before: -7 * 3600,
                after: -8 * 3600
            }
        );
    }

    #[test]
    fn repeated_interval() {
        let tz = TimeZone::named("America/Los_Angeles").unwrap();
        // The 2023 fall-back transition: 2023-11-05 02:00 PDT = 09:00 UTC.
        let tran = utc_secs(2023, 11, 5, 9, 0, 0) as f64;
        // 01:30 PST, second lap of the repeated hour.
        let in_second_lap = utc_secs(2023, 11, 5, 9, 30, 0) as f64;
        assert_eq!(
            tz.repeated_interval_containing(in_second_lap),
            Some((tran, 3600.0))
        );
        // 01:30 PDT, first lap: not inside the repeat.
        let in_first_lap = utc_secs(2023, 11, 5, 8, 30, 0) as f64;
        assert_eq!(tz.repeated_interval_containing(in_first_lap), None);
    }

    #[test]
    fn next_transition_ordering() {
        let tz = TimeZone::named("America/New_York").unwrap();
        let jan = utc_secs(2024, 1, 15, 0, 0, 0) as f64;
        let (spring, before, after) = tz.next_transition(jan).unwrap();
        assert_eq!(before, -5 * 3600);
        assert_eq!(after, -4 * 3600);
        // 2024-03-10 02:00 EST = 07:00 UTC.
        assert_eq!(spring, utc_secs(2024, 3, 10, 7, 0, 0) as f64);
        let (fall, _, _) = tz.next_transition(spring).unwrap();
        assert_eq!(fall, utc_secs(2024, 11, 3, 6, 0, 0) as f64);
    }

    #[test]
    fn sao_paulo_midnight_gap() {
        let tz = TimeZone::named("America/Sao_Paulo").unwrap();
        // First Sunday of November 2017 was Nov 5; 00:30 local is skipped.
        let local = utc_secs(2017, 11, 5, 0, 30, 0);
        assert_eq!(
            tz.offset_for_local(local),
            LocalOffset::Gap {
                before: -3 * 3600,
                after: -2 * 3600
            }
        );
    }

    #[test]
    fn fixed_zone_is_flat() {
        let tz = TimeZone::fixed(5 * 3600 + 1800);
        assert_eq!(tz.offset_at(0.0), 19_800);
        assert_eq!(tz.next_transition(0.0), None);
        assert_eq!(tz.repeated_interval_containing(0.0), None);
    }
}
