//! Option types for arithmetic and enumeration.

/// How a search treats a pattern naming a nonexistent civil time (a skipped
/// DST hour, Feb 30, a lunisolar leap month that is absent this cycle).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Only exact matches are accepted; an impossible pattern yields no
    /// match.
    #[default]
    Strict,
    /// Substitute the next existing value, optionally preserving the finer
    /// fields of the pattern (minute, second, ...) across the substitution.
    NextExisting { preserve_smaller: bool },
    /// Substitute the closest preceding existing value, preserving finer
    /// fields.
    PreviousExisting { preserve_smaller: bool },
}

impl MatchPolicy {
    #[inline]
    #[must_use]
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }

    #[inline]
    #[must_use]
    pub(crate) fn preserves_smaller(self) -> bool {
        matches!(
            self,
            Self::NextExisting {
                preserve_smaller: true
            } | Self::PreviousExisting {
                preserve_smaller: true
            }
        )
    }
}

/// Which occurrence of a repeated local time (a fall-back DST hour) a match
/// refers to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RepeatedInstant {
    #[default]
    First,
    Last,
}

/// The direction a search moves through time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    #[must_use]
    pub fn is_backward(self) -> bool {
        matches!(self, Self::Backward)
    }

    /// +1.0 forward, -1.0 backward.
    #[inline]
    pub(crate) fn signum(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// The full option bundle for a date search.
///
/// Every combination of these fields is legal; the historical invalid
/// combinations (strict plus an approximation, match-first plus match-last)
/// cannot be expressed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub policy: MatchPolicy,
    pub repeated: RepeatedInstant,
    pub direction: Direction,
}

impl SearchOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            policy: MatchPolicy::Strict,
            repeated: RepeatedInstant::First,
            direction: Direction::Forward,
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_repeated(mut self, repeated: RepeatedInstant) -> Self {
        self.repeated = repeated;
        self
    }

    #[must_use]
    pub const fn backward(mut self) -> Self {
        self.direction = Direction::Backward;
        self
    }
}

/// Options for component addition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// Wrap each field within its containing unit instead of carrying into
    /// it ("roll" rather than "add").
    pub wrap: bool,
}

impl AddOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { wrap: false }
    }

    #[must_use]
    pub const fn wrapping() -> Self {
        Self { wrap: true }
    }
}
