//! RotationScore - Two-level cost of a candidate arrangement.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A score with an exclusion level and a repetition level.
///
/// Both components are accumulated as non-positive penalties and a higher
/// score is better. Exclusions count hard co-location violations (entities
/// whose affinities forbid sharing a lane); repetition is the decayed
/// recency penalty from history. Comparison is lexicographic:
///
/// 1. Exclusion counts are compared first
/// 2. Repetition is only compared when exclusions are equal
///
/// This realizes the "effectively infinite cost" rule: any candidate with
/// an exclusion violation loses to every violation-free candidate, yet can
/// still be selected when no violation-free candidate exists.
///
/// # Examples
///
/// ```
/// use rotapair_core::RotationScore;
///
/// let violating = RotationScore::of(-1, 0);
/// let repetitive = RotationScore::of(0, -4096);
///
/// // A clean candidate beats a violating one no matter the repetition.
/// assert!(repetitive > violating);
/// assert!(!violating.is_feasible());
/// assert!(RotationScore::ZERO.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RotationScore {
    exclusions: i64,
    repetition: i64,
}

impl RotationScore {
    /// The zero score: no violations, no recorded repetition.
    pub const ZERO: RotationScore = RotationScore {
        exclusions: 0,
        repetition: 0,
    };

    /// One hard exclusion violation.
    pub const ONE_EXCLUSION: RotationScore = RotationScore {
        exclusions: -1,
        repetition: 0,
    };

    #[inline]
    pub const fn of(exclusions: i64, repetition: i64) -> Self {
        RotationScore {
            exclusions,
            repetition,
        }
    }

    /// A score with only a repetition penalty.
    #[inline]
    pub const fn of_repetition(repetition: i64) -> Self {
        RotationScore {
            exclusions: 0,
            repetition,
        }
    }

    #[inline]
    pub const fn exclusions(&self) -> i64 {
        self.exclusions
    }

    #[inline]
    pub const fn repetition(&self) -> i64 {
        self.repetition
    }

    /// True when the arrangement breaks no hard exclusion.
    #[inline]
    pub const fn is_feasible(&self) -> bool {
        self.exclusions >= 0
    }
}

impl Ord for RotationScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.exclusions.cmp(&other.exclusions) {
            Ordering::Equal => self.repetition.cmp(&other.repetition),
            unequal => unequal,
        }
    }
}

impl PartialOrd for RotationScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Arithmetic saturates at the level bounds: a maximal-weight penalty summed
// over many pairs pins the level at `i64::MIN` instead of wrapping past it,
// which would invert the comparison.
impl Add for RotationScore {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        RotationScore::of(
            self.exclusions.saturating_add(other.exclusions),
            self.repetition.saturating_add(other.repetition),
        )
    }
}

impl Sub for RotationScore {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        RotationScore::of(
            self.exclusions.saturating_sub(other.exclusions),
            self.repetition.saturating_sub(other.repetition),
        )
    }
}

impl Neg for RotationScore {
    type Output = Self;

    fn neg(self) -> Self {
        RotationScore::of(
            self.exclusions.saturating_neg(),
            self.repetition.saturating_neg(),
        )
    }
}

impl fmt::Debug for RotationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RotationScore({}, {})", self.exclusions, self.repetition)
    }
}

impl fmt::Display for RotationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}excl/{}rep", self.exclusions, self.repetition)
    }
}
