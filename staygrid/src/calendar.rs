//! Stay-date arithmetic shared by every engine component.
//!
//! Hotel nights are calendar dates with no timezone component; a stay is a
//! half-open range `[check_in, check_out)` where every date in the range
//! is one occupied night.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A half-open stay window: check-in inclusive, check-out exclusive.
///
/// A guest arriving 2024-06-01 and leaving 2024-06-03 occupies the nights
/// of 06-01 and 06-02; check-out day itself is not a night.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use staygrid::DateRange;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
/// ).unwrap();
///
/// assert_eq!(range.nights(), 2);
/// assert_eq!(format!("{range}"), "2024-06-01..2024-06-03");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl DateRange {
    /// Creates a new date range.
    ///
    /// # Errors
    ///
    /// Returns an error if `check_out` is not strictly after `check_in`
    /// (a stay must contain at least one night).
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, InvalidDateRangeError> {
        if check_out <= check_in {
            return Err(InvalidDateRangeError {
                check_in,
                check_out,
                reason: "check-out must be after check-in".to_string(),
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Creates a range covering `nights` nights starting at `first_night`.
    ///
    /// # Errors
    ///
    /// Returns an error if `nights` is zero.
    pub fn from_nights(first_night: NaiveDate, nights: u32) -> Result<Self, InvalidDateRangeError> {
        let check_out = first_night + Duration::days(i64::from(nights));
        Self::new(first_night, check_out)
    }

    /// Returns the check-in date (first occupied night).
    #[must_use]
    pub const fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Returns the check-out date (the day after the last occupied night).
    #[must_use]
    pub const fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Returns the last occupied night.
    #[must_use]
    pub fn last_night(&self) -> NaiveDate {
        self.check_out - Duration::days(1)
    }

    /// Returns the number of nights in the range.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Iterates over every occupied night in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use staygrid::DateRange;
    ///
    /// let range = DateRange::new(
    ///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
    /// ).unwrap();
    /// let nights: Vec<_> = range.iter_nights().collect();
    /// assert_eq!(nights.len(), 2);
    /// assert_eq!(nights[0], NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    /// ```
    pub fn iter_nights(&self) -> impl Iterator<Item = NaiveDate> {
        let check_out = self.check_out;
        self.check_in.iter_days().take_while(move |d| *d < check_out)
    }

    /// Checks whether `date` is an occupied night of this range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.check_in && date < self.check_out
    }

    /// Checks whether two ranges share at least one night.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Returns the range translated by `days` (may be negative).
    #[must_use]
    pub fn shifted_by(&self, days: i64) -> Self {
        Self {
            check_in: self.check_in + Duration::days(days),
            check_out: self.check_out + Duration::days(days),
        }
    }

    /// Returns the signed day delta from this range's check-in to `other`'s.
    #[must_use]
    pub fn delta_to(&self, other: &Self) -> i64 {
        (other.check_in - self.check_in).num_days()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.check_in, self.check_out)
    }
}

/// Error type for invalid date ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateRangeError {
    /// The offending check-in date.
    pub check_in: NaiveDate,
    /// The offending check-out date.
    pub check_out: NaiveDate,
    /// The reason the range is invalid.
    pub reason: String,
}

impl std::fmt::Display for InvalidDateRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid date range {}..{}: {}",
            self.check_in, self.check_out, self.reason
        )
    }
}

impl std::error::Error for InvalidDateRangeError {}

impl From<InvalidDateRangeError> for crate::error::Error {
    fn from(err: InvalidDateRangeError) -> Self {
        Self::Validation {
            field: "date_range".into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_new_valid_range() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 3)).unwrap();
        assert_eq!(range.check_in(), d(2024, 6, 1));
        assert_eq!(range.check_out(), d(2024, 6, 3));
        assert_eq!(range.nights(), 2);
        assert_eq!(range.last_night(), d(2024, 6, 2));
    }

    #[test]
    fn test_new_rejects_empty_range() {
        assert!(DateRange::new(d(2024, 6, 1), d(2024, 6, 1)).is_err());
        assert!(DateRange::new(d(2024, 6, 3), d(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_from_nights() {
        let range = DateRange::from_nights(d(2024, 6, 1), 4).unwrap();
        assert_eq!(range.check_out(), d(2024, 6, 5));
        assert!(DateRange::from_nights(d(2024, 6, 1), 0).is_err());
    }

    #[test]
    fn test_iter_nights() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 4)).unwrap();
        let nights: Vec<_> = range.iter_nights().collect();
        assert_eq!(nights, vec![d(2024, 6, 1), d(2024, 6, 2), d(2024, 6, 3)]);
    }

    #[test]
    fn test_contains_boundaries() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 3)).unwrap();
        assert!(range.contains(d(2024, 6, 1)));
        assert!(range.contains(d(2024, 6, 2)));
        assert!(!range.contains(d(2024, 6, 3)));
        assert!(!range.contains(d(2024, 5, 31)));
    }

    #[test]
    fn test_overlaps() {
        let a = DateRange::new(d(2024, 6, 1), d(2024, 6, 3)).unwrap();
        let b = DateRange::new(d(2024, 6, 2), d(2024, 6, 5)).unwrap();
        let c = DateRange::new(d(2024, 6, 3), d(2024, 6, 5)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Back-to-back stays do not overlap: checkout day is not a night
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_shifted_by() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 3)).unwrap();
        let shifted = range.shifted_by(4);
        assert_eq!(shifted.check_in(), d(2024, 6, 5));
        assert_eq!(shifted.check_out(), d(2024, 6, 7));
        assert_eq!(range.nights(), shifted.nights());
        assert_eq!(range.delta_to(&shifted), 4);
        assert_eq!(shifted.delta_to(&range), -4);
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 3)).unwrap();
        assert_eq!(format!("{range}"), "2024-06-01..2024-06-03");
    }

    #[test]
    fn test_invalid_range_converts_to_validation_error() {
        let err = DateRange::new(d(2024, 6, 3), d(2024, 6, 1)).unwrap_err();
        let engine_err: crate::Error = err.into();
        assert!(engine_err.is_validation());
    }
}
