//! Common types used across the platform

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Kilograms in one metric tonne.
///
/// Deliveries are weighed in tonnes while the production module reports
/// consumption in kilograms; every conversion goes through this constant.
pub const KG_PER_TONNE: Decimal = Decimal::ONE_THOUSAND;

/// A mass expressed in metric tonnes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tonnes(Decimal);

/// A mass expressed in kilograms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(Decimal);

impl Tonnes {
    pub const ZERO: Tonnes = Tonnes(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_kilograms(self) -> Kilograms {
        Kilograms(self.0 * KG_PER_TONNE)
    }

    /// `None` when the kilogram value does not fit in a `Decimal`
    pub fn checked_to_kilograms(self) -> Option<Kilograms> {
        self.0.checked_mul(KG_PER_TONNE).map(Kilograms)
    }
}

impl Kilograms {
    pub const ZERO: Kilograms = Kilograms(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(self, rhs: Kilograms) -> Option<Kilograms> {
        self.0.checked_add(rhs.0).map(Kilograms)
    }

    pub fn checked_sub(self, rhs: Kilograms) -> Option<Kilograms> {
        self.0.checked_sub(rhs.0).map(Kilograms)
    }
}

impl Add for Kilograms {
    type Output = Kilograms;

    fn add(self, rhs: Kilograms) -> Kilograms {
        Kilograms(self.0 + rhs.0)
    }
}

impl Sub for Kilograms {
    type Output = Kilograms;

    fn sub(self, rhs: Kilograms) -> Kilograms {
        Kilograms(self.0 - rhs.0)
    }
}

impl Neg for Kilograms {
    type Output = Kilograms;

    fn neg(self) -> Kilograms {
        Kilograms(-self.0)
    }
}

impl AddAssign for Kilograms {
    fn add_assign(&mut self, rhs: Kilograms) {
        self.0 += rhs.0;
    }
}

impl Sum for Kilograms {
    fn sum<I: Iterator<Item = Kilograms>>(iter: I) -> Kilograms {
        iter.fold(Kilograms::ZERO, Add::add)
    }
}

impl std::fmt::Display for Kilograms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

impl std::fmt::Display for Tonnes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} t", self.0)
    }
}

/// Inclusive date window for reports. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> Self {
        Self { date_from, date_to }
    }

    /// Window with neither side bounded
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.date_from.is_none() && self.date_to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tonnes_to_kilograms() {
        let t = Tonnes::new(Decimal::new(25, 1)); // 2.5 t
        assert_eq!(t.to_kilograms(), Kilograms::new(Decimal::from(2500)));
        assert_eq!(KG_PER_TONNE, Decimal::from(1000));
    }

    #[test]
    fn test_kilogram_arithmetic() {
        let total: Kilograms = [100, 250, 650]
            .iter()
            .map(|&n| Kilograms::new(Decimal::from(n)))
            .sum();
        assert_eq!(total.value(), Decimal::from(1000));
        assert_eq!((total - Kilograms::new(Decimal::from(1500))).value(), Decimal::from(-500));
    }

    #[test]
    fn test_checked_arithmetic_at_the_decimal_limit() {
        assert_eq!(Tonnes::new(Decimal::MAX).checked_to_kilograms(), None);
        assert_eq!(
            Tonnes::new(Decimal::ONE).checked_to_kilograms(),
            Some(Kilograms::new(KG_PER_TONNE))
        );

        let max = Kilograms::new(Decimal::MAX);
        assert_eq!(max.checked_add(max), None);
        assert_eq!(Kilograms::new(Decimal::MIN).checked_sub(max), None);
        assert_eq!(max.checked_sub(max), Some(Kilograms::ZERO));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = DateWindow::new(Some(date(2025, 1, 1)), Some(date(2025, 1, 31)));
        assert!(window.contains(date(2025, 1, 1)));
        assert!(window.contains(date(2025, 1, 31)));
        assert!(!window.contains(date(2024, 12, 31)));
        assert!(!window.contains(date(2025, 2, 1)));
    }

    #[test]
    fn test_half_open_windows() {
        let from_only = DateWindow::new(Some(date(2025, 3, 1)), None);
        assert!(from_only.contains(date(2030, 1, 1)));
        assert!(!from_only.contains(date(2025, 2, 28)));

        let to_only = DateWindow::new(None, Some(date(2025, 3, 1)));
        assert!(to_only.contains(date(1999, 1, 1)));
        assert!(!to_only.contains(date(2025, 3, 2)));
    }
}
