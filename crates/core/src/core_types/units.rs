//! Semantic unit types for type-safe kitchen quantity handling
//!
//! This module provides newtype wrappers for the physical quantities the
//! conversion engine passes between components, so that a temperature is
//! never confused with a weight, or an altitude with a pan dimension.
//!
//! # Design Philosophy
//! - Every quantity is an `f64`; intermediate values stay unrounded across
//!   chained transitions and rounding only happens at presentation
//! - Implements common traits (Add, Sub, Mul, Div, Ord, Display, etc.)
//! - Provides explicit conversion methods between related types
//! - Serde support for serialization (newtypes serialize as the bare number)
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//! - Private inner fields with validated constructors
//!
//! # Usage
//! ```
//! use bake_convert_core::core_types::units::{Celsius, Fahrenheit, Grams};
//!
//! let oven = Celsius::new(180.0);
//! let f: Fahrenheit = oven.into();
//! assert!((*f - 356.0).abs() < 0.01);
//!
//! let dough = Grams::new(500.0) + Grams::new(250.0);
//! assert_eq!(dough, Grams::new(750.0));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Deref, Div, Mul, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Eq for Celsius {}

impl PartialOrd for Celsius {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Celsius {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Absolute zero in Celsius
    pub const ABSOLUTE_ZERO: Celsius = Celsius(-273.15);

    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Water boiling point at 1 atm
    pub const BOILING: Celsius = Celsius(100.0);

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -273.15,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to Fahrenheit
    #[inline]
    #[must_use]
    pub fn to_fahrenheit(self) -> Fahrenheit {
        Fahrenheit(self.0 * 9.0 / 5.0 + 32.0)
    }

    /// Shift by a temperature difference in °C (may be negative)
    #[inline]
    #[must_use]
    pub fn offset(self, delta: f64) -> Celsius {
        Celsius(self.0 + delta)
    }
}

impl From<f64> for Celsius {
    fn from(v: f64) -> Self {
        Celsius(v)
    }
}

impl From<Celsius> for f64 {
    fn from(c: Celsius) -> f64 {
        c.0
    }
}

impl From<Celsius> for Fahrenheit {
    fn from(c: Celsius) -> Fahrenheit {
        c.to_fahrenheit()
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

/// Temperature in degrees Fahrenheit
///
/// Only used at the unit-conversion boundary; the engine computes in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Fahrenheit(f64);

impl Deref for Fahrenheit {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Fahrenheit {
    /// Create a new Fahrenheit temperature. Asserts value >= absolute zero (-459.67°F).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -459.67,
            "Fahrenheit::new: value is below absolute zero (-459.67°F)"
        );
        Fahrenheit(value)
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius((self.0 - 32.0) * 5.0 / 9.0)
    }
}

impl From<Fahrenheit> for Celsius {
    fn from(f: Fahrenheit) -> Celsius {
        f.to_celsius()
    }
}

impl fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°F", self.0)
    }
}

// ============================================================================
// MASS TYPES
// ============================================================================

/// Mass in grams
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Grams(f64);

impl Eq for Grams {}

impl PartialOrd for Grams {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Grams {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Grams {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Grams {
    /// Zero mass
    pub const ZERO: Grams = Grams(0.0);

    /// Create a new mass in grams. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Grams::new: negative mass is invalid");
        Grams(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Grams> for f64 {
    fn from(g: Grams) -> f64 {
        g.0
    }
}

impl Add for Grams {
    type Output = Grams;
    fn add(self, rhs: Grams) -> Grams {
        Grams(self.0 + rhs.0)
    }
}

impl Sub for Grams {
    type Output = Grams;
    fn sub(self, rhs: Grams) -> Grams {
        Grams(self.0 - rhs.0)
    }
}

impl Mul<f64> for Grams {
    type Output = Grams;
    fn mul(self, rhs: f64) -> Grams {
        Grams(self.0 * rhs)
    }
}

impl Div<f64> for Grams {
    type Output = Grams;
    fn div(self, rhs: f64) -> Grams {
        Grams(self.0 / rhs)
    }
}

// Ratio of two masses is dimensionless
impl Div<Grams> for Grams {
    type Output = f64;
    fn div(self, rhs: Grams) -> f64 {
        self.0 / rhs.0
    }
}

impl Sum for Grams {
    fn sum<I: Iterator<Item = Grams>>(iter: I) -> Grams {
        Grams(iter.map(|g| g.0).sum())
    }
}

impl fmt::Display for Grams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} g", self.0)
    }
}

// ============================================================================
// VOLUME TYPES
// ============================================================================

/// Volume in cubic centimeters (= milliliters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct CubicCentimeters(f64);

impl Eq for CubicCentimeters {}

impl PartialOrd for CubicCentimeters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CubicCentimeters {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for CubicCentimeters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl CubicCentimeters {
    /// Create a new volume. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "CubicCentimeters::new: negative volume is invalid");
        CubicCentimeters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Add for CubicCentimeters {
    type Output = CubicCentimeters;
    fn add(self, rhs: CubicCentimeters) -> CubicCentimeters {
        CubicCentimeters(self.0 + rhs.0)
    }
}

impl Sub for CubicCentimeters {
    type Output = CubicCentimeters;
    fn sub(self, rhs: CubicCentimeters) -> CubicCentimeters {
        CubicCentimeters(self.0 - rhs.0)
    }
}

impl Mul<f64> for CubicCentimeters {
    type Output = CubicCentimeters;
    fn mul(self, rhs: f64) -> CubicCentimeters {
        CubicCentimeters(self.0 * rhs)
    }
}

// Ratio of two volumes is the pan scaling factor
impl Div<CubicCentimeters> for CubicCentimeters {
    type Output = f64;
    fn div(self, rhs: CubicCentimeters) -> f64 {
        self.0 / rhs.0
    }
}

impl fmt::Display for CubicCentimeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} cm³", self.0)
    }
}

/// Altitude above sea level in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Meters {
    /// Sea level
    pub const SEA_LEVEL: Meters = Meters(0.0);

    /// Create a new altitude in meters. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Meters::new: negative altitude is invalid");
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} m", self.0)
    }
}

/// Atmospheric pressure in kilopascals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilopascals(f64);

impl Deref for Kilopascals {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Kilopascals {
    /// Standard sea-level pressure
    pub const SEA_LEVEL: Kilopascals = Kilopascals(101.325);

    /// Kilopascals per inch of mercury
    const KPA_PER_INHG: f64 = 3.386389;

    /// Create a new pressure. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Kilopascals::new: negative pressure is invalid");
        Kilopascals(value)
    }

    /// Convert to inches of mercury
    #[inline]
    #[must_use]
    pub fn to_inches_of_mercury(self) -> f64 {
        self.0 / Self::KPA_PER_INHG
    }
}

impl fmt::Display for Kilopascals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kPa", self.0)
    }
}

// ============================================================================
// TIME TYPES
// ============================================================================

/// Duration in hours (fermentation)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hours(f64);

impl Eq for Hours {}

impl PartialOrd for Hours {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hours {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Hours {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Hours {
    /// Create a new duration in hours. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Hours::new: negative duration is invalid");
        Hours(value)
    }

    /// Convert to minutes
    #[inline]
    #[must_use]
    pub fn to_minutes(self) -> Minutes {
        Minutes(self.0 * 60.0)
    }
}

impl Mul<f64> for Hours {
    type Output = Hours;
    fn mul(self, rhs: f64) -> Hours {
        Hours(self.0 * rhs)
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} h", self.0)
    }
}

/// Duration in minutes (baking, mixing)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Minutes(f64);

impl Eq for Minutes {}

impl PartialOrd for Minutes {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Minutes {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Minutes {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Minutes {
    /// Create a new duration in minutes. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Minutes::new: negative duration is invalid");
        Minutes(value)
    }

    /// Convert to hours
    #[inline]
    #[must_use]
    pub fn to_hours(self) -> Hours {
        Hours(self.0 / 60.0)
    }
}

impl Mul<f64> for Minutes {
    type Output = Minutes;
    fn mul(self, rhs: f64) -> Minutes {
        Minutes(self.0 * rhs)
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} min", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit() {
        let c = Celsius::new(100.0);
        assert!((c.to_fahrenheit().0 - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_fahrenheit_round_trip() {
        let f = Fahrenheit::new(350.0);
        let back = f.to_celsius().to_fahrenheit();
        assert!((back.0 - 350.0).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "below absolute zero")]
    fn test_celsius_below_absolute_zero_panics() {
        let _ = Celsius::new(-300.0);
    }

    #[test]
    fn test_grams_sum_and_ratio() {
        let total: Grams = [Grams(100.0), Grams(250.0), Grams(150.0)].into_iter().sum();
        assert_eq!(total, Grams(500.0));
        assert!((Grams(250.0) / total - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_volume_ratio_is_dimensionless() {
        let small = CubicCentimeters::new(1000.0);
        let large = CubicCentimeters::new(1500.0);
        assert!((large / small - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_time_conversions() {
        assert!((Hours::new(1.5).to_minutes().0 - 90.0).abs() < 1e-9);
        assert!((Minutes::new(45.0).to_hours().0 - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_sea_level_pressure_in_inhg() {
        let inhg = Kilopascals::SEA_LEVEL.to_inches_of_mercury();
        assert!((inhg - 29.921).abs() < 0.001);
    }

    #[test]
    fn test_total_ordering() {
        let a = Celsius::new(20.0);
        let b = Celsius::new(25.0);
        assert_eq!(a.max(b), b);
        assert!(Grams(1.0) < Grams(2.0));
    }
}
