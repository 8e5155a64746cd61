//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Kobo                                             │
//! │    Every amount is an i64 count of the smallest currency unit.          │
//! │    ₦10.99 = 1099 kobo. Sums are exact; rounding happens exactly         │
//! │    once, at the aggregate, when VAT is applied.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gearbox_core::money::Money;
//!
//! // Create from kobo (preferred)
//! let price = Money::from_kobo(1099); // ₦10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                   // ₦21.98
//! let total = price + Money::from_kobo(500); // ₦15.99
//!
//! // NEVER from floats - no such constructor exists.
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use thiserror::Error;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in kobo (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: credit/debit deltas and refunds need a sign
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kobo (the smallest currency unit).
    #[inline]
    pub const fn from_kobo(kobo: i64) -> Self {
        Money(kobo)
    }

    /// Creates a Money value from major and minor units (naira and kobo).
    ///
    /// ## Example
    /// ```rust
    /// use gearbox_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // ₦10.99
    /// assert_eq!(price.kobo(), 1099);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -₦5.50, not -₦4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in kobo.
    #[inline]
    pub const fn kobo(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (naira) portion.
    #[inline]
    pub const fn naira(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (kobo) portion (always 0-99).
    #[inline]
    pub const fn kobo_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates VAT on this amount, rounding half-up once at the aggregate.
    ///
    /// ## Rounding Policy
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  SINGLE FINAL ROUNDING                                              │
    /// │                                                                     │
    /// │  VAT is computed on the already-summed subtotal, never per line.    │
    /// │  Per-line rounding accumulates drift:                               │
    /// │    3 lines × round(₦0.335) = ₦1.02   ❌                             │
    /// │    round(3 × ₦0.335)       = ₦1.01   ✅                             │
    /// │                                                                     │
    /// │  Half-up at 2dp: ₦8.20 × 7.5% = ₦0.615 → ₦0.62                      │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Implementation
    /// Integer math: `(kobo * bps + 5000) / 10000`. The +5000 term rounds
    /// half-up (5000/10000 = 0.5). i128 intermediates prevent overflow.
    ///
    /// ## Example
    /// ```rust
    /// use gearbox_core::money::{Money, VatRate};
    ///
    /// let subtotal = Money::from_kobo(25_000); // ₦250.00
    /// let vat = subtotal.calculate_vat(VatRate::standard()); // 7.5%
    /// assert_eq!(vat.kobo(), 1875); // ₦18.75
    /// ```
    pub fn calculate_vat(&self, rate: VatRate) -> Money {
        let vat_kobo = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_kobo(vat_kobo as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use gearbox_core::money::Money;
    ///
    /// let unit_price = Money::from_kobo(299); // ₦2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.kobo(), 897); // ₦8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Parses a human-entered amount string into Money.
    ///
    /// One well-tested parser instead of ad hoc per-caller parsing.
    /// Accepts thousands separators and an optional currency sign:
    /// `"1,234.50"`, `"₦500"`, `"-12.5"`. At most 2 decimal places.
    ///
    /// ## Example
    /// ```rust
    /// use gearbox_core::money::Money;
    ///
    /// assert_eq!(Money::parse("1,234.50").unwrap().kobo(), 123_450);
    /// assert_eq!(Money::parse("₦500").unwrap().kobo(), 50_000);
    /// assert!(Money::parse("12.345").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, MoneyParseError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('₦')
            .chars()
            .filter(|c| *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        if digits.is_empty() || digits == "." {
            return Err(MoneyParseError::Invalid {
                input: input.to_string(),
            });
        }

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if minor_str.len() > 2 {
            return Err(MoneyParseError::TooManyDecimals {
                input: input.to_string(),
            });
        }

        // The sign is already stripped; both parts must be bare digits.
        let parse_part = |s: &str| -> Result<i64, MoneyParseError> {
            if s.is_empty() {
                return Ok(0);
            }
            if !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MoneyParseError::Invalid {
                    input: input.to_string(),
                });
            }
            s.parse::<i64>().map_err(|_| MoneyParseError::Invalid {
                input: input.to_string(),
            })
        };

        let major = parse_part(major_str)?;
        // Pad "5" to 50 kobo, "05" stays 5
        let minor = parse_part(minor_str)? * if minor_str.len() == 1 { 10 } else { 1 };

        let kobo = major * 100 + minor;
        Ok(Money(if negative { -kobo } else { kobo }))
    }
}

/// Errors from [`Money::parse`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    /// Input was empty after trimming separators.
    #[error("empty amount")]
    Empty,

    /// More than 2 decimal places.
    #[error("amount '{input}' has more than 2 decimal places")]
    TooManyDecimals { input: String },

    /// Not a parseable number.
    #[error("cannot parse amount '{input}'")]
    Invalid { input: String },
}

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 750 bps = 7.5% (the Nigerian standard VAT rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatRate(u32);

impl VatRate {
    /// Creates a VAT rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// The standard 7.5% VAT rate.
    #[inline]
    pub const fn standard() -> Self {
        VatRate(crate::VAT_RATE_BPS)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero VAT rate.
    #[inline]
    pub const fn zero() -> Self {
        VatRate(0)
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for debugging and log lines. User-facing rendering is the
/// collaborating view layer's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₦{}.{:02}", sign, self.naira().abs(), self.kobo_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kobo() {
        let money = Money::from_kobo(1099);
        assert_eq!(money.kobo(), 1099);
        assert_eq!(money.naira(), 10);
        assert_eq!(money.kobo_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.kobo(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.kobo(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_kobo(1099)), "₦10.99");
        assert_eq!(format!("{}", Money::from_kobo(500)), "₦5.00");
        assert_eq!(format!("{}", Money::from_kobo(-550)), "-₦5.50");
        assert_eq!(format!("{}", Money::from_kobo(0)), "₦0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_kobo(1000);
        let b = Money::from_kobo(500);

        assert_eq!((a + b).kobo(), 1500);
        assert_eq!((a - b).kobo(), 500);
        let result: Money = a * 3i64;
        assert_eq!(result.kobo(), 3000);
    }

    #[test]
    fn test_vat_standard_rate() {
        // ₦250.00 at 7.5% = ₦18.75, exact
        let subtotal = Money::from_kobo(25_000);
        let vat = subtotal.calculate_vat(VatRate::standard());
        assert_eq!(vat.kobo(), 1875);
    }

    #[test]
    fn test_vat_rounds_half_up_at_aggregate() {
        // ₦8.20 × 7.5% = ₦0.615 → half-up → ₦0.62
        let subtotal = Money::from_kobo(820);
        assert_eq!(subtotal.calculate_vat(VatRate::standard()).kobo(), 62);

        // ₦33.33 × 7.5% = ₦2.49975 → ₦2.50
        let subtotal = Money::from_kobo(3333);
        assert_eq!(subtotal.calculate_vat(VatRate::standard()).kobo(), 250);
    }

    #[test]
    fn test_vat_zero_rate() {
        let subtotal = Money::from_kobo(25_000);
        assert_eq!(subtotal.calculate_vat(VatRate::zero()).kobo(), 0);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_kobo(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.kobo(), 897);
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Money::parse("500").unwrap().kobo(), 50_000);
        assert_eq!(Money::parse("10.99").unwrap().kobo(), 1099);
        assert_eq!(Money::parse("0.05").unwrap().kobo(), 5);
    }

    #[test]
    fn test_parse_with_separators_and_sign() {
        assert_eq!(Money::parse("1,234.50").unwrap().kobo(), 123_450);
        assert_eq!(Money::parse("₦500").unwrap().kobo(), 50_000);
        assert_eq!(Money::parse("-12.5").unwrap().kobo(), -1250);
        assert_eq!(Money::parse(" 2,000 ").unwrap().kobo(), 200_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse(""), Err(MoneyParseError::Empty));
        assert!(matches!(
            Money::parse("12.345"),
            Err(MoneyParseError::TooManyDecimals { .. })
        ));
        assert!(matches!(
            Money::parse("[object Object]"),
            Err(MoneyParseError::Invalid { .. })
        ));
    }

    #[test]
    fn test_vat_rate_accessors() {
        let rate = VatRate::standard();
        assert_eq!(rate.bps(), 750);
        assert!((rate.percentage() - 7.5).abs() < 0.001);
    }
}
