//! # Estimate Totals
//!
//! Pure computation half of the recalculation engine: given an estimate's
//! parts, produce its derived totals. The db layer decides when to call this
//! (after every part mutation and `apply_vat` change) and when to write the
//! result back (only on change).
//!
//! ## Rounding Policy
//! VAT is applied to the summed subtotal and rounded half-up exactly once.
//! Per-line VAT would accumulate rounding drift across parts.

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, VatRate};
use crate::types::EstimatePart;

/// Derived totals for one estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateTotals {
    /// Σ(part price × quantity), exact.
    pub subtotal: Money,
    /// 7.5% of the subtotal when VAT applies, rounded once; zero otherwise.
    pub vat: Money,
    /// subtotal + vat.
    pub total: Money,
}

impl EstimateTotals {
    /// Totals of an estimate with no parts.
    pub const fn zero() -> Self {
        EstimateTotals {
            subtotal: Money::zero(),
            vat: Money::zero(),
            total: Money::zero(),
        }
    }
}

/// Computes the derived totals for an estimate from its parts.
///
/// An estimate with zero parts has subtotal = vat = total = 0. Part prices
/// are validated non-negative before they are stored, so a negative subtotal
/// here means the atomicity guarantees upstream were violated; that is
/// reported as [`CoreError::ConsistencyViolation`] rather than clamped.
///
/// ## Example
/// ```rust
/// use gearbox_core::estimate::compute_totals;
/// # use gearbox_core::types::EstimatePart;
/// # use chrono::Utc;
/// # fn part(price_kobo: i64, quantity: i64) -> EstimatePart {
/// #     EstimatePart { id: String::new(), estimate_id: String::new(),
/// #         name: String::new(), price_kobo, quantity, created_at: Utc::now() }
/// # }
/// let parts = vec![part(10_000, 2), part(5_000, 1)];
/// let totals = compute_totals(true, &parts).unwrap();
/// assert_eq!(totals.subtotal.kobo(), 25_000); // ₦250.00
/// assert_eq!(totals.vat.kobo(), 1_875);       // ₦18.75
/// assert_eq!(totals.total.kobo(), 26_875);    // ₦268.75
/// ```
pub fn compute_totals(apply_vat: bool, parts: &[EstimatePart]) -> CoreResult<EstimateTotals> {
    let subtotal = parts
        .iter()
        .fold(Money::zero(), |acc, part| acc + part.line_total());

    if subtotal.is_negative() {
        return Err(CoreError::ConsistencyViolation(format!(
            "estimate subtotal is negative: {subtotal}"
        )));
    }

    let vat = if apply_vat {
        subtotal.calculate_vat(VatRate::standard())
    } else {
        Money::zero()
    };

    Ok(EstimateTotals {
        subtotal,
        vat,
        total: subtotal + vat,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn part(price_kobo: i64, quantity: i64) -> EstimatePart {
        EstimatePart {
            id: "p".to_string(),
            estimate_id: "e".to_string(),
            name: "part".to_string(),
            price_kobo,
            quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_zero_parts() {
        let totals = compute_totals(true, &[]).unwrap();
        assert_eq!(totals, EstimateTotals::zero());
    }

    #[test]
    fn test_vat_applied_at_aggregate() {
        // [(₦100.00, qty 2), (₦50.00, qty 1)] ⇒ subtotal ₦250.00,
        // VAT ₦18.75, total ₦268.75
        let parts = vec![part(10_000, 2), part(5_000, 1)];
        let totals = compute_totals(true, &parts).unwrap();
        assert_eq!(totals.subtotal.kobo(), 25_000);
        assert_eq!(totals.vat.kobo(), 1_875);
        assert_eq!(totals.total.kobo(), 26_875);
    }

    #[test]
    fn test_vat_not_applied() {
        let parts = vec![part(10_000, 2), part(5_000, 1)];
        let totals = compute_totals(false, &parts).unwrap();
        assert_eq!(totals.subtotal.kobo(), 25_000);
        assert_eq!(totals.vat.kobo(), 0);
        assert_eq!(totals.total.kobo(), 25_000);
    }

    #[test]
    fn test_single_final_rounding() {
        // Three lines of ₦2.73 each: subtotal ₦8.19.
        // Aggregate VAT: 819 × 7.5% = 61.425 → 61 kobo.
        // Per-line would give round(20.475)×3 = 60 kobo - a different answer,
        // which is exactly why VAT is only applied at the aggregate.
        let parts = vec![part(273, 1), part(273, 1), part(273, 1)];
        let totals = compute_totals(true, &parts).unwrap();
        assert_eq!(totals.vat.kobo(), 61);
        assert_eq!(totals.total.kobo(), 880);
    }

    #[test]
    fn test_idempotent_on_same_input() {
        let parts = vec![part(10_000, 2)];
        let first = compute_totals(true, &parts).unwrap();
        let second = compute_totals(true, &parts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_negative_subtotal_is_loud() {
        // Can only happen if validation upstream was bypassed.
        let parts = vec![part(-10_000, 1)];
        let err = compute_totals(true, &parts).unwrap_err();
        assert!(matches!(err, CoreError::ConsistencyViolation(_)));
    }
}
