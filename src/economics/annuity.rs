//! Uniform-annuity factors
//!
//! Both factors special-case a zero rate with the formula's limit instead of
//! dividing by zero:
//! - CRF(0, n) = 1/n
//! - PV annuity factor(0, n) = n

use crate::error::{require_non_negative, DomainError};

/// Capital recovery factor: converts a present sum into a uniform annual
/// payment over `lifetime_years` at `rate` (a fraction, not percent).
///
/// CRF = r(1+r)^n / ((1+r)^n - 1), or 1/n when r = 0. Tends to r as n grows.
pub fn capital_recovery_factor(rate: f64, lifetime_years: u32) -> Result<f64, DomainError> {
    require_non_negative("discount_rate", rate)?;
    if lifetime_years == 0 {
        return Err(DomainError::NonPositive {
            field: "lifetime_years",
            value: 0.0,
        });
    }

    let n = lifetime_years as f64;
    if rate == 0.0 {
        return Ok(1.0 / n);
    }

    // r / (1 - (1+r)^-n); the discount term underflows to 0 for long horizons,
    // giving the n -> infinity limit r instead of inf / inf
    let one_minus_discount = -(-n * rate.ln_1p()).exp_m1();
    Ok(rate / one_minus_discount)
}

/// Present value of 1 per year for `lifetime_years` years, paid in arrears.
///
/// (1 - (1+r)^-n) / r, or n when r = 0. Equals 1 / CRF.
pub fn present_value_annuity_factor(rate: f64, lifetime_years: u32) -> Result<f64, DomainError> {
    require_non_negative("discount_rate", rate)?;
    let n = lifetime_years as f64;
    if rate == 0.0 {
        return Ok(n);
    }

    Ok(-(-n * rate.ln_1p()).exp_m1() / rate)
}
