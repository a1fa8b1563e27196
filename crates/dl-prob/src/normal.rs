//! Normal distribution utilities.

use std::f64::consts::SQRT_2;

use dl_core::{Error, Result};
use rand::Rng;
use rand_distr::StandardNormal;
use statrs::function::erf::{erfc, erfc_inv};

/// Standard normal CDF `Φ(z)`.
#[inline]
pub fn cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Standard normal survival function `1 - Φ(z)`, accurate in the upper tail.
#[inline]
pub fn sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Two-sided p-value `P(|Z| > |z|)`.
pub fn two_sided_p_value(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    (2.0 * sf(z.abs())).min(1.0)
}

/// Standard normal quantile `Φ⁻¹(p)` for `p ∈ (0, 1)`.
pub fn quantile(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(Error::Validation(format!("p must be in (0, 1), got {}", p)));
    }
    Ok(-SQRT_2 * erfc_inv(2.0 * p))
}

/// Draw one value from `N(mean, sd)`.
///
/// Always consumes exactly one standard-normal sample, so `sd = 0` keeps the
/// stream aligned with `sd > 0`.
#[inline]
pub fn sample<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + sd * z
}

/// Draw `n` i.i.d. values from `N(mean, sd)`.
pub fn sample_n<R: Rng + ?Sized>(rng: &mut R, n: usize, mean: f64, sd: f64) -> Vec<f64> {
    (0..n).map(|_| sample(rng, mean, sd)).collect()
}
