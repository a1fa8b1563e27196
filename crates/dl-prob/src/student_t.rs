//! Student-t distribution utilities.

use dl_core::{Error, Result};
use statrs::distribution::{ContinuousCDF, StudentsT};

fn standard(df: f64) -> Result<StudentsT> {
    if !df.is_finite() || df <= 0.0 {
        return Err(Error::Validation(format!("df must be finite and > 0, got {}", df)));
    }
    StudentsT::new(0.0, 1.0, df).map_err(|e| Error::Validation(format!("Student-t: {}", e)))
}

/// Two-sided p-value `P(|T| > |t|)` with `df` degrees of freedom.
pub fn two_sided_p_value(t: f64, df: f64) -> Result<f64> {
    let dist = standard(df)?;
    if t.is_nan() {
        return Ok(f64::NAN);
    }
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Quantile of the standard Student-t with `df` degrees of freedom.
pub fn quantile(p: f64, df: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(Error::Validation(format!("p must be in (0, 1), got {}", p)));
    }
    Ok(standard(df)?.inverse_cdf(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_quantiles() {
        // t_{0.975, 10} = 2.228139
        let q = quantile(0.975, 10.0).unwrap();
        assert!((q - 2.228_138_851_986).abs() < 1e-6, "q={}", q);
        let p = two_sided_p_value(q, 10.0).unwrap();
        assert!((p - 0.05).abs() < 1e-8, "p={}", p);
    }

    #[test]
    fn test_large_df_reference_quantile() {
        // t_{0.975, 1000} = 1.962339, just above z_{0.975}
        let q = quantile(0.975, 1000.0).unwrap();
        assert!((q - 1.962_339).abs() < 1e-6, "q={}", q);
        assert!(q > 1.959_963_984_540_054);
    }

    #[test]
    fn test_invalid_df() {
        assert!(two_sided_p_value(1.0, 0.0).is_err());
        assert!(quantile(0.5, f64::NAN).is_err());
    }
}
