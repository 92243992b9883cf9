//! NaN-tolerant Pearson correlation.
//!
//! The similarity metric underneath everything else in this crate. Pairs
//! where either series holds NaN are skipped entirely, and the coefficient
//! is computed from the remaining usable pairs.

use dendra_core::{DendraError, Result};

/// Pearson product-moment correlation between `a` and `b`, skipping any
/// position where either value is NaN.
///
/// Degenerate inputs (no usable pairs, or a constant series) produce a
/// NaN/infinite coefficient, which is returned faithfully; the
/// cluster-similarity layer is responsible for neutralising such values
/// before they reach any ordering-sensitive structure.
pub fn pearson(a: &[f64], b: &[f64]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(DendraError::InvalidInput(format!(
            "pearson: series must have the same length ({} vs {})",
            a.len(),
            b.len(),
        )));
    }

    let mut sum_ab = 0.0_f64;
    let mut sum_a = 0.0_f64;
    let mut sum_b = 0.0_f64;
    let mut sum_a_sq = 0.0_f64;
    let mut sum_b_sq = 0.0_f64;
    let mut usable = 0.0_f64;

    for (&x, &y) in a.iter().zip(b) {
        if x.is_nan() || y.is_nan() {
            continue;
        }
        usable += 1.0;
        sum_ab += x * y;
        sum_a += x;
        sum_b += y;
        sum_a_sq += x * x;
        sum_b_sq += y * y;
    }

    let top = sum_ab - (sum_a * sum_b) / usable;
    let bottom_a = sum_a_sq - (sum_a * sum_a) / usable;
    let bottom_b = sum_b_sq - (sum_b * sum_b) / usable;
    let bottom = (bottom_a * bottom_b).sqrt();

    Ok((top / bottom) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-6;

    #[test]
    fn perfect_positive() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn perfect_negative() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&a, &b).unwrap() + 1.0).abs() < TOL);
    }

    #[test]
    fn symmetric() {
        let a = [1.0, 4.0, 2.0, 8.0, 5.0];
        let b = [3.0, 1.0, 7.0, 2.0, 9.0];
        assert_eq!(pearson(&a, &b).unwrap(), pearson(&b, &a).unwrap());
    }

    #[test]
    fn self_correlation_is_one() {
        let a = [1.0, 4.0, 2.0, 8.0, 5.0];
        assert!((pearson(&a, &a).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn nan_pairs_are_skipped_not_zeroed() {
        let a = [1.0, f64::NAN, 3.0, 4.0, 5.0, f64::NAN];
        let b = [2.0, 7.0, 5.0, 9.0, 11.0, 1.0];
        // Same series with the NaN positions physically removed.
        let a_clean = [1.0, 3.0, 4.0, 5.0];
        let b_clean = [2.0, 5.0, 9.0, 11.0];
        assert_eq!(
            pearson(&a, &b).unwrap(),
            pearson(&a_clean, &b_clean).unwrap(),
        );
    }

    #[test]
    fn nan_in_either_series_excludes_the_pair() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, f64::NAN, 6.0, 8.0];
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn constant_series_is_degenerate() {
        let a = [3.0, 3.0, 3.0, 3.0];
        let b = [1.0, 2.0, 3.0, 4.0];
        assert!(!pearson(&a, &b).unwrap().is_finite());
    }

    #[test]
    fn all_nan_is_degenerate() {
        let a = [f64::NAN, f64::NAN];
        let b = [1.0, 2.0];
        assert!(pearson(&a, &b).unwrap().is_nan());
    }
}
