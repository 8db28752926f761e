//! Normal distribution helpers and the TrueSkill truncation functions.

use std::f64::consts::{PI, SQRT_2};

/// Below this a CDF value is treated as zero.
const TINY: f64 = 2.222_758_749e-162;

/// Complementary error function, fractional error below 1.2e-7.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + z / 2.0);
    let poly = -1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * (-z * z + poly).exp();
    if x < 0.0 {
        2.0 - r
    } else {
        r
    }
}

/// Inverse of [`erfc`] on `(0, 2)`, refined by two Newton steps.
pub fn erfcinv(y: f64) -> f64 {
    if y >= 2.0 {
        return -100.0;
    }
    if y <= 0.0 {
        return 100.0;
    }
    let lower = y < 1.0;
    let y = if lower { y } else { 2.0 - y };
    let t = (-2.0 * (y / 2.0).ln()).sqrt();
    let mut x = -0.707_11 * ((2.307_53 + t * 0.270_61) / (1.0 + t * (0.992_29 + t * 0.044_81)) - t);
    for _ in 0..2 {
        let err = erfc(x) - y;
        x += err / (1.128_379_167_095_512_6 * (-(x * x)).exp() - x * err);
    }
    if lower {
        x
    } else {
        -x
    }
}

/// Standard normal density.
pub fn pdf(x: f64) -> f64 {
    (-x * x / 2.0).exp() / (2.0 * PI).sqrt()
}

/// Standard normal cumulative distribution.
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal quantile.
pub fn ppf(p: f64) -> f64 {
    -SQRT_2 * erfcinv(2.0 * p)
}

// =============================================================================
// Truncated Gaussian corrections
// =============================================================================

/// Mean correction for a decisive result with normalised margin `t`.
pub fn v_win(t: f64, epsilon: f64) -> f64 {
    let x = t - epsilon;
    let denom = cdf(x);
    if denom > TINY {
        pdf(x) / denom
    } else {
        -x
    }
}

/// Variance correction for a decisive result, in `[0, 1]`.
pub fn w_win(t: f64, epsilon: f64) -> f64 {
    let x = t - epsilon;
    let v = v_win(t, epsilon);
    (v * (v + x)).clamp(0.0, 1.0)
}

/// Mean correction for a draw.
pub fn v_draw(t: f64, epsilon: f64) -> f64 {
    let abs = t.abs();
    let a = epsilon - abs;
    let b = -epsilon - abs;
    let denom = cdf(a) - cdf(b);
    let v = if denom > TINY {
        (pdf(b) - pdf(a)) / denom
    } else {
        a
    };
    if t < 0.0 {
        -v
    } else {
        v
    }
}

/// Variance correction for a draw, in `[0, 1]`.
pub fn w_draw(t: f64, epsilon: f64) -> f64 {
    let abs = t.abs();
    let a = epsilon - abs;
    let b = -epsilon - abs;
    let denom = cdf(a) - cdf(b);
    if denom <= TINY {
        return 1.0;
    }
    let v = v_draw(abs, epsilon);
    (v * v + (a * pdf(a) - b * pdf(b)) / denom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_known_values() {
        assert!((cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((cdf(1.0) - 0.841_344_7).abs() < 1e-6);
        assert!((cdf(-1.959_964) - 0.025).abs() < 1e-6);
    }

    #[test]
    fn ppf_inverts_cdf() {
        for p in [0.05, 0.25, 0.5, 0.55, 0.9, 0.99] {
            assert!((cdf(ppf(p)) - p).abs() < 1e-6, "p = {p}");
        }
    }

    #[test]
    fn win_corrections_are_positive() {
        for t in [-2.0, 0.0, 1.5] {
            assert!(v_win(t, 0.1) > 0.0);
            let w = w_win(t, 0.1);
            assert!(w > 0.0 && w < 1.0);
        }
    }

    #[test]
    fn draw_pulls_toward_each_other() {
        assert!(v_draw(1.0, 0.2) < 0.0);
        assert!(v_draw(-1.0, 0.2) > 0.0);
        assert!(v_draw(0.0, 0.2).abs() < 1e-12);
    }

    #[test]
    fn huge_upset_stays_finite() {
        assert!(v_win(-60.0, 0.0).is_finite());
        assert!(w_win(-60.0, 0.0) <= 1.0);
    }
}
