//! Statistical significance for two-variant conversion tests.
//!
//! All normal-distribution math used by the engine lives here. The error
//! function is the Abramowitz & Stegun formula 7.1.26 approximation, whose
//! absolute error is bounded by 1.5e-7 over the real line. Decisions about
//! auto-concluding tests depend on these exact coefficients, so they must not
//! be swapped for another approximation.

/// Minimum impressions each variant needs before a confidence is reported.
pub const MIN_IMPRESSIONS: u64 = 100;

/// Upper bound on reported confidence, in percent.
pub const MAX_CONFIDENCE: f64 = 99.9;

const A1: f64 = 0.254_829_592;
const A2: f64 = -0.284_496_736;
const A3: f64 = 1.421_413_741;
const A4: f64 = -1.453_152_027;
const A5: f64 = 1.061_405_429;
const P: f64 = 0.327_591_1;

/// Conversions observed over a number of impressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSample {
    pub conversions: u64,
    pub impressions: u64,
}

impl ConversionSample {
    pub fn new(conversions: u64, impressions: u64) -> Self {
        Self {
            conversions,
            impressions,
        }
    }

    pub fn rate(&self) -> f64 {
        self.conversions as f64 / self.impressions as f64
    }
}

/// Error function, A&S 7.1.26.
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Two-tailed two-proportion z statistic under the pooled null hypothesis.
///
/// Returns `None` when the standard error is zero, which happens when neither
/// or both variants converted on every impression.
pub fn z_score(a: ConversionSample, b: ConversionSample) -> Option<f64> {
    let pooled = (a.conversions + b.conversions) as f64 / (a.impressions + b.impressions) as f64;
    let se = (pooled
        * (1.0 - pooled)
        * (1.0 / a.impressions as f64 + 1.0 / b.impressions as f64))
        .sqrt();

    if se == 0.0 || !se.is_finite() {
        return None;
    }
    Some((a.rate() - b.rate()).abs() / se)
}

/// Confidence (percent, one decimal, capped at 99.9) that the conversion
/// rates of `a` and `b` differ.
///
/// Returns `None` when either sample has fewer than [`MIN_IMPRESSIONS`].
/// Samples without any spread between them report `0.0`.
pub fn two_proportion_confidence(a: ConversionSample, b: ConversionSample) -> Option<f64> {
    if a.impressions < MIN_IMPRESSIONS || b.impressions < MIN_IMPRESSIONS {
        return None;
    }

    let Some(z) = z_score(a, b) else {
        return Some(0.0);
    };

    let confidence = ((1.0 - 2.0 * (1.0 - normal_cdf(z.abs()))) * 100.0).min(MAX_CONFIDENCE);
    Some(round_to(confidence, 1))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_known_values() {
        assert!(erf(0.0).abs() < 1e-8);
        assert!((erf(1.0) - 0.842_700_79).abs() < 2e-7);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 2e-7);
        assert!((erf(2.0) - 0.995_322_27).abs() < 2e-7);
        assert!((erf(0.5) - 0.520_499_88).abs() < 2e-7);
    }

    #[test]
    fn test_normal_cdf_known_values() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-8);
        assert!((normal_cdf(1.96) - 0.975_002_1).abs() < 1e-6);
        assert!((normal_cdf(-1.96) - 0.024_997_9).abs() < 1e-6);
    }

    #[test]
    fn test_insufficient_impressions() {
        let a = ConversionSample::new(5, 99);
        let b = ConversionSample::new(50, 1000);
        assert_eq!(two_proportion_confidence(a, b), None);
        assert_eq!(two_proportion_confidence(b, a), None);
    }

    #[test]
    fn test_exactly_minimum_impressions() {
        let a = ConversionSample::new(5, 100);
        let b = ConversionSample::new(10, 100);
        assert!(two_proportion_confidence(a, b).is_some());
    }

    #[test]
    fn test_strong_difference_caps_at_max() {
        let a = ConversionSample::new(50, 1000);
        let b = ConversionSample::new(90, 1000);

        let z = z_score(a, b).unwrap();
        assert!((z - 3.506).abs() < 0.01, "z was {z}");
        assert_eq!(two_proportion_confidence(a, b), Some(99.9));
    }

    #[test]
    fn test_moderate_difference() {
        // pA = 0.05, pB = 0.06, pooled = 0.055, SE ~ 0.0102, z ~ 0.98
        let a = ConversionSample::new(50, 1000);
        let b = ConversionSample::new(60, 1000);
        let confidence = two_proportion_confidence(a, b).unwrap();
        assert!((confidence - 67.3).abs() < 0.2, "confidence was {confidence}");
    }

    #[test]
    fn test_identical_rates_zero_confidence() {
        let a = ConversionSample::new(30, 600);
        let b = ConversionSample::new(30, 600);
        assert_eq!(two_proportion_confidence(a, b), Some(0.0));
    }

    #[test]
    fn test_no_conversions_zero_confidence() {
        let a = ConversionSample::new(0, 500);
        let b = ConversionSample::new(0, 500);
        assert_eq!(two_proportion_confidence(a, b), Some(0.0));
    }

    #[test]
    fn test_symmetric() {
        let a = ConversionSample::new(32, 2500);
        let b = ConversionSample::new(41, 2500);
        assert_eq!(
            two_proportion_confidence(a, b),
            two_proportion_confidence(b, a)
        );
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(7.204, 2) - 7.2).abs() < f64::EPSILON);
        assert!((round_to(17.777, 2) - 17.78).abs() < 1e-9);
        assert!((round_to(96.25, 1) - 96.3).abs() < 1e-9);
    }
}
