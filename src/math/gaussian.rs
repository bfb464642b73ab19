//! One-dimensional Gaussian beliefs
//!
//! A [`GaussianBelief`] is kept in both the standard `(mean, standard deviation)`
//! form and the canonical `(precision mean, precision)` form. Combining
//! independent evidence is addition in precision space, removing it is
//! subtraction, so products and quotients of beliefs never lose track of either
//! parameterization.

use std::f64::consts::PI;

/// `-1/sqrt(2)`, maps a standard score onto the erfc argument
const NEG_INV_SQRT_2: f64 = -0.707_106_781_186_547_524_400_844_362_104;

/// Chebyshev coefficients for erfc, evaluated with Clenshaw's recurrence.
/// Order and values are fixed so results are identical on every platform.
const ERFC_COEFFICIENTS: [f64; 28] = [
    -1.302_653_719_781_709_4,
    6.419_697_923_564_902_6e-1,
    1.947_647_320_418_583_6e-2,
    -9.561_514_786_808_631e-3,
    -9.465_953_444_820_36e-4,
    3.668_394_978_527_61e-4,
    4.252_332_480_690_7e-5,
    -2.027_857_811_253_4e-5,
    -1.624_290_004_647e-6,
    1.303_655_835_580e-6,
    1.562_644_172_2e-8,
    -8.523_809_591_5e-8,
    6.529_054_439e-9,
    5.059_343_495e-9,
    -9.913_641_56e-10,
    -2.273_651_22e-10,
    9.646_791_1e-11,
    2.394_038e-12,
    -6.886_027e-12,
    8.944_87e-13,
    3.130_92e-13,
    -1.127_08e-13,
    3.81e-16,
    7.106e-15,
    -1.523e-15,
    -9.4e-17,
    1.21e-16,
    -2.8e-17,
];

/// Immutable normal distribution over a participant's skill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBelief {
    mean: f64,
    standard_deviation: f64,
    variance: f64,
    precision: f64,
    precision_mean: f64,
}

impl GaussianBelief {
    /// Build a belief from its standard parameterization.
    ///
    /// `standard_deviation` must be strictly positive; callers validate
    /// external input before it reaches this constructor.
    pub fn from_mean_and_deviation(mean: f64, standard_deviation: f64) -> Self {
        debug_assert!(
            standard_deviation > 0.0,
            "standard deviation must be positive, got {standard_deviation}"
        );
        let variance = standard_deviation * standard_deviation;
        let precision = 1.0 / variance;
        Self {
            mean,
            standard_deviation,
            variance,
            precision,
            precision_mean: precision * mean,
        }
    }

    /// Build a belief from its canonical parameterization.
    ///
    /// A precision of zero yields the uninformative belief: infinite variance
    /// and a mean of zero.
    pub fn from_precision(precision_mean: f64, precision: f64) -> Self {
        let variance = 1.0 / precision;
        let mean = if precision == 0.0 {
            0.0
        } else {
            precision_mean / precision
        };
        Self {
            mean,
            standard_deviation: variance.sqrt(),
            variance,
            precision,
            precision_mean,
        }
    }

    /// Belief carrying no information at all
    pub fn uninformative() -> Self {
        Self::from_precision(0.0, 0.0)
    }

    /// The standard normal N(0, 1)
    pub fn standard() -> Self {
        Self::from_mean_and_deviation(0.0, 1.0)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn precision_mean(&self) -> f64 {
        self.precision_mean
    }

    /// Combine two independent pieces of evidence
    pub fn multiply(&self, other: &GaussianBelief) -> GaussianBelief {
        Self::from_precision(
            self.precision_mean + other.precision_mean,
            self.precision + other.precision,
        )
    }

    /// Remove evidence previously folded in with [`multiply`](Self::multiply)
    pub fn divide(&self, other: &GaussianBelief) -> GaussianBelief {
        Self::from_precision(
            self.precision_mean - other.precision_mean,
            self.precision - other.precision,
        )
    }

    /// Convergence measure between two beliefs; not a metric
    pub fn distance(&self, other: &GaussianBelief) -> f64 {
        let precision_mean_gap = (self.precision_mean - other.precision_mean).abs();
        let precision_gap = (self.precision - other.precision).abs().sqrt();
        precision_mean_gap.max(precision_gap)
    }

    /// Probability density at `x`
    pub fn density_at(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.standard_deviation;
        let multiplier = 1.0 / (self.standard_deviation * (2.0 * PI).sqrt());
        multiplier * (-0.5 * z * z).exp()
    }

    /// Cumulative probability at `x`
    pub fn cumulative_at(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.standard_deviation;
        0.5 * erfc(NEG_INV_SQRT_2 * z)
    }

    /// Log of the normalization constant of `a * b`.
    ///
    /// Zero when either belief is uninformative.
    pub fn log_product_normalization(a: &GaussianBelief, b: &GaussianBelief) -> f64 {
        if a.precision == 0.0 || b.precision == 0.0 {
            return 0.0;
        }

        let variance_sum = a.variance + b.variance;
        let mean_difference = a.mean - b.mean;
        -log_sqrt_2pi()
            - variance_sum.ln() / 2.0
            - mean_difference * mean_difference / (2.0 * variance_sum)
    }

    /// Log of the normalization constant of `numerator / denominator`.
    ///
    /// Zero when either belief is uninformative, or when the quotient would not
    /// be a proper distribution (denominator no wider than numerator).
    pub fn log_ratio_normalization(numerator: &GaussianBelief, denominator: &GaussianBelief) -> f64 {
        if numerator.precision == 0.0 || denominator.precision == 0.0 {
            return 0.0;
        }

        let variance_difference = denominator.variance - numerator.variance;
        if variance_difference <= 0.0 {
            return 0.0;
        }
        let mean_difference = numerator.mean - denominator.mean;
        denominator.variance.ln() + log_sqrt_2pi()
            - variance_difference.ln() / 2.0
            + mean_difference * mean_difference / (2.0 * variance_difference)
    }
}

fn log_sqrt_2pi() -> f64 {
    (2.0 * PI).sqrt().ln()
}

/// Complementary error function, accurate to about 1e-16 relative
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 2.0 / (2.0 + z);
    let ty = 4.0 * t - 2.0;

    let mut d = 0.0;
    let mut dd = 0.0;
    for coefficient in ERFC_COEFFICIENTS[1..].iter().rev() {
        let previous = d;
        d = ty * d - dd + coefficient;
        dd = previous;
    }

    let result = t * (-z * z + 0.5 * (ERFC_COEFFICIENTS[0] + ty * d) - dd).exp();
    if x >= 0.0 {
        result
    } else {
        2.0 - result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::approx_eq;

    #[test]
    fn test_both_forms_agree() {
        let belief = GaussianBelief::from_mean_and_deviation(25.0, 3.0);
        assert_eq!(belief.variance(), 9.0);
        assert!(approx_eq(belief.precision(), 1.0 / 9.0, 1e-15));
        assert!(approx_eq(belief.precision_mean(), 25.0 / 9.0, 1e-15));

        let round_trip =
            GaussianBelief::from_precision(belief.precision_mean(), belief.precision());
        assert!(approx_eq(round_trip.mean(), 25.0, 1e-12));
        assert!(approx_eq(round_trip.standard_deviation(), 3.0, 1e-12));
    }

    #[test]
    fn test_multiply_adds_precision() {
        let a = GaussianBelief::from_mean_and_deviation(4.0, 5.0);
        let b = GaussianBelief::from_mean_and_deviation(6.0, 7.0);
        let product = a.multiply(&b);

        // Reference values for N(4, 5^2) * N(6, 7^2)
        assert!(approx_eq(product.mean(), 4.675_675_675_675_675, 1e-9));
        assert!(approx_eq(product.standard_deviation(), 4.068_667_356_033_675, 1e-9));
        assert!(approx_eq(product.precision(), a.precision() + b.precision(), 1e-15));
    }

    #[test]
    fn test_divide_removes_evidence() {
        let prior = GaussianBelief::from_mean_and_deviation(25.0, 3.0);
        let evidence = GaussianBelief::from_mean_and_deviation(30.0, 5.0);
        let restored = prior.multiply(&evidence).divide(&evidence);

        assert!(approx_eq(restored.mean(), prior.mean(), 1e-9));
        assert!(approx_eq(restored.standard_deviation(), prior.standard_deviation(), 1e-9));
        assert!(restored.distance(&prior) < 1e-9);
    }

    #[test]
    fn test_distance() {
        let a = GaussianBelief::from_precision(1.0, 2.0);
        let b = GaussianBelief::from_precision(1.5, 6.0);
        // max(|1.0 - 1.5|, sqrt(|2.0 - 6.0|))
        assert_eq!(a.distance(&b), 2.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_density() {
        let standard = GaussianBelief::standard();
        assert!(approx_eq(standard.density_at(0.0), 0.398_942_280_401_432_7, 1e-12));
        assert!(approx_eq(standard.density_at(1.0), 0.241_970_724_519_143_37, 1e-12));
        assert_eq!(standard.density_at(2.0), standard.density_at(-2.0));

        let wide = GaussianBelief::from_mean_and_deviation(10.0, 2.0);
        assert!(approx_eq(wide.density_at(10.0), 0.398_942_280_401_432_7 / 2.0, 1e-12));
    }

    #[test]
    fn test_cumulative() {
        let standard = GaussianBelief::standard();
        assert!(approx_eq(standard.cumulative_at(0.0), 0.5, 1e-9));
        assert!(approx_eq(standard.cumulative_at(1.0), 0.841_344_746_068_542_9, 1e-10));
        assert!(approx_eq(standard.cumulative_at(-1.96), 0.024_997_895_148_220_43, 1e-10));
        assert!(standard.cumulative_at(40.0) > 1.0 - 1e-12);
        assert!(standard.cumulative_at(-40.0) < 1e-12);

        let shifted = GaussianBelief::from_mean_and_deviation(25.0, 3.0);
        assert!(approx_eq(shifted.cumulative_at(28.0), 0.841_344_746_068_542_9, 1e-10));
    }

    #[test]
    fn test_erfc_reference_values() {
        assert!(approx_eq(erfc(0.0), 1.0, 1e-15));
        assert!(approx_eq(erfc(0.5), 0.479_500_122_186_953_5, 1e-12));
        assert!(approx_eq(erfc(-0.5), 1.520_499_877_813_046_5, 1e-12));
        assert!(approx_eq(erfc(2.0), 0.004_677_734_981_047_266, 1e-12));
    }

    #[test]
    fn test_normalizations_ignore_uninformative() {
        let belief = GaussianBelief::from_mean_and_deviation(25.0, 3.0);
        let flat = GaussianBelief::uninformative();

        assert_eq!(GaussianBelief::log_product_normalization(&belief, &flat), 0.0);
        assert_eq!(GaussianBelief::log_product_normalization(&flat, &belief), 0.0);
        assert_eq!(GaussianBelief::log_ratio_normalization(&belief, &flat), 0.0);
        assert_eq!(GaussianBelief::log_ratio_normalization(&flat, &belief), 0.0);
    }

    #[test]
    fn test_log_product_normalization() {
        let a = GaussianBelief::from_mean_and_deviation(0.0, 1.0);
        let b = GaussianBelief::from_mean_and_deviation(0.0, 1.0);
        // Density of N(0, 2) at zero
        let expected = (1.0 / (2.0 * (PI).sqrt())).ln();
        assert!(approx_eq(
            GaussianBelief::log_product_normalization(&a, &b),
            expected,
            1e-12
        ));

        let far = GaussianBelief::from_mean_and_deviation(10.0, 1.0);
        assert!(
            GaussianBelief::log_product_normalization(&a, &far)
                < GaussianBelief::log_product_normalization(&a, &b)
        );
    }

    #[test]
    fn test_log_ratio_normalization() {
        let numerator = GaussianBelief::from_mean_and_deviation(1.0, 1.0);
        let denominator = GaussianBelief::from_mean_and_deviation(0.0, 2.0);
        // ln(4) + ln(sqrt(2 pi)) - ln(3)/2 + 1/6
        let expected = 4.0_f64.ln() + log_sqrt_2pi() - 3.0_f64.ln() / 2.0 + 1.0 / 6.0;
        assert!(approx_eq(
            GaussianBelief::log_ratio_normalization(&numerator, &denominator),
            expected,
            1e-12
        ));

        // Denominator narrower than numerator is not a proper quotient
        assert_eq!(
            GaussianBelief::log_ratio_normalization(&denominator, &numerator),
            0.0
        );
    }

    #[test]
    fn test_uninformative_is_neutral_for_products() {
        let belief = GaussianBelief::from_mean_and_deviation(12.0, 4.0);
        let product = belief.multiply(&GaussianBelief::uninformative());
        assert!(approx_eq(product.mean(), 12.0, 1e-12));
        assert!(approx_eq(product.standard_deviation(), 4.0, 1e-12));
    }
}
