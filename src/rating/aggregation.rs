//! Side aggregation strategies
//!
//! Before a match is resolved, each side is reduced to one belief. The default
//! takes the plain arithmetic mean of member means and deviations. It is not a
//! pooled Gaussian, but rating histories depend on it, so it stays the default
//! and alternatives plug in through [`SideAggregator`].

use crate::math::GaussianBelief;

/// Reduces the beliefs of one side's members to a single belief.
///
/// Callers never pass an empty slice.
pub trait SideAggregator: Send + Sync {
    fn aggregate(&self, members: &[GaussianBelief]) -> GaussianBelief;
}

/// Unweighted mean of member means and of member deviations
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticMeanAggregator;

impl SideAggregator for ArithmeticMeanAggregator {
    fn aggregate(&self, members: &[GaussianBelief]) -> GaussianBelief {
        let count = members.len() as f64;
        let mean = members.iter().map(GaussianBelief::mean).sum::<f64>() / count;
        let deviation = members
            .iter()
            .map(GaussianBelief::standard_deviation)
            .sum::<f64>()
            / count;
        GaussianBelief::from_mean_and_deviation(mean, deviation)
    }
}

impl<F> SideAggregator for F
where
    F: Fn(&[GaussianBelief]) -> GaussianBelief + Send + Sync,
{
    fn aggregate(&self, members: &[GaussianBelief]) -> GaussianBelief {
        self(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_mean() {
        let members = [
            GaussianBelief::from_mean_and_deviation(20.0, 2.0),
            GaussianBelief::from_mean_and_deviation(30.0, 4.0),
        ];
        let side = ArithmeticMeanAggregator.aggregate(&members);
        assert_eq!(side.mean(), 25.0);
        assert_eq!(side.standard_deviation(), 3.0);
    }

    #[test]
    fn test_single_member_is_unchanged() {
        let member = GaussianBelief::from_mean_and_deviation(27.0, 1.5);
        let side = ArithmeticMeanAggregator.aggregate(&[member]);
        assert_eq!(side, member);
    }

    #[test]
    fn test_closure_strategy() {
        let strongest = |members: &[GaussianBelief]| {
            members
                .iter()
                .copied()
                .fold(members[0], |best, m| if m.mean() > best.mean() { m } else { best })
        };
        let members = [
            GaussianBelief::from_mean_and_deviation(20.0, 2.0),
            GaussianBelief::from_mean_and_deviation(30.0, 4.0),
        ];
        assert_eq!(strongest.aggregate(&members).mean(), 30.0);
    }
}
