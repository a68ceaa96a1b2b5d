//! Arithmetic on band arrays
//!
//! Dividing bands routinely meets zero denominators over water or shadow.
//! What happens to the resulting NaN and infinity values is decided by an
//! explicit policy rather than by global floating point state.

use std::str::FromStr;

use log::debug;
use ndarray::{Array2, Zip};

use crate::errors::{BandKitError, BandKitResult};

/// How non-finite results of band arithmetic are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArithmeticPolicy {
    /// NaN and infinity flow through silently
    #[default]
    Propagate,
    /// Any NaN or infinity is an error
    Reject,
}

impl ArithmeticPolicy {
    /// Checks `values` against the policy
    pub fn check(self, values: &Array2<f32>, label: &str) -> BandKitResult<()> {
        let count = values.iter().filter(|v| !v.is_finite()).count();
        if count == 0 {
            return Ok(());
        }

        match self {
            ArithmeticPolicy::Propagate => {
                debug!("{} carries {} non-finite value(s)", label, count);
                Ok(())
            }
            ArithmeticPolicy::Reject => Err(BandKitError::NonFiniteValues {
                label: label.to_string(),
                count,
            }),
        }
    }

    /// Element-wise `numerator / denominator`
    pub fn ratio(self, numerator: &Array2<f32>, denominator: &Array2<f32>) -> BandKitResult<Array2<f32>> {
        same_shape(numerator, denominator)?;
        let result = Zip::from(numerator).and(denominator).map_collect(|&n, &d| n / d);
        self.check(&result, "ratio")?;
        Ok(result)
    }

    /// Element-wise `(a - b) / (a + b)`, the shape of NDVI-style indices
    pub fn normalized_difference(self, a: &Array2<f32>, b: &Array2<f32>) -> BandKitResult<Array2<f32>> {
        same_shape(a, b)?;
        let result = Zip::from(a).and(b).map_collect(|&x, &y| (x - y) / (x + y));
        self.check(&result, "normalized difference")?;
        Ok(result)
    }

    pub fn name(self) -> &'static str {
        match self {
            ArithmeticPolicy::Propagate => "propagate",
            ArithmeticPolicy::Reject => "reject",
        }
    }
}

impl FromStr for ArithmeticPolicy {
    type Err = BandKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "propagate" => Ok(ArithmeticPolicy::Propagate),
            "reject" => Ok(ArithmeticPolicy::Reject),
            _ => Err(BandKitError::InvalidArgument(format!("Unknown arithmetic policy: {}", s))),
        }
    }
}

fn same_shape(a: &Array2<f32>, b: &Array2<f32>) -> BandKitResult<()> {
    if a.dim() != b.dim() {
        return Err(BandKitError::ShapeMismatch { expected: a.dim(), found: b.dim() });
    }
    Ok(())
}
