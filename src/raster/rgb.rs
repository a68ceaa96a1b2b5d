//! The three bands of an RGB composite

use ndarray::Array2;

use crate::errors::{BandKitError, BandKitResult};

use super::numeric::ArithmeticPolicy;

/// Red, green and blue planes of identical shape `(height, width)`
#[derive(Debug, Clone, PartialEq)]
pub struct RgbBands {
    pub red: Array2<f32>,
    pub green: Array2<f32>,
    pub blue: Array2<f32>,
}

impl RgbBands {
    /// Groups three planes, failing if their shapes differ
    pub fn new(red: Array2<f32>, green: Array2<f32>, blue: Array2<f32>) -> BandKitResult<Self> {
        for plane in [&green, &blue] {
            if plane.dim() != red.dim() {
                return Err(BandKitError::ShapeMismatch { expected: red.dim(), found: plane.dim() });
            }
        }
        Ok(RgbBands { red, green, blue })
    }

    /// `(height, width)`
    pub fn dim(&self) -> (usize, usize) {
        self.red.dim()
    }

    /// True if any plane holds no pixels
    pub fn is_empty(&self) -> bool {
        self.planes().iter().any(|p| p.is_empty())
    }

    /// Planes in output band order
    pub fn planes(&self) -> [&Array2<f32>; 3] {
        [&self.red, &self.green, &self.blue]
    }

    /// Applies `policy` to every plane
    pub fn check(&self, policy: ArithmeticPolicy) -> BandKitResult<()> {
        for (plane, label) in self.planes().into_iter().zip(["red band", "green band", "blue band"]) {
            policy.check(plane, label)?;
        }
        Ok(())
    }
}
