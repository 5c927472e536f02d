use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Mean of `(predicted - expected)²` over every element of two
    /// equal-shape matrices.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        if predicted.shape() != expected.shape() {
            return Err(NnError::shape("MseLoss::loss", expected.shape(), predicted.shape()));
        }

        let n = (predicted.rows() * predicted.cols()) as f64;
        let mut total = 0.0;
        for i in 0..predicted.rows() {
            total += predicted
                .row(i)?
                .iter()
                .zip(expected.row(i)?)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
        Ok(total / n)
    }
}
