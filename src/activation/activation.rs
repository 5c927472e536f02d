use serde::{Deserialize, Serialize};
use std::f64::consts::E;

use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    /// Normalizes each row jointly, so unlike the others an output element
    /// depends on the whole row.
    Softmax,
    Tanh,
}

impl ActivationFunction {
    /// Applies the activation to every row of `input`. The result has the
    /// same shape.
    pub fn function(&self, input: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Sigmoid => input.map(|x| 1.0 / (1.0 + E.powf(-x))),
            ActivationFunction::Tanh => input.map(f64::tanh),
            ActivationFunction::Softmax => softmax_rows(input),
        }
    }

    /// Derivative in terms of the activation's *output* `y`, not its input.
    ///
    /// For `Softmax` this is the diagonal `y(1 - y)` term only, which is the
    /// convention the backward pass is built around.
    pub fn derivative(&self, y: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid | ActivationFunction::Softmax => y * (1.0 - y),
            ActivationFunction::Tanh => 1.0 - y * y,
        }
    }
}

fn softmax_rows(input: &Matrix) -> Matrix {
    input.map_rows(|row| {
        // Shifting by the max leaves the ratios unchanged and keeps exp() finite.
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = row.iter().map(|x| (x - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[f64]) -> Matrix {
        Matrix::row_vector(values.to_vec())
    }

    const SAMPLES: [f64; 7] = [-30.0, -5.0, -0.5, 0.0, 0.5, 5.0, 30.0];

    #[test]
    fn sigmoid_is_in_open_unit_interval() {
        let out = ActivationFunction::Sigmoid.function(&row(&[-20.0, -1.0, 0.0, 1.0, 20.0]));
        for &y in out.row(0).unwrap() {
            assert!(y > 0.0 && y < 1.0, "{y}");
        }
        assert!((out.get(0, 2).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn softmax_row_sums_to_one() {
        let out = ActivationFunction::Softmax.function(&row(&SAMPLES));
        let values = out.row(0).unwrap();
        let sum: f64 = values.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for &y in values {
            assert!(y > 0.0 && y < 1.0, "{y}");
        }
    }

    #[test]
    fn softmax_preserves_ratios() {
        let out = ActivationFunction::Softmax.function(&row(&[1.0, 2.0, 3.0]));
        let v = out.row(0).unwrap();
        assert!((v[1] / v[0] - 1.0_f64.exp()).abs() < 1e-9);
        assert!((v[2] / v[0] - 2.0_f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn softmax_normalizes_each_row_separately() {
        let input = Matrix::from_data(vec![vec![0.0, 0.0], vec![1000.0, 1000.0]]).unwrap();
        let out = ActivationFunction::Softmax.function(&input);
        assert_eq!(out.row(0).unwrap(), &[0.5, 0.5]);
        assert_eq!(out.row(1).unwrap(), &[0.5, 0.5]);
    }

    #[test]
    fn tanh_is_in_open_interval() {
        let out = ActivationFunction::Tanh.function(&row(&[-10.0, -0.3, 0.0, 0.3, 10.0]));
        for &y in out.row(0).unwrap() {
            assert!(y > -1.0 && y < 1.0);
        }
    }

    #[test]
    fn derivatives_take_the_output_value() {
        assert_eq!(ActivationFunction::Sigmoid.derivative(0.25), 0.25 * 0.75);
        assert_eq!(ActivationFunction::Softmax.derivative(0.5), 0.25);
        assert_eq!(ActivationFunction::Tanh.derivative(0.5), 0.75);
    }

    #[test]
    fn parses_lowercase_names() {
        let parsed: Vec<ActivationFunction> =
            serde_json::from_str(r#"["sigmoid", "softmax", "tanh"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                ActivationFunction::Sigmoid,
                ActivationFunction::Softmax,
                ActivationFunction::Tanh
            ]
        );
    }
}
