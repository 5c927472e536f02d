use rand::Rng;
use tracing::debug;

use crate::{
    activation::activation::ActivationFunction,
    error::{NnError, Result},
    math::matrix::Matrix,
};

/// One fully connected stage: `output = f(input x weights + biases)`.
///
/// A layer keeps the input and output of its most recent forward pass.
/// [`Layer::backpropagate`] reads those cached rows, so it must follow the
/// `feed_forward` call for the same example with no other forward pass in
/// between.
///
/// Deltas are accumulated across `backpropagate` calls and only applied by
/// [`Layer::update_weights`], which makes them a mini-batch accumulator.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    biases: Matrix,
    weight_deltas: Matrix,
    bias_deltas: Matrix,
    input_nodes: Matrix,
    output_nodes: Matrix,
    pending_input_error: Vec<f64>,
    activation: ActivationFunction,
    learning_rate: f64,
}

impl Layer {
    /// Weights are drawn uniformly from `[-1, 1]`; biases start at zero.
    pub fn new<R: Rng + ?Sized>(
        input_dims: usize,
        output_dims: usize,
        activation: ActivationFunction,
        learning_rate: f64,
        rng: &mut R,
    ) -> Layer {
        let weights = Matrix::random_uniform(input_dims, output_dims, -1.0, 1.0, rng);
        debug!(input_dims, output_dims, ?activation, learning_rate, "created layer");
        Layer::with_weights(weights, Matrix::zeros(1, output_dims), activation, learning_rate)
    }

    /// Builds a layer around known weights and biases. `biases` must be a
    /// `1 x weights.cols()` row.
    pub fn from_parts(
        weights: Matrix,
        biases: Matrix,
        activation: ActivationFunction,
        learning_rate: f64,
    ) -> Result<Layer> {
        if biases.shape() != (1, weights.cols()) {
            return Err(NnError::Configuration(format!(
                "bias must be 1x{}, got {}x{}",
                weights.cols(),
                biases.rows(),
                biases.cols()
            )));
        }
        Ok(Layer::with_weights(weights, biases, activation, learning_rate))
    }

    fn with_weights(
        weights: Matrix,
        biases: Matrix,
        activation: ActivationFunction,
        learning_rate: f64,
    ) -> Layer {
        let (input_dims, output_dims) = weights.shape();
        Layer {
            weight_deltas: Matrix::zeros(input_dims, output_dims),
            bias_deltas: Matrix::zeros(1, output_dims),
            input_nodes: Matrix::zeros(1, input_dims),
            output_nodes: Matrix::zeros(1, output_dims),
            pending_input_error: vec![0.0; input_dims],
            weights,
            biases,
            activation,
            learning_rate,
        }
    }

    pub fn input_dims(&self) -> usize {
        self.weights.rows()
    }

    pub fn output_dims(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Output row of the most recent forward pass (zeros before the first).
    pub fn output_nodes(&self) -> &Matrix {
        &self.output_nodes
    }

    pub fn feed_forward(&mut self, input: &Matrix) -> Result<()> {
        let raw = input.matrix_multiply(&self.weights)?;
        let biased = raw.elementwise_sum(&self.biases)?;
        self.output_nodes = self.activation.function(&biased);
        self.input_nodes = input.clone();
        Ok(())
    }

    /// Accumulates weight and bias deltas for one example and adds this
    /// layer's contribution to the error terms of its input nodes.
    ///
    /// `error_terms[j]` is the error on output node `j`, supplied by the next
    /// layer or, for the last layer, by the loss.
    pub fn backpropagate(&mut self, error_terms: &[f64]) -> Result<()> {
        let (rows, cols) = self.weights.shape();
        if error_terms.len() != cols {
            return Err(NnError::shape(
                "Layer::backpropagate",
                (1, cols),
                (1, error_terms.len()),
            ));
        }

        for row in 0..rows {
            let previous_activation = self.input_nodes.get(0, row)?;

            for col in 0..cols {
                let weight = self.weights.get(row, col)?;
                let node_output = self.output_nodes.get(0, col)?;
                let local_error = error_terms[col] * self.activation.derivative(node_output);

                self.pending_input_error[row] += local_error * weight;

                let weight_delta = self.weight_deltas.get(row, col)?
                    + self.learning_rate * local_error * previous_activation;
                self.weight_deltas.set(weight_delta, row, col)?;

                let bias_delta = self.bias_deltas.get(0, col)? + self.learning_rate * local_error;
                self.bias_deltas.set(bias_delta, 0, col)?;
            }
        }

        Ok(())
    }

    /// Returns the error terms collected for this layer's inputs and zeroes
    /// them for the next backward pass.
    pub fn retrieve_and_reset_propagated_error(&mut self) -> Vec<f64> {
        let n = self.pending_input_error.len();
        std::mem::replace(&mut self.pending_input_error, vec![0.0; n])
    }

    /// Commits the accumulated deltas and clears the accumulators.
    pub fn update_weights(&mut self) -> Result<()> {
        self.weights = self.weights.elementwise_sum(&self.weight_deltas)?;
        self.biases = self.biases.elementwise_sum(&self.bias_deltas)?;
        self.weight_deltas = Matrix::zeros(self.input_dims(), self.output_dims());
        self.bias_deltas = Matrix::zeros(1, self.output_dims());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn two_by_two() -> Layer {
        let weights = Matrix::from_data(vec![vec![0.1, -0.2], vec![0.3, 0.4]]).unwrap();
        let biases = Matrix::row_vector(vec![0.05, -0.05]);
        Layer::from_parts(weights, biases, ActivationFunction::Sigmoid, 0.5).unwrap()
    }

    #[test]
    fn new_layer_has_bounded_weights_and_zero_bias() {
        let mut rng = StdRng::seed_from_u64(42);
        let layer = Layer::new(3, 4, ActivationFunction::Tanh, 0.1, &mut rng);

        assert_eq!(layer.weights().shape(), (3, 4));
        assert_eq!(layer.biases(), &Matrix::zeros(1, 4));
        for row in 0..3 {
            assert!(layer
                .weights()
                .row(row)
                .unwrap()
                .iter()
                .all(|w| (-1.0..=1.0).contains(w)));
        }
    }

    #[test]
    fn same_seed_gives_same_weights() {
        let a = Layer::new(2, 3, ActivationFunction::Sigmoid, 0.1, &mut StdRng::seed_from_u64(1));
        let b = Layer::new(2, 3, ActivationFunction::Sigmoid, 0.1, &mut StdRng::seed_from_u64(1));
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn from_parts_rejects_wrong_bias_shape() {
        let err = Layer::from_parts(
            Matrix::zeros(2, 3),
            Matrix::zeros(1, 2),
            ActivationFunction::Sigmoid,
            0.1,
        )
        .unwrap_err();
        assert!(matches!(err, NnError::Configuration(_)));
    }

    #[test]
    fn feed_forward_applies_weights_bias_and_activation() {
        let mut layer = two_by_two();
        layer.feed_forward(&Matrix::row_vector(vec![1.0, 2.0])).unwrap();

        let z0 = 1.0 * 0.1 + 2.0 * 0.3 + 0.05;
        let z1 = 1.0 * -0.2 + 2.0 * 0.4 - 0.05;
        let out = layer.output_nodes();
        assert!((out.get(0, 0).unwrap() - sigmoid(z0)).abs() < 1e-12);
        assert!((out.get(0, 1).unwrap() - sigmoid(z1)).abs() < 1e-12);
    }

    #[test]
    fn backpropagate_accumulates_until_update() {
        let mut layer = two_by_two();
        let input = Matrix::row_vector(vec![1.0, 2.0]);
        let before = layer.weights().clone();

        layer.feed_forward(&input).unwrap();
        layer.backpropagate(&[0.5, -0.25]).unwrap();
        assert_eq!(layer.weights(), &before);

        layer.update_weights().unwrap();
        assert_ne!(layer.weights(), &before);
    }

    #[test]
    fn backpropagate_matches_hand_computed_deltas() {
        let mut layer = two_by_two();
        let input = Matrix::row_vector(vec![1.0, 2.0]);
        layer.feed_forward(&input).unwrap();
        let y: Vec<f64> = layer.output_nodes().row(0).unwrap().to_vec();
        let errors = [0.5, -0.25];

        layer.backpropagate(&errors).unwrap();
        let propagated = layer.retrieve_and_reset_propagated_error();

        let local: Vec<f64> = (0..2).map(|j| errors[j] * y[j] * (1.0 - y[j])).collect();
        let expected_error_0 = local[0] * 0.1 + local[1] * -0.2;
        let expected_error_1 = local[0] * 0.3 + local[1] * 0.4;
        assert!((propagated[0] - expected_error_0).abs() < 1e-12);
        assert!((propagated[1] - expected_error_1).abs() < 1e-12);

        layer.update_weights().unwrap();
        let w = layer.weights();
        assert!((w.get(1, 0).unwrap() - (0.3 + 0.5 * local[0] * 2.0)).abs() < 1e-12);
        assert!((w.get(0, 1).unwrap() - (-0.2 + 0.5 * local[1] * 1.0)).abs() < 1e-12);

        // Each bias delta is summed once per input row.
        let b = layer.biases();
        assert!((b.get(0, 0).unwrap() - (0.05 + 2.0 * 0.5 * local[0])).abs() < 1e-12);
    }

    #[test]
    fn propagated_error_is_reset_after_retrieval() {
        let mut layer = two_by_two();
        layer.feed_forward(&Matrix::row_vector(vec![1.0, 1.0])).unwrap();
        layer.backpropagate(&[1.0, 1.0]).unwrap();

        let first = layer.retrieve_and_reset_propagated_error();
        assert!(first.iter().any(|e| *e != 0.0));
        assert_eq!(layer.retrieve_and_reset_propagated_error(), vec![0.0, 0.0]);
    }

    #[test]
    fn backpropagate_rejects_wrong_error_length() {
        let mut layer = two_by_two();
        layer.feed_forward(&Matrix::row_vector(vec![1.0, 1.0])).unwrap();
        assert!(matches!(
            layer.backpropagate(&[1.0]),
            Err(NnError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn second_update_without_backprop_is_a_no_op() {
        let mut layer = two_by_two();
        layer.feed_forward(&Matrix::row_vector(vec![0.3, -0.7])).unwrap();
        layer.backpropagate(&[0.2, 0.9]).unwrap();
        layer.update_weights().unwrap();

        let weights = layer.weights().clone();
        let biases = layer.biases().clone();
        layer.update_weights().unwrap();
        assert_eq!(layer.weights(), &weights);
        assert_eq!(layer.biases(), &biases);
    }
}
