use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::{
    activation::activation::ActivationFunction,
    error::{NnError, Result},
    layers::dense::Layer,
    math::matrix::Matrix,
};

/// Learning rate used when a network is built from a topology alone.
pub const DEFAULT_LEARNING_RATE: f64 = 0.05;

/// An ordered chain of dense layers where layer `i` maps
/// `topology[i] -> topology[i + 1]`.
///
/// One training step is `feed_forward` then `backpropagate`, repeated for
/// every example of a batch, then `update_weights`.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    layers: Vec<Layer>,
}

impl NeuralNetwork {
    /// Sigmoid on every layer but the last, which gets Softmax.
    pub fn new(topology: &[usize]) -> Result<NeuralNetwork> {
        let activations = default_activations(topology);
        NeuralNetwork::with_activations(topology, &activations, DEFAULT_LEARNING_RATE)
    }

    pub fn with_activations(
        topology: &[usize],
        activations: &[ActivationFunction],
        learning_rate: f64,
    ) -> Result<NeuralNetwork> {
        NeuralNetwork::build(topology, activations, learning_rate, &mut rand::thread_rng())
    }

    /// Like [`NeuralNetwork::with_activations`] but with reproducible weights.
    pub fn seeded(
        topology: &[usize],
        activations: &[ActivationFunction],
        learning_rate: f64,
        seed: u64,
    ) -> Result<NeuralNetwork> {
        NeuralNetwork::build(
            topology,
            activations,
            learning_rate,
            &mut StdRng::seed_from_u64(seed),
        )
    }

    /// Chains already-built layers. Each layer's output width must equal the
    /// next layer's input width.
    pub fn from_layers(layers: Vec<Layer>) -> Result<NeuralNetwork> {
        if layers.is_empty() {
            return Err(NnError::Configuration("network needs at least one layer".into()));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_dims() != pair[1].input_dims() {
                return Err(NnError::Configuration(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].output_dims(),
                    i + 1,
                    pair[1].input_dims()
                )));
            }
        }
        Ok(NeuralNetwork { layers })
    }

    fn build<R: Rng + ?Sized>(
        topology: &[usize],
        activations: &[ActivationFunction],
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<NeuralNetwork> {
        validate_topology(topology)?;
        if activations.len() != topology.len() - 1 {
            return Err(NnError::Configuration(format!(
                "topology {:?} needs {} activation functions, got {}",
                topology,
                topology.len() - 1,
                activations.len()
            )));
        }

        let layers = topology
            .windows(2)
            .zip(activations)
            .map(|(dims, &activation)| {
                Layer::new(dims[0], dims[1], activation, learning_rate, &mut *rng)
            })
            .collect();

        debug!(?topology, ?activations, learning_rate, "built network");
        Ok(NeuralNetwork { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer widths from input to output.
    pub fn topology(&self) -> Vec<usize> {
        std::iter::once(self.layers[0].input_dims())
            .chain(self.layers.iter().map(Layer::output_dims))
            .collect()
    }

    pub fn input_dims(&self) -> usize {
        self.layers[0].input_dims()
    }

    pub fn output_dims(&self) -> usize {
        self.last_layer().output_dims()
    }

    fn last_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Forward pass for a single `1 x input_dims` example. Each layer caches
    /// its input and output for the following `backpropagate`.
    pub fn feed_forward(&mut self, input: &Matrix) -> Result<()> {
        if input.shape() != (1, self.input_dims()) {
            return Err(NnError::shape(
                "NeuralNetwork::feed_forward",
                (1, self.input_dims()),
                input.shape(),
            ));
        }

        let mut current = input.clone();
        for layer in &mut self.layers {
            layer.feed_forward(&current)?;
            current = layer.output_nodes().clone();
        }
        Ok(())
    }

    /// Backward pass against `true_output` for the example last fed forward.
    ///
    /// The output error is `true - predicted`; each layer, last to first,
    /// accumulates its deltas and hands its propagated error to the layer
    /// before it.
    pub fn backpropagate(&mut self, true_output: &Matrix) -> Result<()> {
        let predicted = self.get_output();
        if true_output.shape() != predicted.shape() {
            return Err(NnError::shape(
                "NeuralNetwork::backpropagate",
                predicted.shape(),
                true_output.shape(),
            ));
        }

        let mut error: Vec<f64> = true_output
            .row(0)?
            .iter()
            .zip(predicted.row(0)?)
            .map(|(t, p)| t - p)
            .collect();

        for layer in self.layers.iter_mut().rev() {
            layer.backpropagate(&error)?;
            error = layer.retrieve_and_reset_propagated_error();
        }
        Ok(())
    }

    pub fn update_weights(&mut self) -> Result<()> {
        for layer in &mut self.layers {
            layer.update_weights()?;
        }
        Ok(())
    }

    /// Output of the last layer from the most recent forward pass.
    pub fn get_output(&self) -> &Matrix {
        self.last_layer().output_nodes()
    }
}

/// Sigmoid everywhere except a Softmax output layer.
pub fn default_activations(topology: &[usize]) -> Vec<ActivationFunction> {
    let n = topology.len().saturating_sub(1);
    (0..n)
        .map(|i| {
            if i + 1 == n {
                ActivationFunction::Softmax
            } else {
                ActivationFunction::Sigmoid
            }
        })
        .collect()
}

fn validate_topology(topology: &[usize]) -> Result<()> {
    if topology.len() < 2 {
        return Err(NnError::Configuration(format!(
            "topology needs an input and an output size, got {topology:?}"
        )));
    }
    if topology.contains(&0) {
        return Err(NnError::Configuration(format!(
            "layer widths must be positive, got {topology:?}"
        )));
    }
    Ok(())
}
