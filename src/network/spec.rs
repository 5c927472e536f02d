use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::network::network::{default_activations, NeuralNetwork, DEFAULT_LEARNING_RATE};

/// Serializable description of a network's architecture.
///
/// Only the shape of the network is described here; trained weights are
/// never written out.
///
/// ```json
/// { "topology": [4, 5, 5, 3], "activations": ["sigmoid", "sigmoid", "softmax"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Layer widths from input to output.
    pub topology: Vec<usize>,
    /// One activation per layer (`topology.len() - 1` entries). Defaults to
    /// Sigmoid hidden layers with a Softmax output.
    #[serde(default)]
    pub activations: Option<Vec<ActivationFunction>>,
    #[serde(default)]
    pub learning_rate: Option<f64>,
    /// Seed for weight initialization; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn new(topology: Vec<usize>) -> Self {
        NetworkSpec {
            topology,
            activations: None,
            learning_rate: None,
            seed: None,
        }
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn build(&self) -> Result<NeuralNetwork> {
        let activations = self
            .activations
            .clone()
            .unwrap_or_else(|| default_activations(&self.topology));
        let learning_rate = self.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE);

        match self.seed {
            Some(seed) => NeuralNetwork::seeded(&self.topology, &activations, learning_rate, seed),
            None => NeuralNetwork::with_activations(&self.topology, &activations, learning_rate),
        }
    }
}
