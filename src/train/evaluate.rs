use tracing::debug;

use crate::error::{NnError, Result};
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::network::NeuralNetwork;

/// Result of running a network over a labelled set without training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean squared error over every output element of every example.
    pub mse: f64,
    /// Fraction of examples whose highest-scoring output matches the
    /// highest target entry.
    pub accuracy: f64,
}

/// Feeds every input forward and scores the outputs against `targets`.
/// Deltas are untouched, so this can run between training steps.
pub fn evaluate(
    network: &mut NeuralNetwork,
    inputs: &[Matrix],
    targets: &[Matrix],
) -> Result<Evaluation> {
    if inputs.len() != targets.len() {
        return Err(NnError::Configuration(format!(
            "{} inputs but {} targets",
            inputs.len(),
            targets.len()
        )));
    }
    if inputs.is_empty() {
        return Ok(Evaluation {
            mse: 0.0,
            accuracy: 0.0,
        });
    }

    let mut total = 0.0;
    let mut correct = 0usize;

    for (input, target) in inputs.iter().zip(targets) {
        network.feed_forward(input)?;
        let output = network.get_output();
        total += MseLoss::loss(output, target)?;
        if argmax(output.row(0)?) == argmax(target.row(0)?) {
            correct += 1;
        }
    }

    let n = inputs.len() as f64;
    let evaluation = Evaluation {
        mse: total / n,
        accuracy: correct as f64 / n,
    };
    debug!(
        examples = inputs.len(),
        mse = evaluation.mse,
        accuracy = evaluation.accuracy,
        "evaluation complete"
    );
    Ok(evaluation)
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
