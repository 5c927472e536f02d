use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::{NnError, Result};
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::network::NeuralNetwork;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the statistics
/// of every epoch.
///
/// Each example goes through `feed_forward` and `backpropagate`; the
/// accumulated deltas are committed with `update_weights` after every
/// `config.batch_size` examples and once more for a trailing partial batch.
///
/// # Errors
/// `Configuration` if the data is empty, `inputs` and `targets` differ in
/// length, or `batch_size == 0`. Shape errors from the network are passed
/// through unchanged.
pub fn train_loop(
    network: &mut NeuralNetwork,
    inputs: &[Matrix],
    targets: &[Matrix],
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    config.validate()?;
    if inputs.is_empty() {
        return Err(NnError::Configuration("no training examples".into()));
    }
    if inputs.len() != targets.len() {
        return Err(NnError::Configuration(format!(
            "{} inputs but {} targets",
            inputs.len(),
            targets.len()
        )));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    let mut history = Vec::with_capacity(config.epochs);

    debug!(
        examples = inputs.len(),
        epochs = config.epochs,
        batch_size = config.batch_size,
        "starting training"
    );

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        if config.shuffle {
            order.shuffle(&mut rng);
        }
        let train_loss = run_one_epoch(network, inputs, targets, &order, config.batch_size)?;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if config.log_every > 0 && (epoch % config.log_every == 0 || epoch == config.epochs) {
            info!(
                epoch,
                total = config.epochs,
                train_loss = stats.train_loss,
                "epoch complete"
            );
        }

        history.push(stats);
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// One pass over the examples in `order`. Returns the mean example loss.
fn run_one_epoch(
    network: &mut NeuralNetwork,
    inputs: &[Matrix],
    targets: &[Matrix],
    order: &[usize],
    batch_size: usize,
) -> Result<f64> {
    let mut total_loss = 0.0;

    for batch in order.chunks(batch_size) {
        for &idx in batch {
            network.feed_forward(&inputs[idx])?;
            total_loss += MseLoss::loss(network.get_output(), &targets[idx])?;
            network.backpropagate(&targets[idx])?;
        }
        network.update_weights()?;
    }

    Ok(total_loss / order.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction::Sigmoid;
    use crate::layers::dense::Layer;

    fn single_weight_network(learning_rate: f64) -> NeuralNetwork {
        let layer = Layer::from_parts(
            Matrix::row_vector(vec![0.5]),
            Matrix::row_vector(vec![0.0]),
            Sigmoid,
            learning_rate,
        )
        .unwrap();
        NeuralNetwork::from_layers(vec![layer]).unwrap()
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut net = single_weight_network(0.1);
        let x = vec![Matrix::row_vector(vec![1.0])];
        let y = vec![Matrix::row_vector(vec![1.0])];

        assert!(train_loop(&mut net, &[], &[], &TrainConfig::new(1, 1)).is_err());
        assert!(train_loop(&mut net, &x, &[], &TrainConfig::new(1, 1)).is_err());
        assert!(train_loop(&mut net, &x, &y, &TrainConfig::new(1, 0)).is_err());
    }

    #[test]
    fn returns_one_stats_entry_per_epoch() {
        let mut net = single_weight_network(0.5);
        let x = vec![Matrix::row_vector(vec![1.0])];
        let y = vec![Matrix::row_vector(vec![1.0])];

        let history = train_loop(&mut net, &x, &y, &TrainConfig::new(20, 1)).unwrap();
        assert_eq!(history.len(), 20);
        assert_eq!(history[19].epoch, 20);
        assert!(history[19].train_loss < history[0].train_loss);
    }

    #[test]
    fn full_batch_defers_update_to_batch_end() {
        // Two identical examples in one batch must move the weight exactly as
        // far as two accumulated backward passes against unchanged weights.
        let x = vec![Matrix::row_vector(vec![1.0]); 2];
        let y = vec![Matrix::row_vector(vec![1.0]); 2];

        let mut batched = single_weight_network(0.1);
        train_loop(&mut batched, &x, &y, &TrainConfig::new(1, 2)).unwrap();

        let mut manual = single_weight_network(0.1);
        for _ in 0..2 {
            manual.feed_forward(&x[0]).unwrap();
            manual.backpropagate(&y[0]).unwrap();
        }
        manual.update_weights().unwrap();

        assert_eq!(batched.layers()[0].weights(), manual.layers()[0].weights());
    }

    #[test]
    fn trailing_partial_batch_is_committed() {
        let x = vec![Matrix::row_vector(vec![1.0]); 3];
        let y = vec![Matrix::row_vector(vec![1.0]); 3];
        let mut net = single_weight_network(0.1);

        train_loop(&mut net, &x, &y, &TrainConfig::new(1, 2)).unwrap();

        // A pending update would show up as a change on a no-op commit.
        let weights = net.layers()[0].weights().clone();
        net.update_weights().unwrap();
        assert_eq!(net.layers()[0].weights(), &weights);
        assert!(weights.get(0, 0).unwrap() > 0.5);
    }
}
