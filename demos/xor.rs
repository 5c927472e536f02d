use backprop_nn::{
    train_loop, ActivationFunction, Layer, Matrix, NeuralNetwork, TrainConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> backprop_nn::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Fixed starting weights so the run is repeatable.
    let hidden = Layer::from_parts(
        Matrix::from_data(vec![vec![0.5, -0.4], vec![-0.3, 0.6]])?,
        Matrix::zeros(1, 2),
        ActivationFunction::Sigmoid,
        0.5,
    )?;
    let output = Layer::from_parts(
        Matrix::from_data(vec![vec![0.7], vec![-0.8]])?,
        Matrix::zeros(1, 1),
        ActivationFunction::Sigmoid,
        0.5,
    )?;
    let mut network = NeuralNetwork::from_layers(vec![hidden, output])?;

    let inputs = vec![
        Matrix::row_vector(vec![0.0, 0.0]),
        Matrix::row_vector(vec![0.0, 1.0]),
        Matrix::row_vector(vec![1.0, 0.0]),
        Matrix::row_vector(vec![1.0, 1.0]),
    ];
    let targets = vec![
        Matrix::row_vector(vec![0.0]),
        Matrix::row_vector(vec![1.0]),
        Matrix::row_vector(vec![1.0]),
        Matrix::row_vector(vec![0.0]),
    ];

    let config = TrainConfig {
        log_every: 1000,
        ..TrainConfig::new(10000, 1)
    };
    train_loop(&mut network, &inputs, &targets, &config)?;

    for input in &inputs {
        network.feed_forward(input)?;
        println!(
            "Input: {:?} -> Output: {:.4}",
            input.row(0)?,
            network.get_output().get(0, 0)?
        );
    }
    Ok(())
}
