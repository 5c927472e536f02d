pub mod activation;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use data::dataset::Dataset;
pub use error::{NnError, Result};
pub use layers::dense::Layer;
pub use loss::mse::MseLoss;
pub use math::matrix::Matrix;
pub use network::network::{NeuralNetwork, DEFAULT_LEARNING_RATE};
pub use network::spec::NetworkSpec;
pub use train::{evaluate, train_loop, EpochStats, Evaluation, TrainConfig};
