pub mod error;
pub mod math;
pub mod activation;
pub mod loss;
pub mod layers;
pub mod data;
pub mod network;
pub mod optim;
pub mod eval;
pub mod train;

// Convenience re-exports
pub use error::{Error, Result};
pub use activation::activation::ActivationFunction;
pub use loss::loss_type::LossType;
pub use layers::dense::Layer;
pub use layers::learn_data::{LayerLearnData, LearnPool, NetworkLearnData};
pub use data::{DataPoint, Batch, SampleSource};
pub use network::{Network, NetworkConfig, NetworkSnapshot};
pub use optim::sgd::Sgd;
pub use eval::EvaluationData;
pub use train::{History, TrainConfig, Trainer, TrainerState, EvalSplit};
