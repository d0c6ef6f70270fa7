use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::loss::loss_type::LossType;

/// Describes a network architecture and the strategies bound to it.
///
/// Fields:
/// - `layer_sizes`: node counts from input to output; at least two
///   entries, so `layer_sizes.len() - 1` layers are built
/// - `hidden_activation`: activation for every layer except the last
/// - `output_activation`: activation for the output layer
/// - `loss`: loss the network is trained against
///
/// The same description is stored in saved snapshots so strategy bindings can
/// be rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub layer_sizes: Vec<usize>,
    pub hidden_activation: ActivationFunction,
    pub output_activation: ActivationFunction,
    pub loss: LossType,
}

impl NetworkConfig {
    pub fn new(
        layer_sizes: Vec<usize>,
        hidden_activation: ActivationFunction,
        output_activation: ActivationFunction,
        loss: LossType,
    ) -> NetworkConfig {
        NetworkConfig { layer_sizes, hidden_activation, output_activation, loss }
    }

    /// Builds a config from textual strategy names, e.g. `"relu"`, `"softmax"`,
    /// `"cross_entropy"`.
    pub fn from_names(layer_sizes: Vec<usize>, hidden: &str, output: &str, loss: &str) -> Result<NetworkConfig> {
        let config = NetworkConfig::new(layer_sizes, hidden.parse()?, output.parse()?, loss.parse()?);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 {
            return Err(Error::Configuration(format!(
                "a network needs at least an input and an output size, got {:?}",
                self.layer_sizes
            )));
        }
        if let Some(position) = self.layer_sizes.iter().position(|&size| size == 0) {
            return Err(Error::Configuration(format!(
                "layer size at position {position} is zero"
            )));
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes.first().copied().unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes.last().copied().unwrap_or(0)
    }

    /// Activation bound to layer `index` out of `num_layers`.
    pub fn activation_for(&self, index: usize, num_layers: usize) -> ActivationFunction {
        if index + 1 == num_layers {
            self.output_activation
        } else {
            self.hidden_activation
        }
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        debug!(path, "saved network config");
        Ok(())
    }

    /// Deserializes and validates a config from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: NetworkConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
