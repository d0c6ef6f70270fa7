use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::network::config::NetworkConfig;

/// Persisted parameters of one layer.  Gradients and velocities are not saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub num_nodes_in: usize,
    pub num_nodes_out: usize,
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

/// Everything needed to rebuild a trained network: per-layer parameters plus
/// the config that names its activation and loss strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub layers: Vec<LayerSnapshot>,
    pub config: NetworkConfig,
}

impl NetworkSnapshot {
    /// Checks that every layer's buffers match its widths and that adjacent
    /// layers chain.  Fills `config.layer_sizes` from the layers when absent.
    pub fn validate(&mut self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::InvalidSnapshot("snapshot has no layers".into()));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.weights.len() != layer.num_nodes_in * layer.num_nodes_out {
                return Err(Error::InvalidSnapshot(format!(
                    "layer {i} has {} weights for a {}x{} shape",
                    layer.weights.len(),
                    layer.num_nodes_in,
                    layer.num_nodes_out
                )));
            }
            if layer.biases.len() != layer.num_nodes_out {
                return Err(Error::InvalidSnapshot(format!(
                    "layer {i} has {} biases for {} outputs",
                    layer.biases.len(),
                    layer.num_nodes_out
                )));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].num_nodes_out != pair[1].num_nodes_in {
                return Err(Error::InvalidSnapshot(format!(
                    "layer {i} outputs {} nodes but layer {} expects {}",
                    pair[0].num_nodes_out,
                    i + 1,
                    pair[1].num_nodes_in
                )));
            }
        }

        let sizes: Vec<usize> = std::iter::once(self.layers[0].num_nodes_in)
            .chain(self.layers.iter().map(|layer| layer.num_nodes_out))
            .collect();
        if self.config.layer_sizes.is_empty() {
            self.config.layer_sizes = sizes;
        } else if self.config.layer_sizes != sizes {
            return Err(Error::InvalidSnapshot(format!(
                "config layer sizes {:?} disagree with stored layers {:?}",
                self.config.layer_sizes, sizes
            )));
        }
        Ok(())
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads and validates a snapshot written by `save_json`.
    pub fn load_json(path: &str) -> Result<NetworkSnapshot> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let mut snapshot: NetworkSnapshot = serde_json::from_reader(reader)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::loss::LossType;

    fn layer(num_in: usize, num_out: usize) -> LayerSnapshot {
        LayerSnapshot {
            num_nodes_in: num_in,
            num_nodes_out: num_out,
            weights: vec![0.1; num_in * num_out],
            biases: vec![0.0; num_out],
        }
    }

    fn snapshot(layers: Vec<LayerSnapshot>) -> NetworkSnapshot {
        NetworkSnapshot {
            layers,
            config: NetworkConfig::new(
                Vec::new(),
                ActivationFunction::ReLU,
                ActivationFunction::Softmax,
                LossType::CrossEntropy,
            ),
        }
    }

    #[test]
    fn layer_sizes_are_recovered_from_layers() {
        let mut snap = snapshot(vec![layer(3, 4), layer(4, 2)]);
        snap.validate().unwrap();
        assert_eq!(snap.config.layer_sizes, vec![3, 4, 2]);
    }

    #[test]
    fn broken_chain_is_rejected() {
        let mut snap = snapshot(vec![layer(3, 4), layer(5, 2)]);
        assert!(matches!(snap.validate(), Err(Error::InvalidSnapshot(_))));
    }

    #[test]
    fn truncated_weights_are_rejected() {
        let mut bad = layer(3, 4);
        bad.weights.pop();
        let mut snap = snapshot(vec![bad]);
        assert!(matches!(snap.validate(), Err(Error::InvalidSnapshot(_))));
    }

    #[test]
    fn mismatched_config_sizes_are_rejected() {
        let mut snap = snapshot(vec![layer(3, 4), layer(4, 2)]);
        snap.config.layer_sizes = vec![3, 5, 2];
        assert!(matches!(snap.validate(), Err(Error::InvalidSnapshot(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = NetworkSnapshot::load_json("/nonexistent/strata/nn.json");
        assert!(matches!(err, Err(Error::Io(_))));
    }
}
