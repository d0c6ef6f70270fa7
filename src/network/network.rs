use rand::Rng;
use rayon::prelude::*;
use tracing::info;

use crate::data::data_point::DataPoint;
use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::layers::learn_data::{LearnPool, NetworkLearnData};
use crate::loss::loss_type::LossType;
use crate::math::vector::max_value_index;
use crate::network::config::NetworkConfig;
use crate::network::snapshot::{LayerSnapshot, NetworkSnapshot};
use crate::optim::sgd::Sgd;

/// An ordered stack of dense layers sharing one loss.
#[derive(Debug)]
pub struct Network {
    layers: Vec<Layer>,
    loss: LossType,
    config: NetworkConfig,
}

impl Network {
    /// Builds a randomly initialised network from `config`.
    pub fn new(config: NetworkConfig) -> Result<Network> {
        Network::with_rng(config, &mut rand::thread_rng())
    }

    /// Builds a network drawing its initial weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> Result<Network> {
        config.validate()?;
        let num_layers = config.layer_sizes.len() - 1;
        let layers = config.layer_sizes.windows(2)
            .enumerate()
            .map(|(i, sizes)| Layer::new(sizes[0], sizes[1], config.activation_for(i, num_layers), rng))
            .collect();
        Ok(Network { layers, loss: config.loss, config })
    }

    /// Assembles a network from already-built layers.
    pub fn from_layers(layers: Vec<Layer>, config: NetworkConfig) -> Result<Network> {
        config.validate()?;
        let sizes: Vec<usize> = layers.first()
            .map(|first| first.num_in())
            .into_iter()
            .chain(layers.iter().map(Layer::num_out))
            .collect();
        if sizes != config.layer_sizes {
            return Err(Error::Configuration(format!(
                "layers have sizes {:?} but config expects {:?}",
                sizes, config.layer_sizes
            )));
        }
        let mut network = Network { layers, loss: config.loss, config };
        network.bind_strategies();
        Ok(network)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn input_size(&self) -> usize {
        self.config.input_size()
    }

    pub fn output_size(&self) -> usize {
        self.config.output_size()
    }

    /// Re-applies the activation and loss choices recorded in the config.
    fn bind_strategies(&mut self) {
        let num_layers = self.layers.len();
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.set_activation(self.config.activation_for(i, num_layers));
        }
        self.loss = self.config.loss;
    }

    /// Plain forward pass; returns the output layer's activations.
    pub fn predict(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let mut current = inputs.to_vec();
        for layer in &self.layers {
            current = layer.calculate_outputs(&current)?;
        }
        Ok(current)
    }

    /// Forward pass plus the index of the largest output (first on ties).
    pub fn classify(&self, inputs: &[f64]) -> Result<(usize, Vec<f64>)> {
        let outputs = self.predict(inputs)?;
        Ok((max_value_index(&outputs), outputs))
    }

    /// Sum of per-sample losses over `batch`.  Reporting only.
    pub fn total_loss(&self, batch: &[DataPoint]) -> Result<f64> {
        batch.iter().try_fold(0.0, |total, data_point| {
            let outputs = self.predict(data_point.inputs())?;
            Ok(total + self.loss.loss(&outputs, data_point.expected_outputs()))
        })
    }

    /// Checks that a sample's input and target widths match the network.
    pub fn check_sample(&self, data_point: &DataPoint) -> Result<()> {
        if data_point.inputs().len() != self.input_size() {
            return Err(Error::DataShape(format!(
                "network takes {} inputs but the sample has {}",
                self.input_size(),
                data_point.inputs().len()
            )));
        }
        if data_point.expected_outputs().len() != self.output_size() {
            return Err(Error::DataShape(format!(
                "network has {} outputs but the sample targets {} classes",
                self.output_size(),
                data_point.expected_outputs().len()
            )));
        }
        Ok(())
    }

    /// One sample's forward pass followed by backprop into the layers'
    /// gradient accumulators.  Does not apply the gradients.
    pub fn forward_backward(&self, data_point: &DataPoint, learn_data: &mut NetworkLearnData) -> Result<()> {
        self.check_sample(data_point)?;
        if !learn_data.fits(&self.layers) {
            return Err(Error::DataShape(
                "scratch buffers were built for a different network shape".into(),
            ));
        }

        let scratch = &mut learn_data.layers;
        for i in 0..self.layers.len() {
            let (done, rest) = scratch.split_at_mut(i);
            let inputs = match done.last() {
                Some(previous) => previous.activations.as_slice(),
                None => data_point.inputs(),
            };
            self.layers[i].calculate_learning_outputs(inputs, &mut rest[0])?;
        }

        let output_index = self.layers.len() - 1;
        let output_layer = &self.layers[output_index];
        output_layer.calculate_output_node_values(
            &mut scratch[output_index],
            data_point.expected_outputs(),
            self.loss,
        );
        output_layer.update_gradients(&scratch[output_index]);

        for i in (0..output_index).rev() {
            let (current, next) = scratch.split_at_mut(i + 1);
            let hidden = &self.layers[i];
            hidden.calculate_hidden_node_values(&mut current[i], &self.layers[i + 1], &next[0].node_values);
            hidden.update_gradients(&current[i]);
        }
        Ok(())
    }

    /// Learns from one batch: every sample runs `forward_backward` as its own
    /// rayon task, then, once all of them have finished, each layer applies
    /// the batch-averaged gradient.
    ///
    /// The whole batch is shape-checked first.  If a sample still fails, the
    /// partial gradients are discarded and no layer is updated.
    ///
    /// Runs on the current rayon pool; wrap in `ThreadPool::install` to bound
    /// the parallelism.
    pub fn learn(&mut self, batch: &[DataPoint], pool: &mut LearnPool, optimizer: &Sgd) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        batch.iter().try_for_each(|data_point| self.check_sample(data_point))?;

        let slots = pool.prepare(batch.len(), &self.layers);
        let network = &*self;
        let outcome = batch.par_iter()
            .zip(slots.par_iter_mut())
            .try_for_each(|(data_point, learn_data)| network.forward_backward(data_point, learn_data));
        if let Err(err) = outcome {
            for layer in &mut self.layers {
                layer.reset_gradients();
            }
            return Err(err);
        }

        for layer in &mut self.layers {
            optimizer.step(layer, batch.len());
        }
        Ok(())
    }

    /// Captures weights, biases and strategy config for persistence.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            layers: self.layers.iter()
                .map(|layer| LayerSnapshot {
                    num_nodes_in: layer.num_in(),
                    num_nodes_out: layer.num_out(),
                    weights: layer.weights().to_vec(),
                    biases: layer.biases().to_vec(),
                })
                .collect(),
            config: self.config.clone(),
        }
    }

    /// Rebuilds a network from a snapshot.  Strategies are rebound from the
    /// stored config; gradients and momentum start at zero.
    pub fn from_snapshot(mut snapshot: NetworkSnapshot) -> Result<Network> {
        snapshot.validate()?;
        let num_layers = snapshot.layers.len();
        let config = snapshot.config;
        let layers = snapshot.layers.into_iter()
            .enumerate()
            .map(|(i, layer)| Layer::from_parameters(
                layer.num_nodes_in,
                layer.num_nodes_out,
                layer.weights,
                layer.biases,
                config.activation_for(i, num_layers),
            ))
            .collect::<Result<Vec<Layer>>>()?;
        Network::from_layers(layers, config)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        self.snapshot().save_json(path)?;
        info!(path, layers = self.layers.len(), "saved network");
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<Network> {
        let network = Network::from_snapshot(NetworkSnapshot::load_json(path)?)?;
        info!(path, layers = network.layers.len(), "loaded network");
        Ok(network)
    }
}
