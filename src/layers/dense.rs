use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::learn_data::LayerLearnData;
use crate::loss::loss_type::LossType;
use crate::math::random::init_weights;

/// A fully connected layer.
///
/// Weights are stored flattened, row-major by output node:
/// `weights[out * num_in + in]` connects input node `in` to output node `out`.
///
/// The gradient accumulators sit behind two separate mutexes (weights and
/// biases) so concurrent samples serialise their accumulation per layer while
/// different layers stay independent.  Velocities persist across batches and
/// are only touched by `apply_gradients()`.
#[derive(Debug)]
pub struct Layer {
    num_in: usize,
    num_out: usize,
    weights: Vec<f64>,
    biases: Vec<f64>,
    gradient_w: Mutex<Vec<f64>>,
    gradient_b: Mutex<Vec<f64>>,
    velocity_w: Vec<f64>,
    velocity_b: Vec<f64>,
    activation: ActivationFunction,
}

impl Layer {
    /// Builds a layer with weights drawn from N(0, 1) / sqrt(num_in) and zero biases.
    pub fn new<R: Rng + ?Sized>(
        num_in: usize,
        num_out: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let mut layer = Layer::zeroed(num_in, num_out, activation);
        init_weights(&mut layer.weights, num_in, rng);
        layer
    }

    /// Builds a layer with every weight and bias set to zero.
    pub fn zeroed(num_in: usize, num_out: usize, activation: ActivationFunction) -> Layer {
        Layer {
            num_in,
            num_out,
            weights: vec![0.0; num_in * num_out],
            biases: vec![0.0; num_out],
            gradient_w: Mutex::new(vec![0.0; num_in * num_out]),
            gradient_b: Mutex::new(vec![0.0; num_out]),
            velocity_w: vec![0.0; num_in * num_out],
            velocity_b: vec![0.0; num_out],
            activation,
        }
    }

    /// Rebuilds a layer from persisted parameters.  Gradients and velocities
    /// start at zero.
    pub fn from_parameters(
        num_in: usize,
        num_out: usize,
        weights: Vec<f64>,
        biases: Vec<f64>,
        activation: ActivationFunction,
    ) -> Result<Layer> {
        if weights.len() != num_in * num_out {
            return Err(Error::InvalidSnapshot(format!(
                "layer {num_in}x{num_out} expects {} weights, got {}",
                num_in * num_out,
                weights.len()
            )));
        }
        if biases.len() != num_out {
            return Err(Error::InvalidSnapshot(format!(
                "layer {num_in}x{num_out} expects {num_out} biases, got {}",
                biases.len()
            )));
        }
        let mut layer = Layer::zeroed(num_in, num_out, activation);
        layer.weights = weights;
        layer.biases = biases;
        Ok(layer)
    }

    pub fn num_in(&self) -> usize {
        self.num_in
    }

    pub fn num_out(&self) -> usize {
        self.num_out
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn set_activation(&mut self, activation: ActivationFunction) {
        self.activation = activation;
    }

    pub fn flat_weight_index(&self, node_in: usize, node_out: usize) -> usize {
        node_out * self.num_in + node_in
    }

    pub fn weight(&self, node_in: usize, node_out: usize) -> f64 {
        self.weights[self.flat_weight_index(node_in, node_out)]
    }

    pub fn set_weight(&mut self, node_in: usize, node_out: usize, value: f64) {
        let index = self.flat_weight_index(node_in, node_out);
        self.weights[index] = value;
    }

    pub fn set_bias(&mut self, node_out: usize, value: f64) {
        self.biases[node_out] = value;
    }

    /// Copy of the accumulated weight gradient.
    pub fn weight_gradients(&self) -> Vec<f64> {
        lock(&self.gradient_w).clone()
    }

    /// Copy of the accumulated bias gradient.
    pub fn bias_gradients(&self) -> Vec<f64> {
        lock(&self.gradient_b).clone()
    }

    pub fn weight_velocities(&self) -> &[f64] {
        &self.velocity_w
    }

    pub fn bias_velocities(&self) -> &[f64] {
        &self.velocity_b
    }

    fn check_inputs(&self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.num_in {
            return Err(Error::DataShape(format!(
                "layer expects {} inputs, got {}",
                self.num_in,
                inputs.len()
            )));
        }
        Ok(())
    }

    fn weighted_sum(&self, inputs: &[f64], node_out: usize) -> f64 {
        let row = &self.weights[node_out * self.num_in..(node_out + 1) * self.num_in];
        self.biases[node_out] + inputs.iter().zip(row).map(|(x, w)| x * w).sum::<f64>()
    }

    /// Inference forward pass.  Pure: allocates and returns the activations.
    pub fn calculate_outputs(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.check_inputs(inputs)?;
        let weighted: Vec<f64> = (0..self.num_out)
            .map(|node_out| self.weighted_sum(inputs, node_out))
            .collect();
        Ok((0..self.num_out)
            .map(|node_out| self.activation.activate(&weighted, node_out))
            .collect())
    }

    /// Learning forward pass.  Writes inputs, weighted sums and activations
    /// into `learn_data` instead of allocating.
    pub fn calculate_learning_outputs(&self, inputs: &[f64], learn_data: &mut LayerLearnData) -> Result<()> {
        self.check_inputs(inputs)?;
        learn_data.inputs.clear();
        learn_data.inputs.extend_from_slice(inputs);

        for node_out in 0..self.num_out {
            learn_data.weighted_inputs[node_out] = self.weighted_sum(inputs, node_out);
        }
        for node_out in 0..self.num_out {
            learn_data.activations[node_out] =
                self.activation.activate(&learn_data.weighted_inputs, node_out);
        }
        Ok(())
    }

    /// Seeds backprop: `δ = L'(a, y) · σ'(z)` for every output node.
    pub fn calculate_output_node_values(
        &self,
        learn_data: &mut LayerLearnData,
        expected_outputs: &[f64],
        loss: LossType,
    ) {
        for i in 0..self.num_out {
            let loss_derivative = loss.derivative(learn_data.activations[i], expected_outputs[i]);
            let activation_derivative = self.activation.derivative(&learn_data.weighted_inputs, i);
            learn_data.node_values[i] = loss_derivative * activation_derivative;
        }
    }

    /// Hidden-layer error: `δ_j = σ'(z_j) · Σ_k w_next(j, k) · δ_next_k`.
    ///
    /// `next_node_values` must already hold the next layer's error signal.
    pub fn calculate_hidden_node_values(
        &self,
        learn_data: &mut LayerLearnData,
        next_layer: &Layer,
        next_node_values: &[f64],
    ) {
        for node in 0..self.num_out {
            let propagated: f64 = next_node_values.iter()
                .enumerate()
                .map(|(next_node, value)| next_layer.weight(node, next_node) * value)
                .sum();
            learn_data.node_values[node] =
                propagated * self.activation.derivative(&learn_data.weighted_inputs, node);
        }
    }

    /// Adds this sample's contribution to the shared gradient accumulators.
    ///
    /// The whole weight loop runs under one lock and the bias loop under a
    /// second, so a sample owns a layer's accumulator for the full update.
    pub fn update_gradients(&self, learn_data: &LayerLearnData) {
        {
            let mut gradient_w = lock(&self.gradient_w);
            for node_out in 0..self.num_out {
                let node_value = learn_data.node_values[node_out];
                let row = &mut gradient_w[node_out * self.num_in..(node_out + 1) * self.num_in];
                for (g, input) in row.iter_mut().zip(&learn_data.inputs) {
                    *g += input * node_value;
                }
            }
        }

        let mut gradient_b = lock(&self.gradient_b);
        for (g, node_value) in gradient_b.iter_mut().zip(&learn_data.node_values) {
            *g += node_value;
        }
    }

    /// Momentum step with multiplicative weight decay, then zeroes the
    /// accumulators.
    ///
    /// `&mut self` guarantees no sample is still accumulating, so the
    /// accumulators are reached without locking.
    pub fn apply_gradients(&mut self, learn_rate: f64, regularization: f64, momentum: f64) {
        let weight_decay = 1.0 - regularization * learn_rate;

        let gradient_w = self.gradient_w.get_mut().unwrap_or_else(PoisonError::into_inner);
        for ((weight, velocity), gradient) in self.weights.iter_mut()
            .zip(self.velocity_w.iter_mut())
            .zip(gradient_w.iter_mut())
        {
            *velocity = *velocity * momentum - *gradient * learn_rate;
            *weight = *weight * weight_decay + *velocity;
            *gradient = 0.0;
        }

        let gradient_b = self.gradient_b.get_mut().unwrap_or_else(PoisonError::into_inner);
        for ((bias, velocity), gradient) in self.biases.iter_mut()
            .zip(self.velocity_b.iter_mut())
            .zip(gradient_b.iter_mut())
        {
            *velocity = *velocity * momentum - *gradient * learn_rate;
            *bias += *velocity;
            *gradient = 0.0;
        }
    }

    /// Drops whatever a partially processed batch accumulated.
    pub fn reset_gradients(&mut self) {
        self.gradient_w.get_mut().unwrap_or_else(PoisonError::into_inner).fill(0.0);
        self.gradient_b.get_mut().unwrap_or_else(PoisonError::into_inner).fill(0.0);
    }
}

/// The accumulators hold plain sums, so a poisoned lock is still usable.
fn lock(buffer: &Mutex<Vec<f64>>) -> MutexGuard<'_, Vec<f64>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}
