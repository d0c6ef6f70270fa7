use crate::layers::dense::Layer;

/// Scratch buffers for one layer during one sample's forward + backward pass.
#[derive(Debug, Clone)]
pub struct LayerLearnData {
    /// Copy of the vector that was fed into the layer.
    pub inputs: Vec<f64>,
    /// Pre-activation sums `z = W·x + b`.
    pub weighted_inputs: Vec<f64>,
    pub activations: Vec<f64>,
    /// Backpropagated error signal `∂L/∂z`.
    pub node_values: Vec<f64>,
}

impl LayerLearnData {
    pub fn new(layer: &Layer) -> LayerLearnData {
        LayerLearnData {
            inputs: Vec::with_capacity(layer.num_in()),
            weighted_inputs: vec![0.0; layer.num_out()],
            activations: vec![0.0; layer.num_out()],
            node_values: vec![0.0; layer.num_out()],
        }
    }

    fn fits(&self, layer: &Layer) -> bool {
        self.weighted_inputs.len() == layer.num_out()
            && self.activations.len() == layer.num_out()
            && self.node_values.len() == layer.num_out()
            && self.inputs.capacity() >= layer.num_in()
    }
}

/// Per-layer scratch for a whole network, one entry per layer.
#[derive(Debug, Clone)]
pub struct NetworkLearnData {
    pub layers: Vec<LayerLearnData>,
}

impl NetworkLearnData {
    pub fn new(layers: &[Layer]) -> NetworkLearnData {
        NetworkLearnData {
            layers: layers.iter().map(LayerLearnData::new).collect(),
        }
    }

    /// True when every per-layer buffer is shaped for `layers`.
    pub(crate) fn fits(&self, layers: &[Layer]) -> bool {
        self.layers.len() == layers.len()
            && self.layers.iter().zip(layers).all(|(data, layer)| data.fits(layer))
    }
}

/// Pool of scratch buffers, one slot per sample of the current batch.
///
/// Slots are reused verbatim between batches of the same size and rebuilt when
/// the batch size or the network shape changes.  Each concurrent task gets its
/// own slot, so no two tasks ever share a buffer.
#[derive(Debug, Default)]
pub struct LearnPool {
    slots: Vec<NetworkLearnData>,
}

impl LearnPool {
    pub fn new() -> LearnPool {
        LearnPool::default()
    }

    /// Returns exactly `batch_size` slots shaped for `layers`, rebuilding if needed.
    pub fn prepare(&mut self, batch_size: usize, layers: &[Layer]) -> &mut [NetworkLearnData] {
        let reusable = self.slots.len() == batch_size
            && self.slots.iter().all(|slot| slot.fits(layers));
        if !reusable {
            self.slots = (0..batch_size).map(|_| NetworkLearnData::new(layers)).collect();
        }
        &mut self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
