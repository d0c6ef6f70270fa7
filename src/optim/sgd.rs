use crate::layers::dense::Layer;

/// Momentum SGD with multiplicative L2 weight decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
    pub regularization: f64,
    pub momentum: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64, regularization: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, regularization, momentum }
    }

    /// Plain SGD: no momentum, no decay.
    pub fn plain(learning_rate: f64) -> Sgd {
        Sgd::new(learning_rate, 0.0, 0.0)
    }

    /// Same hyperparameters with a different learning rate.
    pub fn with_learning_rate(self, learning_rate: f64) -> Sgd {
        Sgd { learning_rate, ..self }
    }

    /// Applies the gradients accumulated over `batch_size` samples.
    ///
    /// The rate is divided by the batch size so the step follows the batch
    /// average rather than the sum.
    pub fn step(&self, layer: &mut Layer, batch_size: usize) {
        let rate = self.learning_rate / batch_size.max(1) as f64;
        layer.apply_gradients(rate, self.regularization, self.momentum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::layers::learn_data::LayerLearnData;
    use approx::assert_abs_diff_eq;

    #[test]
    fn step_averages_over_the_batch() {
        let mut layer = Layer::zeroed(1, 1, ActivationFunction::Sigmoid);
        let mut learn_data = LayerLearnData::new(&layer);
        learn_data.inputs = vec![1.0];
        learn_data.node_values = vec![1.0];
        for _ in 0..4 {
            layer.update_gradients(&learn_data);
        }

        Sgd::plain(0.5).step(&mut layer, 4);
        // Summed gradient 4.0, averaged to 1.0, times rate 0.5.
        assert_abs_diff_eq!(layer.weights()[0], -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(layer.biases()[0], -0.5, epsilon = 1e-12);
    }
}
