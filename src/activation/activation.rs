use serde::{Serialize, Deserialize};
use std::f64::consts::E;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Nonlinearity bound to a layer.
///
/// Both `activate()` and `derivative()` receive the layer's full pre-activation
/// vector plus the index of the node being evaluated.  Every variant except
/// `Softmax` only looks at `weighted[index]`; `Softmax` needs the whole vector
/// for its shared denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "tanh")]
    TanH,
    /// Self-gated sigmoid: `x * sigmoid(x)`.
    #[serde(rename = "silu")]
    SiLU,
    Softmax,
}

impl ActivationFunction {
    pub fn activate(&self, weighted: &[f64], index: usize) -> f64 {
        let x = weighted[index];
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::TanH => x.tanh(),
            ActivationFunction::SiLU => x / (1.0 + E.powf(-x)),
            ActivationFunction::Softmax => {
                // No max-shift: large inputs overflow to inf/NaN.
                let exp_sum = exp_sum(weighted);
                x.exp() / exp_sum
            }
        }
    }

    /// Derivative with respect to `weighted[index]`.
    ///
    /// For `Softmax` this is only the diagonal Jacobian term
    /// `(e_i·S − e_i²) / S²`.  The off-diagonal terms are dropped, which makes
    /// it exact when paired with `CrossEntropy` on one-hot targets (the product
    /// collapses to `predicted − expected`) and an approximation otherwise.
    pub fn derivative(&self, weighted: &[f64], index: usize) -> f64 {
        let x = weighted[index];
        match self {
            ActivationFunction::Sigmoid => {
                let fx = sigmoid(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::TanH => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::SiLU => {
                let sig = sigmoid(x);
                x * sig * (1.0 - sig) + sig
            }
            ActivationFunction::Softmax => {
                let exp_sum = exp_sum(weighted);
                let ex = x.exp();
                (ex * exp_sum - ex * ex) / (exp_sum * exp_sum)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::TanH => "tanh",
            ActivationFunction::SiLU => "silu",
            ActivationFunction::Softmax => "softmax",
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

fn exp_sum(weighted: &[f64]) -> f64 {
    weighted.iter().map(|w| w.exp()).sum()
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(ActivationFunction::Sigmoid),
            "relu" => Ok(ActivationFunction::ReLU),
            "tanh" => Ok(ActivationFunction::TanH),
            "silu" | "swish" => Ok(ActivationFunction::SiLU),
            "softmax" => Ok(ActivationFunction::Softmax),
            other => Err(Error::Configuration(format!("unhandled activation type '{other}'"))),
        }
    }
}
