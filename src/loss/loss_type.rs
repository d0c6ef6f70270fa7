use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::loss::bce::BceLoss;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;

/// Selects which loss function the network is trained against.
///
/// - `Mse`: half sum of squared errors; pair with Sigmoid/TanH output.
/// - `CrossEntropy`: one-hot cross-entropy; pair with Softmax output.
/// - `BinaryCrossEntropy`: general BCE for soft targets; pair with Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
    BinaryCrossEntropy,
}

impl LossType {
    /// Scalar loss for one sample.  Reporting only; gradients use `derivative()`.
    pub fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::Mse                => MseLoss::loss(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss::loss(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
        }
    }

    /// Derivative of the loss with respect to a single predicted output.
    pub fn derivative(&self, predicted: f64, expected: f64) -> f64 {
        match self {
            LossType::Mse                => MseLoss::derivative(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss::derivative(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LossType::Mse                => "mse",
            LossType::CrossEntropy       => "cross_entropy",
            LossType::BinaryCrossEntropy => "binary_cross_entropy",
        }
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LossType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mse" | "mean_squared_error" => Ok(LossType::Mse),
            "cross_entropy" | "ce" => Ok(LossType::CrossEntropy),
            "binary_cross_entropy" | "bce" => Ok(LossType::BinaryCrossEntropy),
            other => Err(Error::Configuration(format!("unhandled loss type '{other}'"))),
        }
    }
}
