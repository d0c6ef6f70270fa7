use std::fmt;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::data::data_point::DataPoint;
use crate::data::source::SampleSource;
use crate::error::{Error, Result};
use crate::math::vector::max_value_index;
use crate::network::network::Network;

/// Confusion counts gathered by one evaluation pass.
///
/// `wrongly_predicted_as[c]` counts samples of another class that the network
/// labelled `c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationData {
    num_correct: usize,
    total: usize,
    num_correct_per_class: Vec<usize>,
    total_per_class: Vec<usize>,
    wrongly_predicted_as: Vec<usize>,
}

impl EvaluationData {
    pub fn new(num_classes: usize) -> EvaluationData {
        EvaluationData {
            num_correct: 0,
            total: 0,
            num_correct_per_class: vec![0; num_classes],
            total_per_class: vec![0; num_classes],
            wrongly_predicted_as: vec![0; num_classes],
        }
    }

    fn record(&mut self, label: usize, predicted: usize) {
        self.total += 1;
        self.total_per_class[label] += 1;
        if predicted == label {
            self.num_correct_per_class[label] += 1;
            self.num_correct += 1;
        } else {
            self.wrongly_predicted_as[predicted] += 1;
        }
    }

    pub fn num_classes(&self) -> usize {
        self.total_per_class.len()
    }

    pub fn num_correct(&self) -> usize {
        self.num_correct
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn num_correct_per_class(&self) -> &[usize] {
        &self.num_correct_per_class
    }

    pub fn total_per_class(&self) -> &[usize] {
        &self.total_per_class
    }

    pub fn wrongly_predicted_as(&self) -> &[usize] {
        &self.wrongly_predicted_as
    }

    /// Percentage of correct predictions; 0 for an empty pass.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.num_correct as f64 / self.total as f64 * 100.0
    }

    /// Percentage of correct predictions among samples of `label`, if any
    /// were seen.
    pub fn class_accuracy(&self, label: usize) -> Option<f64> {
        match self.total_per_class.get(label) {
            Some(&total) if total > 0 => {
                Some(self.num_correct_per_class[label] as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }

    /// `Predicted <correct> / <total> (<percentage>%)`
    pub fn accuracy_string(&self) -> String {
        format!("Predicted {} / {} ({:.4}%)", self.num_correct, self.total, self.accuracy())
    }
}

impl fmt::Display for EvaluationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accuracy_string())
    }
}

fn check_label(label: usize, num_classes: usize) -> Result<()> {
    if label >= num_classes {
        return Err(Error::DataShape(format!(
            "label {label} is outside the network's {num_classes} classes"
        )));
    }
    Ok(())
}

/// Scores `network` against `data`.
///
/// Samples are predicted in parallel; each one updates the shared counts in a
/// single critical section.
pub fn evaluate(network: &Network, data: &[DataPoint]) -> Result<EvaluationData> {
    let num_classes = network.output_size();
    let shared = Mutex::new(EvaluationData::new(num_classes));

    data.par_iter().try_for_each(|data_point| {
        check_label(data_point.label(), num_classes)?;
        let (predicted, _) = network.classify(data_point.inputs())?;
        shared.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(data_point.label(), predicted);
        Ok::<(), Error>(())
    })?;

    Ok(shared.into_inner().unwrap_or_else(PoisonError::into_inner))
}

/// Like `evaluate()`, loading each sample from its source first.
pub fn evaluate_sources<S: SampleSource>(network: &Network, sources: &[S]) -> Result<EvaluationData> {
    let num_classes = network.output_size();
    let shared = Mutex::new(EvaluationData::new(num_classes));

    sources.par_iter().try_for_each(|source| {
        check_label(source.label(), num_classes)?;
        let data_point = source.load(num_classes)?;
        let (predicted, _) = network.classify(data_point.inputs())?;
        shared.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(source.label(), predicted);
        Ok::<(), Error>(())
    })?;

    Ok(shared.into_inner().unwrap_or_else(PoisonError::into_inner))
}

/// One `Label : <i> => <pct>%` line per output, percentages zero-padded to
/// seven characters.
pub fn format_class_probabilities(outputs: &[f64]) -> String {
    outputs.iter()
        .enumerate()
        .map(|(label, probability)| format!("Label : {label} => {:07.4}%", probability * 100.0))
        .collect::<Vec<_>>()
        .join("\n")
}
