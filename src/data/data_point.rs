use crate::error::{Error, Result};

/// One training sample: an input vector plus its one-hot target.
///
/// Immutable once built; `expected_outputs[label] == 1.0` and every other
/// entry is `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    inputs: Vec<f64>,
    expected_outputs: Vec<f64>,
    label: usize,
}

impl DataPoint {
    /// Builds a sample whose target is the one-hot encoding of `label`.
    pub fn new(inputs: Vec<f64>, label: usize, num_classes: usize) -> Result<DataPoint> {
        if label >= num_classes {
            return Err(Error::DataShape(format!(
                "label {label} is outside [0, {num_classes})"
            )));
        }
        Ok(DataPoint {
            inputs,
            expected_outputs: one_hot(label, num_classes),
            label,
        })
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    pub fn expected_outputs(&self) -> &[f64] {
        &self.expected_outputs
    }

    pub fn label(&self) -> usize {
        self.label
    }

    pub fn num_classes(&self) -> usize {
        self.expected_outputs.len()
    }
}

fn one_hot(index: usize, len: usize) -> Vec<f64> {
    let mut encoded = vec![0.0; len];
    encoded[index] = 1.0;
    encoded
}

/// Zips raw input vectors with their labels.
pub fn to_data_points(inputs: Vec<Vec<f64>>, labels: &[usize], num_classes: usize) -> Result<Vec<DataPoint>> {
    if inputs.len() != labels.len() {
        return Err(Error::DataShape(format!(
            "{} input vectors but {} labels",
            inputs.len(),
            labels.len()
        )));
    }
    inputs.into_iter()
        .zip(labels)
        .map(|(input, &label)| DataPoint::new(input, label, num_classes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_one_hot_at_label() {
        for num_classes in 1..6 {
            for label in 0..num_classes {
                let dp = DataPoint::new(vec![0.5], label, num_classes).unwrap();
                let expected = dp.expected_outputs();
                assert_eq!(expected.len(), num_classes);
                assert_eq!(expected[label], 1.0);
                assert_eq!(expected.iter().filter(|v| **v == 1.0).count(), 1);
                assert_eq!(expected.iter().filter(|v| **v == 0.0).count(), num_classes - 1);
            }
        }
    }

    #[test]
    fn out_of_range_label_is_rejected() {
        assert!(matches!(DataPoint::new(vec![1.0], 3, 3), Err(Error::DataShape(_))));
    }

    #[test]
    fn conversion_requires_matching_lengths() {
        let points = to_data_points(vec![vec![0.0], vec![1.0]], &[0, 1], 2).unwrap();
        assert_eq!(points[1].label(), 1);
        assert!(to_data_points(vec![vec![0.0]], &[0, 1], 2).is_err());
    }
}
