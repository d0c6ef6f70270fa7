pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: 0.5 · sum((predicted - expected)²)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let sum: f64 = predicted.iter().zip(expected.iter())
            .map(|(p, e)| (p - e).powi(2))
            .sum();
        0.5 * sum
    }

    /// Per-output gradient: predicted - expected
    pub fn derivative(predicted: f64, expected: f64) -> f64 {
        predicted - expected
    }
}
