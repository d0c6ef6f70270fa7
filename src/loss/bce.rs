pub struct BceLoss;

/// Stand-in for the infinite slope at `p ∈ {0, 1}`.
const SATURATED_SLOPE: f64 = 1e10;

impl BceLoss {
    /// Scalar BCE: sum(-y·ln(p) - (1-y)·ln(1-p)), NaN terms skipped.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| -y * p.ln() - (1.0 - y) * (1.0 - p).ln())
            .filter(|v| !v.is_nan())
            .sum()
    }

    /// Per-output gradient: -y/p + (1-y)/(1-p), clamped to ±1e10 at the edges.
    pub fn derivative(predicted: f64, expected: f64) -> f64 {
        let (p, y) = (predicted, expected);
        if p == 0.0 {
            return SATURATED_SLOPE;
        }
        if p == 1.0 {
            return -SATURATED_SLOPE;
        }
        -y / p + (1.0 - y) / (1.0 - p)
    }
}
