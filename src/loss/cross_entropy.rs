/// Cross-entropy restricted to one-hot targets.
///
/// Each output contributes `-ln(p)` when its target is exactly 1 and
/// `-ln(1 - p)` when its target is exactly 0; NaN contributions are skipped.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(&p, &e)| {
                if e == 1.0 {
                    -p.ln()
                } else if e == 0.0 {
                    -(1.0 - p).ln()
                } else {
                    0.0
                }
            })
            .filter(|v| !v.is_nan())
            .sum()
    }

    /// Per-output gradient `(e - p) / (p (p - 1))`, zero at `p ∈ {0, 1}`.
    ///
    /// Multiplied by the Softmax diagonal term `p (1 - p)` this reduces to
    /// `p - e`.
    pub fn derivative(predicted: f64, expected: f64) -> f64 {
        let p = predicted;
        if p == 0.0 || p == 1.0 {
            return 0.0;
        }
        (expected - p) / (p * (p - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn one_hot_loss() {
        let loss = CrossEntropyLoss::loss(&[0.8, 0.2], &[1.0, 0.0]);
        assert_abs_diff_eq!(loss, -(0.8f64.ln()) - (0.8f64.ln()), epsilon = 1e-12);
    }

    #[test]
    fn nan_terms_are_skipped() {
        // -ln(-0.5) is NaN and must not poison the sum.
        let loss = CrossEntropyLoss::loss(&[-0.5, 0.5], &[1.0, 1.0]);
        assert_abs_diff_eq!(loss, -(0.5f64.ln()), epsilon = 1e-12);
    }

    #[test]
    fn derivative_is_zero_at_saturation() {
        assert_eq!(CrossEntropyLoss::derivative(0.0, 1.0), 0.0);
        assert_eq!(CrossEntropyLoss::derivative(1.0, 0.0), 0.0);
        assert_eq!(CrossEntropyLoss::derivative(0.0, 0.0), 0.0);
        assert_eq!(CrossEntropyLoss::derivative(1.0, 1.0), 0.0);
    }

    #[test]
    fn derivative_times_softmax_diagonal_is_difference() {
        for &(p, e) in &[(0.3, 1.0), (0.7, 0.0), (0.01, 0.0)] {
            let combined = CrossEntropyLoss::derivative(p, e) * p * (1.0 - p);
            assert_abs_diff_eq!(combined, p - e, epsilon = 1e-12);
        }
    }
}
