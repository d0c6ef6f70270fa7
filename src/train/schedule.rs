/// Learning rate for 0-based epoch `epoch`: `base / (1 + decay · epoch)`.
///
/// Always derived from the base rate, never compounded.
pub fn learning_rate_for_epoch(base_rate: f64, decay: f64, epoch: usize) -> f64 {
    base_rate / (1.0 + decay * epoch as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_epoch_uses_the_base_rate() {
        assert_eq!(learning_rate_for_epoch(0.05, 0.075, 0), 0.05);
    }

    #[test]
    fn schedule_is_not_compounded() {
        let rate = learning_rate_for_epoch(0.05, 0.075, 3);
        assert_relative_eq!(rate, 0.05 / (1.0 + 0.075 * 3.0));

        let mut compounded = 0.05;
        for epoch in 1..=3 {
            compounded /= 1.0 + 0.075 * epoch as f64;
        }
        assert!((rate - compounded).abs() > 1e-4);
    }
}
