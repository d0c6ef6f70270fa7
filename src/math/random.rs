use rand::Rng;
use std::f64::consts::PI;

/// Samples a single value from N(0, 1) using the Box-Muller transform.
pub fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Draw two independent uniform samples in (0, 1] to avoid log(0).
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Fills a flattened weight matrix with samples from N(0, 1) / sqrt(fan_in).
///
/// `fan_in` is the number of input connections of the layer (`num_in`).
pub fn init_weights<R: Rng + ?Sized>(weights: &mut [f64], fan_in: usize, rng: &mut R) {
    let scale = 1.0 / (fan_in.max(1) as f64).sqrt();
    for w in weights.iter_mut() {
        *w = sample_standard_normal(rng) * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn samples_are_finite_and_roughly_standard() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<f64> = (0..20_000).map(|_| sample_standard_normal(&mut rng)).collect();
        assert!(samples.iter().all(|s| s.is_finite()));

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.05, "mean = {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance = {var}");
    }

    #[test]
    fn init_is_reproducible_for_a_seed() {
        let mut a = vec![0.0; 12];
        let mut b = vec![0.0; 12];
        init_weights(&mut a, 4, &mut StdRng::seed_from_u64(3));
        init_weights(&mut b, 4, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert!(a.iter().any(|w| *w != 0.0));
    }
}
