/// Index of the maximum element; the first index wins on ties.
///
/// Returns 0 for an empty slice or one made entirely of NaN.
pub fn max_value_index(values: &[f64]) -> usize {
    let mut max_value = f64::NEG_INFINITY;
    let mut index = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > max_value {
            max_value = v;
            index = i;
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_largest() {
        assert_eq!(max_value_index(&[0.1, 0.7, 0.2]), 1);
    }

    #[test]
    fn first_index_wins_ties() {
        assert_eq!(max_value_index(&[0.2, 0.4, 0.4, 0.1]), 1);
        assert_eq!(max_value_index(&[0.5, 0.5]), 0);
    }

    #[test]
    fn degenerate_inputs_map_to_zero() {
        assert_eq!(max_value_index(&[]), 0);
        assert_eq!(max_value_index(&[f64::NAN, f64::NAN]), 0);
    }
}
