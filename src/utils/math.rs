/// Scales `values` so they sum to one and returns the original sum. A zero sum
/// leaves the values untouched; the caller decides whether that is an error.
pub fn normalize_in_place(values: &mut [f32]) -> f32 {
    let sum: f32 = values.iter().sum();
    if sum != 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    }
    sum
}

#[inline]
pub fn round_to_decimals(value: f32, decimals: u32) -> f32 {
    let scale = 10f32.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Index of the largest value; the first one wins ties. Only values strictly
/// above zero are considered, so an all-zero slice yields index 0.
pub fn argmax(values: &[f32]) -> usize {
    argmax_by(values.len(), |index| values[index])
}

/// Same as [`argmax`] over `len` weights produced by `weight`
pub fn argmax_by<F>(len: usize, weight: F) -> usize
where
    F: Fn(usize) -> f32,
{
    let mut best_index = 0;
    let mut best_weight = 0.0;
    for index in 0..len {
        let w = weight(index);
        if w > best_weight {
            best_weight = w;
            best_index = index;
        }
    }
    best_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normalize_sums_to_one() {
        let mut values = [1.0, 2.0, 1.0];
        let sum = normalize_in_place(&mut values);
        assert_eq!(sum, 4.0);
        assert_eq!(values, [0.25, 0.5, 0.25]);
    }

    #[test]
    fn test_normalize_leaves_zero_rows_alone() {
        let mut values = [0.0; 3];
        assert_eq!(normalize_in_place(&mut values), 0.0);
        assert_eq!(values, [0.0; 3]);
    }

    #[test]
    fn test_round_to_three_decimals() {
        assert_abs_diff_eq!(round_to_decimals(1.0 / 3.0, 3), 0.333, epsilon = 1e-7);
        assert_abs_diff_eq!(round_to_decimals(2.0 / 3.0, 3), 0.667, epsilon = 1e-7);
        assert_abs_diff_eq!(round_to_decimals(0.0454545, 3), 0.045, epsilon = 1e-7);
        assert_eq!(round_to_decimals(1.0, 3), 1.0);
        assert_eq!(round_to_decimals(0.0, 3), 0.0);
    }

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), 1);
        assert_eq!(argmax(&[0.5, 0.2, 0.3]), 0);
        assert_eq!(argmax(&[0.0, 0.0, 0.0]), 0);
        assert_eq!(argmax(&[0.0, 0.0, 0.2]), 2);
    }

    #[test]
    fn test_argmax_by_uses_weights() {
        let values = [0.3, 0.0, 0.7];
        assert_eq!(argmax_by(3, |i| values[i]), 2);
        assert_eq!(argmax_by(3, |i| if i == 2 { values[i].powi(4) } else { values[i] }), 0);
    }
}
