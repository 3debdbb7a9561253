/// Trailing simple moving average, one entry per input position.
///
/// Position `i` holds the mean of `data[i + 1 - window ..= i]`, or `None` while
/// fewer than `window` values have been seen. A zero window yields all `None`.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; data.len()];
    }
    let defined = data
        .windows(window)
        .map(|w| Some(w.iter().sum::<f64>() / window as f64));

    std::iter::repeat_n(None, (window - 1).min(data.len()))
        .chain(defined)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_prefix_is_explicit() {
        let means = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(means, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn short_input_is_all_undefined() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 5), vec![None, None]);
        assert!(rolling_mean(&[], 3).is_empty());
    }

    #[test]
    fn window_of_one_is_identity() {
        let means = rolling_mean(&[5.0, 7.0], 1);
        assert_eq!(means, vec![Some(5.0), Some(7.0)]);
    }

    #[test]
    fn zero_window_is_undefined() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn output_is_aligned_with_input() {
        let data: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let rolled = rolling_mean(&data, 14);
        assert_eq!(rolled.len(), data.len());
        assert_eq!(rolled[12], None);
        assert_eq!(rolled[13], Some(7.5));
        assert_eq!(rolled[39], Some(33.5));
    }
}
