//! Trailing simple moving average.
//!
//! The average at row `i` covers rows `i + 1 - window ..= i` of the input, by
//! position. Rows are never gap-filled by calendar date, and there is no
//! look-ahead:
//!
//! ```text
//! values = [5, 6, 7], window = 2  ->  [None, 5.5, 6.5]
//! ```
//!
//! Windows are summed directly rather than with a running total so that the
//! result for a row does not depend on floating-point drift from earlier rows.

/// Trailing mean over `window` consecutive values.
///
/// The first `window - 1` outputs are `None`. If `values.len() < window`
/// every output is `None`. A `window` of zero yields all `None`; callers
/// validate the window before getting here.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let denom = window as f64;
    for (i, chunk) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(chunk.iter().sum::<f64>() / denom);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_of_one_is_identity() {
        let v = [1.5, -2.0, 3.25];
        let out = trailing_mean(&v, 1);
        assert_eq!(out, vec![Some(1.5), Some(-2.0), Some(3.25)]);
    }

    #[test]
    fn leading_rows_are_missing() {
        let out = trailing_mean(&[10.0, 20.0, 30.0, 40.0], 3);
        assert_eq!(out, vec![None, None, Some(20.0), Some(30.0)]);
    }

    #[test]
    fn window_longer_than_input_is_all_missing() {
        let out = trailing_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 12);
        assert_eq!(out, vec![None; 5]);
    }

    #[test]
    fn zero_is_a_value_not_a_gap() {
        let out = trailing_mean(&[0.0, 0.0], 2);
        assert_eq!(out, vec![None, Some(0.0)]);
    }

    #[test]
    fn empty_input() {
        assert!(trailing_mean(&[], 3).is_empty());
    }
}
