//! Reducers turning the values collected for one group into a single number.
//!
//! All three fail with [`ProcessorError::EmptyGroup`] on an empty slice.
//! `median` and `mode` reorder the slice in place.

use crate::processor::{ProcessorError, Result};

/// Arithmetic mean: the left-to-right sum divided by the count, so the
/// result does not depend on the machine it runs on.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(ProcessorError::EmptyGroup);
    }
    let sum: f64 = values.iter().sum();
    Ok(sum / values.len() as f64)
}

/// Element at index `len / 2` of the ascending order.
///
/// This is the lower-middle convention taken as index `floor(len / 2)`:
/// `[1, 2, 3]` gives `2` and `[1, 2, 3, 4]` gives `3`. The middle pair of an
/// even count is never averaged.
pub fn median(values: &mut [f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(ProcessorError::EmptyGroup);
    }
    let n = values.len() / 2;
    // only the n-th position needs to be in sorted place
    let (_, nth, _) = values.select_nth_unstable_by(n, f64::total_cmp);
    Ok(*nth)
}

/// Most frequent value.
///
/// Runs are counted over the ascending order and only a strictly longer run
/// replaces the current best, so on a frequency tie the smaller value wins.
pub fn mode(values: &mut [f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(ProcessorError::EmptyGroup);
    }
    values.sort_unstable_by(f64::total_cmp);

    let mut best = values[0];
    let mut best_count = 0usize;
    let mut cur = values[0];
    let mut cur_count = 1usize;

    for &v in &values[1..] {
        if v != cur {
            if cur_count > best_count {
                best = cur;
                best_count = cur_count;
            }
            cur = v;
            cur_count = 1;
        } else {
            cur_count += 1;
        }
    }

    // last run
    if cur_count > best_count {
        best = cur;
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
        assert_eq!(mean(&[7.0]).unwrap(), 7.0);
    }

    #[test]
    fn test_mean_sums_in_row_order() {
        let values = [1e16, 1.0, 0.0, 0.0, -1e16, 1.0, 0.0, 0.0];
        // 1e16 + 1 rounds back to 1e16, so only the final 1 survives
        assert_eq!(mean(&values).unwrap(), 0.125);

        let reordered = [1e16, -1e16, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        assert_eq!(mean(&reordered).unwrap(), 0.25);
    }

    #[test]
    fn test_mode_result_comes_from_sorted_runs() {
        // the first element is neither the most frequent nor the smallest
        assert_eq!(mode(&mut [7.0, 2.0, 2.0, 9.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut [5.0, 1.0, 3.0]).unwrap(), 3.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]).unwrap(), 3.0);
        assert_eq!(median(&mut [9.0, 1.0]).unwrap(), 9.0);
        assert_eq!(median(&mut [2.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_mode() {
        assert_eq!(mode(&mut [3.0, 1.0, 2.0, 2.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(mode(&mut [5.0, 5.0, 1.0, 1.0]).unwrap(), 1.0);
        assert_eq!(mode(&mut [4.0]).unwrap(), 4.0);
        // all distinct, smallest wins
        assert_eq!(mode(&mut [9.0, 3.0, 6.0]).unwrap(), 3.0);
        // longest run at the end
        assert_eq!(mode(&mut [1.0, 8.0, 8.0, 8.0, 2.0, 2.0]).unwrap(), 8.0);
    }

    #[test]
    fn test_empty_group() {
        assert!(matches!(mean(&[]), Err(ProcessorError::EmptyGroup)));
        assert!(matches!(median(&mut []), Err(ProcessorError::EmptyGroup)));
        assert!(matches!(mode(&mut []), Err(ProcessorError::EmptyGroup)));
    }

    proptest! {
        #[test]
        fn prop_mean_is_sum_over_len(v in prop::collection::vec(-1000i32..=1000, 1..200)) {
            let values: Vec<f64> = v.iter().map(|&x| x as f64).collect();
            let expected = v.iter().map(|&x| x as i64).sum::<i64>() as f64 / v.len() as f64;
            prop_assert_eq!(mean(&values).unwrap(), expected);
        }

        #[test]
        fn prop_mean_matches_left_to_right_fold(v in prop::collection::vec(-1.0e12f64..1.0e12, 1..200)) {
            let expected = v.iter().fold(0.0, |acc, x| acc + x) / v.len() as f64;
            prop_assert_eq!(mean(&v).unwrap(), expected);
        }

        #[test]
        fn prop_median_is_lower_middle_of_sorted(v in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
            let mut sorted = v.clone();
            sorted.sort_by(f64::total_cmp);
            let mut work = v.clone();
            prop_assert_eq!(median(&mut work).unwrap(), sorted[sorted.len() / 2]);
        }

        #[test]
        fn prop_mode_is_smallest_most_frequent(v in prop::collection::vec(0i32..10, 1..100)) {
            let mut counts = [0usize; 10];
            for &x in &v {
                counts[x as usize] += 1;
            }
            let max = *counts.iter().max().unwrap();
            let expected = counts.iter().position(|&c| c == max).unwrap() as f64;
            let mut values: Vec<f64> = v.iter().map(|&x| x as f64).collect();
            prop_assert_eq!(mode(&mut values).unwrap(), expected);
        }
    }
}
