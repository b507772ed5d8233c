//! Trailing-window statistics with `min_periods = 1` semantics: the first
//! `window - 1` outputs use however many samples exist so far.

use std::collections::VecDeque;

pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(series.len());
    let mut sum = 0.0;

    for (i, &v) in series.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= series[i - window];
        }
        let count = (i + 1).min(window);
        out.push(sum / count as f64);
    }

    out
}

pub fn rolling_min(series: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(series, window, |candidate, held| candidate <= held)
}

pub fn rolling_max(series: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(series, window, |candidate, held| candidate >= held)
}

/// Monotonic-deque sliding extreme, O(n). `dominates(new, old)` says whether a
/// newer sample makes an older one irrelevant.
fn rolling_extreme(series: &[f64], window: usize, dominates: impl Fn(f64, f64) -> bool) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(series.len());
    let mut deque: VecDeque<usize> = VecDeque::new();

    for (i, &v) in series.iter().enumerate() {
        while deque.back().is_some_and(|&j| dominates(v, series[j])) {
            deque.pop_back();
        }
        deque.push_back(i);
        while deque.front().is_some_and(|&j| j + window <= i) {
            deque.pop_front();
        }
        // the deque always holds i, so front() is Some
        out.push(deque.front().map_or(v, |&j| series[j]));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_uses_partial_window_at_start() {
        let m = rolling_mean(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_relative_eq!(m[0], 2.0);
        assert_relative_eq!(m[1], 3.0);
        assert_relative_eq!(m[2], 4.0);
        assert_relative_eq!(m[3], 6.0);
    }

    #[test]
    fn min_max_slide() {
        let s = [5.0, 1.0, 4.0, 3.0, 9.0, 2.0];
        assert_eq!(rolling_min(&s, 3), vec![5.0, 1.0, 1.0, 1.0, 3.0, 2.0]);
        assert_eq!(rolling_max(&s, 3), vec![5.0, 5.0, 5.0, 4.0, 9.0, 9.0]);
    }

    #[test]
    fn window_one_is_identity() {
        let s = [3.0, -1.0, 2.0];
        assert_eq!(rolling_min(&s, 1), s.to_vec());
        assert_eq!(rolling_max(&s, 1), s.to_vec());
        assert_eq!(rolling_mean(&s, 1), s.to_vec());
    }

    #[test]
    fn empty_series() {
        assert!(rolling_mean(&[], 3).is_empty());
        assert!(rolling_min(&[], 3).is_empty());
    }
}
