//! Classic dynamic time warping.
//!
//! Cost matrix is O(N*M). The warping path starts at `(0, 0)`, ends at
//! `(n-1, m-1)` and advances each index by at most one per step.

use crate::error::{EvalError, EvalResult};

#[derive(Debug, Clone, PartialEq)]
pub struct DtwAlignment {
    /// Matched index pairs `(i into a, j into b)`, both non-decreasing.
    pub path: Vec<(usize, usize)>,
    /// Cumulative cost along the path.
    pub distance: f64,
}

/// Align `a` and `b` minimising the summed `|a_i - b_j|` along the path.
pub fn dtw(a: &[f64], b: &[f64]) -> EvalResult<DtwAlignment> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Err(EvalError::InvalidArg {
            what: "dtw needs two non-empty sequences",
        });
    }

    // acc[i][j] = cumulative cost of the best path ending at (i-1, j-1)
    let cols = m + 1;
    let mut acc = vec![f64::INFINITY; (n + 1) * cols];
    acc[0] = 0.0;
    for i in 1..=n {
        for j in 1..=m {
            let cost = (a[i - 1] - b[j - 1]).abs();
            let best = acc[(i - 1) * cols + (j - 1)]
                .min(acc[(i - 1) * cols + j])
                .min(acc[i * cols + (j - 1)]);
            acc[i * cols + j] = cost + best;
        }
    }

    let distance = acc[n * cols + m];
    let mut path = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        path.push((i - 1, j - 1));
        if i == 1 && j == 1 {
            break;
        }
        let diag = acc[(i - 1) * cols + (j - 1)];
        let up = acc[(i - 1) * cols + j];
        let left = acc[i * cols + (j - 1)];
        // Ties prefer the diagonal
        if diag <= up && diag <= left {
            i -= 1;
            j -= 1;
        } else if up <= left {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    path.reverse();

    Ok(DtwAlignment { path, distance })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_align_diagonally() {
        let a = [1.0, 2.0, 3.0, 2.0];
        let al = dtw(&a, &a).unwrap();
        assert_eq!(al.distance, 0.0);
        assert_eq!(al.path, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn shifted_peak_is_absorbed() {
        let a = [0.0, 0.0, 1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0, 0.0, 0.0];
        let al = dtw(&a, &b).unwrap();
        assert_eq!(al.distance, 0.0);
        assert_eq!(al.path.first(), Some(&(0, 0)));
        assert_eq!(al.path.last(), Some(&(4, 4)));
    }

    #[test]
    fn empty_input_rejected() {
        assert!(dtw(&[], &[1.0]).is_err());
    }
}
