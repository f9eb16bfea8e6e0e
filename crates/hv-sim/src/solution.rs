//! Solved trajectory storage.
//!
//! The raw solution is kept state-major: one row per state component
//! (`x1`..`x5`), one column per time sample. Column `k` is the full state at
//! `time[k]`.

use crate::error::{SimError, SimResult};
use hv_core::{HarvesterState, STATE_DIM, StateIndex};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct RawSolution {
    rows: [Vec<f64>; STATE_DIM],
}

impl RawSolution {
    pub fn from_states(states: &[HarvesterState]) -> Self {
        let rows = std::array::from_fn(|i| states.iter().map(|s| s.to_array()[i]).collect());
        Self { rows }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> SimResult<Self> {
        let rows: [Vec<f64>; STATE_DIM] = rows.try_into().map_err(|_| SimError::InvalidArg {
            what: "raw solution must have one row per state component",
        })?;
        let n = rows[0].len();
        if rows.iter().any(|r| r.len() != n) {
            return Err(SimError::InvalidArg {
                what: "raw solution rows differ in length",
            });
        }
        Ok(Self { rows })
    }

    /// Number of time samples.
    pub fn n_samples(&self) -> usize {
        self.rows[0].len()
    }

    pub fn row(&self, idx: StateIndex) -> &[f64] {
        &self.rows[idx.index()]
    }

    pub fn rows(&self) -> &[Vec<f64>; STATE_DIM] {
        &self.rows
    }

    /// State at sample `k`.
    pub fn column(&self, k: usize) -> Option<HarvesterState> {
        if k >= self.n_samples() {
            return None;
        }
        Some(HarvesterState::from(std::array::from_fn::<f64, STATE_DIM, _>(|i| {
            self.rows[i][k]
        })))
    }

    pub fn columns(&self) -> impl Iterator<Item = HarvesterState> + '_ {
        (0..self.n_samples()).filter_map(|k| self.column(k))
    }
}

impl TryFrom<Vec<Vec<f64>>> for RawSolution {
    type Error = SimError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<RawSolution> for Vec<Vec<f64>> {
    fn from(sol: RawSolution) -> Self {
        sol.rows.into()
    }
}

/// Named, column-aligned results of [`UnifiedModel::get_result`].
///
/// [`UnifiedModel::get_result`]: crate::UnifiedModel::get_result
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<(String, Vec<f64>)>,
}

impl ResultTable {
    pub(crate) fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_become_rows() {
        let states = [
            HarvesterState::new(1.0, 2.0, 3.0, 4.0, 5.0),
            HarvesterState::new(6.0, 7.0, 8.0, 9.0, 10.0),
        ];
        let sol = RawSolution::from_states(&states);
        assert_eq!(sol.n_samples(), 2);
        assert_eq!(sol.row(StateIndex::MagPos), &[3.0, 8.0]);
        assert_eq!(sol.column(1), Some(states[1]));
        assert_eq!(sol.column(2), None);
        assert_eq!(sol.columns().collect::<Vec<_>>(), states.to_vec());
    }

    #[test]
    fn ragged_rows_rejected() {
        let rows = vec![vec![0.0; 3], vec![0.0; 3], vec![0.0; 2], vec![0.0; 3], vec![0.0; 3]];
        assert!(RawSolution::from_rows(rows).is_err());
        assert!(RawSolution::from_rows(vec![vec![0.0]; 4]).is_err());
    }

    #[test]
    fn json_is_row_major_nested_array() {
        let sol = RawSolution::from_states(&[HarvesterState::default()]);
        let json = serde_json::to_string(&sol).unwrap();
        assert_eq!(json, "[[0.0],[0.0],[0.0],[0.0],[0.0]]");
        let back: RawSolution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sol);
    }
}
