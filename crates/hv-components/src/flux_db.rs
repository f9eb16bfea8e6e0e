//! Flux curves from parametric FEA exports, indexed by simulation
//! parameters.
//!
//! Column headers of the export carry the parameter set of each run as
//! `name='value'` tokens, e.g. `FluxLinkage(Coil) [mWb] - coil_height='2mm'
//! winding_num_z='17'`. The first data column fixes which parameter names
//! form a key and in which order; that index never changes afterwards.

use crate::error::{ComponentError, ComponentResult};
use crate::flux::{FluxModel, FluxModelKind};
use hv_core::numeric::ensure_all_finite;
use std::collections::BTreeMap;
use tracing::debug;

/// Parameter values ordered by the database index.
pub type FluxKey = Vec<String>;

#[derive(Debug, Clone)]
pub struct FluxDatabase {
    /// Sample times [s]
    time: Vec<f64>,
    /// Magnet positions [m], `time * velocity`
    z: Vec<f64>,
    velocity: f64,
    index: Option<Vec<String>>,
    entries: BTreeMap<FluxKey, Vec<f64>>,
}

/// Extract `name='value'` tokens from an export header.
pub fn parse_header(header: &str) -> Vec<(String, String)> {
    header
        .split_whitespace()
        .filter_map(|tok| tok.split_once('='))
        .map(|(name, value)| (name.to_string(), value.replace('\'', "")))
        .collect()
}

impl FluxDatabase {
    /// Empty database over a time base given in milliseconds.
    pub fn new(time_ms: &[f64], fixed_velocity: f64) -> ComponentResult<Self> {
        ensure_all_finite(time_ms, "flux database time")?;
        if !fixed_velocity.is_finite() {
            return Err(ComponentError::NonPhysical {
                what: "flux database velocity",
            });
        }
        let time: Vec<f64> = time_ms.iter().map(|t| t / 1000.0).collect();
        let z = time.iter().map(|t| t * fixed_velocity).collect();
        Ok(Self {
            time,
            z,
            velocity: fixed_velocity,
            index: None,
            entries: BTreeMap::new(),
        })
    }

    /// Build from the time column and `(header, values)` data columns.
    pub fn from_columns(
        time_ms: &[f64],
        columns: &[(String, Vec<f64>)],
        fixed_velocity: f64,
    ) -> ComponentResult<Self> {
        let mut db = Self::new(time_ms, fixed_velocity)?;
        let (first, _) = columns.first().ok_or(ComponentError::InvalidArg {
            what: "flux database needs at least one data column",
        })?;
        let names: Vec<String> = parse_header(first).into_iter().map(|(n, _)| n).collect();
        db.create_index(&names)?;

        for (header, values) in columns {
            let params = parse_header(header);
            let pairs: Vec<(&str, &str)> = params
                .iter()
                .map(|(n, v)| (n.as_str(), v.as_str()))
                .collect();
            db.add(&pairs, values.clone())?;
        }
        debug!(entries = db.len(), params = ?db.index, "built flux database");
        Ok(db)
    }

    /// Fix the parameter names forming a key. Allowed once.
    pub fn create_index(&mut self, names: &[String]) -> ComponentResult<()> {
        if self.index.is_some() {
            return Err(ComponentError::IndexAlreadyCreated);
        }
        self.index = Some(names.to_vec());
        Ok(())
    }

    pub fn index(&self) -> Option<&[String]> {
        self.index.as_deref()
    }

    fn make_key(&self, params: &[(&str, &str)]) -> ComponentResult<FluxKey> {
        let index = self.index.as_ref().ok_or(ComponentError::IndexMissing)?;
        let mut slots: Vec<Option<String>> = vec![None; index.len()];
        for (name, value) in params {
            let pos = index
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| ComponentError::KeyNotFound {
                    key: (*name).to_string(),
                })?;
            slots[pos] = Some((*value).to_string());
        }
        index
            .iter()
            .zip(slots)
            .map(|(name, slot)| slot.ok_or_else(|| ComponentError::MissingKey { key: name.clone() }))
            .collect()
    }

    /// Store `values` under a full parameter set.
    pub fn add(&mut self, params: &[(&str, &str)], values: Vec<f64>) -> ComponentResult<()> {
        let key = self.make_key(params)?;
        self.entries.insert(key, values);
        Ok(())
    }

    /// Exact values stored under `params`.
    pub fn query(&self, params: &[(&str, &str)]) -> ComponentResult<&[f64]> {
        let key = self.make_key(params)?;
        self.entries
            .get(&key)
            .map(Vec::as_slice)
            .ok_or_else(|| ComponentError::KeyNotFound {
                key: format!("{key:?}"),
            })
    }

    /// Query a flux curve and fit it as a flux model centred on the coil.
    ///
    /// `coil_center` [m] is measured from the top of the fixed magnet; `mm`
    /// is the magnet assembly height in millimetres.
    pub fn query_to_model(
        &self,
        kind: FluxModelKind,
        coil_center: f64,
        mm: f64,
        params: &[(&str, &str)],
    ) -> ComponentResult<FluxModel> {
        let phi = self.query(params)?;
        FluxModel::from_database_curve(kind, &self.z, phi, coil_center, mm)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FluxKey, &[f64])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(h: &str, n: &str) -> String {
        format!("FluxLinkage(Coil) [mWb] - coil_height='{h}' winding_num_z='{n}'")
    }

    fn sample_db() -> FluxDatabase {
        let time: Vec<f64> = (0..5).map(|i| i as f64 * 10.0).collect();
        let cols = vec![
            (header("2mm", "17"), vec![0.0, 1.0, 2.0, 1.0, 0.0]),
            (header("2mm", "18"), vec![0.0, 2.0, 4.0, 2.0, 0.0]),
            (header("3mm", "17"), vec![0.0, 3.0, 6.0, 3.0, 0.0]),
        ];
        FluxDatabase::from_columns(&time, &cols, 0.35).unwrap()
    }

    #[test]
    fn header_tokens_become_params() {
        let params = parse_header(&header("2mm", "17"));
        assert_eq!(
            params,
            vec![
                ("coil_height".to_string(), "2mm".to_string()),
                ("winding_num_z".to_string(), "17".to_string())
            ]
        );
    }

    #[test]
    fn query_returns_stored_column() {
        let db = sample_db();
        assert_eq!(db.len(), 3);
        let v = db
            .query(&[("winding_num_z", "18"), ("coil_height", "2mm")])
            .unwrap();
        assert_eq!(v, &[0.0, 2.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn positions_follow_fixed_velocity() {
        let db = sample_db();
        approx::assert_relative_eq!(db.z()[4], 0.04 * 0.35);
        approx::assert_relative_eq!(db.time()[1], 0.01);
    }

    #[test]
    fn absent_combination_is_a_key_error() {
        let db = sample_db();
        let err = db
            .query(&[("coil_height", "3mm"), ("winding_num_z", "18")])
            .unwrap_err();
        assert!(matches!(err, ComponentError::KeyNotFound { .. }));
    }

    #[test]
    fn unknown_parameter_name_is_a_key_error() {
        let db = sample_db();
        let err = db.query(&[("magnet_height", "10mm")]).unwrap_err();
        assert!(matches!(err, ComponentError::KeyNotFound { ref key } if key == "magnet_height"));
    }

    #[test]
    fn partial_key_is_rejected() {
        let db = sample_db();
        let err = db.query(&[("coil_height", "2mm")]).unwrap_err();
        assert!(matches!(err, ComponentError::MissingKey { ref key } if key == "winding_num_z"));
    }

    #[test]
    fn index_is_created_once() {
        let mut db = sample_db();
        let err = db.create_index(&["a".to_string()]).unwrap_err();
        assert_eq!(err, ComponentError::IndexAlreadyCreated);
    }

    #[test]
    fn query_before_index_fails() {
        let db = FluxDatabase::new(&[0.0, 1.0], 1.0).unwrap();
        assert_eq!(db.query(&[("a", "1")]).unwrap_err(), ComponentError::IndexMissing);
    }

    #[test]
    fn query_to_model_centres_peak() {
        let db = sample_db();
        let model = db
            .query_to_model(FluxModelKind::Interp, 0.02, 5.0, &[("coil_height", "3mm"), ("winding_num_z", "17")])
            .unwrap();
        // Peak sample (6.0) moves to 0.02 - 0.005
        approx::assert_relative_eq!(model.flux(0.015), 6.0, epsilon = 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn add_then_query_round_trips(
            a in "[a-z0-9]{1,6}",
            b in "[a-z0-9]{1,6}",
            values in prop::collection::vec(-1.0e3f64..1.0e3, 0..20),
        ) {
            let mut db = FluxDatabase::new(&[0.0], 1.0).unwrap();
            db.create_index(&["p".to_string(), "q".to_string()]).unwrap();
            db.add(&[("p", a.as_str()), ("q", b.as_str())], values.clone()).unwrap();
            prop_assert_eq!(db.query(&[("q", b.as_str()), ("p", a.as_str())]).unwrap(), values.as_slice());
        }
    }
}
