//! Integration tests for hv-components wiring a full harvester's parts.

use hv_components::{
    ConstantCoupling, ConstantDamper, Coupling, Damper, ElectricalModel, FluxDatabase,
    FluxModelKind, MagnetAssembly, MagneticSpring, MechanicalModel, MechanicalSpring,
    PushDirection, SimpleLoad,
};
use hv_core::{HarvesterState, kg, m, ohm};

fn spring_samples() -> (Vec<f64>, Vec<f64>) {
    let z: Vec<f64> = (0..60).map(|i| 0.005 + i as f64 * 1e-3).collect();
    let f = z.iter().map(|z| 2.0e-5 / z.powf(2.3)).collect();
    (z, f)
}

fn flux_database() -> FluxDatabase {
    let time_ms: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
    let col = |height: &str, amp: f64| {
        let values = time_ms
            .iter()
            .map(|t| amp * (-((t - 50.0) / 10.0).powi(2)).exp())
            .collect();
        (format!("Flux [Wb] - coil_height='{height}'"), values)
    };
    FluxDatabase::from_columns(&time_ms, &[col("2mm", 0.01), col("4mm", 0.02)], 1.0).unwrap()
}

#[test]
fn magnet_force_balance_at_rest() {
    let (z, f) = spring_samples();
    let mut mech = MechanicalModel::new("mech");
    mech.set_magnetic_spring(MagneticSpring::new(&z, &f, "coulombs_modified").unwrap());
    mech.set_damper(ConstantDamper::new(0.03));
    mech.set_magnet_assembly(MagnetAssembly::new(kg(0.04)).unwrap());
    mech.set_mechanical_spring(
        MechanicalSpring::new(PushDirection::Down, m(0.1), 1e5, true, 0.0).unwrap(),
    );
    mech.validate().unwrap();

    // Spring force decreases with separation and crosses the weight somewhere in range
    let weight = mech.magnet_assembly().unwrap().get_weight().value;
    let spring = mech.magnetic_spring().unwrap();
    assert!(spring.get_force(0.006) > weight);
    assert!(spring.get_force(0.06) < weight);
    assert_eq!(mech.damper().unwrap().get_force(0.0), 0.0);
    assert_eq!(mech.mechanical_spring().unwrap().get_force(0.05, 1.0), 0.0);
}

#[test]
fn database_model_drives_electrical_model() {
    let db = flux_database();
    let flux = db
        .query_to_model(FluxModelKind::Unispline, 0.06, 10.0, &[("coil_height", "4mm")])
        .unwrap();

    let mut elec = ElectricalModel::new("coil");
    elec.set_flux_model(flux);
    elec.set_coil_resistance(ohm(12.0));
    elec.set_load_model(SimpleLoad::new(ohm(36.0)).unwrap());

    // Below the peak the flux is rising, so upward motion gives positive EMF
    let state = HarvesterState::new(0.0, 0.0, 0.045, 0.5, 0.0);
    let emf = elec
        .get_emf(state.relative_position(), state.relative_velocity())
        .unwrap();
    assert!(emf > 0.0);

    let current = elec.get_current(emf);
    approx::assert_relative_eq!(current, emf / 48.0, max_relative = 1e-12);

    let coupling = ConstantCoupling::new(0.5);
    approx::assert_relative_eq!(coupling.get_mechanical_force(current), 0.5 * current);

    // Precomputed and finite-difference gradients agree on a smooth curve
    let fd = elec.get_flux_gradient(&state).unwrap();
    elec.set_precompute_gradient(true);
    let cached = elec.get_flux_gradient(&state).unwrap();
    approx::assert_relative_eq!(fd, cached, max_relative = 2e-2);
}
