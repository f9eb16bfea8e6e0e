//! End-to-end scenarios: build, solve, query, score and sweep a harvester.

use approx::assert_relative_eq;
use hv_components::{
    ConstantCoupling, ConstantDamper, ElectricalModel, FluxModel, FluxModelKind, MagnetAssembly,
    MagneticSpring, MechanicalModel, SimpleLoad,
};
use hv_core::units::constants::G0_MPS2;
use hv_core::{HarvesterState, StateIndex, kg, ohm};
use hv_eval::MetricSet;
use hv_sim::{
    CancelToken, ElectricalScoreOptions, GoverningEquations, Method, ParameterGrid, SimError,
    SolveOptions, UnifiedModel, run_sweep,
};

const MASS: f64 = 0.01;
const STIFFNESS: f64 = 10.0;
const Z_EQ: f64 = 0.05;

/// Linear restoring force around `Z_EQ` on top of the magnet's weight.
fn spring() -> MagneticSpring {
    let z: Vec<f64> = (0..=20).map(|i| i as f64 * 0.005).collect();
    let f: Vec<f64> = z
        .iter()
        .map(|z| MASS * G0_MPS2 + STIFFNESS * (Z_EQ - z))
        .collect();
    MagneticSpring::new(&z, &f, "interp").unwrap()
}

fn flux() -> FluxModel {
    let z: Vec<f64> = (0..=40).map(|i| i as f64 * 0.0025).collect();
    let phi: Vec<f64> = z
        .iter()
        .map(|z| 0.01 * (-((z - Z_EQ) / 0.01).powi(2)).exp())
        .collect();
    FluxModel::from_samples(FluxModelKind::Unispline, &z, &phi).unwrap()
}

fn harvester(damping: f64) -> UnifiedModel {
    let mut mech = MechanicalModel::new("mech");
    mech.set_magnetic_spring(spring());
    mech.set_damper(ConstantDamper::new(damping));
    mech.set_magnet_assembly(MagnetAssembly::new(kg(MASS)).unwrap());

    let mut elec = ElectricalModel::new("elec");
    elec.set_flux_model(flux());
    elec.set_precompute_gradient(true);
    elec.set_coil_resistance(ohm(10.0));
    elec.set_load_model(SimpleLoad::new(ohm(30.0)).unwrap());

    let mut model = UnifiedModel::new();
    model
        .set_mechanical_model(mech)
        .set_electrical_model(elec)
        .set_coupling_model(ConstantCoupling::new(0.1))
        .set_governing_equations(GoverningEquations::Unified);
    model
}

fn y0() -> HarvesterState {
    HarvesterState::new(0.0, 0.0, 0.04, 0.0, 0.0)
}

fn options() -> SolveOptions {
    SolveOptions {
        t_end: 0.5,
        max_step: 1e-3,
        ..SolveOptions::default()
    }
}

#[test]
fn damped_magnet_settles_at_equilibrium() {
    let mut model = harvester(0.5);
    model
        .solve_with(y0(), &SolveOptions { t_end: 1.0, ..options() })
        .unwrap();
    let z = model.get_result(&[("z", "x3 - x1")]).unwrap();
    let last = *z.get("z").unwrap().last().unwrap();
    assert_relative_eq!(last, Z_EQ, epsilon = 1e-4);
}

#[test]
fn solve_is_deterministic_and_round_trips() {
    let mut a = harvester(0.5);
    let mut b = harvester(0.5);
    a.solve(0.0, 0.3, &y0().to_array(), 1e-3, Method::Rk45).unwrap();
    b.solve(0.0, 0.3, &y0().to_array(), 1e-3, Method::Rk45).unwrap();
    assert_eq!(a.time(), b.time());
    assert_eq!(a.raw_solution(), b.raw_solution());

    let exprs: Vec<(&str, &str)> = StateIndex::ALL
        .iter()
        .map(|idx| (idx.symbol(), idx.symbol()))
        .chain(std::iter::once(("t", "t")))
        .collect();
    let table = a.get_result(&exprs).unwrap();
    let raw = a.raw_solution().unwrap();
    for idx in StateIndex::ALL {
        assert_eq!(table.get(idx.symbol()).unwrap(), raw.row(idx));
    }
    assert_eq!(table.get("t").unwrap(), a.time().unwrap());
    assert_eq!(table.n_rows(), raw.n_samples());
}

#[test]
fn moving_magnet_induces_emf() {
    let mut model = harvester(0.1);
    model.solve_with(y0(), &options()).unwrap();
    let table = model.get_result(&[("emf", "g(t, x5)")]).unwrap();
    let peak = table
        .get("emf")
        .unwrap()
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    assert!(peak > 1e-3, "peak emf {peak}");
}

#[test]
fn electrical_score_against_own_emf() {
    let mut model = harvester(0.1);
    model.solve_with(y0(), &options()).unwrap();
    let time = model.time().unwrap().to_vec();
    let emf = model.get_result(&[("emf", "g(t, x5)")]).unwrap();
    let metrics = MetricSet::from_names(["root_mean_square_error", "correlation"]).unwrap();
    let (score, evaluator) = model
        .score_electrical_model_with_evaluator(
            &time,
            emf.get("emf").unwrap(),
            &metrics,
            "g(t, x5)",
            ElectricalScoreOptions::default(),
        )
        .unwrap();
    assert_relative_eq!(score.scalar("root_mean_square_error").unwrap(), 0.0, epsilon = 1e-12);
    assert!(evaluator.predict().is_some());
    assert_eq!(score.names().collect::<Vec<_>>(), vec!["root_mean_square_error", "correlation"]);
}

#[test]
fn open_circuit_model_cannot_score_closed_circuit() {
    let mut model = harvester(0.1);
    let mut open = ElectricalModel::new("open");
    open.set_flux_model(flux());
    model.set_electrical_model(open);
    model.solve_with(y0(), &options()).unwrap();
    let time = model.time().unwrap().to_vec();
    let metrics = MetricSet::from_names(["max_error"]).unwrap();
    let err = model
        .score_electrical_model(
            &time,
            &vec![0.0; time.len()],
            &metrics,
            "g(t, x5)",
            ElectricalScoreOptions {
                closed_circuit: true,
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(err.to_string().contains("load model"), "{err}");
}

#[test]
fn sweep_finds_reference_damping() {
    let mut reference = harvester(0.5);
    reference.solve_with(y0(), &options()).unwrap();
    let time = reference.time().unwrap().to_vec();
    let target = reference.get_result(&[("z", "x3 - x1")]).unwrap();
    let target = target.get("z").unwrap().to_vec();

    let grid = ParameterGrid::new().axis("damping", vec![0.1, 0.5, 2.0]);
    let metrics = MetricSet::from_names(["mean_absolute_error"]).unwrap();
    let outcomes = run_sweep(
        &grid,
        y0(),
        &options(),
        |params| {
            let c = params.get("damping").ok_or(SimError::InvalidArg {
                what: "missing damping",
            })?;
            Ok(harvester(c))
        },
        |model| model.score_mechanical_model(&time, &target, &metrics, "x3 - x1", false),
    );

    assert_eq!(outcomes.len(), 3);
    let errors: Vec<f64> = outcomes
        .iter()
        .map(|o| o.result.as_ref().unwrap().scalar("mean_absolute_error").unwrap())
        .collect();
    assert_relative_eq!(errors[1], 0.0, epsilon = 1e-12);
    assert!(errors[0] > 0.0 && errors[2] > 0.0);
    assert_eq!(outcomes[1].params.get("damping"), Some(0.5));
}

#[test]
fn cancelled_solve_keeps_previous_solution() {
    let mut model = harvester(0.5);
    model.solve_with(y0(), &options()).unwrap();
    let before = model.time().unwrap().len();

    let token = CancelToken::new();
    token.cancel();
    let err = model
        .solve_with(y0(), &options().with_cancel(token))
        .unwrap_err();
    assert!(matches!(err, SimError::Cancelled { .. }));
    assert_eq!(model.time().unwrap().len(), before);
}
