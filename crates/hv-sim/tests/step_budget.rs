//! Step budget of the fixed-step integrators.

use hv_sim::{Method, SimError, SolveOptions, State, integrate};

fn decay(_t: f64, y: &State) -> Result<State, SimError> {
    Ok([0.0, 0.0, y[3], -y[3], 0.0])
}

fn budget(method: Method, max_step: f64, max_steps: usize) -> SolveOptions {
    SolveOptions {
        max_steps,
        ..SolveOptions::new(0.0, 1.0, max_step, method)
    }
}

#[test]
fn exactly_max_steps_succeeds() {
    for method in [Method::Euler, Method::Rk4] {
        // 1.0 / 0.1 is exactly ten steps
        let traj = integrate(&decay, &[0.0, 0.0, 0.0, 1.0, 0.0], &budget(method, 0.1, 10)).unwrap();
        assert_eq!(traj.t.len(), 11, "{method}");
        assert_eq!(*traj.t.last().unwrap(), 1.0);
    }
}

#[test]
fn one_step_over_budget_fails() {
    for method in [Method::Euler, Method::Rk4] {
        let err = integrate(&decay, &[0.0, 0.0, 0.0, 1.0, 0.0], &budget(method, 0.1, 9)).unwrap_err();
        assert!(
            matches!(err, SimError::MaxStepsExceeded { max_steps: 9, .. }),
            "{method}: {err}"
        );
    }
}

#[test]
fn tiny_step_reports_budget_instead_of_aborting() {
    for method in [Method::Euler, Method::Rk4] {
        let err = integrate(&decay, &[0.0; 5], &budget(method, 1e-13, 10)).unwrap_err();
        assert!(matches!(err, SimError::MaxStepsExceeded { max_steps: 10, .. }), "{method}");
    }
}
