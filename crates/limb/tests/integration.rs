//! Integration tests for the leg equations of motion.

use approx::assert_relative_eq;
use limb::limb_expr::{Bindings, DMat, DVec};
use limb::{Expr, LegEquations, LegModel, LegParameters};

fn derive() -> LegEquations {
    LegModel::new().unwrap().derive().unwrap()
}

/// Independent planar-chain reference built from absolute segment angles.
struct Reference {
    lengths: [f64; 3],
    offsets: [f64; 3],
    masses: [f64; 3],
    inertias: [f64; 3],
    g: f64,
}

impl Reference {
    fn new(p: &LegParameters) -> Self {
        Self {
            lengths: [p.lower_leg_length, p.upper_leg_length, 0.0],
            offsets: [p.lower_leg_com_length, p.upper_leg_com_length, p.torso_com_length],
            masses: [p.lower_leg_mass, p.upper_leg_mass, p.torso_mass],
            inertias: [p.lower_leg_inertia, p.upper_leg_inertia, p.torso_inertia],
            g: p.gravity,
        }
    }

    /// Jacobian of the mass center of segment `i` with respect to the joint angles.
    fn com_jacobian(&self, theta: &[f64; 3], i: usize) -> [[f64; 3]; 2] {
        let phi = [theta[0], theta[0] + theta[1], theta[0] + theta[1] + theta[2]];
        // d/dphi of the segment direction (-sin phi, cos phi)
        let d_dir = |k: usize| [-phi[k].cos(), -phi[k].sin()];
        let mut jac = [[0.0; 3]; 2];
        for j in 0..=i {
            for k in j..=i {
                let len = if k < i { self.lengths[k] } else { self.offsets[i] };
                let d = d_dir(k);
                jac[0][j] += len * d[0];
                jac[1][j] += len * d[1];
            }
        }
        jac
    }

    fn mass_matrix(&self, theta: &[f64; 3]) -> DMat {
        let mut m = DMat::zeros(3, 3);
        for i in 0..3 {
            let jac = self.com_jacobian(theta, i);
            for r in 0..3 {
                for s in 0..3 {
                    let translational = jac[0][r] * jac[0][s] + jac[1][r] * jac[1][s];
                    let rotational = if r <= i && s <= i { 1.0 } else { 0.0 };
                    m[(r, s)] += self.masses[i] * translational + self.inertias[i] * rotational;
                }
            }
        }
        m
    }

    /// `tau - dV/dtheta - (M' omega - dT/dtheta)` with derivatives of `M` by
    /// central differences.
    fn forcing(&self, theta: &[f64; 3], omega: &[f64; 3], torques: &[f64; 3]) -> DVec {
        let h = 1e-6;
        let w = DVec::from_row_slice(omega);
        let dm: Vec<DMat> = (0..3)
            .map(|k| {
                let (mut plus, mut minus) = (*theta, *theta);
                plus[k] += h;
                minus[k] -= h;
                (self.mass_matrix(&plus) - self.mass_matrix(&minus)) / (2.0 * h)
            })
            .collect();

        let mut m_dot = DMat::zeros(3, 3);
        for k in 0..3 {
            m_dot += &dm[k] * omega[k];
        }
        let mut f = DVec::from_row_slice(torques) - m_dot * &w;
        for j in 0..3 {
            f[j] += 0.5 * w.dot(&(&dm[j] * &w));
            for i in 0..3 {
                f[j] -= self.masses[i] * self.g * self.com_jacobian(theta, i)[1][j];
            }
        }
        f
    }
}

#[test]
fn mass_matrix_is_symmetric() {
    let eqs = derive();
    assert_eq!(eqs.mass_matrix.nrows(), 3);
    assert!(eqs.mass_matrix.is_symmetric());
    assert!(eqs.mass_matrix_full.is_symmetric());
}

#[test]
fn mass_matrix_is_kinetic_energy_hessian() {
    let model = LegModel::new().unwrap();
    let eqs = model.derive().unwrap();
    let ke = model.kinetic_energy().unwrap();
    let speeds = &model.symbols().speeds;
    for (r, ur) in speeds.iter().enumerate() {
        for (s, us) in speeds.iter().enumerate() {
            let hessian = ke.diff(ur).diff(us).trigsimp();
            assert_eq!(hessian, eqs.mass_matrix[(r, s)], "entry ({r}, {s})");
        }
    }
}

#[test]
fn torso_diagonal_entry() {
    let eqs = derive();
    let s = &eqs.symbols;
    let [d_t, m_t, i_t] = [8, 9, 10].map(|i| Expr::from(&s.constants[i]));
    assert_eq!(eqs.mass_matrix_full[(5, 5)], i_t + d_t.pow(2) * m_t);
}

#[test]
fn full_system_layout() {
    let eqs = derive();
    let full = &eqs.mass_matrix_full;
    assert_eq!(full.nrows(), 6);
    for r in 0..3 {
        for c in 0..6 {
            let expected = if r == c { Expr::one() } else { Expr::zero() };
            assert_eq!(full[(r, c)], expected);
            assert_eq!(full[(c, r)], expected);
        }
    }

    assert_eq!(eqs.forcing_full.len(), 6);
    for (f, omega) in eqs.forcing_full.iter().zip(&eqs.symbols.speeds) {
        assert_eq!(*f, Expr::from(omega));
    }
    assert_eq!(&eqs.forcing_full[3..], eqs.forcing.as_slice());
}

#[test]
fn kinematic_map_is_identity() {
    let eqs = derive();
    let map = eqs.kane().kindiffdict();
    let s = &eqs.symbols;
    for (theta, omega) in s.coordinates.iter().zip(&s.speeds) {
        assert_eq!(map[&theta.diff_t().unwrap()], Expr::from(omega));
    }
}

#[test]
fn matches_independent_lagrangian() {
    let eqs = derive();
    let ode = eqs.ode_function().unwrap();
    let params = LegParameters::default();
    let reference = Reference::new(&params);
    let p = params.values();

    let states = [
        ([0.1, -0.3, 0.2], [0.5, -1.0, 0.7], [1.0, -2.0, 0.5]),
        ([-0.6, 1.2, -0.4], [0.0, 2.0, -0.3], [0.0, 0.0, 0.0]),
        ([1.4, 0.2, -1.1], [-0.8, 0.1, 1.5], [10.0, 3.0, -4.0]),
    ];
    for (theta, omega, torques) in states {
        let x: Vec<f64> = theta.iter().chain(&omega).copied().collect();

        let full = ode.mass_matrix(&x, &torques, &p);
        let m_ref = reference.mass_matrix(&theta);
        for r in 0..3 {
            for c in 0..3 {
                assert_relative_eq!(full[(r + 3, c + 3)], m_ref[(r, c)], epsilon = 1e-10);
            }
        }

        let f = ode.forcing(&x, &torques, &p);
        let f_ref = reference.forcing(&theta, &omega, &torques);
        for r in 0..3 {
            assert_relative_eq!(f[r], omega[r]);
            assert_relative_eq!(f[r + 3], f_ref[r], epsilon = 1e-5);
        }
    }
}

#[test]
fn upright_rest_is_equilibrium() {
    let ode = derive().ode_function().unwrap();
    let p = LegParameters::default().values();
    let xdot = ode.rhs(&[0.0; 6], &[0.0; 3], &p).unwrap();
    assert_relative_eq!(xdot.norm(), 0.0, epsilon = 1e-12);

    // leaning forward, gravity pulls further forward
    let f = ode.forcing(&[0.05, 0.0, 0.0, 0.0, 0.0, 0.0], &[0.0; 3], &p);
    assert!(f[3] > 0.0);
}

#[test]
fn residual_vanishes_along_solution() {
    let eqs = derive();
    let ode = eqs.ode_function().unwrap();
    let params = LegParameters::default();
    let p = params.values();
    let s = &eqs.symbols;

    let theta = [0.3, -0.5, 0.8];
    let omega = [-0.4, 0.9, 0.2];
    let torques = [5.0, -3.0, 1.5];
    let x: Vec<f64> = theta.iter().chain(&omega).copied().collect();
    let xdot = ode.rhs(&x, &torques, &p).unwrap();

    let mut env = Bindings::new();
    for (i, sym) in s.coordinates.iter().enumerate() {
        env.insert(sym.clone(), theta[i]);
    }
    for (i, sym) in s.speeds.iter().enumerate() {
        env.insert(sym.clone(), omega[i]);
        env.insert(sym.diff_t().unwrap(), xdot[i + 3]);
    }
    for (sym, v) in s.specified.iter().zip(torques) {
        env.insert(sym.clone(), v);
    }
    for (sym, v) in s.constants.iter().zip(p) {
        env.insert(sym.clone(), v);
    }

    for r in eqs.residual() {
        assert_relative_eq!(r.evaluate(&env).unwrap(), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn parameters_from_json_drive_evaluation() {
    assert!(LegParameters::from_json(r#"{ "gravity": 0.0 }"#).is_err());

    let earth = LegParameters::default();
    let moon = LegParameters::from_json(r#"{ "gravity": 1.62 }"#).unwrap();
    let ode = derive().ode_function().unwrap();

    // at rest with no torques the accelerations scale with gravity
    let x = [0.7, -0.2, 0.4, 0.0, 0.0, 0.0];
    let a_earth = ode.rhs(&x, &[0.0; 3], &earth.values()).unwrap();
    let a_moon = ode.rhs(&x, &[0.0; 3], &moon.values()).unwrap();
    for i in 3..6 {
        assert_relative_eq!(a_moon[i], a_earth[i] * 1.62 / 9.81, epsilon = 1e-10);
    }
}
