//! Kane's method equation assembler.

use std::collections::{BTreeMap, BTreeSet};

use limb_expr::{Expr, Matrix, Symbol};
use limb_mech::{Body, FrameId, Load, Mechanism, PointId, Vector};
use tracing::{debug, info};

use crate::error::{KaneError, Result};
use crate::kinematics::KinematicMap;

#[derive(Debug, Clone)]
struct Formed {
    fr: Vec<Expr>,
    frstar: Vec<Expr>,
    mass_matrix: Matrix,
    forcing: Vec<Expr>,
}

/// Equations of motion of a holonomic, unconstrained system by Kane's method.
///
/// Construct with [`KanesMethod::new`], then call
/// [`KanesMethod::kanes_equations`] once with the bodies and loads. The mass
/// matrix and forcing accessors are available afterwards.
#[derive(Debug, Clone)]
pub struct KanesMethod {
    frame: FrameId,
    coordinates: Vec<Symbol>,
    speeds: Vec<Symbol>,
    speed_derivatives: Vec<Symbol>,
    kinematics: KinematicMap,
    formed: Option<Formed>,
}

impl KanesMethod {
    /// Set up the method in the inertial `frame`.
    ///
    /// `kd_eqs` relate the speeds to the coordinate derivatives, one per
    /// coordinate, e.g. `u_i - q_i'`.
    pub fn new(
        frame: FrameId,
        coordinates: &[Symbol],
        speeds: &[Symbol],
        kd_eqs: &[Expr],
    ) -> Result<Self> {
        if speeds.len() != coordinates.len() {
            return Err(KaneError::DimensionMismatch {
                what: "generalized speeds",
                expected: coordinates.len(),
                found: speeds.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for s in coordinates.iter().chain(speeds) {
            if !s.is_dynamic() {
                return Err(KaneError::NotDynamic(s.to_string()));
            }
            if !seen.insert(s.clone()) {
                return Err(KaneError::DuplicateSymbol(s.to_string()));
            }
        }

        let kinematics = KinematicMap::solve(coordinates, kd_eqs)?;
        let speed_derivatives = speeds
            .iter()
            .map(|u| u.diff_t().ok_or_else(|| KaneError::NotDynamic(u.to_string())))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            coordinates = coordinates.len(),
            "solved kinematic differential equations"
        );

        Ok(Self {
            frame,
            coordinates: coordinates.to_vec(),
            speeds: speeds.to_vec(),
            speed_derivatives,
            kinematics,
            formed: None,
        })
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn coordinates(&self) -> &[Symbol] {
        &self.coordinates
    }

    pub fn speeds(&self) -> &[Symbol] {
        &self.speeds
    }

    /// `q'` in terms of `u`, keyed by the `q'` symbols.
    pub fn kindiffdict(&self) -> BTreeMap<Symbol, Expr> {
        self.kinematics.as_map()
    }

    /// Replace `q'` by its kinematic solution, express in the inertial frame
    /// and simplify.
    fn in_inertial(&self, mech: &Mechanism, v: &Vector) -> Result<Vector> {
        let qdot = self.kinematics.as_map();
        Ok(mech.express(v, self.frame)?.subs(&qdot)?.trigsimp())
    }

    fn point_velocity(&self, mech: &Mechanism, point: PointId) -> Result<Vector> {
        let v = mech.vel(point, self.frame)?;
        self.in_inertial(mech, &v)
    }

    fn frame_ang_vel(&self, mech: &Mechanism, frame: FrameId) -> Result<Vector> {
        let w = mech.ang_vel_in(frame, self.frame)?;
        self.in_inertial(mech, &w)
    }

    /// Inertial time derivative of a vector already expressed in the inertial frame.
    fn rate(&self, mech: &Mechanism, v: &Vector) -> Result<Vector> {
        let d = mech.dt(v, self.frame)?;
        self.in_inertial(mech, &d)
    }

    /// Form `Fr` and `Fr*`.
    pub fn kanes_equations(
        &mut self,
        mech: &Mechanism,
        bodies: &[Body],
        loads: &[Load],
    ) -> Result<(Vec<Expr>, Vec<Expr>)> {
        let n = self.speeds.len();
        debug!(
            speeds = n,
            bodies = bodies.len(),
            loads = loads.len(),
            "forming Kane's equations"
        );

        // Generalized active forces.
        let mut fr = vec![Expr::zero(); n];
        for load in loads {
            let (vector, velocity) = match load {
                Load::Force { point, force } => (force, self.point_velocity(mech, *point)?),
                Load::Torque { frame, torque } => (torque, self.frame_ang_vel(mech, *frame)?),
            };
            for (r, u) in self.speeds.iter().enumerate() {
                fr[r] += mech.dot(vector, &velocity.diff(u))?;
            }
        }

        // Generalized inertia forces.
        let mut frstar = vec![Expr::zero(); n];
        for body in bodies {
            let v = self.point_velocity(mech, body.point())?;
            let a = self.rate(mech, &v)?;
            let inertia_force = -(a.scale(body.mass()));
            for (r, u) in self.speeds.iter().enumerate() {
                frstar[r] += mech.dot(&inertia_force, &v.diff(u))?;
            }

            if let Body::Rigid(rb) = body {
                let w = self.frame_ang_vel(mech, rb.frame)?;
                let alpha = self.rate(mech, &w)?;
                let i_alpha = mech.inertia_dot(&rb.inertia, &alpha)?;
                let i_w = mech.inertia_dot(&rb.inertia, &w)?;
                let inertia_torque = -(i_alpha + mech.cross(&w, &i_w)?);
                for (r, u) in self.speeds.iter().enumerate() {
                    frstar[r] += mech.dot(&inertia_torque, &w.diff(u))?;
                }
            }
        }

        let fr: Vec<Expr> = fr.iter().map(Expr::trigsimp).collect();
        let frstar: Vec<Expr> = frstar.iter().map(Expr::trigsimp).collect();

        let mass_matrix = Matrix::from_fn(n, n, |r, s| {
            (-frstar[r].diff(&self.speed_derivatives[s])).trigsimp()
        });

        let at_rest: BTreeMap<Symbol, Expr> = self
            .speed_derivatives
            .iter()
            .map(|ud| (ud.clone(), Expr::zero()))
            .collect();
        let forcing = fr
            .iter()
            .zip(&frstar)
            .map(|(f, fs)| Ok((f + fs.subs(&at_rest)?).trigsimp()))
            .collect::<Result<Vec<_>>>()?;

        info!(
            speeds = n,
            mass_matrix_terms = mass_matrix.as_slice().iter().map(Expr::num_terms).sum::<usize>(),
            forcing_terms = forcing.iter().map(Expr::num_terms).sum::<usize>(),
            "formed Kane's equations"
        );

        self.formed = Some(Formed {
            fr: fr.clone(),
            frstar: frstar.clone(),
            mass_matrix,
            forcing,
        });
        Ok((fr, frstar))
    }

    fn formed(&self) -> Result<&Formed> {
        self.formed.as_ref().ok_or(KaneError::NotFormed)
    }

    /// Generalized active forces.
    pub fn fr(&self) -> Result<&[Expr]> {
        Ok(&self.formed()?.fr)
    }

    /// Generalized inertia forces.
    pub fn frstar(&self) -> Result<&[Expr]> {
        Ok(&self.formed()?.frstar)
    }

    /// `M` with `M · u' = forcing`.
    pub fn mass_matrix(&self) -> Result<&Matrix> {
        Ok(&self.formed()?.mass_matrix)
    }

    /// Dynamic forcing: every term of `Fr + Fr*` not multiplying `u'`.
    pub fn forcing(&self) -> Result<&[Expr]> {
        Ok(&self.formed()?.forcing)
    }

    /// Mass matrix of the full first-order system in `x = [q; u]`.
    pub fn mass_matrix_full(&self) -> Result<Matrix> {
        let n = self.coordinates.len();
        Ok(Matrix::block_diag(&Matrix::identity(n), self.mass_matrix()?))
    }

    /// Forcing of the full first-order system in `x = [q; u]`.
    pub fn forcing_full(&self) -> Result<Vec<Expr>> {
        let mut out = self.kinematics.solution().to_vec();
        out.extend_from_slice(self.forcing()?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limb_mech::{Axis, Inertia, Particle, RigidBody};

    struct Setup {
        mech: Mechanism,
        n: FrameId,
        kane: KanesMethod,
        bodies: Vec<Body>,
        loads: Vec<Load>,
        q: Expr,
        m: Expr,
        l: Expr,
        g: Expr,
        izz: Expr,
        torque: Expr,
    }

    /// Rod pivoting about `n.z` with its mass center at `l` along the rod,
    /// gravity along `-n.y`, driven by a specified torque.
    fn compound_pendulum() -> Setup {
        let q_sym = Symbol::dynamic("q");
        let u_sym = Symbol::dynamic("u");
        let q = Expr::from(&q_sym);
        let u = Expr::from(&u_sym);
        let m = Expr::from(Symbol::constant("m"));
        let l = Expr::from(Symbol::constant("l"));
        let g = Expr::from(Symbol::constant("g"));
        let izz = Expr::from(Symbol::constant("I"));
        let torque = Expr::from(Symbol::dynamic("T"));

        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let a = mech.orient_axis("A", n, Axis::Z, &q).unwrap();
        mech.set_ang_vel(a, n, Vector::along(n, Axis::Z, u.clone())).unwrap();
        let o = mech.add_point("O");
        mech.set_vel(o, n, Vector::zero()).unwrap();
        let c = mech.locate_new("C", o, Vector::along(a, Axis::Y, l.clone()));
        mech.v2pt_theory(c, o, n, a).unwrap();

        let bodies = vec![Body::from(RigidBody::new(
            "rod",
            c,
            a,
            m.clone(),
            Inertia::principal(a, Expr::zero(), Expr::zero(), izz.clone()),
        ))];
        let loads = vec![
            Load::force(c, Vector::along(n, Axis::Y, -(&m * &g))),
            Load::torque(a, Vector::along(n, Axis::Z, torque.clone())),
        ];
        let kd = vec![&u - q.dt()];
        let kane = KanesMethod::new(n, &[q_sym], &[u_sym], &kd).unwrap();

        Setup {
            mech,
            n,
            kane,
            bodies,
            loads,
            q,
            m,
            l,
            g,
            izz,
            torque,
        }
    }

    #[test]
    fn compound_pendulum_equations() {
        let mut s = compound_pendulum();
        let (fr, frstar) = s.kane.kanes_equations(&s.mech, &s.bodies, &s.loads).unwrap();
        assert_eq!(fr.len(), 1);
        assert_eq!(frstar.len(), 1);

        let mass = s.kane.mass_matrix().unwrap();
        assert_eq!(mass[(0, 0)], &s.izz + &s.m * s.l.pow(2));

        // inverted pendulum: gravity pushes it away from upright
        let expected = &s.g * &s.l * &s.m * s.q.sin().unwrap() + &s.torque;
        assert_eq!(s.kane.forcing().unwrap()[0], expected);
    }

    #[test]
    fn full_system_layout() {
        let mut s = compound_pendulum();
        s.kane.kanes_equations(&s.mech, &s.bodies, &s.loads).unwrap();
        let full = s.kane.mass_matrix_full().unwrap();
        assert_eq!(full.nrows(), 2);
        assert_eq!(full[(0, 0)], Expr::one());
        assert!(full[(0, 1)].is_zero());

        let f = s.kane.forcing_full().unwrap();
        assert_eq!(f[0], Expr::from(Symbol::dynamic("u")));
        assert_eq!(s.kane.frame(), s.n);
    }

    #[test]
    fn accessors_before_forming() {
        let s = compound_pendulum();
        assert_eq!(s.kane.mass_matrix().unwrap_err(), KaneError::NotFormed);
        assert!(s.kane.forcing_full().is_err());
        assert!(s.kane.fr().is_err());
    }

    #[test]
    fn particle_pendulum_has_no_rotational_inertia() {
        let mut s = compound_pendulum();
        let point = s.bodies[0].point();
        let bodies = vec![Body::from(Particle::new("bob", point, s.m.clone()))];
        s.kane.kanes_equations(&s.mech, &bodies, &s.loads).unwrap();
        assert_eq!(s.kane.mass_matrix().unwrap()[(0, 0)], &s.m * s.l.pow(2));
    }

    #[test]
    fn gyroscopic_terms_match_lagrange() {
        // Gimbal: A yaws about n.z by q1, B pitches about a.x by q2.
        let q = limb_expr::dynamic_symbols(&["q1", "q2"]);
        let u = limb_expr::dynamic_symbols(&["u1", "u2"]);
        let c = |name: &str| Expr::from(Symbol::constant(name));

        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let a = mech.orient_axis("A", n, Axis::Z, &Expr::from(&q[0])).unwrap();
        let b = mech.orient_axis("B", a, Axis::X, &Expr::from(&q[1])).unwrap();
        mech.set_ang_vel(a, n, Vector::along(n, Axis::Z, Expr::from(&u[0]))).unwrap();
        mech.set_ang_vel(b, a, Vector::along(a, Axis::X, Expr::from(&u[1]))).unwrap();
        let o = mech.add_point("O");
        mech.set_vel(o, n, Vector::zero()).unwrap();
        let g = mech.locate_new("G", o, Vector::along(b, Axis::Y, c("l")));
        mech.v2pt_theory(g, o, n, b).unwrap();

        let inertia = Inertia::new(b, c("Ixx"), c("Iyy"), c("Izz"), c("Ixy"), c("Iyz"), c("Izx"));
        let body = Body::from(RigidBody::new("gimbal", g, b, c("m"), inertia));

        let kd: Vec<Expr> = u
            .iter()
            .zip(&q)
            .map(|(ui, qi)| Expr::from(ui) - Expr::from(qi).dt())
            .collect();
        let mut kane = KanesMethod::new(n, &q, &u, &kd).unwrap();
        let (_, frstar) = kane.kanes_equations(&mech, &[body.clone()], &[]).unwrap();

        let ke = mech.kinetic_energy(&body, n).unwrap();
        let qdot = kane.kindiffdict();
        for r in 0..2 {
            let lagrange = ke.diff(&u[r]).dt().subs(&qdot).unwrap() - ke.diff(&q[r]);
            assert!(
                (lagrange + &frstar[r]).trigsimp().is_zero(),
                "row {r} disagrees"
            );
        }

        // products of inertia couple the speeds
        assert!(!kane.mass_matrix().unwrap()[(0, 1)].is_zero());
    }

    #[test]
    fn rejects_bad_setup() {
        let q = Symbol::dynamic("q");
        let u = Symbol::dynamic("u");
        let kd = vec![Expr::from(&u) - Expr::from(&q).dt()];
        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");

        let err = KanesMethod::new(n, &[q.clone()], &[], &kd).unwrap_err();
        assert!(matches!(err, KaneError::DimensionMismatch { .. }));

        let err = KanesMethod::new(n, &[q.clone()], &[q.clone()], &kd).unwrap_err();
        assert_eq!(err, KaneError::DuplicateSymbol("q".to_string()));

        let c = Symbol::constant("c");
        let err = KanesMethod::new(n, &[c], &[u], &kd).unwrap_err();
        assert_eq!(err, KaneError::NotDynamic("c".to_string()));
    }

    #[test]
    fn undefined_velocity_surfaces() {
        let mut s = compound_pendulum();
        let stray = s.mech.add_point("stray");
        let loads = vec![Load::force(stray, s.mech.unit(s.n, Axis::X))];
        let err = s.kane.kanes_equations(&s.mech, &[], &loads).unwrap_err();
        assert!(matches!(err, KaneError::Mechanics(_)));
    }
}
