//! Three-link planar leg: lower leg, upper leg and torso.
//!
//! The ankle is pinned to the ground. Each segment rotates about the axis
//! normal to the sagittal plane (`N.z`) relative to the segment below it;
//! `y` of each segment frame points from its proximal joint towards the next
//! joint. With all joint angles zero the body stands upright, with gravity
//! acting along `-N.y`.

use limb_expr::{Expr, Matrix, Symbol, dynamic_symbols, symbols};
use limb_kane::{KanesMethod, OdeFunction};
use limb_mech::{Axis, Body, FrameId, Inertia, Load, Mechanism, PointId, RigidBody, Vector};
use tracing::{debug, info};

use crate::error::Result;

/// Symbols of the leg model.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSymbols {
    /// Ankle, knee and hip angles `theta1..3`.
    pub coordinates: Vec<Symbol>,
    /// Joint angular rates `omega1..3`.
    pub speeds: Vec<Symbol>,
    /// `l_L, d_L, m_L, I_Lz, l_U, d_U, m_U, I_Uz, d_T, m_T, I_Tz, g`.
    pub constants: Vec<Symbol>,
    /// Ankle, knee and hip torques `T_a, T_k, T_h`.
    pub specified: Vec<Symbol>,
}

impl Default for LegSymbols {
    fn default() -> Self {
        Self::new()
    }
}

impl LegSymbols {
    pub fn new() -> Self {
        Self {
            coordinates: dynamic_symbols(&["theta1", "theta2", "theta3"]),
            speeds: dynamic_symbols(&["omega1", "omega2", "omega3"]),
            constants: symbols(&[
                "l_L", "d_L", "m_L", "I_Lz", "l_U", "d_U", "m_U", "I_Uz", "d_T", "m_T", "I_Tz", "g",
            ]),
            specified: dynamic_symbols(&["T_a", "T_k", "T_h"]),
        }
    }

    fn constant(&self, i: usize) -> Expr {
        Expr::from(&self.constants[i])
    }
}

/// Frames of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegFrames {
    pub inertial: FrameId,
    pub lower_leg: FrameId,
    pub upper_leg: FrameId,
    pub torso: FrameId,
}

/// Joints and mass centers of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegPoints {
    pub ankle: PointId,
    pub knee: PointId,
    pub hip: PointId,
    pub lower_leg_mass_center: PointId,
    pub upper_leg_mass_center: PointId,
    pub torso_mass_center: PointId,
}

/// Kinematics, loads and bodies of the leg, ready for [`LegModel::derive`].
#[derive(Debug, Clone)]
pub struct LegModel {
    symbols: LegSymbols,
    mechanism: Mechanism,
    frames: LegFrames,
    points: LegPoints,
    kd_eqs: Vec<Expr>,
    loads: Vec<Load>,
    bodies: Vec<Body>,
}

impl LegModel {
    pub fn new() -> Result<Self> {
        let symbols = LegSymbols::new();
        let theta: Vec<Expr> = symbols.coordinates.iter().map(Expr::from).collect();
        let omega: Vec<Expr> = symbols.speeds.iter().map(Expr::from).collect();
        let [l_l, d_l, m_l, i_l, l_u, d_u, m_u, i_u, d_t, m_t, i_t, g]: [Expr; 12] =
            std::array::from_fn(|i| symbols.constant(i));
        let [t_a, t_k, t_h]: [Expr; 3] = std::array::from_fn(|i| Expr::from(&symbols.specified[i]));

        let mut mech = Mechanism::new();

        // Orientations.
        let n = mech.add_frame("N");
        let lower = mech.orient_axis("L", n, Axis::Z, &theta[0])?;
        let upper = mech.orient_axis("U", lower, Axis::Z, &theta[1])?;
        let torso = mech.orient_axis("T", upper, Axis::Z, &theta[2])?;
        mech.set_ang_vel(lower, n, Vector::along(n, Axis::Z, omega[0].clone()))?;
        mech.set_ang_vel(upper, lower, Vector::along(lower, Axis::Z, omega[1].clone()))?;
        mech.set_ang_vel(torso, upper, Vector::along(upper, Axis::Z, omega[2].clone()))?;
        let frames = LegFrames {
            inertial: n,
            lower_leg: lower,
            upper_leg: upper,
            torso,
        };

        // Joints and mass centers.
        let ankle = mech.add_point("ankle");
        mech.set_vel(ankle, n, Vector::zero())?;
        let knee = mech.locate_new("knee", ankle, Vector::along(lower, Axis::Y, l_l));
        let hip = mech.locate_new("hip", knee, Vector::along(upper, Axis::Y, l_u));
        let lower_cm = mech.locate_new(
            "lower_leg_mass_center",
            ankle,
            Vector::along(lower, Axis::Y, d_l),
        );
        let upper_cm = mech.locate_new(
            "upper_leg_mass_center",
            knee,
            Vector::along(upper, Axis::Y, d_u),
        );
        let torso_cm =
            mech.locate_new("torso_mass_center", hip, Vector::along(torso, Axis::Y, d_t));

        mech.v2pt_theory(lower_cm, ankle, n, lower)?;
        mech.v2pt_theory(knee, ankle, n, lower)?;
        mech.v2pt_theory(upper_cm, knee, n, upper)?;
        mech.v2pt_theory(hip, knee, n, upper)?;
        mech.v2pt_theory(torso_cm, hip, n, torso)?;
        let points = LegPoints {
            ankle,
            knee,
            hip,
            lower_leg_mass_center: lower_cm,
            upper_leg_mass_center: upper_cm,
            torso_mass_center: torso_cm,
        };
        debug!(frames = 4, points = 6, "built leg kinematics");

        let kd_eqs: Vec<Expr> = omega
            .iter()
            .zip(&theta)
            .map(|(w, q)| w - q.dt())
            .collect();

        // Gravity at the mass centers, joint torques on the segments. Each
        // joint torque acts positively on the distal segment and negatively
        // on the proximal one.
        let weight = |m: &Expr| Vector::along(n, Axis::Y, -(m * &g));
        let loads = vec![
            Load::force(lower_cm, weight(&m_l)),
            Load::force(upper_cm, weight(&m_u)),
            Load::force(torso_cm, weight(&m_t)),
            Load::torque(lower, Vector::along(n, Axis::Z, &t_a - &t_k)),
            Load::torque(upper, Vector::along(n, Axis::Z, &t_k - &t_h)),
            Load::torque(torso, Vector::along(n, Axis::Z, t_h)),
        ];

        let central =
            |frame: FrameId, izz: Expr| Inertia::principal(frame, Expr::zero(), Expr::zero(), izz);
        let bodies: Vec<Body> = vec![
            RigidBody::new("lower_leg", lower_cm, lower, m_l, central(lower, i_l)).into(),
            RigidBody::new("upper_leg", upper_cm, upper, m_u, central(upper, i_u)).into(),
            RigidBody::new("torso", torso_cm, torso, m_t, central(torso, i_t)).into(),
        ];
        debug!(loads = loads.len(), bodies = 3, "assembled loads and bodies");

        Ok(Self {
            symbols,
            mechanism: mech,
            frames,
            points,
            kd_eqs,
            loads,
            bodies,
        })
    }

    pub fn symbols(&self) -> &LegSymbols {
        &self.symbols
    }

    pub fn mechanism(&self) -> &Mechanism {
        &self.mechanism
    }

    pub fn frames(&self) -> LegFrames {
        self.frames
    }

    pub fn points(&self) -> LegPoints {
        self.points
    }

    /// `omega_i - theta_i'`.
    pub fn kinematic_equations(&self) -> &[Expr] {
        &self.kd_eqs
    }

    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Total kinetic energy in the inertial frame.
    pub fn kinetic_energy(&self) -> Result<Expr> {
        let mut total = Expr::zero();
        for body in &self.bodies {
            total += self.mechanism.kinetic_energy(body, self.frames.inertial)?;
        }
        Ok(total.trigsimp())
    }

    /// Form Kane's equations and the mass matrix and forcing vector.
    pub fn derive(&self) -> Result<LegEquations> {
        let mut kane = KanesMethod::new(
            self.frames.inertial,
            &self.symbols.coordinates,
            &self.symbols.speeds,
            &self.kd_eqs,
        )?;
        let (fr, frstar) = kane.kanes_equations(&self.mechanism, &self.bodies, &self.loads)?;

        let mass_matrix = kane.mass_matrix()?.trigsimp();
        let forcing: Vec<Expr> = kane.forcing()?.iter().map(Expr::trigsimp).collect();
        let mass_matrix_full = kane.mass_matrix_full()?.trigsimp();
        let forcing_full: Vec<Expr> = kane.forcing_full()?.iter().map(Expr::trigsimp).collect();

        info!(
            states = mass_matrix_full.nrows(),
            "derived leg equations of motion"
        );

        Ok(LegEquations {
            symbols: self.symbols.clone(),
            fr,
            frstar,
            mass_matrix,
            forcing,
            mass_matrix_full,
            forcing_full,
            kane,
        })
    }
}

/// Result of [`LegModel::derive`].
///
/// `mass_matrix_full · [theta'; omega'] = forcing_full`.
#[derive(Debug, Clone)]
pub struct LegEquations {
    pub symbols: LegSymbols,
    pub fr: Vec<Expr>,
    pub frstar: Vec<Expr>,
    pub mass_matrix: Matrix,
    pub forcing: Vec<Expr>,
    pub mass_matrix_full: Matrix,
    pub forcing_full: Vec<Expr>,
    kane: KanesMethod,
}

impl LegEquations {
    /// `Fr + Fr*`, zero along every motion of the leg.
    pub fn residual(&self) -> Vec<Expr> {
        self.fr
            .iter()
            .zip(&self.frstar)
            .map(|(a, b)| (a + b).trigsimp())
            .collect()
    }

    pub fn kane(&self) -> &KanesMethod {
        &self.kane
    }

    /// Compile for numeric evaluation with inputs ordered as
    /// `[theta, omega]`, `[T_a, T_k, T_h]` and [`LegSymbols::constants`].
    pub fn ode_function(&self) -> Result<OdeFunction> {
        Ok(OdeFunction::build(
            &self.kane,
            &self.symbols.specified,
            &self.symbols.constants,
        )?)
    }
}
