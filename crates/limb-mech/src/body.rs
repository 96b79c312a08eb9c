//! Bodies and loads.

use limb_expr::Expr;

use crate::frame::{FrameId, PointId};
use crate::vector::Vector;

/// Central inertia of a rigid body, components in the body frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Inertia {
    frame: FrameId,
    matrix: [[Expr; 3]; 3],
}

impl Inertia {
    /// Full symmetric inertia from its six independent components.
    pub fn new(
        frame: FrameId,
        ixx: Expr,
        iyy: Expr,
        izz: Expr,
        ixy: Expr,
        iyz: Expr,
        izx: Expr,
    ) -> Self {
        Self {
            frame,
            matrix: [
                [ixx, ixy.clone(), izx.clone()],
                [ixy, iyy, iyz.clone()],
                [izx, iyz, izz],
            ],
        }
    }

    /// Diagonal inertia about the frame's basis directions.
    pub fn principal(frame: FrameId, ixx: Expr, iyy: Expr, izz: Expr) -> Self {
        Self::new(frame, ixx, iyy, izz, Expr::zero(), Expr::zero(), Expr::zero())
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Entry `(i, j)` of the inertia matrix.
    ///
    /// # Panics
    ///
    /// If `i` or `j` is not in `0..3`.
    pub fn component(&self, i: usize, j: usize) -> &Expr {
        &self.matrix[i][j]
    }

    /// `I · v` for components of `v` already expressed in the body frame.
    pub(crate) fn apply(&self, v: &[Expr; 3]) -> [Expr; 3] {
        std::array::from_fn(|i| (0..3).map(|k| &self.matrix[i][k] * &v[k]).sum())
    }
}

/// A rigid body: mass at `mass_center`, orientation given by `frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub name: String,
    pub mass_center: PointId,
    pub frame: FrameId,
    pub mass: Expr,
    pub inertia: Inertia,
}

impl RigidBody {
    pub fn new(
        name: impl Into<String>,
        mass_center: PointId,
        frame: FrameId,
        mass: Expr,
        inertia: Inertia,
    ) -> Self {
        Self {
            name: name.into(),
            mass_center,
            frame,
            mass,
            inertia,
        }
    }
}

/// A point mass.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub name: String,
    pub point: PointId,
    pub mass: Expr,
}

impl Particle {
    pub fn new(name: impl Into<String>, point: PointId, mass: Expr) -> Self {
        Self {
            name: name.into(),
            point,
            mass,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Rigid(RigidBody),
    Particle(Particle),
}

impl Body {
    pub fn name(&self) -> &str {
        match self {
            Body::Rigid(b) => &b.name,
            Body::Particle(p) => &p.name,
        }
    }

    pub fn mass(&self) -> &Expr {
        match self {
            Body::Rigid(b) => &b.mass,
            Body::Particle(p) => &p.mass,
        }
    }

    /// Point carrying the mass.
    pub fn point(&self) -> PointId {
        match self {
            Body::Rigid(b) => b.mass_center,
            Body::Particle(p) => p.point,
        }
    }
}

impl From<RigidBody> for Body {
    fn from(body: RigidBody) -> Self {
        Body::Rigid(body)
    }
}

impl From<Particle> for Body {
    fn from(particle: Particle) -> Self {
        Body::Particle(particle)
    }
}

/// Applied load: a force bound to a point or a torque bound to a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Load {
    Force { point: PointId, force: Vector },
    Torque { frame: FrameId, torque: Vector },
}

impl Load {
    pub fn force(point: PointId, force: Vector) -> Self {
        Load::Force { point, force }
    }

    pub fn torque(frame: FrameId, torque: Vector) -> Self {
        Load::Torque { frame, torque }
    }
}
