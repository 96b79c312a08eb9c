//! Frame and point arena with the operations that need both.

use std::collections::BTreeMap;

use limb_expr::{Angle, Expr};

use crate::body::{Body, Inertia};
use crate::error::{MechError, Result};
use crate::frame::{Axis, Dcm, FrameId, PointId, apply, apply_transpose, simple_rotation};
use crate::vector::Vector;

#[derive(Debug, Clone)]
struct Orientation {
    parent: FrameId,
    /// Child-to-parent direction cosines.
    dcm: Dcm,
    /// Angular velocity of the child in the parent.
    ang_vel: Vector,
}

#[derive(Debug, Clone)]
struct FrameData {
    name: String,
    orientation: Option<Orientation>,
}

#[derive(Debug, Clone)]
struct PointData {
    name: String,
    /// Origin point and the offset from it.
    position: Option<(PointId, Vector)>,
    velocities: BTreeMap<FrameId, Vector>,
}

/// Owner of all frames and points of a system.
#[derive(Debug, Clone, Default)]
pub struct Mechanism {
    frames: Vec<FrameData>,
    points: Vec<PointData>,
}

impl Mechanism {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Frames --

    /// Add a root frame (typically the inertial frame).
    pub fn add_frame(&mut self, name: impl Into<String>) -> FrameId {
        self.frames.push(FrameData {
            name: name.into(),
            orientation: None,
        });
        FrameId(self.frames.len() - 1)
    }

    /// Add a frame rotated by `angle` about `axis` of `parent`.
    ///
    /// The angle must be linear in its symbols. The angular velocity relative
    /// to the parent defaults to `angle' * axis`.
    pub fn orient_axis(
        &mut self,
        name: impl Into<String>,
        parent: FrameId,
        axis: Axis,
        angle: &Expr,
    ) -> Result<FrameId> {
        let angle = Angle::from_expr(angle)?;
        let dcm = simple_rotation(axis, &Expr::cos_of(&angle), &Expr::sin_of(&angle));
        let ang_vel = Vector::along(parent, axis, angle.dt());
        self.frames.push(FrameData {
            name: name.into(),
            orientation: Some(Orientation {
                parent,
                dcm,
                ang_vel,
            }),
        });
        Ok(FrameId(self.frames.len() - 1))
    }

    /// # Panics
    ///
    /// If `frame` was not created by this mechanism.
    pub fn frame_name(&self, frame: FrameId) -> &str {
        &self.frames[frame.0].name
    }

    fn check_frame(&self, frame: FrameId) -> Result<()> {
        if frame.0 < self.frames.len() {
            Ok(())
        } else {
            Err(MechError::UnknownFrame(frame.0))
        }
    }

    fn check_point(&self, point: PointId) -> Result<()> {
        if point.0 < self.points.len() {
            Ok(())
        } else {
            Err(MechError::UnknownPoint(point.0))
        }
    }

    /// # Panics
    ///
    /// If `frame` was not created by this mechanism.
    pub fn parent_frame(&self, frame: FrameId) -> Option<FrameId> {
        self.frames[frame.0].orientation.as_ref().map(|o| o.parent)
    }

    /// Unit vector along `axis` of `frame`.
    pub fn unit(&self, frame: FrameId, axis: Axis) -> Vector {
        Vector::new(frame, axis.unit())
    }

    /// Override the angular velocity of `frame` in `parent`.
    pub fn set_ang_vel(&mut self, frame: FrameId, parent: FrameId, ang_vel: Vector) -> Result<()> {
        self.check_frame(frame)?;
        self.check_frame(parent)?;
        let parent_name = self.frames[parent.0].name.clone();
        let data = &mut self.frames[frame.0];
        match data.orientation.as_mut() {
            Some(o) if o.parent == parent => {
                o.ang_vel = ang_vel;
                Ok(())
            }
            _ => Err(MechError::NotAdjacent {
                frame: data.name.clone(),
                parent: parent_name,
            }),
        }
    }

    /// `frame`, its parent, grandparent, ... up to the root.
    fn frame_ancestors(&self, frame: FrameId) -> Vec<FrameId> {
        let mut out = vec![frame];
        let mut current = frame;
        while let Some(o) = &self.frames[current.0].orientation {
            out.push(o.parent);
            current = o.parent;
        }
        out
    }

    /// Split the paths of `a` and `b` at their deepest common ancestor.
    fn frame_paths(&self, a: FrameId, b: FrameId) -> Result<(Vec<FrameId>, Vec<FrameId>)> {
        let mut up_a = self.frame_ancestors(a);
        let mut up_b = self.frame_ancestors(b);
        let Some(pos_a) = up_a.iter().position(|f| up_b.contains(f)) else {
            return Err(MechError::DisconnectedFrames(
                self.frame_name(a).to_string(),
                self.frame_name(b).to_string(),
            ));
        };
        let common = up_a[pos_a];
        let pos_b = up_b.iter().position(|f| *f == common).unwrap_or(up_b.len());
        up_a.truncate(pos_a);
        up_b.truncate(pos_b);
        Ok((up_a, up_b))
    }

    fn orientation(&self, frame: FrameId) -> &Orientation {
        self.frames[frame.0]
            .orientation
            .as_ref()
            .unwrap_or_else(|| unreachable!("frame paths only contain oriented frames"))
    }

    /// Re-express components given in `from` as components in `to`.
    fn transform(&self, from: FrameId, to: FrameId, components: &[Expr; 3]) -> Result<[Expr; 3]> {
        if from == to {
            return Ok(components.clone());
        }
        let (up, down) = self.frame_paths(from, to)?;
        let mut c = components.clone();
        for f in up {
            c = apply(&self.orientation(f).dcm, &c);
        }
        for f in down.into_iter().rev() {
            c = apply_transpose(&self.orientation(f).dcm, &c);
        }
        Ok(c)
    }

    /// Components of `v` in `frame`.
    pub fn components_in(&self, v: &Vector, frame: FrameId) -> Result<[Expr; 3]> {
        let mut out: [Expr; 3] = Default::default();
        for (from, c) in v.parts() {
            let t = self.transform(from, frame, c)?;
            for (acc, x) in out.iter_mut().zip(t) {
                *acc += x;
            }
        }
        Ok(out)
    }

    /// `v` with all components in `frame`.
    pub fn express(&self, v: &Vector, frame: FrameId) -> Result<Vector> {
        Ok(Vector::new(frame, self.components_in(v, frame)?))
    }

    pub fn dot(&self, a: &Vector, b: &Vector) -> Result<Expr> {
        let mut out = Expr::zero();
        for (frame, ca) in a.parts() {
            let cb = self.components_in(b, frame)?;
            for (x, y) in ca.iter().zip(&cb) {
                out += x * y;
            }
        }
        Ok(out)
    }

    pub fn cross(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        let mut out = Vector::zero();
        for (frame, ca) in a.parts() {
            let cb = self.components_in(b, frame)?;
            out += Vector::new(
                frame,
                [
                    &ca[1] * &cb[2] - &ca[2] * &cb[1],
                    &ca[2] * &cb[0] - &ca[0] * &cb[2],
                    &ca[0] * &cb[1] - &ca[1] * &cb[0],
                ],
            );
        }
        Ok(out)
    }

    /// Angular velocity of `frame` in `reference`.
    pub fn ang_vel_in(&self, frame: FrameId, reference: FrameId) -> Result<Vector> {
        let (up, down) = self.frame_paths(frame, reference)?;
        let mut out = Vector::zero();
        for f in up {
            out += &self.orientation(f).ang_vel;
        }
        for f in down {
            out = &out - &self.orientation(f).ang_vel;
        }
        Ok(out)
    }

    /// Angular acceleration of `frame` in `reference`.
    pub fn ang_acc_in(&self, frame: FrameId, reference: FrameId) -> Result<Vector> {
        let w = self.ang_vel_in(frame, reference)?;
        self.dt(&w, reference)
    }

    /// Time derivative of `v` as seen from `frame`.
    ///
    /// Each part is differentiated component-wise in its own frame, then the
    /// transport term `ω × v` accounts for that frame rotating in `frame`.
    pub fn dt(&self, v: &Vector, frame: FrameId) -> Result<Vector> {
        let mut out = Vector::zero();
        for (part_frame, c) in v.parts() {
            out += Vector::new(part_frame, [c[0].dt(), c[1].dt(), c[2].dt()]);
            if part_frame != frame {
                let w = self.ang_vel_in(part_frame, frame)?;
                out += self.cross(&w, &Vector::new(part_frame, c.clone()))?;
            }
        }
        Ok(out)
    }

    // -- Points --

    /// Add a free-standing point (an origin).
    pub fn add_point(&mut self, name: impl Into<String>) -> PointId {
        self.points.push(PointData {
            name: name.into(),
            position: None,
            velocities: BTreeMap::new(),
        });
        PointId(self.points.len() - 1)
    }

    /// Add a point located at `offset` from `origin`.
    pub fn locate_new(
        &mut self,
        name: impl Into<String>,
        origin: PointId,
        offset: Vector,
    ) -> PointId {
        self.points.push(PointData {
            name: name.into(),
            position: Some((origin, offset)),
            velocities: BTreeMap::new(),
        });
        PointId(self.points.len() - 1)
    }

    /// # Panics
    ///
    /// If `point` was not created by this mechanism.
    pub fn point_name(&self, point: PointId) -> &str {
        &self.points[point.0].name
    }

    fn point_ancestors(&self, point: PointId) -> Vec<PointId> {
        let mut out = vec![point];
        let mut current = point;
        while let Some((origin, _)) = &self.points[current.0].position {
            out.push(*origin);
            current = *origin;
        }
        out
    }

    /// Position of `point` relative to `other`.
    pub fn pos_from(&self, point: PointId, other: PointId) -> Result<Vector> {
        let up_p = self.point_ancestors(point);
        let up_o = self.point_ancestors(other);
        let Some(pos_p) = up_p.iter().position(|p| up_o.contains(p)) else {
            return Err(MechError::DisconnectedPoints(
                self.point_name(point).to_string(),
                self.point_name(other).to_string(),
            ));
        };
        let common = up_p[pos_p];
        let pos_o = up_o.iter().position(|p| *p == common).unwrap_or(up_o.len());

        let mut out = Vector::zero();
        for p in &up_p[..pos_p] {
            if let Some((_, offset)) = &self.points[p.0].position {
                out += offset;
            }
        }
        for p in &up_o[..pos_o] {
            if let Some((_, offset)) = &self.points[p.0].position {
                out = &out - offset;
            }
        }
        Ok(out)
    }

    pub fn set_vel(&mut self, point: PointId, frame: FrameId, vel: Vector) -> Result<()> {
        self.check_point(point)?;
        self.check_frame(frame)?;
        self.points[point.0].velocities.insert(frame, vel);
        Ok(())
    }

    /// Velocity of `point` in `frame`.
    ///
    /// Uses the velocity set on the point when there is one, otherwise
    /// differentiates the offset from the point's origin.
    pub fn vel(&self, point: PointId, frame: FrameId) -> Result<Vector> {
        self.check_point(point)?;
        self.check_frame(frame)?;
        let data = &self.points[point.0];
        if let Some(v) = data.velocities.get(&frame) {
            return Ok(v.clone());
        }
        match &data.position {
            Some((origin, offset)) => Ok(self.vel(*origin, frame)? + self.dt(offset, frame)?),
            None => Err(MechError::VelocityUndefined {
                point: data.name.clone(),
                frame: self.frame_name(frame).to_string(),
            }),
        }
    }

    /// Two-point theory for points fixed in `fixed_frame`:
    /// `v_P = v_O + ω × r_OP`, recorded on `point` and returned.
    pub fn v2pt_theory(
        &mut self,
        point: PointId,
        other: PointId,
        out_frame: FrameId,
        fixed_frame: FrameId,
    ) -> Result<Vector> {
        let v_other = self.vel(other, out_frame)?;
        let w = self.ang_vel_in(fixed_frame, out_frame)?;
        let r = self.pos_from(point, other)?;
        let v = v_other + self.cross(&w, &r)?;
        self.set_vel(point, out_frame, v.clone())?;
        Ok(v)
    }

    // -- Bodies --

    /// `I · v`, result in the inertia's frame.
    pub fn inertia_dot(&self, inertia: &Inertia, v: &Vector) -> Result<Vector> {
        let c = self.components_in(v, inertia.frame())?;
        Ok(Vector::new(inertia.frame(), inertia.apply(&c)))
    }

    /// Kinetic energy of `body` in `frame`.
    pub fn kinetic_energy(&self, body: &Body, frame: FrameId) -> Result<Expr> {
        let half = Expr::rational(1, 2);
        let v = self.vel(body.point(), frame)?;
        let translational = &half * body.mass() * self.dot(&v, &v)?;
        match body {
            Body::Particle(_) => Ok(translational),
            Body::Rigid(b) => {
                let w = self.ang_vel_in(b.frame, frame)?;
                let iw = self.inertia_dot(&b.inertia, &w)?;
                Ok(translational + half * self.dot(&w, &iw)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBody;
    use limb_expr::Symbol;

    struct Pendulum {
        mech: Mechanism,
        n: FrameId,
        a: FrameId,
        pivot: PointId,
        bob: PointId,
        q: Expr,
        u: Expr,
        l: Expr,
    }

    /// Pendulum hanging along `a.y`, rotating about `n.z` with `ω = u`.
    fn pendulum() -> Pendulum {
        let q = Expr::from(Symbol::dynamic("q"));
        let u = Expr::from(Symbol::dynamic("u"));
        let l = Expr::from(Symbol::constant("l"));

        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let a = mech.orient_axis("A", n, Axis::Z, &q).unwrap();
        mech.set_ang_vel(a, n, Vector::along(n, Axis::Z, u.clone())).unwrap();
        let pivot = mech.add_point("O");
        mech.set_vel(pivot, n, Vector::zero()).unwrap();
        let bob = mech.locate_new("P", pivot, Vector::along(a, Axis::Y, l.clone()));
        Pendulum {
            mech,
            n,
            a,
            pivot,
            bob,
            q,
            u,
            l,
        }
    }

    #[test]
    fn express_chain_of_rotations() {
        let q1 = Expr::from(Symbol::dynamic("q1"));
        let q2 = Expr::from(Symbol::dynamic("q2"));
        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let a = mech.orient_axis("A", n, Axis::Z, &q1).unwrap();
        let b = mech.orient_axis("B", a, Axis::Z, &q2).unwrap();

        let by = mech.unit(b, Axis::Y);
        let c = mech.components_in(&by, n).unwrap();
        let sum = &q1 + &q2;
        assert_eq!(c[0].trigsimp(), -sum.sin().unwrap());
        assert_eq!(c[1].trigsimp(), sum.cos().unwrap());

        // down the tree from N into B and back out
        let nx = mech.unit(n, Axis::X);
        let in_b = mech.express(&nx, b).unwrap();
        let back = mech.components_in(&in_b, n).unwrap();
        assert_eq!(back[0].trigsimp(), Expr::one());
        assert!(back[1].trigsimp().is_zero());
    }

    #[test]
    fn sibling_frames_are_connected_through_parent() {
        let q1 = Expr::from(Symbol::dynamic("q1"));
        let q2 = Expr::from(Symbol::dynamic("q2"));
        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let a = mech.orient_axis("A", n, Axis::Z, &q1).unwrap();
        let b = mech.orient_axis("B", n, Axis::Z, &q2).unwrap();

        let d = mech.dot(&mech.unit(a, Axis::X), &mech.unit(b, Axis::X)).unwrap();
        assert_eq!(d.trigsimp(), (&q1 - &q2).cos().unwrap());

        let w = mech.ang_vel_in(a, b).unwrap();
        let wz = &mech.components_in(&w, n).unwrap()[2];
        assert_eq!(*wz, (&q1 - &q2).dt());
    }

    #[test]
    fn disconnected_frames_error() {
        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let m = mech.add_frame("M");
        let err = mech.express(&mech.unit(n, Axis::X), m).unwrap_err();
        assert!(matches!(err, MechError::DisconnectedFrames(_, _)));
    }

    #[test]
    fn cross_products_of_basis_vectors() {
        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let z = mech.cross(&mech.unit(n, Axis::X), &mech.unit(n, Axis::Y)).unwrap();
        assert_eq!(z, mech.unit(n, Axis::Z));
        let x = mech.cross(&mech.unit(n, Axis::Y), &mech.unit(n, Axis::Z)).unwrap();
        assert_eq!(x, mech.unit(n, Axis::X));
    }

    #[test]
    fn set_ang_vel_requires_parent() {
        let q = Expr::from(Symbol::dynamic("q"));
        let mut mech = Mechanism::new();
        let n = mech.add_frame("N");
        let a = mech.orient_axis("A", n, Axis::Z, &q).unwrap();
        let b = mech.orient_axis("B", a, Axis::Z, &q).unwrap();
        let err = mech.set_ang_vel(b, n, Vector::zero()).unwrap_err();
        assert!(matches!(err, MechError::NotAdjacent { .. }));
        assert!(mech.set_ang_vel(b, a, Vector::zero()).is_ok());
    }

    #[test]
    fn foreign_ids_are_rejected() {
        let mut p = pendulum();
        let mut other = Mechanism::new();
        other.add_frame("N");
        other.add_frame("A");
        let far_frame = other.add_frame("F");
        other.add_point("O");
        other.add_point("P");
        let far_point = other.add_point("Q");

        let err = p.mech.set_vel(far_point, p.n, Vector::zero()).unwrap_err();
        assert_eq!(err, MechError::UnknownPoint(2));
        let err = p.mech.set_vel(p.bob, far_frame, Vector::zero()).unwrap_err();
        assert_eq!(err, MechError::UnknownFrame(2));
        let err = p.mech.set_ang_vel(far_frame, p.n, Vector::zero()).unwrap_err();
        assert_eq!(err, MechError::UnknownFrame(2));
        assert!(p.mech.vel(far_point, p.n).is_err());
    }

    #[test]
    #[should_panic]
    fn inertia_component_out_of_range() {
        let p = pendulum();
        let inertia = Inertia::principal(p.a, Expr::one(), Expr::one(), Expr::one());
        let _ = inertia.component(3, 0);
    }

    #[test]
    fn two_point_theory_on_pendulum() {
        let mut p = pendulum();
        let v = p.mech.v2pt_theory(p.bob, p.pivot, p.n, p.a).unwrap();
        // ω n.z × l a.y = -l u a.x
        let c = p.mech.components_in(&v, p.a).unwrap();
        assert_eq!(c[0].trigsimp(), -(&p.l * &p.u));
        assert!(c[1].trigsimp().is_zero());
        assert_eq!(p.mech.vel(p.bob, p.n).unwrap(), v);
    }

    #[test]
    fn velocity_falls_back_to_position_derivative() {
        let p = pendulum();
        // nothing set on the bob: differentiate l a.y in N, which uses ω = u
        let v = p.mech.vel(p.bob, p.n).unwrap();
        let c = p.mech.components_in(&v, p.n).unwrap();
        let expected_x = -(&p.l * &p.u * p.q.cos().unwrap());
        assert_eq!(c[0].trigsimp(), expected_x);

        let err = p.mech.vel(p.pivot, p.a).unwrap_err();
        assert!(matches!(err, MechError::VelocityUndefined { .. }));
    }

    #[test]
    fn pos_from_walks_both_chains() {
        let mut p = pendulum();
        let other = p.mech.locate_new("Q", p.pivot, Vector::along(p.n, Axis::X, Expr::one()));
        let r = p.mech.pos_from(p.bob, other).unwrap();
        let expected =
            Vector::along(p.a, Axis::Y, p.l.clone()) - Vector::along(p.n, Axis::X, Expr::one());
        assert_eq!(r, expected);

        let lonely = p.mech.add_point("L");
        assert!(matches!(
            p.mech.pos_from(lonely, p.bob),
            Err(MechError::DisconnectedPoints(_, _))
        ));
    }

    #[test]
    fn rod_kinetic_energy() {
        let mut p = pendulum();
        p.mech.v2pt_theory(p.bob, p.pivot, p.n, p.a).unwrap();
        let m = Expr::from(Symbol::constant("m"));
        let izz = Expr::from(Symbol::constant("I"));
        let body = Body::from(RigidBody::new(
            "rod",
            p.bob,
            p.a,
            m.clone(),
            Inertia::principal(p.a, Expr::zero(), Expr::zero(), izz.clone()),
        ));
        let ke = p.mech.kinetic_energy(&body, p.n).unwrap().trigsimp();
        let expected = Expr::rational(1, 2) * (&m * p.l.pow(2) + &izz) * p.u.pow(2);
        assert_eq!(ke, expected);
    }
}
