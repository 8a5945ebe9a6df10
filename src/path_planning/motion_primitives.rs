//! Body motion primitives
//!
//! A fixed catalog of relative body displacements (dx, dy, dyaw, cost) in the
//! body frame. Actions are the catalog applied to the current pose, in catalog
//! order.

use std::f64::consts::PI;

use crate::common::traits::MotionPrimitiveGenerator;
use crate::common::types::{Action, Pose2D};

/// Relative body motion in the body frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPrimitive {
    pub dx: f64,
    pub dy: f64,
    pub dyaw: f64,
    pub cost: f64,
}

impl MotionPrimitive {
    pub fn new(dx: f64, dy: f64, dyaw: f64, cost: f64) -> Self {
        Self { dx, dy, dyaw, cost }
    }

    /// Pose reached by applying this primitive at `pose`
    pub fn apply(&self, pose: &Pose2D) -> Pose2D {
        let (sin_yaw, cos_yaw) = pose.yaw.sin_cos();
        let mut target = Pose2D::new(
            pose.x + self.dx * cos_yaw - self.dy * sin_yaw,
            pose.y + self.dx * sin_yaw + self.dy * cos_yaw,
            pose.yaw + self.dyaw,
        );
        target.normalize_yaw();
        target
    }
}

pub struct BodyMotionPrimitives {
    primitives: Vec<MotionPrimitive>,
}

impl BodyMotionPrimitives {
    pub fn new(primitives: Vec<MotionPrimitive>) -> Self {
        Self { primitives }
    }

    /// Forward, lateral, backward and turning steps for a ~0.1 m lattice
    pub fn with_defaults() -> Self {
        let step = 0.1;
        let diagonal = 2.0_f64.sqrt() * step;
        let turn = PI / 8.0;
        Self::new(vec![
            MotionPrimitive::new(step, 0.0, 0.0, step),
            MotionPrimitive::new(2.0 * step, 0.0, 0.0, 2.0 * step),
            MotionPrimitive::new(step, step, 0.0, diagonal),
            MotionPrimitive::new(step, -step, 0.0, diagonal),
            MotionPrimitive::new(0.0, step, 0.0, 1.5 * step),
            MotionPrimitive::new(0.0, -step, 0.0, 1.5 * step),
            MotionPrimitive::new(-step, 0.0, 0.0, 2.0 * step),
            MotionPrimitive::new(step, 0.0, turn, 1.5 * step),
            MotionPrimitive::new(step, 0.0, -turn, 1.5 * step),
            MotionPrimitive::new(0.0, 0.0, turn, step),
            MotionPrimitive::new(0.0, 0.0, -turn, step),
        ])
    }

    pub fn primitives(&self) -> &[MotionPrimitive] {
        &self.primitives
    }
}

impl MotionPrimitiveGenerator for BodyMotionPrimitives {
    fn generate_actions(&self, pose: &Pose2D) -> Vec<Action> {
        self.primitives
            .iter()
            .map(|primitive| Action::new(primitive.apply(pose), primitive.cost))
            .collect()
    }
}
