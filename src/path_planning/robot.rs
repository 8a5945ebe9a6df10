//! Robot geometry used by the terrain features and the body adjacency

use crate::common::traits::RobotModel;
use crate::common::types::SearchArea;

/// Leg work areas and stance areas of a legged robot, in the body frame
#[derive(Debug, Clone)]
pub struct RobotGeometry {
    leg_work_areas: Vec<SearchArea>,
    stance_areas: Vec<SearchArea>,
}

impl RobotGeometry {
    pub fn new(leg_work_areas: Vec<SearchArea>, stance_areas: Vec<SearchArea>) -> Self {
        Self { leg_work_areas, stance_areas }
    }

    /// Quadruped with ~0.7 m x 0.4 m footprint (LF, RF, LH, RH)
    pub fn quadruped() -> Self {
        let resolution = 0.04;
        let foot = |min_x: f64, max_x: f64, min_y: f64, max_y: f64| {
            SearchArea::new(min_x, max_x, min_y, max_y, -0.8, -0.2, resolution)
        };

        let leg_work_areas = vec![
            foot(0.25, 0.45, 0.1, 0.3),
            foot(0.25, 0.45, -0.3, -0.1),
            foot(-0.45, -0.25, 0.1, 0.3),
            foot(-0.45, -0.25, -0.3, -0.1),
        ];
        let stance_areas = vec![
            foot(0.3, 0.4, 0.15, 0.25),
            foot(0.3, 0.4, -0.25, -0.15),
            foot(-0.4, -0.3, 0.15, 0.25),
            foot(-0.4, -0.3, -0.25, -0.15),
        ];
        Self::new(leg_work_areas, stance_areas)
    }
}

impl RobotModel for RobotGeometry {
    fn number_of_legs(&self) -> usize {
        self.leg_work_areas.len()
    }

    fn leg_work_areas(&self) -> &[SearchArea] {
        &self.leg_work_areas
    }

    fn stance_areas(&self) -> &[SearchArea] {
        &self.stance_areas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadruped_layout() {
        let robot = RobotGeometry::quadruped();
        assert_eq!(robot.number_of_legs(), 4);
        assert_eq!(robot.stance_areas().len(), 4);
        // Stance areas sit inside the work areas
        for (stance, work) in robot.stance_areas().iter().zip(robot.leg_work_areas()) {
            assert!(stance.min_x >= work.min_x && stance.max_x <= work.max_x);
            assert!(stance.min_y >= work.min_y && stance.max_y <= work.max_y);
        }
    }
}
