//! Leg potential collision feature
//!
//! For every leg, scans the leg work area around the robot placed on the
//! sample and penalizes the spread between the highest and the mean height
//! found there. Large spreads hint at obstacles a swinging leg could hit.

use crate::common::traits::RobotModel;
use crate::common::types::SearchArea;

use super::{Feature, TerrainInfo};

pub struct LegPotentialCollisionFeature {
    weight: f64,
    leg_areas: Vec<SearchArea>,
}

impl LegPotentialCollisionFeature {
    pub const DEFAULT_WEIGHT: f64 = 50.0;

    pub fn new(robot: &dyn RobotModel) -> Self {
        let leg_areas = robot
            .leg_work_areas()
            .iter()
            .take(robot.number_of_legs())
            .copied()
            .collect();
        Self::from_leg_areas(leg_areas)
    }

    pub fn from_leg_areas(leg_areas: Vec<SearchArea>) -> Self {
        Self {
            weight: Self::DEFAULT_WEIGHT,
            leg_areas,
        }
    }

    pub fn leg_areas(&self) -> &[SearchArea] {
        &self.leg_areas
    }

    /// Max minus mean height inside one leg area, `None` when no cell is mapped
    fn height_spread(&self, area: &SearchArea, info: &TerrainInfo<'_>) -> Option<f64> {
        let heights: Vec<f64> = area
            .rasterize(&info.pose, false)
            .iter()
            .filter_map(|p| info.height_map.get(&info.space.coord_to_planar_vertex(p)))
            .copied()
            .collect();

        if heights.is_empty() {
            return None;
        }
        let mean = heights.iter().sum::<f64>() / heights.len() as f64;
        let max = heights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(max - mean)
    }
}

impl Feature for LegPotentialCollisionFeature {
    fn name(&self) -> &str {
        "Leg Potential Collision"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    fn compute_cost(&self, info: &TerrainInfo<'_>) -> f64 {
        self.leg_areas
            .iter()
            .filter_map(|area| self.height_spread(area, info))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{HeightMap, Point2D};
    use crate::mapping::features::test_utils::flat_info;
    use crate::path_planning::robot::RobotGeometry;
    use crate::utils::SpaceDiscretization;

    fn single_leg() -> LegPotentialCollisionFeature {
        // 4 x 1 samples ahead of the body at 0.1 m
        LegPotentialCollisionFeature::from_leg_areas(vec![SearchArea::new(
            0.05, 0.45, 0.05, 0.15, -1.0, 1.0, 0.1,
        )])
    }

    fn fill(height_map: &mut HeightMap, space: &SpaceDiscretization, cells: &[(f64, f64, f64)]) {
        for &(x, y, z) in cells {
            height_map.insert(space.coord_to_planar_vertex(&Point2D::new(x, y)), z);
        }
    }

    #[test]
    fn test_flat_leg_area_is_free() {
        let feature = single_leg();
        let space = SpaceDiscretization::new(0.1, 0.1).unwrap();
        let mut height_map = HeightMap::new();
        fill(&mut height_map, &space, &[(0.05, 0.05, 0.2), (0.15, 0.05, 0.2), (0.25, 0.05, 0.2)]);
        let info = flat_info(&height_map, &space);
        assert!(feature.compute_cost(&info).abs() < 1e-12);
    }

    #[test]
    fn test_bump_is_penalized() {
        let feature = single_leg();
        let space = SpaceDiscretization::new(0.1, 0.1).unwrap();
        let mut height_map = HeightMap::new();
        fill(
            &mut height_map,
            &space,
            &[(0.05, 0.05, 0.0), (0.15, 0.05, 0.0), (0.25, 0.05, 0.0), (0.35, 0.05, 0.4)],
        );
        let info = flat_info(&height_map, &space);
        // max 0.4, mean 0.1
        assert!((feature.compute_cost(&info) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_unmapped_leg_area_costs_nothing() {
        let feature = single_leg();
        let space = SpaceDiscretization::new(0.1, 0.1).unwrap();
        let height_map = HeightMap::new();
        let info = flat_info(&height_map, &space);
        assert_eq!(feature.compute_cost(&info), 0.0);
    }

    #[test]
    fn test_takes_leg_areas_from_robot() {
        let robot = RobotGeometry::quadruped();
        let feature = LegPotentialCollisionFeature::new(&robot);
        assert_eq!(feature.leg_areas().len(), robot.number_of_legs());
        assert_eq!(feature.weight(), LegPotentialCollisionFeature::DEFAULT_WEIGHT);
    }
}
