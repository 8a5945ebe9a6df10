//! Terrain features
//!
//! A feature is a named, weighted cost evaluator over one terrain sample. The
//! terrain mapper owns its features and sums `weight * cost` over all of them
//! to obtain the cost of a cell.

pub mod slope;
pub mod leg_potential_collision;

pub use slope::SlopeFeature;
pub use leg_potential_collision::LegPotentialCollisionFeature;

use nalgebra::Vector3;

use crate::common::types::{HeightMap, Pose2D};
use crate::utils::SpaceDiscretization;

/// Terrain sample and surrounding context handed to every feature
#[derive(Debug, Clone)]
pub struct TerrainInfo<'a> {
    /// Position of the sample
    pub position: Vector3<f64>,
    /// Unit surface normal
    pub surface_normal: Vector3<f64>,
    pub curvature: f64,
    /// Robot pose placed on the sample
    pub pose: Pose2D,
    pub height_map: &'a HeightMap,
    pub space: &'a SpaceDiscretization,
    pub min_height: f64,
}

/// Cost evaluator for a terrain sample.
///
/// Implementations keep only configuration, so a feature can score
/// different cells from several threads.
pub trait Feature: Send + Sync {
    fn name(&self) -> &str;

    fn weight(&self) -> f64;

    fn set_weight(&mut self, weight: f64);

    /// Cost contribution of the sample before weighting
    fn compute_cost(&self, info: &TerrainInfo<'_>) -> f64;
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    /// Feature returning a fixed cost
    pub struct ConstantFeature {
        pub name: String,
        pub weight: f64,
        pub cost: f64,
    }

    impl ConstantFeature {
        pub fn new(name: &str, weight: f64, cost: f64) -> Self {
            Self { name: name.to_string(), weight, cost }
        }
    }

    impl Feature for ConstantFeature {
        fn name(&self) -> &str {
            &self.name
        }

        fn weight(&self) -> f64 {
            self.weight
        }

        fn set_weight(&mut self, weight: f64) {
            self.weight = weight;
        }

        fn compute_cost(&self, _info: &TerrainInfo<'_>) -> f64 {
            self.cost
        }
    }

    pub fn flat_info<'a>(height_map: &'a HeightMap, space: &'a SpaceDiscretization) -> TerrainInfo<'a> {
        TerrainInfo {
            position: Vector3::zeros(),
            surface_normal: Vector3::z(),
            curvature: 0.0,
            pose: Pose2D::origin(),
            height_map,
            space,
            min_height: f64::NEG_INFINITY,
        }
    }
}
