//! Common traits defining the collaborators of the terrain pipeline

use nalgebra::Vector3;

use crate::common::types::*;
use crate::utils::SpaceDiscretization;

/// State of a node in a volumetric occupancy structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied,
}

/// Volumetric occupancy structure queried by the terrain mapper.
///
/// Keys are only meaningful for the structure that produced them and for the
/// same `depth`.
pub trait OccupancyMap {
    /// Key of the voxel containing `point`, `None` outside the representable range
    fn coord_to_key_checked(&self, point: &Vector3<f64>, depth: u32) -> Option<GridKey>;

    /// Key of the voxel containing `point`, clamped to the representable range
    fn coord_to_key(&self, point: &Vector3<f64>, depth: u32) -> GridKey;

    /// Centre of the voxel addressed by `key`
    fn key_to_coord(&self, key: &GridKey, depth: u32) -> Vector3<f64>;

    /// Node lookup: `None` when the voxel is unknown
    fn search(&self, key: &GridKey, depth: u32) -> Option<Occupancy>;

    fn is_occupied(&self, key: &GridKey, depth: u32) -> bool {
        self.search(key, depth) == Some(Occupancy::Occupied)
    }
}

/// Geometric description of a legged robot
pub trait RobotModel {
    fn number_of_legs(&self) -> usize;

    /// Per-leg work areas in the body frame
    fn leg_work_areas(&self) -> &[SearchArea];

    /// Stance areas in the body frame
    fn stance_areas(&self) -> &[SearchArea];
}

/// Source of candidate motions for lattice expansion
pub trait MotionPrimitiveGenerator {
    /// Candidate target poses reachable from `pose`, in a fixed order
    fn generate_actions(&self, pose: &Pose2D) -> Vec<Action>;
}

/// Read access to the terrain needed by a successor generator
pub trait TerrainEnvironment {
    /// Whether terrain has been computed at least once
    fn is_terrain_information(&self) -> bool;

    fn space_discretization(&self) -> &SpaceDiscretization;

    /// Vertex -> cost of the current terrain map
    fn terrain_cost_map(&self) -> CostMap;

    /// Mean cost over the current terrain map
    fn average_terrain_cost(&self) -> f64;
}
