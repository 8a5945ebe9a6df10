//! terrain_lattice - terrain mapping and lattice successor generation
//!
//! This crate turns volumetric occupancy data into a cost-annotated 2.5D
//! terrain map around a legged robot, and expands body states on a lattice
//! for an external graph search using that map.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, Pose2D, RobotState, GridKey, SearchArea, NeighboringArea, TerrainCell, Edge, Action};
pub use common::{PlanarVertex, SpatialVertex, StateVertex, HeightMap, TerrainMap, CostMap};
pub use common::{OccupancyMap, Occupancy, RobotModel, MotionPrimitiveGenerator, TerrainEnvironment};
pub use common::{TerrainError, TerrainResult};
pub use mapping::{TerrainMapping, TerrainMappingConfig, TerrainSummary, Feature, SharedTerrainMapping};
pub use path_planning::{LatticeBodyAdjacency, LatticeAdjacencyConfig};
pub use utils::{SpaceDiscretization, VoxelGrid};
