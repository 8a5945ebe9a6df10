//! Utility modules for terrain_lattice

pub mod space_discretization;
pub mod math;
pub mod voxel_grid;
pub mod visualization;

pub use space_discretization::SpaceDiscretization;
pub use voxel_grid::VoxelGrid;
pub use visualization::{Visualizer, PointStyle, CostBands, colors};
