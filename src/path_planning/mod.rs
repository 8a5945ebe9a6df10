// Lattice expansion module

pub mod lattice_adjacency;
pub mod motion_primitives;
pub mod robot;

pub use lattice_adjacency::*;
pub use motion_primitives::*;
pub use robot::*;
