// Terrain mapping module

pub mod features;
pub mod terrain_mapping;
pub mod shared;

pub use features::{Feature, TerrainInfo, SlopeFeature, LegPotentialCollisionFeature};
pub use terrain_mapping::*;
pub use shared::SharedTerrainMapping;
