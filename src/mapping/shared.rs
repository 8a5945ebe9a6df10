//! Shared terrain map handle
//!
//! Mapping cycles and planning cycles touch the same height and terrain maps.
//! When they run on different threads, the whole mapper sits behind one
//! read/write lock: a mapping cycle takes the write side for its full
//! duration, successor expansion takes the read side.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::error::TerrainResult;
use crate::common::traits::OccupancyMap;
use crate::common::types::RobotState;
use crate::mapping::terrain_mapping::TerrainMapping;

#[derive(Clone)]
pub struct SharedTerrainMapping {
    inner: Arc<RwLock<TerrainMapping>>,
}

impl SharedTerrainMapping {
    pub fn new(mapping: TerrainMapping) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mapping)),
        }
    }

    /// Run a full mapping cycle under the write lock
    pub fn compute<M>(&self, occupancy: &M, robot: &RobotState) -> TerrainResult<()>
    where
        M: OccupancyMap + ?Sized,
    {
        self.inner.write().compute(occupancy, robot)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TerrainMapping> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TerrainMapping> {
        self.inner.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::TerrainEnvironment;
    use crate::common::types::SearchArea;
    use crate::mapping::features::SlopeFeature;
    use crate::utils::VoxelGrid;
    use std::thread;

    #[test]
    fn test_compute_on_another_thread() {
        let mut grid = VoxelGrid::new(0.1).unwrap();
        grid.add_ground_patch(-0.95, 0.95, -0.95, 0.95, 0.05).unwrap();

        let mut mapping = TerrainMapping::with_defaults();
        mapping
            .add_search_area(SearchArea::new(-0.45, 0.45, -0.45, 0.45, -0.5, 0.5, 0.1))
            .unwrap();
        mapping.add_feature(Box::new(SlopeFeature::with_defaults()));
        let shared = SharedTerrainMapping::new(mapping);

        let writer = shared.clone();
        thread::spawn(move || {
            writer.compute(&grid, &RobotState::new(0.0, 0.0, 0.0, 0.0)).unwrap();
        })
        .join()
        .unwrap();

        let mapping = shared.read();
        assert!(mapping.is_terrain_information());
        assert_eq!(mapping.terrain_map().len(), 100);
    }
}
